use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::models::{bar::Bar, ohlc::Ohlc};

#[derive(Deserialize, Debug)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: u64,
    #[serde(rename = "n")]
    pub trade_count: u64,
    #[serde(rename = "vw")]
    pub vwap: f64,
}

/// One page of `GET /v2/stocks/bars`. `bars` is `null` when nothing matched.
#[derive(Deserialize, Debug)]
pub struct AlpacaResponse {
    #[serde(default)]
    pub bars: Option<IndexMap<String, Vec<AlpacaBar>>>,
    pub next_page_token: Option<String>,
}

impl From<AlpacaBar> for Bar {
    fn from(ab: AlpacaBar) -> Self {
        Bar::new(
            ab.timestamp.fixed_offset(),
            ab.volume,
            ab.trade_count,
            ab.vwap,
            Ohlc::new(ab.open, ab.high, ab.low, ab.close),
        )
    }
}
