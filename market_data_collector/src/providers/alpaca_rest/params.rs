use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::Deserialize;

use crate::{
    models::request_params::BarsRequestParams,
    providers::alpaca_rest::config::AlpacaConfig,
};

/// Specifies the corporate action adjustment for stock data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Adjustment {
    #[default]
    Raw,
    Split,
    Dividend,
    All,
}

impl Adjustment {
    pub fn as_str(self) -> &'static str {
        match self {
            Adjustment::Raw => "raw",
            Adjustment::Split => "split",
            Adjustment::Dividend => "dividend",
            Adjustment::All => "all",
        }
    }
}

/// Specifies the source feed for stock data. Free accounts only get `iex`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Feed {
    Sip,
    #[default]
    Iex,
    Otc,
}

impl Feed {
    pub fn as_str(self) -> &'static str {
        match self {
            Feed::Sip => "sip",
            Feed::Iex => "iex",
            Feed::Otc => "otc",
        }
    }
}

fn rfc3339(t: &DateTime<FixedOffset>) -> String {
    t.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Builds the query string for one page of a bars request.
///
/// `end` is passed separately because the provider may have clamped it.
pub fn construct_params(
    params: &BarsRequestParams,
    end: &DateTime<FixedOffset>,
    config: &AlpacaConfig,
    page_token: Option<&str>,
) -> Vec<(String, String)> {
    let mut query = vec![
        ("symbols".to_string(), params.symbol.clone()),
        ("timeframe".to_string(), params.timeframe.to_string()),
        ("start".to_string(), rfc3339(&params.span.start)),
        ("end".to_string(), rfc3339(end)),
        ("limit".to_string(), config.page_limit.to_string()),
        ("adjustment".to_string(), config.adjustment.as_str().to_string()),
        ("feed".to_string(), config.feed.as_str().to_string()),
        ("sort".to_string(), "asc".to_string()),
        // "-" turns off symbol remapping after renames.
        ("asof".to_string(), "-".to_string()),
    ];
    if let Some(token) = page_token {
        query.push(("page_token".to_string(), token.to_string()));
    }
    query
}
