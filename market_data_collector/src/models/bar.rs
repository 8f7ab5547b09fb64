//! Canonical in-memory representation of a single price bar.
//!
//! This struct is the standard output of every [`DataProvider`](crate::providers::DataProvider)
//! and the record type of the NDJSON segment files.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::ohlc::Ohlc;

/// One interval's trading summary.
///
/// Serialized with the short keys `t, v, n, vw, o, h, l, c`, in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Start of the interval. Equality and ordering compare the instant, not the offset.
    #[serde(rename = "t")]
    pub timestamp: DateTime<FixedOffset>,

    /// Shares or contracts traded during the interval.
    #[serde(rename = "v")]
    pub volume: u64,

    /// Number of trades during the interval.
    #[serde(rename = "n")]
    pub trade_count: u64,

    /// Volume-weighted average price.
    #[serde(rename = "vw")]
    pub vwap: f64,

    #[serde(flatten)]
    pub ohlc: Ohlc,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<FixedOffset>,
        volume: u64,
        trade_count: u64,
        vwap: f64,
        ohlc: Ohlc,
    ) -> Self {
        Self {
            timestamp,
            volume,
            trade_count,
            vwap,
            ohlc,
        }
    }

    pub fn open(&self) -> f64 {
        self.ohlc.open
    }

    pub fn high(&self) -> f64 {
        self.ohlc.high
    }

    pub fn low(&self) -> f64 {
        self.ohlc.low
    }

    pub fn close(&self) -> f64 {
        self.ohlc.close
    }

    /// See [`Ohlc::heikin_ashi`].
    pub fn heikin_ashi(&self, prev: &Ohlc) -> Ohlc {
        self.ohlc.heikin_ashi(prev)
    }

    /// Re-expresses the timestamp in the machine's local time zone.
    pub fn localize(&mut self) {
        self.localize_to(&Local);
    }

    /// Re-expresses the timestamp in `tz`. The represented instant does not change.
    pub fn localize_to<Tz: TimeZone>(&mut self, tz: &Tz) {
        self.timestamp = self.timestamp.with_timezone(tz).fixed_offset();
    }

    /// Calendar date of the timestamp in its current offset.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::America::New_York;

    fn sample_bar() -> Bar {
        let ts = Utc.with_ymd_and_hms(2024, 1, 16, 2, 30, 0).unwrap().fixed_offset();
        Bar::new(ts, 1_500, 42, 187.25, Ohlc::new(187.0, 188.0, 186.5, 187.5))
    }

    #[test]
    fn localize_keeps_the_instant() {
        let mut bar = sample_bar();
        let before = bar.timestamp;

        bar.localize_to(&New_York);

        assert_eq!(bar.timestamp, before);
        assert_eq!(bar.timestamp.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn date_follows_the_current_offset() {
        let mut bar = sample_bar();
        assert_eq!(bar.date(), NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());

        // 02:30Z is still the previous evening in New York.
        bar.localize_to(&New_York);
        assert_eq!(bar.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn serializes_with_short_keys_in_order() {
        let json = serde_json::to_string(&sample_bar()).unwrap();

        let positions: Vec<usize> = ["t", "v", "n", "vw", "o", "h", "l", "c"]
            .iter()
            .map(|key| json.find(&format!("\"{key}\":")).expect(key))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 8);
        assert_eq!(value["v"], 1500);
        assert_eq!(value["vw"], 187.25);
    }

    #[test]
    fn deserializes_provider_style_record() {
        let bar: Bar = serde_json::from_str(
            r#"{"t":"2024-01-16T02:30:00Z","v":1500,"n":42,"vw":187.25,"o":187,"h":188,"l":186.5,"c":187.5}"#,
        )
        .unwrap();
        assert_eq!(bar, sample_bar());
        assert_eq!(bar.close(), 187.5);
    }
}
