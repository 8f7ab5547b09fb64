//! Open/high/low/close price quadruple and the derived price proxies computed from it.

use serde::{Deserialize, Serialize};

const ONE_HALF: f64 = 1.0 / 2.0;
const ONE_THIRD: f64 = 1.0 / 3.0;
const ONE_FOURTH: f64 = 1.0 / 4.0;

/// Prices for a single interval.
///
/// High/low ordering is not validated; values are stored as the provider reported them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
}

impl Ohlc {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
        }
    }

    /// `[open, high, low, close]`
    pub fn values(&self) -> [f64; 4] {
        [self.open, self.high, self.low, self.close]
    }

    /// Median price, `(H + L) / 2`.
    pub fn hl2(&self) -> f64 {
        ONE_HALF * (self.high + self.low)
    }

    /// Typical price, `(H + L + C) / 3`.
    pub fn hlc3(&self) -> f64 {
        ONE_THIRD * (self.high + self.low + self.close)
    }

    /// `(O + 2C) / 3`
    pub fn occ3(&self) -> f64 {
        ONE_THIRD * (self.open + self.close + self.close)
    }

    /// Average price, `(O + H + L + C) / 4`.
    pub fn ohlc4(&self) -> f64 {
        ONE_FOURTH * (self.open + self.high + self.low + self.close)
    }

    /// Weighted close, `(H + L + 2C) / 4`.
    pub fn hlcc4(&self) -> f64 {
        ONE_FOURTH * (self.high + self.low + self.close + self.close)
    }

    /// Computes this interval's Heikin-Ashi candle from the previous interval's candle.
    ///
    /// `prev` is normally the previous Heikin-Ashi result, threaded forward by the caller.
    ///
    /// The synthetic low is computed with `max` over `{L, O, C}`, the same as the high.
    /// A textbook candle uses `min` for the low.
    pub fn heikin_ashi(&self, prev: &Ohlc) -> Ohlc {
        Ohlc {
            open: ONE_HALF * (prev.open + prev.close),
            close: self.ohlc4(),
            high: self.high.max(self.open).max(self.close),
            low: self.low.max(self.open).max(self.close),
        }
    }
}
