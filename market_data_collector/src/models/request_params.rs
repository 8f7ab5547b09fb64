use crate::models::{time_span::TimeSpan, timeframe::TimeFrame};

/// Parameters for one bars request against a [`DataProvider`](crate::providers::DataProvider).
///
/// Providers may pull `span.end` back to the latest instant their upstream allows.
#[derive(Clone, Debug, PartialEq)]
pub struct BarsRequestParams {
    /// Symbol to request (e.g. `"AAPL"`).
    pub symbol: String,

    /// Interval of each returned bar.
    pub timeframe: TimeFrame,

    /// Requested window.
    pub span: TimeSpan,
}
