use std::{path::Path, time::Duration};

use chrono::TimeDelta;
use serde::Deserialize;
use shared_utils::config::{ConfigError, load_toml};
use snafu::ResultExt;

use crate::providers::{
    ConfigSnafu, ProviderInitError,
    alpaca_rest::params::{Adjustment, Feed},
};

pub const DEFAULT_BASE_URL: &str = "https://data.alpaca.markets/v2/stocks/bars";

/// Tuning for [`AlpacaProvider`](super::AlpacaProvider). Every key is optional in the TOML file.
///
/// ```toml
/// feed = "iex"
/// retry_limit = 2
/// retry_delay_secs = 20
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlpacaConfig {
    pub base_url: String,
    pub feed: Feed,
    pub adjustment: Adjustment,
    /// Bars per page, at most 10000.
    pub page_limit: u32,
    /// Extra attempts after the first one for a transient failure.
    pub retry_limit: u32,
    pub retry_delay_secs: u64,
    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
    pub requests_per_minute: u32,
    /// How far behind "now" the requested window must end. The free plan serves nothing
    /// newer than 15 minutes.
    pub embargo_secs: u64,
}

impl Default for AlpacaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            feed: Feed::Iex,
            adjustment: Adjustment::Raw,
            page_limit: 10_000,
            retry_limit: 2,
            retry_delay_secs: 20,
            timeout_secs: 60,
            requests_per_minute: 200,
            embargo_secs: 15 * 60 + 1,
        }
    }
}

impl AlpacaConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        load_toml(path)
    }

    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ProviderInitError> {
        match path {
            Some(path) => Self::from_file(path).context(ConfigSnafu),
            None => Ok(Self::default()),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Saturates at [`TimeDelta::MAX`] for values chrono cannot represent.
    pub fn embargo(&self) -> TimeDelta {
        i64::try_from(self.embargo_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}
