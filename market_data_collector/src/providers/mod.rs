//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the single seam the collect pipeline
//! uses to obtain bars. A provider receives a symbol, a timeframe and a time window and
//! returns the bars covering that window in ascending timestamp order.
//!
//! Implementations own their network policy: bounded retries of transient failures,
//! timeouts, rate limiting and any upstream embargo on how recent the window end may be.
//! Callers treat every returned error as final.
//!
//! The trait is async and object safe, so providers can be picked at runtime and passed
//! around as `Box<dyn DataProvider + Send + Sync>`.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_collector::models::{bars::Bars, request_params::BarsRequestParams};
//! use market_data_collector::providers::{DataProvider, ProviderError};
//!
//! struct EmptyProvider;
//!
//! #[async_trait]
//! impl DataProvider for EmptyProvider {
//!     async fn fetch_bars(&self, _params: BarsRequestParams) -> Result<Bars, ProviderError> {
//!         Ok(Bars::new())
//!     }
//! }
//! ```

pub mod alpaca_rest;

use async_trait::async_trait;
use shared_utils::{config::ConfigError, env::MissingEnvVarError};
use snafu::{Backtrace, Snafu};

use crate::models::{bars::Bars, request_params::BarsRequestParams};

/// Fetches time-series bars from a market data vendor.
#[async_trait]
pub trait DataProvider {
    /// Fetches the bars for `params.symbol` over `params.span`, sorted ascending.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Bars, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to load the provider config file
    #[snafu(display("Invalid provider config: {source}"))]
    Config {
        source: ConfigError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API answered with a non-success status.
    #[snafu(display("API error (HTTP {status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },
}

impl ProviderError {
    /// Whether retrying the same request later may succeed: timeouts, connection
    /// failures, rate limiting (HTTP 429) and server errors (HTTP 5xx).
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Reqwest { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            ProviderError::Api { status, .. } => *status == 429 || (500..600).contains(status),
            ProviderError::Validation { .. } | ProviderError::Internal { .. } => false,
        }
    }
}
