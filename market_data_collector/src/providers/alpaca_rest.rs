//! Alpaca market data v2 REST provider for historical stock bars.

pub mod config;
pub mod params;
pub mod provider;
pub mod response;

pub use config::AlpacaConfig;
pub use provider::AlpacaProvider;
