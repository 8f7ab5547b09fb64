//! Collects historical price bars for one symbol from a market data provider and archives
//! them as per-year NDJSON files inside a single `<symbol>.tar.gz`.
//!
//! - [`models`]: [`Bar`](models::bar::Bar), [`Bars`](models::bars::Bars) and derived prices.
//! - [`io`]: NDJSON codec and the tar.gz writer.
//! - [`providers`]: the [`DataProvider`](providers::DataProvider) seam and the Alpaca REST
//!   implementation.
//! - [`collect`]: the [`CollectCommand`](collect::CollectCommand) pipeline.

#[cfg(feature = "cli")]
pub mod cli;
pub mod collect;
pub mod io;
pub mod models;
pub mod providers;
