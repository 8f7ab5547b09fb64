use std::path::PathBuf;

use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::Parser;

use crate::{
    cli::params::{parse_date, parse_time_zone},
    models::timeframe::TimeFrame,
};

#[derive(Parser, Debug)]
#[command(
    name = "collect",
    author,
    version,
    about = "Collect historical bars for one symbol into <dir>/<sym>.tar.gz"
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Output directory
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// The stock symbol (e.g. "AAPL")
    #[arg(long)]
    pub sym: String,

    /// IANA time zone the dates are interpreted in
    #[arg(long, default_value = "America/New_York", value_parser = parse_time_zone)]
    pub tz: Tz,

    /// Start date, YYYY-MM-DD
    #[arg(long, value_parser = parse_date)]
    pub start: NaiveDate,

    /// End date, YYYY-MM-DD (inclusive). Defaults to today in --tz
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Bar interval in Alpaca notation (1Min, 5Min, 1Hour, 1Day, ...)
    #[arg(long, default_value = "1Min")]
    pub timeframe: TimeFrame,

    /// Path to an Alpaca provider config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
