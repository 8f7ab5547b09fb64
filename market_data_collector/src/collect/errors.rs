use std::path::PathBuf;

use chrono::NaiveDate;
use snafu::Snafu;

use crate::{
    io::{archive::ArchiveError, ndjson::NdjsonError},
    providers::ProviderError,
};

/// Errors from validating or running a [`CollectCommand`](super::CollectCommand).
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CollectError {
    #[snafu(display("symbol is empty"))]
    EmptySymbol,

    #[snafu(display("start date {start} is after end date {end}"))]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[snafu(display("dir '{}' does not exist", dir.display()))]
    MissingDir { dir: PathBuf },

    #[snafu(display("'{}' is not a dir", dir.display()))]
    NotADir { dir: PathBuf },

    #[snafu(display("failed to stat '{}': {source}", dir.display()))]
    StatDir {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to create tar.gz file in {}: {source}", dir.display()))]
    CreateArchive {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to make temp dir: {source}"))]
    CreateWorkDir { source: std::io::Error },

    #[snafu(display("{date} has no start of day in time zone {tz}"))]
    LocalTime { date: NaiveDate, tz: String },

    #[snafu(display("failed to load {symbol} bars for {year}: {source}"))]
    Fetch {
        symbol: String,
        year: i32,
        source: ProviderError,
    },

    #[snafu(display("failed to create file {}: {source}", path.display()))]
    CreateSegmentFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to store bars in '{}': {source}", path.display()))]
    StoreSegment { path: PathBuf, source: NdjsonError },

    #[snafu(display("failed to flush '{}': {source}", path.display()))]
    FlushSegment {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to make tar.gz {}: {source}", path.display()))]
    BuildArchive {
        path: PathBuf,
        source: ArchiveError,
    },

    #[snafu(display("failed to finish tar.gz {}: {source}", path.display()))]
    FinishArchive {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to move tar.gz into place at {}: {source}", path.display()))]
    PersistArchive {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

impl CollectError {
    /// True for errors raised by `init`, before anything touches the filesystem.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CollectError::EmptySymbol
                | CollectError::InvalidDateRange { .. }
                | CollectError::MissingDir { .. }
                | CollectError::NotADir { .. }
                | CollectError::StatDir { .. }
        )
    }
}
