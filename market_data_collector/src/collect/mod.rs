//! Year-chunked collection of one symbol's bars into a single `<symbol>.tar.gz`.
//!
//! A [`CollectCommand`] is validated once with [`CollectCommand::init`], which hands back
//! a [`ValidatedCollect`]. Running that consumes it:
//!
//! 1. a scratch archive file is created next to the final archive path,
//! 2. a private work directory is created (and always removed before `run` returns),
//! 3. the date range is split into calendar-year segments,
//! 4. each segment is fetched from the provider and written as `<symbol>-<year>.ndjson`,
//! 5. the work directory is tarred and gzipped into the scratch file, which is then
//!    renamed onto `<dir>/<symbol>.tar.gz`.
//!
//! Segments run strictly one after another. The first failure stops the run; no archive
//! is left at the final path in that case.

pub mod errors;
pub mod segments;

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant},
};

use chrono::{DateTime, FixedOffset, NaiveDate};
use chrono_tz::Tz;
use snafu::{OptionExt, ResultExt, ensure};
use tempfile::{NamedTempFile, TempDir};
use tracing::{info, warn};

pub use errors::CollectError;
use errors::*;
use segments::{YearSegment, start_of_day, year_segments};

use crate::{
    io::{archive::write_tar_gz, ndjson::store_bars},
    models::{request_params::BarsRequestParams, time_span::TimeSpan, timeframe::TimeFrame},
    providers::DataProvider,
};

/// A one-shot job: collect `symbol` from `start` through `end` (both inclusive calendar
/// dates in `time_zone`) into `<dir>/<symbol>.tar.gz`.
pub struct CollectCommand {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub dir: PathBuf,
    pub time_zone: Tz,
    pub timeframe: TimeFrame,
    /// Parent of the work directory. The system temp dir when `None`.
    pub work_root: Option<PathBuf>,
    provider: Arc<dyn DataProvider + Send + Sync>,
}

impl CollectCommand {
    pub fn new(
        symbol: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        dir: impl Into<PathBuf>,
        time_zone: Tz,
        provider: Arc<dyn DataProvider + Send + Sync>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            start,
            end,
            dir: dir.into(),
            time_zone,
            timeframe: TimeFrame::one_minute(),
            work_root: None,
            provider,
        }
    }

    pub fn with_timeframe(mut self, timeframe: TimeFrame) -> Self {
        self.timeframe = timeframe;
        self
    }

    pub fn with_work_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.work_root = Some(root.into());
        self
    }

    /// Checks the parameters without writing anything.
    pub fn init(self) -> Result<ValidatedCollect, CollectError> {
        ensure!(!self.symbol.trim().is_empty(), EmptySymbolSnafu);
        ensure!(
            self.start <= self.end,
            InvalidDateRangeSnafu {
                start: self.start,
                end: self.end
            }
        );
        verify_dir_exists(&self.dir)?;

        Ok(ValidatedCollect { cmd: self })
    }
}

fn verify_dir_exists(dir: &Path) -> Result<(), CollectError> {
    let meta = match fs::metadata(dir) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return MissingDirSnafu { dir }.fail();
        }
        Err(err) => return Err(err).context(StatDirSnafu { dir }),
    };
    ensure!(meta.is_dir(), NotADirSnafu { dir });
    Ok(())
}

/// Per-segment outcome of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentReport {
    pub year: i32,
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
    pub file_name: String,
    pub bar_count: usize,
    pub elapsed: Duration,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct CollectReport {
    pub symbol: String,
    pub archive_path: PathBuf,
    pub segments: Vec<SegmentReport>,
    pub elapsed: Duration,
}

impl CollectReport {
    pub fn total_bars(&self) -> usize {
        self.segments.iter().map(|s| s.bar_count).sum()
    }
}

/// A [`CollectCommand`] that passed [`CollectCommand::init`].
pub struct ValidatedCollect {
    cmd: CollectCommand,
}

impl ValidatedCollect {
    pub fn command(&self) -> &CollectCommand {
        &self.cmd
    }

    pub fn archive_path(&self) -> PathBuf {
        self.cmd.dir.join(format!("{}.tar.gz", self.cmd.symbol))
    }

    pub fn segments(&self) -> Vec<YearSegment> {
        year_segments(self.cmd.start, self.cmd.end)
    }

    #[tracing::instrument(name = "collect", skip_all, fields(symbol = %self.cmd.symbol))]
    pub async fn run(self) -> Result<CollectReport, CollectError> {
        let started = Instant::now();
        let cmd = &self.cmd;

        let archive_prefix = format!(".{}.", cmd.symbol);
        let archive = tempfile::Builder::new()
            .prefix(&archive_prefix)
            .suffix(".tar.gz.partial")
            .tempfile_in(&cmd.dir)
            .context(CreateArchiveSnafu { dir: &cmd.dir })?;

        let work_prefix = format!("collect-{}-", cmd.symbol);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&work_prefix);
        let work_dir = match &cmd.work_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .context(CreateWorkDirSnafu)?;

        let result = self.run_in(&work_dir, archive).await;
        remove_work_dir(work_dir);

        let segments = result?;
        let report = CollectReport {
            symbol: self.cmd.symbol.clone(),
            archive_path: self.archive_path(),
            segments,
            elapsed: started.elapsed(),
        };
        info!(
            archive = %report.archive_path.display(),
            segments = report.segments.len(),
            bars = report.total_bars(),
            time_sec = report.elapsed.as_secs_f64(),
            "collect complete"
        );
        Ok(report)
    }

    async fn run_in(
        &self,
        work_dir: &TempDir,
        mut archive: NamedTempFile,
    ) -> Result<Vec<SegmentReport>, CollectError> {
        let mut reports = Vec::new();
        for segment in self.segments() {
            reports.push(self.collect_segment(work_dir.path(), &segment).await?);
        }

        let path = self.archive_path();
        let gz_name = format!("{} market data", self.cmd.symbol);
        let writer = write_tar_gz(work_dir.path(), BufWriter::new(archive.as_file_mut()), &gz_name)
            .context(BuildArchiveSnafu { path: &path })?;
        writer
            .into_inner()
            .map_err(|err| err.into_error())
            .context(FinishArchiveSnafu { path: &path })?;
        archive
            .as_file()
            .sync_all()
            .context(FinishArchiveSnafu { path: &path })?;
        archive
            .persist(&path)
            .context(PersistArchiveSnafu { path: &path })?;

        Ok(reports)
    }

    async fn collect_segment(
        &self,
        work_dir: &Path,
        segment: &YearSegment,
    ) -> Result<SegmentReport, CollectError> {
        let cmd = &self.cmd;
        let started = Instant::now();

        let span = TimeSpan::new(
            zoned(segment.start, &cmd.time_zone)?,
            zoned(segment.end, &cmd.time_zone)?,
        );
        let bars = cmd
            .provider
            .fetch_bars(BarsRequestParams {
                symbol: cmd.symbol.clone(),
                timeframe: cmd.timeframe,
                span,
            })
            .await
            .context(FetchSnafu {
                symbol: &cmd.symbol,
                year: segment.year(),
            })?;

        let elapsed = started.elapsed();
        info!(
            symbol = %cmd.symbol,
            time_sec = elapsed.as_secs_f64(),
            start = %segment.start,
            end = %segment.end,
            count = bars.len(),
            "collected bars"
        );

        let file_name = segment.file_name(&cmd.symbol);
        let path = work_dir.join(&file_name);
        let file = File::create(&path).context(CreateSegmentFileSnafu { path: &path })?;
        let mut w = BufWriter::new(file);
        store_bars(&mut w, &bars).context(StoreSegmentSnafu { path: &path })?;
        w.flush().context(FlushSegmentSnafu { path: &path })?;

        info!(file = %file_name, "stored bars");

        Ok(SegmentReport {
            year: segment.year(),
            start: segment.start,
            end: segment.end,
            file_name,
            bar_count: bars.len(),
            elapsed,
        })
    }
}

fn zoned(date: NaiveDate, tz: &Tz) -> Result<DateTime<FixedOffset>, CollectError> {
    start_of_day(date, tz)
        .map(|t| t.fixed_offset())
        .context(LocalTimeSnafu {
            date,
            tz: tz.name(),
        })
}

fn remove_work_dir(work_dir: TempDir) {
    let path = work_dir.path().to_path_buf();
    if let Err(err) = work_dir.close() {
        warn!(dir = %path.display(), error = %err, "failed to remove work dir");
    }
}
