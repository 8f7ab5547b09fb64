//! Newline-delimited JSON encoding of [`Bars`], one [`Bar`] object per line.

use std::io::{BufRead, Write};

use thiserror::Error;

use crate::models::{bar::Bar, bars::Bars};

#[derive(Debug, Error)]
pub enum NdjsonError {
    #[error("failed to encode bar {index}: {source}")]
    Encode {
        index: usize,
        source: serde_json::Error,
    },

    #[error("failed to encode bar {index}: {field} is not a finite number")]
    NonFinite { index: usize, field: &'static str },

    #[error("failed to write bar {index}: {source}")]
    Write {
        index: usize,
        source: std::io::Error,
    },

    #[error("failed to decode bar on line {line}: {source}")]
    Decode {
        line: usize,
        source: serde_json::Error,
    },

    #[error("failed to read NDJSON at line {line}: {source}")]
    Read {
        line: usize,
        source: std::io::Error,
    },
}

/// Writes `bars` to `w` in their current order.
///
/// Each record is encoded in full before any of it is written, so a failed encode
/// never leaves half a line behind. NaN and infinite prices are rejected since JSON
/// cannot carry them. Callers own flushing.
pub fn store_bars<W: Write>(mut w: W, bars: &Bars) -> Result<(), NdjsonError> {
    let mut line = Vec::with_capacity(128);
    for (index, bar) in bars.iter().enumerate() {
        if let Some(field) = non_finite_field(bar) {
            return Err(NdjsonError::NonFinite { index, field });
        }
        line.clear();
        serde_json::to_writer(&mut line, bar)
            .map_err(|source| NdjsonError::Encode { index, source })?;
        line.push(b'\n');
        w.write_all(&line)
            .map_err(|source| NdjsonError::Write { index, source })?;
    }
    Ok(())
}

fn non_finite_field(bar: &Bar) -> Option<&'static str> {
    let [o, h, l, c] = bar.ohlc.values();
    [("vw", bar.vwap), ("o", o), ("h", h), ("l", l), ("c", c)]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(field, _)| field)
}

/// Reads bars written by [`store_bars`]. Blank lines are skipped; `line` in errors is 1-based.
pub fn load_bars<R: BufRead>(r: R) -> Result<Bars, NdjsonError> {
    let mut bars = Bars::new();
    for (i, line) in r.lines().enumerate() {
        let line_no = i + 1;
        let line = line.map_err(|source| NdjsonError::Read {
            line: line_no,
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let bar: Bar = serde_json::from_str(&line).map_err(|source| NdjsonError::Decode {
            line: line_no,
            source,
        })?;
        bars.push(bar);
    }
    Ok(bars)
}
