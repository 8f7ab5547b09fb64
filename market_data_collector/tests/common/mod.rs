#![allow(dead_code)]

use std::{
    fs,
    io::Read,
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::TimeDelta;
use flate2::read::GzDecoder;
use market_data_collector::{
    io::ndjson::load_bars,
    models::{
        bar::Bar, bars::Bars, ohlc::Ohlc, request_params::BarsRequestParams,
        time_span::TimeSpan,
    },
    providers::{DataProvider, InternalSnafu, ProviderError},
};

/// Returns three one-minute bars from 09:30 after the start of every requested window
/// and records each request. Optionally fails the n-th call (1-based).
#[derive(Default)]
pub struct StubProvider {
    calls: Mutex<Vec<BarsRequestParams>>,
    fail_on_call: Option<usize>,
}

impl StubProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_on(call: usize) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_on_call: Some(call),
        })
    }

    pub fn calls(&self) -> Vec<BarsRequestParams> {
        self.calls.lock().unwrap().clone()
    }

    pub fn bars_for(span: &TimeSpan) -> Bars {
        let open = span.start + TimeDelta::minutes(9 * 60 + 30);
        (0..3)
            .map(|i| {
                let px = 100.0 + i as f64;
                Bar::new(
                    open + TimeDelta::minutes(i),
                    1_000 * (i as u64 + 1),
                    10 + i as u64,
                    px + 0.05,
                    Ohlc::new(px, px + 0.5, px - 0.5, px + 0.25),
                )
            })
            .collect()
    }
}

#[async_trait]
impl DataProvider for StubProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<Bars, ProviderError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(params.clone());
            calls.len()
        };
        if self.fail_on_call == Some(call) {
            return InternalSnafu {
                message: format!("stub failure on call {call}"),
            }
            .fail();
        }
        Ok(Self::bars_for(&params.span))
    }
}

/// Unpacks a tar.gz into `(entry name, bars)` pairs in archive order, plus the gzip
/// header's file name.
pub fn read_archive(path: &Path) -> (Vec<(String, Bars)>, Option<String>) {
    let bytes = fs::read(path).unwrap();
    let mut decoder = GzDecoder::new(bytes.as_slice());
    let mut tar_bytes = Vec::new();
    decoder.read_to_end(&mut tar_bytes).unwrap();
    let gz_name = decoder
        .header()
        .and_then(|h| h.filename())
        .map(|n| String::from_utf8_lossy(n).into_owned());

    let mut archive = tar::Archive::new(tar_bytes.as_slice());
    let mut entries = Vec::new();
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let name = entry.path().unwrap().to_string_lossy().into_owned();
        let mut body = Vec::new();
        entry.read_to_end(&mut body).unwrap();
        entries.push((name, load_bars(body.as_slice()).unwrap()));
    }
    (entries, gz_name)
}

pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
