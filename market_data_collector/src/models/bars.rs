//! An ordered collection of [`Bar`]s with time-indexed lookup.
//!
//! A [`Bars`] is expected to be sorted ascending by timestamp. That order comes from
//! the provider (or from the file it was loaded from) and is never re-checked; the
//! binary search and the slicing helpers assume it.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

use crate::models::{bar::Bar, ohlc::Ohlc, time_span::TimeSpan};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bars(Vec<Bar>);

impl Bars {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.0.get(index)
    }

    pub fn push(&mut self, bar: Bar) {
        self.0.push(bar);
    }

    pub fn into_vec(self) -> Vec<Bar> {
        self.0
    }

    /// Index of the first bar stamped exactly `t`, scanning from the front.
    pub fn index_forward(&self, t: &DateTime<FixedOffset>) -> Option<usize> {
        self.0.iter().position(|bar| bar.timestamp == *t)
    }

    /// Index of the last bar stamped exactly `t`, scanning from the back.
    pub fn index_reverse(&self, t: &DateTime<FixedOffset>) -> Option<usize> {
        self.0.iter().rposition(|bar| bar.timestamp == *t)
    }

    /// Binary search by timestamp.
    ///
    /// `Ok(i)` holds the index of a matching bar (any one of them when stamps repeat),
    /// `Err(i)` the position where a bar stamped `t` would be inserted.
    pub fn binary_search(&self, t: &DateTime<FixedOffset>) -> Result<usize, usize> {
        self.0.binary_search_by(|bar| bar.timestamp.cmp(t))
    }

    pub fn last(&self) -> Option<&Bar> {
        self.0.last()
    }

    /// The final `n` bars, or all of them when there are fewer than `n`.
    pub fn last_n(&self, n: usize) -> &[Bar] {
        let start = self.0.len().saturating_sub(n);
        &self.0[start..]
    }

    /// Up to `n` bars strictly after `index`. Empty when `index` is out of bounds.
    pub fn next_n(&self, index: usize, n: usize) -> &[Bar] {
        if index >= self.0.len() {
            return &[];
        }
        let start = index + 1;
        let end = start.saturating_add(n).min(self.0.len());
        &self.0[start..end]
    }

    /// Converts every timestamp to the machine's local time zone.
    pub fn localize(&mut self) {
        self.0.iter_mut().for_each(Bar::localize);
    }

    /// Converts every timestamp to `tz`.
    pub fn localize_to<Tz: TimeZone>(&mut self, tz: &Tz) {
        for bar in &mut self.0 {
            bar.localize_to(tz);
        }
    }

    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<FixedOffset>> + '_ {
        self.0.iter().map(|bar| bar.timestamp)
    }

    pub fn close_prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(Bar::close)
    }

    pub fn vwaps(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().map(|bar| bar.vwap)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.iter().map(Bar::date)
    }

    /// Heikin-Ashi candles for the whole series.
    ///
    /// The first candle is seeded with its own raw OHLC as the previous candle.
    pub fn heikin_ashi(&self) -> Vec<Ohlc> {
        let mut out: Vec<Ohlc> = Vec::with_capacity(self.0.len());
        for bar in &self.0 {
            let prev = out.last().copied().unwrap_or(bar.ohlc);
            out.push(bar.heikin_ashi(&prev));
        }
        out
    }

    /// Earliest and latest timestamps, found by a full scan so unsorted input works too.
    ///
    /// `None` for an empty collection.
    pub fn time_span(&self) -> Option<TimeSpan> {
        let mut stamps = self.timestamps();
        let first = stamps.next()?;
        let (min, max) = stamps.fold((first, first), |(min, max), t| (min.min(t), max.max(t)));
        Some(TimeSpan::new(min, max))
    }
}

impl From<Vec<Bar>> for Bars {
    fn from(bars: Vec<Bar>) -> Self {
        Self(bars)
    }
}

impl FromIterator<Bar> for Bars {
    fn from_iter<I: IntoIterator<Item = Bar>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Bar> for Bars {
    fn extend<I: IntoIterator<Item = Bar>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for Bars {
    type Item = Bar;
    type IntoIter = std::vec::IntoIter<Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Bars {
    type Item = &'a Bar;
    type IntoIter = std::slice::Iter<'a, Bar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for Bars {
    type Output = Bar;

    fn index(&self, index: usize) -> &Bar {
        &self.0[index]
    }
}
