use std::fmt;

use chrono::{DateTime, FixedOffset};

/// A closed interval between two instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeSpan {
    /// Builds a span, ordering the two endpoints so that `start <= end`.
    pub fn new(a: DateTime<FixedOffset>, b: DateTime<FixedOffset>) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn contains(&self, t: &DateTime<FixedOffset>) -> bool {
        self.start <= *t && *t <= self.end
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
