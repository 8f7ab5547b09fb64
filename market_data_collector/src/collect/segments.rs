//! Splits a date range into calendar-year segments.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, TimeZone};

/// One calendar year's share of a collection, as the half-open date range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearSegment {
    pub start: NaiveDate,
    /// Exclusive. January 1 of the next year, or the day after the overall end date.
    pub end: NaiveDate,
}

impl YearSegment {
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Name of the NDJSON file holding this segment, e.g. `AAPL-2023.ndjson`.
    pub fn file_name(&self, symbol: &str) -> String {
        format!("{symbol}-{}.ndjson", self.year())
    }
}

/// Partitions the inclusive date range `[start, end]` into contiguous segments that each
/// stay inside one calendar year. Whole years come first, then the remainder up to and
/// including `end`. Empty when `start > end`.
pub fn year_segments(start: NaiveDate, end: NaiveDate) -> Vec<YearSegment> {
    let mut segments = Vec::new();
    let mut current = start;

    while end.year() > current.year() {
        let Some(next_year) = NaiveDate::from_ymd_opt(current.year() + 1, 1, 1) else {
            break;
        };
        segments.push(YearSegment {
            start: current,
            end: next_year,
        });
        current = next_year;
    }

    if current <= end {
        segments.push(YearSegment {
            start: current,
            end: end.checked_add_days(Days::new(1)).unwrap_or(end),
        });
    }

    segments
}

/// The first instant of `date` in `tz`.
///
/// Ambiguous midnights resolve to the earlier instant. Where midnight does not exist
/// (a DST jump at 00:00) the next valid minute is used, searching up to two hours ahead.
pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(t) = tz.from_local_datetime(&midnight).earliest() {
        return Some(t);
    }
    (1..=120)
        .map(|m| midnight + TimeDelta::minutes(m))
        .find_map(|t| tz.from_local_datetime(&t).earliest())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn single_full_year() {
        let segments = year_segments(d(2023, 1, 1), d(2023, 12, 31));
        assert_eq!(
            segments,
            vec![YearSegment {
                start: d(2023, 1, 1),
                end: d(2024, 1, 1)
            }]
        );
        assert_eq!(segments[0].file_name("ABC"), "ABC-2023.ndjson");
    }

    #[test]
    fn partial_years_on_both_ends() {
        let segments = year_segments(d(2022, 6, 15), d(2024, 2, 10));
        assert_eq!(
            segments,
            vec![
                YearSegment {
                    start: d(2022, 6, 15),
                    end: d(2023, 1, 1)
                },
                YearSegment {
                    start: d(2023, 1, 1),
                    end: d(2024, 1, 1)
                },
                YearSegment {
                    start: d(2024, 1, 1),
                    end: d(2024, 2, 11)
                },
            ]
        );
    }

    #[test]
    fn single_day_and_new_years_day() {
        assert_eq!(year_segments(d(2024, 3, 5), d(2024, 3, 5)).len(), 1);

        let segments = year_segments(d(2023, 12, 31), d(2024, 1, 1));
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].start, d(2024, 1, 1));
        assert_eq!(segments[1].end, d(2024, 1, 2));
    }

    #[test]
    fn inverted_range_is_empty() {
        assert!(year_segments(d(2024, 1, 2), d(2024, 1, 1)).is_empty());
    }

    #[test]
    fn start_of_day_in_new_york() {
        let t = start_of_day(d(2024, 7, 4), &chrono_tz::America::New_York).unwrap();
        assert_eq!(t.hour(), 0);
        assert_eq!(t.fixed_offset().offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn start_of_day_skips_missing_midnight() {
        // Santiago springs forward at 00:00, so 2023-09-03 starts at 01:00 local.
        let t = start_of_day(d(2023, 9, 3), &chrono_tz::America::Santiago).unwrap();
        assert_eq!(t.date_naive(), d(2023, 9, 3));
        assert_eq!(t.hour(), 1);
    }

    proptest! {
        #[test]
        fn segments_tile_the_range(
            start_offset in 0u64..20_000,
            len in 0u64..3_000,
        ) {
            let start = d(1990, 1, 1) + Days::new(start_offset);
            let end = start + Days::new(len);
            let segments = year_segments(start, end);

            prop_assert_eq!(segments.len() as i32, end.year() - start.year() + 1);
            prop_assert_eq!(segments[0].start, start);
            prop_assert_eq!(segments.last().unwrap().end, end + Days::new(1));
            for pair in segments.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
            for s in &segments {
                prop_assert!(s.start < s.end);
                prop_assert_eq!(s.start.year(), (s.end - Days::new(1)).year());
            }
        }
    }
}
