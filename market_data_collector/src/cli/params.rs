use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}

pub fn parse_time_zone(s: &str) -> Result<Tz, String> {
    s.trim()
        .parse::<Tz>()
        .map_err(|e| format!("unknown time zone '{s}': {e}"))
}

/// Today's calendar date in `tz`.
pub fn today_in(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}
