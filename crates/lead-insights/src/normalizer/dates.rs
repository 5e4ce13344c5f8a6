//! Timestamp parsing for date cells.
//!
//! Spreadsheet cells arrive as formatted strings. Values carrying an offset
//! are exact. An ISO date without a time (`2024-05-15`) is midnight UTC.
//! Every other form has no zone of its own and is read as wall-clock time in
//! the zone the dashboard is evaluated in.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const LOCAL_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%B %d, %Y", "%d %B %Y", "%Y/%m/%d"];

/// Parse a date cell into a UTC timestamp, reading zone-less values in `tz`.
///
/// Returns `None` for blank or unrecognized values.
pub fn parse_timestamp<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT) {
        return Some(date.and_time(NaiveTime::MIN).and_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(local_to_utc(tz, naive));
        }
    }

    for format in LOCAL_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(local_to_utc(tz, date.and_time(NaiveTime::MIN)));
        }
    }

    None
}

/// Convert a wall-clock time in `tz` to UTC. Ambiguous times take the
/// earlier instant; times skipped by a DST jump are read as UTC.
pub(crate) fn local_to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn minus_five() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    #[test]
    fn test_iso_date_is_utc_midnight() {
        assert_eq!(parse_timestamp("2024-01-05", &Utc), Some(utc(2024, 1, 5, 0, 0, 0)));
        assert_eq!(
            parse_timestamp("2024-01-05", &minus_five()),
            Some(utc(2024, 1, 5, 0, 0, 0))
        );
    }

    #[test]
    fn test_rfc3339_with_offset() {
        assert_eq!(
            parse_timestamp("2024-01-05T10:30:00+02:00", &minus_five()),
            Some(utc(2024, 1, 5, 8, 30, 0))
        );
        assert_eq!(
            parse_timestamp("2024-01-05T10:30:00.250Z", &Utc).map(|dt| dt.timestamp_millis()),
            Some(utc(2024, 1, 5, 10, 30, 0).timestamp_millis() + 250)
        );
    }

    #[test]
    fn test_naive_datetime_forms() {
        assert_eq!(
            parse_timestamp("2024-01-05 14:03:09", &Utc),
            Some(utc(2024, 1, 5, 14, 3, 9))
        );
        assert_eq!(
            parse_timestamp("2024-01-05T14:03", &Utc),
            Some(utc(2024, 1, 5, 14, 3, 0))
        );
        assert_eq!(
            parse_timestamp("1/5/2024 9:15:00", &Utc),
            Some(utc(2024, 1, 5, 9, 15, 0))
        );
    }

    #[test]
    fn test_naive_values_use_evaluation_zone() {
        let tz = minus_five();
        assert_eq!(
            parse_timestamp("2024-05-15 02:00:00", &tz),
            Some(utc(2024, 5, 15, 7, 0, 0))
        );
        assert_eq!(parse_timestamp("05/13/2024", &tz), Some(utc(2024, 5, 13, 5, 0, 0)));
        assert_eq!(parse_timestamp("Jan 5, 2024", &tz), Some(utc(2024, 1, 5, 5, 0, 0)));
    }

    #[test]
    fn test_us_and_named_month_dates() {
        assert_eq!(parse_timestamp("01/05/2024", &Utc), Some(utc(2024, 1, 5, 0, 0, 0)));
        assert_eq!(parse_timestamp("1/5/2024", &Utc), Some(utc(2024, 1, 5, 0, 0, 0)));
        assert_eq!(parse_timestamp("Jan 5, 2024", &Utc), Some(utc(2024, 1, 5, 0, 0, 0)));
        assert_eq!(
            parse_timestamp("January 5, 2024", &Utc),
            Some(utc(2024, 1, 5, 0, 0, 0))
        );
    }

    #[test]
    fn test_blank_and_garbage() {
        assert_eq!(parse_timestamp("", &Utc), None);
        assert_eq!(parse_timestamp("   ", &Utc), None);
        assert_eq!(parse_timestamp("next tuesday", &Utc), None);
        assert_eq!(parse_timestamp("2024-13-40", &Utc), None);
    }
}
