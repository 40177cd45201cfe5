//! Timestamp and period helpers.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Current UTC time in the stored ISO-8601 form (`2025-01-31T12:00:00.000Z`).
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current UTC calendar date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// First day of the calendar month containing `date`.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Parse a `YYYY-MM-DD` period marker or date field.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Whether `raw` is an RFC 3339 timestamp or a zone-less
/// `YYYY-MM-DD[T ]HH:MM:SS[.fff]` one.
pub fn is_timestamp(raw: &str) -> bool {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw).is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").is_ok()
}

/// Render a stored timestamp as ISO-8601.
///
/// Values already in ISO form pass through. SQLite's `datetime()` form
/// (`YYYY-MM-DD HH:MM:SS`) is rewritten with a `T` separator. Anything
/// else is returned unchanged.
pub fn render_timestamp(raw: &str) -> String {
    if raw.contains('T') {
        return raw.to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        Ok(parsed) => parsed.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_of_month() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        assert_eq!(
            first_of_month(date),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_render_timestamp() {
        assert_eq!(
            render_timestamp("2025-01-02T03:04:05.006Z"),
            "2025-01-02T03:04:05.006Z"
        );
        assert_eq!(render_timestamp("2025-01-02 03:04:05"), "2025-01-02T03:04:05");
        assert_eq!(render_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2025-03-01"), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(parse_date("soon").is_none());
        assert!(parse_date("2025-02-30").is_none());
        assert!(parse_date("2025-03-01T00:00:00Z").is_none());
    }

    #[test]
    fn test_is_timestamp() {
        assert!(is_timestamp("2025-01-02T03:04:05.006Z"));
        assert!(is_timestamp("2025-01-02T03:04:05+02:00"));
        assert!(is_timestamp("2025-01-02 03:04:05"));
        assert!(is_timestamp(&now_iso()));
        assert!(!is_timestamp("2025-01-02"));
        assert!(!is_timestamp("later"));
    }

    #[test]
    fn test_now_iso_shape() {
        let now = now_iso();
        assert!(now.ends_with('Z'));
        assert_eq!(now.len(), "2025-01-02T03:04:05.006Z".len());
    }
}
