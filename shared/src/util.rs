use chrono::NaiveDate;

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a client-side document ID (UUID v4, hyphenated).
///
/// IDs are created on the device before the first write so that the same
/// document can be upserted repeatedly without the store assigning a key.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Parse an ISO-8601 calendar date (`YYYY-MM-DD`).
///
/// Surrounding whitespace is ignored. Anything else (times, other formats,
/// empty strings) yields `None`.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Format a date as `YYYY-MM-DD`
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier)
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("2024-06-01"), Some(date(2024, 6, 1)));
        assert_eq!(parse_iso_date(" 2024-06-01 "), Some(date(2024, 6, 1)));
        assert_eq!(parse_iso_date("2024-02-30"), None);
        assert_eq!(parse_iso_date("01/06/2024"), None);
        assert_eq!(parse_iso_date("2024-06-01T10:00:00"), None);
        assert_eq!(parse_iso_date(""), None);
    }

    #[test]
    fn test_days_between_crosses_month_and_leap_day() {
        assert_eq!(days_between(date(2024, 2, 28), date(2024, 3, 1)), 2);
        assert_eq!(days_between(date(2024, 3, 1), date(2024, 2, 28)), -2);
        assert_eq!(days_between(date(2024, 6, 1), date(2024, 6, 1)), 0);
    }

    #[test]
    fn test_new_id_is_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
