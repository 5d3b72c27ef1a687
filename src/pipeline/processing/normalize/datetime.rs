use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::constants::{ISO_DATE_FORMAT, TIME_OF_DAY_FORMAT};

/// Date-time layouts without an offset, as typed into the sheet or exported
/// by apps script when the cell is not a real date value
const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S%.f", "%I:%M %p", "%I:%M:%S %p", "%I:%M%p"];

/// Calendar date of a raw date cell.
///
/// Timestamps carrying an offset are read as a point in time and reduced to
/// their UTC date, which is how the sheet endpoint serializes date cells.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| DATE_FORMATS.iter().find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok()))
}

/// Time of day of a raw time cell. Timestamps with an offset are shifted into
/// `display_offset` first; naive values are taken as already local.
pub fn parse_time(raw: &str, display_offset: &FixedOffset) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(display_offset).time());
    }

    if let Some(dt) = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.time());
    }

    // %p only matches upper-case meridiem markers reliably
    let upper = raw.to_ascii_uppercase();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&upper, fmt).ok())
}

/// `YYYY-MM-DD`, or the raw value unchanged when it is not a date
pub fn normalize_date(raw: &str) -> (String, bool) {
    match parse_date(raw) {
        Some(date) => (date.format(ISO_DATE_FORMAT).to_string(), true),
        None => (raw.to_string(), false),
    }
}

/// `HH:mm`, or the raw value unchanged when it is not a time
pub fn normalize_time(raw: &str, display_offset: &FixedOffset) -> (String, bool) {
    match parse_time(raw, display_offset) {
        Some(time) => (time.format(TIME_OF_DAY_FORMAT).to_string(), true),
        None => (raw.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_parse_date_accepts_sheet_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 10);
        assert_eq!(parse_date("2024-03-10T18:30:00.000Z"), expected);
        assert_eq!(parse_date("2024-03-10"), expected);
        assert_eq!(parse_date("2024-03-10 07:15:00"), expected);
        assert_eq!(parse_date("03/10/2024"), expected);
        assert_eq!(parse_date("2024/03/10"), expected);
    }

    #[test]
    fn test_parse_date_uses_utc_calendar_day() {
        // 01:00 at +05:30 is still the previous day in UTC
        assert_eq!(
            parse_date("2024-03-10T01:00:00+05:30"),
            NaiveDate::from_ymd_opt(2024, 3, 9)
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date("next tuesday"), None);
        assert_eq!(parse_date("2024-13-45"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_time_layouts() {
        let expected = NaiveTime::from_hms_opt(14, 5, 0);
        assert_eq!(parse_time("14:05", &utc()), expected);
        assert_eq!(parse_time("14:05:00", &utc()), expected);
        assert_eq!(parse_time("2:05 pm", &utc()), expected);
        assert_eq!(parse_time("1899-12-30T14:05:00.000Z", &utc()), expected);
    }

    #[test]
    fn test_parse_time_applies_display_offset() {
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        assert_eq!(
            parse_time("2024-03-10T08:30:00Z", &ist),
            NaiveTime::from_hms_opt(14, 0, 0)
        );
    }

    #[test]
    fn test_normalize_keeps_raw_on_failure() {
        assert_eq!(normalize_date("unknown"), ("unknown".to_string(), false));
        assert_eq!(normalize_time("after lunch", &utc()), ("after lunch".to_string(), false));
    }
}
