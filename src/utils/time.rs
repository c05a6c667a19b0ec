use crate::error::{parse_error, ShiftResult};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Basic ICS UTC date-time format, e.g. `20251201T080000Z`
pub const ICS_DATETIME_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Parse an ICS UTC date-time like `20251201T080000Z`
pub fn parse_ics_datetime(value: &str) -> ShiftResult<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, ICS_DATETIME_FORMAT)
        .map_err(|e| parse_error(&format!("Invalid ICS date-time '{}': {}", value, e)))?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Format a UTC instant in the basic ICS UTC format
pub fn format_ics_datetime(dt: &DateTime<Utc>) -> String {
    dt.format(ICS_DATETIME_FORMAT).to_string()
}

/// Parse an IANA time zone name such as `Europe/Dublin`
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Format an instant as HH:MM (24h) in the given zone
pub fn format_local_time(dt: &DateTime<Utc>, tz: &Tz) -> String {
    dt.with_timezone(tz).format("%H:%M").to_string()
}

/// Format an instant as `YYYY-MM-DD HH:MM:SS` in UTC
pub fn format_utc_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_ics_datetime() {
        let dt = parse_ics_datetime("20251201T080000Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 12, 1, 8, 0, 0).unwrap());

        // Invalid cases
        assert!(parse_ics_datetime("20251201T080000").is_err()); // Missing Z
        assert!(parse_ics_datetime("20251201").is_err()); // Date only
        assert!(parse_ics_datetime("2025-12-01T08:00:00Z").is_err()); // Extended format
        assert!(parse_ics_datetime("20251301T080000Z").is_err()); // Month out of range
        assert!(parse_ics_datetime("").is_err());
    }

    #[test]
    fn test_format_ics_datetime() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_ics_datetime(&dt), "20250102T030405Z");
        assert_eq!(parse_ics_datetime(&format_ics_datetime(&dt)).unwrap(), dt);
    }

    #[test]
    fn test_format_local_time() {
        let dt = Utc.with_ymd_and_hms(2025, 7, 1, 16, 30, 0).unwrap();

        let helsinki = parse_timezone("Europe/Helsinki").unwrap();
        assert_eq!(format_local_time(&dt, &helsinki), "19:30");

        let utc = parse_timezone("UTC").unwrap();
        assert_eq!(format_local_time(&dt, &utc), "16:30");

        assert!(parse_timezone("Not/AZone").is_none());
    }

    #[test]
    fn test_format_utc_timestamp() {
        let dt = Utc.with_ymd_and_hms(2025, 7, 1, 6, 5, 9).unwrap();
        assert_eq!(format_utc_timestamp(&dt), "2025-07-01 06:05:09");
    }
}
