//! Boarding time handling.
//!
//! Clients send the minimum boarding time either as a full RFC 3339
//! timestamp or as a wall-clock "HH:MM" string from a time picker. Both are
//! resolved to a `DateTime<Utc>` before the store is queried, so the
//! departure comparison is always between structured instants.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Build the service-zone offset from a number of minutes east of UTC.
///
/// # Examples
///
/// ```
/// use bus_server::domain::service_offset;
///
/// let ist = service_offset(330).unwrap();
/// assert_eq!(ist.local_minus_utc(), 330 * 60);
///
/// assert!(service_offset(24 * 60).is_err());
/// ```
pub fn service_offset(minutes_east: i32) -> Result<FixedOffset, TimeError> {
    minutes_east
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| TimeError::new("offset must be within +/-23:59"))
}

/// Parse a wall-clock time in "HH:MM" or "HH:MM:SS" format.
///
/// # Examples
///
/// ```
/// use bus_server::domain::parse_wall_clock;
///
/// assert!(parse_wall_clock("00:00").is_ok());
/// assert!(parse_wall_clock("23:59:59").is_ok());
///
/// assert!(parse_wall_clock("0830").is_err());
/// assert!(parse_wall_clock("8:30").is_err());
/// assert!(parse_wall_clock("24:00").is_err());
/// ```
pub fn parse_wall_clock(s: &str) -> Result<NaiveTime, TimeError> {
    let bytes = s.as_bytes();

    if bytes.len() != 5 && bytes.len() != 8 {
        return Err(TimeError::new("expected HH:MM or HH:MM:SS format"));
    }

    if bytes[2] != b':' {
        return Err(TimeError::new("expected colon at position 2"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new("hour must be 0-23"));
    }

    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new("invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }

    let second = if bytes.len() == 8 {
        if bytes[5] != b':' {
            return Err(TimeError::new("expected colon at position 5"));
        }
        let second = parse_two_digits(&bytes[6..8])
            .ok_or_else(|| TimeError::new("invalid second digits"))?;
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        second
    } else {
        0
    };

    NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| TimeError::new("invalid time"))
}

/// Resolve a boarding time to an instant.
///
/// RFC 3339 input carries its own offset and is used as-is. Wall-clock
/// input is placed on `service_date` in the `offset` zone.
///
/// # Examples
///
/// ```
/// use bus_server::domain::{parse_boarding_time, service_offset};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// let ist = service_offset(330).unwrap();
///
/// let wall = parse_boarding_time("08:30", date, ist).unwrap();
/// let full = parse_boarding_time("2026-10-18T08:30:00+05:30", date, ist).unwrap();
/// assert_eq!(wall, full);
/// assert_eq!(wall.to_rfc3339(), "2026-10-18T03:00:00+00:00");
/// ```
pub fn parse_boarding_time(
    s: &str,
    service_date: NaiveDate,
    offset: FixedOffset,
) -> Result<DateTime<Utc>, TimeError> {
    // Wall-clock input is at most "HH:MM:SS"
    if s.len() > 8 {
        return DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| TimeError::new("expected RFC 3339 timestamp"));
    }

    let time = parse_wall_clock(s)?;
    offset
        .from_local_datetime(&service_date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| TimeError::new("time does not exist in service zone"))
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_valid_wall_clock() {
        let t = parse_wall_clock("00:00").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (0, 0, 0));

        let t = parse_wall_clock("14:30").unwrap();
        assert_eq!((t.hour(), t.minute()), (14, 30));

        let t = parse_wall_clock("23:59:58").unwrap();
        assert_eq!((t.hour(), t.minute(), t.second()), (23, 59, 58));
    }

    #[test]
    fn parse_invalid_wall_clock() {
        // Wrong length
        assert!(parse_wall_clock("1430").is_err());
        assert!(parse_wall_clock("14:3").is_err());
        assert!(parse_wall_clock("14:300").is_err());

        // Separators
        assert!(parse_wall_clock("14-30").is_err());
        assert!(parse_wall_clock("14:30-00").is_err());

        // Ranges
        assert!(parse_wall_clock("24:00").is_err());
        assert!(parse_wall_clock("12:60").is_err());
        assert!(parse_wall_clock("12:00:60").is_err());

        // Non-digits
        assert!(parse_wall_clock("ab:cd").is_err());
        assert!(parse_wall_clock("1a:30").is_err());
    }

    #[test]
    fn wall_clock_uses_service_date_and_offset() {
        let ist = service_offset(330).unwrap();
        let t = parse_boarding_time("00:15", date(2026, 10, 18), ist).unwrap();

        // 00:15 IST is 18:45 UTC on the previous day
        assert_eq!(t.date_naive(), date(2026, 10, 17));
        assert_eq!((t.hour(), t.minute()), (18, 45));
    }

    #[test]
    fn rfc3339_ignores_service_date() {
        let utc = service_offset(0).unwrap();
        let t = parse_boarding_time("2026-01-02T09:00:00Z", date(2030, 5, 5), utc).unwrap();
        assert_eq!(t.date_naive(), date(2026, 1, 2));
        assert_eq!(t.hour(), 9);
    }

    #[test]
    fn rfc3339_with_space_separator() {
        let utc = service_offset(0).unwrap();
        let spaced =
            parse_boarding_time("2026-10-18 08:30:00+05:30", date(2026, 1, 1), utc).unwrap();
        let with_t =
            parse_boarding_time("2026-10-18T08:30:00+05:30", date(2026, 1, 1), utc).unwrap();
        assert_eq!(spaced, with_t);
        assert_eq!((spaced.hour(), spaced.minute()), (3, 0));
    }

    #[test]
    fn malformed_rfc3339_rejected() {
        let utc = service_offset(0).unwrap();
        let err = parse_boarding_time("2026-13-02T09:00", date(2026, 1, 1), utc).unwrap_err();
        assert_eq!(err.to_string(), "invalid time: expected RFC 3339 timestamp");
    }

    #[test]
    fn offset_bounds() {
        assert!(service_offset(0).is_ok());
        assert!(service_offset(-(23 * 60 + 59)).is_ok());
        assert!(service_offset(23 * 60 + 59).is_ok());
        assert!(service_offset(24 * 60).is_err());
        assert!(service_offset(i32::MAX).is_err());
    }
}
