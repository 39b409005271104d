//! Input validation for trip searches.
//!
//! Validation runs before any store access. It checks presence of every
//! field, that origin and destination differ, and that the boarding time
//! parses. It does not check that the stops exist: an unknown stop simply
//! matches no trips.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::domain::{StopId, parse_boarding_time};

use super::error::{Field, ValidationError};

/// A validated trip search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    origin: StopId,
    destination: StopId,
    min_departure: DateTime<Utc>,
}

impl SearchRequest {
    /// Create a search request from already-typed values.
    ///
    /// Fails with `IdenticalStops` if origin and destination are equal.
    pub fn new(
        origin: StopId,
        destination: StopId,
        min_departure: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if origin == destination {
            return Err(ValidationError::IdenticalStops(origin));
        }
        Ok(Self {
            origin,
            destination,
            min_departure,
        })
    }

    pub fn origin(&self) -> &StopId {
        &self.origin
    }

    pub fn destination(&self) -> &StopId {
        &self.destination
    }

    /// Earliest acceptable departure.
    pub fn min_departure(&self) -> DateTime<Utc> {
        self.min_departure
    }
}

/// Validate raw search input.
///
/// Fields are trimmed before use. Checks run in order: presence of all
/// three fields, then distinct stops, then boarding-time format. The first
/// failure is returned.
///
/// Wall-clock boarding times are placed on `service_date` in `offset`.
///
/// # Examples
///
/// ```
/// use bus_server::search::{Field, ValidationError, validate};
/// use chrono::{FixedOffset, NaiveDate};
///
/// let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
/// let utc = FixedOffset::east_opt(0).unwrap();
///
/// let req = validate(Some(" S1 "), Some("S2"), Some("08:30"), date, utc).unwrap();
/// assert_eq!(req.origin().as_str(), "S1");
///
/// let err = validate(Some("S1"), Some(""), Some("08:30"), date, utc).unwrap_err();
/// assert_eq!(err, ValidationError::MissingField(Field::ToStop));
/// ```
pub fn validate(
    from_stop: Option<&str>,
    to_stop: Option<&str>,
    boarding_time: Option<&str>,
    service_date: NaiveDate,
    offset: FixedOffset,
) -> Result<SearchRequest, ValidationError> {
    let from_stop = required(from_stop, Field::FromStop)?;
    let to_stop = required(to_stop, Field::ToStop)?;
    let boarding_time = required(boarding_time, Field::BoardingTime)?;

    let origin =
        StopId::parse(from_stop).map_err(|_| ValidationError::MissingField(Field::FromStop))?;
    let destination =
        StopId::parse(to_stop).map_err(|_| ValidationError::MissingField(Field::ToStop))?;

    if origin == destination {
        return Err(ValidationError::IdenticalStops(origin));
    }

    let min_departure =
        parse_boarding_time(boarding_time, service_date, offset).map_err(|source| {
            ValidationError::InvalidFormat {
                field: Field::BoardingTime,
                source,
            }
        })?;

    SearchRequest::new(origin, destination, min_departure)
}

/// Returns the trimmed value, or `MissingField` if it is absent or blank.
fn required(value: Option<&str>, field: Field) -> Result<&str, ValidationError> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn check(
        from: Option<&str>,
        to: Option<&str>,
        time: Option<&str>,
    ) -> Result<SearchRequest, ValidationError> {
        validate(from, to, time, date(), utc())
    }

    #[test]
    fn valid_request_is_normalised() {
        let req = check(Some("  S1"), Some("S2\t"), Some(" 08:30 ")).unwrap();

        assert_eq!(req.origin().as_str(), "S1");
        assert_eq!(req.destination().as_str(), "S2");
        assert_eq!(
            req.min_departure(),
            Utc.with_ymd_and_hms(2026, 10, 18, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn missing_fields() {
        assert_eq!(
            check(None, Some("S2"), Some("08:30")).unwrap_err(),
            ValidationError::MissingField(Field::FromStop)
        );
        assert_eq!(
            check(Some("S1"), None, Some("08:30")).unwrap_err(),
            ValidationError::MissingField(Field::ToStop)
        );
        assert_eq!(
            check(Some("S1"), Some("S2"), None).unwrap_err(),
            ValidationError::MissingField(Field::BoardingTime)
        );
    }

    #[test]
    fn blank_fields_are_missing() {
        assert_eq!(
            check(Some(""), Some("S2"), Some("08:30")).unwrap_err(),
            ValidationError::MissingField(Field::FromStop)
        );
        assert_eq!(
            check(Some("S1"), Some("   "), Some("08:30")).unwrap_err(),
            ValidationError::MissingField(Field::ToStop)
        );
        assert_eq!(
            check(Some("S1"), Some("S2"), Some(" \t ")).unwrap_err(),
            ValidationError::MissingField(Field::BoardingTime)
        );
    }

    #[test]
    fn identical_stops() {
        let err = check(Some("S1"), Some("S1"), Some("08:00")).unwrap_err();
        assert_eq!(
            err,
            ValidationError::IdenticalStops(StopId::parse("S1").unwrap())
        );
    }

    #[test]
    fn identical_after_trimming() {
        let err = check(Some(" S1"), Some("S1 "), Some("08:00")).unwrap_err();
        assert!(matches!(err, ValidationError::IdenticalStops(_)));
    }

    #[test]
    fn missing_field_reported_before_identical_stops() {
        let err = check(Some("S1"), Some("S1"), None).unwrap_err();
        assert_eq!(err, ValidationError::MissingField(Field::BoardingTime));
    }

    #[test]
    fn identical_stops_reported_before_bad_time() {
        let err = check(Some("S1"), Some("S1"), Some("not a time")).unwrap_err();
        assert!(matches!(err, ValidationError::IdenticalStops(_)));
    }

    #[test]
    fn unparseable_time() {
        let err = check(Some("S1"), Some("S2"), Some("half past eight")).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidFormat {
                field: Field::BoardingTime,
                ..
            }
        ));
    }

    #[test]
    fn unknown_stops_are_not_rejected() {
        assert!(check(Some("nowhere"), Some("elsewhere"), Some("08:00")).is_ok());
    }

    #[test]
    fn request_new_rejects_identical_stops() {
        let s = StopId::parse("S1").unwrap();
        let t = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        assert!(SearchRequest::new(s.clone(), s, t).is_err());
    }
}
