//! Search configuration.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::domain::{TimeError, service_offset};

/// Configuration parameters for trip search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// UTC offset of the zone the timetable runs in.
    /// Wall-clock boarding times are read in this zone.
    pub utc_offset: FixedOffset,

    /// Maximum number of trips to return, if limited.
    pub max_results: Option<usize>,
}

impl SearchConfig {
    /// Create a configuration for a timetable `minutes_east` of UTC.
    pub fn new(minutes_east: i32, max_results: Option<usize>) -> Result<Self, TimeError> {
        Ok(Self {
            utc_offset: service_offset(minutes_east)?,
            max_results,
        })
    }

    /// The timetable date at instant `now`.
    pub fn service_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.utc_offset).date_naive()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            utc_offset: Utc.fix(),
            max_results: None,
        }
    }
}
