//! Data transfer objects for web requests and responses.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Bus, SearchResult, Stop};

/// Request to search for trips.
///
/// Every field is optional at this level so that absent fields reach the
/// validator and are reported by name.
#[derive(Debug, Default, Deserialize)]
pub struct SearchTripsRequest {
    /// Boarding stop identifier
    #[serde(alias = "fromStop")]
    pub from_stop: Option<String>,

    /// Alighting stop identifier
    #[serde(alias = "toStop")]
    pub to_stop: Option<String>,

    /// Earliest departure, `HH:MM` or RFC 3339
    #[serde(alias = "boardingTime")]
    pub boarding_time: Option<String>,
}

/// A trip in search results.
#[derive(Debug, Serialize)]
pub struct TripResult {
    pub trip_id: i64,
    pub bus_number: String,
    pub bus_type: String,
    pub operator: String,
    pub wifi: bool,
    pub air_conditioning: bool,
    pub total_seats: u32,

    /// Departure time, RFC 3339 in the service offset
    pub departure_time: String,

    /// Arrival time, RFC 3339 in the service offset
    pub arrival_time: String,

    /// Fare as a decimal string, e.g. "60.50"
    pub fare: String,

    pub available_seats: u32,
}

impl TripResult {
    /// Convert a search result, rendering times in `offset`.
    pub fn from_result(result: &SearchResult, offset: FixedOffset) -> Self {
        Self {
            trip_id: result.trip_id.0,
            bus_number: result.bus_number.clone(),
            bus_type: result.bus_type.clone(),
            operator: result.operator.clone(),
            wifi: result.wifi,
            air_conditioning: result.air_conditioning,
            total_seats: result.total_seats,
            departure_time: render_time(result.departure, offset),
            arrival_time: render_time(result.arrival, offset),
            fare: result.fare.to_string(),
            available_seats: result.available_seats,
        }
    }
}

fn render_time(time: DateTime<Utc>, offset: FixedOffset) -> String {
    time.with_timezone(&offset).to_rfc3339()
}

/// A bus record.
#[derive(Debug, Serialize)]
pub struct BusResult {
    pub bus_id: i64,
    pub bus_number: String,
    pub bus_type: String,
    pub operator: String,
    pub total_seats: u32,
    pub wifi: bool,
    pub air_conditioning: bool,
}

impl From<&Bus> for BusResult {
    fn from(bus: &Bus) -> Self {
        Self {
            bus_id: bus.id.0,
            bus_number: bus.number.clone(),
            bus_type: bus.bus_type.clone(),
            operator: bus.operator.clone(),
            total_seats: bus.total_seats,
            wifi: bus.amenities.wifi,
            air_conditioning: bus.amenities.air_conditioning,
        }
    }
}

/// A stop record.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub stop_id: String,
    pub name: String,
}

impl From<&Stop> for StopResult {
    fn from(stop: &Stop) -> Self {
        Self {
            stop_id: stop.id.as_str().to_string(),
            name: stop.name.clone(),
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
