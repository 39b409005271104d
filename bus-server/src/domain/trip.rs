//! Scheduled trips and search results.
//!
//! A `Trip` is one concrete, bookable journey leg of a bus between two
//! stops. A `TripCandidate` joins a trip with its bus and is the unit the
//! store hands back to the search core. A `SearchResult` is the flat
//! projection returned to callers.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{Bus, BusId, Fare, StopId};

/// A schedule (trip instance) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripId(pub i64);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a trip record violates its invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidTrip {
    /// The trip references a different bus than the one it was joined with
    #[error("trip references bus {expected} but was joined with bus {actual}")]
    BusMismatch { expected: BusId, actual: BusId },

    /// More seats available than the bus has
    #[error("available seats {available} exceed bus capacity {capacity}")]
    SeatsExceedCapacity { available: u32, capacity: u32 },

    /// Arrival is scheduled before departure
    #[error("arrival precedes departure")]
    ArrivalBeforeDeparture,
}

/// One scheduled journey leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: TripId,
    pub bus_id: BusId,
    pub origin: StopId,
    pub destination: StopId,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub fare: Fare,
    pub available_seats: u32,
}

impl Trip {
    /// Returns true if at least one seat is still available.
    pub fn has_seats(&self) -> bool {
        self.available_seats > 0
    }

    /// Returns true if this trip runs from `origin` to `destination`.
    ///
    /// Direction matters: a trip from A to B does not serve B to A.
    pub fn serves(&self, origin: &StopId, destination: &StopId) -> bool {
        &self.origin == origin && &self.destination == destination
    }
}

/// A trip joined with the bus that operates it.
///
/// Construction checks the cross-record invariants, so a candidate always
/// has `available_seats <= bus.total_seats` and `arrival >= departure`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripCandidate {
    trip: Trip,
    bus: Bus,
}

impl TripCandidate {
    /// Join a trip with its bus, validating the pair.
    pub fn new(trip: Trip, bus: Bus) -> Result<Self, InvalidTrip> {
        if trip.bus_id != bus.id {
            return Err(InvalidTrip::BusMismatch {
                expected: trip.bus_id,
                actual: bus.id,
            });
        }
        if trip.available_seats > bus.total_seats {
            return Err(InvalidTrip::SeatsExceedCapacity {
                available: trip.available_seats,
                capacity: bus.total_seats,
            });
        }
        if trip.arrival < trip.departure {
            return Err(InvalidTrip::ArrivalBeforeDeparture);
        }
        Ok(Self { trip, bus })
    }

    pub fn trip(&self) -> &Trip {
        &self.trip
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}

/// A bus joined with one of its matching trips, as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub trip_id: TripId,
    pub bus_number: String,
    pub bus_type: String,
    pub operator: String,
    pub wifi: bool,
    pub air_conditioning: bool,
    pub total_seats: u32,
    pub departure: DateTime<Utc>,
    pub arrival: DateTime<Utc>,
    pub fare: Fare,
    pub available_seats: u32,
}

impl From<TripCandidate> for SearchResult {
    fn from(candidate: TripCandidate) -> Self {
        let TripCandidate { trip, bus } = candidate;
        Self {
            trip_id: trip.id,
            bus_number: bus.number,
            bus_type: bus.bus_type,
            operator: bus.operator,
            wifi: bus.amenities.wifi,
            air_conditioning: bus.amenities.air_conditioning,
            total_seats: bus.total_seats,
            departure: trip.departure,
            arrival: trip.arrival,
            fare: trip.fare,
            available_seats: trip.available_seats,
        }
    }
}
