//! Bus types.

use std::fmt;

/// A bus identifier (store primary key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BusId(pub i64);

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// On-board amenity flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Amenities {
    pub wifi: bool,
    pub air_conditioning: bool,
}

/// A bus as maintained by the fleet management process.
///
/// The search core only ever reads buses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bus {
    pub id: BusId,
    /// Display label, e.g. "KL-10-1234"
    pub number: String,
    /// Category, e.g. "AC Sleeper" or "Superfast"
    pub bus_type: String,
    /// Operator name
    pub operator: String,
    /// Total seat capacity
    pub total_seats: u32,
    pub amenities: Amenities,
}

impl Bus {
    /// Create a bus with no amenities.
    pub fn new(
        id: BusId,
        number: impl Into<String>,
        bus_type: impl Into<String>,
        operator: impl Into<String>,
        total_seats: u32,
    ) -> Self {
        Self {
            id,
            number: number.into(),
            bus_type: bus_type.into(),
            operator: operator.into(),
            total_seats,
            amenities: Amenities::default(),
        }
    }

    /// Set the amenity flags.
    pub fn with_amenities(mut self, wifi: bool, air_conditioning: bool) -> Self {
        self.amenities = Amenities {
            wifi,
            air_conditioning,
        };
        self
    }
}
