//! Domain types for the bus trip search server.
//!
//! This module contains the core domain model types that represent
//! validated stop, bus and schedule data. Types enforce their invariants at
//! construction time, so code that receives them can trust their validity.

mod bus;
mod fare;
mod stop;
mod time;
mod trip;

pub use bus::{Amenities, Bus, BusId};
pub use fare::{Fare, InvalidFare};
pub use stop::{InvalidStopId, Stop, StopId};
pub use time::{TimeError, parse_boarding_time, parse_wall_clock, service_offset};
pub use trip::{InvalidTrip, SearchResult, Trip, TripCandidate, TripId};
