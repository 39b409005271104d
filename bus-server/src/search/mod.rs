//! Trip search.
//!
//! This module implements the search core: it answers "which buses can I
//! board from this stop to that stop, no earlier than this time?"
//!
//! Requests pass through the input validator first; only valid requests
//! reach the trip finder, which is the sole consumer of the schedule store.

mod config;
mod error;
mod finder;
mod validate;


pub use config::SearchConfig;
pub use error::{Field, RecordKind, SearchError, ValidationError};
pub use finder::{TripFinder, TripStore, is_eligible, order_eligible};
pub use validate::{SearchRequest, validate};
