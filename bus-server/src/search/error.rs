//! Search error types.

use std::fmt;

use crate::domain::{StopId, TimeError};
use crate::store::StoreError;

/// A field of a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FromStop,
    ToStop,
    BoardingTime,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::FromStop => "from_stop",
            Field::ToStop => "to_stop",
            Field::BoardingTime => "boarding_time",
        })
    }
}

/// A defect in the caller's search request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field is absent, empty or whitespace-only
    #[error("missing required field: {0}")]
    MissingField(Field),

    /// Origin and destination are the same stop
    #[error("origin and destination cannot be the same stop ({0})")]
    IdenticalStops(StopId),

    /// A field is present but cannot be parsed
    #[error("invalid {field}: {source}")]
    InvalidFormat {
        field: Field,
        #[source]
        source: TimeError,
    },
}

/// Kind of record a point lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Bus,
    Trip,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Bus => "bus",
            RecordKind::Trip => "trip",
        })
    }
}

/// Error from a search or lookup.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The request was rejected before touching the store
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store could not be queried
    #[error("search could not be performed: {0}")]
    Retrieval(#[from] StoreError),

    /// A point lookup found no record
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: i64 },
}
