//! Store error types.

use std::time::Duration;

/// Errors from the schedule store.
///
/// Every variant means the store could not answer. None of them mean
/// "no matching records"; that is always an `Ok` with an empty result.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connecting to or querying SQLite failed
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The store did not answer within the configured timeout
    #[error("store did not respond within {0:?}")]
    Timeout(Duration),

    /// The blocking worker running the query failed
    #[error("store worker failed: {0}")]
    Worker(String),

    /// The store is deliberately offline (in-memory store only)
    #[error("store unavailable")]
    Unavailable,

    /// A stored record violates the data model
    #[error("corrupt {table} record {id}: {reason}")]
    CorruptRow {
        table: &'static str,
        /// Primary key of the offending record, as text
        id: String,
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn corrupt(table: &'static str, id: impl ToString, reason: impl ToString) -> Self {
        StoreError::CorruptRow {
            table,
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}
