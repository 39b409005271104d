//! Store configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default time SQLite waits on a locked database (milliseconds).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 2_000;

/// Default upper bound on a single store operation (seconds).
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 5;

/// Configuration for the SQLite schedule store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub path: PathBuf,
    /// How long SQLite retries on a locked database
    pub busy_timeout_ms: u64,
    /// How long a whole store operation may take before it is abandoned
    pub query_timeout_secs: u64,
}

impl StoreConfig {
    /// Create a new config for the database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
        }
    }

    /// Set the SQLite busy timeout.
    pub fn with_busy_timeout_ms(mut self, ms: u64) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    /// Set the operation timeout.
    pub fn with_query_timeout(mut self, secs: u64) -> Self {
        self.query_timeout_secs = secs;
        self
    }

    /// Returns the busy timeout as a Duration.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Returns the operation timeout as a Duration.
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}
