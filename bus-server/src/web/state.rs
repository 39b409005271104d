//! Application state for the web layer.

use std::sync::Arc;

use crate::search::{SearchConfig, TripFinder, TripStore};

/// Shared application state.
///
/// The store is constructed once at startup and shared by every request.
pub struct AppState<S> {
    /// Schedule store
    pub store: Arc<S>,

    /// Search configuration
    pub config: Arc<SearchConfig>,
}

impl<S> AppState<S> {
    /// Create a new app state.
    pub fn new(store: S, config: SearchConfig) -> Self {
        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }
}

impl<S: TripStore> AppState<S> {
    /// A trip finder over the shared store.
    pub fn finder(&self) -> TripFinder<'_, S> {
        TripFinder::new(&self.store, &self.config)
    }
}

// Not derived: that would require `S: Clone`.
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: Arc::clone(&self.config),
        }
    }
}
