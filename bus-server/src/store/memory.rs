//! In-memory schedule store.
//!
//! Serves a `Dataset` held in process, with the same filtering contract as
//! the SQLite store. It can be switched offline to exercise failure paths,
//! and it counts store calls so tests can assert that none were made.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::sync::RwLock;

use crate::domain::{Bus, BusId, Stop, Trip, TripCandidate, TripId};
use crate::search::{SearchRequest, TripStore};

use super::dataset::Dataset;
use super::error::StoreError;

/// Schedule store backed by in-process vectors.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Dataset>>,
    offline: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create a store serving `data`.
    pub fn new(data: Dataset) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of store calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Replace the served data.
    pub async fn replace(&self, data: Dataset) {
        *self.data.write().await = data;
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

/// Join a trip with its bus, reporting dangling or invalid records.
fn join(data: &Dataset, trip: &Trip) -> Result<TripCandidate, StoreError> {
    let bus = data
        .buses
        .iter()
        .find(|b| b.id == trip.bus_id)
        .ok_or_else(|| {
            StoreError::corrupt("schedules", trip.id.0, format!("unknown bus {}", trip.bus_id))
        })?;
    TripCandidate::new(trip.clone(), bus.clone())
        .map_err(|e| StoreError::corrupt("schedules", trip.id.0, e))
}

impl TripStore for MemoryStore {
    async fn query_trips(&self, request: &SearchRequest) -> Result<Vec<TripCandidate>, StoreError> {
        self.begin()?;
        let data = self.data.read().await;

        data.trips
            .iter()
            .filter(|t| t.serves(request.origin(), request.destination()))
            .filter(|t| t.has_seats() && t.departure >= request.min_departure())
            .map(|t| join(&data, t))
            .collect()
    }

    async fn get_trip(&self, id: TripId) -> Result<Option<TripCandidate>, StoreError> {
        self.begin()?;
        let data = self.data.read().await;

        data.trips
            .iter()
            .find(|t| t.id == id)
            .map(|t| join(&data, t))
            .transpose()
    }

    async fn get_bus(&self, id: BusId) -> Result<Option<Bus>, StoreError> {
        self.begin()?;
        let data = self.data.read().await;
        Ok(data.buses.iter().find(|b| b.id == id).cloned())
    }

    async fn list_buses(&self) -> Result<Vec<Bus>, StoreError> {
        self.begin()?;
        let data = self.data.read().await;

        let mut buses = data.buses.clone();
        buses.sort_by(|a, b| {
            a.bus_type
                .cmp(&b.bus_type)
                .then_with(|| a.number.cmp(&b.number))
        });
        Ok(buses)
    }

    async fn list_stops(&self) -> Result<Vec<Stop>, StoreError> {
        self.begin()?;
        let data = self.data.read().await;

        let mut stops = data.stops.clone();
        stops.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(stops)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.begin()
    }
}
