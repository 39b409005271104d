//! Caching layer for reference data.
//!
//! Bus records and the stop list change rarely, so they are kept for a
//! short TTL. Trip queries and trip lookups always go to the inner store
//! because seat counts change as tickets are sold.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{Bus, BusId, Stop, TripCandidate, TripId};
use crate::search::{SearchRequest, TripStore};

use super::error::StoreError;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached buses.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
        }
    }
}

/// Store wrapper that caches bus lookups and the stop list.
///
/// Only successful lookups are cached. A bus that does not exist is asked
/// for again next time, and store failures are never remembered.
pub struct CachedStore<S> {
    inner: S,
    buses: MokaCache<BusId, Bus>,
    stops: MokaCache<(), Arc<Vec<Stop>>>,
}

impl<S> CachedStore<S> {
    /// Wrap `inner` with a cache built from `config`.
    pub fn new(inner: S, config: &CacheConfig) -> Self {
        let buses = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let stops = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(1)
            .build();

        Self {
            inner,
            buses,
            stops,
        }
    }

    /// Access the underlying store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached entry.
    pub fn invalidate_all(&self) {
        self.buses.invalidate_all();
        self.stops.invalidate_all();
    }
}

impl<S: TripStore> TripStore for CachedStore<S> {
    async fn query_trips(&self, request: &SearchRequest) -> Result<Vec<TripCandidate>, StoreError> {
        self.inner.query_trips(request).await
    }

    async fn get_trip(&self, id: TripId) -> Result<Option<TripCandidate>, StoreError> {
        self.inner.get_trip(id).await
    }

    async fn get_bus(&self, id: BusId) -> Result<Option<Bus>, StoreError> {
        if let Some(bus) = self.buses.get(&id).await {
            return Ok(Some(bus));
        }

        let bus = self.inner.get_bus(id).await?;
        if let Some(bus) = &bus {
            self.buses.insert(id, bus.clone()).await;
        }
        Ok(bus)
    }

    async fn list_buses(&self) -> Result<Vec<Bus>, StoreError> {
        self.inner.list_buses().await
    }

    async fn list_stops(&self) -> Result<Vec<Stop>, StoreError> {
        if let Some(stops) = self.stops.get(&()).await {
            return Ok(stops.as_ref().clone());
        }

        let stops = self.inner.list_stops().await?;
        self.stops.insert((), Arc::new(stops.clone())).await;
        Ok(stops)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}
