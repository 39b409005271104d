//! Trip finder.
//!
//! Retrieves candidate trips for a validated request, re-applies the
//! eligibility predicate, removes duplicates and orders the survivors by
//! departure time (ties by trip id).

use std::collections::HashSet;
use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::domain::{Bus, BusId, SearchResult, Stop, TripCandidate, TripId};
use crate::store::StoreError;

use super::config::SearchConfig;
use super::error::{RecordKind, SearchError};
use super::validate::{SearchRequest, validate};

/// Trait for providing stored schedule data.
///
/// This abstraction allows the finder to be tested with in-memory data.
/// Implementations acquire whatever connection they need per call and
/// release it before returning.
pub trait TripStore: Send + Sync {
    /// Trips from the request's origin to its destination, departing at or
    /// after its minimum departure, with at least one seat available.
    ///
    /// Implementations should filter, but the finder does not rely on it.
    fn query_trips(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<Vec<TripCandidate>, StoreError>> + Send;

    /// A trip joined with its bus, if it exists.
    fn get_trip(
        &self,
        id: TripId,
    ) -> impl Future<Output = Result<Option<TripCandidate>, StoreError>> + Send;

    /// A bus, if it exists.
    fn get_bus(&self, id: BusId)
    -> impl Future<Output = Result<Option<Bus>, StoreError>> + Send;

    /// All buses, ordered by bus type then bus number.
    fn list_buses(&self) -> impl Future<Output = Result<Vec<Bus>, StoreError>> + Send;

    /// All stops, ordered by name.
    fn list_stops(&self) -> impl Future<Output = Result<Vec<Stop>, StoreError>> + Send;

    /// Check that the store can answer queries.
    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Returns true if `candidate` may be offered for `request`.
pub fn is_eligible(request: &SearchRequest, candidate: &TripCandidate) -> bool {
    let trip = candidate.trip();
    trip.serves(request.origin(), request.destination())
        && trip.has_seats()
        && trip.departure >= request.min_departure()
}

/// Filter, deduplicate and order raw candidates.
///
/// The first occurrence of each trip id is kept. The result is sorted by
/// departure ascending, then trip id ascending.
pub fn order_eligible(
    request: &SearchRequest,
    candidates: Vec<TripCandidate>,
) -> Vec<TripCandidate> {
    let mut seen = HashSet::new();
    let mut eligible: Vec<TripCandidate> = candidates
        .into_iter()
        .filter(|c| is_eligible(request, c))
        .filter(|c| seen.insert(c.trip().id))
        .collect();

    eligible.sort_by_key(|c| (c.trip().departure, c.trip().id));
    eligible
}

/// Trip finder over a store.
pub struct TripFinder<'a, S> {
    store: &'a S,
    config: &'a SearchConfig,
}

impl<'a, S: TripStore> TripFinder<'a, S> {
    /// Create a new finder.
    pub fn new(store: &'a S, config: &'a SearchConfig) -> Self {
        Self { store, config }
    }

    /// Validate raw input and run the search.
    ///
    /// `now` fixes the service date that wall-clock boarding times refer to.
    /// Invalid input is rejected without touching the store.
    pub async fn search(
        &self,
        from_stop: Option<&str>,
        to_stop: Option<&str>,
        boarding_time: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let request = validate(
            from_stop,
            to_stop,
            boarding_time,
            self.config.service_date(now),
            self.config.utc_offset,
        )
        .inspect_err(|e| debug!(error = %e, "rejected search request"))?;

        self.find_trips(&request).await
    }

    /// Find eligible trips for a validated request.
    ///
    /// An empty result means no trip matched. Store failures are returned
    /// as `SearchError::Retrieval`, never as an empty result.
    pub async fn find_trips(
        &self,
        request: &SearchRequest,
    ) -> Result<Vec<SearchResult>, SearchError> {
        debug!(
            origin = %request.origin(),
            destination = %request.destination(),
            min_departure = %request.min_departure(),
            "searching trips"
        );

        let candidates = self
            .store
            .query_trips(request)
            .await
            .inspect_err(|e| error!(error = %e, "trip retrieval failed"))?;
        let fetched = candidates.len();

        let mut ordered = order_eligible(request, candidates);
        if let Some(limit) = self.config.max_results {
            ordered.truncate(limit);
        }

        info!(
            origin = %request.origin(),
            destination = %request.destination(),
            fetched,
            returned = ordered.len(),
            "trip search complete"
        );

        Ok(ordered.into_iter().map(SearchResult::from).collect())
    }

    /// Look up a single trip.
    pub async fn trip_by_id(&self, id: TripId) -> Result<SearchResult, SearchError> {
        self.store
            .get_trip(id)
            .await?
            .map(SearchResult::from)
            .ok_or(SearchError::NotFound {
                kind: RecordKind::Trip,
                id: id.0,
            })
    }

    /// Look up a single bus.
    pub async fn bus_by_id(&self, id: BusId) -> Result<Bus, SearchError> {
        self.store.get_bus(id).await?.ok_or(SearchError::NotFound {
            kind: RecordKind::Bus,
            id: id.0,
        })
    }

    /// All buses, ordered by type then number.
    pub async fn buses(&self) -> Result<Vec<Bus>, SearchError> {
        Ok(self.store.list_buses().await?)
    }

    /// All stops, ordered by name.
    pub async fn stops(&self) -> Result<Vec<Stop>, SearchError> {
        Ok(self.store.list_stops().await?)
    }
}
