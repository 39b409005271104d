//! SQLite schedule store.
//!
//! Every operation opens its own connection on a blocking worker thread
//! and drops it before the worker returns, so no connection outlives the
//! call that needed it. The whole operation is bounded by the configured
//! query timeout.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use tracing::debug;

use crate::domain::{Bus, BusId, Fare, Stop, StopId, Trip, TripCandidate, TripId};
use crate::search::{SearchRequest, TripStore};

use super::config::StoreConfig;
use super::dataset::Dataset;
use super::error::StoreError;
use super::schema;

/// Columns selected for a trip joined with its bus.
const TRIP_COLUMNS: &str = "
    s.schedule_id, s.bus_id, s.from_stop_id, s.to_stop_id,
    s.departure_time, s.arrival_time, s.fare_minor, s.available_seats,
    b.bus_number, b.bus_type, b.operator, b.total_seats,
    b.wifi_available, b.ac_available";

const BUS_COLUMNS: &str =
    "bus_id, bus_number, bus_type, operator, total_seats, wifi_available, ac_available";

/// Schedule store backed by a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    config: StoreConfig,
}

impl SqliteStore {
    /// Create a store for the configured database.
    ///
    /// No connection is opened until the first operation.
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Create the database file (if needed) and its schema.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        self.run(true, |conn| Ok(schema::create_schema(conn)?)).await
    }

    /// Load all records of `data` in one transaction.
    pub async fn import(&self, data: Dataset) -> Result<(), StoreError> {
        self.run(false, move |conn| Ok(schema::import(conn, &data)?))
            .await
    }

    /// Run `op` against a fresh connection on a blocking worker.
    ///
    /// The connection is dropped when the worker finishes, whether `op`
    /// succeeded or not. If the deadline passes first the caller gets
    /// `StoreError::Timeout`; the worker still releases its connection
    /// when it completes.
    async fn run<T, F>(&self, create: bool, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let config = self.config.clone();
        let timeout = self.config.query_timeout();

        let worker = tokio::task::spawn_blocking(move || {
            let mut conn = open(&config, create)?;
            op(&mut conn)
        });

        match tokio::time::timeout(timeout, worker).await {
            Err(_) => Err(StoreError::Timeout(timeout)),
            Ok(Err(join)) => Err(StoreError::Worker(join.to_string())),
            Ok(Ok(result)) => result,
        }
    }
}

/// Open a connection. Without `create` a missing database is an error.
fn open(config: &StoreConfig, create: bool) -> Result<Connection, StoreError> {
    let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX
        | OpenFlags::SQLITE_OPEN_URI;
    if create {
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
    }

    let conn = Connection::open_with_flags(&config.path, flags)?;
    conn.busy_timeout(config.busy_timeout())?;
    debug!(path = %config.path.display(), "opened store connection");
    Ok(conn)
}

/// A joined schedule/bus row as stored, before validation.
struct TripRow {
    schedule_id: i64,
    bus_id: i64,
    from_stop_id: String,
    to_stop_id: String,
    departure_time: i64,
    arrival_time: i64,
    fare_minor: i64,
    available_seats: i64,
    bus: BusRow,
}

/// A bus row as stored, before validation.
struct BusRow {
    bus_id: i64,
    bus_number: String,
    bus_type: String,
    operator: String,
    total_seats: i64,
    wifi_available: bool,
    ac_available: bool,
}

impl TripRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            schedule_id: row.get(0)?,
            bus_id: row.get(1)?,
            from_stop_id: row.get(2)?,
            to_stop_id: row.get(3)?,
            departure_time: row.get(4)?,
            arrival_time: row.get(5)?,
            fare_minor: row.get(6)?,
            available_seats: row.get(7)?,
            bus: BusRow {
                bus_id: row.get(1)?,
                bus_number: row.get(8)?,
                bus_type: row.get(9)?,
                operator: row.get(10)?,
                total_seats: row.get(11)?,
                wifi_available: row.get(12)?,
                ac_available: row.get(13)?,
            },
        })
    }

    fn into_candidate(self) -> Result<TripCandidate, StoreError> {
        let id = self.schedule_id;
        let corrupt = |reason: &dyn ToString| StoreError::corrupt("schedules", id, reason.to_string());

        let trip = Trip {
            id: TripId(id),
            bus_id: BusId(self.bus_id),
            origin: StopId::parse(&self.from_stop_id).map_err(|e| corrupt(&e))?,
            destination: StopId::parse(&self.to_stop_id).map_err(|e| corrupt(&e))?,
            departure: timestamp(self.departure_time).ok_or_else(|| corrupt(&"bad departure time"))?,
            arrival: timestamp(self.arrival_time).ok_or_else(|| corrupt(&"bad arrival time"))?,
            fare: Fare::try_from_minor(self.fare_minor).map_err(|e| corrupt(&e))?,
            available_seats: u32::try_from(self.available_seats)
                .map_err(|_| corrupt(&"available seats out of range"))?,
        };
        let bus = self.bus.into_bus()?;

        TripCandidate::new(trip, bus).map_err(|e| corrupt(&e))
    }
}

impl BusRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            bus_id: row.get(0)?,
            bus_number: row.get(1)?,
            bus_type: row.get(2)?,
            operator: row.get(3)?,
            total_seats: row.get(4)?,
            wifi_available: row.get(5)?,
            ac_available: row.get(6)?,
        })
    }

    fn into_bus(self) -> Result<Bus, StoreError> {
        let total_seats = u32::try_from(self.total_seats).map_err(|_| {
            StoreError::corrupt("buses", self.bus_id, "total seats out of range")
        })?;
        Ok(Bus::new(
            BusId(self.bus_id),
            self.bus_number,
            self.bus_type,
            self.operator,
            total_seats,
        )
        .with_amenities(self.wifi_available, self.ac_available))
    }
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

impl TripStore for SqliteStore {
    async fn query_trips(&self, request: &SearchRequest) -> Result<Vec<TripCandidate>, StoreError> {
        let origin = request.origin().as_str().to_string();
        let destination = request.destination().as_str().to_string();
        let min_departure = request.min_departure().timestamp();

        self.run(false, move |conn| {
            let sql = format!(
                "SELECT {TRIP_COLUMNS}
                 FROM schedules s
                 INNER JOIN buses b ON b.bus_id = s.bus_id
                 WHERE s.from_stop_id = ?1
                   AND s.to_stop_id = ?2
                   AND s.departure_time >= ?3
                   AND s.available_seats > 0
                 ORDER BY s.departure_time ASC, s.schedule_id ASC"
            );
            let mut stmt = conn.prepare_cached(&sql)?;
            let rows = stmt
                .query_map(params![origin, destination, min_departure], TripRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter().map(TripRow::into_candidate).collect()
        })
        .await
    }

    async fn get_trip(&self, id: TripId) -> Result<Option<TripCandidate>, StoreError> {
        self.run(false, move |conn| {
            let sql = format!(
                "SELECT {TRIP_COLUMNS}
                 FROM schedules s
                 INNER JOIN buses b ON b.bus_id = s.bus_id
                 WHERE s.schedule_id = ?1"
            );
            conn.query_row(&sql, params![id.0], TripRow::from_row)
                .optional()?
                .map(TripRow::into_candidate)
                .transpose()
        })
        .await
    }

    async fn get_bus(&self, id: BusId) -> Result<Option<Bus>, StoreError> {
        self.run(false, move |conn| {
            let sql = format!("SELECT {BUS_COLUMNS} FROM buses WHERE bus_id = ?1");
            conn.query_row(&sql, params![id.0], BusRow::from_row)
                .optional()?
                .map(BusRow::into_bus)
                .transpose()
        })
        .await
    }

    async fn list_buses(&self) -> Result<Vec<Bus>, StoreError> {
        self.run(false, |conn| {
            let sql = format!("SELECT {BUS_COLUMNS} FROM buses ORDER BY bus_type, bus_number");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], BusRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter().map(BusRow::into_bus).collect()
        })
        .await
    }

    async fn list_stops(&self) -> Result<Vec<Stop>, StoreError> {
        self.run(false, |conn| {
            let mut stmt = conn.prepare("SELECT stop_id, name FROM stops ORDER BY name, stop_id")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(id, name)| {
                    StopId::parse(&id)
                        .map(|id| Stop::new(id, name))
                        .map_err(|e| StoreError::corrupt("stops", format!("{id:?}"), e))
                })
                .collect()
        })
        .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.run(false, |conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, h, m, 0).unwrap()
    }

    fn stop(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    fn trip(id: i64, from: &str, to: &str, dep: DateTime<Utc>, seats: u32) -> Trip {
        Trip {
            id: TripId(id),
            bus_id: BusId(1),
            origin: stop(from),
            destination: stop(to),
            departure: dep,
            arrival: dep + chrono::Duration::minutes(50),
            fare: Fare::from_minor(4500),
            available_seats: seats,
        }
    }

    fn dataset() -> Dataset {
        let mut data = Dataset::new();
        data.add_stop(Stop::new(stop("S1"), "First"))
            .add_stop(Stop::new(stop("S2"), "Second"))
            .add_stop(Stop::new(stop("S3"), "Third"))
            .add_bus(
                Bus::new(BusId(1), "KL-01", "AC Sleeper", "KSRTC", 40).with_amenities(true, true),
            )
            .add_bus(Bus::new(BusId(2), "KL-02", "Ordinary", "PRIVATE", 45))
            .add_trip(trip(1, "S1", "S2", at(9, 0), 0))
            .add_trip(trip(2, "S1", "S2", at(9, 30), 5))
            .add_trip(trip(3, "S1", "S2", at(8, 0), 3))
            .add_trip(trip(4, "S2", "S1", at(10, 0), 3))
            .add_trip(trip(5, "S1", "S2", at(9, 30), 1));
        data
    }

    async fn store_with(data: Dataset) -> (TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(StoreConfig::new(dir.path().join("bus.db")));
        store.init_schema().await.unwrap();
        store.import(data).await.unwrap();
        (dir, store)
    }

    fn request(from: &str, to: &str, min: DateTime<Utc>) -> SearchRequest {
        SearchRequest::new(stop(from), stop(to), min).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn query_filters_and_orders() {
        let (_dir, store) = store_with(dataset()).await;

        let rows = store.query_trips(&request("S1", "S2", at(8, 30))).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|c| c.trip().id).collect();

        assert_eq!(ids, vec![TripId(2), TripId(5)]);
        assert_eq!(rows[0].bus().number, "KL-01");
        assert!(rows[0].bus().amenities.wifi);
        assert_eq!(rows[0].trip().fare, Fare::from_minor(4500));
        assert_eq!(rows[0].trip().departure, at(9, 30));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn query_is_directional() {
        let (_dir, store) = store_with(dataset()).await;

        let rows = store.query_trips(&request("S2", "S1", at(0, 0))).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].trip().id, TripId(4));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn departure_boundary_is_inclusive() {
        let (_dir, store) = store_with(dataset()).await;

        let rows = store.query_trips(&request("S1", "S2", at(9, 30))).await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_stops_return_empty() {
        let (_dir, store) = store_with(dataset()).await;

        let rows = store.query_trips(&request("S1", "S9", at(0, 0))).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_values_are_bound_not_interpolated() {
        let (_dir, store) = store_with(dataset()).await;

        let rows = store
            .query_trips(&request("S1' OR '1'='1", "S2", at(0, 0)))
            .await
            .unwrap();
        assert!(rows.is_empty());

        // The table is still intact
        assert_eq!(store.list_buses().await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn point_lookups() {
        let (_dir, store) = store_with(dataset()).await;

        let bus = store.get_bus(BusId(2)).await.unwrap().unwrap();
        assert_eq!(bus.number, "KL-02");
        assert_eq!(bus.amenities, crate::domain::Amenities::default());
        assert!(store.get_bus(BusId(99)).await.unwrap().is_none());

        let trip = store.get_trip(TripId(1)).await.unwrap().unwrap();
        assert_eq!(trip.trip().available_seats, 0);
        assert!(store.get_trip(TripId(99)).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn listings_are_ordered() {
        let (_dir, store) = store_with(dataset()).await;

        let types: Vec<_> = store
            .list_buses()
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.bus_type)
            .collect();
        assert_eq!(types, vec!["AC Sleeper", "Ordinary"]);

        let names: Vec<_> = store
            .list_stops()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn overbooked_row_is_corrupt() {
        let mut data = dataset();
        data.add_trip(trip(6, "S1", "S3", at(11, 0), 41));
        let (_dir, store) = store_with(data).await;

        let err = store.query_trips(&request("S1", "S3", at(0, 0))).await.unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow { ref id, .. } if id == "6"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn missing_database_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(StoreConfig::new(dir.path().join("absent.db")));

        let err = store.query_trips(&request("S1", "S2", at(0, 0))).await.unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
        assert!(store.ping().await.is_err());
        // Nothing was created as a side effect
        assert!(!dir.path().join("absent.db").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn blank_stop_key_is_corrupt() {
        let (dir, store) = store_with(dataset()).await;
        let conn = Connection::open(dir.path().join("bus.db")).unwrap();
        conn.execute("INSERT INTO stops (stop_id, name) VALUES ('  ', 'Blank')", [])
            .unwrap();

        let err = store.list_stops().await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::CorruptRow { table: "stops", ref id, .. } if id == "\"  \""
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn locked_database_times_out_as_retrieval_failure() {
        use crate::search::{SearchConfig, SearchError, TripFinder};

        let (dir, _) = store_with(dataset()).await;
        let path = dir.path().join("bus.db");

        // Another writer holds the database for longer than a query may take
        let lock = Connection::open(&path).unwrap();
        lock.execute_batch("BEGIN EXCLUSIVE").unwrap();

        let store = SqliteStore::new(
            StoreConfig::new(&path)
                .with_busy_timeout_ms(10_000)
                .with_query_timeout(1),
        );
        let config = SearchConfig::default();
        let finder = TripFinder::new(&store, &config);

        let err = finder
            .search(Some("S1"), Some("S2"), Some("08:00"), at(0, 0))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SearchError::Retrieval(StoreError::Timeout(d)) if d == std::time::Duration::from_secs(1)
        ));

        // Releasing the lock lets the abandoned worker finish
        drop(lock);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn ping_succeeds_on_initialised_store() {
        let (_dir, store) = store_with(Dataset::new()).await;
        assert!(store.ping().await.is_ok());
    }
}
