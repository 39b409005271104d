//! SQLite schema and record insertion.
//!
//! Times are stored as UNIX seconds and fares as integer minor units so
//! that the departure filter is a numeric comparison.

use rusqlite::{Connection, params};

use crate::domain::{Bus, Stop, Trip};

use super::dataset::Dataset;

/// Schema DDL. Safe to run repeatedly.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS stops (
    stop_id TEXT PRIMARY KEY,
    name    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS buses (
    bus_id         INTEGER PRIMARY KEY,
    bus_number     TEXT    NOT NULL,
    bus_type       TEXT    NOT NULL,
    operator       TEXT    NOT NULL,
    total_seats    INTEGER NOT NULL CHECK (total_seats >= 0),
    wifi_available INTEGER NOT NULL DEFAULT 0,
    ac_available   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS schedules (
    schedule_id     INTEGER PRIMARY KEY,
    bus_id          INTEGER NOT NULL REFERENCES buses (bus_id),
    from_stop_id    TEXT    NOT NULL REFERENCES stops (stop_id),
    to_stop_id      TEXT    NOT NULL REFERENCES stops (stop_id),
    departure_time  INTEGER NOT NULL,
    arrival_time    INTEGER NOT NULL,
    fare_minor      INTEGER NOT NULL,
    available_seats INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS schedules_by_route
    ON schedules (from_stop_id, to_stop_id, departure_time);
";

/// Create all tables and indices.
pub fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

pub fn insert_stop(conn: &Connection, stop: &Stop) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO stops (stop_id, name) VALUES (?1, ?2)",
        params![stop.id.as_str(), stop.name],
    )?;
    Ok(())
}

pub fn insert_bus(conn: &Connection, bus: &Bus) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO buses
            (bus_id, bus_number, bus_type, operator, total_seats, wifi_available, ac_available)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            bus.id.0,
            bus.number,
            bus.bus_type,
            bus.operator,
            bus.total_seats,
            bus.amenities.wifi,
            bus.amenities.air_conditioning,
        ],
    )?;
    Ok(())
}

pub fn insert_trip(conn: &Connection, trip: &Trip) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO schedules
            (schedule_id, bus_id, from_stop_id, to_stop_id,
             departure_time, arrival_time, fare_minor, available_seats)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            trip.id.0,
            trip.bus_id.0,
            trip.origin.as_str(),
            trip.destination.as_str(),
            trip.departure.timestamp(),
            trip.arrival.timestamp(),
            trip.fare.minor() as i64,
            trip.available_seats,
        ],
    )?;
    Ok(())
}

/// Insert every record of `data` in one transaction.
pub fn import(conn: &mut Connection, data: &Dataset) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    for stop in &data.stops {
        insert_stop(&tx, stop)?;
    }
    for bus in &data.buses {
        insert_bus(&tx, bus)?;
    }
    for trip in &data.trips {
        insert_trip(&tx, trip)?;
    }
    tx.commit()
}
