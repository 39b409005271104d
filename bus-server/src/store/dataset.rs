//! In-process collections of stops, buses and trips.
//!
//! A `Dataset` is what gets loaded into a store: the in-memory store keeps
//! one directly, and the SQLite store imports one in a single transaction.
//! `Dataset::demo` builds a day of service on a single bus corridor.

use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::domain::{Bus, BusId, Fare, Stop, StopId, Trip, TripId};

/// Stops along the demo corridor with their distance from the first stop (km).
const CORRIDOR: &[(&str, u32)] = &[
    ("Kuttipuram", 0),
    ("Thangal Padi", 3),
    ("Kavumpuram", 6),
    ("Kandanakam", 9),
    ("Mannor", 12),
    ("Edappal", 15),
    ("Naduvattom", 18),
    ("Kalachal", 21),
    ("Panthavoor", 24),
    ("Manthadam", 27),
    ("Changramkullam", 30),
    ("Valayamkullam", 33),
    ("Pavitapuram", 36),
    ("Kolikara", 39),
    ("Kadavalur", 42),
    ("Kallumpuram", 45),
    ("Vattamavu", 47),
    ("Korattikara", 49),
    ("Ansar Hospital", 51),
    ("Permbilavu", 53),
    ("Akkikavu", 54),
    ("Parempadam", 55),
    ("Kunamkullam", 57),
    ("Kanipayoor", 58),
    ("Choondal", 59),
    ("Kechery", 60),
    ("Kaiparambu", 61),
    ("Mundur", 62),
    ("Peramangalam", 63),
    ("Amala", 64),
    ("Muthuvara", 65),
    ("Puzhakkal", 66),
    ("Shoba City", 67),
    ("Deshaabhimani", 68),
    ("Poonkunnam", 69),
    ("Patturaikkal", 70),
    ("Vaddake Stand", 71),
    ("Sapna", 72),
    ("Railway Station", 73),
    ("Thrissur", 75),
];

/// Full corridor length, the distance the reference fares are quoted for (km).
const CORRIDOR_KM: u64 = 75;

/// A demo bus category.
struct Category {
    name: &'static str,
    prefix: &'static str,
    /// Full-corridor fare in whole currency units
    corridor_fare: u64,
    speed_kmh: u32,
    seats: u32,
    fleet: usize,
    wifi: bool,
    air_conditioning: bool,
}

const CATEGORIES: &[Category] = &[
    Category {
        name: "Ordinary",
        prefix: "ORD",
        corridor_fare: 60,
        speed_kmh: 25,
        seats: 45,
        fleet: 6,
        wifi: false,
        air_conditioning: false,
    },
    Category {
        name: "Limited Stop",
        prefix: "LTD",
        corridor_fare: 100,
        speed_kmh: 30,
        seats: 40,
        fleet: 4,
        wifi: true,
        air_conditioning: false,
    },
    Category {
        name: "Superfast",
        prefix: "SFT",
        corridor_fare: 150,
        speed_kmh: 37,
        seats: 35,
        fleet: 3,
        wifi: true,
        air_conditioning: true,
    },
];

/// Stop pairs that get a day of service in the demo data.
const DEMO_ROUTES: &[(&str, &str)] = &[
    ("Kuttipuram", "Thrissur"),
    ("Thrissur", "Kuttipuram"),
    ("Changramkullam", "Kunamkullam"),
    ("Edappal", "Thrissur"),
];

/// A set of records to load into a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    pub stops: Vec<Stop>,
    pub buses: Vec<Bus>,
    pub trips: Vec<Trip>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_stop(&mut self, stop: Stop) -> &mut Self {
        self.stops.push(stop);
        self
    }

    pub fn add_bus(&mut self, bus: Bus) -> &mut Self {
        self.buses.push(bus);
        self
    }

    pub fn add_trip(&mut self, trip: Trip) -> &mut Self {
        self.trips.push(trip);
        self
    }

    /// Build one day of demo service starting at 06:00 on `service_date`
    /// in the `offset` zone.
    ///
    /// Every bus runs once on each demo route. Every fifth trip is sold
    /// out so searches show the seat filter at work.
    pub fn demo(service_date: NaiveDate, offset: FixedOffset) -> Self {
        let mut data = Dataset::new();

        for (name, _) in CORRIDOR {
            if let Ok(id) = StopId::parse(&slug(name)) {
                data.add_stop(Stop::new(id, *name));
            }
        }

        let mut fleet = Vec::new();
        let mut next_bus = 1;
        for category in CATEGORIES {
            for n in 0..category.fleet {
                let operator = if (next_bus + n) % 2 == 0 { "KSRTC" } else { "PRIVATE" };
                let bus = Bus::new(
                    BusId(next_bus as i64),
                    format!("{}-{}", category.prefix, 1000 + next_bus * 37),
                    category.name,
                    operator,
                    category.seats,
                )
                .with_amenities(category.wifi, category.air_conditioning);
                fleet.push((bus.clone(), category));
                data.add_bus(bus);
                next_bus += 1;
            }
        }

        let Some(day_start) = service_date
            .and_hms_opt(6, 0, 0)
            .and_then(|local| offset.from_local_datetime(&local).single())
        else {
            return data;
        };
        let day_start = day_start.with_timezone(&Utc);

        let mut next_trip = 1;
        for (route_idx, (from, to)) in DEMO_ROUTES.iter().enumerate() {
            let (Some(from_km), Some(to_km)) = (distance(from), distance(to)) else {
                continue;
            };
            let (Ok(origin), Ok(destination)) =
                (StopId::parse(&slug(from)), StopId::parse(&slug(to)))
            else {
                continue;
            };
            let km = u64::from(from_km.abs_diff(to_km));

            for (bus_idx, (bus, category)) in fleet.iter().enumerate() {
                let departure = day_start
                    + Duration::minutes((bus_idx as i64) * 45 + (route_idx as i64) * 10);
                let ride_mins = (km * 60).div_ceil(u64::from(category.speed_kmh));
                let arrival = departure + Duration::minutes(ride_mins as i64);
                let fare = (category.corridor_fare * 100 * km + CORRIDOR_KM / 2) / CORRIDOR_KM;

                let available_seats = if next_trip % 5 == 0 {
                    0
                } else {
                    bus.total_seats * (4 + (next_trip as u32 % 7)) / 10
                };

                data.add_trip(Trip {
                    id: TripId(next_trip),
                    bus_id: bus.id,
                    origin: origin.clone(),
                    destination: destination.clone(),
                    departure,
                    arrival,
                    fare: Fare::from_minor(fare),
                    available_seats,
                });
                next_trip += 1;
            }
        }

        data
    }
}

/// Derive a stop identifier from its display name.
///
/// # Examples
///
/// ```
/// use bus_server::store::slug;
///
/// assert_eq!(slug("Ansar Hospital"), "ansar-hospital");
/// ```
pub fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn distance(name: &str) -> Option<u32> {
    CORRIDOR
        .iter()
        .find(|(stop, _)| *stop == name)
        .map(|(_, km)| *km)
}
