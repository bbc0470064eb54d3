//! Synthetic schedules for demos, tests and benchmarks.

use chrono::{NaiveDate, TimeDelta};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::crew::{Crew, DEFAULT_HOURLY_COST};
use crate::flight::{Flight, Timestamp};

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub num_airports: usize,
    pub num_flights: usize,
    pub num_crews: usize,
    /// Departures fall uniformly within `span_hours` of midnight on this day.
    pub start_date: NaiveDate,
    pub span_hours: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_airports: 6,
            num_flights: 80,
            num_crews: 20,
            start_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap_or_default(),
            span_hours: 24.0,
            seed: 1,
        }
    }
}

impl GeneratorConfig {
    pub fn with_num_airports(mut self, n: usize) -> Self {
        self.num_airports = n.max(2);
        self
    }

    pub fn with_num_flights(mut self, n: usize) -> Self {
        self.num_flights = n;
        self
    }

    pub fn with_num_crews(mut self, n: usize) -> Self {
        self.num_crews = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

pub fn airports(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("A{}", i)).collect()
}

/// Flights `F0000..` between random airport pairs, 30 to 180 minutes
/// long, sorted by departure.
pub fn generate_flights(config: &GeneratorConfig) -> Vec<Flight> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let airports = airports(config.num_airports.max(2));
    let base = Timestamp::from(config.start_date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc());
    let span_secs = (config.span_hours.max(0.0) * 3600.0) as i64;

    let mut flights: Vec<Flight> = (0..config.num_flights)
        .map(|i| {
            let origin = rng.random_range(0..airports.len());
            // Any airport but the origin.
            let mut dest = rng.random_range(0..airports.len() - 1);
            if dest >= origin {
                dest += 1;
            }
            let depart = base + TimeDelta::seconds(rng.random_range(0..span_secs.max(1)));
            let duration = TimeDelta::minutes(rng.random_range(30..=180));
            Flight::new(
                format!("F{:04}", i),
                &airports[origin],
                &airports[dest],
                depart,
                depart + duration,
            )
        })
        .collect();
    flights.sort_by_key(|f| f.depart_time);
    flights
}

/// Crews `C000..` based at random airports, all at the default rate.
pub fn generate_crews(config: &GeneratorConfig) -> Vec<Crew> {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
    let airports = airports(config.num_airports.max(2));
    (0..config.num_crews)
        .map(|i| {
            let base = &airports[rng.random_range(0..airports.len())];
            Crew::new(format!("C{:03}", i), base, DEFAULT_HOURLY_COST)
        })
        .collect()
}
