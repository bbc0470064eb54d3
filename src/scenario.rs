//! Defines adapters for constructing scenarios from external sources.

use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use chrono::{ParseError, TimeDelta};
use rusqlite::Connection;

use crate::{
    crew::{Crew, HOTEL_COST},
    flight::{parse_time, AirportCode, Flight},
    ip::SolverConfig,
    pairing::{hours_to_duration, PairingConfig},
};

/// Everything a scenario can say about how to plan it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub pairing: PairingConfig,
    pub hotel_cost: f64,
    pub solver: SolverConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            pairing: PairingConfig::default(),
            hotel_cost: HOTEL_COST,
            solver: SolverConfig::default(),
        }
    }
}

pub trait ScenarioLoader<E: std::fmt::Debug> {
    fn read_flights(&self) -> Result<Vec<Flight>, E>;
    fn read_crews(&self) -> Result<Vec<Crew>, E>;
    fn read_config(&self) -> Result<ScenarioConfig, E>;
}

#[derive(Debug)]
pub enum ScenarioLoaderError {
    DatabaseError(rusqlite::Error),
    CsvError(csv::Error),
    IoError(std::io::Error),
    MissingRequiredDataError(&'static str),
    InvalidDataError(&'static str),
    FormatError(ParseError),
}

impl From<rusqlite::Error> for ScenarioLoaderError {
    fn from(value: rusqlite::Error) -> Self {
        Self::DatabaseError(value)
    }
}
impl From<csv::Error> for ScenarioLoaderError {
    fn from(value: csv::Error) -> Self {
        Self::CsvError(value)
    }
}
impl From<std::io::Error> for ScenarioLoaderError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value)
    }
}
impl From<ParseError> for ScenarioLoaderError {
    fn from(value: ParseError) -> Self {
        Self::FormatError(value)
    }
}

impl fmt::Display for ScenarioLoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatabaseError(e) => write!(f, "database error: {}", e),
            Self::CsvError(e) => write!(f, "csv error: {}", e),
            Self::IoError(e) => write!(f, "i/o error: {}", e),
            Self::MissingRequiredDataError(what) => write!(f, "missing data: {}", what),
            Self::InvalidDataError(what) => write!(f, "invalid data: {}", what),
            Self::FormatError(e) => write!(f, "bad timestamp: {}", e),
        }
    }
}

impl std::error::Error for ScenarioLoaderError {}

/// Reads `flights.csv` and `crews.csv` from a directory. The directory
/// carries no parameters, so the configuration is the default one.
pub struct CsvScenarioLoader {
    dir: PathBuf,
}

impl CsvScenarioLoader {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn flights_path(&self) -> PathBuf {
        self.dir.join("flights.csv")
    }

    pub fn crews_path(&self) -> PathBuf {
        self.dir.join("crews.csv")
    }
}

impl ScenarioLoader<ScenarioLoaderError> for CsvScenarioLoader {
    fn read_flights(&self) -> Result<Vec<Flight>, ScenarioLoaderError> {
        read_flights_csv(File::open(self.flights_path())?)
    }

    fn read_crews(&self) -> Result<Vec<Crew>, ScenarioLoaderError> {
        read_crews_csv(File::open(self.crews_path())?)
    }

    fn read_config(&self) -> Result<ScenarioConfig, ScenarioLoaderError> {
        Ok(ScenarioConfig::default())
    }
}

pub fn read_flights_csv<R: std::io::Read>(reader: R) -> Result<Vec<Flight>, ScenarioLoaderError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut flights = Vec::new();
    for record in reader.deserialize() {
        flights.push(record?);
    }
    Ok(flights)
}

pub fn read_crews_csv<R: std::io::Read>(reader: R) -> Result<Vec<Crew>, ScenarioLoaderError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut crews = Vec::new();
    for record in reader.deserialize() {
        crews.push(record?);
    }
    Ok(crews)
}

/// Reads one scenario (`sid`) out of a SQLite database with tables
/// `scenarios`, `flights` and `crews`.
pub struct SqliteScenarioLoader {
    conn: Connection,
    id: String,
}

impl SqliteScenarioLoader {
    pub fn new(path: &str, scenario_id: String) -> Result<Self, ScenarioLoaderError> {
        Ok(Self {
            conn: Connection::open(path)?,
            id: scenario_id,
        })
    }

    pub fn from_connection(conn: Connection, scenario_id: String) -> Self {
        Self {
            conn,
            id: scenario_id,
        }
    }
}

impl ScenarioLoader<ScenarioLoaderError> for SqliteScenarioLoader {
    fn read_flights(&self) -> Result<Vec<Flight>, ScenarioLoaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT flight_id, origin, dest, dep_time, arr_time, aircraft FROM flights WHERE sid = ?1")?;
        let mut rows = stmt.query([&self.id])?;
        let mut flights = Vec::new();
        while let Some(row) = rows.next()? {
            flights.push(Flight {
                id: row.get("flight_id")?,
                origin: AirportCode::from(&row.get::<&str, String>("origin")?),
                dest: AirportCode::from(&row.get::<&str, String>("dest")?),
                depart_time: parse_time(&row.get::<&str, String>("dep_time")?)?,
                arrive_time: parse_time(&row.get::<&str, String>("arr_time")?)?,
                aircraft: row.get("aircraft")?,
            });
        }
        Ok(flights)
    }

    fn read_crews(&self) -> Result<Vec<Crew>, ScenarioLoaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT crew_id, base, max_duty_hours, hourly_cost FROM crews WHERE sid = ?1",
        )?;
        let mut rows = stmt.query([&self.id])?;
        let mut crews = Vec::new();
        while let Some(row) = rows.next()? {
            crews.push(Crew {
                crew_id: row.get("crew_id")?,
                base: AirportCode::from(&row.get::<&str, String>("base")?),
                max_duty_hours: row.get("max_duty_hours")?,
                hourly_cost: row.get("hourly_cost")?,
            });
        }
        Ok(crews)
    }

    fn read_config(&self) -> Result<ScenarioConfig, ScenarioLoaderError> {
        let mut stmt = self.conn.prepare(
            "SELECT min_turn_minutes, max_duty_hours, max_pairing_len, hotel_cost, time_limit_ms FROM scenarios WHERE sid = (?1)")?;
        let mut rows = stmt.query([&self.id])?;
        let Some(row) = rows.next()? else {
            return Err(ScenarioLoaderError::MissingRequiredDataError(
                "Missing config info",
            ));
        };

        let max_duty_hours: f64 = row.get("max_duty_hours")?;
        let max_pairing_len: i64 = row.get("max_pairing_len")?;
        let time_limit_ms: Option<i64> = row.get("time_limit_ms")?;
        let hotel_cost: Option<f64> = row.get("hotel_cost")?;
        let min_turn = TimeDelta::try_minutes(row.get("min_turn_minutes")?)
            .ok_or(ScenarioLoaderError::InvalidDataError("min_turn_minutes out of range"))?;
        let max_duty = hours_to_duration(max_duty_hours)
            .ok_or(ScenarioLoaderError::InvalidDataError("max_duty_hours out of range"))?;
        Ok(ScenarioConfig {
            pairing: PairingConfig::default()
                .with_min_turn(min_turn)
                .with_max_duty(max_duty)
                .with_max_legs(max_pairing_len.max(0) as usize),
            hotel_cost: hotel_cost.unwrap_or(HOTEL_COST),
            solver: SolverConfig {
                time_limit_ms: time_limit_ms.map(|ms| ms.max(0) as u64),
                node_limit: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "
        CREATE TABLE scenarios (sid TEXT, min_turn_minutes INTEGER, max_duty_hours REAL,
                                max_pairing_len INTEGER, hotel_cost REAL, time_limit_ms INTEGER);
        CREATE TABLE flights (sid TEXT, flight_id TEXT, origin TEXT, dest TEXT,
                              dep_time TEXT, arr_time TEXT, aircraft TEXT);
        CREATE TABLE crews (sid TEXT, crew_id TEXT, base TEXT, max_duty_hours REAL, hourly_cost REAL);
        INSERT INTO scenarios VALUES ('s1', 30, 8.5, 4, NULL, 5000);
        INSERT INTO flights VALUES ('s1', 'F0000', 'A0', 'A1', '2025-10-01T08:00:00', '2025-10-01T09:10:00', 'A320');
        INSERT INTO flights VALUES ('s1', 'F0001', 'A1', 'A0', '2025-10-01 10:00:00', '2025-10-01 11:00:00', 'A320');
        INSERT INTO flights VALUES ('s2', 'F9999', 'A1', 'A0', '2025-10-01T10:00:00', '2025-10-01T11:00:00', 'A320');
        INSERT INTO crews VALUES ('s1', 'C000', 'A0', 10.0, 75.0);
    ";

    fn loader() -> SqliteScenarioLoader {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        SqliteScenarioLoader::from_connection(conn, "s1".into())
    }

    #[test]
    fn sqlite_reads_one_scenario() {
        let loader = loader();
        let flights = loader.read_flights().unwrap();
        assert_eq!(flights.len(), 2);
        assert_eq!(flights[1].block_time(), TimeDelta::hours(1));

        let crews = loader.read_crews().unwrap();
        assert_eq!(crews, vec![Crew::new("C000", "A0", 75.0)]);

        let config = loader.read_config().unwrap();
        assert_eq!(config.pairing.min_turn, TimeDelta::minutes(30));
        assert_eq!(config.pairing.max_duty, TimeDelta::minutes(510));
        assert_eq!(config.pairing.max_legs, 4);
        assert_eq!(config.hotel_cost, HOTEL_COST);
        assert_eq!(config.solver.time_limit_ms, Some(5000));
    }

    #[test]
    fn sqlite_missing_scenario() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        let loader = SqliteScenarioLoader::from_connection(conn, "nope".into());
        assert!(matches!(
            loader.read_config(),
            Err(ScenarioLoaderError::MissingRequiredDataError(_))
        ));
        assert!(loader.read_flights().unwrap().is_empty());
    }

    #[test]
    fn sqlite_out_of_range_bounds_are_errors() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(
            "INSERT INTO scenarios VALUES ('wide', 30, 1e300, 4, NULL, NULL);
             INSERT INTO scenarios VALUES ('late', 9223372036854775807, 8.0, 4, NULL, NULL);",
        )
        .unwrap();
        let wide = SqliteScenarioLoader::from_connection(conn, "wide".into());
        assert!(matches!(
            wide.read_config(),
            Err(ScenarioLoaderError::InvalidDataError(_))
        ));
        let late = SqliteScenarioLoader::from_connection(wide.conn, "late".into());
        assert!(matches!(
            late.read_config(),
            Err(ScenarioLoaderError::InvalidDataError(_))
        ));
    }

    #[test]
    fn csv_readers() {
        let flights = "flight_id,origin,dest,dep_time,arr_time,aircraft\n\
                       F0000,A0,A1,2025-10-01T08:00:00,2025-10-01T09:10:00,A320\n";
        let crews = "crew_id,base,max_duty_hours,hourly_cost\nC000,A0,10.0,80.0\n";
        assert_eq!(read_flights_csv(flights.as_bytes()).unwrap()[0].id, "F0000");
        assert_eq!(read_crews_csv(crews.as_bytes()).unwrap()[0].hourly_cost, 80.0);
    }

    #[test]
    fn csv_bad_timestamp_is_reported() {
        let flights = "flight_id,origin,dest,dep_time,arr_time,aircraft\n\
                       F0000,A0,A1,soon,2025-10-01T09:10:00,A320\n";
        assert!(matches!(
            read_flights_csv(flights.as_bytes()),
            Err(ScenarioLoaderError::CsvError(_))
        ));
    }

    #[test]
    fn csv_missing_directory() {
        let loader = CsvScenarioLoader::new("/definitely/not/here");
        assert!(matches!(loader.read_flights(), Err(ScenarioLoaderError::IoError(_))));
    }
}
