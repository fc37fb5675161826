//! # Tickcap Store
//!
//! DuckDB-backed storage for tracked instruments and their price
//! observations. Implements the `InstrumentStore` port consumed by the
//! capture orchestrator.
//!
//! Observations are append-only; `captured_at` is stored as an RFC3339
//! UTC string so chronological ordering and round-tripping are exact.
//! All user-reachable values are bound as query parameters, never
//! interpolated.

pub mod migrations;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use duckdb::{Connection, ToSql};

use tickcap_core::{Instrument, Observation, StoreError, Symbol, UtcDateTime};

/// Storage location configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for tickcap data.
    pub home: PathBuf,
    /// Path to the DuckDB database file.
    pub db_path: PathBuf,
}

impl StoreConfig {
    /// Point the store at an explicit database file. The parent
    /// directory doubles as the data home.
    pub fn at(db_path: impl Into<PathBuf>) -> Self {
        let db_path = db_path.into();
        let home = db_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { home, db_path }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let home = resolve_tickcap_home();
        let db_path = home.join("tickcap.duckdb");
        Self { home, db_path }
    }
}

/// Instrument and observation storage over a single DuckDB file.
pub struct Store {
    connection: Mutex<Connection>,
}

impl Store {
    /// Open the store at the default location (`$TICKCAP_HOME`, falling
    /// back to `~/.tickcap`).
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(StoreConfig::default())
    }

    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| StoreError::Backend(error.to_string()))?;
        }

        let connection = Connection::open(&config.db_path).map_err(backend)?;
        migrations::apply_migrations(&connection).map_err(backend)?;
        log::debug!("opened store at {}", config.db_path.display());

        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .expect("store connection mutex poisoned")
    }

    /// Register an instrument if its symbol is not already tracked.
    /// A duplicate name under a different symbol is an invariant
    /// violation, not a database fault.
    pub fn upsert_instrument(&self, instrument: &Instrument) -> Result<(), StoreError> {
        let connection = self.conn();

        let symbol = instrument.symbol.as_str();
        let params: [&dyn ToSql; 2] = [&instrument.name, &symbol];
        let name_taken: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM instruments WHERE name = ? AND symbol <> ?",
                params.as_slice(),
                |row| row.get(0),
            )
            .map_err(backend)?;
        if name_taken > 0 {
            return Err(StoreError::InvalidRecord(format!(
                "instrument name '{}' is already tracked",
                instrument.name
            )));
        }

        let created_at = UtcDateTime::now().format_rfc3339();
        let params: [&dyn ToSql; 3] = [&symbol, &instrument.name, &created_at];
        connection
            .execute(
                "INSERT INTO instruments (symbol, name, created_at) \
                 VALUES (?, ?, ?) ON CONFLICT (symbol) DO NOTHING",
                params.as_slice(),
            )
            .map_err(backend)?;
        Ok(())
    }

    /// All tracked instruments in registration order.
    pub fn list_instruments(&self) -> Result<Vec<Instrument>, StoreError> {
        let connection = self.conn();
        let mut statement = connection
            .prepare("SELECT symbol, name FROM instruments ORDER BY id")
            .map_err(backend)?;

        let rows = statement
            .query_map([], |row| {
                let symbol: String = row.get(0)?;
                let name: String = row.get(1)?;
                Ok((symbol, name))
            })
            .map_err(backend)?;

        let mut instruments = Vec::new();
        for row in rows {
            let (symbol, name) = row.map_err(backend)?;
            instruments.push(instrument_from_row(&symbol, name)?);
        }
        Ok(instruments)
    }

    pub fn find_instrument(&self, symbol: &Symbol) -> Result<Option<Instrument>, StoreError> {
        let connection = self.conn();
        let mut statement = connection
            .prepare("SELECT symbol, name FROM instruments WHERE symbol = ?")
            .map_err(backend)?;

        let symbol = symbol.as_str();
        let params: [&dyn ToSql; 1] = [&symbol];
        let mut rows = statement
            .query_map(params.as_slice(), |row| {
                let symbol: String = row.get(0)?;
                let name: String = row.get(1)?;
                Ok((symbol, name))
            })
            .map_err(backend)?;

        match rows.next() {
            Some(row) => {
                let (symbol, name) = row.map_err(backend)?;
                Ok(Some(instrument_from_row(&symbol, name)?))
            }
            None => Ok(None),
        }
    }

    /// Append one observation. Rejects symbols that are not tracked, so
    /// no observation can exist without an owning instrument.
    pub fn insert_observation(&self, observation: &Observation) -> Result<(), StoreError> {
        let connection = self.conn();

        let symbol = observation.symbol.as_str();
        let params: [&dyn ToSql; 1] = [&symbol];
        let known: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM instruments WHERE symbol = ?",
                params.as_slice(),
                |row| row.get(0),
            )
            .map_err(backend)?;
        if known == 0 {
            return Err(StoreError::InvalidRecord(format!(
                "unknown instrument {}",
                observation.symbol
            )));
        }

        let captured_at = observation.captured_at.format_rfc3339();
        let params: [&dyn ToSql; 5] = [
            &symbol,
            &observation.last,
            &observation.bid,
            &observation.ask,
            &captured_at,
        ];
        connection
            .execute(
                "INSERT INTO observations (symbol, last, bid, ask, captured_at) \
                 VALUES (?, ?, ?, ?, ?)",
                params.as_slice(),
            )
            .map_err(backend)?;
        Ok(())
    }

    /// Most recent observation for a symbol, if any.
    pub fn latest_observation(&self, symbol: &Symbol) -> Result<Option<Observation>, StoreError> {
        Ok(self.list_observations(symbol, 1)?.into_iter().next())
    }

    /// Up to `limit` observations for a symbol, newest first.
    pub fn list_observations(
        &self,
        symbol: &Symbol,
        limit: usize,
    ) -> Result<Vec<Observation>, StoreError> {
        let connection = self.conn();
        let mut statement = connection
            .prepare(
                "SELECT symbol, last, bid, ask, captured_at FROM observations \
                 WHERE symbol = ? ORDER BY captured_at DESC, id DESC LIMIT ?",
            )
            .map_err(backend)?;

        let symbol = symbol.as_str();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let params: [&dyn ToSql; 2] = [&symbol, &limit];
        let rows = statement
            .query_map(params.as_slice(), |row| {
                let symbol: String = row.get(0)?;
                let last: f64 = row.get(1)?;
                let bid: f64 = row.get(2)?;
                let ask: f64 = row.get(3)?;
                let captured_at: String = row.get(4)?;
                Ok((symbol, last, bid, ask, captured_at))
            })
            .map_err(backend)?;

        let mut observations = Vec::new();
        for row in rows {
            let (symbol, last, bid, ask, captured_at) = row.map_err(backend)?;
            observations.push(observation_from_row(&symbol, last, bid, ask, &captured_at)?);
        }
        Ok(observations)
    }

    /// Delete every observation for a symbol (used by instrument removal
    /// flows). Returns the number of rows removed.
    pub fn delete_observations(&self, symbol: &Symbol) -> Result<usize, StoreError> {
        let symbol = symbol.as_str();
        let params: [&dyn ToSql; 1] = [&symbol];
        self.conn()
            .execute(
                "DELETE FROM observations WHERE symbol = ?",
                params.as_slice(),
            )
            .map_err(backend)
    }

    pub fn count_observations(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM observations", [], |row| row.get(0))
            .map_err(backend)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl tickcap_core::InstrumentStore for Store {
    fn list_instruments(&self) -> Result<Vec<Instrument>, StoreError> {
        Store::list_instruments(self)
    }

    fn insert_observation(&self, observation: &Observation) -> Result<(), StoreError> {
        Store::insert_observation(self, observation)
    }
}

fn backend(error: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(error.to_string())
}

fn instrument_from_row(symbol: &str, name: String) -> Result<Instrument, StoreError> {
    let symbol = Symbol::parse(symbol)
        .map_err(|error| StoreError::InvalidRecord(error.to_string()))?;
    Instrument::new(symbol, name).map_err(|error| StoreError::InvalidRecord(error.to_string()))
}

fn observation_from_row(
    symbol: &str,
    last: f64,
    bid: f64,
    ask: f64,
    captured_at: &str,
) -> Result<Observation, StoreError> {
    let symbol = Symbol::parse(symbol)
        .map_err(|error| StoreError::InvalidRecord(error.to_string()))?;
    let captured_at = UtcDateTime::parse(captured_at)
        .map_err(|error| StoreError::InvalidRecord(error.to_string()))?;
    Observation::new(symbol, last, bid, ask, captured_at)
        .map_err(|error| StoreError::InvalidRecord(error.to_string()))
}

fn resolve_tickcap_home() -> PathBuf {
    if let Some(path) = env::var_os("TICKCAP_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".tickcap");
    }

    PathBuf::from(".tickcap")
}
