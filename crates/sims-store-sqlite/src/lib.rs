//! SQLite backend for the SPI → SIMS migration engine.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The single connection is the
//! run's single transaction boundary: statements issued between
//! [`MigrationDb::begin`] and [`MigrationDb::commit`] are atomic as a whole.

mod batch;
mod db;
mod encode;
mod schema;

pub mod error;

pub use batch::{BatchInsert, ConflictPolicy, DEFAULT_BATCH_SIZE};
pub use db::{MigrationDb, UserMappingRow};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
