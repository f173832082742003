//! The SPI → SIMS migration pipeline.
//!
//! One run is a single transaction: the orchestrator opens it, sequences
//! user deduplication, species reconciliation, and the entity transformers
//! in stage-plan order, and commits only if every stage succeeds. Any stage
//! failure rolls the whole run back; the database is left exactly as it was
//! before the run started.

pub mod config;
pub mod dedup;
pub mod error;
pub mod orchestrator;
pub mod reconcile;
pub mod transform;

pub use config::MigrationConfig;
pub use error::{Error, Result};
pub use orchestrator::{run, RunOptions, RunSummary};
