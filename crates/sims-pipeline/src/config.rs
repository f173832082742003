//! Runtime configuration for a migration run.
//!
//! Deserialised by the binary from an optional TOML file layered with
//! `SIMS_`-prefixed environment variables. Development-mode truncation is a
//! standing property of the environment, not a per-invocation flag.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MigrationConfig {
  /// Path of the migration SQLite database.
  pub database_path:   PathBuf,
  /// Base URL of the external taxonomic authority.
  pub authority_base_url: String,
  /// Path of the legacy species reference spreadsheet (CSV).
  pub reference_sheet: PathBuf,

  /// Candidates per external authority query.
  #[serde(default = "default_chunk_size")]
  pub chunk_size: usize,
  /// Rows per bulk-insert statement.
  #[serde(default = "default_insert_batch_size")]
  pub insert_batch_size: usize,
  /// Per-request authority timeout, seconds.
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
  /// Deployment environment name. `development` enables pre-run truncation
  /// of engine-owned tables and reversal of previously migrated rows.
  #[serde(default = "default_environment")]
  pub environment: String,
}

impl MigrationConfig {
  pub fn is_development(&self) -> bool {
    self.environment == "development"
  }
}

fn default_chunk_size() -> usize {
  sims_itis::query::DEFAULT_CHUNK_SIZE
}

fn default_insert_batch_size() -> usize {
  sims_store_sqlite::DEFAULT_BATCH_SIZE
}

fn default_request_timeout_secs() -> u64 {
  30
}

fn default_environment() -> String {
  "production".to_string()
}
