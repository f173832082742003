//! `sims-migrate` — one-shot SPI → SIMS legacy data migration.
//!
//! Reads `config.toml` (or the path specified with `--config`), layered
//! under `SIMS_`-prefixed environment variables, then executes the full
//! migration run inside a single transaction. Exit status is nonzero if
//! the run rolled back.

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use sims_itis::{sheet, ItisClient};
use sims_pipeline::{MigrationConfig, RunOptions};
use sims_store_sqlite::MigrationDb;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "SPI to SIMS legacy data migration")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SIMS"))
    .build()
    .context("failed to read config file")?;

  let migration_cfg: MigrationConfig = settings
    .try_deserialize()
    .context("failed to deserialise MigrationConfig")?;

  // Load the legacy species reference sheet up front; a bad sheet should
  // fail the run before the database is touched.
  let candidates = sheet::read_reference_sheet(&migration_cfg.reference_sheet)
    .with_context(|| {
      format!(
        "failed to read reference sheet at {:?}",
        migration_cfg.reference_sheet
      )
    })?;
  tracing::info!(candidates = candidates.len(), "loaded species reference sheet");

  let db = MigrationDb::open(&migration_cfg.database_path)
    .await
    .with_context(|| {
      format!("failed to open database at {:?}", migration_cfg.database_path)
    })?;

  let authority = ItisClient::new(
    &migration_cfg.authority_base_url,
    Duration::from_secs(migration_cfg.request_timeout_secs),
  )
  .context("failed to build authority client")?;

  let options = RunOptions::from_config(&migration_cfg);
  let summary = sims_pipeline::run(&db, &authority, candidates, options)
    .await
    .context("migration run failed and was rolled back")?;

  println!("migration committed");
  println!("  canonical users:  {}", summary.canonical_users);
  println!("  species mappings: {}", summary.species_mappings);
  for (stage, rows) in &summary.stage_rows {
    println!("  {stage}: {rows} rows");
  }

  Ok(())
}
