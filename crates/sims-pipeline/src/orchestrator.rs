//! Run orchestration.
//!
//! Validates the stage plan, opens the run's single transaction, drives the
//! stages in plan order, and commits only if every stage succeeded. On any
//! failure the transaction is rolled back and the error propagates; the
//! database is then byte-for-byte what it was before the run.

use sims_core::stage::{MIGRATION_PLAN, SOURCE_TABLES};
use sims_core::species::SpeciesCandidate;
use sims_itis::TaxonAuthority;
use sims_store_sqlite::MigrationDb;

use crate::{config::MigrationConfig, dedup, reconcile, transform::Transformer, Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
  /// Reverse any previous run's rows before starting. Development only.
  pub truncate_first:    bool,
  /// Candidates per external authority query.
  pub chunk_size:        usize,
  /// Rows per bulk-insert statement.
  pub insert_batch_size: usize,
}

impl RunOptions {
  pub fn from_config(config: &MigrationConfig) -> Self {
    Self {
      truncate_first:    config.is_development(),
      chunk_size:        config.chunk_size,
      insert_batch_size: config.insert_batch_size,
    }
  }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
  pub canonical_users:  usize,
  pub species_mappings: usize,
  /// Destination-table row counts, one entry per transformer stage.
  pub stage_rows:       Vec<(&'static str, i64)>,
}

/// Execute a full migration run inside one transaction.
pub async fn run<A: TaxonAuthority>(
  db: &MigrationDb,
  authority: &A,
  candidates: Vec<SpeciesCandidate>,
  options: RunOptions,
) -> Result<RunSummary> {
  sims_core::stage::validate_plan(MIGRATION_PLAN, SOURCE_TABLES)?;

  db.begin().await?;
  match run_stages(db, authority, candidates, options).await {
    Ok(summary) => {
      db.commit().await?;
      tracing::info!(
        canonical_users = summary.canonical_users,
        species_mappings = summary.species_mappings,
        "migration run committed"
      );
      Ok(summary)
    }
    Err(e) => {
      if let Err(rollback_err) = db.rollback().await {
        tracing::error!(error = %rollback_err, "rollback failed");
      }
      Err(e)
    }
  }
}

async fn run_stages<A: TaxonAuthority>(
  db: &MigrationDb,
  authority: &A,
  mut candidates: Vec<SpeciesCandidate>,
  options: RunOptions,
) -> Result<RunSummary> {
  if options.truncate_first {
    tracing::info!("development run: reversing previously migrated rows");
    db.truncate_run_artifacts().await?;
  }

  let mut summary = RunSummary {
    canonical_users:  0,
    species_mappings: 0,
    stage_rows:       Vec::new(),
  };

  for stage in MIGRATION_PLAN {
    tracing::info!(stage = stage.name, "transforming");

    match stage.name {
      "user_dedup" => {
        let dedup = dedup::run(db).await?;
        summary.canonical_users = dedup.canonical_users;
      }
      "species_reconciliation" => {
        summary.species_mappings = reconcile::run(
          db,
          authority,
          std::mem::take(&mut candidates),
          options.chunk_size,
          options.insert_batch_size,
        )
        .await?;
      }
      name => {
        let transformer = Transformer::for_stage(name)
          .ok_or_else(|| Error::UnknownStage(name.to_string()))?;
        let rows = transformer.apply(db).await?;
        summary.stage_rows.push((name, rows));
        tracing::info!(stage = name, rows, "successfully transformed");
      }
    }
  }

  Ok(summary)
}
