//! User deduplication stage.
//!
//! Thin driver: the grouping decision itself lives in
//! [`sims_core::person::dedup_persons`]; this stage loads the legacy rows,
//! writes the mapping table, and materializes one new-schema system user
//! per canonical identity. Any write failure propagates and fails the run —
//! there is no per-group retry.

use sims_store_sqlite::MigrationDb;

use crate::Result;

#[derive(Debug, Clone, Copy)]
pub struct DedupSummary {
  pub legacy_rows:     usize,
  pub canonical_users: usize,
}

pub async fn run(db: &MigrationDb) -> Result<DedupSummary> {
  let persons = db.load_legacy_persons().await?;
  let users = sims_core::person::dedup_persons(&persons);

  db.insert_user_mappings(&users).await?;
  let created = db.materialize_system_users().await?;

  tracing::info!(
    legacy_rows = persons.len(),
    canonical_users = users.len(),
    users_created = created,
    "deduplicated legacy persons"
  );

  Ok(DedupSummary {
    legacy_rows:     persons.len(),
    canonical_users: users.len(),
  })
}
