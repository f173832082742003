//! Integration tests for `MigrationDb` against an in-memory database.

use chrono::{NaiveDate, TimeZone, Utc};
use sims_core::{
  person::{CanonicalUser, LegacyPerson},
  species::SpeciesMapping,
};

use crate::MigrationDb;

async fn db() -> MigrationDb {
  MigrationDb::open_in_memory().await.expect("in-memory db")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn user(family: &str, given: &str, ids: Vec<i64>) -> CanonicalUser {
  CanonicalUser {
    family_name:    family.to_string(),
    given_name:     given.to_string(),
    display_name:   format!("{given} {family}"),
    created_at:     date(2001, 3, 5),
    updated_at:     date(2004, 9, 9),
    spi_person_ids: ids,
  }
}

fn mapping(species_id: i64, name: &str, tsn: Option<i64>) -> SpeciesMapping {
  SpeciesMapping {
    spi_species_id:       species_id,
    spi_species_code:     format!("M-{species_id:03}"),
    spi_scientific_name:  name.to_string(),
    spi_rank:             "species".to_string(),
    itis_tsn:             tsn,
    itis_scientific_name: tsn.map(|_| name.to_string()),
    itis_rank:            tsn.map(|_| "Species".to_string()),
  }
}

// ─── Legacy persons ──────────────────────────────────────────────────────────

#[tokio::test]
async fn legacy_person_round_trip() {
  let db = db().await;
  let person = LegacyPerson {
    person_id:         7,
    project_id:        2,
    surname:           "Lee".to_string(),
    first_given_name:  "An".to_string(),
    second_given_name: "Marie".to_string(),
    created_at:        Utc.with_ymd_and_hms(2001, 3, 5, 8, 0, 0).unwrap(),
    updated_at:        Utc.with_ymd_and_hms(2002, 1, 1, 9, 0, 0).unwrap(),
  };

  db.insert_legacy_person(&person).await.unwrap();
  let loaded = db.load_legacy_persons().await.unwrap();
  assert_eq!(loaded.len(), 1);
  assert_eq!(loaded[0].person_id, 7);
  assert_eq!(loaded[0].surname, "Lee");
  assert_eq!(loaded[0].created_at, person.created_at);
}

// ─── User mappings ───────────────────────────────────────────────────────────

#[tokio::test]
async fn user_mappings_round_trip_with_duplicate_ids() {
  let db = db().await;
  db.insert_user_mappings(&[user("Lee", "An", vec![4, 4, 9])])
    .await
    .unwrap();

  let rows = db.load_user_mappings().await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].user.spi_person_ids, vec![4, 4, 9]);
  assert!(rows[0].sims_user_id.is_none());
}

#[tokio::test]
async fn materialize_creates_one_user_per_mapping_and_backfills_ids() {
  let db = db().await;
  db.insert_user_mappings(&[
    user("Lee", "An", vec![1]),
    user("Singh", "Ravi", vec![2, 3]),
  ])
  .await
  .unwrap();

  let created = db.materialize_system_users().await.unwrap();
  assert_eq!(created, 2);
  assert_eq!(db.table_count("system_user").await.unwrap(), 2);

  let rows = db.load_user_mappings().await.unwrap();
  let ids: Vec<i64> = rows.iter().map(|r| r.sims_user_id.unwrap()).collect();
  assert_eq!(ids.len(), 2);
  assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn materialize_mints_ids_past_preexisting_users() {
  let db = db().await;
  // The migration's acting principal exists before any run.
  db.execute_script(
    "INSERT INTO system_user (system_user_id, user_identifier, family_name,
       given_name, display_name, record_effective_date)
     VALUES (1, 'migrator', 'Migrator', 'Sims', 'Sims Migrator', '2000-01-01')"
      .to_string(),
  )
  .await
  .unwrap();

  db.insert_user_mappings(&[
    user("Lee", "An", vec![1]),
    user("Singh", "Ravi", vec![2, 3]),
  ])
  .await
  .unwrap();

  let created = db.materialize_system_users().await.unwrap();
  assert_eq!(created, 2);
  assert_eq!(db.table_count("system_user").await.unwrap(), 3);

  // Backfilled user ids are the freshly minted ones, never the principal's.
  let rows = db.load_user_mappings().await.unwrap();
  let ids: Vec<i64> = rows.iter().map(|r| r.sims_user_id.unwrap()).collect();
  assert!(ids.iter().all(|id| *id > 1));
  assert_ne!(ids[0], ids[1]);
}

// ─── Species mappings ────────────────────────────────────────────────────────

#[tokio::test]
async fn species_mappings_round_trip_including_null_tsn() {
  let db = db().await;
  db.insert_species_mappings(
    &[
      mapping(10, "Oreamnos americanus", Some(180711)),
      mapping(11, "Unknownia missingensis", None),
    ],
    50,
  )
  .await
  .unwrap();

  let rows = db.load_species_mappings().await.unwrap();
  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].itis_tsn, Some(180711));
  assert_eq!(rows[1].itis_tsn, None);
}

#[tokio::test]
async fn conflicting_tsn_keeps_first_writer() {
  let db = db().await;
  db.insert_species_mappings(&[mapping(10, "Oreamnos americanus", Some(180711))], 50)
    .await
    .unwrap();
  // A later batch claiming the same tsn must be dropped, not error.
  db.insert_species_mappings(&[mapping(11, "Oreamnos americanus", Some(180711))], 50)
    .await
    .unwrap();

  let rows = db.load_species_mappings().await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].spi_species_id, 10);

  let with_tsn = rows.iter().filter(|r| r.itis_tsn == Some(180711)).count();
  assert_eq!(with_tsn, 1);
}

#[tokio::test]
async fn multiple_null_tsn_rows_do_not_conflict() {
  let db = db().await;
  db.insert_species_mappings(
    &[mapping(10, "A b", None), mapping(11, "C d", None), mapping(12, "E f", None)],
    50,
  )
  .await
  .unwrap();
  assert_eq!(db.table_count("migrate_spi_taxon").await.unwrap(), 3);
}

#[tokio::test]
async fn bulk_insert_spans_multiple_batches() {
  let db = db().await;
  let rows: Vec<SpeciesMapping> =
    (0..120).map(|i| mapping(i, &format!("Genus sp{i}"), None)).collect();

  db.insert_species_mappings(&rows, 7).await.unwrap();
  assert_eq!(db.table_count("migrate_spi_taxon").await.unwrap(), 120);
}

// ─── Transactions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn rollback_discards_everything_since_begin() {
  let db = db().await;
  db.begin().await.unwrap();
  db.insert_user_mappings(&[user("Lee", "An", vec![1])]).await.unwrap();
  db.materialize_system_users().await.unwrap();
  db.rollback().await.unwrap();

  assert_eq!(db.table_count("migrate_user_dedup").await.unwrap(), 0);
  assert_eq!(db.table_count("system_user").await.unwrap(), 0);
}

#[tokio::test]
async fn commit_makes_writes_durable() {
  let db = db().await;
  db.begin().await.unwrap();
  db.insert_user_mappings(&[user("Lee", "An", vec![1])]).await.unwrap();
  db.commit().await.unwrap();

  assert_eq!(db.table_count("migrate_user_dedup").await.unwrap(), 1);
}

// ─── Truncation ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn truncate_reverses_migrated_rows_and_empties_engine_tables() {
  let db = db().await;
  db.insert_user_mappings(&[user("Lee", "An", vec![1])]).await.unwrap();
  db.materialize_system_users().await.unwrap();
  db.insert_species_mappings(&[mapping(10, "A b", Some(5))], 50).await.unwrap();

  db.truncate_run_artifacts().await.unwrap();

  assert_eq!(db.table_count("migrate_user_dedup").await.unwrap(), 0);
  assert_eq!(db.table_count("migrate_spi_taxon").await.unwrap(), 0);
  assert_eq!(db.table_count("system_user").await.unwrap(), 0);
}

#[tokio::test]
async fn truncate_leaves_rows_not_created_by_migration() {
  let db = db().await;
  // A pre-existing system user not recorded in the dedup mapping table.
  db.execute_script(
    "INSERT INTO system_user (system_user_id, user_identifier, family_name,
       given_name, display_name, record_effective_date)
     VALUES (999, 'ops', 'Ops', 'Admin', 'Admin Ops', '2000-01-01')"
      .to_string(),
  )
  .await
  .unwrap();

  db.truncate_run_artifacts().await.unwrap();
  assert_eq!(db.table_count("system_user").await.unwrap(), 1);
}
