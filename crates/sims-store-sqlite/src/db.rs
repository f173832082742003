//! [`MigrationDb`] — the explicit connection/transaction handle threaded
//! through every migration stage.
//!
//! The orchestrator, not ambient module state, owns this handle's lifetime.
//! All statements run on the single underlying connection, so everything
//! issued between [`MigrationDb::begin`] and [`MigrationDb::commit`] forms
//! one transaction; [`MigrationDb::rollback`] discards it in full.

use std::path::Path;

use rusqlite::types::Value;
use sims_core::{
  person::{CanonicalUser, LegacyPerson},
  species::SpeciesMapping,
};

use crate::{
  batch::{BatchInsert, ConflictPolicy},
  encode::{
    decode_date, decode_dt, decode_person_ids, encode_date, encode_dt,
    encode_person_ids,
  },
  schema::{SCHEMA, TRUNCATE},
  Result,
};

const USER_DEDUP_COLUMNS: &[&str] = &[
  "family_name",
  "given_name",
  "display_name",
  "created_at",
  "updated_at",
  "spi_person_ids",
];

const SPI_TAXON_COLUMNS: &[&str] = &[
  "spi_species_id",
  "spi_species_code",
  "spi_scientific_name",
  "spi_rank",
  "itis_tsn",
  "itis_scientific_name",
  "itis_rank",
];

// ─── Handle ──────────────────────────────────────────────────────────────────

/// Migration database handle backed by a single SQLite connection.
///
/// Cloning is cheap — the inner connection is reference-counted, and all
/// clones serialize onto the same connection (and therefore the same open
/// transaction). The connection is released when the last clone drops,
/// on the success and failure paths alike.
#[derive(Clone)]
pub struct MigrationDb {
  conn: tokio_rusqlite::Connection,
}

/// One `migrate_user_dedup` row as read back from the store.
#[derive(Debug, Clone)]
pub struct UserMappingRow {
  pub user_dedup_id: i64,
  pub user:          CanonicalUser,
  pub sims_user_id:  Option<i64>,
}

impl MigrationDb {
  /// Open (or create) the migration database at `path` and run schema
  /// initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let db = Self { conn };
    db.init_schema().await?;
    Ok(db)
  }

  /// Open an in-memory database — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let db = Self { conn };
    db.init_schema().await?;
    Ok(db)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Transaction control ───────────────────────────────────────────────────

  pub async fn begin(&self) -> Result<()> {
    self.execute_batch_sql("BEGIN IMMEDIATE").await
  }

  pub async fn commit(&self) -> Result<()> {
    self.execute_batch_sql("COMMIT").await
  }

  pub async fn rollback(&self) -> Result<()> {
    self.execute_batch_sql("ROLLBACK").await
  }

  /// Execute a multi-statement SQL script with no parameters.
  pub async fn execute_batch_sql(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Execute an arbitrary SQL script. Used by tests and development tooling
  /// to seed legacy fixture rows.
  pub async fn execute_script(&self, sql: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn table_count(&self, table: &'static str) -> Result<i64> {
    let n = self
      .conn
      .call(move |conn| {
        let n: i64 =
          conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
        Ok(n)
      })
      .await?;
    Ok(n)
  }

  /// Development-mode cleanup: reverse previously migrated rows and empty
  /// every engine-owned table. Runs inside the ambient transaction.
  pub async fn truncate_run_artifacts(&self) -> Result<()> {
    self.execute_batch_sql(TRUNCATE).await
  }

  // ── Bulk inserts ──────────────────────────────────────────────────────────

  /// Execute a bulk insert, splitting `rows` into `insert.batch_size`-row
  /// parameterized statements.
  pub async fn run_batch_insert(
    &self,
    insert: BatchInsert,
    rows: Vec<Vec<Value>>,
  ) -> Result<()> {
    if rows.is_empty() {
      return Ok(());
    }
    self
      .conn
      .call(move |conn| {
        for batch in rows.chunks(insert.batch_size) {
          let sql = insert.statement(batch.len());
          conn.execute(&sql, rusqlite::params_from_iter(batch.iter().flatten()))?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── User deduplication ────────────────────────────────────────────────────

  /// Load every legacy person row, in storage order.
  pub async fn load_legacy_persons(&self) -> Result<Vec<LegacyPerson>> {
    struct Raw {
      person_id:         i64,
      project_id:        i64,
      surname:           String,
      first_given_name:  String,
      second_given_name: String,
      created_at:        String,
      updated_at:        String,
    }

    let raws: Vec<Raw> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT person_id, project_id, surname, first_given_name,
                  second_given_name, created_at, updated_at
           FROM spi_person
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Raw {
              person_id:         row.get(0)?,
              project_id:        row.get(1)?,
              surname:           row.get(2)?,
              first_given_name:  row.get(3)?,
              second_given_name: row.get(4)?,
              created_at:        row.get(5)?,
              updated_at:        row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|r| {
        Ok(LegacyPerson {
          person_id:         r.person_id,
          project_id:        r.project_id,
          surname:           r.surname,
          first_given_name:  r.first_given_name,
          second_given_name: r.second_given_name,
          created_at:        decode_dt(&r.created_at)?,
          updated_at:        decode_dt(&r.updated_at)?,
        })
      })
      .collect()
  }

  /// Seed one legacy person fixture row.
  pub async fn insert_legacy_person(&self, person: &LegacyPerson) -> Result<()> {
    let person = person.clone();
    let created_at = encode_dt(person.created_at);
    let updated_at = encode_dt(person.updated_at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO spi_person (person_id, project_id, surname,
             first_given_name, second_given_name, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            person.person_id,
            person.project_id,
            person.surname,
            person.first_given_name,
            person.second_given_name,
            created_at,
            updated_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write one `migrate_user_dedup` row per canonical user.
  pub async fn insert_user_mappings(&self, users: &[CanonicalUser]) -> Result<()> {
    let rows = users
      .iter()
      .map(|u| {
        Ok(vec![
          Value::Text(u.family_name.clone()),
          Value::Text(u.given_name.clone()),
          Value::Text(u.display_name.clone()),
          Value::Text(encode_date(u.created_at)),
          Value::Text(encode_date(u.updated_at)),
          Value::Text(encode_person_ids(&u.spi_person_ids)?),
        ])
      })
      .collect::<Result<Vec<_>>>()?;

    let insert =
      BatchInsert::new("migrate_user_dedup", USER_DEDUP_COLUMNS, ConflictPolicy::Strict);
    self.run_batch_insert(insert, rows).await
  }

  /// Materialize one new-schema `system_user` per mapping row, then record
  /// the resulting user id back on the mapping row. `system_user` mints its
  /// own ids — the table already holds rows (at minimum the migration's
  /// acting principal) before the run, so mapping-table ids cannot be
  /// reused as user ids.
  ///
  /// Returns the number of users created.
  pub async fn materialize_system_users(&self) -> Result<i64> {
    let created = self
      .conn
      .call(|conn| {
        struct Pending {
          user_dedup_id: i64,
          family_name:   String,
          given_name:    String,
          display_name:  String,
          created_at:    String,
        }

        let pending = {
          let mut stmt = conn.prepare(
            "SELECT user_dedup_id, family_name, given_name, display_name,
                    created_at
             FROM migrate_user_dedup
             ORDER BY user_dedup_id",
          )?;
          stmt
            .query_map([], |row| {
              Ok(Pending {
                user_dedup_id: row.get(0)?,
                family_name:   row.get(1)?,
                given_name:    row.get(2)?,
                display_name:  row.get(3)?,
                created_at:    row.get(4)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut insert = conn.prepare(
          "INSERT INTO system_user (user_identifier, family_name, given_name,
             display_name, record_effective_date)
           VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        let mut backfill = conn.prepare(
          "UPDATE migrate_user_dedup SET sims_user_id = ?1
           WHERE user_dedup_id = ?2",
        )?;

        let mut created = 0i64;
        for p in &pending {
          insert.execute(rusqlite::params![
            p.display_name,
            p.family_name,
            p.given_name,
            p.display_name,
            p.created_at,
          ])?;
          backfill
            .execute(rusqlite::params![conn.last_insert_rowid(), p.user_dedup_id])?;
          created += 1;
        }
        Ok(created)
      })
      .await?;
    Ok(created)
  }

  /// Read back every user mapping row, in mint order.
  pub async fn load_user_mappings(&self) -> Result<Vec<UserMappingRow>> {
    struct Raw {
      user_dedup_id:  i64,
      family_name:    String,
      given_name:     String,
      display_name:   String,
      created_at:     String,
      updated_at:     String,
      spi_person_ids: String,
      sims_user_id:   Option<i64>,
    }

    let raws: Vec<Raw> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT user_dedup_id, family_name, given_name, display_name,
                  created_at, updated_at, spi_person_ids, sims_user_id
           FROM migrate_user_dedup
           ORDER BY user_dedup_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(Raw {
              user_dedup_id:  row.get(0)?,
              family_name:    row.get(1)?,
              given_name:     row.get(2)?,
              display_name:   row.get(3)?,
              created_at:     row.get(4)?,
              updated_at:     row.get(5)?,
              spi_person_ids: row.get(6)?,
              sims_user_id:   row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|r| {
        Ok(UserMappingRow {
          user_dedup_id: r.user_dedup_id,
          user:          CanonicalUser {
            family_name:    r.family_name,
            given_name:     r.given_name,
            display_name:   r.display_name,
            created_at:     decode_date(&r.created_at)?,
            updated_at:     decode_date(&r.updated_at)?,
            spi_person_ids: decode_person_ids(&r.spi_person_ids)?,
          },
          sims_user_id:  r.sims_user_id,
        })
      })
      .collect()
  }

  // ── Species reconciliation ────────────────────────────────────────────────

  /// Bulk-insert species mapping rows under first-write-wins: a row whose
  /// `itis_tsn` is already claimed is dropped, never an error.
  pub async fn insert_species_mappings(
    &self,
    mappings: &[SpeciesMapping],
    batch_size: usize,
  ) -> Result<()> {
    let rows = mappings
      .iter()
      .map(|m| {
        vec![
          Value::Integer(m.spi_species_id),
          Value::Text(m.spi_species_code.clone()),
          Value::Text(m.spi_scientific_name.clone()),
          Value::Text(m.spi_rank.clone()),
          m.itis_tsn.map(Value::Integer).unwrap_or(Value::Null),
          m.itis_scientific_name
            .clone()
            .map(Value::Text)
            .unwrap_or(Value::Null),
          m.itis_rank.clone().map(Value::Text).unwrap_or(Value::Null),
        ]
      })
      .collect::<Vec<_>>();

    let insert =
      BatchInsert::new("migrate_spi_taxon", SPI_TAXON_COLUMNS, ConflictPolicy::FirstWriteWins)
        .with_batch_size(batch_size);
    self.run_batch_insert(insert, rows).await
  }

  /// Read back every species mapping row, ordered by legacy species id.
  pub async fn load_species_mappings(&self) -> Result<Vec<SpeciesMapping>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT spi_species_id, spi_species_code, spi_scientific_name,
                  spi_rank, itis_tsn, itis_scientific_name, itis_rank
           FROM migrate_spi_taxon
           ORDER BY spi_species_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(SpeciesMapping {
              spi_species_id:       row.get(0)?,
              spi_species_code:     row.get(1)?,
              spi_scientific_name:  row.get(2)?,
              spi_rank:             row.get(3)?,
              itis_tsn:             row.get(4)?,
              itis_scientific_name: row.get(5)?,
              itis_rank:            row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}
