//! Parameterized multi-row INSERT builder with an explicit conflict policy.
//!
//! Bulk writers hand a list of typed rows (as [`rusqlite::types::Value`]
//! tuples) to [`MigrationDb::run_batch_insert`](crate::MigrationDb), which
//! splits them into fixed-size batches and executes one parameterized
//! statement per batch. The conflict policy is part of the builder, not an
//! incidental SQL clause.

/// What happens when an inserted row violates a unique constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
  /// A conflict is an error; the statement (and the run) fails.
  Strict,
  /// The first successfully inserted row wins; later conflicting rows are
  /// dropped silently (`INSERT OR IGNORE`).
  FirstWriteWins,
}

/// Default rows-per-statement for bulk inserts.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Describes a bulk insert into one table.
#[derive(Debug, Clone, Copy)]
pub struct BatchInsert {
  pub(crate) table:      &'static str,
  pub(crate) columns:    &'static [&'static str],
  pub(crate) policy:     ConflictPolicy,
  pub(crate) batch_size: usize,
}

impl BatchInsert {
  pub fn new(
    table: &'static str,
    columns: &'static [&'static str],
    policy: ConflictPolicy,
  ) -> Self {
    Self { table, columns, policy, batch_size: DEFAULT_BATCH_SIZE }
  }

  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = batch_size.max(1);
    self
  }

  /// The parameterized statement for a batch of `rows` rows.
  pub fn statement(&self, rows: usize) -> String {
    let verb = match self.policy {
      ConflictPolicy::Strict => "INSERT",
      ConflictPolicy::FirstWriteWins => "INSERT OR IGNORE",
    };
    let tuple = format!(
      "({})",
      vec!["?"; self.columns.len()].join(", ")
    );
    let tuples = vec![tuple; rows].join(", ");
    format!(
      "{verb} INTO {} ({}) VALUES {tuples}",
      self.table,
      self.columns.join(", ")
    )
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
