//! Error types for `sims-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("stage {stage:?} reads table {table:?}, which no earlier stage writes")]
  UnsatisfiedStageRead { stage: String, table: String },

  #[error("duplicate stage name: {0:?}")]
  DuplicateStage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
