//! Error type for `sims-pipeline`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] sims_core::Error),

  #[error("store error: {0}")]
  Store(#[from] sims_store_sqlite::Error),

  #[error("stage {0:?} appears in the plan but has no transformer")]
  UnknownStage(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
