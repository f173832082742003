//! Error type for `sims-itis`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("authority returned status {0}")]
  Status(reqwest::StatusCode),

  #[error("authority returned a non-numeric tsn: {0:?}")]
  BadTsn(String),

  #[error("reference sheet error: {0}")]
  Sheet(#[from] csv::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
