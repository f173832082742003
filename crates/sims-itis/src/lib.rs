//! Client for the external taxonomic authority (an ITIS-style Solr
//! full-text search endpoint), plus the pure pieces of species
//! reconciliation: candidate chunking, query construction, and the
//! case-insensitive exact-match rule.
//!
//! The pipeline depends on the [`TaxonAuthority`] trait, not on the concrete
//! [`ItisClient`], so tests can substitute a canned authority.

use std::future::Future;

use sims_core::species::TaxonRecord;

pub mod client;
pub mod error;
pub mod matching;
pub mod query;
pub mod sheet;

pub use client::ItisClient;
pub use error::{Error, Result};
pub use query::SearchQuery;

/// Abstraction over the external taxonomic authority.
///
/// The authority is read-only and stateless; a lookup failure is the
/// caller's to handle (the reconciliation stage degrades a failed chunk to
/// "no external data" rather than aborting the run).
pub trait TaxonAuthority: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Run one full-text search and return every candidate record.
  fn search<'a>(
    &'a self,
    query: &'a SearchQuery,
  ) -> impl Future<Output = Result<Vec<TaxonRecord>, Self::Error>> + Send + 'a;
}
