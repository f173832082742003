//! Species reconciliation stage.
//!
//! Candidates are chunked, and each chunk is an independent unit of work:
//! one authority query followed by one batched mapping-table write. Units
//! run concurrently; chunk completion order does not matter because the
//! UNIQUE `itis_tsn` constraint — not application ordering — arbitrates
//! conflicting claims (first writer wins, later rows dropped).
//!
//! A failed authority call is the pipeline's one recoverable error: the
//! chunk's candidates are recorded as unmatched and the run continues.
//! A failed database write is fatal and propagates.

use futures::stream::{self, StreamExt};
use sims_core::species::SpeciesCandidate;
use sims_itis::{matching::match_chunk, query, TaxonAuthority};
use sims_store_sqlite::MigrationDb;

use crate::{Error, Result};

/// Concurrently in-flight chunk units.
const CONCURRENT_CHUNKS: usize = 8;

/// Reconcile every candidate and persist the mapping rows. Returns the
/// number of mapping rows written (before any tsn-conflict drops).
pub async fn run<A: TaxonAuthority>(
  db: &MigrationDb,
  authority: &A,
  candidates: Vec<SpeciesCandidate>,
  chunk_size: usize,
  insert_batch_size: usize,
) -> Result<usize> {
  let chunks = query::chunk_candidates(candidates, chunk_size);
  let chunk_count = chunks.len();

  let units = chunks.into_iter().enumerate().map(|(index, chunk)| {
    let db = db.clone();
    async move {
      let search = query::build_chunk_query(&chunk);
      let records = match authority.search(&search).await {
        Ok(records) => records,
        Err(e) => {
          tracing::warn!(
            chunk = index,
            candidates = chunk.len(),
            error = %e,
            "authority lookup failed; recording chunk as unmatched"
          );
          Vec::new()
        }
      };

      let rows = match_chunk(&chunk, &records);
      db.insert_species_mappings(&rows, insert_batch_size).await?;
      Ok::<usize, Error>(rows.len())
    }
  });

  let results: Vec<Result<usize>> = stream::iter(units)
    .buffer_unordered(CONCURRENT_CHUNKS)
    .collect()
    .await;

  let mut written = 0;
  for result in results {
    written += result?;
  }

  tracing::info!(chunks = chunk_count, mapping_rows = written, "species reconciliation complete");
  Ok(written)
}
