//! Chunking and full-text query construction.
//!
//! Candidates are split into fixed-size chunks before each external query:
//! the authority has practical query-length limits, and it returns multiple
//! records per distinct input name, so chunking bounds both request and
//! response size.

use sims_core::species::SpeciesCandidate;

/// Default candidates per external query. Tunable via configuration;
/// independent of the total candidate count.
pub const DEFAULT_CHUNK_SIZE: usize = 20;

/// One assembled full-text query: the query string and the requested result
/// row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
  pub q:    String,
  pub rows: usize,
}

/// Escape internal spaces for the authority's query grammar.
pub fn escape_term(name: &str) -> String {
  name.replace(' ', "\\ ")
}

/// Build the OR-query for one chunk: each candidate contributes a
/// "scientific name OR vernacular name" sub-clause. The requested row count
/// is twice the chunk size, to tolerate the authority returning more than
/// one record per input name.
pub fn build_chunk_query(chunk: &[SpeciesCandidate]) -> SearchQuery {
  let clauses: Vec<String> = chunk
    .iter()
    .map(|candidate| {
      let term = escape_term(&candidate.scientific_name());
      format!("(nameWOInd:{term} OR vernacular:{term})")
    })
    .collect();

  SearchQuery { q: clauses.join(" OR "), rows: chunk.len() * 2 }
}

/// Split candidates into chunks of at most `chunk_size`.
pub fn chunk_candidates(
  candidates: Vec<SpeciesCandidate>,
  chunk_size: usize,
) -> Vec<Vec<SpeciesCandidate>> {
  let chunk_size = chunk_size.max(1);
  candidates
    .chunks(chunk_size)
    .map(|c| c.to_vec())
    .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn candidate(id: i64, u1: &str, u2: &str) -> SpeciesCandidate {
    SpeciesCandidate {
      spi_species_id: id,
      code:           format!("M-{id:03}"),
      unit_name1:     u1.to_string(),
      unit_name2:     u2.to_string(),
      unit_name3:     String::new(),
      sort_key:       id,
    }
  }

  #[test]
  fn escape_replaces_spaces() {
    assert_eq!(escape_term("Oreamnos americanus"), "Oreamnos\\ americanus");
  }

  #[test]
  fn chunk_query_ors_subclauses_and_doubles_rows() {
    let chunk = vec![
      candidate(1, "Oreamnos", "americanus"),
      candidate(2, "Alces", "alces"),
    ];
    let query = build_chunk_query(&chunk);

    assert_eq!(
      query.q,
      "(nameWOInd:Oreamnos\\ americanus OR vernacular:Oreamnos\\ americanus) \
       OR (nameWOInd:Alces\\ alces OR vernacular:Alces\\ alces)"
    );
    assert_eq!(query.rows, 4);
  }

  #[test]
  fn chunking_respects_size_and_keeps_order() {
    let candidates: Vec<_> = (0..7).map(|i| candidate(i, "Genus", "sp")).collect();
    let chunks = chunk_candidates(candidates, 3);

    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].len(), 3);
    assert_eq!(chunks[2].len(), 1);
    assert_eq!(chunks[2][0].spi_species_id, 6);
  }

  #[test]
  fn zero_chunk_size_degrades_to_one() {
    let candidates = vec![candidate(1, "Alces", "alces")];
    assert_eq!(chunk_candidates(candidates, 0).len(), 1);
  }
}
