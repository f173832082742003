//! The reconciliation match rule.
//!
//! A candidate matches an external record iff the record's
//! name-without-indicator equals the candidate's synthesized scientific
//! name, case-insensitively and exactly. The first matching record wins.
//! Unmatched candidates still produce a mapping row (with a null tsn), so
//! "no match" is recorded rather than silently dropped.

use sims_core::species::{SpeciesCandidate, SpeciesMapping, TaxonRecord};

/// Resolve every candidate in a chunk against the records the authority
/// returned for that chunk. Total: one mapping row per candidate.
pub fn match_chunk(
  chunk: &[SpeciesCandidate],
  records: &[TaxonRecord],
) -> Vec<SpeciesMapping> {
  chunk
    .iter()
    .map(|candidate| {
      let name = candidate.scientific_name();
      let hit = records
        .iter()
        .find(|r| r.name_without_indicator.eq_ignore_ascii_case(&name));
      match hit {
        Some(record) => SpeciesMapping::matched(candidate, record),
        None => SpeciesMapping::unmatched(candidate),
      }
    })
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

  fn record(tsn: i64, name: &str) -> TaxonRecord {
    TaxonRecord {
      tsn,
      name_with_indicator:    name.to_string(),
      name_without_indicator: name.to_string(),
      rank:                   "Species".to_string(),
      unit1:                  name.split(' ').next().unwrap_or("").to_string(),
    }
  }

  #[test]
  fn match_is_case_insensitive_and_exact() {
    let chunk = vec![candidate(1, "oreamnos", "AMERICANUS")];
    let records = vec![record(180711, "Oreamnos americanus")];

    let rows = match_chunk(&chunk, &records);
    assert_eq!(rows[0].itis_tsn, Some(180711));
    assert_eq!(rows[0].itis_scientific_name.as_deref(), Some("Oreamnos americanus"));
  }

  #[test]
  fn partial_names_do_not_match() {
    let chunk = vec![candidate(1, "Oreamnos", "")];
    let records = vec![record(180711, "Oreamnos americanus")];

    let rows = match_chunk(&chunk, &records);
    assert_eq!(rows[0].itis_tsn, None);
  }

  #[test]
  fn first_matching_record_wins() {
    let chunk = vec![candidate(1, "Alces", "alces")];
    let records = vec![record(180703, "Alces alces"), record(999999, "Alces alces")];

    let rows = match_chunk(&chunk, &records);
    assert_eq!(rows[0].itis_tsn, Some(180703));
  }

  #[test]
  fn unmatched_candidates_still_get_rows() {
    let chunk = vec![
      candidate(1, "Alces", "alces"),
      candidate(2, "Unknownia", "missingensis"),
    ];
    let records = vec![record(180703, "Alces alces")];

    let rows = match_chunk(&chunk, &records);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].spi_species_id, 2);
    assert_eq!(rows[1].itis_tsn, None);
    assert_eq!(rows[1].spi_scientific_name, "Unknownia missingensis");
  }
}
