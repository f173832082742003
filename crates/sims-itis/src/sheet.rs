//! Reader for the legacy species reference spreadsheet.
//!
//! The legacy species codes live in a tabular export, not in the
//! operational database; one row per code, read once when reconciliation
//! starts. Rows whose synthesized scientific name is empty carry nothing to
//! reconcile and are skipped.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use sims_core::species::SpeciesCandidate;

use crate::Result;

#[derive(Debug, Deserialize)]
struct SheetRow {
  #[serde(rename = "SPECIES_ID")]
  species_id: i64,
  #[serde(rename = "CODE", default)]
  code:       String,
  #[serde(rename = "UNIT_NAME1", default)]
  unit_name1: String,
  #[serde(rename = "UNIT_NAME2", default)]
  unit_name2: String,
  #[serde(rename = "UNIT_NAME3", default)]
  unit_name3: String,
  #[serde(rename = "SORT_ORDER", default)]
  sort_key:   i64,
}

impl SheetRow {
  fn into_candidate(self) -> SpeciesCandidate {
    SpeciesCandidate {
      spi_species_id: self.species_id,
      code:           self.code,
      unit_name1:     self.unit_name1,
      unit_name2:     self.unit_name2,
      unit_name3:     self.unit_name3,
      sort_key:       self.sort_key,
    }
  }
}

/// Read candidates from the reference sheet at `path`.
pub fn read_reference_sheet(path: impl AsRef<Path>) -> Result<Vec<SpeciesCandidate>> {
  let reader = csv::Reader::from_path(path)?;
  collect_candidates(reader)
}

/// Read candidates from any CSV source — used directly by tests.
pub fn read_reference_rows(source: impl Read) -> Result<Vec<SpeciesCandidate>> {
  collect_candidates(csv::Reader::from_reader(source))
}

fn collect_candidates<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<SpeciesCandidate>> {
  let mut candidates = Vec::new();
  for row in reader.deserialize() {
    let row: SheetRow = row?;
    let candidate = row.into_candidate();
    if candidate.scientific_name().is_empty() {
      continue;
    }
    candidates.push(candidate);
  }
  Ok(candidates)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  const SHEET: &str = "\
SPECIES_ID,CODE,UNIT_NAME1,UNIT_NAME2,UNIT_NAME3,SORT_ORDER
4165,M-ORAM,Oreamnos,americanus,,10
6899,M-ALAL,Alces,alces,,20
7012,M-RATA,Rangifer,tarandus,caribou,30
9999,X-NONE,,,,40
";

  #[test]
  fn reads_rows_and_synthesizes_names() {
    let candidates = read_reference_rows(SHEET.as_bytes()).unwrap();
    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0].spi_species_id, 4165);
    assert_eq!(candidates[0].scientific_name(), "Oreamnos americanus");
    assert_eq!(candidates[2].scientific_name(), "Rangifer tarandus caribou");
  }

  #[test]
  fn rows_with_empty_names_are_skipped() {
    let candidates = read_reference_rows(SHEET.as_bytes()).unwrap();
    assert!(candidates.iter().all(|c| c.spi_species_id != 9999));
  }
}
