//! Legacy species codes, external taxon records, and the reconciliation
//! mapping row that links them.

use serde::{Deserialize, Serialize};

use crate::person::collapse_whitespace;

// ─── Legacy species code ─────────────────────────────────────────────────────

/// One legacy SPI species code, read from the reference spreadsheet.
///
/// The scientific name is not stored in the legacy data; it is synthesized
/// from up to three unit-name fragments (genus / species / subspecies).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesCandidate {
  pub spi_species_id: i64,
  pub code:           String,
  pub unit_name1:     String,
  pub unit_name2:     String,
  pub unit_name3:     String,
  pub sort_key:       i64,
}

impl SpeciesCandidate {
  /// The non-empty unit-name parts joined with single spaces.
  pub fn scientific_name(&self) -> String {
    collapse_whitespace(&[&self.unit_name1, &self.unit_name2, &self.unit_name3])
  }

  /// Taxonomic rank implied by how many unit-name parts are populated.
  pub fn rank(&self) -> &'static str {
    let parts = [&self.unit_name1, &self.unit_name2, &self.unit_name3]
      .iter()
      .filter(|p| !p.trim().is_empty())
      .count();
    match parts {
      0 | 1 => "genus",
      2 => "species",
      _ => "subspecies",
    }
  }
}

// ─── External taxon record ───────────────────────────────────────────────────

/// One candidate record returned by the external taxonomic authority.
/// Fetched, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonRecord {
  pub tsn:                    i64,
  pub name_with_indicator:    String,
  pub name_without_indicator: String,
  pub rank:                   String,
  pub unit1:                  String,
}

// ─── Reconciliation mapping ──────────────────────────────────────────────────

/// One species reconciliation mapping row — exactly one per legacy species
/// id. A null `itis_tsn` records "no match found"; the row is still written
/// so downstream joins can tell "no match" apart from "never reconciled".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesMapping {
  pub spi_species_id:       i64,
  pub spi_species_code:     String,
  pub spi_scientific_name:  String,
  pub spi_rank:             String,
  pub itis_tsn:             Option<i64>,
  pub itis_scientific_name: Option<String>,
  pub itis_rank:            Option<String>,
}

impl SpeciesMapping {
  /// A mapping row recording that no external record matched.
  pub fn unmatched(candidate: &SpeciesCandidate) -> Self {
    Self {
      spi_species_id:       candidate.spi_species_id,
      spi_species_code:     candidate.code.clone(),
      spi_scientific_name:  candidate.scientific_name(),
      spi_rank:             candidate.rank().to_string(),
      itis_tsn:             None,
      itis_scientific_name: None,
      itis_rank:            None,
    }
  }

  /// A mapping row linking a candidate to the external record it matched.
  pub fn matched(candidate: &SpeciesCandidate, record: &TaxonRecord) -> Self {
    Self {
      spi_species_id:       candidate.spi_species_id,
      spi_species_code:     candidate.code.clone(),
      spi_scientific_name:  candidate.scientific_name(),
      spi_rank:             candidate.rank().to_string(),
      itis_tsn:             Some(record.tsn),
      itis_scientific_name: Some(record.name_without_indicator.clone()),
      itis_rank:            Some(record.rank.clone()),
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
