//! The ordered migration stage plan.
//!
//! Stage ordering is data, not incidental code order: each stage declares
//! which tables it reads and writes, and [`validate_plan`] proves that no
//! stage reads a table that is neither legacy source data nor the output of
//! an earlier stage. The orchestrator refuses to run an invalid plan.

use std::collections::HashSet;

use crate::{Error, Result};

/// One named migration stage with its table-level dependencies.
#[derive(Debug, Clone, Copy)]
pub struct Stage {
  pub name:   &'static str,
  /// Tables this stage reads. Must be legacy source tables or tables
  /// written by an earlier stage.
  pub reads:  &'static [&'static str],
  /// Tables this stage populates. Each engine-owned table is written by
  /// exactly one stage and is read-only afterwards.
  pub writes: &'static [&'static str],
}

/// Legacy SPI tables — present before the run starts, never written.
pub const SOURCE_TABLES: &[&str] = &[
  "spi_person",
  "spi_project",
  "spi_survey",
  "spi_permit",
  "spi_study_species",
  "spi_design_component",
  "spi_sample_method",
  "spi_sample_period",
  "spi_observation",
  "spi_survey_job",
];

/// The full migration plan, in execution order.
///
/// `species_reconciliation` reads no database table — its input is the
/// external reference spreadsheet and the taxonomic authority.
pub const MIGRATION_PLAN: &[Stage] = &[
  Stage {
    name:   "user_dedup",
    reads:  &["spi_person"],
    writes: &["migrate_user_dedup", "system_user"],
  },
  Stage {
    name:   "species_reconciliation",
    reads:  &[],
    writes: &["migrate_spi_taxon"],
  },
  Stage {
    name:   "projects",
    reads:  &["spi_project"],
    writes: &["project", "migrate_project_id_map"],
  },
  Stage {
    name:   "surveys",
    reads:  &["spi_survey", "migrate_project_id_map"],
    writes: &["survey", "migrate_survey_id_map"],
  },
  Stage {
    name:   "permits",
    reads:  &["spi_permit", "migrate_project_id_map"],
    writes: &["permit"],
  },
  Stage {
    name:   "study_species",
    reads:  &["spi_study_species", "migrate_survey_id_map", "migrate_spi_taxon"],
    writes: &["study_species"],
  },
  Stage {
    name:   "sample_sites",
    reads:  &["spi_design_component", "migrate_survey_id_map"],
    writes: &["sample_site", "migrate_sample_site_id_map"],
  },
  Stage {
    name:   "sample_methods",
    reads:  &["spi_sample_method", "migrate_sample_site_id_map"],
    writes: &["sample_method", "migrate_sample_method_id_map"],
  },
  Stage {
    name:   "sample_periods",
    reads:  &["spi_sample_period", "migrate_sample_method_id_map"],
    writes: &["sample_period", "migrate_sample_period_id_map"],
  },
  Stage {
    name:   "observations",
    reads:  &["spi_observation", "migrate_survey_id_map", "migrate_spi_taxon"],
    writes: &["observation"],
  },
  Stage {
    name:   "survey_participation",
    reads:  &["spi_survey_job", "migrate_survey_id_map", "migrate_user_dedup"],
    writes: &["survey_participation"],
  },
];

/// Check that every stage's reads are satisfied by `sources` or by the
/// writes of an earlier stage, and that stage names are unique.
pub fn validate_plan(plan: &[Stage], sources: &[&str]) -> Result<()> {
  let mut available: HashSet<&str> = sources.iter().copied().collect();
  let mut seen: HashSet<&str> = HashSet::new();

  for stage in plan {
    if !seen.insert(stage.name) {
      return Err(Error::DuplicateStage(stage.name.to_string()));
    }
    for table in stage.reads {
      if !available.contains(table) {
        return Err(Error::UnsatisfiedStageRead {
          stage: stage.name.to_string(),
          table: table.to_string(),
        });
      }
    }
    available.extend(stage.writes.iter().copied());
  }

  Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
