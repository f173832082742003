//! Set-based entity transformers.
//!
//! Each transformer is a pair of declarative SQL statements: first mint the
//! new-schema ids by inserting legacy ids into the stage's id-map table
//! (its INTEGER PRIMARY KEY assigns the new ids in legacy-id order), then
//! insert the new-schema rows by joining the legacy table back through the
//! map. No transformer touches rows one at a time, and none reads a table
//! an earlier stage has not already populated.

use sims_store_sqlite::MigrationDb;

use crate::Result;

pub struct Transformer {
  pub stage:       &'static str,
  /// Table counted after the statements run, for the run summary.
  pub count_table: &'static str,
  sql:             &'static str,
}

impl Transformer {
  /// Look up the transformer for a named stage.
  pub fn for_stage(name: &str) -> Option<&'static Transformer> {
    TRANSFORMERS.iter().find(|t| t.stage == name)
  }

  /// Execute the stage's SQL and return the destination table's row count.
  pub async fn apply(&self, db: &MigrationDb) -> Result<i64> {
    db.execute_batch_sql(self.sql).await?;
    Ok(db.table_count(self.count_table).await?)
  }
}

pub const TRANSFORMERS: &[Transformer] = &[
  Transformer {
    stage:       "projects",
    count_table: "project",
    sql:         "
INSERT INTO migrate_project_id_map (spi_project_id)
  SELECT project_id FROM spi_project ORDER BY project_id;
INSERT INTO project (project_id, name, objectives, start_date, end_date)
  SELECT m.sims_project_id, p.name, p.objectives, p.start_date, p.end_date
  FROM spi_project p
  JOIN migrate_project_id_map m ON m.spi_project_id = p.project_id;
",
  },
  Transformer {
    stage:       "surveys",
    count_table: "survey",
    sql:         "
INSERT INTO migrate_survey_id_map (spi_survey_id)
  SELECT survey_id FROM spi_survey ORDER BY survey_id;
INSERT INTO survey (survey_id, project_id, name, start_date, end_date)
  SELECT sm.sims_survey_id, pm.sims_project_id, s.name, s.start_date,
         s.end_date
  FROM spi_survey s
  JOIN migrate_survey_id_map sm ON sm.spi_survey_id = s.survey_id
  JOIN migrate_project_id_map pm ON pm.spi_project_id = s.project_id;
",
  },
  Transformer {
    stage:       "permits",
    count_table: "permit",
    sql:         "
INSERT INTO permit (project_id, permit_number, permit_type)
  SELECT pm.sims_project_id, p.permit_number, p.permit_type
  FROM spi_permit p
  JOIN migrate_project_id_map pm ON pm.spi_project_id = p.project_id
  ORDER BY p.permit_id;
",
  },
  // LEFT JOIN: a species whose mapping row lost a tsn conflict still gets
  // a study_species row, just with a NULL tsn.
  Transformer {
    stage:       "study_species",
    count_table: "study_species",
    sql:         "
INSERT INTO study_species (survey_id, itis_tsn, spi_species_id)
  SELECT sm.sims_survey_id, t.itis_tsn, ss.species_id
  FROM spi_study_species ss
  JOIN migrate_survey_id_map sm ON sm.spi_survey_id = ss.survey_id
  LEFT JOIN migrate_spi_taxon t ON t.spi_species_id = ss.species_id
  ORDER BY ss.survey_id, ss.species_id;
",
  },
  Transformer {
    stage:       "sample_sites",
    count_table: "sample_site",
    sql:         "
INSERT INTO migrate_sample_site_id_map (spi_design_component_id)
  SELECT design_component_id FROM spi_design_component
  ORDER BY design_component_id;
INSERT INTO sample_site (sample_site_id, survey_id, name)
  SELECT m.sims_sample_site_id, sm.sims_survey_id, d.name
  FROM spi_design_component d
  JOIN migrate_sample_site_id_map m
    ON m.spi_design_component_id = d.design_component_id
  JOIN migrate_survey_id_map sm ON sm.spi_survey_id = d.survey_id;
",
  },
  Transformer {
    stage:       "sample_methods",
    count_table: "sample_method",
    sql:         "
INSERT INTO migrate_sample_method_id_map (spi_sample_method_id)
  SELECT sample_method_id FROM spi_sample_method ORDER BY sample_method_id;
INSERT INTO sample_method (sample_method_id, sample_site_id, method_name)
  SELECT m.sims_sample_method_id, site.sims_sample_site_id, sm.method_name
  FROM spi_sample_method sm
  JOIN migrate_sample_method_id_map m
    ON m.spi_sample_method_id = sm.sample_method_id
  JOIN migrate_sample_site_id_map site
    ON site.spi_design_component_id = sm.design_component_id;
",
  },
  Transformer {
    stage:       "sample_periods",
    count_table: "sample_period",
    sql:         "
INSERT INTO migrate_sample_period_id_map (spi_sample_period_id)
  SELECT sample_period_id FROM spi_sample_period ORDER BY sample_period_id;
INSERT INTO sample_period (sample_period_id, sample_method_id, start_date,
                           end_date)
  SELECT m.sims_sample_period_id, mm.sims_sample_method_id, sp.start_date,
         sp.end_date
  FROM spi_sample_period sp
  JOIN migrate_sample_period_id_map m
    ON m.spi_sample_period_id = sp.sample_period_id
  JOIN migrate_sample_method_id_map mm
    ON mm.spi_sample_method_id = sp.sample_method_id;
",
  },
  Transformer {
    stage:       "observations",
    count_table: "observation",
    sql:         "
INSERT INTO observation (survey_id, itis_tsn, spi_species_id, count,
                         observation_date)
  SELECT sm.sims_survey_id, t.itis_tsn, o.species_id, o.count,
         o.observation_date
  FROM spi_observation o
  JOIN migrate_survey_id_map sm ON sm.spi_survey_id = o.survey_id
  LEFT JOIN migrate_spi_taxon t ON t.spi_species_id = o.species_id
  ORDER BY o.observation_id;
",
  },
  // json_each unpacks the canonical user's contributing legacy person ids,
  // so every legacy job row lands on the deduplicated user. DISTINCT
  // collapses jobs held by two legacy aliases of the same person.
  Transformer {
    stage:       "survey_participation",
    count_table: "survey_participation",
    sql:         "
INSERT INTO survey_participation (survey_id, system_user_id)
  SELECT DISTINCT sm.sims_survey_id, d.sims_user_id
  FROM spi_survey_job j
  JOIN migrate_survey_id_map sm ON sm.spi_survey_id = j.survey_id
  JOIN migrate_user_dedup d
  JOIN json_each(d.spi_person_ids) pid ON pid.value = j.person_id
  WHERE d.sims_user_id IS NOT NULL
  ORDER BY sm.sims_survey_id, d.sims_user_id;
",
  },
];
