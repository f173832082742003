//! SQL schema for the migration database.
//!
//! Three groups of tables: legacy SPI source tables (read-only during a
//! run), SIMS new-schema tables (written by the transformers), and the
//! engine-owned mapping tables. Engine-owned id-mapping tables use their
//! INTEGER PRIMARY KEY to mint the new-schema ids: a stage first inserts the
//! legacy ids into its map table, then inserts new-schema rows keyed by the
//! minted ids, joining back through the map.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Legacy SPI source tables ────────────────────────────────────────────

-- One row per person per legacy project association; person_id repeats.
CREATE TABLE IF NOT EXISTS spi_person (
    person_id         INTEGER NOT NULL,
    project_id        INTEGER NOT NULL,
    surname           TEXT NOT NULL,
    first_given_name  TEXT NOT NULL DEFAULT '',
    second_given_name TEXT NOT NULL DEFAULT '',
    created_at        TEXT NOT NULL,   -- ISO 8601 UTC
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS spi_project (
    project_id INTEGER PRIMARY KEY,
    name       TEXT NOT NULL,
    objectives TEXT,
    start_date TEXT,
    end_date   TEXT
);

CREATE TABLE IF NOT EXISTS spi_survey (
    survey_id  INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL,
    name       TEXT NOT NULL,
    start_date TEXT,
    end_date   TEXT
);

CREATE TABLE IF NOT EXISTS spi_permit (
    permit_id     INTEGER PRIMARY KEY,
    project_id    INTEGER NOT NULL,
    permit_number TEXT NOT NULL,
    permit_type   TEXT
);

CREATE TABLE IF NOT EXISTS spi_study_species (
    survey_id  INTEGER NOT NULL,
    species_id INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS spi_design_component (
    design_component_id INTEGER PRIMARY KEY,
    survey_id           INTEGER NOT NULL,
    name                TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS spi_sample_method (
    sample_method_id    INTEGER PRIMARY KEY,
    design_component_id INTEGER NOT NULL,
    method_name         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS spi_sample_period (
    sample_period_id INTEGER PRIMARY KEY,
    sample_method_id INTEGER NOT NULL,
    start_date       TEXT,
    end_date         TEXT
);

CREATE TABLE IF NOT EXISTS spi_observation (
    observation_id   INTEGER PRIMARY KEY,
    survey_id        INTEGER NOT NULL,
    species_id       INTEGER NOT NULL,
    count            INTEGER,
    observation_date TEXT
);

CREATE TABLE IF NOT EXISTS spi_survey_job (
    survey_id INTEGER NOT NULL,
    person_id INTEGER NOT NULL
);

-- ── SIMS new-schema tables ──────────────────────────────────────────────

CREATE TABLE IF NOT EXISTS system_user (
    system_user_id        INTEGER PRIMARY KEY,
    user_identifier       TEXT NOT NULL,
    family_name           TEXT NOT NULL,
    given_name            TEXT NOT NULL,
    display_name          TEXT NOT NULL,
    record_effective_date TEXT NOT NULL,
    record_end_date       TEXT
);

CREATE TABLE IF NOT EXISTS project (
    project_id INTEGER PRIMARY KEY,
    name       TEXT NOT NULL,
    objectives TEXT,
    start_date TEXT,
    end_date   TEXT
);

CREATE TABLE IF NOT EXISTS survey (
    survey_id  INTEGER PRIMARY KEY,
    project_id INTEGER NOT NULL REFERENCES project(project_id),
    name       TEXT NOT NULL,
    start_date TEXT,
    end_date   TEXT
);

CREATE TABLE IF NOT EXISTS permit (
    permit_id     INTEGER PRIMARY KEY,
    project_id    INTEGER NOT NULL REFERENCES project(project_id),
    permit_number TEXT NOT NULL,
    permit_type   TEXT
);

CREATE TABLE IF NOT EXISTS study_species (
    study_species_id INTEGER PRIMARY KEY,
    survey_id        INTEGER NOT NULL REFERENCES survey(survey_id),
    itis_tsn         INTEGER,          -- NULL when reconciliation found no match
    spi_species_id   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sample_site (
    sample_site_id INTEGER PRIMARY KEY,
    survey_id      INTEGER NOT NULL REFERENCES survey(survey_id),
    name           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sample_method (
    sample_method_id INTEGER PRIMARY KEY,
    sample_site_id   INTEGER NOT NULL REFERENCES sample_site(sample_site_id),
    method_name      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sample_period (
    sample_period_id INTEGER PRIMARY KEY,
    sample_method_id INTEGER NOT NULL REFERENCES sample_method(sample_method_id),
    start_date       TEXT,
    end_date         TEXT
);

CREATE TABLE IF NOT EXISTS observation (
    observation_id   INTEGER PRIMARY KEY,
    survey_id        INTEGER NOT NULL REFERENCES survey(survey_id),
    itis_tsn         INTEGER,
    spi_species_id   INTEGER NOT NULL,
    count            INTEGER,
    observation_date TEXT
);

CREATE TABLE IF NOT EXISTS survey_participation (
    survey_participation_id INTEGER PRIMARY KEY,
    survey_id               INTEGER NOT NULL REFERENCES survey(survey_id),
    system_user_id          INTEGER NOT NULL REFERENCES system_user(system_user_id)
);

-- ── Engine-owned mapping tables ─────────────────────────────────────────

-- One row per canonical user. spi_person_ids is a JSON array of every
-- contributing legacy person id, duplicates preserved.
CREATE TABLE IF NOT EXISTS migrate_user_dedup (
    user_dedup_id  INTEGER PRIMARY KEY,
    family_name    TEXT NOT NULL,
    given_name     TEXT NOT NULL,
    display_name   TEXT NOT NULL,
    created_at     TEXT NOT NULL,   -- date-truncated, YYYY-MM-DD
    updated_at     TEXT NOT NULL,
    spi_person_ids TEXT NOT NULL,
    sims_user_id   INTEGER
);

-- Species reconciliation results. The UNIQUE itis_tsn column is the arbiter
-- of the first-write-wins conflict policy.
CREATE TABLE IF NOT EXISTS migrate_spi_taxon (
    spi_species_id       INTEGER NOT NULL UNIQUE,
    spi_species_code     TEXT NOT NULL,
    spi_scientific_name  TEXT NOT NULL,
    spi_rank             TEXT NOT NULL,
    itis_tsn             INTEGER UNIQUE,
    itis_scientific_name TEXT,
    itis_rank            TEXT
);

CREATE TABLE IF NOT EXISTS migrate_project_id_map (
    sims_project_id INTEGER PRIMARY KEY,
    spi_project_id  INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS migrate_survey_id_map (
    sims_survey_id INTEGER PRIMARY KEY,
    spi_survey_id  INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS migrate_sample_site_id_map (
    sims_sample_site_id     INTEGER PRIMARY KEY,
    spi_design_component_id INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS migrate_sample_method_id_map (
    sims_sample_method_id INTEGER PRIMARY KEY,
    spi_sample_method_id  INTEGER NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS migrate_sample_period_id_map (
    sims_sample_period_id INTEGER PRIMARY KEY,
    spi_sample_period_id  INTEGER NOT NULL UNIQUE
);

PRAGMA user_version = 1;
";

/// Development-mode cleanup: reverse previously migrated new-schema rows
/// (found by joining through the mapping tables), then empty every
/// engine-owned table. Ordered children-first for the foreign keys.
pub const TRUNCATE: &str = "
DELETE FROM survey_participation
  WHERE survey_id IN (SELECT sims_survey_id FROM migrate_survey_id_map);
DELETE FROM observation
  WHERE survey_id IN (SELECT sims_survey_id FROM migrate_survey_id_map);
DELETE FROM study_species
  WHERE survey_id IN (SELECT sims_survey_id FROM migrate_survey_id_map);
DELETE FROM sample_period
  WHERE sample_period_id IN (SELECT sims_sample_period_id FROM migrate_sample_period_id_map);
DELETE FROM sample_method
  WHERE sample_method_id IN (SELECT sims_sample_method_id FROM migrate_sample_method_id_map);
DELETE FROM sample_site
  WHERE sample_site_id IN (SELECT sims_sample_site_id FROM migrate_sample_site_id_map);
DELETE FROM permit
  WHERE project_id IN (SELECT sims_project_id FROM migrate_project_id_map);
DELETE FROM survey
  WHERE survey_id IN (SELECT sims_survey_id FROM migrate_survey_id_map);
DELETE FROM project
  WHERE project_id IN (SELECT sims_project_id FROM migrate_project_id_map);
DELETE FROM system_user
  WHERE system_user_id IN (SELECT sims_user_id FROM migrate_user_dedup
                           WHERE sims_user_id IS NOT NULL);

DELETE FROM migrate_sample_period_id_map;
DELETE FROM migrate_sample_method_id_map;
DELETE FROM migrate_sample_site_id_map;
DELETE FROM migrate_survey_id_map;
DELETE FROM migrate_project_id_map;
DELETE FROM migrate_spi_taxon;
DELETE FROM migrate_user_dedup;
";
