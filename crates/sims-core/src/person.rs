//! Legacy person records and exact-match deduplication into canonical users.
//!
//! The legacy SPI person registry holds one row per person per project, with
//! inconsistent whitespace in the name columns. Grouping here is deliberately
//! exact-match: two rows collapse into one canonical user iff their surname
//! and whitespace-normalized given names are identical. Misspelled or
//! near-duplicate names are never merged — a known limitation carried over
//! from the source registry, not something to fix here.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─── Normalization ───────────────────────────────────────────────────────────

/// Join the non-empty parts with single spaces, collapsing any run of
/// whitespace inside each part.
pub fn collapse_whitespace(parts: &[&str]) -> String {
  parts
    .iter()
    .flat_map(|p| p.split_whitespace())
    .collect::<Vec<_>>()
    .join(" ")
}

// ─── Legacy person ───────────────────────────────────────────────────────────

/// One row of the legacy SPI person registry. Immutable source data.
///
/// A real individual may appear many times: once per legacy project they
/// were associated with, and again under inconsistent name formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyPerson {
  pub person_id:         i64,
  pub project_id:        i64,
  pub surname:           String,
  pub first_given_name:  String,
  pub second_given_name: String,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl LegacyPerson {
  /// Whitespace-collapsed concatenation of the given-name columns.
  pub fn given_name(&self) -> String {
    collapse_whitespace(&[&self.first_given_name, &self.second_given_name])
  }

  /// Whitespace-collapsed full display name (given names then surname).
  pub fn display_name(&self) -> String {
    collapse_whitespace(&[
      &self.first_given_name,
      &self.second_given_name,
      &self.surname,
    ])
  }

  fn grouping_key(&self) -> (String, String, String) {
    (
      collapse_whitespace(&[&self.surname]),
      self.given_name(),
      self.display_name(),
    )
  }
}

// ─── Canonical user ──────────────────────────────────────────────────────────

/// One deduplicated identity, covering every legacy person row whose
/// normalized name triple matches.
///
/// This row owns the grouping decision: later stages resolve "who is this
/// legacy person in the new system" only by joining through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalUser {
  pub family_name:  String,
  pub given_name:   String,
  pub display_name: String,
  /// Earliest (date-truncated) `created_at` across the group.
  pub created_at:   NaiveDate,
  /// Latest (date-truncated) `updated_at` across the group.
  pub updated_at:   NaiveDate,
  /// Every contributing legacy `person_id`, duplicates preserved — one
  /// entry per legacy project association, in input order.
  pub spi_person_ids: Vec<i64>,
}

/// Collapse legacy person rows into canonical users.
///
/// Output order is deterministic (sorted by the normalized name triple)
/// regardless of input order. Every input row contributes to exactly one
/// output row.
pub fn dedup_persons(persons: &[LegacyPerson]) -> Vec<CanonicalUser> {
  let mut groups: BTreeMap<(String, String, String), CanonicalUser> = BTreeMap::new();

  for person in persons {
    let key = person.grouping_key();
    let created = person.created_at.date_naive();
    let updated = person.updated_at.date_naive();

    groups
      .entry(key.clone())
      .and_modify(|user| {
        user.created_at = user.created_at.min(created);
        user.updated_at = user.updated_at.max(updated);
        user.spi_person_ids.push(person.person_id);
      })
      .or_insert_with(|| {
        let (family_name, given_name, display_name) = key;
        CanonicalUser {
          family_name,
          given_name,
          display_name,
          created_at:     created,
          updated_at:     updated,
          spi_person_ids: vec![person.person_id],
        }
      });
  }

  groups.into_values().collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn person(
    person_id: i64,
    surname: &str,
    first: &str,
    second: &str,
    created: (i32, u32, u32),
    updated: (i32, u32, u32),
  ) -> LegacyPerson {
    LegacyPerson {
      person_id,
      project_id: 1,
      surname: surname.to_string(),
      first_given_name: first.to_string(),
      second_given_name: second.to_string(),
      created_at: Utc
        .with_ymd_and_hms(created.0, created.1, created.2, 8, 30, 0)
        .unwrap(),
      updated_at: Utc
        .with_ymd_and_hms(updated.0, updated.1, updated.2, 17, 45, 0)
        .unwrap(),
    }
  }

  #[test]
  fn collapse_whitespace_joins_and_squashes() {
    assert_eq!(collapse_whitespace(&["An ", " Marie"]), "An Marie");
    assert_eq!(collapse_whitespace(&["An", "", "Lee"]), "An Lee");
    assert_eq!(collapse_whitespace(&["  "]), "");
  }

  #[test]
  fn whitespace_variants_merge_into_one_user() {
    let rows = vec![
      person(10, "Lee", "An", "Marie", (2001, 3, 5), (2002, 1, 1)),
      person(11, "Lee", "An ", " Marie", (2000, 6, 1), (2003, 9, 9)),
    ];

    let users = dedup_persons(&rows);
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].given_name, "An Marie");
    assert_eq!(users[0].display_name, "An Marie Lee");
    assert_eq!(users[0].spi_person_ids, vec![10, 11]);
  }

  #[test]
  fn differing_given_names_never_merge() {
    let rows = vec![
      person(10, "Lee", "An", "Marie", (2001, 3, 5), (2002, 1, 1)),
      person(11, "Lee", "Ann", "Marie", (2001, 3, 5), (2002, 1, 1)),
    ];

    let users = dedup_persons(&rows);
    assert_eq!(users.len(), 2);
  }

  #[test]
  fn group_timestamps_are_date_truncated_min_and_max() {
    let rows = vec![
      person(10, "Lee", "An", "", (2001, 3, 5), (2002, 1, 1)),
      person(11, "Lee", "An", "", (2000, 6, 1), (2003, 9, 9)),
      person(12, "Lee", "An", "", (2004, 2, 2), (2001, 5, 5)),
    ];

    let users = dedup_persons(&rows);
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].created_at, NaiveDate::from_ymd_opt(2000, 6, 1).unwrap());
    assert_eq!(users[0].updated_at, NaiveDate::from_ymd_opt(2003, 9, 9).unwrap());
  }

  #[test]
  fn duplicate_person_ids_are_preserved() {
    // The same legacy person id appears once per project association; each
    // association must survive for downstream participation linking.
    let mut a = person(10, "Lee", "An", "", (2001, 3, 5), (2002, 1, 1));
    a.project_id = 1;
    let mut b = person(10, "Lee", "An", "", (2001, 3, 5), (2002, 1, 1));
    b.project_id = 2;

    let users = dedup_persons(&[a, b]);
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].spi_person_ids, vec![10, 10]);
  }

  #[test]
  fn every_person_lands_in_exactly_one_group() {
    let rows = vec![
      person(1, "Lee", "An", "Marie", (2001, 1, 1), (2001, 1, 1)),
      person(2, "Lee", "Ann", "Marie", (2001, 1, 1), (2001, 1, 1)),
      person(3, "Singh", "Ravi", "", (2001, 1, 1), (2001, 1, 1)),
      person(4, "Lee", "An", "Marie", (2001, 1, 1), (2001, 1, 1)),
    ];

    let users = dedup_persons(&rows);
    let mut all_ids: Vec<i64> = users
      .iter()
      .flat_map(|u| u.spi_person_ids.iter().copied())
      .collect();
    all_ids.sort_unstable();
    assert_eq!(all_ids, vec![1, 2, 3, 4]);
  }
}
