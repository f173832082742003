//! Encoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, date-truncated values as
//! `YYYY-MM-DD`, and contributing person-id lists as compact JSON arrays
//! (queried with `json_each` when resolving participation).

use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Person-id lists ─────────────────────────────────────────────────────────

pub fn encode_person_ids(ids: &[i64]) -> Result<String> {
  Ok(serde_json::to_string(ids)?)
}

pub fn decode_person_ids(s: &str) -> Result<Vec<i64>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn date_round_trip() {
    let d = NaiveDate::from_ymd_opt(2003, 7, 14).unwrap();
    assert_eq!(decode_date(&encode_date(d)).unwrap(), d);
  }

  #[test]
  fn person_ids_round_trip_preserves_duplicates() {
    let ids = vec![4, 4, 9];
    assert_eq!(
      decode_person_ids(&encode_person_ids(&ids).unwrap()).unwrap(),
      ids
    );
  }
}
