//! [`ItisClient`] — reqwest-based client for the authority's Solr endpoint.

use std::time::Duration;

use serde::Deserialize;
use sims_core::species::TaxonRecord;

use crate::{Error, Result, SearchQuery, TaxonAuthority};

/// Async HTTP client for the ITIS-style full-text search endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based. The
/// configured timeout applies per request, so one slow chunk lookup cannot
/// stall the whole run.
#[derive(Clone)]
pub struct ItisClient {
  client:   reqwest::Client,
  base_url: String,
}

impl ItisClient {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
    })
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SolrResponse {
  response: SolrResponseBody,
}

#[derive(Deserialize)]
struct SolrResponseBody {
  docs: Vec<SolrDoc>,
}

#[derive(Deserialize)]
struct SolrDoc {
  /// The authority serialises tsn as a string.
  tsn: String,
  #[serde(rename = "nameWInd", default)]
  name_with_indicator: String,
  #[serde(rename = "nameWOInd", default)]
  name_without_indicator: String,
  #[serde(default)]
  rank: String,
  #[serde(default)]
  unit1: String,
}

impl SolrDoc {
  fn into_record(self) -> Result<TaxonRecord> {
    let tsn = self
      .tsn
      .trim()
      .parse::<i64>()
      .map_err(|_| Error::BadTsn(self.tsn.clone()))?;
    Ok(TaxonRecord {
      tsn,
      name_with_indicator:    self.name_with_indicator,
      name_without_indicator: self.name_without_indicator,
      rank:                   self.rank,
      unit1:                  self.unit1,
    })
  }
}

// ─── TaxonAuthority impl ─────────────────────────────────────────────────────

impl TaxonAuthority for ItisClient {
  type Error = Error;

  async fn search(&self, query: &SearchQuery) -> Result<Vec<TaxonRecord>> {
    let resp = self
      .client
      .get(format!("{}/", self.base_url))
      .query(&[
        ("q", query.q.as_str()),
        ("rows", &query.rows.to_string()),
        ("wt", "json"),
      ])
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(Error::Status(resp.status()));
    }

    let body: SolrResponse = resp.json().await?;
    body
      .response
      .docs
      .into_iter()
      .map(SolrDoc::into_record)
      .collect()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
