use std::collections::HashMap;

use serde::Deserialize;

/// Response from `esearch.fcgi?retmode=json`.
///
/// Service-level failures (rate limiting, bad API key) arrive as a 200 with
/// only a top-level `error` string, so neither field is defaulted.
#[derive(Deserialize, Debug)]
pub struct ESearchResponse {
    pub esearchresult: Option<ESearchResult>,
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ESearchResult {
    pub idlist: Option<Vec<String>>,
    /// Set by E-utilities on malformed terms instead of an HTTP error.
    #[serde(rename = "ERROR")]
    pub error: Option<String>,
}

/// Response from `esummary.fcgi?retmode=json`.
///
/// `result` maps each PMID to its summary, alongside a `uids` array, so the
/// values are decoded per id rather than up front.
#[derive(Deserialize, Debug)]
pub struct ESummaryResponse {
    pub result: Option<HashMap<String, serde_json::Value>>,
    pub error: Option<String>,
}

/// The subset of a PubMed document summary we read.
#[derive(Deserialize, Debug)]
pub struct DocSummary {
    #[serde(default)]
    pub title: String,
    pub error: Option<String>,
}

/// A literature reference: article title plus a link to its PubMed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub title: String,
    pub link: String,
}
