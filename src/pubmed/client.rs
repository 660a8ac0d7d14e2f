use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{Citation, DocSummary, ESearchResponse, ESummaryResponse};
use crate::config::{ApiKey, PubMedConfig};

const ARTICLE_BASE: &str = "https://pubmed.ncbi.nlm.nih.gov";
/// Upper bound on ids per request; keeps the batched esummary URL short.
const MAX_IDS_PER_QUERY: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum PubMedError {
    #[error("PubMed {stage} failed: status {code}")]
    Status { stage: &'static str, code: u16 },

    #[error("PubMed {stage} returned malformed JSON: {source}")]
    Malformed {
        stage: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("PubMed {stage} response has no `{field}`")]
    Incomplete {
        stage: &'static str,
        field: &'static str,
    },

    #[error("PubMed {stage} failed: {message}")]
    Service {
        stage: &'static str,
        message: String,
    },

    #[error("PubMed search rejected the query: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Source of literature citations for a free-text query.
/// Implemented by `PubMedClient` for production; mock implementations used in tests.
pub trait LiteratureSource {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Citation>, PubMedError>;
}

/// HTTP client for the NCBI E-utilities esearch/esummary endpoints.
#[derive(Clone)]
pub struct PubMedClient {
    http: Client,
    base_url: String,
    tool: String,
    email: Option<String>,
    api_key: Option<ApiKey>,
}

impl PubMedClient {
    pub fn new(http: Client, config: &PubMedConfig) -> Self {
        if config.api_key.is_none() {
            debug!("no NCBI_API_KEY set; E-utilities allows 3 requests/second");
        }
        Self {
            http,
            base_url: config.base_url.clone(),
            tool: config.tool.clone(),
            email: config.email.clone(),
            api_key: config.api_key.clone(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            tool: "cmcintel-test".to_string(),
            email: None,
            api_key: None,
        }
    }

    fn courtesy_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("tool", self.tool.clone())];
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.expose().to_string()));
        }
        params
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        stage: &'static str,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, PubMedError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("User-Agent", crate::USER_AGENT)
            .query(params)
            .query(&self.courtesy_params())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PubMedError::Status {
                stage,
                code: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| PubMedError::Malformed { stage, source })
    }

    /// Returns PMIDs in relevance order, at most `max_results`.
    async fn esearch(&self, query: &str, max_results: usize) -> Result<Vec<String>, PubMedError> {
        let params = [
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmode", "json".to_string()),
            ("retmax", max_results.to_string()),
            ("sort", "relevance".to_string()),
        ];
        let response: ESearchResponse = self.get_json("search", "esearch.fcgi", &params).await?;
        if let Some(message) = response.error {
            return Err(PubMedError::Service {
                stage: "search",
                message,
            });
        }
        let result = response.esearchresult.ok_or(PubMedError::Incomplete {
            stage: "search",
            field: "esearchresult",
        })?;

        let mut ids = match (result.idlist, result.error) {
            (Some(ids), _) if !ids.is_empty() => ids,
            (_, Some(error)) => return Err(PubMedError::Rejected(error)),
            (Some(ids), None) => ids,
            (None, None) => {
                return Err(PubMedError::Incomplete {
                    stage: "search",
                    field: "idlist",
                });
            }
        };
        ids.truncate(max_results);
        debug!(query, count = ids.len(), "PubMed esearch returned PMIDs");
        Ok(ids)
    }

    /// Fetches summaries for all ids in one request and keeps esearch order.
    /// Ids without a usable summary are skipped.
    async fn esummary(&self, ids: &[String]) -> Result<Vec<Citation>, PubMedError> {
        let params = [
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "json".to_string()),
        ];
        let response: ESummaryResponse =
            self.get_json("summary", "esummary.fcgi", &params).await?;
        if let Some(message) = response.error {
            return Err(PubMedError::Service {
                stage: "summary",
                message,
            });
        }
        let result = response.result.ok_or(PubMedError::Incomplete {
            stage: "summary",
            field: "result",
        })?;

        let citations = ids
            .iter()
            .filter_map(|pmid| citation_from_summary(pmid, result.get(pmid)))
            .collect();
        Ok(citations)
    }
}

impl LiteratureSource for PubMedClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<Citation>, PubMedError> {
        let max_results = max_results.min(MAX_IDS_PER_QUERY);
        if max_results == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let ids = self.esearch(query, max_results).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.esummary(&ids).await
    }
}

fn citation_from_summary(pmid: &str, summary: Option<&serde_json::Value>) -> Option<Citation> {
    if pmid.is_empty() || !pmid.bytes().all(|b| b.is_ascii_digit()) {
        warn!(pmid, "skipping non-numeric PMID");
        return None;
    }
    let Some(value) = summary else {
        warn!(pmid, "no summary returned for PMID");
        return None;
    };
    let summary: DocSummary = match serde_json::from_value(value.clone()) {
        Ok(s) => s,
        Err(e) => {
            warn!(pmid, error = %e, "malformed summary for PMID");
            return None;
        }
    };
    if let Some(error) = summary.error {
        warn!(pmid, error = %error, "summary error for PMID");
        return None;
    }
    let title = summary.title.trim();
    if title.is_empty() {
        warn!(pmid, "summary has no title");
        return None;
    }
    Some(Citation {
        title: title.to_string(),
        link: article_link(pmid),
    })
}

pub fn article_link(pmid: &str) -> String {
    format!("{ARTICLE_BASE}/{pmid}/")
}
