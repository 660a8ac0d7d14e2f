//! Runtime configuration resolved from the environment (and `.env`).

use std::env;
use std::fmt;
use std::str::FromStr;

use tracing::debug;
use url::Url;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TOOL: &str = "cmcintel";
const DEFAULT_MAX_CITATIONS: usize = 5;
const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} is not a valid URL: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{var} must use http or https, got '{value}'")]
    InvalidScheme { var: &'static str, value: String },
}

/// Secret string that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// `None` when `GEMINI_API_KEY` is unset; generation is then unavailable.
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub base_url: String,
    pub retries: u32,
}

#[derive(Debug, Clone)]
pub struct PubMedConfig {
    pub base_url: String,
    pub api_key: Option<ApiKey>,
    pub tool: String,
    pub email: Option<String>,
    pub cache_capacity: usize,
}

/// Application configuration, constructed once at startup and handed to
/// each client explicitly.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub pubmed: PubMedConfig,
    pub max_citations: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let gemini = GeminiConfig {
            api_key: get("GEMINI_API_KEY").map(ApiKey::new),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: parse_url("GEMINI_BASE_URL", get("GEMINI_BASE_URL"), GEMINI_API_BASE)?,
            retries: parse_number("GEMINI_RETRIES", get("GEMINI_RETRIES"), 0)?,
        };

        let pubmed = PubMedConfig {
            base_url: parse_url("NCBI_EUTILS_URL", get("NCBI_EUTILS_URL"), EUTILS_BASE)?,
            api_key: get("NCBI_API_KEY").map(ApiKey::new),
            tool: get("NCBI_TOOL").unwrap_or_else(|| DEFAULT_TOOL.to_string()),
            email: get("NCBI_EMAIL"),
            cache_capacity: parse_number(
                "CMCINTEL_CACHE_CAPACITY",
                get("CMCINTEL_CACHE_CAPACITY"),
                DEFAULT_CACHE_CAPACITY,
            )?,
        };

        let max_citations = parse_number(
            "CMCINTEL_MAX_CITATIONS",
            get("CMCINTEL_MAX_CITATIONS"),
            DEFAULT_MAX_CITATIONS,
        )?;

        Ok(Self {
            gemini,
            pubmed,
            max_citations,
        })
    }
}

fn parse_number<T: FromStr>(
    var: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value: v }),
    }
}

/// Validates an endpoint override and strips any trailing slash.
fn parse_url(
    var: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<String, ConfigError> {
    let Some(raw) = value else {
        return Ok(default.to_string());
    };
    let parsed = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl { var, source })?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        _ => Err(ConfigError::InvalidScheme { var, value: raw }),
    }
}
