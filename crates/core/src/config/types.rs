use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::evaluation::EvaluationConfig;
use crate::feedback::FeedbackConfig;
use crate::search::{OmdbConfig, TmdbConfig};
use crate::session::SessionConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub search: SearchConfig,
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    #[serde(default)]
    pub feedback: Option<FeedbackConfig>,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Series search provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Search backend type
    pub backend: SearchBackend,
    /// OMDb-specific configuration (required when backend = "omdb")
    #[serde(default)]
    pub omdb: Option<OmdbConfig>,
    /// TMDB-specific configuration (required when backend = "tmdb")
    #[serde(default)]
    pub tmdb: Option<TmdbConfig>,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u32,
}

fn default_search_timeout() -> u32 {
    10
}

/// Available series search backends
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchBackend {
    Omdb,
    Tmdb,
}

impl SearchBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchBackend::Omdb => "omdb",
            SearchBackend::Tmdb => "tmdb",
        }
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub search: SanitizedSearchConfig,
    pub evaluation: EvaluationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackConfig>,
    pub session: SessionConfig,
}

/// Sanitized search config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSearchConfig {
    pub backend: String,
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let (api_key_configured, base_url) = match config.search.backend {
            SearchBackend::Omdb => config
                .search
                .omdb
                .as_ref()
                .map(|o| (!o.api_key.is_empty(), o.base_url.clone()))
                .unwrap_or((false, None)),
            SearchBackend::Tmdb => config
                .search
                .tmdb
                .as_ref()
                .map(|t| (!t.api_key.is_empty(), t.base_url.clone()))
                .unwrap_or((false, None)),
        };

        Self {
            server: config.server.clone(),
            search: SanitizedSearchConfig {
                backend: config.search.backend.as_str().to_string(),
                api_key_configured,
                base_url,
                timeout_secs: config.search.timeout_secs,
            },
            evaluation: config.evaluation.clone(),
            feedback: config.feedback.clone(),
            session: config.session.clone(),
        }
    }
}
