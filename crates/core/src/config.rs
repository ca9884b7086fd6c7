use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

pub const TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OUTPUT_DIR: &str = "logs";

#[derive(Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    pub token: String,
    #[serde(default = "default_api_url")]
    pub api_url: Url,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Used for both HTTP and HTTPS requests.
    #[serde(default)]
    pub proxy: Option<Url>,
}

impl GitHubConfig {
    pub fn new(token: String) -> Self {
        Self { token, api_url: default_api_url(), timeout: DEFAULT_TIMEOUT_SECS, proxy: None }
    }

    pub fn timeout_duration(&self) -> Duration { Duration::from_secs(self.timeout) }
}

// Keep the token out of logs
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url.as_str())
            .field("timeout", &self.timeout)
            .field("proxy", &self.proxy.as_ref().map(Url::as_str))
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("GITHUB_TOKEN is not set")]
    Missing,
    #[error("GITHUB_TOKEN is empty")]
    Empty,
}

/// Reads the API token from the environment. Blank values are rejected.
pub fn token_from_env() -> Result<String, TokenError> {
    token_from_value(std::env::var(TOKEN_ENV).ok())
}

fn token_from_value(value: Option<String>) -> Result<String, TokenError> {
    let value = value.ok_or(TokenError::Missing)?;
    let token = value.trim();
    if token.is_empty() {
        return Err(TokenError::Empty);
    }
    Ok(token.to_string())
}

pub fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("default API URL is valid")
}

fn default_timeout() -> u64 { DEFAULT_TIMEOUT_SECS }
