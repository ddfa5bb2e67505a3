//! Client configuration.
//!
//! Read from environment variables by `ClientConfig::from_env`. Parsing goes
//! through a lookup function so tests never touch the process environment.

use std::env;
use std::time::Duration;

use crate::error::ApiError;

/// Sent with every request; some deployments answer 406 without it.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Prefix for every request path, e.g. `https://api.example.org`.
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Load from `YOP_API_BASE_URL`, `YOP_API_USER_AGENT` and
    /// `YOP_API_TIMEOUT_SECS`. Only the base URL is required.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup("YOP_API_BASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::Config("YOP_API_BASE_URL is not set".to_string()))?;

        let user_agent = lookup("YOP_API_USER_AGENT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let timeout = match lookup("YOP_API_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ApiError::Config(format!("YOP_API_TIMEOUT_SECS must be a whole number, got `{raw}`")))?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            base_url,
            user_agent,
            timeout,
        })
    }
}
