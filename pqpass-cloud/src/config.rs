//! Client configuration.

use crate::error::{CloudError, CloudResult};
use serde::{Deserialize, Serialize};

/// Configuration for talking to a pqpass server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Base URL of the server API (e.g., "https://api.pqpass.io/").
    pub api_base_url: String,

    /// Per-request timeout applied by the HTTP client.
    pub request_timeout_secs: u64,

    /// Upper bound on envelopes decrypted concurrently by `fetch_all`.
    pub max_parallel_decrypts: usize,

    /// Sent as the `User-Agent` header.
    pub user_agent: String,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.pqpass.io/".to_string(),
            request_timeout_secs: 30,
            max_parallel_decrypts: 8,
            user_agent: concat!("pqpass/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl CloudConfig {
    /// Parses a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> CloudResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CloudResult<()> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(CloudError::Config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(CloudError::Config("request_timeout_secs must be positive".into()));
        }
        if self.max_parallel_decrypts == 0 {
            return Err(CloudError::Config("max_parallel_decrypts must be positive".into()));
        }
        Ok(())
    }
}
