//! Resolver connection configuration.

use std::time::Duration;

use url::Url;

use crate::error::{BridgeError, Result};

/// Default resolver address (the bridge server's stock port).
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`HttpResolver`](crate::client::HttpResolver).
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl BridgeConfig {
    /// Build a config for an explicit base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BridgeError::user_input(format!("invalid resolver URL: {}", e)))?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Read `XML_BRIDGE_URL` and `XML_BRIDGE_TIMEOUT_SECS` from the
    /// environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let base = std::env::var("XML_BRIDGE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(&base)?;
        if let Ok(secs) = std::env::var("XML_BRIDGE_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                BridgeError::user_input(format!("XML_BRIDGE_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Join an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BridgeError::user_input(format!("invalid endpoint path {}: {}", path, e)))
    }
}
