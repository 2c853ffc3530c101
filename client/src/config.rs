use std::{env, time::Duration};

use tracing::debug;

/// Runtime settings for the session client and controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the reasoning backend.
    pub server_url: String,
    /// Upper bound on a single request, proof search included.
    pub request_timeout: Duration,
    /// How long a blocked reveal keeps its flash marker.
    pub blocked_flash: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            request_timeout: Duration::from_secs(30),
            blocked_flash: Duration::from_millis(500),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `LOGICSWEEPER_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let server_url =
            env::var("LOGICSWEEPER_SERVER_URL").unwrap_or_else(|_| defaults.server_url.clone());

        let request_timeout_secs: u64 = env::var("LOGICSWEEPER_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);

        let blocked_flash_millis: u64 = env::var("LOGICSWEEPER_BLOCKED_FLASH_MILLIS")
            .unwrap_or_else(|_| "500".to_string())
            .parse()
            .unwrap_or(500);

        let config = Self {
            server_url,
            request_timeout: Duration::from_secs(request_timeout_secs),
            blocked_flash: Duration::from_millis(blocked_flash_millis),
        };
        debug!("Loaded client config: {:?}", config);
        config
    }
}
