//! reqwest client construction for the notes backend

use crate::{EgressError, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Idle keep-alive connections are dropped after this long
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout in seconds.
    /// `None` leaves requests unbounded: a hung backend keeps the action busy.
    pub timeout_secs: Option<u64>,

    pub connect_timeout_secs: u64,

    /// Kept small; the CLI talks to a single host a handful of times per run
    pub pool_max_idle_per_host: usize,

    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 4,
            user_agent: format!("Notedeck/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Build the client shared by every gateway call
pub fn build_client(config: &HttpClientConfig) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .connect_timeout(config.connect_timeout())
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(POOL_IDLE_TIMEOUT)
        .user_agent(config.user_agent.as_str());

    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| EgressError::ConfigError(format!("Could not build HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_request_timeout_by_default() {
        let config = HttpClientConfig::default();
        assert_eq!(config.request_timeout(), None);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.user_agent.starts_with("Notedeck/"));
        assert!(build_client(&config).is_ok());
    }

    #[test]
    fn test_opt_in_request_timeout() {
        let config = HttpClientConfig {
            timeout_secs: Some(30),
            connect_timeout_secs: 2,
            ..HttpClientConfig::default()
        };

        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert!(build_client(&config).is_ok());
    }
}
