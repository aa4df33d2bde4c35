//! Outbound HTTP transport.
//!
//! # Responsibilities
//! - Build the pooled `reqwest` client from [`TransportConfig`]
//! - Share one pool across every call that is handed the same `Transport`
//!
//! # Design Decisions
//! - Immutable once built; cloning shares the pool
//! - `reqwest` bounds idle connections per host, so `max_idle_connections`
//!   is applied per host

use std::time::Duration;

use crate::config::TransportConfig;

/// Reusable HTTP client configuration and connection pool.
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    config: TransportConfig,
}

impl Transport {
    /// Build a transport from configuration.
    pub fn new(config: &TransportConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .tcp_keepalive(Duration::from_secs(config.keep_alive_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_max_idle_per_host(config.max_idle_connections)
            .pool_idle_timeout(Duration::from_secs(config.idle_timeout_secs));

        if !config.use_env_proxy {
            builder = builder.no_proxy();
        }

        let client = builder.build()?;

        tracing::debug!(
            connect_timeout_secs = config.connect_timeout_secs,
            request_timeout_secs = config.request_timeout_secs,
            max_idle_connections = config.max_idle_connections,
            use_env_proxy = config.use_env_proxy,
            "Transport built"
        );

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Build a transport with the default configuration.
    pub fn with_defaults() -> Result<Self, reqwest::Error> {
        Self::new(&TransportConfig::default())
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_keeps_config() {
        let config = TransportConfig {
            request_timeout_secs: 5,
            max_idle_connections: 2,
            use_env_proxy: false,
            ..TransportConfig::default()
        };
        let transport = Transport::new(&config).unwrap();
        assert_eq!(transport.config(), &config);
    }

    #[test]
    fn test_default_transport_builds() {
        let transport = Transport::with_defaults().unwrap();
        assert_eq!(transport.config().max_idle_connections, 50);
    }
}
