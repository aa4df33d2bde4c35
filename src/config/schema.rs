//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::httpclient::LogMode;
use crate::openai::embeddings::TEXT_EMBEDDING_ADA_002;

/// Root configuration for the chat proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Outbound HTTP client settings.
    pub transport: TransportConfig,

    /// Azure OpenAI endpoint, credentials and deployments.
    pub openai: OpenAiConfig,

    /// Defaults applied by the `/chat` endpoint.
    pub chat: ChatConfig,

    /// Inbound request timeouts.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Outbound HTTP client (connection pool) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// TCP keep-alive interval in seconds.
    pub keep_alive_secs: u64,

    /// Total time for one request/response in seconds.
    pub request_timeout_secs: u64,

    /// Maximum idle pooled connections kept per host.
    pub max_idle_connections: usize,

    /// Idle pooled connections are closed after this many seconds.
    pub idle_timeout_secs: u64,

    /// Honour `HTTP_PROXY` / `HTTPS_PROXY` / `NO_PROXY`.
    pub use_env_proxy: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            keep_alive_secs: 30,
            request_timeout_secs: 30,
            max_idle_connections: 50,
            idle_timeout_secs: 60,
            use_env_proxy: true,
        }
    }
}

/// Azure OpenAI configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com/`.
    pub endpoint: String,

    /// Value of the `api-key` header. Overridden by `AZURE_OPENAI_API_KEY`.
    pub api_key: String,

    /// `api-version` query parameter.
    pub api_version: String,

    /// Deployment serving chat completions.
    pub chat_deployment: String,

    /// Deployment serving embeddings.
    pub embedding_deployment: String,

    /// Model name sent in embedding requests.
    pub embedding_model: String,

    /// Request/response logging for upstream calls.
    pub log_mode: LogMode,

    /// Attempts per upstream call while it answers 503 (0 = default).
    pub retry_attempts: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://example.openai.azure.com/".to_string(),
            api_key: String::new(),
            api_version: "2023-05-15".to_string(),
            chat_deployment: "gpt-35".to_string(),
            embedding_deployment: "embedding-ada".to_string(),
            embedding_model: TEXT_EMBEDDING_ADA_002.to_string(),
            log_mode: LogMode::None,
            retry_attempts: 0,
        }
    }
}

/// Defaults for the `/chat` endpoint.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ChatConfig {
    /// System message prepended to every conversation (empty = none).
    pub system_prompt: String,

    /// `max_tokens` sent upstream (0 = upstream default).
    pub max_tokens: u32,

    /// `temperature` sent upstream (unset = upstream default).
    pub temperature: Option<f32>,
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for one inbound request, upstream retries included, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
