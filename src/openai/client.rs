//! Azure OpenAI client over the generic request executor.
//!
//! # Responsibilities
//! - Build deployment URLs from configuration
//! - Attach the `api-key` header
//! - Send chat and embedding requests with retry on 503

use crate::config::OpenAiConfig;
use crate::context::CallContext;
use crate::httpclient::{self, Payload, RequestSpec};
use crate::openai::chat::{ChatCompletionRequest, ChatCompletionResponse};
use crate::openai::embeddings::{EmbeddingRequest, EmbeddingResponse};
use crate::transport::Transport;

pub const API_KEY_HEADER: &str = "api-key";

/// Client for one Azure OpenAI resource.
#[derive(Clone)]
pub struct AzureOpenAiClient {
    config: OpenAiConfig,
    transport: Transport,
}

impl AzureOpenAiClient {
    pub fn new(config: OpenAiConfig, transport: Transport) -> Self {
        Self { config, transport }
    }

    /// `{base}/openai/deployments/{model_path}?api-version={v}`
    pub fn endpoint_url(&self, model_path: &str) -> String {
        format!(
            "{}/openai/deployments/{}?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            model_path.trim_matches('/'),
            self.config.api_version
        )
    }

    pub fn chat_url(&self) -> String {
        self.endpoint_url(&format!("{}/chat/completions", self.config.chat_deployment))
    }

    pub fn embeddings_url(&self) -> String {
        self.endpoint_url(&format!("{}/embeddings", self.config.embedding_deployment))
    }

    /// Model name configured for embedding requests.
    pub fn embedding_model(&self) -> &str {
        &self.config.embedding_model
    }

    pub async fn chat(&self, ctx: &CallContext, request: &ChatCompletionRequest) -> httpclient::Result<ChatCompletionResponse> {
        let spec = self.spec(self.chat_url(), Payload::json(request)?);
        let response: ChatCompletionResponse = httpclient::execute_json_with_retry(ctx, &spec).await?;
        tracing::debug!(
            id = %response.id,
            choices = response.choices.len(),
            total_tokens = response.usage.total_tokens,
            "Chat completion received"
        );
        Ok(response)
    }

    pub async fn embeddings(&self, ctx: &CallContext, request: &EmbeddingRequest) -> httpclient::Result<EmbeddingResponse> {
        let spec = self.spec(self.embeddings_url(), Payload::json(request)?);
        httpclient::execute_json_with_retry(ctx, &spec).await
    }

    fn spec(&self, url: String, payload: Payload) -> RequestSpec {
        RequestSpec::post(url, payload)
            .with_header(API_KEY_HEADER, self.config.api_key.clone())
            .with_log_mode(self.config.log_mode)
            .with_retry_count(self.config.retry_attempts)
            .with_transport(self.transport.clone())
    }
}

impl std::fmt::Debug for AzureOpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiClient")
            .field("endpoint", &self.config.endpoint)
            .field("api_version", &self.config.api_version)
            .field("chat_deployment", &self.config.chat_deployment)
            .field("embedding_deployment", &self.config.embedding_deployment)
            .finish()
    }
}
