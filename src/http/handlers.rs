//! Endpoint handlers.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::config::ChatConfig;
use crate::http::request::request_id;
use crate::http::response::{Envelope, ServiceError};
use crate::http::server::AppState;
use crate::openai::{ChatCompletionRequest, ChatMessage, EmbeddingRequest, Usage};

/// Body accepted by `/chat` and `/embeddings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextInput {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub finish_reason: Option<String>,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingReply {
    pub embedding: Vec<f64>,
    pub usage: Usage,
}

/// Conversation sent upstream for one `/chat` call.
pub fn build_chat_request(config: &ChatConfig, text: &str) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(2);
    if !config.system_prompt.trim().is_empty() {
        messages.push(ChatMessage::system(config.system_prompt.clone()));
    }
    messages.push(ChatMessage::user(text));

    ChatCompletionRequest {
        max_tokens: (config.max_tokens > 0).then_some(config.max_tokens),
        temperature: config.temperature,
        ..ChatCompletionRequest::new(messages)
    }
}

pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<TextInput>,
) -> Result<Json<Envelope<ChatReply>>, ServiceError> {
    if input.text.trim().is_empty() {
        return Err(ServiceError::EmptyText);
    }

    tracing::debug!(request_id = %request_id(&headers), chars = input.text.len(), "Chat request");

    let ctx = state.call_context();
    let request = build_chat_request(&state.chat, &input.text);
    let response = state.client.chat(&ctx, &request).await?;

    let choice = response.first_choice().ok_or(ServiceError::NoChoices)?;
    Ok(Json(Envelope::ok(ChatReply {
        reply: choice.message.content.clone(),
        finish_reason: choice.finish_reason.clone(),
        usage: response.usage,
    })))
}

pub async fn embeddings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<TextInput>,
) -> Result<Json<Envelope<EmbeddingReply>>, ServiceError> {
    if input.text.trim().is_empty() {
        return Err(ServiceError::EmptyText);
    }

    tracing::debug!(request_id = %request_id(&headers), chars = input.text.len(), "Embedding request");

    let ctx = state.call_context();
    let request = EmbeddingRequest::new(input.text, state.client.embedding_model());
    let mut response = state.client.embeddings(&ctx, &request).await?;

    if response.data.is_empty() {
        return Err(ServiceError::NoChoices);
    }
    Ok(Json(Envelope::ok(EmbeddingReply {
        embedding: response.data.swap_remove(0).embedding,
        usage: response.usage,
    })))
}

pub async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_with_defaults() {
        let request = build_chat_request(&ChatConfig::default(), "why is the sky blue");
        assert_eq!(request.messages, vec![ChatMessage::user("why is the sky blue")]);
        assert_eq!(request.max_tokens, None);
        assert_eq!(request.temperature, None);
    }

    #[test]
    fn test_chat_request_with_system_prompt() {
        let config = ChatConfig {
            system_prompt: "Answer briefly.".into(),
            max_tokens: 100,
            temperature: Some(0.2),
        };
        let request = build_chat_request(&config, "hi");
        assert_eq!(request.messages[0], ChatMessage::system("Answer briefly."));
        assert_eq!(request.messages[1], ChatMessage::user("hi"));
        assert_eq!(request.max_tokens, Some(100));
        assert_eq!(request.temperature, Some(0.2));
    }
}
