//! Azure OpenAI collaborator.
//!
//! # Data Flow
//! ```text
//! OpenAiConfig + Transport
//!     → client.rs (deployment URL, api-key header, retry count, log mode)
//!     → httpclient (POST JSON with retry on 503)
//!     → chat.rs / embeddings.rs response types
//! ```

pub mod chat;
pub mod client;
pub mod embeddings;
pub mod types;

pub use chat::{ChatCompletionChoice, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
pub use client::AzureOpenAiClient;
pub use embeddings::{Embedding, EmbeddingRequest, EmbeddingResponse};
pub use types::Usage;
