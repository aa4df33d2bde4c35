//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → handlers.rs (/chat, /embeddings, /health)
//!     → openai client → httpclient → Azure
//!     → response.rs (envelope, status mapping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{Envelope, ServiceError};
pub use server::{AppState, HttpServer, ServerError};
