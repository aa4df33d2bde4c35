//! Azure OpenAI chat proxy library.
//!
//! The core is [`httpclient`]: a request executor for GET/POST with JSON or
//! raw-string bodies, optional request/response logging and bounded retry
//! while the upstream answers 503. [`openai`] and [`http`] are thin layers on
//! top of it.

pub mod config;
pub mod context;
pub mod http;
pub mod httpclient;
pub mod lifecycle;
pub mod observability;
pub mod openai;
pub mod resilience;
pub mod transport;

pub use config::ServiceConfig;
pub use context::{CallContext, CancelHandle, Interrupted};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use transport::Transport;
