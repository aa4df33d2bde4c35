//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (subscriber, filter, formatting)
//!
//! Consumers:
//!     → stdout
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the inbound trace layer
//! - Upstream bodies are logged only when a request's log mode asks for it

pub mod logging;
