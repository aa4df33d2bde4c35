//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound call:
//!     → context.rs (deadline / cancellation race)
//!     → On failure: retries.rs (check predicate, wait, try again)
//! ```
//!
//! # Design Decisions
//! - Only the caller decides what is retryable
//! - Every wait is cancellable

pub mod retries;

pub use retries::{RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY};
