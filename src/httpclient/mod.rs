//! Generic outbound HTTP request helper.
//!
//! # Data Flow
//! ```text
//! RequestSpec (url, method, payload, headers, log mode, retry count)
//!     → executor.rs (encode body, merge headers, send through Transport)
//!     → classify status (503 / 500 / other)
//!     → decode JSON into T, or return the body as text
//!
//! *_with_retry:
//!     → resilience::RetryPolicy (repeat while ServiceUnavailable)
//! ```
//!
//! # Design Decisions
//! - The executor never retries; retrying is a separate layer
//! - Errors keep their kind while gaining trace locations
//! - The transport is optional and shared by cloning

pub mod error;
pub mod executor;
pub mod request;

pub use error::{Cause, Error, ErrorKind, Result};
pub use executor::{
    execute_json, execute_json_with_retry, execute_string, execute_string_with_retry, get_json, get_json_retry,
    get_string, get_string_retry, post_json, post_json_retry, post_string, post_string_retry,
};
pub use request::{LogMode, Method, Payload, RequestSpec};
