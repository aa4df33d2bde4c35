//! Error types for outbound HTTP calls.
//!
//! # Design
//! [`Cause`] says what went wrong, [`ErrorKind`] is its fieldless
//! classification, and [`Error`] pairs the cause with the source locations
//! that produced and forwarded it. Adding a location never changes the kind,
//! so the retry predicate can match on `kind()` however deep the trace is.

use std::fmt;
use std::panic::Location;

use thiserror::Error;

use crate::context::Interrupted;

/// Result type for outbound HTTP calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a [`Cause`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ServiceUnavailable,
    Upstream,
    Transport,
    Encode,
    Decode,
    InvalidText,
    InputFormat,
    InvalidRequest,
    Cancelled,
    DeadlineExceeded,
}

/// What went wrong during a call.
#[derive(Debug, Error)]
pub enum Cause {
    /// Upstream answered 503. The only retryable condition.
    #[error("service unavailable")]
    ServiceUnavailable,

    /// Upstream answered 500; carries the status line.
    #[error("upstream error: {status}")]
    Upstream { status: String },

    /// Connecting, sending or reading the body failed.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The request payload could not be serialized.
    #[error("encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body is not JSON of the expected shape.
    #[error("decoding failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// A string-mode response body is not valid UTF-8.
    #[error("response body is not valid UTF-8: {0}")]
    InvalidText(#[source] std::string::FromUtf8Error),

    /// A string-mode POST was given a payload that is not a string.
    #[error("input format error: {0}")]
    InputFormat(String),

    /// URL or headers cannot be put on the wire.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("call cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl Cause {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Cause::ServiceUnavailable => ErrorKind::ServiceUnavailable,
            Cause::Upstream { .. } => ErrorKind::Upstream,
            Cause::Transport(_) => ErrorKind::Transport,
            Cause::Encode(_) => ErrorKind::Encode,
            Cause::Decode(_) => ErrorKind::Decode,
            Cause::InvalidText(_) => ErrorKind::InvalidText,
            Cause::InputFormat(_) => ErrorKind::InputFormat,
            Cause::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Cause::Cancelled => ErrorKind::Cancelled,
            Cause::DeadlineExceeded => ErrorKind::DeadlineExceeded,
        }
    }
}

/// A failed call: the cause plus the locations it passed through, innermost
/// first.
///
/// `{}` prints the cause; `{:#}` appends the trace.
#[derive(Debug)]
pub struct Error {
    cause: Cause,
    trace: Vec<&'static Location<'static>>,
}

impl Error {
    #[track_caller]
    pub fn new(cause: Cause) -> Self {
        Self {
            cause,
            trace: vec![Location::caller()],
        }
    }

    /// Record the caller's location on the trace.
    #[track_caller]
    pub fn traced(mut self) -> Self {
        self.trace.push(Location::caller());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.cause.kind()
    }

    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    pub fn trace(&self) -> &[&'static Location<'static>] {
        &self.trace
    }

    pub fn is_service_unavailable(&self) -> bool {
        self.kind() == ErrorKind::ServiceUnavailable
    }

    /// Status line of an upstream failure.
    pub fn status(&self) -> Option<&str> {
        match &self.cause {
            Cause::Upstream { status } => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.cause)?;
        if f.alternate() {
            for location in &self.trace {
                write!(f, "\n    at {}", location)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.cause)
    }
}

impl From<Cause> for Error {
    #[track_caller]
    fn from(cause: Cause) -> Self {
        Error::new(cause)
    }
}

impl From<Interrupted> for Error {
    #[track_caller]
    fn from(interrupted: Interrupted) -> Self {
        let cause = match interrupted {
            Interrupted::Cancelled => Cause::Cancelled,
            Interrupted::DeadlineExceeded => Cause::DeadlineExceeded,
        };
        Error::new(cause)
    }
}
