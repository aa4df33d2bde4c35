//! Declarative description of one outbound call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::httpclient::error::{Cause, Error, Result};
use crate::resilience::RetryPolicy;
use crate::transport::Transport;

/// HTTP method for an outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// Which side of a call gets logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    #[default]
    None,
    Input,
    Output,
    Both,
}

impl LogMode {
    pub fn logs_input(self) -> bool {
        matches!(self, LogMode::Input | LogMode::Both)
    }

    pub fn logs_output(self) -> bool {
        matches!(self, LogMode::Output | LogMode::Both)
    }
}

/// Request body, fixed when the spec is built.
///
/// JSON-mode calls accept every variant; string-mode POSTs accept only
/// [`Payload::Text`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Empty,
    Json(serde_json::Value),
    Text(String),
}

impl Payload {
    /// Serialize `value` now; the failure is an encoding error.
    #[track_caller]
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        match serde_json::to_value(value) {
            Ok(value) => Ok(Payload::Json(value)),
            Err(e) => Err(Error::new(Cause::Encode(e))),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text(text.into())
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Payload::Empty => "empty",
            Payload::Json(_) => "JSON",
            Payload::Text(_) => "text",
        }
    }
}

/// One outbound HTTP call.
///
/// `headers` are applied after the executor's defaults, so a caller entry
/// replaces a default of the same name. A `retry_count` of zero means the
/// default attempt budget. Without a `transport` each call builds a fresh
/// default one.
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    pub url: String,
    pub method: Method,
    pub payload: Payload,
    pub headers: HashMap<String, String>,
    pub log_mode: LogMode,
    pub retry_count: u32,
    pub transport: Option<Transport>,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn post(url: impl Into<String>, payload: Payload) -> Self {
        Self {
            url: url.into(),
            method: Method::Post,
            payload,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_log_mode(mut self, log_mode: LogMode) -> Self {
        self.log_mode = log_mode;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Retry policy derived from `retry_count`.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::for_attempts(self.retry_count)
    }
}
