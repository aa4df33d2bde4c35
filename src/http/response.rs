//! Response envelope and error mapping.
//!
//! # Responsibilities
//! - Wrap every handler result in `{code, msg, data}`
//! - Map upstream failures to appropriate HTTP status codes
//!
//! # Design Decisions
//! - `code` is 0 on success and the HTTP status otherwise
//! - Upstream unavailability stays 503, interrupted calls become 504

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::httpclient::{self, ErrorKind};

/// Body of every `/chat` and `/embeddings` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub msg: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn failure(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            msg: msg.into(),
            data: None,
        }
    }
}

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("text must not be empty")]
    EmptyText,

    #[error("upstream returned no choices")]
    NoChoices,

    #[error(transparent)]
    Upstream(#[from] httpclient::Error),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::EmptyText => StatusCode::BAD_REQUEST,
            ServiceError::NoChoices => StatusCode::BAD_GATEWAY,
            ServiceError::Upstream(e) => match e.kind() {
                ErrorKind::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Cancelled | ErrorKind::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::Upstream | ErrorKind::Transport | ErrorKind::Decode | ErrorKind::InvalidText => {
                    StatusCode::BAD_GATEWAY
                }
                ErrorKind::Encode | ErrorKind::InputFormat | ErrorKind::InvalidRequest => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ServiceError::Upstream(e) = &self {
            tracing::warn!(status = %status, error = %format!("{:#}", e), "Upstream call failed");
        }
        (status, Json(Envelope::failure(status, self.to_string()))).into_response()
    }
}
