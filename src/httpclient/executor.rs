//! Request execution: one round trip per call, plus the retrying wrappers.
//!
//! # Responsibilities
//! - Turn a [`RequestSpec`] into a wire request (body, default headers)
//! - Classify the response: 503 → retryable, 500 → fatal, else read the body
//! - Decode the body as JSON or hand it back as text
//! - Retry on 503 with [`RetryPolicy`]
//!
//! # Design Decisions
//! - Payload/encoding mismatches and bad headers fail before any I/O
//! - 503 and 500 bodies are never read
//! - Every await is raced against the call context

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::context::CallContext;
use crate::httpclient::error::{Cause, Error, Result};
use crate::httpclient::request::{Method, Payload, RequestSpec};
use crate::transport::Transport;

/// How the request body is produced and the response body consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Json,
    Text,
}

/// Execute `spec` once and decode the response body into `T`.
pub async fn execute_json<T: DeserializeOwned>(ctx: &CallContext, spec: &RequestSpec) -> Result<T> {
    let body = round_trip(ctx, spec, Encoding::Json).await.map_err(|e| e.traced())?;
    serde_json::from_slice(&body).map_err(|e| Error::new(Cause::Decode(e)))
}

/// Execute `spec` once and return the response body as text.
pub async fn execute_string(ctx: &CallContext, spec: &RequestSpec) -> Result<String> {
    let body = round_trip(ctx, spec, Encoding::Text).await.map_err(|e| e.traced())?;
    String::from_utf8(body).map_err(|e| Error::new(Cause::InvalidText(e)))
}

/// [`execute_json`] retried while upstream answers 503.
pub async fn execute_json_with_retry<T: DeserializeOwned>(ctx: &CallContext, spec: &RequestSpec) -> Result<T> {
    spec.retry_policy()
        .run(ctx, |_| execute_json::<T>(ctx, spec), Error::is_service_unavailable)
        .await
        .map_err(|e| e.traced())
}

/// [`execute_string`] retried while upstream answers 503.
pub async fn execute_string_with_retry(ctx: &CallContext, spec: &RequestSpec) -> Result<String> {
    spec.retry_policy()
        .run(ctx, |_| execute_string(ctx, spec), Error::is_service_unavailable)
        .await
        .map_err(|e| e.traced())
}

pub async fn get_json<T: DeserializeOwned>(ctx: &CallContext, spec: RequestSpec) -> Result<T> {
    execute_json(ctx, &with_method(spec, Method::Get)).await
}

pub async fn get_json_retry<T: DeserializeOwned>(ctx: &CallContext, spec: RequestSpec) -> Result<T> {
    execute_json_with_retry(ctx, &with_method(spec, Method::Get)).await
}

pub async fn post_json<T: DeserializeOwned>(ctx: &CallContext, spec: RequestSpec) -> Result<T> {
    execute_json(ctx, &with_method(spec, Method::Post)).await
}

pub async fn post_json_retry<T: DeserializeOwned>(ctx: &CallContext, spec: RequestSpec) -> Result<T> {
    execute_json_with_retry(ctx, &with_method(spec, Method::Post)).await
}

pub async fn get_string(ctx: &CallContext, spec: RequestSpec) -> Result<String> {
    execute_string(ctx, &with_method(spec, Method::Get)).await
}

pub async fn get_string_retry(ctx: &CallContext, spec: RequestSpec) -> Result<String> {
    execute_string_with_retry(ctx, &with_method(spec, Method::Get)).await
}

pub async fn post_string(ctx: &CallContext, spec: RequestSpec) -> Result<String> {
    execute_string(ctx, &with_method(spec, Method::Post)).await
}

pub async fn post_string_retry(ctx: &CallContext, spec: RequestSpec) -> Result<String> {
    execute_string_with_retry(ctx, &with_method(spec, Method::Post)).await
}

fn with_method(mut spec: RequestSpec, method: Method) -> RequestSpec {
    spec.method = method;
    spec
}

async fn round_trip(ctx: &CallContext, spec: &RequestSpec, encoding: Encoding) -> Result<Vec<u8>> {
    let url = Url::parse(&spec.url)
        .map_err(|e| Error::new(Cause::InvalidRequest(format!("url '{}': {}", spec.url, e))))?;
    let body = encode_body(spec, encoding)?;
    let headers = build_headers(spec, body.is_some())?;

    if spec.log_mode.logs_input() {
        match &body {
            Some(body) => tracing::info!(
                method = ?spec.method,
                url = %spec.url,
                body = %String::from_utf8_lossy(body),
                "Outbound request"
            ),
            None => tracing::info!(method = ?spec.method, url = %spec.url, "Outbound request"),
        }
    }

    let fresh;
    let transport = match &spec.transport {
        Some(transport) => transport,
        None => {
            fresh = Transport::with_defaults().map_err(|e| Error::new(Cause::Transport(e)))?;
            &fresh
        }
    };

    let mut request = transport.client().request(spec.method.into(), url).headers(headers);
    if let Some(body) = body {
        request = request.body(body);
    }

    // Closures, not `Error::from` paths, so the trace points here.
    let response = ctx
        .run(request.send())
        .await
        .map_err(|interrupted| Error::from(interrupted))?
        .map_err(|e| Error::new(Cause::Transport(e)))?;

    let status = response.status();
    if status == StatusCode::SERVICE_UNAVAILABLE {
        return Err(Error::new(Cause::ServiceUnavailable));
    }
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        return Err(Error::new(Cause::Upstream {
            status: status.to_string(),
        }));
    }

    let bytes = ctx
        .run(response.bytes())
        .await
        .map_err(|interrupted| Error::from(interrupted))?
        .map_err(|e| Error::new(Cause::Transport(e)))?;

    if spec.log_mode.logs_output() {
        tracing::info!(
            url = %spec.url,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&bytes),
            "Upstream response"
        );
    }

    Ok(bytes.to_vec())
}

fn encode_body(spec: &RequestSpec, encoding: Encoding) -> Result<Option<Vec<u8>>> {
    if spec.method == Method::Get {
        return Ok(None);
    }

    let encoded = match (encoding, &spec.payload) {
        (Encoding::Json, Payload::Json(value)) => serde_json::to_vec(value),
        (Encoding::Json, Payload::Text(text)) => serde_json::to_vec(text),
        (Encoding::Json, Payload::Empty) => serde_json::to_vec(&serde_json::Value::Null),
        (Encoding::Text, Payload::Text(text)) => return Ok(Some(text.clone().into_bytes())),
        (Encoding::Text, other) => {
            return Err(Error::new(Cause::InputFormat(format!(
                "string request needs a text payload, got {}",
                other.describe()
            ))))
        }
    };

    encoded.map(Some).map_err(|e| Error::new(Cause::Encode(e)))
}

fn build_headers(spec: &RequestSpec, has_body: bool) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if has_body {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    for (name, value) in &spec.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::new(Cause::InvalidRequest(format!("header name '{}': {}", name, e))))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| Error::new(Cause::InvalidRequest(format!("header '{}' value: {}", name, e))))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}
