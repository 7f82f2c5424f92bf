//! Request handlers.
//!
//! The webhook handler reads the raw body itself rather than using the `Form`
//! extractor: debug output needs the decoded fields in arrival order, and an
//! unreadable body must answer 404 instead of axum's 415/422.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{header, request::Parts},
};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use teamdir_slack::{InboundRequest, ReplyPayload, SearchQuery};
use tracing::{Instrument, debug, info_span, warn};

use crate::error::{AppError, AppResult};
use crate::middleware::RequestId;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version().to_string(),
        uptime_seconds: state.uptime().as_secs(),
    })
}

/// Slack slash command / outgoing webhook endpoint.
pub async fn slack_webhook(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> AppResult<Json<ReplyPayload>> {
    let (parts, body) = request.into_parts();
    let request_id = parts
        .extensions
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let max_body_size = state.config.max_body_size;

    let content_length = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    if content_length.is_some_and(|len| len > max_body_size as u64) {
        warn!("Rejecting webhook body of {:?} bytes", content_length);
        return Err(AppError::PayloadTooLarge);
    }

    let bytes = axum::body::to_bytes(body, max_body_size)
        .await
        .map_err(|e| {
            warn!("Failed to read webhook body: {}", e);
            AppError::MalformedRequest(format!("failed to read body: {}", e))
        })?;

    let form = parse_form(&bytes)?;
    debug!("Parsed {} form fields", form.len());

    let query = SearchQuery::from_form(&form);
    let inbound = inbound_request(&parts, content_length, form);

    let reply = state
        .search
        .handle(&query, &inbound)
        .instrument(info_span!("directory_search", request_id = %request_id))
        .await;
    Ok(Json(reply.into_payload()))
}

/// Fallback for unknown routes.
pub async fn not_found(request: Request) -> AppError {
    AppError::NotFound(request.uri().path().to_string())
}

/// Decode a form-encoded body, keeping repeated keys and their order.
///
/// Decoding is strict: a `%` must start a two-digit hex escape, and the
/// decoded bytes of every key and value must be UTF-8.
pub fn parse_form(body: &[u8]) -> AppResult<Vec<(String, String)>> {
    let body = std::str::from_utf8(body).map_err(|e| {
        warn!("Webhook body is not valid UTF-8: {}", e);
        AppError::MalformedRequest(format!("body is not valid UTF-8: {}", e))
    })?;

    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> AppResult<(String, String)> {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            Ok((decode_component(key)?, decode_component(value)?))
        })
        .collect()
}

fn decode_component(raw: &str) -> AppResult<String> {
    let mut rest = raw.as_bytes();
    while let Some(pos) = rest.iter().position(|&b| b == b'%') {
        let escape = rest.get(pos + 1..pos + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            warn!("Webhook body has a malformed percent escape");
            return Err(AppError::MalformedRequest(
                "malformed percent escape in form body".to_string(),
            ));
        }
        rest = &rest[pos + 3..];
    }

    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| {
            warn!("Webhook form field does not decode to UTF-8: {}", e);
            AppError::MalformedRequest(format!("form field is not valid UTF-8: {}", e))
        })
}

fn inbound_request(
    parts: &Parts,
    content_length: Option<u64>,
    form: Vec<(String, String)>,
) -> InboundRequest {
    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_default();

    let remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();

    let headers = parts
        .headers
        .iter()
        .map(|(name, value)| {
            let value = value.to_str().unwrap_or("<non-ascii>");
            (name.as_str().to_string(), value.to_string())
        })
        .collect();

    InboundRequest {
        method: parts.method.to_string(),
        host,
        url: parts.uri.to_string(),
        protocol: format!("{:?}", parts.version),
        remote_addr,
        content_length,
        headers,
        form,
    }
}
