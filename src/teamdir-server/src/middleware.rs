//! HTTP middleware components.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Request ID header name.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Request timing header name.
pub const REQUEST_TIMING_HEADER: &str = "X-Response-Time";

/// Identifier of one webhook call, taken from the caller or generated.
///
/// Stored in request extensions so handlers can tag their spans with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    /// Reuse the caller's `X-Request-Id` when it is printable, else mint one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        Self(id)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tags the request with a [`RequestId`], stamps the id and elapsed time on
/// the response and logs the outcome.
pub async fn request_context_middleware(mut request: Request, next: Next) -> Response {
    let request_id = RequestId::from_headers(request.headers());
    request.extensions_mut().insert(request_id.clone());

    let started = Instant::now();
    let method = request.method().clone();
    // Path only: the query string may carry a token
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id.0) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed_ms:.2}ms")) {
        headers.insert(REQUEST_TIMING_HEADER, value);
    }

    log_completion(&request_id, &method, &path, response.status(), elapsed_ms);
    response
}

fn log_completion(
    request_id: &RequestId,
    method: &axum::http::Method,
    path: &str,
    status: StatusCode,
    elapsed_ms: f64,
) {
    let elapsed = format!("{elapsed_ms:.2}");
    if status.is_server_error() {
        error!(request_id = %request_id, %method, path, %status, duration_ms = %elapsed, "Webhook call failed");
    } else if status.is_client_error() {
        warn!(request_id = %request_id, %method, path, %status, duration_ms = %elapsed, "Webhook call rejected");
    } else {
        info!(request_id = %request_id, %method, path, %status, duration_ms = %elapsed, "Webhook call answered");
    }
}

/// Abandons requests that outlive `request_timeout`, answering 504.
pub async fn timeout_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let limit = state.config.request_timeout_duration();

    timeout(limit, next.run(request)).await.map_err(|_| {
        error!("Request timed out after {:?}", limit);
        AppError::Timeout
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_request_id_reuses_caller_header() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-42"));
        assert_eq!(RequestId::from_headers(&headers), RequestId("req-42".to_string()));
    }

    #[test]
    fn test_request_id_generated_when_missing_or_empty() {
        let generated = RequestId::from_headers(&HeaderMap::new());
        assert!(Uuid::parse_str(&generated.0).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(""));
        let generated = RequestId::from_headers(&headers);
        assert!(Uuid::parse_str(&generated.0).is_ok());
    }
}
