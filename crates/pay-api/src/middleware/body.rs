//! Request body capture.
//!
//! Buffers JSON bodies so they can be logged through the [`LogRedactor`],
//! then hands the same bytes on to the handler. The webhook route is
//! skipped entirely: its signature covers the raw bytes.

use crate::error::{ApiError, ApiErrorKind};
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use pay_core::LogRedactor;
use std::sync::Arc;
use tracing::{info, warn};

/// Largest body buffered for logging
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Route whose body must reach the handler untouched
pub const WEBHOOK_PATH: &str = "/webhook";

pub async fn capture_body(
    State(redactor): State<Arc<LogRedactor>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    if path == WEBHOOK_PATH {
        info!(%method, %path, "Incoming request (raw body)");
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(%method, %path, "Failed to buffer request body: {}", e);
            return ApiError::new(ApiErrorKind::PayloadTooLarge).into_response();
        }
    };

    if bytes.is_empty() {
        info!(%method, %path, "Incoming request");
    } else {
        match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(json) => {
                info!(%method, %path, body = %redactor.redact(&json), "Incoming request");
            }
            Err(_) => {
                info!(%method, %path, body_bytes = bytes.len(), "Incoming request (non-JSON body)");
            }
        }
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
