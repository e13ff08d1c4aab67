//! Origin allow-list.
//!
//! Browsers send `Origin` on cross-site requests; anything not on the
//! allow-list is refused before routing. Requests without the header
//! (curl, Stripe's webhook delivery) pass through.

use crate::state::AppConfig;
use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, ORIGIN},
        HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

/// Plaintext body of the 403 returned to disallowed origins
pub const CORS_REJECTION: &str = "Not allowed by CORS";

/// Reject requests whose `Origin` is not allow-listed
pub async fn origin_gate(
    State(config): State<Arc<AppConfig>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(ORIGIN) {
        let allowed = origin
            .to_str()
            .map(|o| config.is_origin_allowed(o))
            .unwrap_or(false);

        if !allowed {
            warn!(
                origin = ?origin,
                method = %request.method(),
                path = %request.uri().path(),
                "Rejected request from disallowed origin"
            );
            return (StatusCode::FORBIDDEN, CORS_REJECTION).into_response();
        }
    }

    next.run(request).await
}

/// CORS headers for allow-listed origins
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid allowed origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
