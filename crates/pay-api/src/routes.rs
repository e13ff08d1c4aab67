//! # Routes
//!
//! Axum router configuration for the payment-intent API.

use crate::handlers;
use crate::middleware::{capture_body, cors_layer, origin_gate, WEBHOOK_PATH};
use crate::state::AppState;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Create the main application router
///
/// Routes:
/// - GET  /                       - Service banner
/// - GET  /health                 - Health check
/// - GET  /stripe-key             - Publishable key for clients
/// - POST /create-payment-intent  - Create customer + payment intent
/// - POST /webhook                - Stripe webhook handler (raw body)
///
/// Anything else, including a known path with the wrong method, gets the
/// JSON 404 from [`handlers::not_found`].
pub fn create_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(state.config.clone(), origin_gate))
        .layer(cors_layer(&state.config))
        .layer(from_fn_with_state(state.redactor.clone(), capture_body))
        .layer(CatchPanicLayer::custom(handlers::panic_response));

    Router::new()
        .route("/", get(handlers::banner))
        .route("/health", get(handlers::health))
        .route("/stripe-key", get(handlers::stripe_key))
        .route("/create-payment-intent", post(handlers::create_payment_intent))
        .route(WEBHOOK_PATH, post(handlers::stripe_webhook))
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .layer(middleware)
        .with_state(state)
}
