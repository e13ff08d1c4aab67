//! # Request Handlers
//!
//! Axum request handlers for the payment-intent API.

use crate::error::{ApiError, ApiErrorKind, ApiResult};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use pay_core::{
    mask_secret, validate_payment_request, NewPaymentIntent, PaymentError, PaymentIntentStatus,
    PaymentRequest,
};
use pay_stripe::dispatch_webhook_event;
use serde::Serialize;
use std::any::Any;
use tracing::{error, info, instrument, warn};

/// Name reported by the banner and health endpoints
pub const SERVICE_NAME: &str = "intent-gateway";

/// Header carrying Stripe's webhook signature
pub const SIGNATURE_HEADER: &str = "stripe-signature";

// =============================================================================
// Response Types
// =============================================================================

/// Publishable key response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeKeyResponse {
    pub publishable_key: String,
}

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub mode: &'static str,
    pub webhooks: bool,
    pub publishable_key: bool,
}

/// Created payment intent, as handed to the client
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentResponse {
    pub client_secret: String,
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
}

// =============================================================================
// Handlers
// =============================================================================

/// Service banner
pub async fn banner() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": SERVICE_NAME,
        "status": "running",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        mode: if state.live_mode { "live" } else { "test" },
        webhooks: state.webhooks.is_some(),
        publishable_key: state.publishable_key.is_some(),
    })
}

/// Publishable key for client-side payment sheets
pub async fn stripe_key(State(state): State<AppState>) -> ApiResult<Json<StripeKeyResponse>> {
    let key = state.publishable_key.as_deref().ok_or_else(|| {
        state.api_error(PaymentError::Configuration(
            "Stripe publishable key is not configured".to_string(),
        ))
    })?;

    info!("Serving publishable key {}", mask_secret(key));

    Ok(Json(StripeKeyResponse {
        publishable_key: key.to_string(),
    }))
}

/// Create a customer and a payment intent for them
#[instrument(skip(state, payload))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> ApiResult<Json<CreatePaymentIntentResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected malformed payment request: {}", rejection.body_text());
        state.api_error(ApiErrorKind::InvalidJson(rejection.body_text()))
    })?;

    let payment = validate_payment_request(&request).map_err(|e| {
        warn!(code = e.code(), "Rejected payment request: {}", e);
        state.api_error(e)
    })?;

    info!(
        "Creating payment intent: amount={}, currency={}, customer_strategy={}",
        payment.amount,
        payment.currency,
        state.customers.name()
    );

    let customer = state
        .customers
        .resolve(state.processor.as_ref(), &payment.customer)
        .await
        .map_err(|e| {
            error!(code = e.code(), "Failed to resolve customer: {}", e);
            state.api_error(e)
        })?;

    let intent = state
        .processor
        .create_payment_intent(&NewPaymentIntent::for_customer(&payment, &customer))
        .await
        .map_err(|e| {
            error!(code = e.code(), customer = %customer.id, "Failed to create payment intent: {}", e);
            state.api_error(e)
        })?;

    info!(
        intent_id = %intent.id,
        status = ?intent.status,
        customer = %customer.id,
        "Created payment intent"
    );

    Ok(Json(CreatePaymentIntentResponse {
        client_secret: intent.client_secret,
        id: intent.id,
        amount: intent.amount,
        currency: intent.currency,
        status: intent.status,
    }))
}

/// Handle Stripe webhook
#[instrument(skip(state, headers, body), fields(body_bytes = body.len()))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(verifier) = state.webhooks.as_ref() else {
        return state
            .api_error(PaymentError::Configuration(
                "Stripe webhook secret is not configured".to_string(),
            ))
            .into_response();
    };

    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        warn!("Webhook rejected: missing Stripe-Signature header");
        return webhook_rejection("Missing Stripe-Signature header");
    };

    let event = match verifier.verify(&body, signature).await {
        Ok(event) => event,
        Err(e) => {
            warn!("Webhook rejected: {}", e);
            let reason = match e {
                PaymentError::WebhookVerificationFailed(reason)
                | PaymentError::WebhookParseError(reason) => reason,
                other => other.to_string(),
            };
            return webhook_rejection(&reason);
        }
    };

    info!(
        event_id = %event.event_id,
        event_type = event.event_type.as_str(),
        livemode = event.livemode,
        "Received webhook"
    );

    if let Err(e) = dispatch_webhook_event(state.webhook_handler.as_ref(), &event) {
        error!(event_id = %event.event_id, "Webhook handler error: {}", e);
    }

    StatusCode::OK.into_response()
}

fn webhook_rejection(reason: &str) -> Response {
    (StatusCode::BAD_REQUEST, format!("Webhook Error: {}", reason)).into_response()
}

/// Fallback for unknown paths and unsupported methods
pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    info!(%method, path = uri.path(), "Route not found");
    ApiError::not_found(method.as_str(), uri.path())
}

/// Response for a handler that panicked; the payload is never echoed
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    ApiError::new(ApiErrorKind::Panic).into_response()
}
