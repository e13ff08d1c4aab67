//! # Stripe Webhook Handling
//!
//! Signature verification over the raw request body, and dispatch of the
//! verified event to a [`WebhookHandler`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use pay_core::{PaymentError, PaymentResult, WebhookEvent, WebhookEventType, WebhookVerifier};
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, info, instrument, warn};

type HmacSha256 = Hmac<Sha256>;

/// Maximum distance between the signed timestamp and now (5 minutes)
pub const TIMESTAMP_TOLERANCE_SECS: u64 = 300;

/// Verifies `Stripe-Signature` headers with the endpoint's signing secret
pub struct StripeWebhookVerifier {
    secret: String,
    tolerance_secs: u64,
}

impl StripeWebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs: TIMESTAMP_TOLERANCE_SECS,
        }
    }

    /// Builder: override the timestamp tolerance
    pub fn with_tolerance(mut self, secs: u64) -> Self {
        self.tolerance_secs = secs;
        self
    }

    /// Verify the signature and parse the event, checking against `now`.
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature: &str,
        now: DateTime<Utc>,
    ) -> PaymentResult<WebhookEvent> {
        let header = SignatureHeader::parse(signature)?;

        if now.timestamp().abs_diff(header.timestamp) > self.tolerance_secs {
            return Err(PaymentError::WebhookVerificationFailed(
                "Timestamp outside tolerance".to_string(),
            ));
        }

        let valid = header.signatures.iter().any(|sig| {
            let mut mac = self.mac();
            mac.update(header.timestamp.to_string().as_bytes());
            mac.update(b".");
            mac.update(payload);
            mac.verify_slice(sig).is_ok()
        });

        if !valid {
            return Err(PaymentError::WebhookVerificationFailed(
                "No signatures found matching the expected signature for payload".to_string(),
            ));
        }

        parse_event(payload)
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length
        match HmacSha256::new_from_slice(self.secret.as_bytes()) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC-SHA256 accepts keys of any size"),
        }
    }
}

#[async_trait]
impl WebhookVerifier for StripeWebhookVerifier {
    #[instrument(skip(self, payload, signature), fields(bytes = payload.len()))]
    async fn verify(&self, payload: &[u8], signature: &str) -> PaymentResult<WebhookEvent> {
        self.verify_at(payload, signature, Utc::now())
    }
}

/// Hex HMAC-SHA256 of `"{timestamp}." ++ payload`, as Stripe computes `v1`.
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts keys of any size"),
    };
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Build a complete `Stripe-Signature` header value for a payload.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!("t={},v1={}", timestamp, compute_signature(secret, timestamp, payload))
}

// =============================================================================
// Signature header parsing
// =============================================================================

#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    /// Decoded v1 signatures; undecodable entries are dropped
    signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Format: `t=<timestamp>,v1=<hex>[,v1=<hex>][,v0=<legacy>]`
    fn parse(header: &str) -> PaymentResult<Self> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => timestamp = value.parse().ok(),
                "v1" => {
                    if let Ok(sig) = hex::decode(value) {
                        signatures.push(sig);
                    }
                }
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            PaymentError::WebhookVerificationFailed(
                "Unable to extract timestamp and signatures from header".to_string(),
            )
        })?;

        if signatures.is_empty() {
            return Err(PaymentError::WebhookVerificationFailed(
                "No signatures found with expected scheme".to_string(),
            ));
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

// =============================================================================
// Event parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    #[serde(default)]
    livemode: bool,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

fn parse_event(payload: &[u8]) -> PaymentResult<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload).map_err(|e| {
        PaymentError::WebhookParseError(format!("Failed to parse webhook: {}", e))
    })?;

    debug!("Verified Stripe webhook: type={}", event.event_type);

    Ok(WebhookEvent {
        event_id: event.id,
        event_type: WebhookEventType::from_stripe(&event.event_type),
        livemode: event.livemode,
        object: event.data.object,
        created: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
    })
}

// =============================================================================
// Dispatch
// =============================================================================

/// Webhook event handler trait
///
/// Implement this trait to react to payment events. The defaults only log.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// payment_intent.succeeded
    fn on_payment_succeeded(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!(
            "Payment succeeded: intent={}, amount={:?}, currency={:?}",
            event.object_id().unwrap_or("unknown"),
            event.amount(),
            event.currency()
        );
        Ok(())
    }

    /// payment_intent.payment_failed
    fn on_payment_failed(&self, event: &WebhookEvent) -> PaymentResult<()> {
        warn!(
            "Payment failed: intent={}, reason={}",
            event.object_id().unwrap_or("unknown"),
            event.failure_message().unwrap_or("unknown")
        );
        Ok(())
    }

    /// payment_intent.created
    fn on_payment_intent_created(&self, event: &WebhookEvent) -> PaymentResult<()> {
        info!(
            "Payment intent created: intent={}",
            event.object_id().unwrap_or("unknown")
        );
        Ok(())
    }

    /// Any other event type
    fn on_unknown_event(&self, event: &WebhookEvent) -> PaymentResult<()> {
        debug!("Unhandled webhook event: {}", event.event_type.as_str());
        Ok(())
    }
}

/// Default webhook handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(handler: &dyn WebhookHandler, event: &WebhookEvent) -> PaymentResult<()> {
    match &event.event_type {
        WebhookEventType::PaymentSucceeded => handler.on_payment_succeeded(event),
        WebhookEventType::PaymentFailed => handler.on_payment_failed(event),
        WebhookEventType::PaymentIntentCreated => handler.on_payment_intent_created(event),
        WebhookEventType::Unknown(_) => handler.on_unknown_event(event),
    }
}

/// Events that should be enabled on the Stripe webhook endpoint
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "payment_intent.created",
    "payment_intent.succeeded",
    "payment_intent.payment_failed",
];
