//! # Webhook Events
//!
//! Provider-neutral view of a verified webhook notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Webhook event types we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// payment_intent.succeeded
    PaymentSucceeded,
    /// payment_intent.payment_failed
    PaymentFailed,
    /// payment_intent.created
    PaymentIntentCreated,
    /// Anything else (accepted, not handled)
    Unknown(String),
}

impl WebhookEventType {
    /// Map a Stripe event `type` tag
    pub fn from_stripe(tag: &str) -> Self {
        match tag {
            "payment_intent.succeeded" => WebhookEventType::PaymentSucceeded,
            "payment_intent.payment_failed" => WebhookEventType::PaymentFailed,
            "payment_intent.created" => WebhookEventType::PaymentIntentCreated,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    /// The provider tag this type was parsed from
    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::PaymentSucceeded => "payment_intent.succeeded",
            WebhookEventType::PaymentFailed => "payment_intent.payment_failed",
            WebhookEventType::PaymentIntentCreated => "payment_intent.created",
            WebhookEventType::Unknown(tag) => tag,
        }
    }
}

/// A verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider (evt_...)
    pub event_id: String,

    /// Event type
    pub event_type: WebhookEventType,

    /// Whether the event came from live mode
    #[serde(default)]
    pub livemode: bool,

    /// The nested `data.object` payload
    pub object: serde_json::Map<String, serde_json::Value>,

    /// When the provider created the event
    pub created: DateTime<Utc>,
}

impl WebhookEvent {
    /// `id` of the nested object (pi_... for payment-intent events)
    pub fn object_id(&self) -> Option<&str> {
        self.object.get("id").and_then(|v| v.as_str())
    }

    /// Amount on the nested object, in minor units
    pub fn amount(&self) -> Option<i64> {
        self.object.get("amount").and_then(|v| v.as_i64())
    }

    /// Currency on the nested object
    pub fn currency(&self) -> Option<&str> {
        self.object.get("currency").and_then(|v| v.as_str())
    }

    /// Human-readable reason the last payment attempt failed
    pub fn failure_message(&self) -> Option<&str> {
        self.object
            .get("last_payment_error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
    }
}
