//! # Payment Types
//!
//! Request and result shapes for payment-intent creation.
//! Nothing here is persisted; every value lives for one request.

use crate::currency::Currency;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Incoming body of `POST /create-payment-intent`.
///
/// `amount`, `currency` and `email` are kept as raw JSON so presence and type
/// are decided by [`crate::validation::validate_payment_request`] rather than
/// by the deserializer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentRequest {
    /// Amount in minor currency units (must be a JSON integer)
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    /// Currency code
    #[serde(default)]
    pub currency: Option<serde_json::Value>,
    /// Customer email
    #[serde(default)]
    pub email: Option<serde_json::Value>,
    /// Customer display name
    #[serde(default)]
    pub name: Option<String>,
    /// 3-D Secure mode for card payments
    #[serde(default)]
    pub request_three_d_secure: Option<String>,
    /// Accepted payment-method types
    #[serde(default)]
    pub payment_method_types: Option<Vec<String>>,
}

/// Card 3-D Secure request mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreeDSecure {
    /// Let the processor decide
    Automatic,
    /// Request 3DS whenever the card supports it
    Any,
    /// Force a challenge flow
    Challenge,
}

impl ThreeDSecure {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreeDSecure::Automatic => "automatic",
            ThreeDSecure::Any => "any",
            ThreeDSecure::Challenge => "challenge",
        }
    }

    /// Parse a client-supplied mode, case-insensitively
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "automatic" => Some(ThreeDSecure::Automatic),
            "any" => Some(ThreeDSecure::Any),
            "challenge" => Some(ThreeDSecure::Challenge),
            _ => None,
        }
    }
}

impl Default for ThreeDSecure {
    fn default() -> Self {
        ThreeDSecure::Automatic
    }
}

/// Who is paying, as supplied by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub email: String,
    pub name: Option<String>,
}

/// A customer record at the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Processor's opaque id (cus_...)
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A payment request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayment {
    /// Amount in minor units, always > 0
    pub amount: i64,
    pub currency: Currency,
    pub customer: CustomerDetails,
    pub three_d_secure: ThreeDSecure,
    /// Never empty; defaults to `["card"]`
    pub payment_method_types: Vec<String>,
}

impl ValidatedPayment {
    /// Metadata echoed onto the payment intent
    pub fn metadata(&self) -> HashMap<String, String> {
        let mut metadata = HashMap::new();
        metadata.insert("email".to_string(), self.customer.email.clone());
        if let Some(name) = &self.customer.name {
            metadata.insert("name".to_string(), name.clone());
        }
        metadata
    }
}

/// Everything needed to create a payment intent for a resolved customer
#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    pub amount: i64,
    pub currency: Currency,
    pub customer_id: String,
    pub three_d_secure: ThreeDSecure,
    pub payment_method_types: Vec<String>,
    pub metadata: HashMap<String, String>,
}

impl NewPaymentIntent {
    /// Build the intent parameters for a validated payment and its customer
    pub fn for_customer(payment: &ValidatedPayment, customer: &Customer) -> Self {
        Self {
            amount: payment.amount,
            currency: payment.currency,
            customer_id: customer.id.clone(),
            three_d_secure: payment.three_d_secure,
            payment_method_types: payment.payment_method_types.clone(),
            metadata: payment.metadata(),
        }
    }
}

/// Lifecycle status reported by the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

/// A created payment intent.
///
/// `client_secret` is a single-use credential for the client; it is handed
/// back to the caller and must not be written to logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
}

impl std::fmt::Debug for PaymentIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentIntent")
            .field("id", &self.id)
            .field("client_secret", &"[REDACTED]")
            .field("amount", &self.amount)
            .field("currency", &self.currency)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validated(name: Option<&str>) -> ValidatedPayment {
        ValidatedPayment {
            amount: 1000,
            currency: Currency::USD,
            customer: CustomerDetails {
                email: "a@b.com".into(),
                name: name.map(String::from),
            },
            three_d_secure: ThreeDSecure::Automatic,
            payment_method_types: vec!["card".into()],
        }
    }

    #[test]
    fn test_three_d_secure_parse() {
        assert_eq!(ThreeDSecure::parse("ANY"), Some(ThreeDSecure::Any));
        assert_eq!(ThreeDSecure::parse("challenge"), Some(ThreeDSecure::Challenge));
        assert_eq!(ThreeDSecure::parse("always"), None);
        assert_eq!(ThreeDSecure::default().as_str(), "automatic");
    }

    #[test]
    fn test_metadata_echoes_customer() {
        let meta = validated(Some("Ada")).metadata();
        assert_eq!(meta.get("email").map(String::as_str), Some("a@b.com"));
        assert_eq!(meta.get("name").map(String::as_str), Some("Ada"));

        let meta = validated(None).metadata();
        assert!(!meta.contains_key("name"));
    }

    #[test]
    fn test_new_intent_for_customer() {
        let payment = validated(None);
        let customer = Customer {
            id: "cus_123".into(),
            email: Some("a@b.com".into()),
            name: None,
        };
        let intent = NewPaymentIntent::for_customer(&payment, &customer);
        assert_eq!(intent.customer_id, "cus_123");
        assert_eq!(intent.amount, 1000);
        assert_eq!(intent.payment_method_types, vec!["card".to_string()]);
    }

    #[test]
    fn test_unknown_status_deserializes() {
        let status: PaymentIntentStatus = serde_json::from_str("\"something_new\"").unwrap();
        assert_eq!(status, PaymentIntentStatus::Unknown);
    }

    #[test]
    fn test_debug_hides_client_secret() {
        let intent = PaymentIntent {
            id: "pi_1".into(),
            client_secret: "pi_1_secret_abc".into(),
            amount: 1000,
            currency: "usd".into(),
            status: PaymentIntentStatus::RequiresPaymentMethod,
        };
        let rendered = format!("{:?}", intent);
        assert!(!rendered.contains("secret_abc"));
        assert!(rendered.contains("pi_1"));
    }
}
