//! # pay-stripe
//!
//! Stripe implementation of the intent-gateway processor traits.
//!
//! 1. **StripeClient** - Customers and PaymentIntents REST calls
//!    - Form-encoded requests, one `Idempotency-Key` per call
//!    - Stripe error `type` mapped onto `PaymentError` categories
//!
//! 2. **StripeWebhookVerifier** - `Stripe-Signature` verification
//!    - HMAC-SHA256 over the raw body, 5 minute tolerance
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pay_stripe::StripeClient;
//! use pay_core::{NewPaymentIntent, PaymentProcessor};
//!
//! let client = StripeClient::from_env()?;
//! let customer = client.create_customer(&payment.customer).await?;
//! let intent = client
//!     .create_payment_intent(&NewPaymentIntent::for_customer(&payment, &customer))
//!     .await?;
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use pay_stripe::{dispatch_webhook_event, LoggingWebhookHandler, StripeWebhookVerifier};
//!
//! let verifier = StripeWebhookVerifier::new(webhook_secret);
//! let event = verifier.verify(&body, signature).await?;
//! dispatch_webhook_event(&LoggingWebhookHandler, &event)?;
//! ```

pub mod client;
pub mod config;
pub mod webhook;

// Re-exports
pub use client::StripeClient;
pub use config::StripeConfig;
pub use webhook::{
    compute_signature, dispatch_webhook_event, signature_header, LoggingWebhookHandler,
    StripeWebhookVerifier, WebhookHandler, REQUIRED_WEBHOOK_EVENTS,
};
