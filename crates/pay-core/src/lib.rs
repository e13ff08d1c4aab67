//! # pay-core
//!
//! Core types and traits for the intent-gateway payment service.
//!
//! This crate provides:
//! - `PaymentRequest` validation into a `ValidatedPayment`
//! - `PaymentProcessor`, `CustomerStrategy` and `WebhookVerifier` traits
//! - `PaymentIntent`, `Customer` and `WebhookEvent` result types
//! - `LogRedactor` for allow-list based request logging
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pay_core::{validate_payment_request, NewPaymentIntent, PaymentRequest};
//!
//! let payment = validate_payment_request(&request)?;
//! let customer = strategy.resolve(processor.as_ref(), &payment.customer).await?;
//! let intent = processor
//!     .create_payment_intent(&NewPaymentIntent::for_customer(&payment, &customer))
//!     .await?;
//!
//! // Hand intent.client_secret back to the client
//! ```

pub mod currency;
pub mod error;
pub mod payment;
pub mod redact;
pub mod strategy;
pub mod validation;
pub mod webhook;

// Re-exports for convenience
pub use currency::Currency;
pub use error::{PaymentError, PaymentResult};
pub use payment::{
    Customer, CustomerDetails, NewPaymentIntent, PaymentIntent, PaymentIntentStatus,
    PaymentRequest, ThreeDSecure, ValidatedPayment,
};
pub use redact::{mask_secret, LogRedactor, DEFAULT_LOG_FIELDS, REDACTED};
pub use strategy::{
    BoxedCustomerStrategy, BoxedPaymentProcessor, CreateCustomerStrategy, CustomerStrategy,
    CustomerStrategyKind, LookupOrCreateStrategy, PaymentProcessor, WebhookVerifier,
};
pub use validation::{is_valid_email, validate_payment_request};
pub use webhook::{WebhookEvent, WebhookEventType};
