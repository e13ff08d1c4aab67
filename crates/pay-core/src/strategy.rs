//! # Processor and Customer Strategies
//!
//! Seams between the HTTP layer and the payment processor.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │            PaymentProcessor (trait)           │
//! │  ├── create_customer()                        │
//! │  ├── find_customer_by_email()                 │
//! │  ├── create_payment_intent()                  │
//! │  └── provider_name()                          │
//! └───────────────────────────────────────────────┘
//!                        ▲ used by
//! ┌───────────────────────────────────────────────┐
//! │            CustomerStrategy (trait)           │
//! │  ├── CreateCustomerStrategy   (always create) │
//! │  └── LookupOrCreateStrategy   (reuse by email)│
//! └───────────────────────────────────────────────┘
//! ```

use crate::error::{PaymentError, PaymentResult};
use crate::payment::{Customer, CustomerDetails, NewPaymentIntent, PaymentIntent};
use crate::webhook::WebhookEvent;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Outbound operations against a payment processor.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create a new customer record.
    async fn create_customer(&self, details: &CustomerDetails) -> PaymentResult<Customer>;

    /// Find an existing customer by email, newest first.
    async fn find_customer_by_email(&self, email: &str) -> PaymentResult<Option<Customer>>;

    /// Create a payment intent for an existing customer.
    async fn create_payment_intent(&self, intent: &NewPaymentIntent) -> PaymentResult<PaymentIntent>;

    /// Get the provider name (for logging and error messages).
    fn provider_name(&self) -> &'static str;
}

/// Verifies a signed webhook body and parses it.
#[async_trait]
pub trait WebhookVerifier: Send + Sync {
    /// # Arguments
    /// * `payload` - Raw, unparsed request body
    /// * `signature` - Signature header value
    async fn verify(&self, payload: &[u8], signature: &str) -> PaymentResult<WebhookEvent>;
}

/// Decides which customer record a payment is created under.
#[async_trait]
pub trait CustomerStrategy: Send + Sync {
    async fn resolve(
        &self,
        processor: &dyn PaymentProcessor,
        details: &CustomerDetails,
    ) -> PaymentResult<Customer>;

    fn name(&self) -> &'static str;
}

/// Type alias for a shared processor (dynamic dispatch)
pub type BoxedPaymentProcessor = Arc<dyn PaymentProcessor>;

/// Type alias for a shared customer strategy
pub type BoxedCustomerStrategy = Arc<dyn CustomerStrategy>;

/// Creates a fresh customer for every payment.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateCustomerStrategy;

#[async_trait]
impl CustomerStrategy for CreateCustomerStrategy {
    async fn resolve(
        &self,
        processor: &dyn PaymentProcessor,
        details: &CustomerDetails,
    ) -> PaymentResult<Customer> {
        processor.create_customer(details).await
    }

    fn name(&self) -> &'static str {
        "create"
    }
}

/// Reuses the newest customer with the same email, creating one if none exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookupOrCreateStrategy;

#[async_trait]
impl CustomerStrategy for LookupOrCreateStrategy {
    async fn resolve(
        &self,
        processor: &dyn PaymentProcessor,
        details: &CustomerDetails,
    ) -> PaymentResult<Customer> {
        if let Some(existing) = processor.find_customer_by_email(&details.email).await? {
            debug!("Reusing customer {}", existing.id);
            return Ok(existing);
        }
        processor.create_customer(details).await
    }

    fn name(&self) -> &'static str {
        "lookup"
    }
}

/// Configured choice of customer strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CustomerStrategyKind {
    #[default]
    Create,
    Lookup,
}

impl CustomerStrategyKind {
    /// Build the strategy this kind names
    pub fn build(self) -> BoxedCustomerStrategy {
        match self {
            CustomerStrategyKind::Create => Arc::new(CreateCustomerStrategy),
            CustomerStrategyKind::Lookup => Arc::new(LookupOrCreateStrategy),
        }
    }
}

impl FromStr for CustomerStrategyKind {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(CustomerStrategyKind::Create),
            "lookup" | "lookup_or_create" => Ok(CustomerStrategyKind::Lookup),
            other => Err(PaymentError::Configuration(format!(
                "Unknown customer strategy: {} (expected create or lookup)",
                other
            ))),
        }
    }
}
