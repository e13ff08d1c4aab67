//! # Stripe REST Client
//!
//! Customers and PaymentIntents over Stripe's form-encoded REST API.
//! Every call is one-shot; retry policy belongs to the caller.

use crate::config::StripeConfig;
use async_trait::async_trait;
use pay_core::{
    Customer, CustomerDetails, NewPaymentIntent, PaymentError, PaymentIntent, PaymentProcessor,
    PaymentResult,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

const PROVIDER: &str = "stripe";

/// Stripe payment processor
pub struct StripeClient {
    config: StripeConfig,
    client: Client,
}

impl StripeClient {
    /// Create a new Stripe client
    pub fn new(config: StripeConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form_params: &[(String, String)],
    ) -> PaymentResult<T> {
        let request = self
            .authorized(self.client.post(self.url(path)))
            .header("Idempotency-Key", Uuid::new_v4().to_string())
            .form(form_params);
        self.execute(request).await
    }

    async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> PaymentResult<T> {
        let request = self.authorized(self.client.get(self.url(path))).query(query);
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> PaymentResult<T> {
        let response = request.send().await.map_err(connection_error)?;

        let status = response.status();
        let body = response.text().await.map_err(connection_error)?;

        if !status.is_success() {
            let err = classify_error(status, &body);
            error!("Stripe API error: status={}, category={}", status, err.code());
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            PaymentError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    #[instrument(skip(self, details))]
    async fn create_customer(&self, details: &CustomerDetails) -> PaymentResult<Customer> {
        let mut form_params = vec![("email".to_string(), details.email.clone())];
        if let Some(ref name) = details.name {
            form_params.push(("name".to_string(), name.clone()));
        }

        let customer: Customer = self.post_form("customers", &form_params).await?;
        info!("Created Stripe customer: id={}", customer.id);
        Ok(customer)
    }

    #[instrument(skip(self, email))]
    async fn find_customer_by_email(&self, email: &str) -> PaymentResult<Option<Customer>> {
        let list: StripeList<Customer> = self
            .get_query("customers", &[("email", email), ("limit", "1")])
            .await?;
        let found = list.data.into_iter().next();
        debug!("Customer lookup by email: found={}", found.is_some());
        Ok(found)
    }

    #[instrument(skip(self, intent), fields(amount = intent.amount, currency = %intent.currency))]
    async fn create_payment_intent(&self, intent: &NewPaymentIntent) -> PaymentResult<PaymentIntent> {
        let form_params = payment_intent_params(intent);

        debug!(
            "Creating Stripe payment intent: customer={}, methods={}",
            intent.customer_id,
            intent.payment_method_types.len()
        );

        let created: PaymentIntent = self.post_form("payment_intents", &form_params).await?;

        info!(
            "Created Stripe payment intent: id={}, status={:?}",
            created.id, created.status
        );

        Ok(created)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

/// Build form data for `POST /v1/payment_intents`
fn payment_intent_params(intent: &NewPaymentIntent) -> Vec<(String, String)> {
    let mut form_params: Vec<(String, String)> = vec![
        ("amount".to_string(), intent.amount.to_string()),
        ("currency".to_string(), intent.currency.as_str().to_string()),
        ("customer".to_string(), intent.customer_id.clone()),
    ];

    for (i, kind) in intent.payment_method_types.iter().enumerate() {
        form_params.push((format!("payment_method_types[{}]", i), kind.clone()));
    }

    // Card options are rejected by Stripe when card is not an accepted type
    if intent.payment_method_types.iter().any(|t| t == "card") {
        form_params.push((
            "payment_method_options[card][request_three_d_secure]".to_string(),
            intent.three_d_secure.as_str().to_string(),
        ));
    }

    let mut metadata: Vec<_> = intent.metadata.iter().collect();
    metadata.sort();
    for (key, value) in metadata {
        form_params.push((format!("metadata[{}]", key), value.clone()));
    }

    form_params
}

fn connection_error(err: reqwest::Error) -> PaymentError {
    PaymentError::ProcessorConnection {
        provider: PROVIDER.to_string(),
        message: err.to_string(),
    }
}

/// Map a failed Stripe response onto the error taxonomy.
///
/// The `error.type` field decides; the HTTP status is the fallback when the
/// body is not a Stripe error object.
pub fn classify_error(status: StatusCode, body: &str) -> PaymentError {
    let provider = PROVIDER.to_string();

    let Ok(StripeErrorResponse { error }) = serde_json::from_str::<StripeErrorResponse>(body) else {
        let message = format!("HTTP {}", status);
        return match status {
            StatusCode::UNAUTHORIZED => PaymentError::ProcessorAuthentication { provider, message },
            StatusCode::TOO_MANY_REQUESTS => PaymentError::ProcessorRateLimited { provider, message },
            s if s.is_server_error() => PaymentError::ProcessorApi { provider, message },
            _ => PaymentError::Processor { provider, message },
        };
    };

    let message = error
        .message
        .unwrap_or_else(|| format!("HTTP {}", status));

    match error.error_type.as_str() {
        "card_error" => PaymentError::Card {
            message,
            code: error.code,
            decline_code: error.decline_code,
        },
        "invalid_request_error" | "idempotency_error" => {
            PaymentError::ProcessorInvalidRequest { provider, message }
        }
        "api_error" => PaymentError::ProcessorApi { provider, message },
        "authentication_error" => PaymentError::ProcessorAuthentication { provider, message },
        "rate_limit_error" => PaymentError::ProcessorRateLimited { provider, message },
        _ if status == StatusCode::UNAUTHORIZED => {
            PaymentError::ProcessorAuthentication { provider, message }
        }
        _ if status.is_server_error() => PaymentError::ProcessorApi { provider, message },
        _ => PaymentError::Processor { provider, message },
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeList<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    #[serde(rename = "type", default)]
    error_type: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    decline_code: Option<String>,
}
