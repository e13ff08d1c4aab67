//! # Payment Error Types
//!
//! Typed error handling for the intent-gateway payment service.
//! All payment operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// One or more required request fields are absent
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// Amount is not a positive integer in minor units
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    /// Currency not in the allow-list
    #[error("Unsupported currency: {currency}")]
    UnsupportedCurrency { currency: String },

    /// Email does not look like an address
    #[error("Invalid email address")]
    InvalidEmail,

    /// Any other request field with a bad value
    #[error("Invalid value for {field}: {message}")]
    InvalidField { field: String, message: String },

    /// The card was declined or could not be charged
    #[error("Card error: {message}")]
    Card {
        message: String,
        code: Option<String>,
        decline_code: Option<String>,
    },

    /// The processor rejected our request as malformed
    #[error("Invalid request to {provider}: {message}")]
    ProcessorInvalidRequest { provider: String, message: String },

    /// The processor itself failed
    #[error("{provider} API error: {message}")]
    ProcessorApi { provider: String, message: String },

    /// Network/HTTP error communicating with the processor
    #[error("Could not reach {provider}: {message}")]
    ProcessorConnection { provider: String, message: String },

    /// Processor rejected our credentials
    #[error("Authentication with {provider} failed: {message}")]
    ProcessorAuthentication { provider: String, message: String },

    /// Rate limited by the processor
    #[error("Rate limited by {provider}: {message}")]
    ProcessorRateLimited { provider: String, message: String },

    /// Processor error we could not classify
    #[error("{provider} error: {message}")]
    Processor { provider: String, message: String },

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Returns true for failures of the caller's input (never the processor's)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PaymentError::MissingFields(_)
                | PaymentError::InvalidAmount { .. }
                | PaymentError::UnsupportedCurrency { .. }
                | PaymentError::InvalidEmail
                | PaymentError::InvalidField { .. }
        )
    }

    /// Returns true when the detail message may leak internals and should be
    /// hidden outside development
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            PaymentError::Configuration(_)
                | PaymentError::Processor { .. }
                | PaymentError::Serialization(_)
                | PaymentError::Internal(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::MissingFields(_) => 400,
            PaymentError::InvalidAmount { .. } => 400,
            PaymentError::UnsupportedCurrency { .. } => 400,
            PaymentError::InvalidEmail => 400,
            PaymentError::InvalidField { .. } => 400,
            PaymentError::Card { .. } => 402,
            PaymentError::ProcessorInvalidRequest { .. } => 400,
            PaymentError::ProcessorApi { .. } => 502,
            PaymentError::ProcessorConnection { .. } => 503,
            PaymentError::ProcessorAuthentication { .. } => 401,
            PaymentError::ProcessorRateLimited { .. } => 429,
            PaymentError::Processor { .. } => 500,
            PaymentError::WebhookVerificationFailed(_) => 400,
            PaymentError::WebhookParseError(_) => 400,
            PaymentError::Serialization(_) => 500,
            PaymentError::Internal(_) => 500,
        }
    }

    /// Machine-readable error code for response bodies
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::Configuration(_) => "server_configuration",
            PaymentError::MissingFields(_) => "missing_fields",
            PaymentError::InvalidAmount { .. } => "invalid_amount",
            PaymentError::UnsupportedCurrency { .. } => "unsupported_currency",
            PaymentError::InvalidEmail => "invalid_email",
            PaymentError::InvalidField { .. } => "invalid_field",
            PaymentError::Card { .. } => "card_error",
            PaymentError::ProcessorInvalidRequest { .. } => "processor_invalid_request",
            PaymentError::ProcessorApi { .. } => "processor_api_error",
            PaymentError::ProcessorConnection { .. } => "processor_connection_error",
            PaymentError::ProcessorAuthentication { .. } => "processor_authentication_error",
            PaymentError::ProcessorRateLimited { .. } => "processor_rate_limited",
            PaymentError::Processor { .. } => "processor_error",
            PaymentError::WebhookVerificationFailed(_) => "webhook_verification_failed",
            PaymentError::WebhookParseError(_) => "webhook_parse_error",
            PaymentError::Serialization(_) => "serialization_error",
            PaymentError::Internal(_) => "internal_error",
        }
    }

    /// Field names this error is about, if any
    pub fn fields(&self) -> Vec<&str> {
        match self {
            PaymentError::MissingFields(fields) => fields.iter().map(String::as_str).collect(),
            PaymentError::InvalidAmount { .. } => vec!["amount"],
            PaymentError::UnsupportedCurrency { .. } => vec!["currency"],
            PaymentError::InvalidEmail => vec!["email"],
            PaymentError::InvalidField { field, .. } => vec![field.as_str()],
            _ => Vec::new(),
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_error(kind: fn(String, String) -> PaymentError) -> PaymentError {
        kind("stripe".into(), "boom".into())
    }

    #[test]
    fn test_missing_fields_message() {
        let err = PaymentError::MissingFields(vec!["amount".into(), "email".into()]);
        assert_eq!(err.to_string(), "Missing required fields: amount, email");
        assert_eq!(err.fields(), vec!["amount", "email"]);
        assert!(err.is_validation());
    }

    #[test]
    fn test_validation_status_codes() {
        assert_eq!(PaymentError::InvalidEmail.status_code(), 400);
        assert_eq!(
            PaymentError::InvalidAmount {
                message: "must be positive".into()
            }
            .status_code(),
            400
        );
        assert_eq!(
            PaymentError::UnsupportedCurrency {
                currency: "xyz".into()
            }
            .status_code(),
            400
        );
    }

    #[test]
    fn test_processor_categories_are_distinct() {
        let errors = [
            PaymentError::Card {
                message: "declined".into(),
                code: None,
                decline_code: None,
            },
            provider_error(|provider, message| PaymentError::ProcessorInvalidRequest {
                provider,
                message,
            }),
            provider_error(|provider, message| PaymentError::ProcessorApi { provider, message }),
            provider_error(|provider, message| PaymentError::ProcessorConnection {
                provider,
                message,
            }),
            provider_error(|provider, message| PaymentError::ProcessorAuthentication {
                provider,
                message,
            }),
            provider_error(|provider, message| PaymentError::ProcessorRateLimited {
                provider,
                message,
            }),
            provider_error(|provider, message| PaymentError::Processor { provider, message }),
        ];

        let mut codes: Vec<u16> = errors.iter().map(PaymentError::status_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(errors.iter().all(|e| !e.is_validation()));
    }

    #[test]
    fn test_internal_errors_are_flagged() {
        assert!(PaymentError::Internal("x".into()).is_internal());
        assert!(!PaymentError::InvalidEmail.is_internal());
    }
}
