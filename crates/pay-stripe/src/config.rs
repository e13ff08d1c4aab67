//! # Stripe Configuration
//!
//! Configuration management for Stripe integration.
//! All secrets are loaded from environment variables.

use pay_core::{mask_secret, PaymentError};
use std::env;

/// Default Stripe REST endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// API version pinned on every request
pub const API_VERSION: &str = "2024-12-18.acacia";

const SECRET_KEY_PREFIXES: &[&str] = &["sk_test_", "sk_live_", "rk_test_", "rk_live_"];

/// Stripe API configuration
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_test_... or sk_live_..., restricted rk_ keys allowed)
    pub secret_key: String,

    /// Publishable key (pk_test_... or pk_live_...), handed to clients
    pub publishable_key: Option<String>,

    /// Webhook signing secret (whsec_...)
    pub webhook_secret: Option<String>,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// API version
    pub api_version: String,
}

impl StripeConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `STRIPE_SECRET_KEY`
    ///
    /// Optional env vars (their absence disables one endpoint each):
    /// - `STRIPE_PUBLISHABLE_KEY`
    /// - `STRIPE_WEBHOOK_SECRET`
    /// - `STRIPE_API_BASE`
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PaymentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let secret_key = var("STRIPE_SECRET_KEY").ok_or_else(|| {
            PaymentError::Configuration("STRIPE_SECRET_KEY not set".to_string())
        })?;
        validate_secret_key(&secret_key)?;

        let mut config = Self::new(secret_key);
        config.publishable_key = var("STRIPE_PUBLISHABLE_KEY");
        config.webhook_secret = var("STRIPE_WEBHOOK_SECRET");
        if let Some(base) = var("STRIPE_API_BASE") {
            config.api_base_url = base;
        }

        Ok(config)
    }

    /// Create config with only a secret key (for testing)
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            publishable_key: None,
            webhook_secret: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_version: API_VERSION.to_string(),
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.secret_key.starts_with("sk_test_") || self.secret_key.starts_with("rk_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.secret_key.starts_with("sk_live_") || self.secret_key.starts_with("rk_live_")
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.secret_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set publishable key
    pub fn with_publishable_key(mut self, key: impl Into<String>) -> Self {
        self.publishable_key = Some(key.into());
        self
    }

    /// Builder: set webhook signing secret
    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.webhook_secret = Some(secret.into());
        self
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &mask_secret(&self.secret_key))
            .field("publishable_key", &self.publishable_key.as_deref().map(mask_secret))
            .field("webhook_secret", &self.webhook_secret.as_deref().map(mask_secret))
            .field("api_base_url", &self.api_base_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Reject secret keys that are not recognisably Stripe keys
pub fn validate_secret_key(secret_key: &str) -> Result<(), PaymentError> {
    if SECRET_KEY_PREFIXES.iter().any(|p| secret_key.starts_with(p)) {
        Ok(())
    } else {
        Err(PaymentError::Configuration(
            "STRIPE_SECRET_KEY must start with sk_test_, sk_live_, rk_test_ or rk_live_"
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_detection() {
        let config = StripeConfig::new("sk_test_abc123");
        assert!(config.is_test_mode());
        assert!(!config.is_live_mode());

        let config = StripeConfig::new("rk_live_abc123");
        assert!(!config.is_test_mode());
        assert!(config.is_live_mode());
    }

    #[test]
    fn test_secret_key_prefix_validation() {
        assert!(validate_secret_key("sk_test_abc").is_ok());
        assert!(validate_secret_key("sk_live_abc").is_ok());
        assert!(validate_secret_key("rk_test_abc").is_ok());
        assert!(validate_secret_key("pk_test_abc").is_err());
        assert!(validate_secret_key("").is_err());
        assert!(validate_secret_key("secret").is_err());
    }

    #[test]
    fn test_auth_header() {
        let config = StripeConfig::new("sk_test_abc123");
        assert_eq!(config.auth_header(), "Bearer sk_test_abc123");
    }

    #[test]
    fn test_debug_masks_secrets() {
        let config = StripeConfig::new("sk_test_abc123")
            .with_publishable_key("pk_test_xyz789")
            .with_webhook_secret("whsec_topsecret");
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("abc123"));
        assert!(!rendered.contains("xyz789"));
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("sk_test_"));
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_from_lookup_requires_secret_key() {
        let err = StripeConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: STRIPE_SECRET_KEY not set");

        let err = StripeConfig::from_lookup(lookup(&[("STRIPE_SECRET_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, PaymentError::Configuration(_)));
    }

    #[test]
    fn test_from_lookup_rejects_non_secret_keys() {
        for key in ["pk_test_abc", "whsec_abc", "abc"] {
            let err = StripeConfig::from_lookup(lookup(&[("STRIPE_SECRET_KEY", key)])).unwrap_err();
            assert!(err.to_string().contains("must start with sk_test_"), "{key}");
        }
    }

    #[test]
    fn test_from_lookup_reads_optional_keys() {
        let config = StripeConfig::from_lookup(lookup(&[
            ("STRIPE_SECRET_KEY", " sk_test_abc "),
            ("STRIPE_PUBLISHABLE_KEY", "pk_test_xyz"),
            ("STRIPE_WEBHOOK_SECRET", ""),
            ("STRIPE_API_BASE", "http://127.0.0.1:12111"),
        ]))
        .unwrap();

        assert_eq!(config.secret_key, "sk_test_abc");
        assert_eq!(config.publishable_key.as_deref(), Some("pk_test_xyz"));
        assert!(config.webhook_secret.is_none());
        assert_eq!(config.api_base_url, "http://127.0.0.1:12111");
    }

    #[test]
    fn test_optional_keys_default_to_unset() {
        let config = StripeConfig::new("sk_test_abc123");
        assert!(config.publishable_key.is_none());
        assert!(config.webhook_secret.is_none());
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }
}
