//! # Application State
//!
//! Shared state for the Axum application.
//! Everything here is built once at startup and never mutated.

use pay_core::{
    BoxedCustomerStrategy, BoxedPaymentProcessor, CustomerStrategyKind, LogRedactor,
    PaymentError, PaymentResult, WebhookVerifier, DEFAULT_LOG_FIELDS,
};
use pay_stripe::{LoggingWebhookHandler, StripeClient, StripeConfig, StripeWebhookVerifier, WebhookHandler};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ApiError;

/// Origins allowed when no service config file overrides them
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
];

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Browser origins allowed to call the API
    pub allowed_origins: Vec<String>,
    /// Request-body fields that may appear in logs unredacted
    pub log_fields: Vec<String>,
    /// How customers are resolved for each payment
    pub customer_strategy: CustomerStrategyKind,
}

/// Optional `config/service.toml` contents
#[derive(Debug, Default, Deserialize)]
struct ServiceFile {
    #[serde(default)]
    allowed_origins: Option<Vec<String>>,
    #[serde(default)]
    log_fields: Option<Vec<String>>,
}

impl AppConfig {
    /// Load from environment variables and the optional service config file
    pub fn from_env() -> PaymentResult<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::from_lookup(|name| std::env::var(name).ok())?;

        let explicit = std::env::var("SERVICE_CONFIG").ok().map(PathBuf::from);
        if let Some((path, content)) = read_service_file(explicit.as_deref())? {
            config = config.with_service_toml(&content).map_err(|e| {
                PaymentError::Configuration(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            info!("Loaded service config from {}", path.display());
        }

        Ok(config)
    }

    /// Apply `HOST`, `PORT`, `ENVIRONMENT` and `CUSTOMER_STRATEGY` from `lookup`
    pub fn from_lookup<F>(lookup: F) -> PaymentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .map_err(|_| PaymentError::Configuration(format!("Invalid PORT: {}", port)))?;
        }
        if let Some(environment) = lookup("ENVIRONMENT") {
            config.environment = environment;
        }
        if let Some(strategy) = lookup("CUSTOMER_STRATEGY") {
            config.customer_strategy = strategy.parse()?;
        }

        Ok(config)
    }

    /// Apply a service TOML document on top of this config
    pub fn with_service_toml(mut self, content: &str) -> Result<Self, toml::de::Error> {
        let file: ServiceFile = toml::from_str(content)?;
        if let Some(origins) = file.allowed_origins {
            self.allowed_origins = origins;
        }
        if let Some(fields) = file.log_fields {
            self.log_fields = fields;
        }
        Ok(self)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Internal error details are only shown outside production
    pub fn expose_error_details(&self) -> bool {
        !self.is_production()
    }

    /// Check an `Origin` header value against the allow-list
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }

    /// Build the request-body redactor for this config
    pub fn redactor(&self) -> LogRedactor {
        LogRedactor::new(self.log_fields.iter().cloned())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            log_fields: DEFAULT_LOG_FIELDS.iter().map(|s| s.to_string()).collect(),
            customer_strategy: CustomerStrategyKind::default(),
        }
    }
}

/// Find and read the service config file, if any
fn read_service_file(explicit: Option<&Path>) -> PaymentResult<Option<(PathBuf, String)>> {
    if let Some(path) = explicit {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PaymentError::Configuration(format!("Cannot read {}: {}", path.display(), e))
        })?;
        return Ok(Some((path.to_path_buf(), content)));
    }

    let config_paths = [
        "config/service.toml",
        "../config/service.toml",
        "../../config/service.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return Ok(Some((PathBuf::from(path), content)));
        }
    }

    Ok(None)
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: Arc<AppConfig>,
    /// Publishable key handed to clients, if configured
    pub publishable_key: Option<Arc<str>>,
    /// Outbound payment processor
    pub processor: BoxedPaymentProcessor,
    /// Customer resolution strategy
    pub customers: BoxedCustomerStrategy,
    /// Webhook verifier; `None` when no signing secret is configured
    pub webhooks: Option<Arc<dyn WebhookVerifier>>,
    /// Reacts to verified webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Request-body log redaction
    pub redactor: Arc<LogRedactor>,
    /// Whether the processor is running with live keys
    pub live_mode: bool,
}

impl AppState {
    /// Create the production state from the environment.
    ///
    /// Fails when the Stripe secret key is missing or malformed.
    pub fn new() -> PaymentResult<Self> {
        let config = AppConfig::from_env()?;
        let stripe = StripeConfig::from_env()?;
        Self::from_stripe(config, stripe)
    }

    /// Create state backed by Stripe
    pub fn from_stripe(config: AppConfig, stripe: StripeConfig) -> PaymentResult<Self> {
        if stripe.publishable_key.is_none() {
            warn!("STRIPE_PUBLISHABLE_KEY not set; /stripe-key will return 500");
        }
        if stripe.webhook_secret.is_none() {
            warn!("STRIPE_WEBHOOK_SECRET not set; /webhook will return 500");
        }

        let publishable_key = stripe.publishable_key.clone();
        let webhook_secret = stripe.webhook_secret.clone();
        let live_mode = stripe.is_live_mode();

        let mut state = Self::with_processor(config, Arc::new(StripeClient::new(stripe)?));
        state.live_mode = live_mode;
        if let Some(key) = publishable_key {
            state = state.with_publishable_key(key);
        }
        if let Some(secret) = webhook_secret {
            state = state.with_webhook_verifier(Arc::new(StripeWebhookVerifier::new(secret)));
        }
        Ok(state)
    }

    /// Create state around any processor (publishable key and webhooks unset)
    pub fn with_processor(config: AppConfig, processor: BoxedPaymentProcessor) -> Self {
        let customers = config.customer_strategy.build();
        let redactor = Arc::new(config.redactor());
        Self {
            config: Arc::new(config),
            publishable_key: None,
            processor,
            customers,
            webhooks: None,
            webhook_handler: Arc::new(LoggingWebhookHandler),
            redactor,
            live_mode: false,
        }
    }

    /// Builder: set the publishable key
    pub fn with_publishable_key(mut self, key: impl Into<String>) -> Self {
        self.publishable_key = Some(Arc::from(key.into()));
        self
    }

    /// Builder: set the webhook verifier
    pub fn with_webhook_verifier(mut self, verifier: Arc<dyn WebhookVerifier>) -> Self {
        self.webhooks = Some(verifier);
        self
    }

    /// Builder: set the webhook event handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }

    /// Builder: set the customer strategy
    pub fn with_customer_strategy(mut self, strategy: BoxedCustomerStrategy) -> Self {
        self.customers = strategy;
        self
    }

    /// Convert an error into an API error with this deployment's detail posture
    pub fn api_error(&self, err: impl Into<ApiError>) -> ApiError {
        err.into().with_details(self.config.expose_error_details())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert!(!config.is_production());
        assert!(config.expose_error_details());
        assert_eq!(config.customer_strategy, CustomerStrategyKind::Create);
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_from_lookup_applies_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("ENVIRONMENT", "production"),
            ("CUSTOMER_STRATEGY", "lookup"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:9090");
        assert!(config.is_production());
        assert_eq!(config.customer_strategy, CustomerStrategyKind::Lookup);

        let defaults = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(defaults.port, 8080);
    }

    #[test]
    fn test_from_lookup_rejects_invalid_port() {
        for port in ["abc", "70000", "-1", ""] {
            let err = AppConfig::from_lookup(lookup(&[("PORT", port)])).unwrap_err();
            assert!(matches!(err, PaymentError::Configuration(_)), "{port}");
        }
    }

    #[test]
    fn test_from_lookup_rejects_unknown_strategy() {
        let err = AppConfig::from_lookup(lookup(&[("CUSTOMER_STRATEGY", "reuse")])).unwrap_err();
        assert!(matches!(err, PaymentError::Configuration(_)));
    }

    #[test]
    fn test_startup_fails_without_valid_secret_key() {
        let vars = [("PORT", "8080"), ("STRIPE_SECRET_KEY", "pk_test_abc")];
        let result = AppConfig::from_lookup(lookup(&vars))
            .and_then(|config| Ok((config, StripeConfig::from_lookup(lookup(&vars))?)))
            .and_then(|(config, stripe)| AppState::from_stripe(config, stripe));
        assert!(matches!(result, Err(PaymentError::Configuration(_))));

        let vars = [("STRIPE_SECRET_KEY", "sk_test_abc")];
        let state = AppState::from_stripe(
            AppConfig::from_lookup(lookup(&vars)).unwrap(),
            StripeConfig::from_lookup(lookup(&vars)).unwrap(),
        )
        .unwrap();
        assert!(!state.live_mode);
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            ..AppConfig::default()
        };
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");

        let bad = AppConfig {
            host: "not a host".to_string(),
            ..AppConfig::default()
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn test_service_toml_overrides() {
        let config = AppConfig::default()
            .with_service_toml(
                r#"
                allowed_origins = ["https://shop.example.com"]
                log_fields = ["amount"]
                "#,
            )
            .unwrap();

        assert!(config.is_origin_allowed("https://shop.example.com"));
        assert!(!config.is_origin_allowed("http://localhost:3000"));
        assert!(config.redactor().allows("amount"));
        assert!(!config.redactor().allows("currency"));
    }

    #[test]
    fn test_partial_service_toml_keeps_defaults() {
        let config = AppConfig::default()
            .with_service_toml("log_fields = []")
            .unwrap();
        assert!(config.is_origin_allowed("http://localhost:3000"));
        assert!(config.log_fields.is_empty());

        assert!(AppConfig::default().with_service_toml("allowed_origins = 5").is_err());
    }

    #[test]
    fn test_state_from_stripe_config() {
        let stripe = StripeConfig::new("sk_live_abc")
            .with_publishable_key("pk_live_xyz")
            .with_webhook_secret("whsec_123");
        let state = AppState::from_stripe(AppConfig::default(), stripe).unwrap();

        assert!(state.live_mode);
        assert_eq!(state.publishable_key.as_deref(), Some("pk_live_xyz"));
        assert!(state.webhooks.is_some());
        assert_eq!(state.processor.provider_name(), "stripe");

        let bare = AppState::from_stripe(AppConfig::default(), StripeConfig::new("sk_test_abc")).unwrap();
        assert!(bare.publishable_key.is_none());
        assert!(bare.webhooks.is_none());
    }
}
