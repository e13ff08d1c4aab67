//! # intent-gateway
//!
//! Payment-intent backend for mobile and web payment sheets.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//!
//! # Run the server (LOG_FORMAT=json for structured logs)
//! intent-gateway
//! ```

use anyhow::Context;
use pay_api::{routes, state::AppState};
use pay_core::mask_secret;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    print_banner();

    let state = AppState::new().context("Failed to load configuration")?;

    let addr = state
        .config
        .socket_addr()
        .with_context(|| format!("Invalid bind address {}:{}", state.config.host, state.config.port))?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Stripe mode: {}",
        if state.live_mode { "live" } else { "test" }
    );
    if let Some(key) = state.publishable_key.as_deref() {
        info!("Publishable key: {}", mask_secret(key));
    }
    info!("Customer strategy: {}", state.customers.name());
    info!("Allowed origins: {:?}", state.config.allowed_origins);

    let app = routes::create_router(state);

    info!("Intent gateway starting on http://{}", addr);

    if !is_prod {
        info!("Health: GET http://{}/health", addr);
        info!("Payment intents: POST http://{}/create-payment-intent", addr);
        info!("Webhook: POST http://{}/webhook", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Intent gateway stopped");
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn print_banner() {
    println!(
        r#"
  intent-gateway
  ━━━━━━━━━━━━━━━━━━━━━━━
  Payment intents + webhooks
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
