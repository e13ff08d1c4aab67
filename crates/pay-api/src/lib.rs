//! # pay-api
//!
//! HTTP API layer for intent-gateway.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Payment-intent creation for mobile/web payment sheets
//! - Stripe webhook verification and dispatch
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Service banner |
//! | GET | `/health` | Health check |
//! | GET | `/stripe-key` | Publishable key |
//! | POST | `/create-payment-intent` | Create payment intent |
//! | POST | `/webhook` | Stripe webhook |

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
