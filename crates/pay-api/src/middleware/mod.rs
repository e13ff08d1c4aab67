//! # Middleware
//!
//! Stages wrapped around the router, outermost first:
//!
//! ```text
//!   TraceLayer ─▶ origin_gate ─▶ CorsLayer ─▶ capture_body ─▶ routes ─▶ CatchPanicLayer
//! ```

pub mod body;
pub mod origin;

pub use body::{capture_body, MAX_BODY_BYTES, WEBHOOK_PATH};
pub use origin::{cors_layer, origin_gate, CORS_REJECTION};
