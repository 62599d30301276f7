//! Web server module for handling inbound SMS webhooks.
//!
//! This module provides a thin web server that:
//! - Receives SMS webhooks from Telnyx
//! - Extracts message fields with defaults
//! - Issues the configured best-effort forwarding calls
//! - Returns 200 OK if the inbound payload was valid JSON

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{
    health, root, sms_webhook, AppState, ErrorResponse, HealthResponse, ServiceInfo, SmsEvent,
    SmsResponse, WebhookError,
};

/// Build the application router with all routes and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/webhook/sms", post(sms_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
