//! Telnyx SMS Webhook - webhook receiver and notification relay.
//!
//! This library backs the `telnyx-webhook` binary, a thin web server that:
//! - Receives inbound SMS webhooks from Telnyx
//! - Extracts the message fields with defaults
//! - Forwards a notification to Telegram (if configured)
//! - Relays the message to an internal service endpoint (if configured)
//!
//! ## Architecture
//!
//! ```text
//! Telnyx → POST /webhook/sms → extract → Telegram sendMessage
//!                                      → {relay}/sms/received
//! ```
//!
//! Both forwarding calls are best-effort: a failed forward is logged and
//! never fails the inbound request.

pub mod config;
pub mod forward;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use forward::ForwardError;
pub use web::{build_router, AppState, SmsEvent};
