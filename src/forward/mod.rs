//! Outbound forwarders for received SMS events.
//!
//! Each forwarder issues one best-effort HTTP POST to its downstream target.
//! Callers decide how to react to a [`ForwardError`]; the webhook handler
//! logs it and carries on.

pub mod relay;
pub mod telegram;

use thiserror::Error;

pub use relay::relay_sms;
pub use telegram::notify_telegram;

/// Failure of a single outbound forwarding call.
///
/// Only transport-level failures are errors; a downstream non-2xx response
/// is logged by the forwarder but not treated as a failure.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("telegram request failed: {0}")]
    Telegram(#[source] reqwest::Error),

    #[error("relay request failed: {0}")]
    Relay(#[source] reqwest::Error),
}
