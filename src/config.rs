//! Configuration module for environment variable parsing.
//!
//! Reads all configuration from environment variables, optionally seeded from
//! a mounted secrets file. The resulting [`Config`] is immutable for the
//! process lifetime and handed to the handlers through shared state.

use std::env;
use std::path::Path;

use tracing::{debug, warn};

/// Name of the secrets file looked up inside the secrets directory.
pub const SECRETS_FILE_NAME: &str = "telnyx-webhook.env";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram bot token; Telegram forwarding is disabled when empty
    pub telegram_bot_token: String,

    /// Telegram chat to notify; Telegram forwarding is disabled when empty
    pub telegram_chat_id: String,

    /// Base URL of the Telegram Bot API, overridable for proxies and tests
    pub telegram_api_base: String,

    /// Base URL of the internal relay service; relay forwarding is disabled
    /// when empty
    pub relay_base_url: String,

    /// Port for the web server to listen on
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `TELNYX_TELEGRAM_BOT_TOKEN` overrides `TELEGRAM_BOT_TOKEN` when both
    /// are set, so a service-specific token wins over the generic name.
    pub fn from_env() -> Self {
        Config {
            telegram_bot_token: env::var("TELNYX_TELEGRAM_BOT_TOKEN")
                .or_else(|_| env::var("TELEGRAM_BOT_TOKEN"))
                .unwrap_or_default(),

            telegram_chat_id: env::var("TELEGRAM_CHAT_ID").unwrap_or_default(),

            telegram_api_base: env::var("TELEGRAM_API_BASE")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),

            relay_base_url: env::var("RELAY_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        }
    }

    /// True when both Telegram settings are present.
    pub fn telegram_configured(&self) -> bool {
        !self.telegram_bot_token.is_empty() && !self.telegram_chat_id.is_empty()
    }

    /// True when a relay endpoint is present.
    pub fn relay_configured(&self) -> bool {
        !self.relay_base_url.is_empty()
    }
}

/// Overlay `key=value` lines from a secrets file onto the process environment.
///
/// Variables already present in the environment are left untouched, so
/// explicitly exported values always win over file contents. A missing file
/// is not an error; comment lines (`#`) and lines without `=` are skipped.
pub fn apply_secrets_file(path: &Path) {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => {
            debug!(path = %path.display(), "secrets_file_absent");
            return;
        }
    };

    let mut applied = 0usize;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            warn!(path = %path.display(), "secrets_file_malformed_line");
            continue;
        };

        let key = key.trim();
        if key.is_empty() || env::var(key).is_ok() {
            continue;
        }

        // The value is everything after the first `=`, kept verbatim.
        env::set_var(key, value);
        applied += 1;
    }

    debug!(path = %path.display(), applied, "secrets_file_applied");
}
