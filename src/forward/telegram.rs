//! Telegram notification forwarding via the Bot API `sendMessage` call.

use reqwest::Client;
use serde_json::json;
use tracing::info;

use super::ForwardError;
use crate::web::SmsEvent;

/// Build the Markdown notification text for a received SMS.
pub fn format_message(event: &SmsEvent) -> String {
    format!(
        "📱 **SMS Received**\n\nFrom: {}\nTo: {}\n\n{}",
        event.from_text(),
        event.to_text(),
        event.body_text()
    )
}

/// Send a notification about a received SMS to the configured Telegram chat.
///
/// The response status is logged but never checked for success.
pub async fn notify_telegram(
    client: &Client,
    api_base: &str,
    bot_token: &str,
    chat_id: &str,
    event: &SmsEvent,
) -> Result<(), ForwardError> {
    let url = format!(
        "{}/bot{bot_token}/sendMessage",
        api_base.trim_end_matches('/')
    );

    let response = client
        .post(&url)
        .json(&json!({
            "chat_id": chat_id,
            "text": format_message(event),
            "parse_mode": "Markdown",
        }))
        .send()
        .await
        .map_err(ForwardError::Telegram)?;

    info!(
        chat_id = chat_id,
        status_code = response.status().as_u16(),
        "telegram_notification_sent"
    );

    Ok(())
}
