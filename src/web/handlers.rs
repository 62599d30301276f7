//! Webhook endpoint handlers.
//!
//! The SMS handler parses the inbound body itself so that a malformed payload
//! maps to an explicit error response, and so that arbitrary JSON value types
//! pass through to the forwarders untouched.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::forward::{notify_telegram, relay_sms};
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }
}

// =============================================================================
// SMS Webhook
// =============================================================================

/// An inbound SMS event extracted from a Telnyx webhook payload.
///
/// Fields keep whatever JSON value the payload carried; only absent fields
/// are defaulted. Serializes to the relay body shape.
#[derive(Debug, Clone, Serialize)]
pub struct SmsEvent {
    pub from: Value,
    pub to: Value,
    pub text: Value,
    pub timestamp: Value,
}

impl SmsEvent {
    /// Extract the event from a parsed payload, defaulting absent fields.
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            from: field_or(payload, "from", "Unknown"),
            to: field_or(payload, "to", "Unknown"),
            text: field_or(payload, "text", ""),
            timestamp: field_or(payload, "message_timestamp", ""),
        }
    }

    pub fn from_text(&self) -> Cow<'_, str> {
        value_text(&self.from)
    }

    pub fn to_text(&self) -> Cow<'_, str> {
        value_text(&self.to)
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        value_text(&self.text)
    }
}

fn field_or(payload: &Value, key: &str, default: &str) -> Value {
    payload
        .get(key)
        .cloned()
        .unwrap_or_else(|| Value::String(default.to_string()))
}

/// Render a field value for logs and the Telegram message.
///
/// Strings render bare; any other JSON value renders as its JSON text.
fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Rejection of an inbound webhook request.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid JSON payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("expected a JSON object payload")]
    NotAnObject,
}

/// Error response body.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        warn!(error = %self, "sms_webhook_rejected");

        let status = match self {
            WebhookError::InvalidPayload(_) | WebhookError::NotAnObject => {
                StatusCode::BAD_REQUEST
            }
        };

        (
            status,
            Json(ErrorResponse {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Success response body.
#[derive(Serialize)]
pub struct SmsResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Telnyx SMS webhook endpoint.
///
/// Forwarding failures are isolated per target: each is logged and neither
/// fails the request nor prevents the other forwarder from running. Once the
/// payload parses, the caller gets 200.
pub async fn sms_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SmsResponse>, WebhookError> {
    let payload: Value = serde_json::from_slice(&body)?;
    if !payload.is_object() {
        return Err(WebhookError::NotAnObject);
    }
    let event = SmsEvent::from_payload(&payload);

    info!(
        from = %event.from_text(),
        to = %event.to_text(),
        text = %event.body_text(),
        "sms_received"
    );

    if state.config.telegram_configured() {
        if let Err(e) = notify_telegram(
            &state.http,
            &state.config.telegram_api_base,
            &state.config.telegram_bot_token,
            &state.config.telegram_chat_id,
            &event,
        )
        .await
        {
            error!(error = %e, "telegram_forward_failed");
        }
    } else {
        debug!("telegram_forward_skipped_not_configured");
    }

    if state.config.relay_configured() {
        if let Err(e) = relay_sms(&state.http, &state.config.relay_base_url, &event).await {
            error!(error = %e, "relay_forward_failed");
        }
    } else {
        debug!("relay_forward_skipped_not_configured");
    }

    Ok(Json(SmsResponse {
        status: "received",
        message: "SMS processed",
    }))
}

// =============================================================================
// Health & Status
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "telnyx-webhook",
    })
}

/// Root status response.
#[derive(Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

/// Root endpoint with static service metadata.
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: "Telnyx SMS Webhook",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::build_router;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    fn test_config() -> Config {
        Config {
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            telegram_api_base: "https://api.telegram.org".to_string(),
            relay_base_url: String::new(),
            port: 8080,
        }
    }

    fn unconfigured_state() -> AppState {
        AppState::new(test_config(), reqwest::Client::new())
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_extraction_defaults_for_absent_fields() {
        let event = SmsEvent::from_payload(&json!({}));
        assert_eq!(event.from, json!("Unknown"));
        assert_eq!(event.to, json!("Unknown"));
        assert_eq!(event.text, json!(""));
        assert_eq!(event.timestamp, json!(""));
    }

    #[test]
    fn test_extraction_echoes_present_fields() {
        let event = SmsEvent::from_payload(&json!({
            "from": "+15551234567",
            "to": "+15557654321",
            "text": "hello",
            "message_timestamp": "2024-01-01T00:00:00Z",
        }));
        assert_eq!(event.from, json!("+15551234567"));
        assert_eq!(event.to, json!("+15557654321"));
        assert_eq!(event.text, json!("hello"));
        assert_eq!(event.timestamp, json!("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_extraction_passes_through_any_value_type() {
        let event = SmsEvent::from_payload(&json!({
            "from": 5551234567u64,
            "to": null,
            "text": {"nested": true},
        }));
        assert_eq!(event.from, json!(5551234567u64));
        assert_eq!(event.to, json!(null));
        assert_eq!(event.text, json!({"nested": true}));
        assert_eq!(event.from_text(), "5551234567");
        assert_eq!(event.to_text(), "null");
    }

    #[tokio::test]
    async fn test_health_returns_fixed_json() {
        let app = build_router(unconfigured_state());

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"status": "healthy", "service": "telnyx-webhook"})
        );
    }

    #[tokio::test]
    async fn test_root_returns_service_metadata() {
        let app = build_router(unconfigured_state());

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "service": "Telnyx SMS Webhook",
                "version": "1.0.0",
                "status": "running",
            })
        );
    }

    #[tokio::test]
    async fn test_sms_webhook_succeeds_with_no_targets_configured() {
        let app = build_router(unconfigured_state());

        let response = app
            .oneshot(
                Request::post("/webhook/sms")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({"from": "+15551234567", "to": "+15557654321", "text": "hello"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"status": "received", "message": "SMS processed"})
        );
    }

    #[tokio::test]
    async fn test_sms_webhook_rejects_invalid_json() {
        let app = build_router(unconfigured_state());

        let response = app
            .oneshot(
                Request::post("/webhook/sms")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(!body["detail"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sms_webhook_rejects_non_object_json() {
        for body in ["[1,2,3]", "42", "\"hi\"", "null"] {
            let app = build_router(unconfigured_state());

            let response = app
                .oneshot(
                    Request::post("/webhook/sms")
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let json = body_json(response).await;
            assert!(!json["detail"].as_str().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_sms_webhook_rejects_empty_body() {
        let app = build_router(unconfigured_state());

        let response = app
            .oneshot(
                Request::post("/webhook/sms")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body.get("detail").is_some());
    }

    #[tokio::test]
    async fn test_sms_webhook_survives_unreachable_relay() {
        // Port 9 (discard) is not listening; the forward fails and is logged,
        // but the request still succeeds.
        let state = AppState::new(
            Config {
                relay_base_url: "http://127.0.0.1:9".to_string(),
                ..test_config()
            },
            reqwest::Client::new(),
        );
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::post("/webhook/sms")
                    .body(Body::from(json!({"text": "hi"}).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sms_webhook_relays_despite_telegram_failure() {
        // Stub relay service that records the body posted to /sms/received.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let relay_addr = listener.local_addr().unwrap();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let stub = axum::Router::new().route(
            "/sms/received",
            axum::routing::post(move |Json(body): Json<Value>| {
                let tx = tx.clone();
                async move {
                    tx.send(body).unwrap();
                    StatusCode::OK
                }
            }),
        );
        tokio::spawn(async move {
            axum::serve(listener, stub).await.unwrap();
        });

        // Telegram is configured but pointed at a closed port: that forward
        // fails and is logged, and must not prevent the relay step.
        let state = AppState::new(
            Config {
                telegram_bot_token: "123:abc".to_string(),
                telegram_chat_id: "42".to_string(),
                telegram_api_base: "http://127.0.0.1:9".to_string(),
                relay_base_url: format!("http://{relay_addr}"),
                port: 8080,
            },
            reqwest::Client::new(),
        );
        let app = build_router(state);

        let response = app
            .oneshot(
                Request::post("/webhook/sms")
                    .body(Body::from(
                        json!({"from": "+15551234567", "to": "+15557654321", "text": "hello"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"status": "received", "message": "SMS processed"})
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            json!({
                "from": "+15551234567",
                "to": "+15557654321",
                "text": "hello",
                "timestamp": "",
            })
        );
    }
}
