//! Telnyx SMS Webhook server.
//!
//! Receives inbound SMS webhooks from Telnyx and forwards notifications to
//! Telegram and an internal relay endpoint, best-effort.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use telnyx_webhook::config::{apply_secrets_file, SECRETS_FILE_NAME};
use telnyx_webhook::web::{build_router, AppState};
use telnyx_webhook::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("webhook_server_starting");

    // Overlay the secrets file before reading configuration; variables
    // already present in the environment keep their values.
    let secrets_dir =
        std::env::var("SECRETS_DIR").unwrap_or_else(|_| "/run/secrets".to_string());
    apply_secrets_file(&Path::new(&secrets_dir).join(SECRETS_FILE_NAME));

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        telegram_configured = config.telegram_configured(),
        relay_configured = config.relay_configured(),
        "config_loaded"
    );

    // One shared outbound client; no request timeout, matching the
    // fire-and-forget forwarding contract.
    let http = reqwest::Client::new();

    // Create application state and router
    let port = config.port;
    let state = AppState::new(config, http);
    let app = build_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "webhook_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("webhook_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("webhook_server_shutting_down");
}
