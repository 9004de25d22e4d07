//! LINE Echo Relay - Main Entry Point
//!
//! A small webhook relay that:
//! 1. Receives webhook deliveries from the LINE platform
//! 2. Verifies each delivery's signature against the channel secret
//! 3. Replies to every text message with "You said: <text>"
//!
//! # Architecture
//!
//! ```text
//! LINE Platform ──HTTPS──▶ Relay (this) ──HTTPS──▶ LINE Messaging API
//!                            │
//!                            ├── Webhook Receiver (POST /webhook)
//!                            └── Reply Dispatcher (reply/push endpoints)
//! ```

use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod line_api;
mod signature;
mod types;
mod webhook;

use config::BotConfig;
use line_api::LineApiClient;
use webhook::WebhookState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,line_echo_relay=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 LINE Echo Relay starting...");

    // Load configuration; missing secrets abort before any listener binds
    let config = BotConfig::from_env()?;
    info!("📋 Configuration loaded");

    let api = LineApiClient::new(config.channel_access_token.clone());
    let state = WebhookState {
        config: config.clone(),
        api,
    };

    // Spawn webhook server
    let webhook_addr: SocketAddr = config.webhook_addr.parse()?;
    let webhook_server = spawn_webhook_server(webhook_addr, state);

    info!("🌐 Webhook server listening on {}", config.webhook_addr);

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => info!("📢 Shutdown signal received"),
        Err(err) => tracing::error!("Unable to listen for shutdown signal: {}", err),
    }

    // Graceful shutdown
    info!("🛑 Shutting down server...");
    webhook_server.abort();

    info!("✅ LINE Echo Relay stopped");
    Ok(())
}

/// Spawn the webhook HTTP server
fn spawn_webhook_server(addr: SocketAddr, state: WebhookState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = webhook::run_server(addr, state).await {
            tracing::error!("Webhook server error: {}", e);
        }
    })
}
