//! LINE Echo Relay Library
//!
//! A minimal webhook relay for the LINE Messaging API: it terminates
//! inbound webhook deliveries, verifies their signatures, and answers
//! every text message with an echo reply.
//!
//! # Architecture
//!
//! ```text
//! LINE Platform ──HTTPS──▶ Relay (this) ──HTTPS──▶ LINE Messaging API
//!                            │
//!                            ├── Webhook Receiver (POST /webhook)
//!                            └── Reply Dispatcher (reply/push endpoints)
//! ```
//!
//! # Usage
//!
//! ```bash
//! # Set environment variables
//! export CHANNEL_ACCESS_TOKEN=your_access_token
//! export CHANNEL_SECRET=your_channel_secret
//! export WEBHOOK_ADDR=0.0.0.0:8080   # optional
//!
//! # Run
//! line-echo-relay
//! ```

pub mod config;
pub mod error;
pub mod line_api;
pub mod signature;
pub mod types;
pub mod webhook;

pub use config::BotConfig;
pub use error::{AuthError, ConfigError, DeliveryError};
pub use line_api::LineApiClient;
pub use types::*;
pub use webhook::WebhookState;
