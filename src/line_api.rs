//! LINE Messaging API client
//!
//! Handles:
//! - Reply messages (correlated to a webhook event via its reply token)
//! - Push messages (proactive notifications to a known user ID)
//!
//! Exactly one outbound call per send, no retry: reply tokens are
//! single-use upstream and the platform redelivers unacknowledged
//! webhooks on its own schedule.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::DeliveryError;
use crate::types::{OutboundMessage, PushRequest, ReplyAck, ReplyRequest};

// =============================================================================
// API Endpoints
// =============================================================================

const BASE_URL: &str = "https://api.line.me";
const REPLY_PATH: &str = "/v2/bot/message/reply";
const PUSH_PATH: &str = "/v2/bot/message/push";

// =============================================================================
// LINE API Client
// =============================================================================

/// LINE Messaging API client
#[derive(Clone)]
pub struct LineApiClient {
    access_token: String,
    http_client: Client,
    base_url: String,
}

impl LineApiClient {
    /// Create a new Messaging API client against the platform endpoint
    pub fn new(access_token: String) -> Self {
        Self::with_base_url(access_token, BASE_URL.to_string())
    }

    /// Create a client against an arbitrary base URL; tests point this at
    /// an in-process stand-in for the platform
    pub(crate) fn with_base_url(access_token: String, base_url: String) -> Self {
        Self {
            access_token,
            http_client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
            base_url,
        }
    }

    /// Send a reply correlated to a webhook event
    ///
    /// The reply token comes from the inbound event and is single-use;
    /// failure is terminal for that event.
    pub async fn send_reply(
        &self,
        reply_token: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<ReplyAck, DeliveryError> {
        if reply_token.is_empty() {
            return Err(DeliveryError::EmptyReplyToken);
        }

        let request = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages,
        };

        debug!("Sending reply for token {}", reply_token);

        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, REPLY_PATH))
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Reply rejected by LINE API: {} - {}", status, body);
            return Err(DeliveryError::Status { status, body });
        }

        let ack: ReplyAck = response.json().await?;
        info!(
            "Reply delivered for token {} ({} message ids)",
            reply_token,
            ack.sent_messages.len()
        );
        Ok(ack)
    }

    /// Push messages to a user without a webhook correlation
    ///
    /// Library surface for proactive notifier flows; the webhook path
    /// never calls it. Same auth as replies, different endpoint.
    pub async fn send_push(
        &self,
        user_id: &str,
        messages: Vec<OutboundMessage>,
    ) -> Result<(), DeliveryError> {
        let request = PushRequest {
            to: user_id.to_string(),
            messages,
        };

        debug!("Sending push message to user {}", user_id);

        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, PUSH_PATH))
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Push rejected by LINE API: {} - {}", status, body);
            return Err(DeliveryError::Status { status, body });
        }

        info!("Push message delivered to user {}", user_id);
        Ok(())
    }
}

// =============================================================================
// Test Stub Server
// =============================================================================
