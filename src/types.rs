//! Wire types for LINE webhook deliveries and Messaging API calls

use serde::{Deserialize, Serialize};

// =============================================================================
// Webhook Types (from the LINE platform)
// =============================================================================

/// Webhook delivery envelope: `{ destination, events: [...] }`
///
/// Events stay as raw JSON values so one malformed record can be skipped
/// without poisoning the rest of the batch.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<serde_json::Value>,
}

/// A single webhook event record
///
/// Only message events are acted on; the other event kinds LINE delivers
/// (follow, unfollow, postback, ...) parse into this shape too and are
/// filtered out by [`WebhookEvent::into_inbound`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub message: Option<MessageContent>,
    #[serde(default)]
    pub source: Option<EventSource>,
}

/// Message content attached to a message event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Event source (user / group / room)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub source_type: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// A text-message event distilled down to what dispatch needs.
/// Immutable, lives only for one request-processing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub reply_token: String,
    pub user_id: Option<String>,
    pub text: String,
}

impl WebhookEvent {
    /// Narrow this record to an [`InboundEvent`] if it is a text message
    /// carrying a reply token; anything else is ignored, not an error.
    pub fn into_inbound(self) -> Option<InboundEvent> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message?;
        if message.message_type != "text" {
            return None;
        }
        Some(InboundEvent {
            reply_token: self.reply_token?,
            user_id: self.source.and_then(|s| s.user_id),
            text: message.text?,
        })
    }
}

// =============================================================================
// Messaging API Types (to the LINE platform)
// =============================================================================

/// Outbound message, tagged by `type` on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text { text: String },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Reply endpoint request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub reply_token: String,
    pub messages: Vec<OutboundMessage>,
}

/// Push endpoint request body (proactive notification, no reply token)
#[derive(Debug, Clone, Serialize)]
pub struct PushRequest {
    pub to: String,
    pub messages: Vec<OutboundMessage>,
}

/// Reply endpoint response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyAck {
    #[serde(default)]
    pub sent_messages: Vec<SentMessage>,
}

/// Identifier of one delivered message, as returned by the platform
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub id: String,
    #[serde(default)]
    pub quote_token: Option<String>,
}
