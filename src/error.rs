//! Error taxonomy for the relay
//!
//! Each failure class gets its own type so callers (and tests) can assert
//! on outcomes instead of inspecting log output:
//!
//! - [`ConfigError`]: missing startup configuration, fatal before the
//!   listener binds
//! - [`AuthError`]: webhook signature rejection, request-scoped
//! - [`DeliveryError`]: outbound call to the LINE API failed, log-only

use thiserror::Error;

/// Startup configuration failure. The process exits on this.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingVar(&'static str),
}

/// Webhook authenticity failure. The request is rejected with 401 and no
/// event processing happens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing x-line-signature header")]
    MissingSignature,
    #[error("signature does not match request body")]
    InvalidSignature,
}

/// Outbound delivery failure. Never propagated back to the webhook caller;
/// the acknowledgment to the platform has typically already been sent.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("reply token must not be empty")]
    EmptyReplyToken,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("LINE API returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}
