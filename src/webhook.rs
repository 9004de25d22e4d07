//! Webhook HTTP handlers

use axum::{
    Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use std::net::SocketAddr;
use tracing::{debug, info, warn};

use crate::config::BotConfig;
use crate::error::AuthError;
use crate::line_api::LineApiClient;
use crate::signature;
use crate::types::{InboundEvent, OutboundMessage, WebhookEvent, WebhookPayload};

/// Header carrying the platform's request signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

const ECHO_PREFIX: &str = "You said: ";

/// Webhook server state
#[derive(Clone)]
pub struct WebhookState {
    pub config: BotConfig,
    pub api: LineApiClient,
}

/// Run the webhook HTTP server
pub async fn run_server(addr: SocketAddr, state: WebhookState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Build the router (split out so tests can drive it without a socket)
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Middleware to log all incoming HTTP requests
async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("🌐 HTTP {} {}", method, path);

    let response = next.run(req).await;

    info!("📤 Response status: {}", response.status());

    response
}

/// Handle a webhook delivery (POST from the LINE platform)
///
/// The acknowledgment must go out promptly regardless of per-event
/// outcomes; LINE redelivers webhooks it considers unacknowledged. Replies
/// are therefore dispatched as detached tasks after decoding.
async fn handle_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, StatusCode> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    let events = match decode_events(&state.config.channel_secret, &body, signature) {
        Ok(events) => events,
        Err(e) => {
            warn!("Rejecting webhook request: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    info!("📥 Webhook delivery with {} text message event(s)", events.len());

    for event in events {
        let api = state.api.clone();
        tokio::spawn(async move {
            let message = echo_reply(&event);
            if let Err(e) = api.send_reply(&event.reply_token, vec![message]).await {
                tracing::error!(
                    "Reply delivery failed for token {}: {}",
                    event.reply_token,
                    e
                );
            }
        });
    }

    Ok("OK")
}

/// Verify and decode one webhook delivery into its text-message events
///
/// Pure with respect to I/O: performs no outbound calls, so the caller
/// decides how decoded events are dispatched. A mismatching or absent
/// signature rejects the whole request; after that, malformed individual
/// records are skipped rather than aborting the batch.
pub fn decode_events(
    channel_secret: &str,
    body: &[u8],
    signature: Option<&str>,
) -> Result<Vec<InboundEvent>, AuthError> {
    let signature = signature.ok_or(AuthError::MissingSignature)?;
    if !signature::verify(channel_secret, body, signature) {
        return Err(AuthError::InvalidSignature);
    }

    let payload: WebhookPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Unparseable webhook envelope, acknowledging empty batch: {}", e);
            return Ok(Vec::new());
        }
    };

    let mut inbound = Vec::new();
    for raw in payload.events {
        let event: WebhookEvent = match serde_json::from_value(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping malformed event record: {}", e);
                continue;
            }
        };

        if let Some(event) = event.into_inbound() {
            inbound.push(event);
        } else {
            debug!("Ignoring non-text event");
        }
    }

    Ok(inbound)
}

/// Build the echo reply for one inbound event
pub fn echo_reply(event: &InboundEvent) -> OutboundMessage {
    OutboundMessage::text(format!("{ECHO_PREFIX}{}", event.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower::ServiceExt;

    const SECRET: &str = "test_channel_secret";

    fn signed(body: &str) -> String {
        signature::sign(SECRET, body.as_bytes())
    }

    fn event_json(reply_token: &str, text: &str) -> String {
        format!(
            r#"{{"type":"message","replyToken":"{reply_token}","source":{{"type":"user","userId":"U1"}},"message":{{"type":"text","id":"1","text":"{text}"}}}}"#
        )
    }

    fn batch(events: &[String]) -> String {
        format!(
            r#"{{"destination":"xxx","events":[{}]}}"#,
            events.join(",")
        )
    }

    #[test]
    fn test_decode_single_text_event() {
        let body = batch(&[event_json("abc", "hi")]);
        let signature = signed(&body);

        let events = decode_events(SECRET, body.as_bytes(), Some(&signature)).unwrap();
        assert_eq!(
            events,
            vec![InboundEvent {
                reply_token: "abc".to_string(),
                user_id: Some("U1".to_string()),
                text: "hi".to_string(),
            }]
        );
    }

    #[test]
    fn test_decode_preserves_one_event_per_record() {
        let body = batch(&[
            event_json("token-1", "first"),
            event_json("token-2", "second"),
            event_json("token-3", "third"),
        ]);
        let signature = signed(&body);

        let events = decode_events(SECRET, body.as_bytes(), Some(&signature)).unwrap();
        let tokens: Vec<&str> = events.iter().map(|e| e.reply_token.as_str()).collect();
        assert_eq!(tokens, vec!["token-1", "token-2", "token-3"]);
    }

    #[test]
    fn test_missing_signature_rejects_request() {
        let body = batch(&[event_json("abc", "hi")]);
        let result = decode_events(SECRET, body.as_bytes(), None);
        assert_eq!(result, Err(AuthError::MissingSignature));
    }

    #[test]
    fn test_invalid_signature_rejects_request() {
        let body = batch(&[event_json("abc", "hi")]);
        let signature = signature::sign("some_other_secret", body.as_bytes());
        let result = decode_events(SECRET, body.as_bytes(), Some(&signature));
        assert_eq!(result, Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_malformed_record_does_not_abort_batch() {
        let body = batch(&[
            r#"{"type":["not","a","string"]}"#.to_string(),
            event_json("abc", "still here"),
        ]);
        let signature = signed(&body);

        let events = decode_events(SECRET, body.as_bytes(), Some(&signature)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reply_token, "abc");
        assert_eq!(events[0].text, "still here");
    }

    #[test]
    fn test_non_message_events_are_ignored() {
        let body = batch(&[
            r#"{"type":"follow","replyToken":"f1"}"#.to_string(),
            event_json("abc", "hi"),
            r#"{"type":"message","replyToken":"s1","message":{"type":"sticker","id":"2"}}"#
                .to_string(),
        ]);
        let signature = signed(&body);

        let events = decode_events(SECRET, body.as_bytes(), Some(&signature)).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reply_token, "abc");
    }

    #[test]
    fn test_unparseable_envelope_yields_empty_batch() {
        let body = "this is not json";
        let signature = signed(body);
        let events = decode_events(SECRET, body.as_bytes(), Some(&signature)).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_echo_reply_prefixes_original_text() {
        let event = InboundEvent {
            reply_token: "abc".to_string(),
            user_id: None,
            text: "hi".to_string(),
        };
        assert_eq!(echo_reply(&event), OutboundMessage::text("You said: hi"));
    }

    // =========================================================================
    // Router tests
    // =========================================================================

    fn test_state() -> WebhookState {
        let config = BotConfig {
            channel_access_token: "test_access_token".to_string(),
            channel_secret: SECRET.to_string(),
            webhook_addr: "127.0.0.1:0".to_string(),
        };
        let api = LineApiClient::new(config.channel_access_token.clone());
        WebhookState { config, api }
    }

    fn webhook_request(body: &str, signature: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/webhook");
        if let Some(signature) = signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_unsigned_request_gets_401() {
        let app = router(test_state());
        let body = batch(&[event_json("abc", "hi")]);

        let response = app.oneshot(webhook_request(&body, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_badly_signed_request_gets_401() {
        let app = router(test_state());
        let body = batch(&[event_json("abc", "hi")]);
        let signature = signature::sign("some_other_secret", body.as_bytes());

        let response = app
            .oneshot(webhook_request(&body, Some(&signature)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signed_empty_batch_is_acknowledged() {
        let app = router(test_state());
        let body = r#"{"destination":"xxx","events":[]}"#;
        let signature = signed(body);

        let response = app
            .oneshot(webhook_request(body, Some(&signature)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_signed_garbage_body_is_acknowledged() {
        let app = router(test_state());
        let body = "this is not json";
        let signature = signed(body);

        let response = app
            .oneshot(webhook_request(body, Some(&signature)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_batch_of_n_events_attempts_n_replies() {
        let (base_url, requests) = crate::line_api::stub::spawn(StatusCode::OK, "{}").await;
        let config = BotConfig {
            channel_access_token: "test_access_token".to_string(),
            channel_secret: SECRET.to_string(),
            webhook_addr: "127.0.0.1:0".to_string(),
        };
        let api = LineApiClient::with_base_url(config.channel_access_token.clone(), base_url);
        let app = router(WebhookState { config, api });

        let body = batch(&[
            event_json("token-1", "first"),
            event_json("token-2", "second"),
        ]);
        let signature = signed(&body);

        let response = app
            .oneshot(webhook_request(&body, Some(&signature)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Replies run as detached tasks after the 200; poll the stub until
        // both have landed. Ordering between siblings is not guaranteed.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        loop {
            let recorded: Vec<serde_json::Value> = requests.lock().unwrap().clone();
            if recorded.len() >= 2 {
                let mut tokens: Vec<String> = recorded
                    .iter()
                    .map(|r| r["replyToken"].as_str().unwrap().to_string())
                    .collect();
                tokens.sort();
                assert_eq!(tokens, vec!["token-1", "token-2"]);
                let texts: Vec<&str> = recorded
                    .iter()
                    .map(|r| r["messages"][0]["text"].as_str().unwrap())
                    .collect();
                assert!(texts.contains(&"You said: first"));
                assert!(texts.contains(&"You said: second"));
                break;
            }
            assert!(
                std::time::Instant::now() < deadline,
                "expected 2 replies, stub saw {:?}",
                recorded
            );
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
