//! Webhook signature verification
//!
//! LINE signs every webhook delivery: `x-line-signature` carries the
//! base64-encoded HMAC-SHA256 of the raw request body, keyed by the
//! channel secret. The receiver treats this module as its authenticity
//! collaborator and never inspects signatures itself.

use base64::engine::general_purpose;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute the signature LINE would attach to `body`
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    base64::Engine::encode(&general_purpose::STANDARD, mac.finalize().into_bytes())
}

/// Verify a received signature against the raw request body
///
/// Comparison happens on the decoded MAC via `verify_slice`, which is
/// constant-time. A header that is not valid base64 simply fails.
pub fn verify(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(received) = base64::Engine::decode(&general_purpose::STANDARD, signature) else {
        return false;
    };

    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    mac.verify_slice(&received).is_ok()
}
