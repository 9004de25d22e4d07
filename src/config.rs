//! Configuration management

use crate::error::ConfigError;

/// Bot configuration, loaded once at startup and read-only thereafter.
///
/// Deliberately does not derive `Debug` or `Serialize`: both secrets must
/// never reach log output or any serialized form.
#[derive(Clone)]
pub struct BotConfig {
    /// Channel access token for outbound Messaging API calls
    pub channel_access_token: String,

    /// Channel secret keyed into webhook signature verification
    pub channel_secret: String,

    /// Webhook server bind address (receives deliveries from LINE)
    pub webhook_addr: String,
}

fn default_webhook_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl BotConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_vars(
            std::env::var("CHANNEL_ACCESS_TOKEN").ok(),
            std::env::var("CHANNEL_SECRET").ok(),
            std::env::var("WEBHOOK_ADDR").ok(),
        )
    }

    /// Build from already-resolved variables. Empty strings count as absent
    /// so a blank line in `.env` still fails fast.
    fn from_vars(
        channel_access_token: Option<String>,
        channel_secret: Option<String>,
        webhook_addr: Option<String>,
    ) -> Result<Self, ConfigError> {
        let channel_access_token = channel_access_token
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar("CHANNEL_ACCESS_TOKEN"))?;

        let channel_secret = channel_secret
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar("CHANNEL_SECRET"))?;

        Ok(Self {
            channel_access_token,
            channel_secret,
            webhook_addr: webhook_addr
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_webhook_addr),
        })
    }
}
