//! Telegram Bot API integration
//!
//! Inbound: webhook [`Update`] payloads decoded into [`IncomingMessage`].
//! Outbound: [`TelegramGateway`] posting to `sendMessage`.

use crate::error::{Result, StockError};
use crate::interface::{ChatId, IncomingMessage, MessagingGateway, OutgoingMessage};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use stockbot_utils::EnvSource;
use tracing::{debug, instrument};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram bot configuration
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token from BotFather
    pub token: String,
    /// Bot API root, overridable for local Bot API servers
    pub api_base: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Read `TELEGRAM_BOT_TOKEN` (required) and `TELEGRAM_API_BASE`
    pub fn from_source<F>(env: &EnvSource<F>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = env.required("TELEGRAM_BOT_TOKEN")?;
        let api_base = env
            .optional("TELEGRAM_API_BASE")
            .map_or_else(|| DEFAULT_API_BASE.to_string(), |base| base.trim_end_matches('/').to_string());

        Ok(Self { token, api_base })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }
}

/// Webhook update; only plain messages are acted on
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    message: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

impl Update {
    /// Decode a raw webhook body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// The message to dispatch; `None` when absent or not shaped like one
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let message: Message = serde_json::from_value(self.message?)
            .inspect_err(|e| debug!(error = %e, "Skipping malformed message"))
            .ok()?;
        Some(IncomingMessage {
            chat_id: message.chat.id,
            text: message.text,
        })
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    disable_web_page_preview: bool,
}

impl<'a> SendMessageRequest<'a> {
    fn new(chat_id: ChatId, message: &'a OutgoingMessage) -> Self {
        Self {
            chat_id,
            text: &message.text,
            parse_mode: message.parse_mode.map(|mode| mode.as_str()),
            disable_web_page_preview: message.disable_link_preview,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Interpret a Bot API reply
fn check_response(status: StatusCode, body: &str) -> Result<()> {
    match serde_json::from_str::<ApiResponse>(body) {
        Ok(response) if response.ok => Ok(()),
        Ok(response) => Err(StockError::GatewayError(format!(
            "{status}: {}",
            response.description.unwrap_or_else(|| "no description".to_string())
        ))),
        Err(_) if status.is_success() => Ok(()),
        Err(_) => Err(StockError::GatewayError(format!("{status}: {body}"))),
    }
}

/// Sends replies through the Telegram Bot API
pub struct TelegramGateway {
    client: Client,
    config: TelegramConfig,
}

impl TelegramGateway {
    pub fn new(config: TelegramConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    #[instrument(skip(self, message), fields(platform = "telegram"))]
    async fn send_message(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<()> {
        let response = self
            .client
            .post(self.config.method_url("sendMessage"))
            .json(&SendMessageRequest::new(chat_id, message))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        check_response(status, &body)?;

        debug!(chars = message.text.chars().count(), "Message delivered");
        Ok(())
    }
}
