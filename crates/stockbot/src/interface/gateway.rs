//! Outbound delivery abstraction
//!
//! The dispatcher only ever talks to a [`MessagingGateway`]; the Telegram
//! implementation lives in `crate::platforms::telegram`.

use crate::error::Result;
use crate::interface::message::{ChatId, OutgoingMessage};
use async_trait::async_trait;

/// Delivers text messages to a chat
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send one message to `chat_id`
    async fn send_message(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<()>;
}
