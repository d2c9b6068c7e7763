//! Message types for bot communication

use serde::{Deserialize, Serialize};

/// Chat identifier on the messaging platform
pub type ChatId = i64;

/// Inbound chat message, reduced to what the dispatcher needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub text: Option<String>,
}

impl IncomingMessage {
    pub fn new(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: Some(text.into()),
        }
    }
}

/// Markup dialect for outbound text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    /// Telegram legacy Markdown: `*bold*`, `_italic_`, `[text](url)`
    Markdown,
}

impl ParseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
        }
    }
}

/// Outbound reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub disable_link_preview: bool,
}

impl OutgoingMessage {
    /// Plain text, no markup
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            disable_link_preview: false,
        }
    }

    /// Markdown-formatted text
    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: Some(ParseMode::Markdown),
            disable_link_preview: false,
        }
    }

    /// Suppress link preview expansion
    pub fn without_link_preview(mut self) -> Self {
        self.disable_link_preview = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_builders() {
        let msg = OutgoingMessage::markdown("*hi*").without_link_preview();
        assert_eq!(msg.parse_mode, Some(ParseMode::Markdown));
        assert!(msg.disable_link_preview);

        let msg = OutgoingMessage::text("hi");
        assert_eq!(msg.parse_mode, None);
        assert!(!msg.disable_link_preview);
    }
}
