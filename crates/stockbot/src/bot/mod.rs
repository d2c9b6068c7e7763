//! Stock Bot dispatcher
//!
//! Turns one inbound chat message into at most one provider lookup and
//! exactly one terminal reply.
//!
//! # Example
//!
//! ```rust,ignore
//! use stockbot::bot::StockBot;
//!
//! let bot = StockBot::new(provider, gateway, config.stock, config.bot);
//! bot.handle_message(&IncomingMessage::new(42, "/price AAPL")).await?;
//! ```

pub mod commands;

use crate::api::{Interval, QuoteProvider};
use crate::config::{BotConfig, StockConfig};
use crate::error::{Result, StockError};
use crate::interface::formatter::{self, ChartSummary};
use crate::interface::{ChatId, IncomingMessage, MessagingGateway, OutgoingMessage};
use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

pub use commands::Command;

/// Message dispatcher wired to a quote provider and a messaging gateway
pub struct StockBot {
    provider: Arc<dyn QuoteProvider>,
    gateway: Arc<dyn MessagingGateway>,
    stock: StockConfig,
    config: BotConfig,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl StockBot {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        gateway: Arc<dyn MessagingGateway>,
        stock: StockConfig,
        config: BotConfig,
    ) -> Self {
        Self {
            provider,
            gateway,
            stock,
            config,
        }
    }

    /// Handle one inbound message.
    ///
    /// Failures inside command execution, panics included, are logged and
    /// answered with a single generic error reply. `Err` is returned only when
    /// that reply cannot be delivered either.
    #[instrument(skip(self, message), fields(chat_id = message.chat_id))]
    pub async fn handle_message(&self, message: &IncomingMessage) -> Result<()> {
        let command = Command::parse(message.text.as_deref());
        if command == Command::Empty {
            debug!("Ignoring message without a command");
            return Ok(());
        }

        info!(command = command.name(), "Handling command");

        let outcome = AssertUnwindSafe(self.execute_command(message.chat_id, &command))
            .catch_unwind()
            .await;

        let failure = match outcome {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("panic: {}", panic_message(&*panic)),
        };

        error!(command = command.name(), error = %failure, "Command handling failed");
        self.send(message.chat_id, OutgoingMessage::text(formatter::GENERIC_ERROR))
            .await
    }

    /// Execute a parsed command and send its reply
    pub async fn execute_command(&self, chat_id: ChatId, command: &Command) -> Result<()> {
        let reply = match command {
            Command::Start => OutgoingMessage::markdown(formatter::welcome_text()),
            Command::Help => OutgoingMessage::markdown(formatter::help_text()),
            Command::Portfolio => OutgoingMessage::markdown(formatter::portfolio_text()),
            Command::Price { symbol } => self.price_reply(chat_id, symbol).await,
            Command::Search { query } => self.search_reply(chat_id, query).await,
            Command::Chart { symbol } => self.chart_reply(chat_id, symbol).await,
            Command::News => self.news_reply(chat_id).await,
            Command::Unknown { raw } => {
                debug!(raw = %raw, "Unknown command");
                OutgoingMessage::text(formatter::HELP_HINT)
            }
            Command::Empty => return Ok(()),
        };

        self.send(chat_id, reply).await
    }

    async fn price_reply(&self, chat_id: ChatId, symbol: &str) -> OutgoingMessage {
        if symbol.is_empty() {
            return OutgoingMessage::text(formatter::PRICE_USAGE);
        }
        self.progress(chat_id, formatter::price_progress(symbol)).await;

        match self.lookup("get_quote", self.provider.get_quote(symbol)).await {
            Ok(Some(quote)) => OutgoingMessage::markdown(formatter::format_quote(&quote, Utc::now())),
            Ok(None) => OutgoingMessage::text(formatter::quote_not_found(symbol)),
            Err(e) => {
                error!(symbol, error = %e, "Quote lookup failed");
                OutgoingMessage::text(formatter::PRICE_FAILED)
            }
        }
    }

    async fn search_reply(&self, chat_id: ChatId, query: &str) -> OutgoingMessage {
        if query.is_empty() {
            return OutgoingMessage::text(formatter::SEARCH_USAGE);
        }
        self.progress(chat_id, formatter::search_progress(query)).await;

        match self.lookup("search_symbols", self.provider.search_symbols(query)).await {
            Ok(matches) if matches.is_empty() => {
                OutgoingMessage::text(formatter::no_search_results(query))
            }
            Ok(matches) => OutgoingMessage::markdown(formatter::format_search_results(
                query,
                &matches,
                self.stock.search_limit,
            )),
            Err(e) => {
                error!(query, error = %e, "Symbol search failed");
                OutgoingMessage::text(formatter::SEARCH_FAILED)
            }
        }
    }

    async fn chart_reply(&self, chat_id: ChatId, symbol: &str) -> OutgoingMessage {
        if symbol.is_empty() {
            return OutgoingMessage::text(formatter::CHART_USAGE);
        }
        self.progress(chat_id, formatter::chart_progress(symbol)).await;

        let end = Utc::now();
        let start = end - chrono::Duration::days(self.stock.history_days);
        let history = self
            .provider
            .get_historical(symbol, start, end, Interval::Daily);

        match self.lookup("get_historical", history).await {
            Ok(bars) => match ChartSummary::from_bars(&bars) {
                Some(summary) => OutgoingMessage::markdown(formatter::format_chart(
                    symbol,
                    &summary,
                    self.stock.history_days,
                )),
                None => OutgoingMessage::text(formatter::no_chart_data(symbol)),
            },
            Err(e) => {
                error!(symbol, error = %e, "History lookup failed");
                OutgoingMessage::text(formatter::CHART_FAILED)
            }
        }
    }

    async fn news_reply(&self, chat_id: ChatId) -> OutgoingMessage {
        self.progress(chat_id, formatter::news_progress()).await;

        let region = self.stock.trending_region.as_str();
        match self.lookup("get_trending", self.provider.get_trending(region)).await {
            Ok(entries) if entries.is_empty() => OutgoingMessage::text(formatter::NEWS_UNAVAILABLE),
            Ok(entries) => OutgoingMessage::markdown(formatter::format_trending(
                region,
                &entries,
                self.stock.news_limit,
            ))
            .without_link_preview(),
            Err(e) => {
                error!(region, error = %e, "Trending lookup failed");
                OutgoingMessage::text(formatter::NEWS_FAILED)
            }
        }
    }

    /// Bound a provider call by the configured request timeout
    async fn lookup<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let limit = self.stock.request_timeout;
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| StockError::Timeout {
                operation,
                seconds: limit.as_secs(),
            })?
    }

    /// Best-effort notice before a lookup; delivery failures are only logged
    async fn progress(&self, chat_id: ChatId, text: String) {
        if !self.config.progress_messages {
            return;
        }
        if let Err(e) = self.send(chat_id, OutgoingMessage::markdown(text)).await {
            warn!(error = %e, "Failed to send progress message");
        }
    }

    async fn send(&self, chat_id: ChatId, message: OutgoingMessage) -> Result<()> {
        self.gateway.send_message(chat_id, &message).await
    }
}
