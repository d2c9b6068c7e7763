//! Telegram stock quote bot
//!
//! Receives Telegram webhook updates, parses a small command vocabulary,
//! looks up market data and replies in the originating chat:
//!
//! - `/price <symbol>`: latest quote
//! - `/search <company>`: ranked symbol matches
//! - `/chart <symbol>`: 30 day price summary
//! - `/news`: trending symbols
//! - `/start`, `/help`, `/portfolio`: static replies
//!
//! # Architecture
//!
//! - [`api`]: the [`QuoteProvider`] trait with Yahoo Finance and Alpha
//!   Vantage clients; provider JSON is decoded there and nowhere else
//! - [`bot`]: command parsing and the [`StockBot`] dispatcher
//! - [`interface`]: message types, the [`MessagingGateway`] trait and
//!   reply formatting
//! - [`platforms`]: Telegram update decoding and the `sendMessage` gateway
//! - [`server`]: axum router exposing `/webhook`, `/health` and `/`
//!
//! # Example
//!
//! ```rust,ignore
//! use stockbot::{api, AppConfig, StockBot, TelegramGateway};
//! use stockbot::server::{app_router, AppState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let provider = api::create_provider(&config.stock)?;
//!     let gateway = Arc::new(TelegramGateway::new(config.telegram, config.stock.request_timeout)?);
//!     let bot = StockBot::new(provider, gateway, config.stock, config.bot);
//!
//!     let listener = tokio::net::TcpListener::bind(("0.0.0.0", 3000)).await?;
//!     axum::serve(listener, app_router(AppState::new(bot))).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod bot;
pub mod config;
pub mod error;
pub mod interface;
pub mod platforms;
pub mod server;

// Re-export main types for convenience
pub use api::{create_provider, QuoteProvider};
pub use bot::{Command, StockBot};
pub use config::{AppConfig, BotConfig, DataProvider, RunMode, ServerConfig, StockConfig};
pub use error::{Result, StockError};
pub use interface::{IncomingMessage, MessagingGateway, OutgoingMessage};
pub use platforms::{TelegramConfig, TelegramGateway};
