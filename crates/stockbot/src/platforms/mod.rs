//! Messaging platform adapters

pub mod telegram;

pub use telegram::{TelegramConfig, TelegramGateway, Update};
