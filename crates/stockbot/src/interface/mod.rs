//! Platform-neutral messaging surface: message types, the outbound gateway
//! trait and response formatting.

pub mod formatter;
pub mod gateway;
pub mod message;

pub use gateway::MessagingGateway;
pub use message::{ChatId, IncomingMessage, OutgoingMessage, ParseMode};
