//! Shared utilities for stockbot
//!
//! This crate provides common functionality used across the stockbot workspace:
//! tracing setup and small helpers for reading configuration from the
//! process environment.

pub mod config;
pub mod logging;

pub use config::{EnvError, EnvSource, load_dotenv};
pub use logging::{LogFormat, init_tracing, init_tracing_with, subscriber};
