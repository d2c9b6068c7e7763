//! Error types for stock bot operations

use thiserror::Error;

/// Stock bot specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded {
        provider: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Alpha Vantage API error
    #[error("Alpha Vantage error: {0}")]
    AlphaVantageError(String),

    /// Provider call did not finish within the configured timeout
    #[error("{operation} timed out after {seconds}s")]
    Timeout {
        operation: &'static str,
        seconds: u64,
    },

    /// Messaging platform rejected or failed to deliver a message
    #[error("Gateway error: {0}")]
    GatewayError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Reading a request body or writing a response failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for stock bot operations
pub type Result<T> = std::result::Result<T, StockError>;

impl From<stockbot_utils::EnvError> for StockError {
    fn from(err: stockbot_utils::EnvError) -> Self {
        StockError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::Timeout {
            operation: "get_quote",
            seconds: 10,
        };
        assert_eq!(err.to_string(), "get_quote timed out after 10s");

        let err = StockError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded for Alpha Vantage");
    }

    #[test]
    fn test_error_conversion() {
        let env_err = stockbot_utils::EnvError::Missing("TELEGRAM_BOT_TOKEN".to_string());
        let err: StockError = env_err.into();

        match err {
            StockError::ConfigError(msg) => {
                assert!(msg.contains("TELEGRAM_BOT_TOKEN"));
            },
            _ => panic!("Expected ConfigError variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: StockError = io_err.into();
        assert!(matches!(err, StockError::IoError(_)));
        assert_eq!(err.to_string(), "I/O error: stdout closed");
    }
}
