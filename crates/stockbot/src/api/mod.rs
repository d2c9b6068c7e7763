//! API clients for stock data providers

pub mod alpha_vantage;
pub mod provider;
pub mod yahoo;

use crate::config::{DataProvider, StockConfig};
use crate::error::{Result, StockError};
use std::sync::Arc;

pub use alpha_vantage::AlphaVantageClient;
pub use provider::{Bar, Interval, Quote, QuoteProvider, SymbolMatch, TrendingEntry};
pub use yahoo::YahooFinanceClient;

/// Build the provider client selected by the configuration
pub fn create_provider(config: &StockConfig) -> Result<Arc<dyn QuoteProvider>> {
    match config.default_provider {
        DataProvider::Yahoo => Ok(Arc::new(YahooFinanceClient::new(config.request_timeout)?)),
        DataProvider::AlphaVantage => {
            let key = config.alpha_vantage_api_key.as_deref().ok_or_else(|| {
                StockError::ConfigError("Alpha Vantage API key not configured".to_string())
            })?;
            Ok(Arc::new(AlphaVantageClient::new(key, config.request_timeout)?))
        }
    }
}
