//! Configuration for the stock bot
//!
//! Everything is read from the environment at startup. [`AppConfig::from_lookup`]
//! takes an arbitrary lookup function so the parsing rules can be tested
//! without touching process state.

use crate::error::{Result, StockError};
use crate::platforms::telegram::TelegramConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use stockbot_utils::EnvSource;

/// Data provider for stock information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DataProvider {
    /// Yahoo Finance (default, no API key required)
    #[default]
    Yahoo,
    /// Alpha Vantage (requires API key)
    AlphaVantage,
}

impl FromStr for DataProvider {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "yahoo" | "yahoo_finance" => Ok(Self::Yahoo),
            "alpha_vantage" | "alphavantage" => Ok(Self::AlphaVantage),
            other => Err(StockError::ConfigError(format!(
                "unknown data provider: {other}"
            ))),
        }
    }
}

/// Configuration for market data lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Data provider to use
    pub default_provider: DataProvider,

    /// Upper bound on every provider call
    pub request_timeout: Duration,

    /// Alpha Vantage API key (optional)
    pub alpha_vantage_api_key: Option<String>,

    /// Calendar days covered by `/chart`
    pub history_days: i64,

    /// Maximum search matches shown
    pub search_limit: usize,

    /// Maximum trending entries shown by `/news`
    pub news_limit: usize,

    /// Region passed to the trending lookup
    pub trending_region: String,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            default_provider: DataProvider::Yahoo,
            request_timeout: Duration::from_secs(10),
            alpha_vantage_api_key: None,
            history_days: 30,
            search_limit: 5,
            news_limit: 5,
            trending_region: "US".to_string(),
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_provider == DataProvider::AlphaVantage
            && self.alpha_vantage_api_key.is_none() {
            return Err(StockError::ConfigError(
                "Alpha Vantage API key required when using AlphaVantage provider".to_string()
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(StockError::ConfigError(
                "request_timeout must be greater than 0".to_string()
            ));
        }

        if self.history_days <= 0 {
            return Err(StockError::ConfigError(
                "history_days must be greater than 0".to_string()
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    default_provider: Option<DataProvider>,
    request_timeout: Option<Duration>,
    alpha_vantage_api_key: Option<String>,
    history_days: Option<i64>,
    search_limit: Option<usize>,
    news_limit: Option<usize>,
    trending_region: Option<String>,
}

impl StockConfigBuilder {
    /// Set the data provider
    pub fn default_provider(mut self, provider: DataProvider) -> Self {
        self.default_provider = Some(provider);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Set the `/chart` window in calendar days
    pub fn history_days(mut self, days: i64) -> Self {
        self.history_days = Some(days);
        self
    }

    /// Set the number of search matches shown
    pub fn search_limit(mut self, limit: usize) -> Self {
        self.search_limit = Some(limit);
        self
    }

    /// Set the number of trending entries shown
    pub fn news_limit(mut self, limit: usize) -> Self {
        self.news_limit = Some(limit);
        self
    }

    /// Set the trending region
    pub fn trending_region(mut self, region: impl Into<String>) -> Self {
        self.trending_region = Some(region.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        // A configured key selects Alpha Vantage unless a provider was chosen explicitly
        let default_provider = self.default_provider.unwrap_or(
            if self.alpha_vantage_api_key.is_some() {
                DataProvider::AlphaVantage
            } else {
                defaults.default_provider
            },
        );

        let config = StockConfig {
            default_provider,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            history_days: self.history_days.unwrap_or(defaults.history_days),
            search_limit: self.search_limit.unwrap_or(defaults.search_limit),
            news_limit: self.news_limit.unwrap_or(defaults.news_limit),
            trending_region: self.trending_region.unwrap_or(defaults.trending_region),
        };

        config.validate()?;
        Ok(config)
    }
}

/// How the process receives webhook calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunMode {
    /// Bind a listening socket and serve HTTP
    #[default]
    Server,
    /// Handle a single webhook body from stdin, invoked per request by a host
    Serverless,
}

impl FromStr for RunMode {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "server" | "development" => Ok(Self::Server),
            "serverless" | "production" => Ok(Self::Serverless),
            other => Err(StockError::ConfigError(format!("unknown run mode: {other}"))),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port
    pub port: u16,
    /// Socket or per-request invocation
    pub run_mode: RunMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            run_mode: RunMode::Server,
        }
    }
}

/// Dispatcher behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Send a "looking up..." notice before slow lookups
    pub progress_messages: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            progress_messages: true,
        }
    }
}

/// Complete process configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub stock: StockConfig,
    pub server: ServerConfig,
    pub bot: BotConfig,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_source(&EnvSource::process())
    }

    /// Load configuration through a custom lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_source(&EnvSource::new(lookup))
    }

    fn from_source<F>(env: &EnvSource<F>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram = TelegramConfig::from_source(env)?;

        let mut stock = StockConfig::builder().request_timeout(Duration::from_secs(
            env.parse_or("STOCK_REQUEST_TIMEOUT_SECS", 10_u64)?,
        ));
        if let Some(key) = env.first_of(&["STOCK_API_KEY", "ALPHA_VANTAGE_API_KEY"]) {
            stock = stock.alpha_vantage_api_key(key);
        }
        if let Some(provider) = env.optional("STOCK_DATA_PROVIDER") {
            stock = stock.default_provider(provider.parse()?);
        }
        if let Some(region) = env.optional("STOCK_TRENDING_REGION") {
            stock = stock.trending_region(region);
        }

        let server = ServerConfig {
            port: env.parse_or("PORT", 3000_u16)?,
            run_mode: match env.optional("RUN_MODE") {
                Some(mode) => mode.parse()?,
                None => RunMode::Server,
            },
        };

        let bot = BotConfig {
            progress_messages: env.parse_or("BOT_PROGRESS_MESSAGES", true)?,
        };

        Ok(Self {
            telegram,
            stock: stock.build()?,
            server,
            bot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = StockConfig::default();
        assert_eq!(config.default_provider, DataProvider::Yahoo);
        assert_eq!(config.history_days, 30);
        assert_eq!(config.search_limit, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = StockConfig::builder()
            .default_provider(DataProvider::Yahoo)
            .request_timeout(Duration::from_secs(60))
            .news_limit(3)
            .build()
            .unwrap();

        assert_eq!(config.news_limit, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_key_selects_alpha_vantage() {
        let config = StockConfig::builder()
            .alpha_vantage_api_key("key")
            .build()
            .unwrap();
        assert_eq!(config.default_provider, DataProvider::AlphaVantage);

        let config = StockConfig::builder()
            .alpha_vantage_api_key("key")
            .default_provider(DataProvider::Yahoo)
            .build()
            .unwrap();
        assert_eq!(config.default_provider, DataProvider::Yahoo);
    }

    #[test]
    fn test_validation_alpha_vantage_no_key() {
        let config = StockConfig {
            default_provider: DataProvider::AlphaVantage,
            alpha_vantage_api_key: None,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let config = StockConfig {
            request_timeout: Duration::ZERO,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_app_config_requires_token() {
        let err = load(&[("PORT", "8080")]).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = load(&[("TELEGRAM_BOT_TOKEN", "123:abc")]).unwrap();
        assert_eq!(config.telegram.token, "123:abc");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.run_mode, RunMode::Server);
        assert_eq!(config.stock.default_provider, DataProvider::Yahoo);
        assert!(config.bot.progress_messages);
    }

    #[test]
    fn test_app_config_overrides() {
        let config = load(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("PORT", "8443"),
            ("RUN_MODE", "serverless"),
            ("STOCK_API_KEY", "av-key"),
            ("STOCK_REQUEST_TIMEOUT_SECS", "3"),
            ("BOT_PROGRESS_MESSAGES", "false"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 8443);
        assert_eq!(config.server.run_mode, RunMode::Serverless);
        assert_eq!(config.stock.default_provider, DataProvider::AlphaVantage);
        assert_eq!(config.stock.alpha_vantage_api_key.as_deref(), Some("av-key"));
        assert_eq!(config.stock.request_timeout, Duration::from_secs(3));
        assert!(!config.bot.progress_messages);
    }

    #[test]
    fn test_app_config_rejects_bad_values() {
        assert!(load(&[("TELEGRAM_BOT_TOKEN", "t"), ("PORT", "http")]).is_err());
        assert!(load(&[("TELEGRAM_BOT_TOKEN", "t"), ("RUN_MODE", "lambda")]).is_err());
        assert!(load(&[("TELEGRAM_BOT_TOKEN", "t"), ("STOCK_DATA_PROVIDER", "alpha_vantage")]).is_err());
    }

    #[test]
    fn test_provider_and_mode_parsing() {
        assert_eq!("Alpha-Vantage".parse::<DataProvider>().unwrap(), DataProvider::AlphaVantage);
        assert_eq!("yahoo".parse::<DataProvider>().unwrap(), DataProvider::Yahoo);
        assert_eq!("production".parse::<RunMode>().unwrap(), RunMode::Serverless);
    }
}
