//! Provider-neutral market data types and the client trait
//!
//! Provider clients translate their own JSON shapes into these structs; nothing
//! outside `crate::api` sees a provider field name.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Current trading snapshot for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
}

/// One symbol search hit, in provider-ranked order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub security_type: String,
}

/// One trading period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// A symbol the provider currently surfaces as notable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub symbol: String,
    pub name: String,
    pub price: Option<f64>,
    pub change: Option<f64>,
}

/// Bar granularity for historical lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
}

impl Interval {
    /// Yahoo chart interval code
    pub fn yahoo_code(self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
        }
    }
}

/// Client for one external market data API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Latest quote; `Ok(None)` when the provider has no usable price
    async fn get_quote(&self, symbol: &str) -> Result<Option<Quote>>;

    /// Symbol search, best match first
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>>;

    /// Bars between `start` and `end`, oldest first
    async fn get_historical(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<Bar>>;

    /// Currently trending symbols for a market region
    async fn get_trending(&self, region: &str) -> Result<Vec<TrendingEntry>>;
}
