//! Yahoo Finance API client
//!
//! Keyless provider backed by `yahoo_finance_api` for quotes, search and
//! history. The trending list is not covered by the library and is read from
//! the public `v1/finance/trending` endpoint directly.

use crate::api::provider::{Bar, Interval, Quote, QuoteProvider, SymbolMatch, TrendingEntry};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{instrument, warn};
use yahoo_finance_api as yahoo;

const TRENDING_URL: &str = "https://query1.finance.yahoo.com/v1/finance/trending";
const USER_AGENT: &str = concat!("stockbot/", env!("CARGO_PKG_VERSION"));

/// Yahoo Finance API client
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    finance: TrendingFinance,
}

#[derive(Debug, Deserialize)]
struct TrendingFinance {
    #[serde(default)]
    result: Vec<TrendingResult>,
}

#[derive(Debug, Deserialize)]
struct TrendingResult {
    #[serde(default)]
    quotes: Vec<TrendingQuote>,
}

#[derive(Debug, Deserialize)]
struct TrendingQuote {
    symbol: String,
}

/// Errors that mean "no data for this symbol" rather than a failed call.
/// Unknown tickers come back as an API error with code `Not Found`.
pub(crate) fn is_empty_result(err: &yahoo::YahooError) -> bool {
    match err {
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => true,
        yahoo::YahooError::ApiError(message) => message.code.as_deref() == Some("Not Found"),
        _ => false,
    }
}

fn to_offset(dt: DateTime<Utc>) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp(dt.timestamp())
        .map_err(|e| StockError::YahooFinanceError(format!("Invalid timestamp: {e}")))
}

/// Build a quote from the most recent daily bars; `None` without a usable close
pub(crate) fn quote_from_bars(symbol: &str, bars: &[yahoo::Quote]) -> Option<Quote> {
    let usable: Vec<&yahoo::Quote> = bars
        .iter()
        .filter(|q| q.close.is_finite() && q.close > 0.0)
        .collect();
    let last = *usable.last()?;

    // Change is measured against the prior close, or the session open for a lone bar
    let reference = if usable.len() >= 2 {
        usable[usable.len() - 2].close
    } else {
        last.open
    };
    let change = last.close - reference;
    let change_percent = if reference > 0.0 {
        change / reference * 100.0
    } else {
        0.0
    };

    Some(Quote {
        symbol: symbol.to_string(),
        price: last.close,
        change,
        change_percent,
        volume: last.volume,
        market_cap: None,
        trailing_pe: None,
    })
}

/// Convert library bars to provider-neutral bars, oldest first
pub(crate) fn bars_from_quotes(quotes: &[yahoo::Quote]) -> Vec<Bar> {
    let mut bars: Vec<Bar> = quotes
        .iter()
        .filter_map(|q| {
            let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
            Some(Bar {
                date,
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
            })
        })
        .collect();
    bars.sort_by_key(|bar| bar.date);
    bars
}

/// Decode the trending endpoint body
pub(crate) fn decode_trending(body: &str) -> Result<Vec<TrendingEntry>> {
    let response: TrendingResponse = serde_json::from_str(body)?;
    Ok(response
        .finance
        .result
        .into_iter()
        .flat_map(|r| r.quotes)
        .map(|q| TrendingEntry {
            name: q.symbol.clone(),
            symbol: q.symbol,
            price: None,
            change: None,
        })
        .collect())
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new(timeout: Duration) -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { connector, http })
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceClient {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    #[instrument(skip(self), fields(provider = "yahoo"))]
    async fn get_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let response = match self.connector.get_latest_quotes(symbol, "1d").await {
            Ok(response) => response,
            Err(e) if is_empty_result(&e) => return Ok(None),
            Err(e) => return Err(StockError::YahooFinanceError(e.to_string())),
        };

        match response.quotes() {
            Ok(bars) => Ok(quote_from_bars(symbol, &bars)),
            Err(e) if is_empty_result(&e) => Ok(None),
            Err(e) => Err(StockError::YahooFinanceError(e.to_string())),
        }
    }

    #[instrument(skip(self), fields(provider = "yahoo"))]
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let result = self
            .connector
            .search_ticker(query)
            .await
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        Ok(result
            .quotes
            .iter()
            .map(|item| SymbolMatch {
                symbol: item.symbol.clone(),
                name: if item.long_name.is_empty() {
                    item.short_name.clone()
                } else {
                    item.long_name.clone()
                },
                exchange: item.exchange.clone(),
                security_type: item.quote_type.clone(),
            })
            .collect())
    }

    #[instrument(skip(self), fields(provider = "yahoo"))]
    async fn get_historical(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<Bar>> {
        let response = match self
            .connector
            .get_quote_history_interval(symbol, to_offset(start)?, to_offset(end)?, interval.yahoo_code())
            .await
        {
            Ok(response) => response,
            Err(e) if is_empty_result(&e) => return Ok(Vec::new()),
            Err(e) => return Err(StockError::YahooFinanceError(e.to_string())),
        };

        match response.quotes() {
            Ok(quotes) => Ok(bars_from_quotes(&quotes)),
            Err(e) if is_empty_result(&e) => {
                warn!("No historical quotes returned for {symbol}");
                Ok(Vec::new())
            }
            Err(e) => Err(StockError::YahooFinanceError(e.to_string())),
        }
    }

    #[instrument(skip(self), fields(provider = "yahoo"))]
    async fn get_trending(&self, region: &str) -> Result<Vec<TrendingEntry>> {
        let response = self
            .http
            .get(format!("{TRENDING_URL}/{}", region.to_uppercase()))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StockError::YahooFinanceError(format!(
                "trending API error {status}: {body}"
            )));
        }

        decode_trending(&response.text().await?)
    }
}
