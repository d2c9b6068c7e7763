//! Alpha Vantage API client
//!
//! Keyed REST provider. Alpha Vantage reports most numbers as strings under
//! numbered keys (`"05. price"`); the `decode_*` functions turn those payloads
//! into the provider-neutral types.

use crate::api::provider::{Bar, Interval, Quote, QuoteProvider, SymbolMatch, TrendingEntry};
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteEnvelope {
    #[serde(rename = "Global Quote", default)]
    quote: Option<GlobalQuote>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "06. volume")]
    volume: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "bestMatches", default)]
    best_matches: Vec<SearchMatch>,
}

#[derive(Debug, Deserialize)]
struct SearchMatch {
    #[serde(rename = "1. symbol")]
    symbol: String,
    #[serde(rename = "2. name", default)]
    name: String,
    #[serde(rename = "3. type", default)]
    asset_type: String,
    #[serde(rename = "4. region", default)]
    region: String,
}

#[derive(Debug, Deserialize)]
struct SeriesPoint {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

#[derive(Debug, Deserialize)]
struct MoversEnvelope {
    #[serde(default)]
    most_actively_traded: Vec<Mover>,
}

#[derive(Debug, Deserialize)]
struct Mover {
    ticker: String,
    price: Option<String>,
    change_amount: Option<String>,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `timeout` - Upper bound for each HTTP request
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Call one Alpha Vantage function and return the checked JSON body
    async fn fetch(&self, function: &str, params: &[(&str, &str)]) -> Result<Value> {
        let mut query = vec![("function", function), ("apikey", self.api_key.as_str())];
        query.extend_from_slice(params);

        let response = self.client.get(BASE_URL).query(&query).send().await?;

        if !response.status().is_success() {
            return Err(StockError::AlphaVantageError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: Value = response.json().await?;
        check_api_errors(&data)?;
        Ok(data)
    }
}

/// Reject Alpha Vantage's in-band error payloads
fn check_api_errors(data: &Value) -> Result<()> {
    if let Some(error) = data.get("Error Message") {
        return Err(StockError::AlphaVantageError(error.to_string()));
    }

    // Free-tier throttling arrives as "Note" or "Information"
    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(StockError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        });
    }

    Ok(())
}

fn parse_number(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .trim_end_matches('%')
        .parse()
        .map_err(|_| StockError::AlphaVantageError(format!("invalid {field}: {raw:?}")))
}

fn parse_volume(raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| StockError::AlphaVantageError(format!("invalid volume: {raw:?}")))
}

/// Decode a `GLOBAL_QUOTE` payload; an empty or priceless quote is `None`
pub(crate) fn decode_global_quote(symbol: &str, data: Value) -> Result<Option<Quote>> {
    let envelope: GlobalQuoteEnvelope = serde_json::from_value(data)?;
    let Some(quote) = envelope.quote else {
        return Ok(None);
    };
    let Some(price) = quote.price.as_deref().and_then(|p| p.trim().parse::<f64>().ok()) else {
        return Ok(None);
    };

    Ok(Some(Quote {
        symbol: quote.symbol.unwrap_or_else(|| symbol.to_string()),
        price,
        change: quote
            .change
            .as_deref()
            .map(|c| parse_number("change", c))
            .transpose()?
            .unwrap_or_default(),
        change_percent: quote
            .change_percent
            .as_deref()
            .map(|c| parse_number("change percent", c))
            .transpose()?
            .unwrap_or_default(),
        volume: quote
            .volume
            .as_deref()
            .map(parse_volume)
            .transpose()?
            .unwrap_or_default(),
        market_cap: None,
        trailing_pe: None,
    }))
}

/// Decode a `SYMBOL_SEARCH` payload, keeping provider order
pub(crate) fn decode_search(data: Value) -> Result<Vec<SymbolMatch>> {
    let envelope: SearchEnvelope = serde_json::from_value(data)?;
    Ok(envelope
        .best_matches
        .into_iter()
        .map(|m| SymbolMatch {
            symbol: m.symbol,
            name: m.name,
            exchange: m.region,
            security_type: m.asset_type,
        })
        .collect())
}

/// Decode a daily or weekly time series into bars within `[start, end]`, oldest first
pub(crate) fn decode_series(
    data: &Value,
    interval: Interval,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Bar>> {
    let series_key = match interval {
        Interval::Daily => "Time Series (Daily)",
        Interval::Weekly => "Weekly Time Series",
    };

    // A symbol with no history comes back without the series key
    let Some(series) = data.get(series_key) else {
        return Ok(Vec::new());
    };
    let points: BTreeMap<String, SeriesPoint> = serde_json::from_value(series.clone())?;

    let mut bars = Vec::with_capacity(points.len());
    for (timestamp, point) in points {
        let date = NaiveDate::parse_from_str(&timestamp, "%Y-%m-%d").map_err(|e| {
            StockError::AlphaVantageError(format!("invalid date {timestamp:?}: {e}"))
        })?;
        if date < start || date > end {
            continue;
        }

        bars.push(Bar {
            date,
            open: parse_number("open", &point.open)?,
            high: parse_number("high", &point.high)?,
            low: parse_number("low", &point.low)?,
            close: parse_number("close", &point.close)?,
            volume: parse_volume(&point.volume)?,
        });
    }

    bars.sort_by_key(|bar| bar.date);
    Ok(bars)
}

/// Decode `TOP_GAINERS_LOSERS`, using the most actively traded list
pub(crate) fn decode_trending(data: Value) -> Result<Vec<TrendingEntry>> {
    let envelope: MoversEnvelope = serde_json::from_value(data)?;
    Ok(envelope
        .most_actively_traded
        .into_iter()
        .map(|m| TrendingEntry {
            name: m.ticker.clone(),
            symbol: m.ticker,
            price: m.price.as_deref().and_then(|p| p.trim().parse().ok()),
            change: m.change_amount.as_deref().and_then(|c| c.trim().parse().ok()),
        })
        .collect())
}

#[async_trait]
impl QuoteProvider for AlphaVantageClient {
    fn name(&self) -> &'static str {
        "alpha_vantage"
    }

    #[instrument(skip(self), fields(provider = "alpha_vantage"))]
    async fn get_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let data = self.fetch("GLOBAL_QUOTE", &[("symbol", symbol)]).await?;
        decode_global_quote(symbol, data)
    }

    #[instrument(skip(self), fields(provider = "alpha_vantage"))]
    async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>> {
        let data = self.fetch("SYMBOL_SEARCH", &[("keywords", query)]).await?;
        decode_search(data)
    }

    #[instrument(skip(self), fields(provider = "alpha_vantage"))]
    async fn get_historical(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<Bar>> {
        let function = match interval {
            Interval::Daily => "TIME_SERIES_DAILY",
            Interval::Weekly => "TIME_SERIES_WEEKLY",
        };
        let data = self.fetch(function, &[("symbol", symbol)]).await?;
        decode_series(&data, interval, start.date_naive(), end.date_naive())
    }

    #[instrument(skip(self), fields(provider = "alpha_vantage"))]
    async fn get_trending(&self, region: &str) -> Result<Vec<TrendingEntry>> {
        if !region.eq_ignore_ascii_case("US") {
            debug!("Alpha Vantage movers are US-only, ignoring region {region}");
        }
        let data = self.fetch("TOP_GAINERS_LOSERS", &[]).await?;
        decode_trending(data)
    }
}
