//! Response formatting
//!
//! Pure functions from provider results to Telegram Markdown text. Monetary
//! values are rounded half away from zero on decimals, never on binary floats,
//! so a close of `105.005` against `100.00` reads as `+$5.01`.

use crate::api::{Bar, Quote, SymbolMatch, TrendingEntry};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::*;

pub const HELP_HINT: &str = "❌ Unknown command. Type /help for the list of commands.";
pub const GENERIC_ERROR: &str = "❌ Something went wrong. Please try again later.";
pub const PRICE_USAGE: &str = "❌ Please provide a stock symbol.\nExample: /price AAPL";
pub const SEARCH_USAGE: &str = "❌ Please provide a company name.\nExample: /search Apple Inc";
pub const CHART_USAGE: &str = "❌ Please provide a stock symbol.\nExample: /chart AAPL";
pub const PRICE_FAILED: &str =
    "❌ An error occurred while fetching the price. Please try again later.";
pub const SEARCH_FAILED: &str =
    "❌ An error occurred while searching. Please try again later.";
pub const CHART_FAILED: &str =
    "❌ An error occurred while fetching chart data. Please try again later.";
pub const NEWS_FAILED: &str =
    "❌ An error occurred while fetching market news. Please try again later.";
pub const NEWS_UNAVAILABLE: &str =
    "❌ Market data is not available right now. Please try again later.";
pub const MORE_NEWS_URL: &str = "https://finance.yahoo.com/news/";

const COMMANDS: [(&str, &str); 7] = [
    ("/start", "Start the bot"),
    ("/help", "Show this help"),
    ("/price <symbol>", "Latest stock price (e.g. /price AAPL)"),
    ("/search <company>", "Search for a company (e.g. /search Apple)"),
    ("/chart <symbol>", "30 day price summary (e.g. /chart TSLA)"),
    ("/portfolio", "View your portfolio"),
    ("/news", "Trending market symbols"),
];

/// Escape characters that legacy Telegram Markdown would treat as markup
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Bold `text` when it is free of markup characters, otherwise escape it.
///
/// Legacy Markdown ignores `\` escapes inside an entity, so escaped text must
/// stay outside `*...*`.
pub fn emphasize(text: &str) -> String {
    if text.contains(['_', '*', '`', '[']) {
        escape_markdown(text)
    } else {
        format!("*{text}*")
    }
}

/// Convert through the shortest round-trip text so `105.005` stays `105.005`
fn to_decimal(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
        .unwrap_or_default()
}

/// Round to cents, half away from zero
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `1234.5` as `1234.50`
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", round2(to_decimal(value)))
}

fn signed(value: Decimal) -> String {
    if value.is_sign_negative() && !value.is_zero() {
        format!("-{:.2}", value.abs())
    } else {
        format!("+{value:.2}")
    }
}

fn signed_money(value: Decimal) -> String {
    if value.is_sign_negative() && !value.is_zero() {
        format!("-${:.2}", value.abs())
    } else {
        format!("+${value:.2}")
    }
}

fn trend_icon(value: Decimal) -> &'static str {
    if value.is_sign_negative() && !value.is_zero() {
        "📉"
    } else {
        "📈"
    }
}

/// `1234567` as `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Compact market cap: `2.85T`, `812.34B`, `45.10M`
pub fn format_market_cap(value: f64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e12, "T"), (1e9, "B"), (1e6, "M")];
    for (scale, suffix) in UNITS {
        if value.abs() >= scale {
            return format!("{}{suffix}", format_amount(value / scale));
        }
    }
    format_amount(value)
}

pub fn welcome_text() -> String {
    "🚀 *Welcome to the US Stock Market Bot!*\n\n\
     With this bot you can:\n\
     • 📈 Track stock prices\n\
     • 🔍 Search for companies\n\
     • 📊 See 30 day price summaries\n\
     • 📰 Follow trending market symbols\n\
     • 💼 Manage your portfolio\n\n\
     Type /help to see the commands."
        .to_string()
}

pub fn help_text() -> String {
    let mut text = String::from("📋 *Available Commands:*\n\n");
    for (command, description) in COMMANDS {
        text.push_str(&format!("{} - {description}\n", escape_markdown(command)));
    }
    text.push_str(
        "\n💡 *Examples:*\n\
         • /price AAPL - Apple stock price\n\
         • /search Tesla - Find Tesla listings\n\
         • /news - What the market is watching",
    );
    text
}

pub fn portfolio_text() -> String {
    "💼 *Portfolio Management*\n\n\
     This feature is under development.\n\n\
     🚧 Coming soon:\n\
     • Add and remove holdings\n\
     • Portfolio tracking\n\
     • Profit and loss\n\
     • Charts"
        .to_string()
}

pub fn price_progress(symbol: &str) -> String {
    format!("🔍 Looking up {}...", emphasize(symbol))
}

pub fn search_progress(query: &str) -> String {
    format!("🔍 Searching for {}...", emphasize(query))
}

pub fn chart_progress(symbol: &str) -> String {
    format!("📈 Loading price history for {}...", emphasize(symbol))
}

pub fn news_progress() -> String {
    "📰 *Fetching market news...*".to_string()
}

pub fn quote_not_found(symbol: &str) -> String {
    format!("❌ No data found for {symbol}.")
}

pub fn no_search_results(query: &str) -> String {
    format!("❌ No results found for \"{query}\".")
}

pub fn no_chart_data(symbol: &str) -> String {
    format!("❌ No price history available for {symbol}.")
}

/// Quote card
pub fn format_quote(quote: &Quote, now: DateTime<Utc>) -> String {
    let change = round2(to_decimal(quote.change));
    let change_percent = round2(to_decimal(quote.change_percent));
    let symbol = emphasize(&quote.symbol);

    let mut text = format!(
        "📊 *Stock Quote:* {symbol}\n\n\
         💰 *Price:* ${}\n\
         {} *Change:* {} ({}%)\n\
         📊 *Volume:* {}\n",
        format_amount(quote.price),
        trend_icon(change),
        signed_money(change),
        signed(change_percent),
        group_thousands(quote.volume),
    );
    if let Some(market_cap) = quote.market_cap {
        text.push_str(&format!("🏦 *Market Cap:* ${}\n", format_market_cap(market_cap)));
    }
    if let Some(pe) = quote.trailing_pe {
        text.push_str(&format!("📐 *P/E (TTM):* {}\n", format_amount(pe)));
    }
    text.push_str(&format!("🕐 *Updated:* {}", now.format("%Y-%m-%d %H:%M UTC")));
    text
}

/// Ranked search matches followed by a price lookup hint
pub fn format_search_results(query: &str, matches: &[SymbolMatch], limit: usize) -> String {
    let mut text = format!("🔍 *Results for:* \"{}\"\n\n", escape_markdown(query));
    for (index, m) in matches.iter().take(limit).enumerate() {
        text.push_str(&format!(
            "{}. {} - {}\n   📍 {} | 💼 {}\n\n",
            index + 1,
            emphasize(&m.symbol),
            escape_markdown(&m.name),
            escape_markdown(&m.exchange),
            escape_markdown(&m.security_type),
        ));
    }
    text.push_str("💡 For a price quote: /price <symbol>");
    text
}

/// Summary statistics over a bar series
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSummary {
    pub latest_close: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub average_volume: u64,
    pub sessions: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl ChartSummary {
    /// Summarize bars ordered oldest to newest; `None` for an empty series
    pub fn from_bars(bars: &[Bar]) -> Option<Self> {
        let first = bars.first()?;
        let last = bars.last()?;

        let first_close = to_decimal(first.close);
        let latest_close = to_decimal(last.close);
        let change = latest_close - first_close;
        let change_percent = change
            .checked_div(first_close)
            .map(|ratio| ratio * Decimal::ONE_HUNDRED)
            .unwrap_or_default();

        let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        let total_volume: u128 = bars.iter().map(|b| u128::from(b.volume)).sum();
        let count = bars.len() as u128;
        let average_volume = u64::try_from((total_volume + count / 2) / count).unwrap_or(u64::MAX);

        Some(Self {
            latest_close: round2(latest_close),
            change: round2(change),
            change_percent: round2(change_percent),
            high: round2(to_decimal(high)),
            low: round2(to_decimal(low)),
            average_volume,
            sessions: bars.len(),
            first_date: first.date,
            last_date: last.date,
        })
    }
}

/// Chart summary card
pub fn format_chart(symbol: &str, summary: &ChartSummary, window_days: i64) -> String {
    format!(
        "📈 *{window_days} Day Summary:* {symbol}\n\n\
         💰 *Latest Close:* ${:.2}\n\
         {} *{window_days}D Change:* {} ({}%)\n\
         ⬆️ *Period High:* ${:.2}\n\
         ⬇️ *Period Low:* ${:.2}\n\
         📦 *Avg Volume:* {}\n\
         🗓 {} → {} ({} sessions)",
        summary.latest_close,
        trend_icon(summary.change),
        signed_money(summary.change),
        signed(summary.change_percent),
        summary.high,
        summary.low,
        group_thousands(summary.average_volume),
        summary.first_date,
        summary.last_date,
        summary.sessions,
        symbol = emphasize(symbol),
    )
}

/// Trending list with a pointer to more news
pub fn format_trending(region: &str, entries: &[TrendingEntry], limit: usize) -> String {
    let mut text = format!("🔥 *Trending now:* {} market\n\n", escape_markdown(region));
    for (index, entry) in entries.iter().take(limit).enumerate() {
        text.push_str(&format!("{}. {}", index + 1, emphasize(&entry.symbol)));
        if entry.name != entry.symbol && !entry.name.is_empty() {
            text.push_str(&format!(" - {}", escape_markdown(&entry.name)));
        }
        if let Some(price) = entry.price {
            text.push_str(&format!("  ${}", format_amount(price)));
        }
        if let Some(change) = entry.change {
            text.push_str(&format!(" ({})", signed(round2(to_decimal(change)))));
        }
        text.push_str(&format!(
            "\n   🔗 [Details](https://finance.yahoo.com/quote/{})\n\n",
            entry.symbol
        ));
    }
    text.push_str(&format!("📊 More market news: {MORE_NEWS_URL}"));
    text
}
