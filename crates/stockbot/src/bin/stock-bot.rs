//! Telegram Stock Bot server
//!
//! # Usage
//!
//! ```bash
//! export TELEGRAM_BOT_TOKEN="123456:ABC..."
//! # Optional: Alpha Vantage instead of Yahoo Finance
//! export STOCK_API_KEY="your-key"
//!
//! cargo run --bin stock-bot -p stockbot -- --port 8080
//!
//! # One webhook body per invocation
//! echo '{"message":{"chat":{"id":1},"text":"/help"}}' | stock-bot --mode serverless
//! ```

use anyhow::Context;
use clap::Parser;
use stockbot::server::{app_router, run_once, AppState};
use stockbot::{create_provider, AppConfig, RunMode, StockBot, TelegramGateway};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "stock-bot", version, about = "Telegram stock quote bot")]
struct Args {
    /// Listening port, overrides PORT
    #[arg(long)]
    port: Option<u16>,

    /// `server` or `serverless`, overrides RUN_MODE
    #[arg(long)]
    mode: Option<RunMode>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn serve(bot: StockBot, port: u16) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app_router(AppState::new(bot)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn serverless(bot: StockBot) -> anyhow::Result<()> {
    let status = run_once(&bot, tokio::io::stdin(), tokio::io::stdout())
        .await
        .context("failed to process webhook body")?;
    if !status.is_success() {
        anyhow::bail!("webhook processing failed with status {status}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let dotenv = stockbot_utils::load_dotenv();
    stockbot_utils::init_tracing();
    if let Some(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(mode) = args.mode {
        config.server.run_mode = mode;
    }

    let provider = create_provider(&config.stock)?;
    info!(provider = provider.name(), "Market data provider ready");

    let gateway = Arc::new(TelegramGateway::new(
        config.telegram,
        config.stock.request_timeout,
    )?);
    let bot = StockBot::new(provider, gateway, config.stock, config.bot);

    match config.server.run_mode {
        RunMode::Server => serve(bot, config.server.port).await,
        RunMode::Serverless => serverless(bot).await,
    }
}
