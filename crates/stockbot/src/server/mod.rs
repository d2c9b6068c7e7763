//! Webhook HTTP server

pub mod handlers;

use crate::bot::StockBot;
use crate::error::Result;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use handlers::process_update;

/// Shared state for request handlers
#[derive(Clone)]
pub struct AppState {
    pub bot: Arc<StockBot>,
}

impl AppState {
    pub fn new(bot: StockBot) -> Self {
        Self { bot: Arc::new(bot) }
    }
}

/// Build the application router
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/webhook", post(handlers::webhook))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serverless entry point: read one webhook body from `input`, write the JSON
/// response line to `output` and return its status.
pub async fn run_once<R, W>(bot: &StockBot, mut input: R, mut output: W) -> Result<StatusCode>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut body = Vec::new();
    input.read_to_end(&mut body).await?;

    let (status, payload) = process_update(bot, &body).await;
    tracing::info!(status = status.as_u16(), "Processed webhook body");

    output.write_all(&serde_json::to_vec(&payload.0)?).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::provider::MockQuoteProvider;
    use crate::config::{BotConfig, StockConfig};
    use crate::interface::gateway::MockMessagingGateway;

    fn bot(gateway: MockMessagingGateway) -> StockBot {
        StockBot::new(
            Arc::new(MockQuoteProvider::new()),
            Arc::new(gateway),
            StockConfig::default(),
            BotConfig {
                progress_messages: false,
            },
        )
    }

    #[tokio::test]
    async fn test_run_once_rejects_non_json() {
        let mut gateway = MockMessagingGateway::new();
        gateway.expect_send_message().never();

        let mut output = Vec::new();
        let status = run_once(&bot(gateway), &b"not json"[..], &mut output)
            .await
            .unwrap();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(output, b"{\"error\":\"Internal server error\"}\n");
    }

    #[tokio::test]
    async fn test_run_once_acknowledges_update() {
        let mut gateway = MockMessagingGateway::new();
        gateway
            .expect_send_message()
            .withf(|chat_id, _| *chat_id == 3)
            .times(1)
            .returning(|_, _| Ok(()));

        let body = br#"{"update_id":1,"message":{"chat":{"id":3},"text":"/help"}}"#;
        let mut output = Vec::new();
        let status = run_once(&bot(gateway), &body[..], &mut output).await.unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(output, b"{\"status\":\"ok\"}\n");
    }

    #[tokio::test]
    async fn test_run_once_reports_undeliverable_reply() {
        let mut gateway = MockMessagingGateway::new();
        gateway
            .expect_send_message()
            .times(2)
            .returning(|_, _| Err(crate::StockError::GatewayError("Forbidden".to_string())));

        let body = br#"{"message":{"chat":{"id":3},"text":"/start"}}"#;
        let mut output = Vec::new();
        let status = run_once(&bot(gateway), &body[..], &mut output).await.unwrap();

        assert!(!status.is_success());
    }
}
