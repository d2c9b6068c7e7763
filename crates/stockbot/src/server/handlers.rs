//! HTTP handlers

use crate::bot::StockBot;
use crate::platforms::Update;
use crate::server::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, error};

pub const BOT_NAME: &str = "Telegram Stock Bot";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn ok() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

fn internal_error() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
}

/// Process one raw webhook body.
///
/// Shared by the HTTP route and the serverless entry point.
pub async fn process_update(bot: &StockBot, body: &[u8]) -> (StatusCode, Json<Value>) {
    let update = match Update::from_slice(body) {
        Ok(update) => update,
        Err(e) => {
            error!(error = %e, "Rejecting undecodable webhook body");
            return internal_error();
        }
    };

    let update_id = update.update_id;
    let Some(message) = update.into_incoming() else {
        debug!(?update_id, "Update carries no message");
        return ok();
    };

    match bot.handle_message(&message).await {
        Ok(()) => ok(),
        Err(e) => {
            error!(?update_id, error = %e, "Webhook processing failed");
            internal_error()
        }
    }
}

/// `POST /webhook`
pub async fn webhook(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
    process_update(&state.bot, &body).await
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "bot": BOT_NAME,
        "version": VERSION,
    }))
}

/// `GET /`
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Telegram Stock Bot API",
        "version": VERSION,
        "endpoints": {
            "webhook": "/webhook",
            "health": "/health",
        },
    }))
}
