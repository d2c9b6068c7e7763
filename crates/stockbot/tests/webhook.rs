use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use mockall::mock;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use stockbot::api::{Bar, Interval, Quote, SymbolMatch, TrendingEntry};
use stockbot::interface::ChatId;
use stockbot::server::{app_router, AppState};
use stockbot::{
    BotConfig, MessagingGateway, OutgoingMessage, QuoteProvider, Result, StockBot, StockConfig,
    StockError,
};
use tower::ServiceExt;

mock! {
    pub Provider {}

    #[async_trait]
    impl QuoteProvider for Provider {
        fn name(&self) -> &'static str;
        async fn get_quote(&self, symbol: &str) -> Result<Option<Quote>>;
        async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolMatch>>;
        async fn get_historical(
            &self,
            symbol: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
            interval: Interval,
        ) -> Result<Vec<Bar>>;
        async fn get_trending(&self, region: &str) -> Result<Vec<TrendingEntry>>;
    }
}

#[derive(Default)]
struct RecordingGateway {
    sent: Mutex<Vec<(ChatId, OutgoingMessage)>>,
    fail: bool,
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send_message(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<()> {
        if self.fail {
            return Err(StockError::GatewayError("Forbidden: bot was blocked".to_string()));
        }
        self.sent.lock().unwrap().push((chat_id, message.clone()));
        Ok(())
    }
}

fn app(provider: MockProvider, gateway: Arc<RecordingGateway>) -> Router {
    let bot = StockBot::new(
        Arc::new(provider),
        gateway,
        StockConfig::default(),
        BotConfig {
            progress_messages: false,
        },
    );
    app_router(AppState::new(bot))
}

async fn post_webhook(app: Router, body: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn apple_matches() -> Vec<SymbolMatch> {
    vec![
        SymbolMatch {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            exchange: "NASDAQ".to_string(),
            security_type: "Equity".to_string(),
        },
        SymbolMatch {
            symbol: "APLE".to_string(),
            name: "Apple Hospitality REIT, Inc.".to_string(),
            exchange: "NYSE".to_string(),
            security_type: "Equity".to_string(),
        },
    ]
}

#[tokio::test]
async fn search_replies_with_ranked_matches() {
    let mut provider = MockProvider::new();
    provider
        .expect_search_symbols()
        .withf(|query| query == "Apple")
        .times(1)
        .returning(|_| Ok(apple_matches()));

    let gateway = Arc::new(RecordingGateway::default());
    let (status, body) = post_webhook(
        app(provider, gateway.clone()),
        r#"{"update_id":10,"message":{"message_id":1,"chat":{"id":4242},"text":"/search Apple"}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "status": "ok" }));

    let sent = gateway.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (chat_id, message) = &sent[0];
    assert_eq!(*chat_id, 4242);

    let first = message.text.find("*AAPL* - Apple Inc.").unwrap();
    let second = message.text.find("*APLE* - Apple Hospitality REIT, Inc.").unwrap();
    assert!(first < second);
    assert!(message.text.trim_end().ends_with("/price <symbol>"));
}

#[tokio::test]
async fn empty_text_is_acknowledged_without_reply() {
    let gateway = Arc::new(RecordingGateway::default());
    let (status, body) = post_webhook(
        app(MockProvider::new(), gateway.clone()),
        r#"{"update_id":11,"message":{"chat":{"id":1},"text":""}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(gateway.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn update_without_message_is_acknowledged() {
    let gateway = Arc::new(RecordingGateway::default());
    let (status, _) = post_webhook(
        app(MockProvider::new(), gateway.clone()),
        r#"{"update_id":12,"callback_query":{"id":"1"}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(gateway.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_json_body_is_internal_error() {
    let gateway = Arc::new(RecordingGateway::default());
    let (status, body) = post_webhook(app(MockProvider::new(), gateway.clone()), "not json").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, serde_json::json!({ "error": "Internal server error" }));
    assert!(gateway.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn undeliverable_reply_is_internal_error() {
    let gateway = Arc::new(RecordingGateway {
        fail: true,
        ..RecordingGateway::default()
    });
    let (status, body) = post_webhook(
        app(MockProvider::new(), gateway),
        r#"{"message":{"chat":{"id":1},"text":"/help"}}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
}

#[tokio::test]
async fn provider_failure_keeps_serving() {
    let mut provider = MockProvider::new();
    provider
        .expect_get_quote()
        .times(2)
        .returning(|_| Err(StockError::YahooFinanceError("connection reset".to_string())));

    let gateway = Arc::new(RecordingGateway::default());
    let app = app(provider, gateway.clone());
    let body = r#"{"message":{"chat":{"id":9},"text":"/price AAPL"}}"#;

    for _ in 0..2 {
        let (status, _) = post_webhook(app.clone(), body).await;
        assert_eq!(status, StatusCode::OK);
    }

    let sent = gateway.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].1, sent[1].1);
}

#[tokio::test]
async fn health_reports_status_and_version() {
    let gateway = Arc::new(RecordingGateway::default());
    let (status, body) = get_json(app(MockProvider::new(), gateway), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["bot"], "Telegram Stock Bot");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn index_lists_endpoints() {
    let gateway = Arc::new(RecordingGateway::default());
    let (status, body) = get_json(app(MockProvider::new(), gateway), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Telegram Stock Bot API");
    assert_eq!(body["endpoints"]["webhook"], "/webhook");
    assert_eq!(body["endpoints"]["health"], "/health");
}
