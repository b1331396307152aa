#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use investai::clients::{
    Brokerage, BrokerageError, CompletionProvider, GlobalQuote, IdentityError, IdentityProvider,
    LlmError, MarketData, MarketError, News, NewsArticle, NewsQuery,
};
use investai::config::Config;
use investai::services::SessionVerifier;
use investai::services::session::SessionClaims;
use investai::state::{Providers, SharedState};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-32-bytes-long";

// ============================================================================
// Fakes
// ============================================================================

pub struct FakeLlm {
    reply: Option<String>,
    delay: Duration,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a provider error.
    pub fn failing() -> Self {
        Self {
            reply: None,
            ..Self::replying("")
        }
    }

    pub fn slow(reply: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::replying(reply)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for FakeLlm {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.reply {
            Some(reply) if reply.trim().is_empty() => Err(LlmError::EmptyResponse),
            Some(reply) => Ok(reply.clone()),
            None => Err(LlmError::ApiError {
                status: 500,
                body: "upstream exploded".to_string(),
            }),
        }
    }

    fn model(&self) -> &str {
        "fake-model"
    }
}

#[derive(Default)]
pub struct FakeMarket {
    pub quotes: HashMap<String, GlobalQuote>,
    pub search_payload: Option<Value>,
    pub search_status: Option<u16>,
    pub quote_status: Option<u16>,
}

impl FakeMarket {
    pub fn with_quote(mut self, symbol: &str, price: &str) -> Self {
        self.quotes.insert(symbol.to_string(), quote(symbol, price));
        self
    }

    pub fn with_best_match(mut self, symbol: &str) -> Self {
        self.search_payload = Some(json!({
            "bestMatches": [{ "1. symbol": symbol, "2. name": format!("{symbol} Inc") }]
        }));
        self
    }
}

pub fn quote(symbol: &str, price: &str) -> GlobalQuote {
    GlobalQuote {
        symbol: symbol.to_string(),
        open: "100.00".to_string(),
        high: "110.00".to_string(),
        low: "95.00".to_string(),
        price: price.to_string(),
        volume: "123456".to_string(),
        latest_trading_day: "2024-11-29".to_string(),
        previous_close: "101.00".to_string(),
        change: "1.00".to_string(),
        change_percent: "0.99%".to_string(),
    }
}

#[async_trait]
impl MarketData for FakeMarket {
    async fn global_quote(&self, symbol: &str) -> Result<Option<GlobalQuote>, MarketError> {
        if let Some(status) = self.quote_status {
            return Err(MarketError::Status(status));
        }
        Ok(self.quotes.get(symbol).cloned())
    }

    async fn symbol_search(&self, _keywords: &str) -> Result<Value, MarketError> {
        if let Some(status) = self.search_status {
            return Err(MarketError::Status(status));
        }
        Ok(self
            .search_payload
            .clone()
            .unwrap_or_else(|| json!({ "bestMatches": [] })))
    }
}

#[derive(Default)]
pub struct FakeBrokerage {
    pub missing_credentials: bool,
    pub fail_status: Option<u16>,
    pub stream_error: bool,
    pub articles: Vec<NewsArticle>,
    pub stream_items: Vec<Value>,
    pub last_query: Mutex<Option<NewsQuery>>,
}

impl FakeBrokerage {
    fn check(&self) -> Result<(), BrokerageError> {
        if self.missing_credentials {
            return Err(BrokerageError::MissingCredentials);
        }
        if let Some(status) = self.fail_status {
            return Err(BrokerageError::Status {
                status,
                body: format!("{{\"message\":\"status {status}\"}}"),
            });
        }
        Ok(())
    }

    pub fn last_query(&self) -> Option<NewsQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

pub fn article(id: i64, headline: &str) -> NewsArticle {
    NewsArticle {
        id,
        headline: headline.to_string(),
        author: "Benzinga Newsdesk".to_string(),
        created_at: "2024-11-29T14:00:00Z".to_string(),
        updated_at: "2024-11-29T14:00:00Z".to_string(),
        summary: "<p>Summary &amp; more</p>".to_string(),
        content: String::new(),
        url: Some(format!("https://example.com/news/{id}")),
        images: Vec::new(),
        symbols: vec!["AAPL".to_string()],
        source: "benzinga".to_string(),
    }
}

#[async_trait]
impl Brokerage for FakeBrokerage {
    async fn account(&self) -> Result<Value, BrokerageError> {
        self.check()?;
        Ok(json!({ "id": "acct-1", "status": "ACTIVE", "cash": "1000.00" }))
    }

    async fn portfolio_history(&self) -> Result<Value, BrokerageError> {
        self.check()?;
        Ok(json!({ "timestamp": [1, 2], "equity": [1000.0, 1010.5], "timeframe": "1D" }))
    }

    async fn positions(&self) -> Result<Value, BrokerageError> {
        self.check()?;
        Ok(json!([{ "symbol": "AAPL", "qty": "3" }]))
    }

    async fn news(&self, query: &NewsQuery) -> Result<News, BrokerageError> {
        *self.last_query.lock().unwrap() = Some(query.clone());
        self.check()?;
        Ok(News {
            news: self.articles.clone(),
            next_page_token: None,
        })
    }

    async fn stream_news(&self, _symbols: &[String], limit: usize) -> Result<Vec<Value>, BrokerageError> {
        if self.missing_credentials {
            return Err(BrokerageError::MissingCredentials);
        }
        if self.stream_error {
            return Err(BrokerageError::Stream("auth failed".to_string()));
        }
        if self.stream_items.is_empty() {
            return Err(BrokerageError::NoNews);
        }
        Ok(self.stream_items.iter().take(limit).cloned().collect())
    }
}

#[derive(Default)]
pub struct FakeIdentity {
    pub email: Option<String>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn primary_email(&self, _user_id: &str) -> Result<Option<String>, IdentityError> {
        Ok(self.email.clone())
    }
}

// ============================================================================
// App
// ============================================================================

pub struct Fakes {
    pub investment_llm: Arc<FakeLlm>,
    pub general_llm: Arc<FakeLlm>,
    pub market: Arc<FakeMarket>,
    pub brokerage: Arc<FakeBrokerage>,
    pub identity: Arc<FakeIdentity>,
}

impl Default for Fakes {
    fn default() -> Self {
        Self {
            investment_llm: Arc::new(FakeLlm::replying("{}")),
            general_llm: Arc::new(FakeLlm::replying("General answer.")),
            market: Arc::new(FakeMarket::default()),
            brokerage: Arc::new(FakeBrokerage::default()),
            identity: Arc::new(FakeIdentity::default()),
        }
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.general.database_url = "sqlite::memory:".to_string();
    config
}

pub async fn spawn_app() -> Router {
    spawn_app_with(Fakes::default()).await
}

pub async fn spawn_app_with(fakes: Fakes) -> Router {
    spawn_app_with_config(test_config(), fakes).await
}

pub async fn spawn_app_with_config(config: Config, fakes: Fakes) -> Router {
    spawn_app_full(config, fakes, None).await
}

pub async fn spawn_app_with_metrics(handle: PrometheusHandle) -> Router {
    spawn_app_full(test_config(), Fakes::default(), Some(handle)).await
}

async fn spawn_app_full(config: Config, fakes: Fakes, handle: Option<PrometheusHandle>) -> Router {
    let providers = Providers {
        investment_llm: fakes.investment_llm,
        general_llm: fakes.general_llm,
        market: fakes.market,
        brokerage: fakes.brokerage,
        identity: fakes.identity,
    };

    let shared = SharedState::with_providers(
        config,
        providers,
        SessionVerifier::with_shared_secret(SECRET),
    )
    .await
    .expect("Failed to create shared state");

    let state = investai::api::create_app_state(Arc::new(shared), handle);
    investai::api::router(state)
}

// ============================================================================
// Requests
// ============================================================================

pub fn token(user_id: &str, email: Option<&str>) -> String {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
        email: email.map(ToString::to_string),
        sid: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    post_raw(uri, &body.to_string(), token)
}

pub fn post_raw(uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
    };
    (status, json)
}
