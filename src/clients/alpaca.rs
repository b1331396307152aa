use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::Brokerage;
use crate::config::AlpacaConfig;

#[derive(Error, Debug)]
pub enum BrokerageError {
    #[error("Missing Alpaca API credentials")]
    MissingCredentials,

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Alpaca API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("News stream error: {0}")]
    Stream(String),

    #[error("No news received")]
    NoNews,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    #[serde(default)]
    pub news: Vec<NewsArticle>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: i64,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub images: Vec<NewsImage>,
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsImage {
    /// `thumb`, `small` or `large`
    pub size: String,
    pub url: String,
}

/// Filters accepted by the historical news endpoint.
#[derive(Debug, Clone, Default)]
pub struct NewsQuery {
    /// Comma separated; `None` means every symbol.
    pub symbols: Option<String>,
    pub limit: Option<u32>,
    /// `asc` or `desc`
    pub sort: Option<String>,
}

impl NewsQuery {
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(symbols) = &self.symbols {
            params.push(("symbols", symbols.clone()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort", sort.clone()));
        }

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

pub struct AlpacaClient {
    client: Client,
    config: AlpacaConfig,
}

impl AlpacaClient {
    #[must_use]
    pub const fn with_shared_client(client: Client, config: AlpacaConfig) -> Self {
        Self { client, config }
    }

    fn credentials(&self) -> Result<(&str, &str), BrokerageError> {
        self.config
            .credentials()
            .ok_or(BrokerageError::MissingCredentials)
    }

    async fn get_json(&self, url: &str) -> Result<Value, BrokerageError> {
        let (key_id, secret) = self.credentials()?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .header("APCA-API-KEY-ID", key_id)
            .header("APCA-API-SECRET-KEY", secret)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BrokerageError::Status { status, body });
        }

        Ok(response.json().await?)
    }

    fn trading_url(&self, path: &str) -> String {
        format!("{}{}", self.config.trading_base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Brokerage for AlpacaClient {
    async fn account(&self) -> Result<Value, BrokerageError> {
        self.get_json(&self.trading_url("/v2/account")).await
    }

    async fn portfolio_history(&self) -> Result<Value, BrokerageError> {
        self.get_json(&self.trading_url("/v2/account/portfolio/history"))
            .await
    }

    async fn positions(&self) -> Result<Value, BrokerageError> {
        self.get_json(&self.trading_url("/v2/positions")).await
    }

    async fn news(&self, query: &NewsQuery) -> Result<News, BrokerageError> {
        let mut url = format!(
            "{}/v1beta1/news",
            self.config.data_base_url.trim_end_matches('/')
        );
        let qs = query.to_query_string();
        if !qs.is_empty() {
            url.push('?');
            url.push_str(&qs);
        }

        let payload = self.get_json(&url).await?;
        serde_json::from_value(payload).map_err(|e| BrokerageError::Status {
            status: 502,
            body: format!("Unexpected news payload: {e}"),
        })
    }

    async fn stream_news(
        &self,
        symbols: &[String],
        limit: usize,
    ) -> Result<Vec<Value>, BrokerageError> {
        let (key_id, secret) = self.credentials()?;
        super::alpaca_stream::collect_news(
            &self.config.news_ws_url,
            key_id,
            secret,
            symbols,
            limit,
            Duration::from_secs(self.config.stream_timeout_seconds),
        )
        .await
    }
}
