use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::clients::{Brokerage, BrokerageError, News, NewsArticle, NewsQuery};
use crate::parser::html::sanitize_text;

/// Symbols shown on the dashboard ticker strip.
pub const DASHBOARD_SYMBOLS: &str = "AAPL,TSLA";

pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsMode {
    Historical,
    Realtime,
}

impl NewsMode {
    /// Anything other than `historical` means realtime.
    #[must_use]
    pub fn parse(mode: Option<&str>) -> Self {
        match mode.map(str::trim) {
            Some(m) if m.eq_ignore_ascii_case("historical") => Self::Historical,
            _ => Self::Realtime,
        }
    }
}

/// Splits the `symbols` query value; `*` or blank means every symbol.
#[must_use]
pub fn parse_symbols(symbols: Option<&str>) -> Vec<String> {
    let list: Vec<String> = symbols
        .unwrap_or("*")
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    if list.is_empty() || list.iter().any(|s| s == "*") {
        vec!["*".to_string()]
    } else {
        list
    }
}

#[must_use]
pub fn clamp_limit(limit: Option<i64>) -> u32 {
    let limit = limit
        .unwrap_or(i64::from(DEFAULT_LIMIT))
        .clamp(1, i64::from(MAX_LIMIT));
    u32::try_from(limit).unwrap_or(MAX_LIMIT)
}

fn sanitize_article(mut article: NewsArticle) -> NewsArticle {
    article.headline = sanitize_text(&article.headline);
    article.summary = sanitize_text(&article.summary);
    article.content = sanitize_text(&article.content);
    article
}

fn sanitize_stream_message(mut message: Value) -> Value {
    for key in ["headline", "summary", "content"] {
        if let Some(Value::String(text)) = message.get_mut(key) {
            *text = sanitize_text(text);
        }
    }
    message
}

pub struct NewsService {
    brokerage: Arc<dyn Brokerage>,
}

impl NewsService {
    #[must_use]
    pub fn new(brokerage: Arc<dyn Brokerage>) -> Self {
        Self { brokerage }
    }

    async fn fetch(&self, query: NewsQuery) -> Result<News, BrokerageError> {
        let mut news = self.brokerage.news(&query).await?;
        news.news = news.news.into_iter().map(sanitize_article).collect();
        info!("Fetched {} news articles", news.news.len());
        Ok(news)
    }

    pub async fn historical(&self, symbols: &[String], limit: u32) -> Result<News, BrokerageError> {
        let symbols = (symbols.first().map(String::as_str) != Some("*")).then(|| symbols.join(","));

        self.fetch(NewsQuery {
            symbols,
            limit: Some(limit),
            ..NewsQuery::default()
        })
        .await
    }

    pub async fn realtime(&self, symbols: &[String], limit: u32) -> Result<Vec<Value>, BrokerageError> {
        let items = self.brokerage.stream_news(symbols, limit as usize).await?;
        info!("Collected {} realtime news messages", items.len());
        Ok(items.into_iter().map(sanitize_stream_message).collect())
    }

    pub async fn dashboard(&self) -> Result<News, BrokerageError> {
        self.fetch(NewsQuery {
            symbols: Some(DASHBOARD_SYMBOLS.to_string()),
            limit: Some(DEFAULT_LIMIT),
            ..NewsQuery::default()
        })
        .await
    }

    pub async fn latest(&self) -> Result<News, BrokerageError> {
        self.fetch(NewsQuery {
            sort: Some("desc".to_string()),
            ..NewsQuery::default()
        })
        .await
    }
}
