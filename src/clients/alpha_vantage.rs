use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use super::MarketData;
use crate::config::AlphaVantageConfig;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Alpha Vantage API key is not configured")]
    MissingApiKey,

    #[error("Alpha Vantage API error: {0}")]
    Status(u16),

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// `GLOBAL_QUOTE` payload. Field names are kept as the provider sends them
/// so the front end can keep reading `"05. price"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    pub symbol: String,
    #[serde(rename = "02. open", default)]
    pub open: String,
    #[serde(rename = "03. high", default)]
    pub high: String,
    #[serde(rename = "04. low", default)]
    pub low: String,
    #[serde(rename = "05. price", default)]
    pub price: String,
    #[serde(rename = "06. volume", default)]
    pub volume: String,
    #[serde(rename = "07. latest trading day", default)]
    pub latest_trading_day: String,
    #[serde(rename = "08. previous close", default)]
    pub previous_close: String,
    #[serde(rename = "09. change", default)]
    pub change: String,
    #[serde(rename = "10. change percent", default)]
    pub change_percent: String,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    quote: Option<Value>,
}

/// First `bestMatches[]."1. symbol"` of a `SYMBOL_SEARCH` payload.
#[must_use]
pub fn first_symbol(payload: &Value) -> Option<String> {
    payload
        .get("bestMatches")?
        .as_array()?
        .first()?
        .get("1. symbol")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Throttling and key problems come back as 200 with a `Note` or
/// `Information` field instead of data.
fn provider_notice(payload: &Value) -> Option<&str> {
    ["Note", "Information", "Error Message"]
        .iter()
        .find_map(|k| payload.get(*k).and_then(Value::as_str))
}

fn parse_global_quote(payload: Value) -> Result<Option<GlobalQuote>, MarketError> {
    let response: GlobalQuoteResponse =
        serde_json::from_value(payload).map_err(|e| MarketError::ParseError(e.to_string()))?;

    match response.quote {
        Some(Value::Object(map)) if !map.is_empty() => {
            let quote: GlobalQuote = serde_json::from_value(Value::Object(map))
                .map_err(|e| MarketError::ParseError(e.to_string()))?;
            Ok(Some(quote))
        }
        _ => Ok(None),
    }
}

pub struct AlphaVantageClient {
    client: Client,
    config: AlphaVantageConfig,
}

impl AlphaVantageClient {
    #[must_use]
    pub const fn with_shared_client(client: Client, config: AlphaVantageConfig) -> Self {
        Self { client, config }
    }

    fn api_key(&self) -> Result<&str, MarketError> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(MarketError::MissingApiKey)
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<Value, MarketError> {
        let api_key = self.api_key()?;
        let mut url = format!("{}/query?", self.config.base_url.trim_end_matches('/'));
        for (k, v) in params {
            url.push_str(&format!("{}={}&", k, urlencoding::encode(v)));
        }
        url.push_str(&format!("apikey={}", urlencoding::encode(api_key)));

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(MarketError::Status(response.status().as_u16()));
        }

        let payload: Value = response.json().await?;
        if let Some(notice) = provider_notice(&payload) {
            warn!("Alpha Vantage notice: {}", notice);
        }

        Ok(payload)
    }
}

#[async_trait]
impl MarketData for AlphaVantageClient {
    async fn global_quote(&self, symbol: &str) -> Result<Option<GlobalQuote>, MarketError> {
        debug!("Fetching global quote for {}", symbol);
        let payload = self
            .query(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])
            .await?;
        parse_global_quote(payload)
    }

    async fn symbol_search(&self, keywords: &str) -> Result<Value, MarketError> {
        debug!("Searching symbols for '{}'", keywords);
        self.query(&[("function", "SYMBOL_SEARCH"), ("keywords", keywords)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_global_quote() {
        let payload = json!({
            "Global Quote": {
                "01. symbol": "IBM",
                "02. open": "167.0000",
                "03. high": "168.5000",
                "04. low": "166.1000",
                "05. price": "167.9500",
                "06. volume": "3034567",
                "07. latest trading day": "2024-05-03",
                "08. previous close": "166.8000",
                "09. change": "1.1500",
                "10. change percent": "0.6894%"
            }
        });

        let quote = parse_global_quote(payload).unwrap().unwrap();
        assert_eq!(quote.symbol, "IBM");
        assert_eq!(quote.price, "167.9500");

        let round = serde_json::to_value(&quote).unwrap();
        assert_eq!(round["05. price"], "167.9500");
    }

    #[test]
    fn test_empty_global_quote_is_none() {
        assert!(parse_global_quote(json!({"Global Quote": {}})).unwrap().is_none());
        assert!(parse_global_quote(json!({"Note": "rate limited"})).unwrap().is_none());
    }

    #[test]
    fn test_first_symbol() {
        let payload = json!({
            "bestMatches": [
                {"1. symbol": "TSLA", "2. name": "Tesla Inc"},
                {"1. symbol": "TL0.DEX", "2. name": "Tesla Inc"}
            ]
        });
        assert_eq!(first_symbol(&payload).as_deref(), Some("TSLA"));
        assert_eq!(first_symbol(&json!({"bestMatches": []})), None);
        assert_eq!(first_symbol(&json!({})), None);
    }

    #[test]
    fn test_provider_notice() {
        let payload = json!({"Information": "Thank you for using Alpha Vantage!"});
        assert!(provider_notice(&payload).is_some());
        assert!(provider_notice(&json!({"bestMatches": []})).is_none());
    }
}
