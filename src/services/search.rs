//! The chat-style search box.
//!
//! A message is classified with cheap keyword rules before anything leaves
//! the process: price questions are answered straight from the quote
//! endpoint, off-topic chatter gets a canned reply, and everything else is
//! turned into a prompt for the completion backend.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clients::{CompletionProvider, GlobalQuote, LlmError, MarketData, MarketError};
use crate::db::{NewSearchLog, Store};
use crate::parser::markdown::strip_markdown;
use crate::parser::ticker::extract_cashtag;

pub const OFF_TOPIC_REPLY: &str =
    "I'm Investment AI built to answer investment-related questions. Let's work on your portfolio.";

const FINANCE_KEYWORDS: &[&str] = &[
    "401k", "allocation", "asset", "assets", "bitcoin", "bond", "bonds", "broker", "brokerage",
    "buy", "cap", "company", "crypto", "diversify", "diversification", "dividend", "dividends",
    "dow", "earnings", "equities", "equity", "etf", "etfs", "finance", "financial", "forex",
    "fund", "funds", "hedge", "index", "inflation", "interest", "ira", "market", "markets",
    "money", "nasdaq", "options", "portfolio", "price", "quote", "retirement", "returns", "roth",
    "savings", "sell", "share", "shares", "stock", "stocks", "ticker", "trade", "trading",
    "valuation", "wealth", "yield",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Explicit price request, served from the quote endpoint.
    MarketData,
    /// A bare company name or symbol.
    CompanySummary,
    InvestmentAdvice,
    OffTopic,
}

impl Intent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MarketData => "market_data",
            Self::CompanySummary => "company_summary",
            Self::InvestmentAdvice => "investment_advice",
            Self::OffTopic => "off_topic",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn mentions_finance(lower: &str) -> bool {
    lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| w.starts_with("invest") || FINANCE_KEYWORDS.contains(&w))
}

#[must_use]
pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();

    if lower.contains("stock price") {
        return Intent::MarketData;
    }

    if message.split_whitespace().count() == 1 && !message.contains('$') {
        return Intent::CompanySummary;
    }

    if extract_cashtag(message).is_some() || mentions_finance(&lower) {
        return Intent::InvestmentAdvice;
    }

    Intent::OffTopic
}

#[must_use]
pub fn build_prompt(intent: Intent, message: &str) -> Option<String> {
    match intent {
        Intent::CompanySummary => Some(format!(
            "Provide a detailed market summary for {message} including its current stock price and its ticker symbol."
        )),
        Intent::InvestmentAdvice => Some(format!(
            r#"You are an investment AI helping users maximise earning.
If the user's question is not about investing, personal finance, or markets, respond ONLY with:
"{OFF_TOPIC_REPLY}"
Otherwise, answer the following question in clear, well-structured sentences without using markdown:
{message}"#
        )),
        Intent::MarketData | Intent::OffTopic => None,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnswer {
    pub answer: String,
    pub stock_quote: Option<GlobalQuote>,
    pub ticker: Option<String>,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid or missing search message.")]
    InvalidMessage,

    #[error("Could not determine ticker symbol for the requested stock price.")]
    TickerNotFound,

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("No answer generated. Please try again.")]
    EmptyAnswer,

    #[error(transparent)]
    Llm(LlmError),

    #[error(transparent)]
    Market(#[from] MarketError),
}

impl From<LlmError> for SearchError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::EmptyResponse => Self::EmptyAnswer,
            other => Self::Llm(other),
        }
    }
}

pub struct SearchService {
    llm: Arc<dyn CompletionProvider>,
    market: Arc<dyn MarketData>,
    store: Store,
    llm_timeout: Duration,
}

impl SearchService {
    #[must_use]
    pub fn new(
        llm: Arc<dyn CompletionProvider>,
        market: Arc<dyn MarketData>,
        store: Store,
        llm_timeout: Duration,
    ) -> Self {
        Self {
            llm,
            market,
            store,
            llm_timeout,
        }
    }

    pub async fn answer(
        &self,
        message: &str,
        user_id: Option<&str>,
    ) -> Result<SearchAnswer, SearchError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(SearchError::InvalidMessage);
        }

        let intent = classify(message);
        metrics::counter!("search_intent_total", "intent" => intent.as_str()).increment(1);
        info!(intent = %intent, "Handling search-bar message");

        let result = match intent {
            Intent::OffTopic => SearchAnswer {
                answer: OFF_TOPIC_REPLY.to_string(),
                stock_quote: None,
                ticker: None,
            },
            Intent::MarketData => {
                let ticker = self
                    .resolve_ticker(message)
                    .await
                    .ok_or(SearchError::TickerNotFound)?;
                let stock_quote = self.market.global_quote(&ticker).await?;
                SearchAnswer {
                    answer: format!("Current stock price for {ticker}:"),
                    stock_quote,
                    ticker: Some(ticker),
                }
            }
            Intent::CompanySummary | Intent::InvestmentAdvice => {
                let ticker = self.resolve_ticker(message).await;
                let answer = self.ask_llm(intent, message).await?;
                let stock_quote = match &ticker {
                    Some(t) => self.quote_or_none(t).await,
                    None => None,
                };
                SearchAnswer {
                    answer,
                    stock_quote,
                    ticker,
                }
            }
        };

        self.record(user_id, message, intent, &result).await;
        Ok(result)
    }

    /// Cashtag first, then the provider's best symbol match. Lookup failures
    /// are treated as "no ticker".
    async fn resolve_ticker(&self, message: &str) -> Option<String> {
        if let Some(tag) = extract_cashtag(message) {
            return Some(tag);
        }

        match self.market.best_match(message).await {
            Ok(symbol) => symbol,
            Err(e) => {
                warn!("Symbol search failed: {}", e);
                None
            }
        }
    }

    async fn ask_llm(&self, intent: Intent, message: &str) -> Result<String, SearchError> {
        let Some(prompt) = build_prompt(intent, message) else {
            return Err(SearchError::EmptyAnswer);
        };

        let answer = tokio::time::timeout(self.llm_timeout, self.llm.complete(&prompt))
            .await
            .map_err(|_| SearchError::Timeout(self.llm_timeout))??;
        debug!("Search-bar completion: {}", answer);

        let cleaned = strip_markdown(&answer);
        if cleaned.trim().is_empty() {
            return Err(SearchError::EmptyAnswer);
        }
        Ok(cleaned)
    }

    async fn quote_or_none(&self, ticker: &str) -> Option<GlobalQuote> {
        match self.market.global_quote(ticker).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!("Error fetching stock quote for {}: {}", ticker, e);
                None
            }
        }
    }

    async fn record(&self, user_id: Option<&str>, message: &str, intent: Intent, answer: &SearchAnswer) {
        let entry = NewSearchLog {
            user_id,
            request: message,
            response: &answer.answer,
            ticker: answer.ticker.as_deref(),
            intent: intent.as_str(),
        };

        if let Err(e) = self.store.add_search_log(entry).await {
            warn!("Failed to record search-bar exchange: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_price_requests() {
        assert_eq!(classify("What is the current stock price of Apple?"), Intent::MarketData);
        assert_eq!(classify("$TSLA stock price"), Intent::MarketData);
    }

    #[test]
    fn test_classify_single_word() {
        assert_eq!(classify("Microsoft"), Intent::CompanySummary);
        assert_eq!(classify("  nvidia  "), Intent::CompanySummary);
        assert_eq!(classify("$AAPL"), Intent::InvestmentAdvice);
    }

    #[test]
    fn test_classify_finance_questions() {
        assert_eq!(classify("Should I invest in index funds?"), Intent::InvestmentAdvice);
        assert_eq!(classify("How do bonds work"), Intent::InvestmentAdvice);
        assert_eq!(classify("Is $NVDA overvalued right now"), Intent::InvestmentAdvice);
        assert_eq!(classify("Investing for beginners please"), Intent::InvestmentAdvice);
    }

    #[test]
    fn test_classify_off_topic() {
        assert_eq!(classify("What is a good pasta recipe?"), Intent::OffTopic);
        assert_eq!(classify("tell me a joke"), Intent::OffTopic);
        assert_eq!(classify("I went to the supermarket today"), Intent::OffTopic);
    }

    #[test]
    fn test_build_prompt() {
        let prompt = build_prompt(Intent::CompanySummary, "Tesla").unwrap();
        assert_eq!(
            prompt,
            "Provide a detailed market summary for Tesla including its current stock price and its ticker symbol."
        );

        let prompt = build_prompt(Intent::InvestmentAdvice, "How do ETFs work?").unwrap();
        assert!(prompt.contains(OFF_TOPIC_REPLY));
        assert!(prompt.ends_with("How do ETFs work?"));

        assert!(build_prompt(Intent::OffTopic, "hi there").is_none());
        assert!(build_prompt(Intent::MarketData, "stock price").is_none());
    }

    #[test]
    fn test_empty_completion_maps_to_empty_answer() {
        assert!(matches!(
            SearchError::from(LlmError::EmptyResponse),
            SearchError::EmptyAnswer
        ));
    }
}
