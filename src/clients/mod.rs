//! Outbound integrations.
//!
//! Each provider sits behind a trait so the API layer can be exercised with
//! in-process fakes.

pub mod alpaca;
pub mod alpaca_stream;
pub mod alpha_vantage;
pub mod clerk;
pub mod openai;

use async_trait::async_trait;

pub use alpaca::{AlpacaClient, BrokerageError, News, NewsArticle, NewsImage, NewsQuery};
pub use alpha_vantage::{AlphaVantageClient, GlobalQuote, MarketError};
pub use clerk::{ClerkClient, IdentityError};
pub use openai::{ChatClient, LlmError};

/// A chat-completions style text generator.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends a single user message and returns the trimmed reply.
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, used for logging and metrics labels.
    fn model(&self) -> &str;
}

/// Quote and symbol lookups.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// `None` when the provider knows no quote for the symbol.
    async fn global_quote(&self, symbol: &str) -> Result<Option<GlobalQuote>, MarketError>;

    /// Raw symbol-search payload, passed through to clients unchanged.
    async fn symbol_search(&self, keywords: &str) -> Result<serde_json::Value, MarketError>;

    /// Symbol of the best match for free-form keywords.
    async fn best_match(&self, keywords: &str) -> Result<Option<String>, MarketError> {
        let payload = self.symbol_search(keywords).await?;
        Ok(alpha_vantage::first_symbol(&payload))
    }
}

/// Brokerage account data and the news feeds that come with it.
#[async_trait]
pub trait Brokerage: Send + Sync {
    async fn account(&self) -> Result<serde_json::Value, BrokerageError>;

    async fn portfolio_history(&self) -> Result<serde_json::Value, BrokerageError>;

    async fn positions(&self) -> Result<serde_json::Value, BrokerageError>;

    async fn news(&self, query: &NewsQuery) -> Result<News, BrokerageError>;

    /// Collects up to `limit` realtime articles for `symbols` (`*` for all).
    async fn stream_news(
        &self,
        symbols: &[String],
        limit: usize,
    ) -> Result<Vec<serde_json::Value>, BrokerageError>;
}

/// Looks up user details the session token does not carry.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn primary_email(&self, user_id: &str) -> Result<Option<String>, IdentityError>;
}
