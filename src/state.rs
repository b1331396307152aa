use std::sync::Arc;
use std::time::Duration;

use crate::clients::{
    AlpacaClient, AlphaVantageClient, Brokerage, ChatClient, ClerkClient, CompletionProvider,
    IdentityProvider, MarketData,
};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    NewsService, PlanService, ProfileService, SeaOrmProfileService, SearchService,
    SessionVerifier,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based services to enable
/// connection pooling and avoid socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(concat!("investai/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// The outbound integrations, swappable as a unit.
#[derive(Clone)]
pub struct Providers {
    /// Backend for investment plans.
    pub investment_llm: Arc<dyn CompletionProvider>,

    /// Backend for meal plans and the search bar.
    pub general_llm: Arc<dyn CompletionProvider>,

    pub market: Arc<dyn MarketData>,

    pub brokerage: Arc<dyn Brokerage>,

    pub identity: Arc<dyn IdentityProvider>,
}

impl Providers {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.server.request_timeout_seconds)?;

        Ok(Self {
            investment_llm: Arc::new(ChatClient::with_shared_client(
                http_client.clone(),
                config.openai.clone(),
            )),
            general_llm: Arc::new(ChatClient::with_shared_client(
                http_client.clone(),
                config.openrouter.clone(),
            )),
            market: Arc::new(AlphaVantageClient::with_shared_client(
                http_client.clone(),
                config.alpha_vantage.clone(),
            )),
            brokerage: Arc::new(AlpacaClient::with_shared_client(
                http_client.clone(),
                config.alpaca.clone(),
            )),
            identity: Arc::new(ClerkClient::with_shared_client(http_client, &config.auth)),
        })
    }
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub providers: Providers,

    pub sessions: Arc<SessionVerifier>,

    pub plan_service: Arc<PlanService>,

    pub search_service: Arc<SearchService>,

    pub news_service: Arc<NewsService>,

    pub profile_service: Arc<dyn ProfileService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let providers = Providers::from_config(&config)?;
        let sessions = SessionVerifier::from_config(&config.auth)?;
        Self::with_providers(config, providers, sessions).await
    }

    pub async fn with_providers(
        config: Config,
        providers: Providers,
        sessions: SessionVerifier,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let plan_service = Arc::new(PlanService::new(
            providers.investment_llm.clone(),
            providers.general_llm.clone(),
        ));

        let search_service = Arc::new(SearchService::new(
            providers.general_llm.clone(),
            providers.market.clone(),
            store.clone(),
            Duration::from_secs(config.search.llm_timeout_seconds),
        ));

        let news_service = Arc::new(NewsService::new(providers.brokerage.clone()));

        let profile_service: Arc<dyn ProfileService> =
            Arc::new(SeaOrmProfileService::new(store.clone()));

        Ok(Self {
            config: Arc::new(config),
            store,
            providers,
            sessions: Arc::new(sessions),
            plan_service,
            search_service,
            news_service,
            profile_service,
        })
    }
}
