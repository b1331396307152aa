use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::{Brokerage, MarketData};
use crate::config::Config;
use crate::services::{NewsService, PlanService, ProfileService, SearchService, SessionVerifier};
use crate::state::SharedState;

pub mod auth;
mod brokerage;
mod error;
mod market;
mod news;
mod observability;
mod plans;
mod profile;
mod search;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionVerifier {
        &self.shared.sessions
    }

    #[must_use]
    pub fn plan_service(&self) -> &Arc<PlanService> {
        &self.shared.plan_service
    }

    #[must_use]
    pub fn search_service(&self) -> &Arc<SearchService> {
        &self.shared.search_service
    }

    #[must_use]
    pub fn news_service(&self) -> &Arc<NewsService> {
        &self.shared.news_service
    }

    #[must_use]
    pub fn profile_service(&self) -> &Arc<dyn ProfileService> {
        &self.shared.profile_service
    }

    #[must_use]
    pub fn market(&self) -> &Arc<dyn MarketData> {
        &self.shared.providers.market
    }

    #[must_use]
    pub fn brokerage(&self) -> &Arc<dyn Brokerage> {
        &self.shared.providers.brokerage
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = create_api_router()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_middleware,
        ))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/check-profile", get(profile::check_profile))
        .route("/create-profile", post(profile::create_profile))
        .route(
            "/profile/subscription-status",
            get(profile::subscription_status),
        )
        .route(
            "/generate-investmentplan",
            post(plans::generate_investment_plan),
        )
        .route("/generate-mealplan", post(plans::generate_meal_plan))
        .route("/search-bar", post(search::search_bar))
        .route("/search-bar/history", get(search::search_history))
        .route("/ticker-search", get(market::ticker_search))
        .route("/quote/{symbol}", get(market::get_quote))
        .route("/account", get(brokerage::get_account))
        .route("/portfolio", get(brokerage::get_portfolio))
        .route("/positions", get(brokerage::get_positions))
        .route("/alpaca-news", get(news::get_alpaca_news))
        .route("/alpaca", get(news::get_dashboard_news))
        .route("/news/latest", get(news::get_latest_news))
        .route("/health", get(system::get_health))
        .route("/metrics", get(observability::get_metrics))
}
