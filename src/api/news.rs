use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::validation::query_params;
use super::{ApiError, AppState, NewsParams};
use crate::clients::{BrokerageError, News};
use crate::services::NewsMode;
use crate::services::news::{clamp_limit, parse_symbols};

const FETCH_FAILED: &str = "Failed to fetch news";

fn news_failure(err: BrokerageError) -> ApiError {
    match err {
        BrokerageError::MissingCredentials => ApiError::internal(err.to_string()),
        other => {
            tracing::error!("Error fetching news: {}", other);
            ApiError::internal(FETCH_FAILED)
        }
    }
}

/// `GET /api/alpaca-news?symbols=&limit=&mode=`
///
/// `historical` mode returns the REST payload; anything else returns the
/// raw stream messages collected from the websocket.
pub async fn get_alpaca_news(
    State(state): State<Arc<AppState>>,
    params: Result<Query<NewsParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let params = query_params(params)?;
    let symbols = parse_symbols(params.symbols.as_deref());
    let limit = clamp_limit(params.limit);

    match NewsMode::parse(params.mode.as_deref()) {
        NewsMode::Historical => {
            let news = state
                .news_service()
                .historical(&symbols, limit)
                .await
                .map_err(|e| match e {
                    BrokerageError::Status { status, body } => ApiError::upstream(
                        status,
                        "Failed to fetch historical news",
                        Some(body),
                    ),
                    other => news_failure(other),
                })?;
            Ok(Json(news).into_response())
        }
        NewsMode::Realtime => {
            let items = state
                .news_service()
                .realtime(&symbols, limit)
                .await
                .map_err(news_failure)?;
            Ok(Json(items).into_response())
        }
    }
}

/// `GET /api/alpaca`
pub async fn get_dashboard_news(State(state): State<Arc<AppState>>) -> Result<Json<News>, ApiError> {
    state
        .news_service()
        .dashboard()
        .await
        .map(Json)
        .map_err(news_failure)
}

/// `GET /api/news/latest`
pub async fn get_latest_news(State(state): State<Arc<AppState>>) -> Result<Json<News>, ApiError> {
    state
        .news_service()
        .latest()
        .await
        .map(Json)
        .map_err(news_failure)
}
