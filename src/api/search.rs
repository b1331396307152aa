use axum::{
    Json,
    extract::{Query, State, rejection::{JsonRejection, QueryRejection}},
};
use std::sync::Arc;

use super::auth::MaybeUser;
use super::validation::{query_params, validate_limit, validate_search_message};
use super::{ApiError, AppState, HistoryQuery, SearchHistoryResponse, SearchRequest};
use crate::services::SearchAnswer;

/// `POST /api/search-bar`
pub async fn search_bar(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchAnswer>, ApiError> {
    let request = payload.map(|Json(r)| r).map_err(|e| {
        tracing::debug!("Rejected search-bar body: {}", e.body_text());
        ApiError::validation("Invalid or missing search message.")
    })?;
    let message = validate_search_message(request.message.as_ref())?;

    let answer = state
        .search_service()
        .answer(message, user.as_ref().map(|u| u.id.as_str()))
        .await?;

    Ok(Json(answer))
}

/// `GET /api/search-bar/history?limit=`
pub async fn search_history(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<SearchHistoryResponse>, ApiError> {
    let user = user.ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;
    let query = query_params(query)?;

    let limit = match query.limit {
        Some(limit) => validate_limit(limit)?,
        None => state.config().search.history_default_limit,
    };

    let history = state.store().recent_searches(&user.id, limit).await?;
    Ok(Json(SearchHistoryResponse { history }))
}
