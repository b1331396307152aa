use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::Value;
use std::sync::Arc;

use super::validation::{validate_keywords, validate_symbol};
use super::{ApiError, AppState, QuoteResponse, TickerSearchQuery};

/// `GET /api/ticker-search?keywords=`
///
/// Returns the provider's symbol-search payload untouched.
pub async fn ticker_search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TickerSearchQuery>,
) -> Result<Json<Value>, ApiError> {
    let keywords = validate_keywords(query.keywords.as_deref())?;

    let payload = state
        .market()
        .symbol_search(keywords)
        .await
        .map_err(ApiError::market)?;

    Ok(Json(payload))
}

/// `GET /api/quote/{symbol}`
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let ticker = validate_symbol(&symbol)?;

    let stock_quote = state
        .market()
        .global_quote(&ticker)
        .await
        .map_err(ApiError::market)?;

    Ok(Json(QuoteResponse {
        ticker,
        stock_quote,
    }))
}
