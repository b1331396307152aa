//! Brokerage pass-through endpoints. Payloads are forwarded as received.

use axum::{Json, extract::State};
use serde_json::Value;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::clients::BrokerageError;

/// `GET /api/account`
pub async fn get_account(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    state
        .brokerage()
        .account()
        .await
        .map(Json)
        .map_err(|e| ApiError::brokerage(e, "Failed to fetch account information"))
}

/// `GET /api/portfolio`
pub async fn get_portfolio(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    state
        .brokerage()
        .portfolio_history()
        .await
        .map(Json)
        .map_err(|e| ApiError::brokerage(e, "Failed to fetch portfolio"))
}

/// `GET /api/positions`
///
/// Unlike the other two, a provider status is passed through as-is.
pub async fn get_positions(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    match state.brokerage().positions().await {
        Ok(positions) => Ok(Json(positions)),
        Err(BrokerageError::MissingCredentials) => {
            Err(ApiError::internal(BrokerageError::MissingCredentials.to_string()))
        }
        Err(BrokerageError::Status { status, body }) => {
            tracing::warn!("Positions request failed ({}): {}", status, body);
            Err(ApiError::upstream(status, "Failed to fetch positions", None))
        }
        Err(e) => {
            tracing::error!("Error fetching positions: {}", e);
            Err(ApiError::internal("Internal server error"))
        }
    }
}
