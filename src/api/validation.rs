use axum::extract::{Query, rejection::QueryRejection};
use serde_json::Value;

use super::ApiError;
use crate::parser::ticker::is_valid_symbol;

/// Unwraps query parameters, answering malformed ones with the JSON error body.
pub fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|e| ApiError::validation(e.body_text()))
}

pub fn validate_limit(limit: i64) -> Result<u64, ApiError> {
    const MAX_LIMIT: i64 = 100;
    const MIN_LIMIT: i64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_LIMIT}"
        )));
    }
    u64::try_from(limit).map_err(|_| ApiError::validation(format!("Invalid limit: {limit}")))
}

pub fn validate_symbol(symbol: &str) -> Result<String, ApiError> {
    let symbol = symbol.trim().to_uppercase();
    if !is_valid_symbol(&symbol) {
        return Err(ApiError::validation(format!("Invalid ticker symbol: {symbol}")));
    }
    Ok(symbol)
}

pub fn validate_keywords(keywords: Option<&str>) -> Result<&str, ApiError> {
    match keywords.map(str::trim) {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(ApiError::validation("Missing keywords")),
    }
}

/// The search box accepts a non-blank string only.
pub fn validate_search_message(message: Option<&Value>) -> Result<&str, ApiError> {
    match message {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::validation("Invalid or missing search message.")),
    }
}
