use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::GlobalQuote;
use crate::db::SearchLogEntry;
use crate::services::{SubscriptionDto, plan::Plan};

/// Body of every non-success response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckProfileResponse {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionStatusResponse {
    pub subscription: Option<SubscriptionDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlanResponse {
    pub investment_plan: Plan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanResponse {
    pub meal_plan: Plan,
}

/// `message` is kept loose so a non-string value gets the same 400 as a
/// missing one.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub message: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SearchHistoryResponse {
    pub history: Vec<SearchLogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TickerSearchQuery {
    pub keywords: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub ticker: String,
    pub stock_quote: Option<GlobalQuote>,
}

#[derive(Debug, Deserialize)]
pub struct NewsParams {
    pub symbols: Option<String>,
    /// Clamped rather than rejected, so negatives are accepted here.
    pub limit: Option<i64>,
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}
