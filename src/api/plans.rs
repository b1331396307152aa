use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use super::{ApiError, AppState, InvestmentPlanResponse, MealPlanResponse};
use crate::services::{InvestmentPlanRequest, MealPlanRequest};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|e| ApiError::validation(format!("Invalid request body: {}", e.body_text())))
}

/// `POST /api/generate-investmentplan`
pub async fn generate_investment_plan(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InvestmentPlanRequest>, JsonRejection>,
) -> Result<Json<InvestmentPlanResponse>, ApiError> {
    let request = body(payload)?;
    let investment_plan = state.plan_service().investment_plan(&request).await?;

    Ok(Json(InvestmentPlanResponse { investment_plan }))
}

/// `POST /api/generate-mealplan`
pub async fn generate_meal_plan(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MealPlanRequest>, JsonRejection>,
) -> Result<Json<MealPlanResponse>, ApiError> {
    let request = body(payload)?;
    let meal_plan = state.plan_service().meal_plan(&request).await?;

    Ok(Json(MealPlanResponse { meal_plan }))
}
