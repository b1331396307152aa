//! Profile endpoints.
//!
//! The three routes report a signed-out caller differently, so each one
//! checks [`MaybeUser`] itself instead of relying on a rejecting layer.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::auth::MaybeUser;
use super::{
    ApiError, AppState, CheckProfileResponse, MessageResponse, SubscriptionStatusResponse,
};
use crate::db::CreateOutcome;
use crate::services::CurrentUser;

const USER_NOT_FOUND: &str = "User not found in Clerk.";

/// `GET /api/check-profile`
pub async fn check_profile(State(state): State<Arc<AppState>>, MaybeUser(user): MaybeUser) -> Response {
    let Some(user) = user else {
        return (
            StatusCode::NOT_FOUND,
            Json(CheckProfileResponse {
                exists: false,
                error: Some(USER_NOT_FOUND.to_string()),
            }),
        )
            .into_response();
    };

    match state.profile_service().profile_exists(&user.id).await {
        Ok(exists) => Json(CheckProfileResponse {
            exists,
            error: None,
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Error checking profile for {}: {}", user.id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CheckProfileResponse {
                    exists: false,
                    error: Some(e.to_string()),
                }),
            )
                .into_response()
        }
    }
}

/// `POST /api/create-profile`
pub async fn create_profile(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let user = user.ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.to_string()))?;
    let email = resolve_email(&state, &user).await?;

    let outcome = state
        .profile_service()
        .create_profile(&user.id, email.as_deref().unwrap_or_default())
        .await?;

    Ok(match outcome {
        CreateOutcome::AlreadyExists => (
            StatusCode::OK,
            Json(MessageResponse::new("Profile already exists.")),
        ),
        CreateOutcome::Created => {
            tracing::info!(user_id = %user.id, "Profile created");
            (
                StatusCode::CREATED,
                Json(MessageResponse::new("Profile created successfully.")),
            )
        }
    })
}

/// `GET /api/profile/subscription-status`
pub async fn subscription_status(
    State(state): State<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
) -> Result<Json<SubscriptionStatusResponse>, ApiError> {
    let user = user.ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    let subscription = state.profile_service().subscription(&user.id).await?;
    Ok(Json(SubscriptionStatusResponse { subscription }))
}

/// Token claim first, then the identity provider's user record.
async fn resolve_email(state: &AppState, user: &CurrentUser) -> Result<Option<String>, ApiError> {
    if let Some(email) = &user.email {
        return Ok(Some(email.clone()));
    }

    state
        .shared
        .providers
        .identity
        .primary_email(&user.id)
        .await
        .map_err(|e| {
            tracing::error!("Error looking up user {}: {}", user.id, e);
            ApiError::internal(e.to_string())
        })
}
