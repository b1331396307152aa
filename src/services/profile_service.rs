//! Domain service for user profiles.
//!
//! A profile is created once per signed-in user and carries the
//! subscription flags the billing side maintains.

use thiserror::Error;

use crate::db::CreateOutcome;

/// Errors specific to profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for ProfileError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ProfileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Subscription details exposed to the front end.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDto {
    pub subscription_tier: Option<String>,
}

/// Domain service trait for profiles.
#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    /// Whether a profile row exists for the user.
    async fn profile_exists(&self, user_id: &str) -> Result<bool, ProfileError>;

    /// Creates the profile unless one already exists.
    async fn create_profile(&self, user_id: &str, email: &str)
    -> Result<CreateOutcome, ProfileError>;

    /// `None` when the user has no profile yet.
    async fn subscription(&self, user_id: &str) -> Result<Option<SubscriptionDto>, ProfileError>;
}
