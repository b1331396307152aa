use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};
use tracing::info;

use crate::entities::{prelude::*, profiles};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: i32,
    pub user_id: String,
    pub email: String,
    pub subscription_active: bool,
    pub subscription_tier: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<profiles::Model> for Profile {
    fn from(model: profiles::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            email: model.email,
            subscription_active: model.subscription_active,
            subscription_tier: model.subscription_tier,
            stripe_subscription_id: model.stripe_subscription_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Result of an idempotent profile insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_user_id(&self, user_id: &str) -> Result<Option<Profile>> {
        let profile = Profiles::find()
            .filter(profiles::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query profile by user id")?;

        Ok(profile.map(Profile::from))
    }

    /// Inserts a fresh, unsubscribed profile. A concurrent insert for the
    /// same user surfaces as `AlreadyExists` rather than an error.
    pub async fn create(&self, user_id: &str, email: &str) -> Result<CreateOutcome> {
        if self.get_by_user_id(user_id).await?.is_some() {
            return Ok(CreateOutcome::AlreadyExists);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let active_model = profiles::ActiveModel {
            user_id: Set(user_id.to_string()),
            email: Set(email.to_string()),
            subscription_active: Set(false),
            subscription_tier: Set(None),
            stripe_subscription_id: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match Profiles::insert(active_model).exec(&self.conn).await {
            Ok(_) => {
                info!("Profile created for user: {}", user_id);
                Ok(CreateOutcome::Created)
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(e) => Err(e).context("Failed to insert profile"),
        }
    }
}
