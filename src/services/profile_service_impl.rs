//! `SeaORM` implementation of the `ProfileService` trait.

use async_trait::async_trait;

use crate::db::{CreateOutcome, Store};
use crate::services::profile_service::{ProfileError, ProfileService, SubscriptionDto};

pub struct SeaOrmProfileService {
    store: Store,
}

impl SeaOrmProfileService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProfileService for SeaOrmProfileService {
    async fn profile_exists(&self, user_id: &str) -> Result<bool, ProfileError> {
        Ok(self.store.get_profile(user_id).await?.is_some())
    }

    async fn create_profile(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<CreateOutcome, ProfileError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ProfileError::Validation(
                "User does not have an email address.".to_string(),
            ));
        }

        Ok(self.store.create_profile(user_id, email).await?)
    }

    async fn subscription(&self, user_id: &str) -> Result<Option<SubscriptionDto>, ProfileError> {
        let profile = self.store.get_profile(user_id).await?;

        Ok(profile.map(|p| SubscriptionDto {
            subscription_tier: p.subscription_tier,
        }))
    }
}
