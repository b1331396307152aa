use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::IdentityProvider;
use crate::config::AuthConfig;

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Identity provider secret key is not configured")]
    MissingSecretKey,

    #[error("Identity provider error ({status}): {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct ClerkUser {
    #[serde(default)]
    primary_email_address_id: Option<String>,
    #[serde(default)]
    email_addresses: Vec<ClerkEmailAddress>,
}

#[derive(Debug, Deserialize)]
struct ClerkEmailAddress {
    #[serde(default)]
    id: Option<String>,
    email_address: String,
}

impl ClerkUser {
    fn primary_email(self) -> Option<String> {
        let primary_id = self.primary_email_address_id;
        let mut addresses = self.email_addresses;

        let index = primary_id
            .and_then(|pid| addresses.iter().position(|a| a.id.as_deref() == Some(pid.as_str())))
            .unwrap_or(0);

        let email = (index < addresses.len()).then(|| addresses.swap_remove(index).email_address);
        email.filter(|e| !e.is_empty())
    }
}

/// Backend API client for the hosted identity provider.
pub struct ClerkClient {
    client: Client,
    base_url: String,
    secret_key: Option<String>,
}

impl ClerkClient {
    #[must_use]
    pub fn with_shared_client(client: Client, config: &AuthConfig) -> Self {
        Self {
            client,
            base_url: config.identity_api_url.trim_end_matches('/').to_string(),
            secret_key: config.identity_secret_key.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for ClerkClient {
    async fn primary_email(&self, user_id: &str) -> Result<Option<String>, IdentityError> {
        let secret = self
            .secret_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(IdentityError::MissingSecretKey)?;

        let url = format!("{}/users/{}", self.base_url, urlencoding::encode(user_id));
        let response = self.client.get(&url).bearer_auth(secret).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(IdentityError::Status { status, body });
        }

        let user: ClerkUser = response.json().await?;
        Ok(user.primary_email())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_email_prefers_primary_id() {
        let user: ClerkUser = serde_json::from_str(
            r#"{
                "primary_email_address_id": "idn_2",
                "email_addresses": [
                    {"id": "idn_1", "email_address": "old@example.com"},
                    {"id": "idn_2", "email_address": "main@example.com"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(user.primary_email().as_deref(), Some("main@example.com"));
    }

    #[test]
    fn test_primary_email_falls_back_to_first() {
        let user: ClerkUser = serde_json::from_str(
            r#"{"email_addresses": [{"email_address": "first@example.com"}]}"#,
        )
        .unwrap();
        assert_eq!(user.primary_email().as_deref(), Some("first@example.com"));

        let user: ClerkUser = serde_json::from_str(r#"{"email_addresses": []}"#).unwrap();
        assert!(user.primary_email().is_none());
    }
}
