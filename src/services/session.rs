//! Verification of the identity provider's session tokens.
//!
//! Production tokens are RS256 JWTs checked against the provider's PEM
//! public key. A shared HS256 secret is accepted for local development.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session verification is not configured")]
    NotConfigured,

    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Session token has no subject")]
    MissingSubject,
}

/// Claims read from a session token. Unknown claims are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

/// The signed-in caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
}

pub struct SessionVerifier {
    key: Option<(DecodingKey, Validation)>,
}

impl SessionVerifier {
    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        if let Some(pem) = config.jwt_public_key_pem.as_deref().filter(|p| !p.is_empty()) {
            // Keys pasted into env files often carry literal "\n"
            let pem = pem.replace("\\n", "\n");
            let key = DecodingKey::from_rsa_pem(pem.as_bytes())?;
            return Ok(Self {
                key: Some((key, Validation::new(Algorithm::RS256))),
            });
        }

        if let Some(secret) = config.jwt_shared_secret.as_deref().filter(|s| !s.is_empty()) {
            return Ok(Self::with_shared_secret(secret));
        }

        warn!("No session key configured; every request will be treated as signed out");
        Ok(Self::disabled())
    }

    #[must_use]
    pub fn with_shared_secret(secret: &str) -> Self {
        Self {
            key: Some((
                DecodingKey::from_secret(secret.as_bytes()),
                Validation::new(Algorithm::HS256),
            )),
        }
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self { key: None }
    }

    pub fn verify(&self, token: &str) -> Result<CurrentUser, SessionError> {
        let (key, validation) = self.key.as_ref().ok_or(SessionError::NotConfigured)?;
        let data = decode::<SessionClaims>(token, key, validation)?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(SessionError::MissingSubject);
        }

        Ok(CurrentUser {
            id: claims.sub,
            email: claims.email.filter(|e| !e.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "test-secret-with-at-least-32-bytes!!";

    fn token(sub: &str, exp_offset: i64, email: Option<&str>) -> String {
        let claims = SessionClaims {
            sub: sub.to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
            email: email.map(ToString::to_string),
            sid: Some("sess_1".to_string()),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token() {
        let verifier = SessionVerifier::with_shared_secret(SECRET);
        let user = verifier
            .verify(&token("user_123", 600, Some("a@example.com")))
            .unwrap();
        assert_eq!(user.id, "user_123");
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_expired_token() {
        let verifier = SessionVerifier::with_shared_secret(SECRET);
        assert!(matches!(
            verifier.verify(&token("user_123", -3600, None)),
            Err(SessionError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let verifier = SessionVerifier::with_shared_secret("another-secret-that-is-long-enough");
        assert!(verifier.verify(&token("user_123", 600, None)).is_err());
    }

    #[test]
    fn test_disabled_verifier() {
        let verifier = SessionVerifier::disabled();
        assert!(matches!(
            verifier.verify(&token("user_123", 600, None)),
            Err(SessionError::NotConfigured)
        ));
    }

    #[test]
    fn test_from_config_prefers_shared_secret_when_no_pem() {
        let config = AuthConfig {
            jwt_shared_secret: Some(SECRET.to_string()),
            ..AuthConfig::default()
        };
        let verifier = SessionVerifier::from_config(&config).unwrap();
        assert!(verifier.verify(&token("user_9", 600, None)).is_ok());
    }
}
