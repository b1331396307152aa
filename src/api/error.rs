use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ErrorBody;
use crate::clients::{BrokerageError, MarketError};
use crate::services::{PlanError, PlanKind, ProfileError, SearchError};

/// Every handler failure. The message is what the caller sees; causes are
/// logged where the error is built.
#[derive(Debug)]
pub enum ApiError {
    ValidationError(String),

    Unauthorized(String),

    NotFound(String),

    Timeout(String),

    /// The provider answered with a non-success status that is passed on.
    Upstream {
        status: StatusCode,
        message: String,
        details: Option<String>,
    },

    InternalError {
        message: String,
        details: Option<String>,
    },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::Timeout(msg) => write!(f, "Timeout: {msg}"),
            Self::Upstream {
                status, message, ..
            } => write!(f, "Upstream error ({status}): {message}"),
            Self::InternalError { message, .. } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, None),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            Self::Timeout(msg) => {
                tracing::warn!("Upstream timeout: {}", msg);
                (StatusCode::GATEWAY_TIMEOUT, msg, None)
            }
            Self::Upstream {
                status,
                message,
                details,
            } => {
                tracing::warn!("Upstream API error ({}): {}", status, message);
                (status, message, details)
            }
            Self::InternalError { message, details } => {
                tracing::error!("Internal error: {} {:?}", message, details);
                (StatusCode::INTERNAL_SERVER_ERROR, message, details)
            }
        };

        (status, Json(ErrorBody { error, details })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError {
            message: err.to_string(),
            details: None,
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Validation(msg) => Self::ValidationError(msg),
            ProfileError::Database(msg) => Self::internal(msg),
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        use crate::parser::plan_json::PlanJsonError;

        let message = |kind: PlanKind, text: &str| text.replace("{kind}", kind.label());

        match err {
            PlanError::Validation(msg) => Self::ValidationError(msg),
            PlanError::Generation { kind, source } => {
                tracing::error!("Error generating {} plan: {}", kind, source);
                Self::internal(message(
                    kind,
                    "Failed to generate {kind} plan. Please try again later.",
                ))
            }
            PlanError::Extraction { kind, source } => {
                let text = match source {
                    PlanJsonError::NotFound => {
                        "Failed to extract {kind} plan JSON. Please try again."
                    }
                    PlanJsonError::Parse(_) => "Failed to parse {kind} plan. Please try again.",
                    PlanJsonError::NotAnObject => "Invalid {kind} plan format received from AI.",
                };
                Self::internal(message(kind, text))
            }
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidMessage | SearchError::TickerNotFound => {
                Self::ValidationError(err.to_string())
            }
            SearchError::Timeout(after) => {
                tracing::warn!("Search-bar completion timed out after {:?}", after);
                Self::Timeout(
                    "The AI service took too long to respond. Please try again.".to_string(),
                )
            }
            SearchError::EmptyAnswer => Self::internal(err.to_string()),
            SearchError::Llm(_) | SearchError::Market(_) => {
                tracing::error!("Error processing search query: {}", err);
                Self::internal("Failed to process search query. Please try again later.")
            }
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError {
            message: msg.into(),
            details: None,
        }
    }

    pub fn internal_with_details(msg: impl Into<String>, details: impl Into<String>) -> Self {
        Self::InternalError {
            message: msg.into(),
            details: Some(details.into()),
        }
    }

    pub fn upstream(status: u16, msg: impl Into<String>, details: Option<String>) -> Self {
        Self::Upstream {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            message: msg.into(),
            details,
        }
    }

    /// Brokerage failure where every cause is reported as a 500 with the
    /// cause in `details`.
    pub fn brokerage(err: BrokerageError, message: &str) -> Self {
        match err {
            BrokerageError::MissingCredentials => Self::internal(err.to_string()),
            other => Self::internal_with_details(message, other.to_string()),
        }
    }

    pub fn market(err: MarketError) -> Self {
        match err {
            MarketError::Status(status) => {
                Self::upstream(status, format!("Alpha Vantage API error: {status}"), None)
            }
            MarketError::MissingApiKey => Self::internal("Missing Alpha Vantage API key"),
            other => Self::internal_with_details("Failed to reach Alpha Vantage", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::plan_json::PlanJsonError;

    fn public_message(err: ApiError) -> String {
        match err {
            ApiError::InternalError { message, .. } | ApiError::ValidationError(message) => message,
            other => other.to_string(),
        }
    }

    #[test]
    fn test_plan_error_messages() {
        let err = ApiError::from(PlanError::Extraction {
            kind: PlanKind::Investment,
            source: PlanJsonError::NotFound,
        });
        assert_eq!(
            public_message(err),
            "Failed to extract investment plan JSON. Please try again."
        );

        let err = ApiError::from(PlanError::Extraction {
            kind: PlanKind::Meal,
            source: PlanJsonError::Parse("eof".to_string()),
        });
        assert_eq!(public_message(err), "Failed to parse meal plan. Please try again.");
    }

    #[test]
    fn test_upstream_status_passthrough() {
        let response = ApiError::upstream(429, "slow down", None).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let response = ApiError::market(MarketError::Status(503)).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_missing_credentials_message() {
        let err = ApiError::brokerage(BrokerageError::MissingCredentials, "Failed to fetch portfolio");
        assert_eq!(public_message(err), "Missing Alpaca API credentials");
    }

    #[test]
    fn test_search_errors() {
        let response = ApiError::from(SearchError::TickerNotFound).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            ApiError::from(SearchError::Timeout(std::time::Duration::from_secs(1))).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
