//! Error handling for the BazaarLink server

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Server error types
#[derive(Debug, Error)]
pub enum ServerError {
    /// Recommendation engine error
    #[error("{0}")]
    Engine(#[from] bazaarlink::BazaarError),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ServerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        use bazaarlink::BazaarError;

        match self {
            ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::Engine(BazaarError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::Engine(BazaarError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        use bazaarlink::BazaarError;

        match self {
            ServerError::Engine(BazaarError::Validation(_)) | ServerError::Validation(_) => {
                "validation_error"
            }
            ServerError::Engine(BazaarError::Unavailable) => "service_unavailable",
            ServerError::Engine(BazaarError::Storage(_)) => "storage_error",
            ServerError::Engine(BazaarError::Cache(_)) => "cache_error",
            ServerError::Engine(_) => "engine_error",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let error_response = ErrorResponse {
            error: self.error_type().to_string(),
            message: self.to_string(),
            details: None,
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

/// Helper function to create a validation error
pub fn validation_error(message: &str) -> ServerError {
    ServerError::Validation(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaarlink::BazaarError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServerError::from(BazaarError::Unavailable).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServerError::from(BazaarError::Validation("limit".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(BazaarError::Storage("down".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(validation_error("bad").error_type(), "validation_error");
    }
}
