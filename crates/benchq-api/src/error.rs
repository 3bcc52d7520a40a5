use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use benchq_core::error::ServiceError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Body of every 500. Details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Error returned by HTTP handlers. Rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let msg = e.to_string();
        match e.status_code() {
            401 => ApiError::Unauthorized(msg),
            404 => ApiError::NotFound(msg),
            409 => ApiError::Conflict(msg),
            500 => {
                error!(error = %msg, "request failed");
                ApiError::Internal(INTERNAL_ERROR_MESSAGE.to_string())
            }
            _ => ApiError::InvalidRequest(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchq_core::{command::CommandError, signature::SignatureError};

    #[test]
    fn service_errors_keep_status() {
        let e = ApiError::from(ServiceError::SignatureInvalid(SignatureError::Mismatch));
        assert_eq!(e.status(), StatusCode::UNAUTHORIZED);

        let e = ApiError::from(ServiceError::UnsupportedBenchmarkCommand {
            reason: CommandError::HelpRequested,
        });
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.to_string(), "Unsupported benchmark command");

        let e = ApiError::from(ServiceError::Internal("boom".into()));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_details_are_not_rendered() {
        let e = ApiError::from(ServiceError::Internal(
            "failed to fetch pull request 999: not found: pull 999".into(),
        ));
        assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.to_string(), INTERNAL_ERROR_MESSAGE);
        assert!(!e.to_string().contains("999"));
    }
}
