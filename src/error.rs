use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Error taxonomy for the avatar portrait workflow. Each variant maps to a
/// single terminal HTTP response; nothing here is retried internally.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Missing or empty x-user-id header")]
    Unauthorized,

    #[error("Avatar not found: {0}")]
    NotFound(String),

    #[error("Image provider rejected the submission: {0}")]
    ProviderSubmission(String),

    #[error("Image generation {0}")]
    ProviderGenerationFailed(String),

    #[error("Image generation did not finish within the polling deadline")]
    ProviderTimeout,

    #[error("Image provider reported success but returned no output")]
    EmptyProviderOutput,

    #[error("Failed to persist generated image: {0}")]
    Persistence(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ProviderSubmission(_)
            | AppError::ProviderGenerationFailed(_)
            | AppError::ProviderTimeout
            | AppError::EmptyProviderOutput
            | AppError::Persistence(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {self}");
        } else {
            warn!("Request rejected: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(
            AppError::InvalidRequest("avatarId is required".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("abc".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::ProviderTimeout.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::EmptyProviderOutput.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
