use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use roam_core::CoreError;
use roam_market::MutationStatus;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    InternalServerError(String),
}

impl AppError {
    /// Maps the status a service captured on a failed mutation.
    pub fn from_status(status: MutationStatus) -> Self {
        let message = status
            .error
            .unwrap_or_else(|| "Operation failed".to_string());
        if status.not_found {
            AppError::NotFoundError(message)
        } else {
            AppError::InternalServerError(message)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => AppError::ValidationError(msg),
            CoreError::NotFound(msg) => AppError::NotFoundError(msg),
            CoreError::BackendError(msg) => AppError::InternalServerError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(message: &str, not_found: bool) -> MutationStatus {
        MutationStatus {
            loading: false,
            error: Some(message.to_string()),
            not_found,
        }
    }

    #[test]
    fn test_missing_row_maps_to_404() {
        let response = AppError::from_status(failed("Profile not found", true)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_backend_text_mentioning_not_found_stays_500() {
        let status = failed("Backend error: relation \"profiles\" not found", false);
        let response = AppError::from_status(status).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_core_validation_maps_to_400() {
        let response = AppError::from(CoreError::ValidationError("bad".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
