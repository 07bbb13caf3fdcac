use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::orchestrator::GenerationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Generation(GenerationError::ServiceUnavailable(e)) => {
                tracing::error!("Completion service error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "The AI service is unavailable, please try again".to_string(),
                )
            }
            AppError::Generation(GenerationError::MalformedOutput { attempts, reason }) => {
                tracing::error!("Malformed model output after {attempts} attempts: {reason}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_OUTPUT",
                    "The AI returned an unusable response, please try again".to_string(),
                )
            }
            AppError::Generation(GenerationError::Cancelled) => (
                StatusCode::REQUEST_TIMEOUT,
                "CANCELLED",
                "The request was cancelled before it completed".to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;

    #[test]
    fn test_generation_errors_map_to_distinct_statuses() {
        let unavailable = AppError::from(GenerationError::ServiceUnavailable(LlmError::EmptyContent));
        let malformed = AppError::from(GenerationError::MalformedOutput {
            attempts: 2,
            reason: "eof".to_string(),
        });
        let cancelled = AppError::from(GenerationError::Cancelled);

        assert_eq!(unavailable.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(malformed.into_response().status(), StatusCode::BAD_GATEWAY);
        assert_eq!(cancelled.into_response().status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_validation_is_bad_request() {
        let response = AppError::Validation("category cannot be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
