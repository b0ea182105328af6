//! API error types with structured JSON responses.
//!
//! Every failure a handler can produce is recovered here and turned into a
//! status code plus a structured body; nothing propagates as a panic. The
//! authentication failure body is identical for an unknown username and a
//! wrong password.

use api_shared::wire::{AuthRes, FieldErrors, ValidationErrorRes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use prs_core::PatientError;

/// API-level errors with HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
    /// Per-field validation failure; `message` heads the envelope.
    Validation {
        message: &'static str,
        errors: FieldErrors,
    },
    /// Unknown patient identifier.
    NotFound,
    /// Bad credentials at login.
    AuthFailed,
    /// Missing or stale session where one is required.
    Unauthorized,
    /// Registration rejected (duplicate username, bad role, bad email).
    AccountRejected(String),
    /// Anything unexpected; detail is logged, not echoed.
    Internal(String),
}

impl ApiError {
    /// Wraps field errors under a handler-specific headline message.
    pub fn validation(message: &'static str, errors: FieldErrors) -> Self {
        Self::Validation { message, errors }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { message, errors } => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorRes {
                    message: message.to_string(),
                    errors,
                }),
            )
                .into_response(),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Not found." })),
            )
                .into_response(),
            ApiError::AuthFailed => (
                StatusCode::UNAUTHORIZED,
                Json(AuthRes::failure("Invalid username or password")),
            )
                .into_response(),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(AuthRes::failure("Authentication required")),
            )
                .into_response(),
            ApiError::AccountRejected(error) => {
                (StatusCode::BAD_REQUEST, Json(AuthRes::failure(error))).into_response()
            }
            ApiError::Internal(detail) => {
                tracing::error!("internal API error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<PatientError> for ApiError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::Validation(errors) => ApiError::validation("Validation failed", errors),
            PatientError::PatientNotFound(_) => ApiError::NotFound,
            PatientError::UsernameTaken => {
                ApiError::AccountRejected("Username already taken".into())
            }
            PatientError::InvalidAccount(message) => ApiError::AccountRejected(message),
            PatientError::InvalidCredentials => ApiError::AuthFailed,
            PatientError::Unauthenticated => ApiError::Unauthorized,
            PatientError::IdAllocationExhausted => {
                ApiError::Internal("patient id allocation retries exhausted".into())
            }
            PatientError::PasswordHash(detail) => ApiError::Internal(detail),
            PatientError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[tokio::test]
    async fn test_not_found_is_404_with_detail() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["detail"], "Not found.");
    }

    #[tokio::test]
    async fn test_auth_failed_and_unknown_user_share_a_shape() {
        let response = ApiError::AuthFailed.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid username or password");
    }

    #[tokio::test]
    async fn test_validation_error_carries_field_map() {
        let mut errors = FieldErrors::new();
        errors.add("phone_number", "Enter a valid phone number");
        let response = ApiError::validation("Registration failed", errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Registration failed");
        assert_eq!(json["errors"]["phone_number"][0], "Enter a valid phone number");
    }

    #[tokio::test]
    async fn test_internal_hides_detail() {
        let response = ApiError::Internal("connection dropped".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["detail"], "Internal server error");
    }
}
