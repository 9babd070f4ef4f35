use std::collections::BTreeMap;
use std::time::Duration;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use warden_core::AppError;

mod types;

pub use types::ErrorResponse;

/// HTTP API error carrying a status, a stable code, and optional details.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<BTreeMap<String, String>>,
    retry_after: Option<u64>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
            retry_after: None,
        }
    }

    fn with_detail(mut self, key: &str, value: impl Into<String>) -> Self {
        self.details
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_owned(), value.into());
        self
    }

    pub fn auth_header_missing() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "AUTH_HEADER_MISSING",
            "authorization header is required",
        )
    }

    pub fn invalid_auth_format() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_AUTH_FORMAT",
            "authorization header must use the form 'Bearer <token>'",
        )
    }

    pub fn invalid_token() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", "invalid token")
    }

    pub fn invalid_claims() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "INVALID_CLAIMS",
            "token claims are invalid",
        )
    }

    pub fn token_expired() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED", "token has expired")
    }

    pub fn permission_load_error() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "PERMISSION_LOAD_ERROR",
            "failed to load permissions",
        )
    }

    pub fn insufficient_permissions(required: &str) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "INSUFFICIENT_PERMISSIONS",
            format!("missing required permission '{required}'"),
        )
        .with_detail("required", required)
    }

    pub fn rate_limit_exceeded(retry_after: Duration) -> Self {
        let seconds = retry_after.as_secs().max(1);
        let mut error = Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMIT_EXCEEDED",
            "too many requests, please try again later",
        )
        .with_detail("retry_after_seconds", seconds.to_string());
        error.retry_after = Some(seconds);
        error
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::Validation(message) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            }
            AppError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message),
            AppError::Conflict(message) => Self::new(StatusCode::CONFLICT, "CONFLICT", message),
            AppError::Internal(message) => {
                tracing::error!(error = %message, "request failed with internal error");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", value.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = Json(ErrorResponse::new(self.message, self.code, self.details));
        let mut response = (self.status, payload).into_response();

        if let Some(seconds) = self.retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;
    use warden_core::AppError;

    use super::ApiError;

    #[test]
    fn internal_errors_hide_their_detail() {
        let error = ApiError::from(AppError::Internal("connection refused".to_owned()));

        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.code(), "INTERNAL_ERROR");
        assert_eq!(error.message, "internal server error");
    }

    #[test]
    fn rate_limit_sets_retry_after_header() {
        let response = ApiError::rate_limit_exceeded(Duration::from_millis(200)).into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok()),
            Some("1")
        );
    }

    #[test]
    fn insufficient_permissions_names_the_requirement() {
        let error = ApiError::insufficient_permissions("create_role");

        assert_eq!(error.status, StatusCode::FORBIDDEN);
        assert_eq!(
            error
                .details
                .as_ref()
                .and_then(|details| details.get("required"))
                .map(String::as_str),
            Some("create_role")
        );
    }
}
