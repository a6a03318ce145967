use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use maintrack_core::DomainError;

/// Every failure a handler or middleware can surface.
///
/// The body is always `{"message": ...}`; internal errors add the underlying
/// detail as `"error"`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Missing or unusable credentials (401).
    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("{message}: {detail}")]
    Internal { message: &'static str, detail: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn internal(message: &'static str, detail: impl core::fmt::Display) -> Self {
        ApiError::Internal {
            message,
            detail: detail.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken | ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => ApiError::Validation(msg),
            DomainError::InvalidId(msg) => ApiError::Validation(msg),
            DomainError::NotFound => ApiError::NotFound,
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Internal { message, detail } => {
                tracing::error!(error = %detail, "{message}");
                json_error(status, message, Some(detail))
            }
            other => json_error(status, other.to_string(), None),
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>, detail: Option<String>) -> Response {
    let body = match detail {
        Some(detail) => json!({ "message": message.into(), "error": detail }),
        None => json!({ "message": message.into() }),
    };
    (status, axum::Json(body)).into_response()
}

/// Attach a generic 500 message to any displayable failure.
pub trait OrInternal<T> {
    fn or_internal(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T, E: core::fmt::Display> OrInternal<T> for Result<T, E> {
    fn or_internal(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::internal(message, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthenticated("No token provided").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("dup".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::internal("boom", "db down").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn messages_match_client_contract() {
        assert_eq!(ApiError::NotFound.to_string(), "Not found");
        assert_eq!(ApiError::InvalidToken.to_string(), "Invalid token");
        assert_eq!(ApiError::Forbidden.to_string(), "Forbidden");
    }

    #[test]
    fn domain_errors_map_to_client_errors() {
        let err: ApiError = DomainError::validation("Missing fields").into();
        assert!(matches!(err, ApiError::Validation(ref m) if m == "Missing fields"));
        let err: ApiError = DomainError::not_found().into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn or_internal_keeps_detail() {
        let res: Result<(), &str> = Err("connection refused");
        match res.or_internal("Failed to fetch equipment").unwrap_err() {
            ApiError::Internal { message, detail } => {
                assert_eq!(message, "Failed to fetch equipment");
                assert_eq!(detail, "connection refused");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
