use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or empty user input. Nothing downstream was called.
    #[error("{0}")]
    Warning(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The generation or embedding backend failed.
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn upstream<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Upstream(err.to_string())
    }

    pub fn warning(message: impl Into<String>) -> Self {
        ApiError::Warning(message.into())
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, ApiError::Warning(_))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, key, message) = match &self {
            ApiError::Warning(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "warning", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "error", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "error", msg.clone()),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, "error", msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "error", msg.clone()),
        };

        let body = Json(json!({ key: message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_maps_to_unprocessable_entity() {
        let response = ApiError::warning("Please enter a question.").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn upstream_maps_to_bad_gateway() {
        let response = ApiError::upstream("connection refused").into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
