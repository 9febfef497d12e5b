//! api error handling for http handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ServiceError;

/// api error type for handler responses.
#[derive(Debug)]
pub enum ApiError {
    /// malformed request body (400).
    BadRequest(String),
    /// not found error (404).
    NotFound(String),
    /// internal server error (500).
    Internal(String),
}

impl ApiError {
    /// create a bad request error.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    /// create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// create an internal server error from any error type.
    pub fn internal(e: impl std::fmt::Display) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, message).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match &err {
            ServiceError::CompanyNotFound(_) | ServiceError::NoAvailableCaf { .. } => {
                ApiError::NotFound(err.to_string())
            }
            ServiceError::Parse(_) => ApiError::BadRequest(err.to_string()),
            // a crypto failure after reservation burned the folio; say so
            ServiceError::Stamp(_)
            | ServiceError::Database(_)
            | ServiceError::Storage(_)
            | ServiceError::Receipt(_)
            | ServiceError::Pipeline(_) => ApiError::Internal(err.to_string()),
        }
    }
}
