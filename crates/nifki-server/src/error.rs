//! HTTP error type with status code mapping.
//!
//! [`ApiError`] is the error type of every handler. It implements
//! `axum::response::IntoResponse` by rendering the shared error page with
//! the matching status code.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use nifki_build::BuildError;
use nifki_core::CoreError;
use nifki_storage::StorageError;

use crate::render;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A path segment failed the page-name rules (404).
    #[error("Bad page name '{0}'")]
    BadPageName(String),

    /// Nothing lives at this address (404).
    #[error("{0}")]
    NotFound(String),

    /// Malformed request (400).
    #[error("{0}")]
    BadRequest(String),

    /// A rename target appeared between validation and copy (409).
    #[error("{0}")]
    Conflict(String),

    /// Anything else (500). The detail is logged, not shown.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadPageName(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let page = render::error_page(status.as_u16(), &message);
        (status, Html(page)).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match &err {
            StorageError::PageNotFound(_)
            | StorageError::ResourceNotFound { .. }
            | StorageError::ArtifactNotFound(_) => ApiError::NotFound("Not found".to_string()),
            StorageError::DestinationExists(name) => ApiError::Conflict(format!(
                "Your changes have not been saved because a page called '{name}' already exists."
            )),
            StorageError::Properties { .. } | StorageError::Io { .. } => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidPageName { name } => ApiError::BadPageName(name),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Storage(err) => err.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("background task failed: {err}"))
    }
}
