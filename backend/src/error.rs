//! Error types for the post store and the HTTP layer.
//!
//! Every [`ApiError`] renders as `{"error": "..."}`; store failures keep the
//! underlying database text in the message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::r2d2::PoolError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not connect to database: {0}")]
    Connection(#[from] PoolError),

    #[error("{0}")]
    Query(#[from] diesel::result::Error),

    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("All fields (author_name, author_email, title, content) are required")]
    MissingFields(Vec<&'static str>),

    #[error("Failed to publish blog post due to database error: {0}")]
    Publish(StoreError),

    #[error("Failed to retrieve blog posts from database: {0}")]
    Retrieve(StoreError),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ApiError {
    /// Wrap a failed insert. A crashed store task is not a database error.
    pub fn publish(err: StoreError) -> Self {
        match err {
            StoreError::Task(err) => Self::Unexpected(err.to_string()),
            err => Self::Publish(err),
        }
    }

    pub fn retrieve(err: StoreError) -> Self {
        match err {
            StoreError::Task(err) => Self::Unexpected(err.to_string()),
            err => Self::Retrieve(err),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::MissingFields(_) => StatusCode::BAD_REQUEST,
            Self::Publish(_) | Self::Retrieve(_) | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    missing_fields: Option<&'a [&'static str]>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("rejected request: {}", self);
        }

        let missing_fields = match &self {
            Self::MissingFields(fields) => Some(fields.as_slice()),
            _ => None,
        };
        let body = ErrorResponse {
            error: self.to_string(),
            missing_fields,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    fn query_error(message: &str) -> StoreError {
        StoreError::Query(DieselError::DatabaseError(
            DatabaseErrorKind::UnableToSendCommand,
            Box::new(message.to_string()),
        ))
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(
            ApiError::MissingFields(vec!["title"]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidBody("expected value".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn store_errors_keep_underlying_text() {
        let err = ApiError::publish(query_error("value too long for type character varying(500)"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Failed to publish blog post due to database error: \
             value too long for type character varying(500)"
        );

        let err = ApiError::retrieve(query_error("relation \"blog_posts\" does not exist"));
        assert!(err.to_string().starts_with("Failed to retrieve blog posts from database: "));
    }
}
