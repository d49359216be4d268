//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required query parameter was missing or could not be parsed.
    ///
    /// The string is shown to the client as-is, so it should tell them which
    /// parameter to fix.
    #[error("{0}")]
    Validation(String),

    /// The remote dataset could not be fetched or was not a JSON array.
    #[error("{0}")]
    UpstreamFetch(String),

    /// An unhandled/unexpected SQL error.
    #[error("{0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// The request did not carry the configured API token.
    #[error("a valid API token is required")]
    Unauthorized,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::UpstreamFetch(value.to_string())
    }
}

/// The JSON body sent with every error response.
#[derive(Debug, Serialize)]
pub struct ErrorMessage {
    /// A human readable description of what went wrong.
    pub message: String,
}

impl Error {
    /// The HTTP status code that best describes the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::UpstreamFetch(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezone(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (
            status,
            Json(ErrorMessage {
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}
