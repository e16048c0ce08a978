use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Fixed body for the not-found response
pub const NOT_FOUND_BODY: &str = "404 Not Found";

/// Custom error type for the proxy surface
///
/// Exactly one kind is visible to callers: a lookup miss, answered with a
/// fixed plain-text 404. Everything else is a storage backend failure that
/// surfaces as a generic 500; the underlying cause goes to the log, never
/// to the client.
#[derive(Debug)]
pub enum ApiError {
    /// No object stored under the requested key
    KeyNotFound,
    /// Storage backend failure
    Store(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::KeyNotFound => (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response(),
            ApiError::Store(err) => {
                tracing::error!("Object store failure: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "500 Internal Server Error",
                )
                    .into_response()
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Store(err)
    }
}
