//! Error types for the Query Service.
//!
//! [`ApiError`] unifies every non-success outcome into a single enum
//! that converts into an Axum response with a `{ "error", "message" }`
//! JSON body. World source trouble only ever surfaces as a 503; a 500
//! means a defect in this service and never carries internal detail.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

/// Errors that can occur in the Query Service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The world source was not ready on the last sampling cycle.
    #[error("world source not ready")]
    NotReady,

    /// The source is ready but no snapshot has been published yet.
    #[error("snapshot not yet collected")]
    NoData,

    /// No route matches the request path.
    #[error("not found: {0}")]
    NotFound(String),

    /// The snapshot could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotReady | Self::NoData => StatusCode::SERVICE_UNAVAILABLE,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, message) = match &self {
            Self::NotReady => (
                "World not ready",
                "World source not ready: player not loaded or world is in a menu".to_owned(),
            ),
            Self::NoData => ("No data", "Snapshot not yet collected".to_owned()),
            Self::NotFound(path) => ("Not found", format!("no route for {path}")),
            Self::Serialization(e) => {
                error!(error = %e, "Failed to serialize response");
                ("Internal error", "internal server error".to_owned())
            }
        };

        let body = serde_json::json!({
            "error": error,
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
