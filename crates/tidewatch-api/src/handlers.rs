//! REST endpoint handlers for the Query Service.
//!
//! Every request independently re-reads readiness and the current
//! snapshot from the [`AppState`] provider. Nothing here calls into the
//! world source.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/ping` | Liveness probe |
//! | `GET` | `/api/state` | Latest snapshot, or 503 |

use std::sync::Arc;

use axum::extract::State;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::ApiError;
use crate::state::AppState;

/// Body of the liveness probe.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PingResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Service version.
    pub version: String,
}

// ---------------------------------------------------------------------------
// GET /api/ping -- liveness
// ---------------------------------------------------------------------------

/// Report that the process is alive. Independent of world readiness.
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "ok".to_owned(),
        version: state.version.clone(),
    })
}

// ---------------------------------------------------------------------------
// GET /api/state -- latest snapshot
// ---------------------------------------------------------------------------

/// Return the latest snapshot verbatim.
///
/// Responds 503 when the world source is not ready, or when it is ready
/// but nothing has been published yet.
pub async fn get_state(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.provider.is_ready() {
        return Err(ApiError::NotReady);
    }

    let snapshot = state.provider.current_snapshot().ok_or(ApiError::NoData)?;
    Ok(Json(serde_json::to_value(snapshot.as_ref())?))
}

// ---------------------------------------------------------------------------
// Fallback
// ---------------------------------------------------------------------------

/// JSON 404 for unknown paths.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(uri.path().to_owned())
}
