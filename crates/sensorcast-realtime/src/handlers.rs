//! HTTP endpoint handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/health` | Store liveness, backend name, subscriber count |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct Health {
    /// Whether the store answered a trivial query.
    pub healthy: bool,
    /// Storage backend name.
    pub storage: &'static str,
    /// Number of connected real-time clients.
    pub subscribers: usize,
}

/// Report server health. Answers `503` when the store is unreachable.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let healthy = match state.dispatcher.gateway().ping().await {
        Ok(_) => true,
        Err(e) => {
            tracing::error!("Health check failed: {e}");
            false
        }
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = Health {
        healthy,
        storage: state.storage(),
        subscribers: state.subscriber_count(),
    };

    (status, Json(body))
}
