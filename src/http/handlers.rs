use super::state::AppState;
use crate::snapshot::SnapshotError;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// GET /emotion
/// Current display: label, confidence, badge color and error banner
pub async fn get_emotion(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.client.display().current())
}

/// GET /status
/// Client lifecycle phase and counters
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.client.stats().await)
}

/// GET /snapshot
/// Download the latest rasterized frame as a full-quality JPEG
pub async fn take_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = match state.client.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(SnapshotError::NoFrame) => {
            warn!("Snapshot requested before any frame was captured");
            return (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: SnapshotError::NoFrame.to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            error!("Snapshot failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    if let Some(dir) = &state.snapshot_dir {
        if let Err(e) = snapshot.save(dir).await {
            error!("Failed to save snapshot copy: {}", e);
        }
    }

    info!("Serving snapshot {}", snapshot.file_name);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", snapshot.file_name),
            ),
        ],
        snapshot.jpeg,
    )
        .into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
