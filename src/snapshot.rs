//! Manual snapshot of the latest rasterized frame

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::capture::{encode_jpeg, RasterCanvas};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("No frame captured yet")]
    NoFrame,

    #[error("failed to encode snapshot: {0:#}")]
    Encode(anyhow::Error),

    #[error("failed to save snapshot: {0}")]
    Io(#[from] std::io::Error),
}

/// `emotion-snapshot-<unix ms>.jpg`
pub fn snapshot_file_name(taken_at: DateTime<Utc>) -> String {
    format!("emotion-snapshot-{}.jpg", taken_at.timestamp_millis())
}

/// An encoded snapshot ready for download
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub file_name: String,
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    /// Write the snapshot into `dir`, creating it if needed
    pub async fn save(&self, dir: &Path) -> Result<PathBuf, SnapshotError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.jpeg).await?;
        info!("Snapshot saved to {}", path.display());
        Ok(path)
    }
}

/// Encodes the shared raster canvas on demand, independent of sampling
pub struct SnapshotAction {
    canvas: Arc<Mutex<RasterCanvas>>,
    quality: f32,
}

impl SnapshotAction {
    pub fn new(canvas: Arc<Mutex<RasterCanvas>>, quality: f32) -> Self {
        Self { canvas, quality }
    }

    /// Whether a frame has been rasterized, i.e. whether `take` can succeed
    pub async fn is_available(&self) -> bool {
        self.canvas.lock().await.has_frame()
    }

    pub async fn take(&self) -> Result<Snapshot, SnapshotError> {
        let raster = {
            let canvas = self.canvas.lock().await;
            canvas.raster().cloned().ok_or(SnapshotError::NoFrame)?
        };

        let quality = self.quality;
        let encoded = tokio::task::spawn_blocking(move || encode_jpeg(&raster, quality))
            .await
            .map_err(|e| SnapshotError::Encode(e.into()))?
            .map_err(SnapshotError::Encode)?;
        let taken_at = Utc::now();
        let snapshot = Snapshot {
            file_name: snapshot_file_name(taken_at),
            jpeg: encoded.bytes,
            width: encoded.width,
            height: encoded.height,
            taken_at,
        };

        info!(
            "Snapshot {} taken ({}x{}, {} bytes)",
            snapshot.file_name,
            snapshot.width,
            snapshot.height,
            snapshot.jpeg.len()
        );

        Ok(snapshot)
    }
}
