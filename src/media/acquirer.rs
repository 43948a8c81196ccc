use anyhow::{Context, Result};
use tracing::info;

use super::backend::{CameraBackend, MediaConstraints};
use super::stream::MediaStream;

/// Requests camera access once, through a backend
pub struct MediaAcquirer {
    backend: Box<dyn CameraBackend>,
}

impl MediaAcquirer {
    pub fn new(backend: Box<dyn CameraBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Request a video stream; `constraints` are preferences
    pub async fn acquire(&mut self, constraints: MediaConstraints) -> Result<MediaStream> {
        info!(
            "Requesting camera from {} backend (ideal {}x{})",
            self.backend.name(),
            constraints.ideal_width,
            constraints.ideal_height
        );

        let stream = self
            .backend
            .acquire(constraints)
            .await
            .with_context(|| format!("{} camera unavailable", self.backend.name()))?;

        info!("Camera stream {} acquired", stream.id());
        Ok(stream)
    }
}
