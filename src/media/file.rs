use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tracing::info;

use super::backend::{CameraBackend, MediaConstraints};
use super::stream::{spawn_frame_producer, MediaStream};

/// Replays a still image (JPEG or PNG) as a live stream
///
/// The image keeps its own resolution; constraints only set the frame rate.
pub struct FileBackend {
    path: PathBuf,
    stop_signals: Arc<AtomicUsize>,
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            stop_signals: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn stop_signals(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stop_signals)
    }
}

#[async_trait::async_trait]
impl CameraBackend for FileBackend {
    async fn acquire(&mut self, constraints: MediaConstraints) -> Result<MediaStream> {
        let path = self.path.clone();
        let image = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .context("Image decode task failed")?
            .with_context(|| format!("Failed to open image {}", self.path.display()))?
            .to_rgb8();

        info!(
            "File camera started: {} ({}x{})",
            self.path.display(),
            image.width(),
            image.height()
        );

        let frame_interval = constraints.frame_interval();

        spawn_frame_producer(
            self.path.display().to_string(),
            frame_interval,
            Arc::clone(&self.stop_signals),
            move |_| Ok(image.clone()),
        )
    }

    fn name(&self) -> &str {
        "file"
    }
}
