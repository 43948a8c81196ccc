use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::canvas::RasterCanvas;
use super::encode::{encode_jpeg, EncodedImage};
use crate::media::VideoFrame;

/// Rasterizes the live frame into the shared canvas and encodes it
pub struct FrameSampler {
    canvas: Arc<Mutex<RasterCanvas>>,
    quality: f32,
}

impl FrameSampler {
    pub fn new(canvas: Arc<Mutex<RasterCanvas>>, quality: f32) -> Self {
        Self { canvas, quality }
    }

    pub fn canvas(&self) -> Arc<Mutex<RasterCanvas>> {
        Arc::clone(&self.canvas)
    }

    /// Draw `frame` and encode the canvas
    ///
    /// Returns `None` when the stream has not produced a frame yet. The canvas
    /// lock is released before encoding starts.
    pub async fn sample(&self, frame: Option<Arc<VideoFrame>>) -> Result<Option<EncodedImage>> {
        let Some(frame) = frame else {
            return Ok(None);
        };

        let raster = {
            let mut canvas = self.canvas.lock().await;
            canvas.draw(&frame);
            match canvas.raster() {
                Some(raster) => raster.clone(),
                None => return Ok(None),
            }
        };

        let quality = self.quality;
        let encoded = tokio::task::spawn_blocking(move || encode_jpeg(&raster, quality))
            .await
            .context("JPEG encode task failed")??;

        debug!(
            "Sampled frame {}x{} at t={}ms ({} bytes)",
            encoded.width,
            encoded.height,
            frame.timestamp_ms,
            encoded.bytes.len()
        );

        Ok(Some(encoded))
    }
}
