use anyhow::{bail, Result};
use image::RgbImage;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::stream::MediaStream;

/// A decoded camera frame (8-bit RGB)
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Pixels at the stream's native resolution
    pub image: RgbImage,
    /// Timestamp in milliseconds since the stream started
    pub timestamp_ms: u64,
}

impl VideoFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Requested capture parameters
///
/// Dimensions are preferences: a backend may deliver a different native
/// resolution and the sampler follows whatever arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    /// Frames per second the producer aims for
    pub frame_rate: u32,
}

/// Highest frame rate a producer is asked for
pub const MAX_FRAME_RATE: u32 = 1000;

impl MediaConstraints {
    /// Time between produced frames, never shorter than 1 ms
    pub fn frame_interval(&self) -> Duration {
        let fps = self.frame_rate.clamp(1, MAX_FRAME_RATE);
        Duration::from_secs_f64(1.0 / f64::from(fps)).max(Duration::from_millis(1))
    }
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 640,
            ideal_height: 480,
            frame_rate: 15,
        }
    }
}

/// Camera capture backend trait
///
/// Implementations:
/// - Synthetic: generated test pattern (development, tests)
/// - File: a still image replayed as a live stream
/// - V4L2: webcam devices on Linux (feature `v4l2`)
#[async_trait::async_trait]
pub trait CameraBackend: Send + Sync {
    /// Request a live video stream
    ///
    /// Fails when access is denied, no device exists, or the backend is
    /// unsupported on this platform.
    async fn acquire(&mut self, constraints: MediaConstraints) -> Result<MediaStream>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Camera source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraSource {
    /// Generated test pattern
    Synthetic,
    /// Still image file replayed as a stream
    File(PathBuf),
    /// Capture device (`/dev/video<index>`)
    Device(usize),
}

impl FromStr for CameraSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "synthetic" {
            return Ok(CameraSource::Synthetic);
        }
        if let Some(path) = s.strip_prefix("file:") {
            if path.is_empty() {
                bail!("file source needs a path, e.g. file:face.jpg");
            }
            return Ok(CameraSource::File(PathBuf::from(path)));
        }
        if let Some(index) = s.strip_prefix("device:") {
            let index = index
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid device index '{}'", index))?;
            return Ok(CameraSource::Device(index));
        }
        bail!(
            "unknown camera source '{}' (expected synthetic, file:<path> or device:<index>)",
            s
        )
    }
}

/// Camera backend factory
pub struct CameraBackendFactory;

impl CameraBackendFactory {
    /// Create the backend for a camera source
    pub fn create(source: CameraSource) -> Result<Box<dyn CameraBackend>> {
        match source {
            CameraSource::Synthetic => Ok(Box::new(super::synthetic::SyntheticBackend::new())),

            CameraSource::File(path) => Ok(Box::new(super::file::FileBackend::new(path))),

            CameraSource::Device(index) => {
                #[cfg(all(target_os = "linux", feature = "v4l2"))]
                {
                    Ok(Box::new(super::v4l::V4lBackend::new(index)))
                }

                #[cfg(not(all(target_os = "linux", feature = "v4l2")))]
                {
                    bail!(
                        "Camera device {} unavailable: device capture requires Linux and the `v4l2` feature",
                        index
                    )
                }
            }
        }
    }
}
