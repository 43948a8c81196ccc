// Synthetic camera backend: a moving gradient, no hardware needed

use anyhow::{bail, Result};
use image::{Rgb, RgbImage};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tracing::info;

use super::backend::{CameraBackend, MediaConstraints};
use super::stream::{spawn_frame_producer, MediaStream};

pub struct SyntheticBackend {
    denied: Option<String>,
    stop_signals: Arc<AtomicUsize>,
    acquisitions: usize,
}

impl SyntheticBackend {
    pub fn new() -> Self {
        Self {
            denied: None,
            stop_signals: Arc::new(AtomicUsize::new(0)),
            acquisitions: 0,
        }
    }

    /// A backend whose acquisition always fails, as when the user refuses
    /// camera permission
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            denied: Some(reason.into()),
            ..Self::new()
        }
    }

    /// Counter of stop signals received by tracks this backend produced
    pub fn stop_signals(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stop_signals)
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CameraBackend for SyntheticBackend {
    async fn acquire(&mut self, constraints: MediaConstraints) -> Result<MediaStream> {
        self.acquisitions += 1;

        if let Some(reason) = &self.denied {
            bail!("Camera access denied: {}", reason);
        }

        let (width, height) = (constraints.ideal_width, constraints.ideal_height);
        let frame_interval = constraints.frame_interval();

        info!(
            "Synthetic camera started ({}x{} @ {} fps)",
            width, height, constraints.frame_rate
        );

        spawn_frame_producer(
            format!("synthetic {}x{}", width, height),
            frame_interval,
            Arc::clone(&self.stop_signals),
            move |timestamp_ms| Ok(test_pattern(width, height, timestamp_ms)),
        )
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

/// Diagonal gradient that scrolls with time
pub fn test_pattern(width: u32, height: u32, timestamp_ms: u64) -> RgbImage {
    let (w, h) = (u64::from(width.max(1)), u64::from(height.max(1)));
    let shift = timestamp_ms / 10;
    RgbImage::from_fn(width, height, |x, y| {
        let (x, y) = (u64::from(x), u64::from(y));
        let r = ((x + shift % w) % w * 255 / w) as u8;
        let g = (y * 255 / h) as u8;
        let b = ((x + y + shift % 256) % 256) as u8;
        Rgb([r, g, b])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_matches_requested_size() {
        let image = test_pattern(32, 24, 1234);
        assert_eq!(image.dimensions(), (32, 24));
    }

    #[test]
    fn pattern_survives_long_running_streams() {
        let image = test_pattern(640, 480, 170_000_000);
        assert_eq!(image.dimensions(), (640, 480));

        let image = test_pattern(8, 8, u64::MAX);
        assert_eq!(image.dimensions(), (8, 8));
    }

    #[test]
    fn pattern_scrolls_horizontally() {
        // 10 ms per pixel of shift
        let earlier = test_pattern(64, 4, 0);
        let later = test_pattern(64, 4, 30);
        assert_eq!(later.get_pixel(0, 0)[0], earlier.get_pixel(3, 0)[0]);
    }

    #[tokio::test]
    async fn stream_above_millisecond_rate_still_advances() {
        let mut backend = SyntheticBackend::new();
        let constraints = MediaConstraints {
            ideal_width: 8,
            ideal_height: 8,
            frame_rate: 2000,
        };
        let mut stream = backend.acquire(constraints).await.unwrap();
        let mut frames = stream.frames();

        tokio::time::timeout(std::time::Duration::from_secs(1), frames.changed())
            .await
            .expect("frame within a second")
            .unwrap();
        assert!(stream.latest_frame().unwrap().timestamp_ms >= 1);
        assert_eq!(stream.stop(), 1);
    }

    #[tokio::test]
    async fn denied_backend_fails_acquisition() {
        let mut backend = SyntheticBackend::denied("permission dismissed");
        let err = backend.acquire(MediaConstraints::default()).await.unwrap_err();
        assert!(err.to_string().contains("permission dismissed"));
        assert_eq!(backend.acquisitions(), 1);
    }

    #[tokio::test]
    async fn acquired_stream_has_a_frame() {
        let mut backend = SyntheticBackend::new();
        let constraints = MediaConstraints {
            ideal_width: 16,
            ideal_height: 12,
            frame_rate: 30,
        };
        let mut stream = backend.acquire(constraints).await.unwrap();

        let frame = stream.latest_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (16, 12));
        assert_eq!(stream.stop(), 1);
    }
}
