// Linux webcam backend using V4L2 (MJPEG capture)
//
// Requires the `v4l2` cargo feature.

use anyhow::{bail, Context, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::watch;
use tracing::{error, info, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

use super::backend::{CameraBackend, MediaConstraints, VideoFrame};
use super::stream::{MediaStream, MediaTrack, TrackKind};

const MJPEG: &[u8; 4] = b"MJPG";

pub struct V4lBackend {
    index: usize,
    stop_signals: Arc<AtomicUsize>,
}

impl V4lBackend {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            stop_signals: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl CameraBackend for V4lBackend {
    async fn acquire(&mut self, constraints: MediaConstraints) -> Result<MediaStream> {
        let index = self.index;
        let dev = Device::new(index)
            .with_context(|| format!("Failed to open /dev/video{}", index))?;

        let mut fmt = dev.format().context("Failed to read capture format")?;
        fmt.width = constraints.ideal_width;
        fmt.height = constraints.ideal_height;
        fmt.fourcc = FourCC::new(MJPEG);
        // The driver answers with the closest format it supports
        let fmt = dev.set_format(&fmt).context("Failed to set capture format")?;
        if fmt.fourcc != FourCC::new(MJPEG) {
            bail!("/dev/video{} cannot deliver MJPEG (offers {})", index, fmt.fourcc);
        }

        info!(
            "V4L2 camera /dev/video{} started ({}x{})",
            index, fmt.width, fmt.height
        );

        let (frame_tx, frame_rx) = watch::channel(None);
        let (track, mut stop_rx) = MediaTrack::new(TrackKind::Video, format!("/dev/video{}", index));
        let stop_signals = Arc::clone(&self.stop_signals);

        std::thread::spawn(move || {
            let mut stream = match MmapStream::with_buffers(&dev, Type::VideoCapture, 4) {
                Ok(stream) => stream,
                Err(e) => {
                    error!("Failed to start V4L2 stream: {}", e);
                    return;
                }
            };
            let started = Instant::now();

            loop {
                match stop_rx.try_recv() {
                    Ok(()) => {
                        stop_signals.fetch_add(1, Ordering::SeqCst);
                        break;
                    }
                    Err(TryRecvError::Closed) => break,
                    Err(TryRecvError::Empty) => {}
                }

                let data = match stream.next() {
                    Ok((data, _meta)) => data,
                    Err(e) => {
                        warn!("V4L2 capture error: {}", e);
                        continue;
                    }
                };

                match image::load_from_memory_with_format(data, image::ImageFormat::Jpeg) {
                    Ok(decoded) => {
                        frame_tx.send_replace(Some(Arc::new(VideoFrame {
                            image: decoded.to_rgb8(),
                            timestamp_ms: started.elapsed().as_millis() as u64,
                        })));
                    }
                    Err(e) => warn!("Dropping undecodable MJPEG frame: {}", e),
                }
            }

            info!("V4L2 capture thread stopped");
        });

        Ok(MediaStream::new(vec![track], frame_rx))
    }

    fn name(&self) -> &str {
        "v4l2"
    }
}
