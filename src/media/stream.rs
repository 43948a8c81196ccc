use anyhow::Result;
use image::RgbImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use super::backend::VideoFrame;

/// Kind of media a track carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// Lifecycle of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// One source track of a media stream
///
/// The stop signal is a one-shot channel to the producer, so it can be
/// delivered at most once.
#[derive(Debug)]
pub struct MediaTrack {
    kind: TrackKind,
    label: String,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl MediaTrack {
    /// Create a live track and the receiver that its producer watches
    pub fn new(kind: TrackKind, label: impl Into<String>) -> (Self, oneshot::Receiver<()>) {
        let (stop_tx, stop_rx) = oneshot::channel();
        let track = Self {
            kind,
            label: label.into(),
            stop_tx: Some(stop_tx),
        };
        (track, stop_rx)
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> TrackState {
        if self.stop_tx.is_some() {
            TrackState::Live
        } else {
            TrackState::Ended
        }
    }

    /// Signal the producer to stop
    ///
    /// Returns `false` if the track had already ended.
    pub fn stop(&mut self) -> bool {
        match self.stop_tx.take() {
            Some(tx) => {
                // Producer may already be gone; the track is ended either way
                let _ = tx.send(());
                debug!("Stopped track '{}'", self.label);
                true
            }
            None => false,
        }
    }
}

impl Drop for MediaTrack {
    fn drop(&mut self) {
        self.stop();
    }
}

/// An owned live media source
///
/// Frames are published through a watch channel: readers only ever see the
/// latest one.
#[derive(Debug)]
pub struct MediaStream {
    id: String,
    tracks: Vec<MediaTrack>,
    frames: watch::Receiver<Option<Arc<VideoFrame>>>,
}

impl MediaStream {
    pub fn new(tracks: Vec<MediaTrack>, frames: watch::Receiver<Option<Arc<VideoFrame>>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tracks,
            frames,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    /// True while any track is live
    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(|t| t.state() == TrackState::Live)
    }

    /// Most recent frame, if the producer has delivered one
    pub fn latest_frame(&self) -> Option<Arc<VideoFrame>> {
        self.frames.borrow().clone()
    }

    /// Receiver for frame updates
    pub fn frames(&self) -> watch::Receiver<Option<Arc<VideoFrame>>> {
        self.frames.clone()
    }

    /// Stop every track, returning how many were live
    pub fn stop(&mut self) -> usize {
        self.tracks.iter_mut().map(MediaTrack::stop).filter(|stopped| *stopped).count()
    }
}

/// Spawn a producer task that publishes a new frame every `frame_interval`
/// until its track is stopped
///
/// The first frame is rendered before returning so a freshly acquired stream
/// always has a frame. `stop_signals` is incremented when the stop signal
/// arrives.
pub(crate) fn spawn_frame_producer<F>(
    label: String,
    frame_interval: Duration,
    stop_signals: Arc<AtomicUsize>,
    mut render: F,
) -> Result<MediaStream>
where
    F: FnMut(u64) -> Result<RgbImage> + Send + 'static,
{
    let first = VideoFrame {
        image: render(0)?,
        timestamp_ms: 0,
    };
    let (frame_tx, frame_rx) = watch::channel(Some(Arc::new(first)));
    let (track, mut stop_rx) = MediaTrack::new(TrackKind::Video, label.clone());
    let frame_interval = frame_interval.max(Duration::from_millis(1));

    tokio::spawn(async move {
        let started = time::Instant::now();
        let mut ticker = time::interval_at(started + frame_interval, frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = &mut stop_rx => {
                    stop_signals.fetch_add(1, Ordering::SeqCst);
                    break;
                }
                _ = ticker.tick() => {
                    let timestamp_ms = started.elapsed().as_millis() as u64;
                    match render(timestamp_ms) {
                        Ok(image) => {
                            frame_tx.send_replace(Some(Arc::new(VideoFrame { image, timestamp_ms })));
                        }
                        Err(e) => warn!("Frame producer '{}' failed: {}", label, e),
                    }
                }
            }
        }

        debug!("Frame producer '{}' stopped", label);
    });

    Ok(MediaStream::new(vec![track], frame_rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_stops_only_once() {
        let (mut track, mut stop_rx) = MediaTrack::new(TrackKind::Video, "cam");
        assert_eq!(track.state(), TrackState::Live);

        assert!(track.stop());
        assert!(!track.stop());
        assert_eq!(track.state(), TrackState::Ended);
        assert!(stop_rx.try_recv().is_ok());
    }

    #[test]
    fn dropping_a_track_signals_stop() {
        let (track, mut stop_rx) = MediaTrack::new(TrackKind::Audio, "mic");
        drop(track);
        assert!(stop_rx.try_recv().is_ok());
    }

    #[test]
    fn stream_stop_counts_live_tracks() {
        let (video, _video_rx) = MediaTrack::new(TrackKind::Video, "cam");
        let (audio, _audio_rx) = MediaTrack::new(TrackKind::Audio, "mic");
        let (_tx, frames) = watch::channel(None);
        let mut stream = MediaStream::new(vec![video, audio], frames);

        assert!(stream.is_active());
        assert!(stream.latest_frame().is_none());
        assert_eq!(stream.stop(), 2);
        assert_eq!(stream.stop(), 0);
        assert!(!stream.is_active());
    }

    #[tokio::test]
    async fn producer_publishes_first_frame_immediately() {
        let stops = Arc::new(AtomicUsize::new(0));
        let mut stream = spawn_frame_producer(
            "pattern".to_string(),
            Duration::from_millis(10),
            Arc::clone(&stops),
            |_| Ok(RgbImage::new(4, 3)),
        )
        .unwrap();

        let frame = stream.latest_frame().expect("first frame");
        assert_eq!((frame.width(), frame.height()), (4, 3));

        assert_eq!(stream.stop(), 1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }
}
