// Lifecycle tests for the capture-and-display client
//
// Timer-driven tests run on paused tokio time, so a `sleep` of several
// seconds completes instantly while still firing every sampling tick.

use emotion_cam::capture::EncodedImage;
use emotion_cam::media::{
    CameraBackend, MediaConstraints, MediaStream, MediaTrack, SyntheticBackend, TrackKind,
    VideoFrame,
};
use emotion_cam::{
    ClientConfig, ClientPhase, EmotionClient, InferenceClient, InferenceError, PredictResponse,
    SnapshotError,
};
use image::GenericImageView;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::time::sleep;

type Reply = Box<dyn Fn(usize) -> Result<PredictResponse, InferenceError> + Send + Sync>;

/// Inference stub: counts calls, optionally blocks each call on a gate
struct ScriptedInference {
    calls: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
    reply: Reply,
}

impl ScriptedInference {
    fn new(reply: Reply) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: None,
            reply,
        }
    }

    fn gated(gate: Arc<Semaphore>, reply: Reply) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(reply)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InferenceClient for ScriptedInference {
    async fn predict(&self, image: &EncodedImage) -> Result<PredictResponse, InferenceError> {
        assert!(image.to_data_url().starts_with("data:image/jpeg;base64,"));
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate open").forget();
        }

        (self.reply)(call)
    }

    fn endpoint(&self) -> &str {
        "scripted"
    }
}

fn happy(_: usize) -> Result<PredictResponse, InferenceError> {
    Ok(PredictResponse {
        emotion: Some("Happy".to_string()),
        confidence: Some(0.873),
        error: None,
    })
}

fn test_config() -> ClientConfig {
    ClientConfig {
        constraints: MediaConstraints {
            ideal_width: 32,
            ideal_height: 24,
            frame_rate: 10,
        },
        ..ClientConfig::default()
    }
}

fn client_with(backend: SyntheticBackend, inference: Arc<ScriptedInference>) -> EmotionClient {
    EmotionClient::new(test_config(), Box::new(backend), inference)
}

#[tokio::test(start_paused = true)]
async fn test_ticks_dropped_while_request_in_flight() {
    let gate = Arc::new(Semaphore::new(0));
    let inference = Arc::new(ScriptedInference::gated(Arc::clone(&gate), Box::new(happy)));
    let client = client_with(SyntheticBackend::new(), Arc::clone(&inference));

    assert_eq!(client.start().await, ClientPhase::Armed);

    // Ticks at 2s, 4s, 6s; the first request never settles
    sleep(Duration::from_millis(7000)).await;

    let stats = client.stats().await;
    assert_eq!(inference.calls(), 1, "second request dispatched while guard set");
    assert_eq!(stats.ticks_fired, 3);
    assert_eq!(stats.ticks_dropped, 2);
    assert!(client.in_flight());

    // Settle the request: guard clears and the next tick dispatches again
    gate.add_permits(1);
    sleep(Duration::from_millis(100)).await;
    assert!(!client.in_flight());
    assert_eq!(client.display().current().label, "Happy");

    sleep(Duration::from_millis(2000)).await;
    assert_eq!(inference.calls(), 2);

    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_guard_cleared_after_failed_requests() {
    let inference = Arc::new(ScriptedInference::new(Box::new(|_| {
        Err(InferenceError::Server("model not loaded".to_string()))
    })));
    let client = client_with(SyntheticBackend::new(), Arc::clone(&inference));
    client.start().await;

    sleep(Duration::from_millis(5000)).await;

    let stats = client.stats().await;
    assert_eq!(inference.calls(), 2);
    assert_eq!(stats.requests_sent, 2);
    assert_eq!(stats.requests_failed, 2);
    assert_eq!(stats.ticks_dropped, 0);
    assert!(!client.in_flight());

    // Failures never reach the user
    let display = client.display().current();
    assert!(!display.error_visible);
    assert_eq!(display.label, "Detecting...");

    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_happy_response_updates_display() {
    let inference = Arc::new(ScriptedInference::new(Box::new(happy)));
    let client = client_with(SyntheticBackend::new(), Arc::clone(&inference));
    client.start().await;

    // Nothing is sent before the first period elapses
    sleep(Duration::from_millis(1500)).await;
    assert_eq!(inference.calls(), 0);

    sleep(Duration::from_millis(1000)).await;

    let display = client.display().current();
    assert_eq!(display.label, "Happy");
    assert_eq!(display.confidence, "87%");
    assert_eq!(display.badge_color, "#22c55e");
    assert_eq!(client.stats().await.updates_applied, 1);

    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unrecognized_label_uses_neutral_color() {
    let inference = Arc::new(ScriptedInference::new(Box::new(|_| {
        Ok(PredictResponse {
            emotion: Some("Unknown".to_string()),
            confidence: Some(0.5),
            error: None,
        })
    })));
    let client = client_with(SyntheticBackend::new(), inference);
    client.start().await;

    sleep(Duration::from_millis(2500)).await;

    let display = client.display().current();
    assert_eq!(display.label, "Unknown");
    assert_eq!(display.confidence, "50%");
    assert_eq!(display.badge_color, "#64748b");

    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_response_without_emotion_leaves_display() {
    let inference = Arc::new(ScriptedInference::new(Box::new(|call| {
        if call == 0 {
            happy(call)
        } else {
            Ok(PredictResponse::default())
        }
    })));
    let client = client_with(SyntheticBackend::new(), Arc::clone(&inference));
    client.start().await;

    sleep(Duration::from_millis(2500)).await;
    let before = client.display().current();
    assert_eq!(before.label, "Happy");

    sleep(Duration::from_millis(2000)).await;
    assert_eq!(inference.calls(), 2);
    assert_eq!(client.display().current(), before);

    client.teardown().await;
}

#[tokio::test(start_paused = true)]
async fn test_acquisition_failure_shows_error_and_never_samples() {
    let inference = Arc::new(ScriptedInference::new(Box::new(happy)));
    let client = client_with(
        SyntheticBackend::denied("permission denied by user"),
        Arc::clone(&inference),
    );

    assert_eq!(client.start().await, ClientPhase::Failed);

    let display = client.display().current();
    assert!(display.error_visible);
    assert!(display
        .error_message
        .unwrap()
        .contains("permission denied by user"));

    sleep(Duration::from_millis(10_000)).await;

    let stats = client.stats().await;
    assert_eq!(inference.calls(), 0);
    assert_eq!(stats.ticks_fired, 0);
    assert_eq!(stats.stream_id, None);
    assert_eq!(client.phase().await, ClientPhase::Failed);

    // Teardown with nothing armed or acquired is a no-op
    assert_eq!(client.teardown().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_stops_timer_and_tracks_once() {
    let backend = SyntheticBackend::new();
    let stop_signals = backend.stop_signals();
    let inference = Arc::new(ScriptedInference::new(Box::new(happy)));
    let client = client_with(backend, Arc::clone(&inference));
    client.start().await;

    sleep(Duration::from_millis(2500)).await;
    let fired = client.stats().await.ticks_fired;
    assert_eq!(fired, 1);

    assert_eq!(client.teardown().await, 1);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(stop_signals.load(Ordering::SeqCst), 1);

    // Second teardown has nothing left to stop
    assert_eq!(client.teardown().await, 0);

    sleep(Duration::from_millis(10_000)).await;
    let stats = client.stats().await;
    assert_eq!(stats.ticks_fired, fired, "tick fired after teardown");
    assert_eq!(stats.phase, ClientPhase::Stopped);
    assert_eq!(stats.stream_id, None);
    assert_eq!(stop_signals.load(Ordering::SeqCst), 1);
    assert_eq!(inference.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_late_result_after_teardown_is_discarded() {
    let gate = Arc::new(Semaphore::new(0));
    let inference = Arc::new(ScriptedInference::gated(Arc::clone(&gate), Box::new(happy)));
    let client = client_with(SyntheticBackend::new(), Arc::clone(&inference));
    client.start().await;

    sleep(Duration::from_millis(2500)).await;
    assert!(client.in_flight());

    client.teardown().await;
    gate.add_permits(1);
    sleep(Duration::from_millis(100)).await;

    assert!(!client.in_flight());
    assert_eq!(client.display().current().label, "Detecting...");
    assert_eq!(client.stats().await.updates_applied, 0);
}

#[tokio::test(start_paused = true)]
async fn test_start_only_runs_once() {
    let inference = Arc::new(ScriptedInference::new(Box::new(happy)));
    let client = client_with(SyntheticBackend::new(), inference);

    assert_eq!(client.start().await, ClientPhase::Armed);
    assert_eq!(client.start().await, ClientPhase::Armed);

    client.teardown().await;
    assert_eq!(client.start().await, ClientPhase::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_requires_a_rasterized_frame() {
    let inference = Arc::new(ScriptedInference::new(Box::new(happy)));
    let client = client_with(SyntheticBackend::new(), inference);
    client.start().await;

    // Camera is live but nothing has been rasterized yet
    assert!(matches!(client.snapshot().await, Err(SnapshotError::NoFrame)));
    assert!(!client.stats().await.snapshot_available);

    sleep(Duration::from_millis(2500)).await;
    assert!(client.stats().await.snapshot_available);

    let snapshot = client.snapshot().await.unwrap();
    let stamp = snapshot
        .file_name
        .strip_prefix("emotion-snapshot-")
        .and_then(|rest| rest.strip_suffix(".jpg"))
        .expect("snapshot file name pattern");
    assert!(!stamp.is_empty());
    assert!(stamp.chars().all(|c| c.is_ascii_digit()));

    let decoded = image::load_from_memory(&snapshot.jpeg).unwrap();
    assert_eq!(decoded.dimensions(), (32, 24));

    client.teardown().await;
}

/// Camera whose stream is live but has not delivered a frame yet
struct WarmingCamera {
    frames: watch::Receiver<Option<Arc<VideoFrame>>>,
}

#[async_trait::async_trait]
impl CameraBackend for WarmingCamera {
    async fn acquire(&mut self, _constraints: MediaConstraints) -> anyhow::Result<MediaStream> {
        let (track, _stop_rx) = MediaTrack::new(TrackKind::Video, "warming up");
        Ok(MediaStream::new(vec![track], self.frames.clone()))
    }

    fn name(&self) -> &str {
        "warming"
    }
}

#[tokio::test(start_paused = true)]
async fn test_tick_without_frame_sends_nothing() {
    let (frame_tx, frames) = watch::channel(None);
    let inference = Arc::new(ScriptedInference::new(Box::new(happy)));
    let client = EmotionClient::new(
        test_config(),
        Box::new(WarmingCamera { frames }),
        Arc::clone(&inference) as Arc<dyn InferenceClient>,
    );
    assert_eq!(client.start().await, ClientPhase::Armed);

    sleep(Duration::from_millis(2500)).await;

    let stats = client.stats().await;
    assert_eq!(stats.ticks_fired, 1);
    assert_eq!(stats.ticks_dropped, 0);
    assert_eq!(stats.requests_sent, 0);
    assert_eq!(inference.calls(), 0);
    assert!(!client.in_flight());
    assert!(!stats.snapshot_available);
    assert_eq!(client.display().current().label, "Detecting...");

    // First frame arrives; the next tick samples it
    frame_tx.send_replace(Some(Arc::new(VideoFrame {
        image: image::RgbImage::new(32, 24),
        timestamp_ms: 2600,
    })));
    sleep(Duration::from_millis(2000)).await;

    let stats = client.stats().await;
    assert_eq!(stats.ticks_fired, 2);
    assert_eq!(stats.requests_sent, 1);
    assert_eq!(client.display().current().label, "Happy");

    client.teardown().await;
}
