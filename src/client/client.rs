use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::config::ClientConfig;
use super::stats::{ClientPhase, ClientStats, Counters};
use crate::capture::{FrameSampler, InFlightGuard, InFlightPermit, RasterCanvas};
use crate::display::DisplayUpdater;
use crate::inference::{InferenceClient, InferenceRequester, RequestOutcome};
use crate::media::{CameraBackend, MediaAcquirer, VideoSurface};
use crate::snapshot::{Snapshot, SnapshotAction, SnapshotError};

/// Mutable lifecycle state
struct ClientState {
    phase: ClientPhase,
    /// Sampling timer task, present while armed
    timer: Option<JoinHandle<()>>,
}

/// Everything a tick touches, shared with the timer and request tasks
struct Pipeline {
    surface: Mutex<VideoSurface>,
    sampler: FrameSampler,
    requester: InferenceRequester,
    display: Arc<DisplayUpdater>,
    in_flight: InFlightGuard,
    counters: Counters,
}

impl Pipeline {
    /// One timer tick: dropped if a request is still outstanding
    fn on_tick(self: &Arc<Self>) {
        Counters::bump(&self.counters.ticks_fired);

        let Some(permit) = self.in_flight.try_acquire() else {
            Counters::bump(&self.counters.ticks_dropped);
            debug!("Tick dropped: inference request still in flight");
            return;
        };

        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            pipeline.process_frame(permit).await;
        });
    }

    /// Sample, request, display. The permit is released when this returns.
    async fn process_frame(&self, _permit: InFlightPermit) {
        let frame = self.surface.lock().await.current_frame();

        let image = match self.sampler.sample(frame).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                debug!("No video frame available yet, skipping tick");
                return;
            }
            Err(e) => {
                error!("Error processing frame: {:#}", e);
                return;
            }
        };

        Counters::bump(&self.counters.requests_sent);

        match self.requester.request(&image).await {
            RequestOutcome::Result(result) => {
                if self.display.update(&result) {
                    Counters::bump(&self.counters.updates_applied);
                }
            }
            RequestOutcome::NoResult => {}
            RequestOutcome::Failed => Counters::bump(&self.counters.requests_failed),
        }
    }
}

/// Capture-and-display client
///
/// Acquires the camera once, samples a frame every `sample_interval`, sends
/// it for inference and shows the result. At most one request is in flight.
pub struct EmotionClient {
    config: ClientConfig,
    acquirer: Mutex<MediaAcquirer>,
    pipeline: Arc<Pipeline>,
    snapshot: SnapshotAction,
    state: Mutex<ClientState>,
    started_at: chrono::DateTime<Utc>,
}

impl EmotionClient {
    pub fn new(
        config: ClientConfig,
        camera: Box<dyn CameraBackend>,
        inference: Arc<dyn InferenceClient>,
    ) -> Self {
        let canvas = Arc::new(Mutex::new(RasterCanvas::new()));

        let pipeline = Arc::new(Pipeline {
            surface: Mutex::new(VideoSurface::new()),
            sampler: FrameSampler::new(Arc::clone(&canvas), config.encode_quality),
            requester: InferenceRequester::new(inference),
            display: Arc::new(DisplayUpdater::new()),
            in_flight: InFlightGuard::new(),
            counters: Counters::default(),
        });

        Self {
            snapshot: SnapshotAction::new(canvas, config.snapshot_quality),
            acquirer: Mutex::new(MediaAcquirer::new(camera)),
            pipeline,
            state: Mutex::new(ClientState {
                phase: ClientPhase::Uninitialized,
                timer: None,
            }),
            started_at: Utc::now(),
            config,
        }
    }

    /// Acquire the camera and, on success, arm the sampling timer
    ///
    /// Acquisition failure shows the error banner and leaves the client in
    /// `Failed`. Only the first call does anything.
    pub async fn start(&self) -> ClientPhase {
        {
            let mut state = self.state.lock().await;
            if state.phase != ClientPhase::Uninitialized {
                warn!("Client already started ({:?})", state.phase);
                return state.phase;
            }
            state.phase = ClientPhase::Acquiring;
        }

        let acquired = {
            let mut acquirer = self.acquirer.lock().await;
            acquirer.acquire(self.config.constraints).await
        };

        let mut state = self.state.lock().await;

        if state.phase == ClientPhase::Stopped {
            // Torn down while waiting for the camera
            if let Ok(mut stream) = acquired {
                stream.stop();
            }
            return state.phase;
        }

        match acquired {
            Ok(stream) => {
                self.pipeline.surface.lock().await.bind(stream);
                self.pipeline.display.hide_error();
                state.timer = Some(self.arm());
                state.phase = ClientPhase::Armed;
                info!(
                    "Sampling every {} ms ({:?})",
                    self.config.sample_interval.as_millis(),
                    self.config.resample_policy
                );
            }
            Err(e) => {
                error!("Error accessing webcam: {:#}", e);
                self.pipeline.display.show_error(format!("{:#}", e));
                state.phase = ClientPhase::Failed;
            }
        }

        state.phase
    }

    /// Spawn the sampling timer; the first tick fires one period from now
    fn arm(&self) -> JoinHandle<()> {
        let pipeline = Arc::clone(&self.pipeline);
        let period = self.config.sample_interval;

        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                pipeline.on_tick();
            }
        })
    }

    /// Cancel the timer and release the camera
    ///
    /// Safe to call in any phase and more than once. Returns the number of
    /// tracks stopped. Requests still in flight finish, but their results are
    /// discarded.
    pub async fn teardown(&self) -> usize {
        let mut state = self.state.lock().await;

        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        self.pipeline.display.detach();
        let stopped = self.pipeline.surface.lock().await.release();

        if state.phase != ClientPhase::Stopped {
            info!("Client stopped (was {:?}, {} tracks stopped)", state.phase, stopped);
        }
        state.phase = ClientPhase::Stopped;

        stopped
    }

    pub async fn phase(&self) -> ClientPhase {
        self.state.lock().await.phase
    }

    pub fn display(&self) -> Arc<DisplayUpdater> {
        Arc::clone(&self.pipeline.display)
    }

    pub fn in_flight(&self) -> bool {
        self.pipeline.in_flight.is_set()
    }

    /// Encode the latest rasterized frame for download
    pub async fn snapshot(&self) -> Result<Snapshot, SnapshotError> {
        self.snapshot.take().await
    }

    pub async fn stats(&self) -> ClientStats {
        let phase = self.phase().await;
        let stream_id = self.pipeline.surface.lock().await.stream_id();
        let counters = &self.pipeline.counters;
        let uptime = Utc::now().signed_duration_since(self.started_at);

        ClientStats {
            phase,
            started_at: self.started_at,
            uptime_secs: uptime.num_milliseconds() as f64 / 1000.0,
            stream_id,
            ticks_fired: Counters::get(&counters.ticks_fired),
            ticks_dropped: Counters::get(&counters.ticks_dropped),
            requests_sent: Counters::get(&counters.requests_sent),
            requests_failed: Counters::get(&counters.requests_failed),
            updates_applied: Counters::get(&counters.updates_applied),
            snapshot_available: self.snapshot.is_available().await,
        }
    }
}
