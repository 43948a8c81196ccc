pub mod capture;
pub mod client;
pub mod config;
pub mod display;
pub mod http;
pub mod inference;
pub mod media;
pub mod snapshot;

pub use capture::{EncodedImage, FrameSampler, InFlightGuard, RasterCanvas};
pub use client::{ClientConfig, ClientPhase, ClientStats, EmotionClient, ResamplePolicy};
pub use config::Config;
pub use display::{DisplayState, DisplayUpdater, Emotion, EmotionResult};
pub use http::{create_router, AppState};
pub use inference::{HttpInferenceClient, InferenceClient, InferenceError, PredictResponse};
pub use media::{CameraBackend, CameraBackendFactory, CameraSource, MediaConstraints, MediaStream};
pub use snapshot::{Snapshot, SnapshotAction, SnapshotError};
