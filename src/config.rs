use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::client::{ClientConfig, ResamplePolicy};
use crate::media::{CameraSource, MediaConstraints, MAX_FRAME_RATE};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub camera: CameraConfig,
    pub sampler: SamplerConfig,
    pub inference: InferenceConfig,
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    /// `synthetic`, `file:<path>` or `device:<index>`
    pub source: String,
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub frame_rate: u32,
}

#[derive(Debug, Deserialize)]
pub struct SamplerConfig {
    pub interval_ms: u64,
    /// JPEG quality in (0, 1]
    pub jpeg_quality: f32,
}

#[derive(Debug, Deserialize)]
pub struct InferenceConfig {
    pub endpoint: String,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotConfig {
    pub quality: f32,
    pub output_dir: Option<String>,
}

impl Config {
    /// Load defaults, then `path` (any extension, optional), then
    /// `EMOTION_CAM_*` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "emotion-cam")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8080_i64)?
            .set_default("camera.source", "synthetic")?
            .set_default("camera.ideal_width", 640_i64)?
            .set_default("camera.ideal_height", 480_i64)?
            .set_default("camera.frame_rate", 15_i64)?
            .set_default("sampler.interval_ms", 2000_i64)?
            .set_default("sampler.jpeg_quality", 0.8_f64)?
            .set_default("inference.endpoint", "http://127.0.0.1:5000/predict")?
            .set_default("snapshot.quality", 1.0_f64)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("EMOTION_CAM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        let cfg: Config = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sampler.interval_ms == 0 {
            bail!("sampler.interval_ms must be greater than zero");
        }
        check_quality("sampler.jpeg_quality", self.sampler.jpeg_quality)?;
        check_quality("snapshot.quality", self.snapshot.quality)?;
        if self.camera.ideal_width == 0 || self.camera.ideal_height == 0 {
            bail!("camera.ideal_width and camera.ideal_height must be non-zero");
        }
        if self.camera.frame_rate == 0 || self.camera.frame_rate > MAX_FRAME_RATE {
            bail!(
                "camera.frame_rate must be between 1 and {}, got {}",
                MAX_FRAME_RATE,
                self.camera.frame_rate
            );
        }
        self.camera_source()?;
        Ok(())
    }

    pub fn camera_source(&self) -> Result<CameraSource> {
        self.camera
            .source
            .parse()
            .with_context(|| format!("Invalid camera.source '{}'", self.camera.source))
    }

    /// Snapshot directory with `~` expanded, if one is configured
    pub fn snapshot_dir(&self) -> Option<PathBuf> {
        self.snapshot
            .output_dir
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            sample_interval: Duration::from_millis(self.sampler.interval_ms),
            encode_quality: self.sampler.jpeg_quality,
            snapshot_quality: self.snapshot.quality,
            constraints: MediaConstraints {
                ideal_width: self.camera.ideal_width,
                ideal_height: self.camera.ideal_height,
                frame_rate: self.camera.frame_rate,
            },
            resample_policy: ResamplePolicy::BestEffortPeriodic,
        }
    }
}

fn check_quality(key: &str, quality: f32) -> Result<()> {
    if !(quality > 0.0 && quality <= 1.0) {
        bail!("{} must be in (0, 1], got {}", key, quality);
    }
    Ok(())
}
