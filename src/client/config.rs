use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::media::MediaConstraints;

/// What happens after a failed inference request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplePolicy {
    /// Nothing is retried or backed off; the next scheduled tick samples a
    /// fresh frame and tries again
    BestEffortPeriodic,
}

/// Configuration for the capture-and-display client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Period of the sampling timer
    /// Default: 2000 ms
    pub sample_interval: Duration,

    /// JPEG quality of frames sent for inference, in (0, 1]
    pub encode_quality: f32,

    /// JPEG quality of manual snapshots, in (0, 1]
    pub snapshot_quality: f32,

    /// Preferred camera parameters
    pub constraints: MediaConstraints,

    pub resample_policy: ResamplePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(2000),
            encode_quality: 0.8,
            snapshot_quality: 1.0,
            constraints: MediaConstraints::default(),
            resample_policy: ResamplePolicy::BestEffortPeriodic,
        }
    }
}
