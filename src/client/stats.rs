use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle of the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientPhase {
    Uninitialized,
    Acquiring,
    /// Camera bound, sampling timer running
    Armed,
    /// Camera unavailable, error shown, no sampling
    Failed,
    Stopped,
}

/// Statistics about a running client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientStats {
    pub phase: ClientPhase,

    /// When the client was created
    pub started_at: DateTime<Utc>,

    pub uptime_secs: f64,

    /// ID of the bound camera stream, if any
    pub stream_id: Option<String>,

    /// Timer ticks fired so far
    pub ticks_fired: u64,

    /// Ticks dropped because a request was still in flight
    pub ticks_dropped: u64,

    pub requests_sent: u64,

    pub requests_failed: u64,

    /// Display updates applied from responses
    pub updates_applied: u64,

    /// Whether a snapshot can be taken
    pub snapshot_available: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub ticks_fired: AtomicU64,
    pub ticks_dropped: AtomicU64,
    pub requests_sent: AtomicU64,
    pub requests_failed: AtomicU64,
    pub updates_applied: AtomicU64,
}

impl Counters {
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::SeqCst)
    }
}
