use crate::client::EmotionClient;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<EmotionClient>,
    /// Where downloaded snapshots are also saved, if anywhere
    pub snapshot_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(client: Arc<EmotionClient>) -> Self {
        Self {
            client,
            snapshot_dir: None,
        }
    }

    pub fn with_snapshot_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.snapshot_dir = dir;
        self
    }
}
