use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::{info, warn};

use super::emotion::{format_confidence, EmotionResult, NEUTRAL_COLOR};

/// What the user sees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Label text exactly as reported
    pub label: String,
    /// Rounded percentage, e.g. "87%"
    pub confidence: String,
    /// Badge background color
    pub badge_color: String,
    /// Whether the camera error banner is showing
    pub error_visible: bool,
    pub error_message: Option<String>,
    /// When the last emotion update was applied
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            label: "Detecting...".to_string(),
            confidence: "--".to_string(),
            badge_color: NEUTRAL_COLOR.to_string(),
            error_visible: false,
            error_message: None,
            updated_at: None,
        }
    }
}

/// Applies emotion results and error-banner changes to the display state
pub struct DisplayUpdater {
    state: watch::Sender<DisplayState>,
    detached: AtomicBool,
}

impl DisplayUpdater {
    pub fn new() -> Self {
        let (state, _) = watch::channel(DisplayState::default());
        Self {
            state,
            detached: AtomicBool::new(false),
        }
    }

    /// Show `result`; returns `false` if the display has been detached
    pub fn update(&self, result: &EmotionResult) -> bool {
        if self.is_detached() {
            warn!("Ignoring late result '{}' after teardown", result.emotion);
            return false;
        }

        let label = result.emotion.label().to_string();
        let confidence = format_confidence(result.confidence);
        let badge_color = result.emotion.badge_color().to_string();

        info!("Emotion: {} ({})", label, confidence);

        self.state.send_modify(|state| {
            state.label = label;
            state.confidence = confidence;
            state.badge_color = badge_color;
            state.updated_at = Some(Utc::now());
        });
        true
    }

    pub fn show_error(&self, message: impl Into<String>) {
        let message = message.into();
        self.state.send_modify(|state| {
            state.error_visible = true;
            state.error_message = Some(message);
        });
    }

    pub fn hide_error(&self) {
        self.state.send_modify(|state| {
            state.error_visible = false;
            state.error_message = None;
        });
    }

    /// Stop accepting updates (teardown)
    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    pub fn current(&self) -> DisplayState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.state.subscribe()
    }
}

impl Default for DisplayUpdater {
    fn default() -> Self {
        Self::new()
    }
}
