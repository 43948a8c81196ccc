//! Emotion readout: label, confidence percentage, badge color and the
//! camera error banner

mod emotion;
mod updater;

pub use emotion::{badge_color, format_confidence, Emotion, EmotionResult, NEUTRAL_COLOR};
pub use updater::{DisplayState, DisplayUpdater};
