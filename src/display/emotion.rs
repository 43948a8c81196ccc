use std::fmt;

/// Badge color used for Neutral and for any label missing from the table
pub const NEUTRAL_COLOR: &str = "#64748b";

const BADGE_COLORS: [(&str, &str); 7] = [
    ("Happy", "#22c55e"),
    ("Sad", "#3b82f6"),
    ("Angry", "#ef4444"),
    ("Surprise", "#f59e0b"),
    ("Fear", "#8b5cf6"),
    ("Disgusted", "#ec4899"),
    ("Neutral", NEUTRAL_COLOR),
];

/// Emotion label reported by the inference endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprise,
    Fear,
    Disgusted,
    Neutral,
    /// Any other label, kept verbatim (e.g. "No Face")
    Unrecognized(String),
}

impl Emotion {
    /// Parse a label; matching is exact and case-sensitive
    pub fn parse(label: &str) -> Self {
        match label {
            "Happy" => Emotion::Happy,
            "Sad" => Emotion::Sad,
            "Angry" => Emotion::Angry,
            "Surprise" => Emotion::Surprise,
            "Fear" => Emotion::Fear,
            "Disgusted" => Emotion::Disgusted,
            "Neutral" => Emotion::Neutral,
            other => Emotion::Unrecognized(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Angry => "Angry",
            Emotion::Surprise => "Surprise",
            Emotion::Fear => "Fear",
            Emotion::Disgusted => "Disgusted",
            Emotion::Neutral => "Neutral",
            Emotion::Unrecognized(label) => label,
        }
    }

    pub fn badge_color(&self) -> &'static str {
        badge_color(self.label())
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Look up a label's badge color, falling back to Neutral's
pub fn badge_color(label: &str) -> &'static str {
    BADGE_COLORS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, color)| *color)
        .unwrap_or(NEUTRAL_COLOR)
}

/// Confidence as a rounded integer percentage, `--` when unknown
pub fn format_confidence(confidence: Option<f64>) -> String {
    match confidence {
        Some(c) if c.is_finite() => format!("{}%", (c * 100.0).round() as i64),
        _ => "--".to_string(),
    }
}

/// Result of one inference round trip
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionResult {
    pub emotion: Emotion,
    /// Expected in [0, 1]; some servers omit it
    pub confidence: Option<f64>,
}
