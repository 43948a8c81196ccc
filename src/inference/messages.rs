use serde::{Deserialize, Serialize};

use crate::display::{Emotion, EmotionResult};

/// Body of `POST /predict`
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub image: String, // data:image/jpeg;base64,...
}

/// Body returned by the inference endpoint
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// Set by the server when prediction failed
    #[serde(default)]
    pub error: Option<String>,
}

impl PredictResponse {
    /// The result to display, if the response carries a non-empty label
    pub fn into_result(self) -> Option<EmotionResult> {
        let label = self.emotion.filter(|label| !label.is_empty())?;
        Some(EmotionResult {
            emotion: Emotion::parse(&label),
            confidence: self.confidence,
        })
    }
}
