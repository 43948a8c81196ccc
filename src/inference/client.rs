use tracing::debug;

use super::messages::{PredictRequest, PredictResponse};
use crate::capture::EncodedImage;

/// Why an inference round trip produced nothing usable
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed inference response (HTTP {status}): {reason}")]
    Malformed { status: u16, reason: String },

    #[error("inference server reported an error: {0}")]
    Server(String),
}

/// Sends encoded frames to an emotion inference endpoint
#[async_trait::async_trait]
pub trait InferenceClient: Send + Sync {
    async fn predict(&self, image: &EncodedImage) -> Result<PredictResponse, InferenceError>;

    /// Endpoint description for logging
    fn endpoint(&self) -> &str;
}

/// JSON-over-HTTP inference client
///
/// No timeout is set beyond reqwest's own defaults.
pub struct HttpInferenceClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpInferenceClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait::async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn predict(&self, image: &EncodedImage) -> Result<PredictResponse, InferenceError> {
        let request = PredictRequest {
            image: image.to_data_url(),
        };

        let response = self.http.post(&self.endpoint).json(&request).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!(
            "POST {} -> HTTP {} ({} bytes)",
            self.endpoint,
            status,
            body.len()
        );

        let parsed: PredictResponse =
            serde_json::from_slice(&body).map_err(|e| InferenceError::Malformed {
                status,
                reason: e.to_string(),
            })?;

        if parsed.emotion.is_none() {
            if let Some(error) = parsed.error {
                return Err(InferenceError::Server(error));
            }
        }

        Ok(parsed)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
