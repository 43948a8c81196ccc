use std::sync::Arc;
use tracing::{debug, error, warn};

use super::client::{InferenceClient, InferenceError};
use crate::capture::EncodedImage;
use crate::display::EmotionResult;

/// Outcome of one request, as seen by the sampling loop
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// Response carried a label to display
    Result(EmotionResult),
    /// Response was well-formed but had nothing to display
    NoResult,
    /// Transport, parse or server failure; already logged
    Failed,
}

/// Issues inference requests and swallows their failures
///
/// Failures are never retried: the next scheduled tick samples a fresh frame.
pub struct InferenceRequester {
    client: Arc<dyn InferenceClient>,
}

impl InferenceRequester {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }

    pub async fn request(&self, image: &EncodedImage) -> RequestOutcome {
        match self.client.predict(image).await {
            Ok(response) => match response.into_result() {
                Some(result) => RequestOutcome::Result(result),
                None => {
                    debug!("Response from {} had no emotion", self.client.endpoint());
                    RequestOutcome::NoResult
                }
            },
            Err(e @ InferenceError::Server(_)) => {
                warn!("Error processing frame: {}", e);
                RequestOutcome::Failed
            }
            Err(e) => {
                error!("Error processing frame: {}", e);
                RequestOutcome::Failed
            }
        }
    }
}
