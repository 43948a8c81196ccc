pub mod client;
pub mod messages;
pub mod requester;

pub use client::{HttpInferenceClient, InferenceClient, InferenceError};
pub use messages::{PredictRequest, PredictResponse};
pub use requester::{InferenceRequester, RequestOutcome};
