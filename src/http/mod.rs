//! Local HTTP surface for the client
//!
//! - GET /emotion - Current label, confidence, badge color and error banner
//! - GET /status - Lifecycle phase and counters
//! - GET /snapshot - Download the latest frame as JPEG
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
