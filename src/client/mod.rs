//! Capture-and-display client
//!
//! `EmotionClient` ties the pieces together:
//! - Camera acquisition and the bound video surface
//! - The periodic sampler, gated by the in-flight guard
//! - Inference requests and display updates
//! - Manual snapshots and teardown

mod client;
mod config;
mod stats;

pub use client::EmotionClient;
pub use config::{ClientConfig, ResamplePolicy};
pub use stats::{ClientPhase, ClientStats};
