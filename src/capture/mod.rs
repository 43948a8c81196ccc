//! Frame sampling: raster canvas, JPEG encoding and the in-flight guard

pub mod canvas;
pub mod encode;
pub mod guard;
pub mod sampler;

pub use canvas::RasterCanvas;
pub use encode::{encode_jpeg, EncodedImage, DATA_URL_PREFIX};
pub use guard::{InFlightGuard, InFlightPermit};
pub use sampler::FrameSampler;
