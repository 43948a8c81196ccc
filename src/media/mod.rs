pub mod acquirer;
pub mod backend;
pub mod file;
pub mod stream;
pub mod surface;
pub mod synthetic;

#[cfg(all(target_os = "linux", feature = "v4l2"))]
pub mod v4l;

pub use acquirer::MediaAcquirer;
pub use backend::{
    CameraBackend, CameraBackendFactory, CameraSource, MediaConstraints, VideoFrame, MAX_FRAME_RATE,
};
pub use file::FileBackend;
pub use stream::{MediaStream, MediaTrack, TrackKind, TrackState};
pub use surface::VideoSurface;
pub use synthetic::SyntheticBackend;
