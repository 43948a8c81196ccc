use std::sync::Arc;
use tracing::info;

use super::backend::VideoFrame;
use super::stream::MediaStream;

/// The playback surface a live stream is bound to
///
/// Owns the stream handle from binding until release.
#[derive(Debug, Default)]
pub struct VideoSurface {
    source: Option<MediaStream>,
}

impl VideoSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a stream as the playback source, releasing any previous one
    pub fn bind(&mut self, stream: MediaStream) {
        self.release();
        info!("Bound stream {} to video surface", stream.id());
        self.source = Some(stream);
    }

    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }

    pub fn stream_id(&self) -> Option<String> {
        self.source.as_ref().map(|s| s.id().to_string())
    }

    /// Latest frame of the bound stream
    pub fn current_frame(&self) -> Option<Arc<VideoFrame>> {
        self.source.as_ref().and_then(MediaStream::latest_frame)
    }

    /// Native pixel dimensions of the latest frame
    pub fn native_size(&self) -> Option<(u32, u32)> {
        self.current_frame().map(|f| (f.width(), f.height()))
    }

    /// Stop the bound stream's tracks and unbind it
    ///
    /// Returns the number of tracks stopped; zero if nothing was bound.
    pub fn release(&mut self) -> usize {
        match self.source.take() {
            Some(mut stream) => {
                let stopped = stream.stop();
                info!("Released stream {} ({} tracks stopped)", stream.id(), stopped);
                stopped
            }
            None => 0,
        }
    }
}
