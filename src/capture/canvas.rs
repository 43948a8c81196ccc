use image::RgbImage;

use crate::media::VideoFrame;

/// Off-screen raster holding the most recently drawn frame
///
/// Sized to the native dimensions of whatever frame was drawn last; the
/// buffer is reused in place while the dimensions stay the same.
#[derive(Debug, Default)]
pub struct RasterCanvas {
    raster: Option<RgbImage>,
    frames_drawn: u64,
}

impl RasterCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterize `frame`, resizing the canvas if the stream resolution changed
    pub fn draw(&mut self, frame: &VideoFrame) {
        let (width, height) = frame.image.dimensions();
        match &mut self.raster {
            Some(raster) if raster.dimensions() == (width, height) => {
                raster.copy_from_slice(frame.image.as_raw());
            }
            _ => self.raster = Some(frame.image.clone()),
        }
        self.frames_drawn += 1;
    }

    pub fn has_frame(&self) -> bool {
        self.raster.is_some()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.raster.as_ref().map(RgbImage::dimensions)
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn raster(&self) -> Option<&RgbImage> {
        self.raster.as_ref()
    }
}
