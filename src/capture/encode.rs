use anyhow::{Context, Result};
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

pub const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

/// A JPEG-encoded still
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Quality factor in (0, 1] the image was encoded with
    pub quality: f32,
}

impl EncodedImage {
    /// `data:image/jpeg;base64,...` form sent to the inference endpoint
    pub fn to_data_url(&self) -> String {
        let mut url = String::with_capacity(DATA_URL_PREFIX.len() + self.bytes.len() * 4 / 3 + 4);
        url.push_str(DATA_URL_PREFIX);
        base64::engine::general_purpose::STANDARD.encode_string(&self.bytes, &mut url);
        url
    }
}

/// Map a quality factor in (0, 1] onto the encoder's 1..=100 scale
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode a raster as JPEG
pub fn encode_jpeg(raster: &RgbImage, quality: f32) -> Result<EncodedImage> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality))
        .encode_image(raster)
        .context("Failed to encode JPEG")?;

    Ok(EncodedImage {
        bytes,
        width: raster.width(),
        height: raster.height(),
        quality,
    })
}
