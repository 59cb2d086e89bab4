//! PNG output encoding.

use crate::error::{SignError, SignResult};
use image::RgbaImage;

/// Encode an RGBA8 image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> SignResult<Vec<u8>> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(SignError::Encode(format!(
            "cannot encode a {}x{} image",
            width, height
        )));
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| SignError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(image.as_raw())
            .map_err(|e| SignError::Encode(format!("PNG data: {e}")))?;
        writer
            .finish()
            .map_err(|e| SignError::Encode(e.to_string()))?;
    }

    log::debug!("Encoded {}x{} PNG ({} bytes)", width, height, png_data.len());
    Ok(png_data)
}
