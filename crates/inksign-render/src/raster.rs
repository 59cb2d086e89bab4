//! In-memory raster surfaces.

use crate::error::{SignError, SignResult};
use image::RgbaImage;
use image::imageops::FilterType;
use vello_cpu::Pixmap;

/// The normalized document surface: straight-alpha RGBA8 pixels.
///
/// Width and height are always non-zero.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRaster {
    image: RgbaImage,
}

impl DocumentRaster {
    /// Wrap decoded pixels. Returns `None` for a zero-sized image.
    pub fn new(image: RgbaImage) -> Option<Self> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }
        Some(Self { image })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// The pixel buffer.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Downscaled copy fitting within `max_width x max_height`, aspect preserved.
    ///
    /// Documents already inside the box are returned at native size.
    pub fn preview(&self, max_width: u32, max_height: u32) -> RgbaImage {
        let (width, height) = fit_within(self.dimensions(), max_width, max_height);
        if (width, height) == self.dimensions() {
            return self.image.clone();
        }
        image::imageops::resize(&self.image, width, height, FilterType::Triangle)
    }
}

/// Scale `(width, height)` down to fit within the box while preserving aspect ratio.
fn fit_within((width, height): (u32, u32), max_width: u32, max_height: u32) -> (u32, u32) {
    let max_width = max_width.max(1);
    let max_height = max_height.max(1);
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let aspect = f64::from(width) / f64::from(height);
    let target_aspect = f64::from(max_width) / f64::from(max_height);

    if aspect > target_aspect {
        // Wider than target - fit to width
        let fitted = (f64::from(max_width) / aspect).round() as u32;
        (max_width, fitted.max(1))
    } else {
        // Taller than target - fit to height
        let fitted = (f64::from(max_height) * aspect).round() as u32;
        (fitted.max(1), max_height)
    }
}

/// Check that a surface fits the rasterizer's 16-bit dimensions.
pub(crate) fn pixmap_dimensions(width: u32, height: u32) -> SignResult<(u16, u16)> {
    match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(SignError::Render(format!(
            "surface size {}x{} is outside the supported range 1..={}",
            width,
            height,
            u16::MAX
        ))),
    }
}

/// Convert a premultiplied `vello_cpu` pixmap into a straight-alpha image.
pub(crate) fn pixmap_to_image(pixmap: &Pixmap) -> SignResult<RgbaImage> {
    let mut data = pixmap.data_as_u8_slice().to_vec();
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px.copy_from_slice(&[0, 0, 0, 0]);
        } else if a < 255 {
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
    }
    RgbaImage::from_raw(u32::from(pixmap.width()), u32::from(pixmap.height()), data)
        .ok_or_else(|| SignError::Render("rasterizer returned a short pixel buffer".to_string()))
}
