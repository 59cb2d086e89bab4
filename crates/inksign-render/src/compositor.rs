//! Flattening the signature onto the document.

use crate::encode::encode_png;
use crate::error::{SignError, SignResult};
use crate::raster::DocumentRaster;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};

/// Placement rule for the signature overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Uniform scale applied to the ink raster.
    pub signature_scale: f64,
    /// Distance in pixels from the scaled signature's bottom-right corner to
    /// the output's bottom-right corner, on both axes.
    pub margin_px: u32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            signature_scale: 0.5,
            margin_px: 50,
        }
    }
}

impl CompositorConfig {
    pub fn with_signature_scale(mut self, scale: f64) -> Self {
        self.signature_scale = scale;
        self
    }

    pub fn with_margin(mut self, margin_px: u32) -> Self {
        self.margin_px = margin_px;
        self
    }
}

/// Where the scaled signature lands on the output, in output pixels.
///
/// `x`/`y` go negative when the signature is larger than the document allows;
/// the part outside the output is clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    /// Apply the bottom-right anchoring rule for a signature of `signature` size.
    pub fn compute(output: (u32, u32), signature: (u32, u32), config: &CompositorConfig) -> Self {
        let width = scaled(signature.0, config.signature_scale);
        let height = scaled(signature.1, config.signature_scale);
        let margin = i64::from(config.margin_px);
        Self {
            x: i64::from(output.0) - i64::from(width) - margin,
            y: i64::from(output.1) - i64::from(height) - margin,
            width,
            height,
        }
    }
}

fn scaled(length: u32, scale: f64) -> u32 {
    ((f64::from(length) * scale).round() as u32).max(1)
}

/// The flattened, encoded output of one export.
#[derive(Debug, Clone)]
pub struct CompositeResult {
    png: Vec<u8>,
    width: u32,
    height: u32,
    placement: Option<Placement>,
}

impl CompositeResult {
    /// PNG bytes of the output.
    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Where the signature was drawn, or `None` for an empty ink raster.
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }
}

/// Combines a document raster with an ink raster.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: CompositorConfig,
}

impl Compositor {
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Compose and encode. Fails with [`SignError::NoDocument`] when no document is loaded.
    pub fn compose(
        &self,
        document: Option<&DocumentRaster>,
        signature: &RgbaImage,
    ) -> SignResult<CompositeResult> {
        let document = document.ok_or(SignError::NoDocument)?;
        let (image, placement) = self.compose_image(document, signature)?;
        let png = encode_png(&image)?;
        Ok(CompositeResult {
            png,
            width: image.width(),
            height: image.height(),
            placement,
        })
    }

    /// Compose without encoding. The output always has the document's dimensions.
    pub fn compose_image(
        &self,
        document: &DocumentRaster,
        signature: &RgbaImage,
    ) -> SignResult<(RgbaImage, Option<Placement>)> {
        let scale = self.config.signature_scale;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(SignError::Render(format!("invalid signature scale {scale}")));
        }

        let mut output = document.image().clone();
        if signature.width() == 0 || signature.height() == 0 {
            log::debug!("Empty ink raster, exporting document unchanged");
            return Ok((output, None));
        }

        let placement =
            Placement::compute(output.dimensions(), signature.dimensions(), &self.config);
        log::debug!(
            "Compositing {}x{} signature at ({}, {}) on {}x{} document",
            placement.width,
            placement.height,
            placement.x,
            placement.y,
            output.width(),
            output.height()
        );

        if (placement.width, placement.height) == signature.dimensions() {
            imageops::overlay(&mut output, signature, placement.x, placement.y);
        } else {
            let resized = imageops::resize(
                signature,
                placement.width,
                placement.height,
                FilterType::Triangle,
            );
            imageops::overlay(&mut output, &resized, placement.x, placement.y);
        }

        Ok((output, Some(placement)))
    }
}
