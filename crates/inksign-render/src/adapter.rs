//! Raster surface adapter: normalizes image and PDF inputs into a [`DocumentRaster`].

use crate::error::{SignError, SignResult};
use crate::kind::DocumentKind;
use crate::pdf::{self, PageRasterizer, VectorPageRasterizer};
use crate::raster::DocumentRaster;
use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

/// Default cap on input size (10 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Default cap on the normalized raster (64 megapixels).
pub const DEFAULT_MAX_OUTPUT_PIXELS: u64 = 64 * 1024 * 1024;

/// Adapter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Pixels per PDF point when rasterizing a page.
    pub pdf_magnification: f64,
    /// Inputs larger than this are rejected before decoding.
    pub max_input_bytes: usize,
    /// Documents that would normalize to more pixels than this are rejected
    /// before any pixel buffer is allocated.
    pub max_output_pixels: u64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            pdf_magnification: 1.5,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            max_output_pixels: DEFAULT_MAX_OUTPUT_PIXELS,
        }
    }
}

impl AdapterConfig {
    /// Set the PDF magnification factor.
    pub fn with_pdf_magnification(mut self, magnification: f64) -> Self {
        self.pdf_magnification = magnification;
        self
    }

    /// Set the input size limit.
    pub fn with_max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = limit;
        self
    }

    /// Set the normalized raster size limit, in pixels.
    pub fn with_max_output_pixels(mut self, limit: u64) -> Self {
        self.max_output_pixels = limit;
        self
    }
}

/// Converts input buffers into document rasters.
///
/// Holds no state between calls besides its configuration and page rasterizer.
#[derive(Clone)]
pub struct RasterAdapter {
    config: AdapterConfig,
    rasterizer: Arc<dyn PageRasterizer>,
}

impl fmt::Debug for RasterAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for RasterAdapter {
    fn default() -> Self {
        Self::new(AdapterConfig::default())
    }
}

impl RasterAdapter {
    /// Create an adapter using the built-in vector page rasterizer.
    pub fn new(config: AdapterConfig) -> Self {
        Self::with_rasterizer(config, Arc::new(VectorPageRasterizer))
    }

    /// Create an adapter with a specific page rasterization backend.
    pub fn with_rasterizer(config: AdapterConfig, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        Self { config, rasterizer }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Load a buffer of a declared MIME-like kind (`image/*` or `application/pdf`).
    pub fn load(&self, bytes: &[u8], declared_kind: &str) -> SignResult<DocumentRaster> {
        let kind = DocumentKind::from_mime(declared_kind)?;
        self.load_kind(bytes, kind)
    }

    /// Load a buffer whose kind is detected from its magic bytes.
    pub fn load_sniffed(&self, bytes: &[u8]) -> SignResult<DocumentRaster> {
        let kind = DocumentKind::sniff(bytes)
            .ok_or_else(|| SignError::UnsupportedKind("unrecognized content".to_string()))?;
        self.load_kind(bytes, kind)
    }

    /// Load a buffer of a known kind, enforcing the size limit.
    pub fn load_kind(&self, bytes: &[u8], kind: DocumentKind) -> SignResult<DocumentRaster> {
        self.check_size(bytes)?;
        log::info!("Loading {:?} document ({} bytes)", kind, bytes.len());
        let raster = match kind {
            DocumentKind::Image => self.load_from_image_bytes(bytes),
            DocumentKind::Pdf => self.load_from_pdf_bytes(bytes),
        }?;
        log::info!("Document normalized to {}x{}", raster.width(), raster.height());
        Ok(raster)
    }

    /// Decode raster image bytes at their native pixel size.
    pub fn load_from_image_bytes(&self, bytes: &[u8]) -> SignResult<DocumentRaster> {
        let reader = || {
            ImageReader::new(Cursor::new(bytes))
                .with_guessed_format()
                .map_err(|e| SignError::Decode(e.to_string()))
        };
        let (width, height) = reader()?
            .into_dimensions()
            .map_err(|e| SignError::Decode(e.to_string()))?;
        if let Some(reason) = self.oversized(width, height) {
            return Err(SignError::Decode(reason));
        }

        let decoded = reader()?
            .decode()
            .map_err(|e| SignError::Decode(e.to_string()))?;
        DocumentRaster::new(decoded.to_rgba8())
            .ok_or_else(|| SignError::Decode("image has zero width or height".to_string()))
    }

    /// Rasterize page 1 of a PDF at the configured magnification.
    pub fn load_from_pdf_bytes(&self, bytes: &[u8]) -> SignResult<DocumentRaster> {
        let scale = self.config.pdf_magnification;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(SignError::Render(format!("invalid magnification {scale}")));
        }

        let document = pdf::open_document(bytes)?;
        let page = pdf::first_page(&document, scale)?;
        let expected = page.pixel_size();
        if let Some(reason) = self.oversized(expected.0, expected.1) {
            return Err(SignError::Render(reason));
        }

        let image = self.rasterizer.rasterize(&document, &page)?;
        if image.dimensions() != expected {
            return Err(SignError::Render(format!(
                "rasterizer produced {}x{}, expected {}x{}",
                image.width(),
                image.height(),
                expected.0,
                expected.1
            )));
        }
        DocumentRaster::new(image)
            .ok_or_else(|| SignError::Render("page rasterized to an empty image".to_string()))
    }

    fn oversized(&self, width: u32, height: u32) -> Option<String> {
        let pixels = u64::from(width) * u64::from(height);
        let limit = self.config.max_output_pixels;
        (pixels > limit).then(|| format!("{width}x{height} raster exceeds the {limit} pixel limit"))
    }

    fn check_size(&self, bytes: &[u8]) -> SignResult<()> {
        let limit = self.config.max_input_bytes;
        if bytes.len() > limit {
            return Err(SignError::InputTooLarge {
                size: bytes.len(),
                limit,
            });
        }
        Ok(())
    }
}
