//! InkSign Render Library
//!
//! Everything that touches pixels: normalizing documents (raster images and
//! the first page of a PDF) into a [`DocumentRaster`], rasterizing the ink
//! capture surface, and compositing the signature onto the document.
//! Rasterization runs on the CPU through `vello_cpu`.

pub mod adapter;
pub mod compositor;
mod encode;
mod error;
pub mod ink;
pub mod kind;
pub mod pdf;
mod raster;
pub mod session;

pub use adapter::{AdapterConfig, RasterAdapter};
pub use compositor::{CompositeResult, Compositor, CompositorConfig, Placement};
pub use encode::encode_png;
pub use error::{SignError, SignResult};
pub use ink::{RenderToRaster, render_strokes};
pub use kind::DocumentKind;
pub use pdf::{PageGeometry, PageRasterizer, PdfPage, VectorPageRasterizer};
pub use raster::DocumentRaster;
pub use session::{LoadOutcome, LoadTicket, SUGGESTED_FILE_NAME, SigningConfig, SigningSession};
