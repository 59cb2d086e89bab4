//! Error types shared by the adapter, the compositor and the session.

use inksign_core::SurfaceError;
use thiserror::Error;

/// Errors raised while loading, rendering or compositing a document.
#[derive(Debug, Error)]
pub enum SignError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to open PDF document: {0}")]
    DocumentOpen(String),
    #[error("PDF document has no pages")]
    PageNotFound,
    #[error("Failed to render PDF page: {0}")]
    Render(String),
    #[error("Unsupported document kind: {0}")]
    UnsupportedKind(String),
    #[error(transparent)]
    SurfaceInit(#[from] SurfaceError),
    #[error("No document loaded; load a document before signing")]
    NoDocument,
    #[error("Failed to encode output image: {0}")]
    Encode(String),
    #[error("Input is {size} bytes, over the {limit} byte limit")]
    InputTooLarge { size: usize, limit: usize },
}

/// Result type for signing operations.
pub type SignResult<T> = Result<T, SignError>;
