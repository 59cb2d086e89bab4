//! Document kind resolution from MIME strings, extensions and magic bytes.

use crate::error::{SignError, SignResult};
use serde::{Deserialize, Serialize};

/// How many leading bytes may precede the `%PDF-` header.
const PDF_HEADER_SEARCH_WINDOW: usize = 1024;

/// The two input families the adapter can normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Any raster image format the decoder supports.
    Image,
    /// A PDF document; only the first page is used.
    Pdf,
}

impl DocumentKind {
    /// Resolve a MIME-like kind string (`image/*`, `application/pdf`).
    ///
    /// Parameters after `;` are ignored and matching is case-insensitive.
    pub fn from_mime(kind: &str) -> SignResult<Self> {
        let essence = kind
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.split_once('/') {
            Some(("image", subtype)) if !subtype.is_empty() => Ok(DocumentKind::Image),
            Some(("application", "pdf")) => Ok(DocumentKind::Pdf),
            _ => Err(SignError::UnsupportedKind(kind.to_string())),
        }
    }

    /// Detect the kind from leading magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        let window = &data[..data.len().min(PDF_HEADER_SEARCH_WINDOW)];
        if window.windows(5).any(|w| w == b"%PDF-") {
            return Some(DocumentKind::Pdf);
        }
        image::guess_format(data).ok().map(|_| DocumentKind::Image)
    }

    /// Detect the kind from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "png" | "jpg" | "jpeg" | "webp" | "gif" | "bmp" => Some(DocumentKind::Image),
            _ => None,
        }
    }

    /// A representative MIME type for this kind.
    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::Image => "image/*",
            DocumentKind::Pdf => "application/pdf",
        }
    }
}
