//! PDF page selection, geometry and rasterization.

mod vector;

pub use vector::VectorPageRasterizer;

use crate::error::{SignError, SignResult};
use image::RgbaImage;
use lopdf::{Document, Object, ObjectId};
use vello_cpu::kurbo::Affine;

/// Page size used when neither the page nor its ancestors carry a MediaBox (A4).
const FALLBACK_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 595.0, 842.0];

/// Trait for page rasterization backends.
///
/// The adapter is constructed with one of these; there is no global renderer.
pub trait PageRasterizer: Send + Sync {
    /// Rasterize `page` into an image of exactly `page.pixel_size()`.
    fn rasterize(&self, document: &Document, page: &PdfPage) -> SignResult<RgbaImage>;
}

/// Visible page area and orientation, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Lower-left x.
    pub x0: f64,
    /// Lower-left y.
    pub y0: f64,
    /// Upper-right x.
    pub x1: f64,
    /// Upper-right y.
    pub y1: f64,
    /// Clockwise display rotation: 0, 90, 180 or 270.
    pub rotation: u16,
}

impl PageGeometry {
    /// Unrotated page width in points.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Unrotated page height in points.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Pixel dimensions at `scale`, after rotation.
    pub fn pixel_size(&self, scale: f64) -> (u32, u32) {
        let width = (self.width() * scale).round().max(0.0) as u32;
        let height = (self.height() * scale).round().max(0.0) as u32;
        if self.rotation % 180 == 90 {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Map PDF user space (y up) to pixel space (y down, origin top-left).
    pub fn user_to_pixel(&self, scale: f64) -> Affine {
        let s = scale;
        let Self { x0, y0, x1, y1, .. } = *self;
        match self.rotation {
            90 => Affine::new([0.0, s, s, 0.0, -s * y0, -s * x0]),
            180 => Affine::new([-s, 0.0, 0.0, s, s * x1, -s * y0]),
            270 => Affine::new([0.0, -s, -s, 0.0, s * y1, s * x1]),
            _ => Affine::new([s, 0.0, 0.0, -s, -s * x0, s * y1]),
        }
    }
}

/// The page selected for rendering, with its geometry and target scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfPage {
    pub id: ObjectId,
    pub geometry: PageGeometry,
    pub scale: f64,
}

impl PdfPage {
    pub fn pixel_size(&self) -> (u32, u32) {
        self.geometry.pixel_size(self.scale)
    }

    pub fn transform(&self) -> Affine {
        self.geometry.user_to_pixel(self.scale)
    }
}

/// Open a PDF from memory.
pub fn open_document(bytes: &[u8]) -> SignResult<Document> {
    Document::load_mem(bytes).map_err(|e| SignError::DocumentOpen(e.to_string()))
}

/// Select page 1 of `document` for rendering at `scale`.
pub fn first_page(document: &Document, scale: f64) -> SignResult<PdfPage> {
    let (number, id) = document
        .get_pages()
        .into_iter()
        .next()
        .ok_or(SignError::PageNotFound)?;
    let geometry = page_geometry(document, id);
    log::debug!(
        "PDF page {} ({} {}): {:.1}x{:.1} pt, rotation {}",
        number,
        id.0,
        id.1,
        geometry.width(),
        geometry.height(),
        geometry.rotation
    );
    Ok(PdfPage {
        id,
        geometry,
        scale,
    })
}

/// Read MediaBox, CropBox and Rotate for a page, following `/Parent` inheritance.
pub fn page_geometry(document: &Document, page_id: ObjectId) -> PageGeometry {
    let media = inherited(document, page_id, b"MediaBox")
        .and_then(|obj| rect_from(document, obj))
        .unwrap_or_else(|| {
            log::warn!("Page has no usable MediaBox; assuming A4");
            FALLBACK_MEDIA_BOX
        });

    let visible = inherited(document, page_id, b"CropBox")
        .and_then(|obj| rect_from(document, obj))
        .and_then(|crop| intersect(media, crop))
        .unwrap_or(media);

    let rotation = inherited(document, page_id, b"Rotate")
        .and_then(|obj| number(resolve(document, obj)))
        .map(normalize_rotation)
        .unwrap_or(0);

    PageGeometry {
        x0: visible[0],
        y0: visible[1],
        x1: visible[2],
        y1: visible[3],
        rotation,
    }
}

fn inherited<'a>(document: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = Some(page_id);
    // Bounded walk so a cyclic /Parent chain cannot hang us.
    for _ in 0..64 {
        let id = current?;
        let dict = document.get_object(id).and_then(|o| o.as_dict()).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    None
}

fn resolve<'a>(document: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => document.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}

/// Normalized `[x0, y0, x1, y1]` with positive extent.
fn rect_from(document: &Document, obj: &Object) -> Option<[f64; 4]> {
    let arr = resolve(document, obj).as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let mut values = [0.0; 4];
    for (slot, item) in values.iter_mut().zip(arr) {
        *slot = number(resolve(document, item))?;
    }
    let [ax, ay, bx, by] = values;
    let rect = [ax.min(bx), ay.min(by), ax.max(bx), ay.max(by)];
    (rect[2] > rect[0] && rect[3] > rect[1]).then_some(rect)
}

fn intersect(a: [f64; 4], b: [f64; 4]) -> Option<[f64; 4]> {
    let rect = [a[0].max(b[0]), a[1].max(b[1]), a[2].min(b[2]), a[3].min(b[3])];
    (rect[2] > rect[0] && rect[3] > rect[1]).then_some(rect)
}

fn normalize_rotation(degrees: f64) -> u16 {
    let quarter = (degrees / 90.0).round() as i64;
    (quarter.rem_euclid(4) * 90) as u16
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_open_rejects_garbage() {
        assert!(matches!(
            open_document(b"definitely not a pdf"),
            Err(SignError::DocumentOpen(_))
        ));
    }

    #[test]
    fn test_zero_pages() {
        let bytes = build_pdf(&[]);
        let document = open_document(&bytes).unwrap();
        assert!(matches!(
            first_page(&document, 1.5),
            Err(SignError::PageNotFound)
        ));
    }

    #[test]
    fn test_first_page_geometry() {
        let bytes = build_pdf(&[
            ([0, 0, 612, 792], Vec::new()),
            ([0, 0, 100, 100], Vec::new()),
        ]);
        let document = open_document(&bytes).unwrap();
        let page = first_page(&document, 1.5).unwrap();
        assert_eq!(page.geometry.width(), 612.0);
        assert_eq!(page.geometry.height(), 792.0);
        assert_eq!(page.pixel_size(), (918, 1188));
    }

    #[test]
    fn test_pixel_size_rounds() {
        let geometry = PageGeometry {
            x0: 0.0,
            y0: 0.0,
            x1: 595.0,
            y1: 842.0,
            rotation: 0,
        };
        // 595 * 1.5 = 892.5 -> 893, 842 * 1.5 = 1263
        assert_eq!(geometry.pixel_size(1.5), (893, 1263));
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let bytes = build_pdf_with(&[([0, 0, 200, 100], Vec::new())], |page| {
            page.set("Rotate", Object::Integer(90));
        });
        let document = open_document(&bytes).unwrap();
        let page = first_page(&document, 1.0).unwrap();
        assert_eq!(page.geometry.rotation, 90);
        assert_eq!(page.pixel_size(), (100, 200));
    }

    #[test]
    fn test_crop_box_wins() {
        let bytes = build_pdf_with(&[([0, 0, 200, 100], Vec::new())], |page| {
            page.set(
                "CropBox",
                vec![
                    Object::Integer(10),
                    Object::Integer(10),
                    Object::Integer(110),
                    Object::Integer(60),
                ],
            );
        });
        let document = open_document(&bytes).unwrap();
        let page = first_page(&document, 2.0).unwrap();
        assert_eq!(page.pixel_size(), (200, 100));
    }

    #[test]
    fn test_media_box_inherited_from_pages_node() {
        let bytes = build_pdf_with(&[([0, 0, 1, 1], Vec::new())], |page| {
            page.remove(b"MediaBox");
        });
        let mut document = open_document(&bytes).unwrap();
        let page_id = *document.get_pages().values().next().unwrap();
        let pages_id = document
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .and_then(|d| d.get(b"Parent"))
            .and_then(|p| p.as_reference())
            .unwrap();
        document
            .get_object_mut(pages_id)
            .and_then(|o| o.as_dict_mut())
            .unwrap()
            .set(
                "MediaBox",
                vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(300),
                    Object::Integer(150),
                ],
            );

        let geometry = page_geometry(&document, page_id);
        assert_eq!((geometry.width(), geometry.height()), (300.0, 150.0));
        assert_eq!(first_page(&document, 2.0).unwrap().pixel_size(), (600, 300));
    }

    #[test]
    fn test_missing_media_box_falls_back_to_a4() {
        let bytes = build_pdf_with(&[([0, 0, 1, 1], Vec::new())], |page| {
            page.remove(b"MediaBox");
        });
        let document = open_document(&bytes).unwrap();
        let page = first_page(&document, 1.0).unwrap();
        assert_eq!((page.geometry.width(), page.geometry.height()), (595.0, 842.0));
        assert_eq!(page.geometry.rotation, 0);
        assert_eq!(page.pixel_size(), (595, 842));
    }

    #[test]
    fn test_transform_corners() {
        let geometry = PageGeometry {
            x0: 0.0,
            y0: 0.0,
            x1: 200.0,
            y1: 100.0,
            rotation: 0,
        };
        let t = geometry.user_to_pixel(2.0);
        let top_left = t * vello_cpu::kurbo::Point::new(0.0, 100.0);
        let bottom_right = t * vello_cpu::kurbo::Point::new(200.0, 0.0);
        assert!((top_left.x).abs() < 1e-9 && (top_left.y).abs() < 1e-9);
        assert!((bottom_right.x - 400.0).abs() < 1e-9 && (bottom_right.y - 200.0).abs() < 1e-9);

        let rotated = PageGeometry { rotation: 90, ..geometry };
        let t = rotated.user_to_pixel(1.0);
        // The unrotated top-left corner ends up top-right.
        let p = t * vello_cpu::kurbo::Point::new(0.0, 100.0);
        assert!((p.x - 100.0).abs() < 1e-9 && p.y.abs() < 1e-9);
    }

    #[test]
    fn test_rotation_normalized() {
        assert_eq!(normalize_rotation(-90.0), 270);
        assert_eq!(normalize_rotation(450.0), 90);
        assert_eq!(normalize_rotation(180.0), 180);
    }
}
