//! Rasterization of the ink capture surface.

use crate::error::SignResult;
use crate::raster::{pixmap_dimensions, pixmap_to_image};
use image::RgbaImage;
use inksign_core::{InkBackground, InkSurface, Stroke, StrokeColor};
use vello_cpu::kurbo::{self, BezPath, Cap, Circle, Join, Rect, Shape as _};
use vello_cpu::peniko::Color;
use vello_cpu::{Pixmap, RenderContext};

/// Flattening tolerance for round dots.
const DOT_TOLERANCE: f64 = 0.1;

/// Rendering of a drawing surface's visible content.
pub trait RenderToRaster {
    /// All strokes over the surface background, at the surface's current size.
    fn render_to_raster(&self) -> SignResult<RgbaImage>;
}

impl RenderToRaster for InkSurface {
    fn render_to_raster(&self) -> SignResult<RgbaImage> {
        render_strokes(self.strokes(), self.width(), self.height(), self.background())
    }
}

/// Rasterize strokes in order onto a `width x height` surface.
///
/// Strokes outside the surface are clipped.
pub fn render_strokes(
    strokes: &[Stroke],
    width: u32,
    height: u32,
    background: InkBackground,
) -> SignResult<RgbaImage> {
    let (w, h) = pixmap_dimensions(width, height)?;
    let mut ctx = RenderContext::new(w, h);

    if background == InkBackground::OpaqueWhite {
        ctx.set_paint(color(background.color()));
        ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));
    }

    for stroke in strokes {
        render_stroke(&mut ctx, stroke);
    }

    ctx.flush();
    let mut pixmap = Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);
    pixmap_to_image(&pixmap)
}

fn render_stroke(ctx: &mut RenderContext, stroke: &Stroke) {
    let width = f64::from(stroke.width());
    ctx.set_paint(color(stroke.color()));

    if stroke.is_dot() {
        let center = point(stroke.points()[0]);
        ctx.fill_path(&Circle::new(center, width / 2.0).to_path(DOT_TOLERANCE));
        return;
    }

    let mut path = BezPath::new();
    let mut points = stroke.points().iter().copied().map(point);
    if let Some(first) = points.next() {
        path.move_to(first);
    }
    for p in points {
        path.line_to(p);
    }

    ctx.set_stroke(
        kurbo::Stroke::new(width)
            .with_caps(Cap::Round)
            .with_join(Join::Round),
    );
    ctx.stroke_path(&path);
}

fn point(p: inksign_core::Point) -> kurbo::Point {
    kurbo::Point::new(p.x, p.y)
}

fn color(c: StrokeColor) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}
