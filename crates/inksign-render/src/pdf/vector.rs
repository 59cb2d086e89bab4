//! Built-in page rasterizer for vector path content.
//!
//! Interprets path construction, path painting, graphics state and color
//! operators of the page content stream. Text, images, shadings and clipping
//! are skipped.

use super::{PageRasterizer, PdfPage, number};
use crate::error::{SignError, SignResult};
use crate::raster::{pixmap_dimensions, pixmap_to_image};
use image::RgbaImage;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object};
use std::collections::BTreeSet;
use vello_cpu::kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Stroke};
use vello_cpu::peniko::{Color, Fill};
use vello_cpu::{Pixmap, RenderContext};

/// Nesting limit for `q` so hostile content cannot grow the state stack unbounded.
const MAX_STATE_DEPTH: usize = 256;

/// Rasterizes page paths with `vello_cpu` onto a white page.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorPageRasterizer;

impl PageRasterizer for VectorPageRasterizer {
    fn rasterize(&self, document: &Document, page: &PdfPage) -> SignResult<RgbaImage> {
        let (width, height) = page.pixel_size();
        let (w, h) = pixmap_dimensions(width, height)?;

        let bytes = document
            .get_page_content(page.id)
            .map_err(|e| SignError::Render(format!("unreadable content stream: {e}")))?;
        let content = Content::decode(&bytes)
            .map_err(|e| SignError::Render(format!("corrupt content stream: {e}")))?;

        let mut ctx = RenderContext::new(w, h);
        ctx.set_paint(Color::from_rgba8(255, 255, 255, 255));
        ctx.fill_rect(&Rect::new(0.0, 0.0, f64::from(w), f64::from(h)));

        let mut painter = PathPainter::new(page.transform());
        for operation in &content.operations {
            painter.apply(&mut ctx, operation)?;
        }
        if !painter.skipped.is_empty() {
            log::debug!(
                "Skipped unsupported PDF operators: {}",
                painter.skipped.iter().cloned().collect::<Vec<_>>().join(" ")
            );
        }

        ctx.flush();
        let mut pixmap = Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        pixmap_to_image(&pixmap)
    }
}

/// Graphics state saved and restored by `q`/`Q`.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Affine,
    line_width: f64,
    cap: Cap,
    join: Join,
    miter_limit: f64,
    dash: Option<(f64, Vec<f64>)>,
    fill: Color,
    stroke: Color,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Affine::IDENTITY,
            line_width: 1.0,
            cap: Cap::Butt,
            join: Join::Miter,
            miter_limit: 10.0,
            dash: None,
            fill: Color::from_rgba8(0, 0, 0, 255),
            stroke: Color::from_rgba8(0, 0, 0, 255),
        }
    }
}

/// Which parts of the current path a painting operator draws.
#[derive(Debug, Clone, Copy)]
struct Paint {
    close: bool,
    fill: Option<Fill>,
    stroke: bool,
}

impl Paint {
    fn stroke(close: bool) -> Self {
        Self {
            close,
            fill: None,
            stroke: true,
        }
    }

    fn fill(rule: Fill, stroke: bool) -> Self {
        Self {
            close: false,
            fill: Some(rule),
            stroke,
        }
    }

    fn closed(self) -> Self {
        Self {
            close: true,
            ..self
        }
    }
}

struct PathPainter {
    base: Affine,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    path: BezPath,
    start: Option<Point>,
    current: Option<Point>,
    skipped: BTreeSet<String>,
}

impl PathPainter {
    fn new(base: Affine) -> Self {
        Self {
            base,
            state: GraphicsState::default(),
            stack: Vec::new(),
            path: BezPath::new(),
            start: None,
            current: None,
            skipped: BTreeSet::new(),
        }
    }

    fn apply(&mut self, ctx: &mut RenderContext, op: &Operation) -> SignResult<()> {
        let operator = op.operator.as_str();
        match operator {
            // Graphics state
            "q" => {
                if self.stack.len() >= MAX_STATE_DEPTH {
                    return Err(corrupt(operator, "graphics state nesting too deep"));
                }
                self.stack.push(self.state.clone());
            }
            "Q" => match self.stack.pop() {
                Some(state) => self.state = state,
                None => log::debug!("Unbalanced Q in content stream"),
            },
            "cm" => {
                let [a, b, c, d, e, f] = numbers(op)?;
                self.state.ctm = self.state.ctm * Affine::new([a, b, c, d, e, f]);
            }
            "w" => {
                let [width] = numbers(op)?;
                self.state.line_width = width;
            }
            "J" => {
                let [style] = numbers(op)?;
                self.state.cap = match style as i64 {
                    1 => Cap::Round,
                    2 => Cap::Square,
                    _ => Cap::Butt,
                };
            }
            "j" => {
                let [style] = numbers(op)?;
                self.state.join = match style as i64 {
                    1 => Join::Round,
                    2 => Join::Bevel,
                    _ => Join::Miter,
                };
            }
            "M" => {
                let [limit] = numbers(op)?;
                self.state.miter_limit = limit;
            }
            "d" => self.state.dash = dash_pattern(op)?,

            // Color
            "g" => self.state.fill = gray(numbers::<1>(op)?),
            "G" => self.state.stroke = gray(numbers::<1>(op)?),
            "rg" => self.state.fill = rgb(numbers::<3>(op)?),
            "RG" => self.state.stroke = rgb(numbers::<3>(op)?),
            "k" => self.state.fill = cmyk(numbers::<4>(op)?),
            "K" => self.state.stroke = cmyk(numbers::<4>(op)?),
            "cs" => self.state.fill = Color::from_rgba8(0, 0, 0, 255),
            "CS" => self.state.stroke = Color::from_rgba8(0, 0, 0, 255),
            "sc" | "scn" => {
                if let Some(color) = color_components(op) {
                    self.state.fill = color;
                } else {
                    self.skipped.insert(operator.to_string());
                }
            }
            "SC" | "SCN" => {
                if let Some(color) = color_components(op) {
                    self.state.stroke = color;
                } else {
                    self.skipped.insert(operator.to_string());
                }
            }

            // Path construction
            "m" => {
                let [x, y] = numbers(op)?;
                let p = Point::new(x, y);
                self.path.move_to(p);
                self.start = Some(p);
                self.current = Some(p);
            }
            "l" => {
                let [x, y] = numbers(op)?;
                let p = Point::new(x, y);
                self.ensure_started(operator)?;
                self.path.line_to(p);
                self.current = Some(p);
            }
            "c" => {
                let [x1, y1, x2, y2, x3, y3] = numbers(op)?;
                self.ensure_started(operator)?;
                let end = Point::new(x3, y3);
                self.path.curve_to(Point::new(x1, y1), Point::new(x2, y2), end);
                self.current = Some(end);
            }
            "v" => {
                let [x2, y2, x3, y3] = numbers(op)?;
                let from = self.ensure_started(operator)?;
                let end = Point::new(x3, y3);
                self.path.curve_to(from, Point::new(x2, y2), end);
                self.current = Some(end);
            }
            "y" => {
                let [x1, y1, x3, y3] = numbers(op)?;
                self.ensure_started(operator)?;
                let end = Point::new(x3, y3);
                self.path.curve_to(Point::new(x1, y1), end, end);
                self.current = Some(end);
            }
            "h" => self.close_subpath(),
            "re" => {
                let [x, y, w, h] = numbers(op)?;
                let origin = Point::new(x, y);
                self.path.move_to(origin);
                self.path.line_to((x + w, y));
                self.path.line_to((x + w, y + h));
                self.path.line_to((x, y + h));
                self.path.close_path();
                self.start = Some(origin);
                self.current = Some(origin);
            }

            // Path painting
            "S" => self.paint(ctx, Paint::stroke(false)),
            "s" => self.paint(ctx, Paint::stroke(true)),
            "f" | "F" => self.paint(ctx, Paint::fill(Fill::NonZero, false)),
            "f*" => self.paint(ctx, Paint::fill(Fill::EvenOdd, false)),
            "B" => self.paint(ctx, Paint::fill(Fill::NonZero, true)),
            "B*" => self.paint(ctx, Paint::fill(Fill::EvenOdd, true)),
            "b" => self.paint(ctx, Paint::fill(Fill::NonZero, true).closed()),
            "b*" => self.paint(ctx, Paint::fill(Fill::EvenOdd, true).closed()),
            "n" => self.end_path(),

            // Clipping is not applied; the path stays pending for the following `n`.
            "W" | "W*" => {
                self.skipped.insert(operator.to_string());
            }

            other => {
                self.skipped.insert(other.to_string());
            }
        }
        Ok(())
    }

    /// Current point, or an error if there is no subpath to extend.
    fn ensure_started(&self, operator: &str) -> SignResult<Point> {
        self.current
            .ok_or_else(|| corrupt(operator, "no current point"))
    }

    fn close_subpath(&mut self) {
        if self.current.is_some() {
            self.path.close_path();
            self.current = self.start;
        }
    }

    fn paint(&mut self, ctx: &mut RenderContext, paint: Paint) {
        if paint.close {
            self.close_subpath();
        }
        if !self.path.elements().is_empty() {
            let transform = self.base * self.state.ctm;
            ctx.set_transform(transform);

            if let Some(rule) = paint.fill {
                ctx.set_fill_rule(rule);
                ctx.set_paint(self.state.fill);
                ctx.fill_path(&self.path);
            }
            if paint.stroke {
                ctx.set_stroke(self.stroke_style(transform));
                ctx.set_paint(self.state.stroke);
                ctx.stroke_path(&self.path);
            }
            ctx.set_transform(Affine::IDENTITY);
        }
        self.end_path();
    }

    fn stroke_style(&self, transform: Affine) -> Stroke {
        // A zero width means the thinnest line the device can draw.
        let width = if self.state.line_width > 0.0 {
            self.state.line_width
        } else {
            let scale = transform.determinant().abs().sqrt();
            if scale > 0.0 { 1.0 / scale } else { 1.0 }
        };

        let mut stroke = Stroke::new(width)
            .with_caps(self.state.cap)
            .with_join(self.state.join)
            .with_miter_limit(self.state.miter_limit);
        if let Some((phase, pattern)) = &self.state.dash {
            stroke = stroke.with_dashes(*phase, pattern.iter().copied());
        }
        stroke
    }

    fn end_path(&mut self) {
        self.path = BezPath::new();
        self.start = None;
        self.current = None;
    }
}

fn corrupt(operator: &str, reason: &str) -> SignError {
    SignError::Render(format!("corrupt content stream: `{operator}` {reason}"))
}

/// Exactly `N` numeric operands.
fn numbers<const N: usize>(op: &Operation) -> SignResult<[f64; N]> {
    let mut values = [0.0; N];
    if op.operands.len() != N {
        return Err(corrupt(
            &op.operator,
            &format!("expects {N} operands, found {}", op.operands.len()),
        ));
    }
    for (slot, operand) in values.iter_mut().zip(&op.operands) {
        *slot = number(operand).ok_or_else(|| corrupt(&op.operator, "has a non-numeric operand"))?;
    }
    Ok(values)
}

/// `[dash array] phase d`. An empty array means solid.
fn dash_pattern(op: &Operation) -> SignResult<Option<(f64, Vec<f64>)>> {
    let [array, phase] = op.operands.as_slice() else {
        return Err(corrupt("d", "expects an array and a phase"));
    };
    let phase = number(phase).ok_or_else(|| corrupt("d", "has a non-numeric phase"))?;
    let Object::Array(items) = array else {
        return Err(corrupt("d", "expects a dash array"));
    };
    let pattern = items
        .iter()
        .map(number)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| corrupt("d", "has a non-numeric dash length"))?;
    if pattern.is_empty() || pattern.iter().all(|v| *v <= 0.0) {
        Ok(None)
    } else {
        Ok(Some((phase, pattern)))
    }
}

/// Interpret numeric `sc`/`scn` operands by count: gray, RGB or CMYK.
/// Pattern names and other color spaces are not supported.
fn color_components(op: &Operation) -> Option<Color> {
    let values = op.operands.iter().map(number).collect::<Option<Vec<_>>>()?;
    match values.as_slice() {
        [g] => Some(gray([*g])),
        [r, g, b] => Some(rgb([*r, *g, *b])),
        [c, m, y, k] => Some(cmyk([*c, *m, *y, *k])),
        _ => None,
    }
}

fn unit(v: f64) -> f32 {
    v.clamp(0.0, 1.0) as f32
}

fn gray([g]: [f64; 1]) -> Color {
    let g = unit(g);
    Color::new([g, g, g, 1.0])
}

fn rgb([r, g, b]: [f64; 3]) -> Color {
    Color::new([unit(r), unit(g), unit(b), 1.0])
}

fn cmyk([c, m, y, k]: [f64; 4]) -> Color {
    let k = unit(k);
    let channel = |v: f64| (1.0 - unit(v)) * (1.0 - k);
    Color::new([channel(c), channel(m), channel(y), 1.0])
}
