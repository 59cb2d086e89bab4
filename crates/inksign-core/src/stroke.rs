//! Completed freehand strokes.

use crate::brush::{BrushState, StrokeColor};
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};

/// One completed freehand path together with the brush it was drawn with.
///
/// Strokes are immutable once built; the fields are read-only accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    points: Vec<Point>,
    width: u32,
    color: StrokeColor,
}

impl Stroke {
    /// Build a stroke from a point sequence and the brush active at completion.
    ///
    /// Returns `None` for an empty path.
    pub fn new(points: Vec<Point>, brush: BrushState) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        Some(Self {
            points,
            width: brush.width,
            color: brush.color,
        })
    }

    /// Points in the path, in drawing order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Brush width the stroke was drawn with.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Brush color the stroke was drawn with.
    pub fn color(&self) -> StrokeColor {
        self.color
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: empty strokes are never constructed.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A stroke made of a single point (a tap) renders as a round dot.
    pub fn is_dot(&self) -> bool {
        self.points.len() == 1
    }

    /// Bounding box of the path, grown by half the brush width.
    pub fn bounds(&self) -> Rect {
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for point in &self.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        let half = f64::from(self.width) / 2.0;
        Rect::new(min_x, min_y, max_x, max_y).inflate(half, half)
    }

    /// Polyline path for rendering.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };

        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }

        path
    }
}
