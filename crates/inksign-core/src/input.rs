//! Pointer input tracking for freehand drawing.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event in surface coordinates, for unified mouse/touch/pen handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// The host lost the pointer (e.g. touch cancelled). Discards the path.
    Cancel,
}

/// Tracking state of the pointer.
#[derive(Debug, Clone, Default, PartialEq)]
enum TrackerState {
    #[default]
    Idle,
    /// Pointer is down; points accumulated so far.
    Drawing { points: Vec<Point> },
}

/// Turns a pointer down/drag/up sequence into one completed path.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    state: TrackerState,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new path. An unfinished path is discarded.
    pub fn begin(&mut self, point: Point) {
        if self.is_active() {
            log::debug!("Pointer down while drawing; discarding unfinished path");
        }
        self.state = TrackerState::Drawing {
            points: vec![point],
        };
    }

    /// Extend the current path. Ignored while the pointer is up.
    pub fn update(&mut self, point: Point) {
        if let TrackerState::Drawing { points } = &mut self.state {
            push_distinct(points, point);
        }
    }

    /// Finish the current path and return its points.
    pub fn end(&mut self, point: Point) -> Option<Vec<Point>> {
        match std::mem::take(&mut self.state) {
            TrackerState::Drawing { mut points } => {
                push_distinct(&mut points, point);
                Some(points)
            }
            TrackerState::Idle => None,
        }
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = TrackerState::Idle;
    }

    /// Check if a path is being drawn.
    pub fn is_active(&self) -> bool {
        matches!(self.state, TrackerState::Drawing { .. })
    }

    /// Points of the in-progress path (empty when idle).
    pub fn current_points(&self) -> &[Point] {
        match &self.state {
            TrackerState::Drawing { points } => points,
            TrackerState::Idle => &[],
        }
    }
}

fn push_distinct(points: &mut Vec<Point>, point: Point) {
    if points.last() != Some(&point) {
        points.push(point);
    }
}
