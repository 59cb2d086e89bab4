//! Ordered, undoable stroke history.

use crate::stroke::Stroke;

/// Completed strokes in the order they were drawn.
///
/// Only the most recent stroke can be removed. There is no redo: an undone
/// stroke is dropped for good.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeHistory {
    strokes: Vec<Stroke>,
}

impl StrokeHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed stroke.
    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Remove the most recently appended stroke.
    /// Returns the removed stroke, or `None` if there was nothing to undo.
    pub fn undo(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.strokes.is_empty()
    }

    /// Remove every stroke.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Strokes in drawing order (oldest first).
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn last(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}
