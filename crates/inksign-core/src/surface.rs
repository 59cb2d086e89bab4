//! Ink capture surface: a fixed-size drawing area with an undoable stroke history.

use crate::brush::{BrushState, StrokeColor};
use crate::config::{InkBackground, InkConfig};
use crate::history::StrokeHistory;
use crate::input::{PointerEvent, PointerTracker};
use crate::stroke::Stroke;
use kurbo::{Point, Size};
use thiserror::Error;

/// Capture surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Surface initialization failed: {0}")]
    Init(String),
}

/// Freehand drawing surface in "drawing" mode.
///
/// The surface is `width x round(width * aspect_ratio)` pixels. Every pointer
/// down/drag/up sequence becomes one [`Stroke`] drawn with the brush active
/// when the sequence ends.
///
/// Resizing keeps stroke geometry in the pixel coordinates it was captured
/// in; strokes falling outside a smaller surface are clipped when rendered.
#[derive(Debug, Clone)]
pub struct InkSurface {
    config: InkConfig,
    width: u32,
    height: u32,
    brush: BrushState,
    history: StrokeHistory,
    tracker: PointerTracker,
}

impl InkSurface {
    /// Initialize a surface for a host area `width_hint` pixels wide.
    pub fn new(width_hint: u32, config: InkConfig) -> Result<Self, SurfaceError> {
        let (width, height) = surface_size(width_hint, &config)?;
        log::debug!("Ink surface initialized at {}x{}", width, height);
        Ok(Self {
            brush: config.initial_brush(),
            config,
            width,
            height,
            history: StrokeHistory::new(),
            tracker: PointerTracker::new(),
        })
    }

    /// Re-apply the sizing rule for a new host width. Strokes are kept as drawn.
    pub fn resize(&mut self, width_hint: u32) -> Result<(), SurfaceError> {
        let (width, height) = surface_size(width_hint, &self.config)?;
        log::debug!(
            "Ink surface resized from {}x{} to {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    pub fn config(&self) -> &InkConfig {
        &self.config
    }

    pub fn background(&self) -> InkBackground {
        self.config.background
    }

    pub fn brush(&self) -> BrushState {
        self.brush
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    /// Strokes in drawing order.
    pub fn strokes(&self) -> &[Stroke] {
        self.history.strokes()
    }

    /// Feed a pointer event from the host surface.
    ///
    /// Returns true when the event completed a stroke.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        match event {
            PointerEvent::Down { position } => {
                self.tracker.begin(position);
                false
            }
            PointerEvent::Move { position } => {
                self.tracker.update(position);
                false
            }
            PointerEvent::Up { position } => match self.tracker.end(position) {
                Some(points) => self.on_stroke_completed(points),
                None => false,
            },
            PointerEvent::Cancel => {
                self.tracker.cancel();
                false
            }
        }
    }

    /// Points of the stroke currently being drawn, for live preview.
    pub fn pending_points(&self) -> &[Point] {
        self.tracker.current_points()
    }

    /// Record a completed path with the current brush.
    ///
    /// This is the only place the history grows. Returns false for an empty path.
    pub fn on_stroke_completed(&mut self, points: Vec<Point>) -> bool {
        match Stroke::new(points, self.brush) {
            Some(stroke) => {
                log::debug!(
                    "Stroke #{} completed: {} points, width {}, color {}",
                    self.history.len() + 1,
                    stroke.len(),
                    stroke.width(),
                    stroke.color().to_hex()
                );
                self.history.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Set the brush width for strokes begun afterwards, clamped to the configured range.
    pub fn set_brush_width(&mut self, width: i64) -> u32 {
        self.brush
            .set_width(width, self.config.min_brush_width, self.config.max_brush_width)
    }

    /// Set the brush width from text input (e.g. a slider value).
    ///
    /// Unparsable input leaves the brush unchanged and returns `None`.
    pub fn set_brush_width_str(&mut self, width: &str) -> Option<u32> {
        match width.trim().parse::<i64>() {
            Ok(value) => Some(self.set_brush_width(value)),
            Err(_) => {
                log::debug!("Ignoring non-numeric brush width {:?}", width);
                None
            }
        }
    }

    /// Set the brush color for strokes begun afterwards.
    pub fn set_brush_color(&mut self, color: StrokeColor) {
        self.brush.set_color(color);
    }

    /// Set the brush color from a hex string. Invalid input leaves the brush unchanged.
    pub fn set_brush_color_hex(&mut self, color: &str) -> Option<StrokeColor> {
        let parsed = StrokeColor::from_hex(color);
        match parsed {
            Some(color) => self.set_brush_color(color),
            None => log::debug!("Ignoring invalid brush color {:?}", color),
        }
        parsed
    }

    /// Remove every stroke and any path in progress.
    pub fn clear(&mut self) {
        self.history.clear();
        self.tracker.cancel();
        log::debug!("Ink surface cleared");
    }

    /// Remove the most recent stroke. No-op when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Stroke> {
        let removed = self.history.undo();
        if removed.is_some() {
            log::debug!("Undo: {} strokes remain", self.history.len());
        }
        removed
    }
}

fn surface_size(width_hint: u32, config: &InkConfig) -> Result<(u32, u32), SurfaceError> {
    if width_hint == 0 {
        return Err(SurfaceError::Init("host drawing area has zero width".to_string()));
    }
    if !(config.aspect_ratio.is_finite() && config.aspect_ratio > 0.0) {
        return Err(SurfaceError::Init(format!(
            "invalid aspect ratio {}",
            config.aspect_ratio
        )));
    }
    let height = config.height_for(width_hint);
    if height == 0 {
        return Err(SurfaceError::Init(format!(
            "host drawing area {} px wide yields a zero-height surface",
            width_hint
        )));
    }
    Ok((width_hint, height))
}
