//! InkSign Core Library
//!
//! Platform-agnostic data structures for capturing a freehand signature:
//! brush state, completed strokes, the undoable stroke history and the
//! ink capture surface that ties them to pointer input.

pub mod brush;
pub mod config;
pub mod history;
pub mod input;
pub mod stroke;
pub mod surface;

pub use brush::{BrushState, StrokeColor};
pub use config::{InkBackground, InkConfig};
pub use history::StrokeHistory;
pub use input::{PointerEvent, PointerTracker};
pub use stroke::Stroke;
pub use surface::{InkSurface, SurfaceError};

pub use kurbo::Point;
