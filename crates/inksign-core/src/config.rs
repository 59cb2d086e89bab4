//! Ink capture configuration.

use crate::brush::{BrushState, StrokeColor};
use serde::{Deserialize, Serialize};

/// Background painted behind the ink when the surface is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InkBackground {
    /// Opaque white. The whole ink rectangle covers the document when composited.
    #[default]
    OpaqueWhite,
    /// Fully transparent. Only the ink pixels land on the document.
    Transparent,
}

impl InkBackground {
    /// The background as a color.
    pub fn color(self) -> StrokeColor {
        match self {
            InkBackground::OpaqueWhite => StrokeColor::white(),
            InkBackground::Transparent => StrokeColor::transparent(),
        }
    }
}

/// Configuration for the ink capture surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InkConfig {
    /// Smallest brush width accepted by `set_brush_width`.
    pub min_brush_width: u32,
    /// Largest brush width accepted by `set_brush_width`.
    pub max_brush_width: u32,
    /// Brush width after initialization.
    pub default_brush_width: u32,
    /// Brush color after initialization.
    pub default_brush_color: StrokeColor,
    /// Surface height as a fraction of its width.
    pub aspect_ratio: f64,
    /// Background behind the strokes.
    pub background: InkBackground,
}

impl Default for InkConfig {
    fn default() -> Self {
        Self {
            min_brush_width: 1,
            max_brush_width: 10,
            default_brush_width: 2,
            default_brush_color: StrokeColor::black(),
            aspect_ratio: 0.5,
            background: InkBackground::OpaqueWhite,
        }
    }
}

impl InkConfig {
    /// Set the brush width range.
    pub fn with_width_range(mut self, min: u32, max: u32) -> Self {
        self.min_brush_width = min.min(max);
        self.max_brush_width = max.max(min);
        self
    }

    /// Set the background style.
    pub fn with_background(mut self, background: InkBackground) -> Self {
        self.background = background;
        self
    }

    /// The brush a freshly initialized surface starts with.
    pub fn initial_brush(&self) -> BrushState {
        let width = self
            .default_brush_width
            .clamp(self.min_brush_width, self.max_brush_width.max(self.min_brush_width));
        BrushState::new(width, self.default_brush_color)
    }

    /// Height of the surface for a given width.
    pub fn height_for(&self, width: u32) -> u32 {
        (f64::from(width) * self.aspect_ratio).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InkConfig::default();
        assert_eq!(config.initial_brush(), BrushState::new(2, StrokeColor::black()));
        assert_eq!(config.height_for(600), 300);
        assert_eq!(config.background, InkBackground::OpaqueWhite);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: InkConfig = serde_json::from_str(r#"{"max_brush_width": 20}"#).unwrap();
        assert_eq!(config.max_brush_width, 20);
        assert_eq!(config.min_brush_width, 1);
        assert_eq!(config.default_brush_width, 2);
    }

    #[test]
    fn test_background_names() {
        let config: InkConfig = serde_json::from_str(r#"{"background": "transparent"}"#).unwrap();
        assert_eq!(config.background, InkBackground::Transparent);
        assert_eq!(config.background.color(), StrokeColor::transparent());
    }

    #[test]
    fn test_width_range_is_ordered() {
        let config = InkConfig::default().with_width_range(8, 3);
        assert_eq!(config.min_brush_width, 3);
        assert_eq!(config.max_brush_width, 8);
    }
}
