//! Brush state and stroke colors.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable stroke color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrokeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl StrokeColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a CSS-style hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    ///
    /// The leading `#` is optional. Returns `None` for anything else.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }

        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();

        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = channel(0..1)? * 17;
                let g = channel(1..2)? * 17;
                let b = channel(2..3)? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for StrokeColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<StrokeColor> for Color {
    fn from(color: StrokeColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// The brush applied to strokes begun from now on.
///
/// Changing the brush never touches strokes already in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushState {
    /// Stroke width in surface pixels.
    pub width: u32,
    /// Stroke color.
    pub color: StrokeColor,
}

impl BrushState {
    pub fn new(width: u32, color: StrokeColor) -> Self {
        Self { width, color }
    }

    /// Set the width, clamped to `[min, max]`. Returns the width actually applied.
    pub fn set_width(&mut self, width: i64, min: u32, max: u32) -> u32 {
        let (lo, hi) = (min.min(max), max.max(min));
        let clamped = width.clamp(i64::from(lo), i64::from(hi)) as u32;
        if i64::from(clamped) != width {
            log::debug!("Brush width {} clamped to {}", width, clamped);
        }
        self.width = clamped;
        clamped
    }

    pub fn set_color(&mut self, color: StrokeColor) {
        self.color = color;
    }
}

impl Default for BrushState {
    fn default() -> Self {
        Self::new(2, StrokeColor::black())
    }
}
