//! Recorded ink input, replayed through the capture surface's pointer events.
//!
//! A script is a JSON array of steps. A step is either a stroke
//!
//! ```json
//! {"points": [[10, 20], [40, 25], [90, 30]], "width": 4, "color": "#1a237e"}
//! ```
//!
//! or one of the strings `"undo"` and `"clear"`. `width` and `color` are
//! optional and change the brush for that stroke and every later one.

use anyhow::{Context, Result, bail};
use inksign_core::{InkSurface, Point, PointerEvent};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Action(ScriptAction),
    Stroke(ScriptStroke),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptAction {
    Undo,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptStroke {
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
}

pub fn parse(json: &str) -> Result<Vec<ScriptStep>> {
    serde_json::from_str(json).context("parse stroke script")
}

/// Replay every step onto `ink`. Returns the stroke count left in the history.
pub fn replay(ink: &mut InkSurface, steps: &[ScriptStep]) -> Result<usize> {
    for (index, step) in steps.iter().enumerate() {
        match step {
            ScriptStep::Action(ScriptAction::Undo) => {
                ink.undo();
            }
            ScriptStep::Action(ScriptAction::Clear) => ink.clear(),
            ScriptStep::Stroke(stroke) => {
                draw(ink, stroke).with_context(|| format!("stroke script step {index}"))?;
            }
        }
    }
    Ok(ink.history().len())
}

fn draw(ink: &mut InkSurface, stroke: &ScriptStroke) -> Result<bool> {
    if let Some(width) = stroke.width {
        ink.set_brush_width(width);
    }
    if let Some(color) = &stroke.color {
        if ink.set_brush_color_hex(color).is_none() {
            bail!("invalid color {color:?}");
        }
    }

    let mut points = stroke.points.iter().map(|[x, y]| Point::new(*x, *y));
    let Some(first) = points.next() else {
        log::warn!("Skipping stroke without points");
        return Ok(false);
    };
    let mut last = first;

    ink.handle_pointer(PointerEvent::Down { position: first });
    for point in points {
        ink.handle_pointer(PointerEvent::Move { position: point });
        last = point;
    }
    Ok(ink.handle_pointer(PointerEvent::Up { position: last }))
}
