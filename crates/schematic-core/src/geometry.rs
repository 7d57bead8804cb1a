//! Canvas geometry.

use serde::{Deserialize, Serialize};

/// A point on the canvas, in canvas units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this position rounded to `decimals` fractional digits.
    ///
    /// Exporters round coordinates so that repeated import/export cycles
    /// produce byte-identical output.
    pub fn rounded(self, decimals: u32) -> Self {
        Self {
            x: round_to(self.x, decimals),
            y: round_to(self.y, decimals),
        }
    }

    /// Returns this position shifted by `(dx, dy)`.
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Rounds `value` to `decimals` fractional digits.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    // Normalize negative zero so "-0" never reaches an exporter.
    if rounded == 0.0 { 0.0 } else { rounded }
}
