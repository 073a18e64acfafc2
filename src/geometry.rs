//! Rectangles and absolute-or-proportional geometry parameters.
//!
//! Position and size arguments may be given either in pixels (an integer)
//! or as a ratio of a reference rectangle (a float in `(0.0, 1.0]`).  The
//! reference is normally the geometry of the current workspace.

use crate::command::Value;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in root-window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area of the intersection of `self` and `other`, `0` if disjoint.
    pub fn overlap(&self, other: &Rect) -> u64 {
        let left = i64::from(self.x).max(i64::from(other.x));
        let top = i64::from(self.y).max(i64::from(other.y));
        let right = (i64::from(self.x) + i64::from(self.width))
            .min(i64::from(other.x) + i64::from(other.width));
        let bottom = (i64::from(self.y) + i64::from(self.height))
            .min(i64::from(other.y) + i64::from(other.height));
        if right <= left || bottom <= top {
            0
        } else {
            ((right - left) * (bottom - top)) as u64
        }
    }
}

/// Which dimension of the reference rectangle a ratio is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// X positions and widths.
    Horizontal,
    /// Y positions and heights.
    Vertical,
}

/// A geometry argument before normalisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryValue {
    Absolute(i64),
    Ratio(f64),
}

impl GeometryValue {
    /// Interpret a command argument.  Only ints and floats qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(n) => Some(GeometryValue::Absolute(*n)),
            Value::Float(x) => Some(GeometryValue::Ratio(*x)),
            _ => None,
        }
    }

    /// Convert to an absolute unit.
    ///
    /// Ratios must lie in `(0.0, 1.0]`; the product with the reference
    /// dimension is truncated towards zero.
    pub fn resolve(self, reference: &Rect, axis: Axis) -> Option<i32> {
        match self {
            GeometryValue::Absolute(n) => i32::try_from(n).ok(),
            GeometryValue::Ratio(ratio) => {
                if !(ratio > 0.0 && ratio <= 1.0) {
                    return None;
                }
                let extent = match axis {
                    Axis::Horizontal => reference.width,
                    Axis::Vertical => reference.height,
                };
                Some((ratio * f64::from(extent)) as i32)
            }
        }
    }
}

/// Normalise a single geometry argument against `reference`.
///
/// Returns `None` for out-of-range ratios and for values that are not
/// numbers at all.
pub fn parse_absolute_or_ratio(reference: &Rect, value: &Value, vertical: bool) -> Option<i32> {
    let axis = if vertical {
        Axis::Vertical
    } else {
        Axis::Horizontal
    };
    GeometryValue::from_value(value)?.resolve(reference, axis)
}

/// Normalise an `(x, y)` or `(width, height)` pair.
///
/// Both axes are parsed before anything is returned, so a failure on either
/// one yields `None` and the caller can abort without a partial update.
pub fn parse_pair(reference: &Rect, x: &Value, y: &Value) -> Option<(i32, i32)> {
    let x = parse_absolute_or_ratio(reference, x, false);
    let y = parse_absolute_or_ratio(reference, y, true);
    Some((x?, y?))
}
