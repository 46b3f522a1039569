//! Parameter values over the closed set of supported kinds.
//!
//! Every kind exposes its scalar components as `f64`, which is exact for
//! `i32`, `f32` and `f64` alike, so the effect algebra can compare any two
//! components without knowing the concrete kind.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of parameter value that can be tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Int,
    Float,
    Double,
    IntMinMax,
}

impl ValueKind {
    /// Number of scalar components of a value of this kind.
    #[must_use]
    pub fn components(self) -> usize {
        match self {
            Self::Int | Self::Float | Self::Double => 1,
            Self::IntMinMax => 2,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::IntMinMax => "int_min_max",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    Int(i32),
    Float(f32),
    Double(f64),
    /// An inclusive integer range, e.g. a min/max slider pair.
    IntMinMax { min: i32, max: i32 },
}

impl ParamValue {
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::IntMinMax { .. } => ValueKind::IntMinMax,
        }
    }

    #[must_use]
    pub fn components(&self) -> usize {
        self.kind().components()
    }

    /// The `index`-th scalar component, or `None` past the last one.
    #[must_use]
    pub fn component(&self, index: usize) -> Option<f64> {
        match (self, index) {
            (Self::Int(v), 0) => Some(f64::from(*v)),
            (Self::Float(v), 0) => Some(f64::from(*v)),
            (Self::Double(v), 0) => Some(*v),
            (Self::IntMinMax { min, .. }, 0) => Some(f64::from(*min)),
            (Self::IntMinMax { max, .. }, 1) => Some(f64::from(*max)),
            _ => None,
        }
    }

    /// Total order used to sort and deduplicate candidate lists: kind first,
    /// then components lexicographically.
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        (self.kind() as u8).cmp(&(other.kind() as u8)).then_with(|| {
            (0..self.components())
                .map(|i| {
                    let a = self.component(i).unwrap_or_default();
                    let b = other.component(i).unwrap_or_default();
                    a.total_cmp(&b)
                })
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        })
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::IntMinMax { min, max } => write!(f, "[{min}, {max}]"),
        }
    }
}

/// Inclusive numeric bounds of an ordinal parameter.
///
/// For min/max ranges the bounds limit both ends of the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// `count` evenly spaced points from `min` to `max`, endpoints included.
    #[must_use]
    pub fn grid(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => {
                let steps = (count - 1) as f64;
                (0..count)
                    .map(|k| self.min + (self.max - self.min) * (k as f64) / steps)
                    .collect()
            }
        }
    }
}
