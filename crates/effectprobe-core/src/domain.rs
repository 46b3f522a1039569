//! Candidate value generation per parameter.
//!
//! A generator turns one live [`Parameter`] into a finite ordered list of
//! shared [`Assignment`]s. Generators must be deterministic, otherwise test
//! plans stop being reproducible.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::parameter::Parameter;
use crate::value::{Bounds, ParamValue};

/// Produces the candidate values to try for a parameter.
pub trait AssignmentGenerator {
    fn generate(&self, parameter: &Parameter) -> Vec<Arc<Assignment>>;
}

/// Grid sizes used by [`GridGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    /// Grid points across the bounds of a scalar ordinal.
    pub samples: usize,
    /// Grid points each end of a min/max range is drawn from.
    pub range_samples: usize,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            samples: 5,
            range_samples: 3,
        }
    }
}

/// Evenly spaced candidates across a parameter's bounds, plus its current
/// value, deduplicated and sorted ascending.
///
/// Parameters without bounds only yield their current value.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridGenerator {
    config: DomainConfig,
}

impl GridGenerator {
    #[must_use]
    pub fn new(config: DomainConfig) -> Self {
        Self { config }
    }

    fn candidates(&self, parameter: &Parameter) -> Vec<ParamValue> {
        let current = parameter.value;
        let Some(bounds) = parameter.bounds else {
            return vec![current];
        };
        let mut values = match current {
            ParamValue::Int(_) => bounds
                .grid(self.config.samples)
                .into_iter()
                .map(|x| ParamValue::Int(round_i32(x)))
                .collect(),
            ParamValue::Float(_) => bounds
                .grid(self.config.samples)
                .into_iter()
                .map(|x| ParamValue::Float(x as f32))
                .collect(),
            ParamValue::Double(_) => bounds
                .grid(self.config.samples)
                .into_iter()
                .map(ParamValue::Double)
                .collect(),
            ParamValue::IntMinMax { .. } => range_candidates(bounds, self.config.range_samples),
        };
        values.push(current);
        values.sort_by(ParamValue::total_cmp);
        values.dedup_by(|a, b| a.total_cmp(b).is_eq());
        values
    }
}

impl AssignmentGenerator for GridGenerator {
    fn generate(&self, parameter: &Parameter) -> Vec<Arc<Assignment>> {
        let assignments: Vec<_> = self
            .candidates(parameter)
            .into_iter()
            .map(|value| Assignment::shared(parameter.id.clone(), value))
            .collect();
        tracing::trace!(
            param = %parameter.id,
            candidates = assignments.len(),
            "generated assignment domain"
        );
        assignments
    }
}

fn round_i32(x: f64) -> i32 {
    x.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Every `(lo, hi)` with `lo <= hi` from a grid over the bounds.
fn range_candidates(bounds: Bounds, samples: usize) -> Vec<ParamValue> {
    let mut grid: Vec<i32> = bounds.grid(samples).into_iter().map(round_i32).collect();
    grid.dedup();
    let mut values = Vec::new();
    for (i, &min) in grid.iter().enumerate() {
        for &max in &grid[i..] {
            values.push(ParamValue::IntMinMax { min, max });
        }
    }
    values
}
