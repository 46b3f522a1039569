//! Result analysis.
//!
//! Compares the declared expected effect of a pair of outcomes against the
//! actual ordering of their metrics. `ANY` makes no prediction and
//! `NOT_COMPARABLE` has none, so neither can be violated.

use std::sync::Arc;

use serde::Serialize;

use crate::effect::{Effect, comparator};
use crate::error::Result;
use crate::outcome::TestOutcome;
use crate::testable::TestableParameter;

/// An observed metric ordering that contradicts the expected effect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub reference: Arc<TestOutcome>,
    pub variant: Arc<TestOutcome>,
    /// Expected ordering of `reference_metric` relative to `variant_metric`.
    pub expected: Effect,
    pub reference_metric: f64,
    pub variant_metric: f64,
}

/// Check one pair of outcomes.
pub fn analyze(
    tree: &TestableParameter,
    reference: &Arc<TestOutcome>,
    variant: &Arc<TestOutcome>,
) -> Result<Option<Violation>> {
    let expected = tree.effect(reference, variant)?;
    if !expected.is_prediction() {
        return Ok(None);
    }
    let (reference_metric, variant_metric) = (reference.metric(), variant.metric());
    if comparator(expected, &reference_metric, &variant_metric) {
        return Ok(None);
    }
    Ok(Some(Violation {
        reference: Arc::clone(reference),
        variant: Arc::clone(variant),
        expected,
        reference_metric,
        variant_metric,
    }))
}

/// Check every unordered pair of outcomes once, the earlier outcome being the
/// reference. Violations come back in pair order.
///
/// The swapped roles need no separate check: the expected effect of the
/// swapped pair is the reverse of this one, and the reversed comparator holds
/// on swapped metrics exactly when the unswapped pair holds.
pub fn check_outcomes(outcomes: &[Arc<TestOutcome>], tree: &TestableParameter) -> Result<Vec<Violation>> {
    let mut violations = Vec::new();
    for (i, reference) in outcomes.iter().enumerate() {
        for variant in &outcomes[i + 1..] {
            if let Some(violation) = analyze(tree, reference, variant)? {
                tracing::warn!(
                    reference = %violation.reference.test(),
                    variant = %violation.variant.test(),
                    expected = %violation.expected,
                    reference_metric = violation.reference_metric,
                    variant_metric = violation.variant_metric,
                    "expected effect violated"
                );
                violations.push(violation);
            }
        }
    }
    tracing::info!(
        outcomes = outcomes.len(),
        violations = violations.len(),
        "checked outcomes"
    );
    Ok(violations)
}
