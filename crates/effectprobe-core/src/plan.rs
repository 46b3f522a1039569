//! Test plans.
//!
//! Turns the selected leaves of a testable tree into parameter domains and
//! hands them to one of the covering-array builders.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assignment::Test;
use crate::covering::{
    ConstrainedDomain, CoveringConfig, constrained_covering_array, covering_array,
    naive_pair_count,
};
use crate::domain::AssignmentGenerator;
use crate::error::{ConfigError, Error, Result};
use crate::parameter::{ParamId, ParameterStore};
use crate::testable::TestableParameter;

/// Which covering-array builder produces the plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStrategy {
    /// Randomized pairwise coverage.
    #[default]
    Pairwise,
    /// Configurations kept directionally comparable with each other.
    Constrained,
}

impl PlanStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pairwise => "pairwise",
            Self::Constrained => "constrained",
        }
    }
}

impl fmt::Display for PlanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pairwise" => Ok(Self::Pairwise),
            "constrained" => Ok(Self::Constrained),
            _ => Err(ConfigError::Invalid {
                field: "plan.strategy",
                reason: format!("unknown strategy {s:?}, expected pairwise or constrained"),
            }),
        }
    }
}

/// `[plan]` section of the configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub strategy: PlanStrategy,
}

/// Inputs of [`build_plan`] besides the tree and its live state.
#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub strategy: PlanStrategy,
    pub covering: CoveringConfig,
    /// Assignments held fixed in every test.
    pub baseline: Test,
}

/// Sizes reported alongside a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub strategy: PlanStrategy,
    /// Selected parameters, in tree order.
    pub parameters: Vec<ParamId>,
    /// Candidate values across all domains.
    pub candidates: usize,
    /// Size of the full pairwise matrix.
    pub naive_pairs: usize,
    pub tests: usize,
}

/// The tests to execute, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPlan {
    pub summary: PlanSummary,
    pub tests: Vec<Test>,
}

/// Plan tests over the selected leaves of `tree`.
///
/// Each selected leaf contributes one domain: its generated candidates.
/// With no leaf selected there is nothing to cover and
/// [`Error::NoDomains`] is returned.
pub fn build_plan<S, G>(
    tree: &TestableParameter,
    store: &S,
    generator: &G,
    options: &PlanOptions,
) -> Result<TestPlan>
where
    S: ParameterStore + ?Sized,
    G: AssignmentGenerator + ?Sized,
{
    let leaves: Vec<_> = tree
        .leaves()
        .into_iter()
        .filter(|leaf| leaf.is_selected())
        .collect();
    if leaves.is_empty() {
        return Err(Error::NoDomains);
    }

    let mut domains = Vec::with_capacity(leaves.len());
    for leaf in &leaves {
        domains.push(leaf.generate_assignments(store, generator)?);
    }
    let sizes: Vec<usize> = domains.iter().map(Vec::len).collect();

    let tests = match options.strategy {
        PlanStrategy::Pairwise => covering_array(&options.baseline, &domains, &options.covering)?,
        PlanStrategy::Constrained => {
            let constrained: Vec<ConstrainedDomain<'_>> = leaves
                .iter()
                .zip(domains)
                .map(|(&leaf, values)| {
                    ConstrainedDomain::new(move |a, b| leaf.assignment_effect(a, b), values)
                })
                .collect();
            constrained_covering_array(&options.baseline, &constrained)?
        }
    };

    let summary = PlanSummary {
        strategy: options.strategy,
        parameters: leaves.iter().map(|leaf| leaf.id().clone()).collect(),
        candidates: sizes.iter().sum(),
        naive_pairs: naive_pair_count(&sizes),
        tests: tests.len(),
    };
    tracing::info!(
        strategy = %summary.strategy,
        parameters = summary.parameters.len(),
        naive = summary.naive_pairs,
        tests = summary.tests,
        "test plan ready"
    );
    Ok(TestPlan { summary, tests })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GridGenerator;
    use crate::effect::Effect;
    use crate::parameter::{Parameter, ParameterGroup};
    use crate::value::ParamValue;

    fn pipeline() -> ParameterGroup {
        ParameterGroup::new("pipeline", "Pipeline")
            .with_parameter(
                Parameter::new("iso", "Iso value", ParamValue::Double(0.5)).with_bounds(0.0, 1.0),
            )
            .with_parameter(Parameter::new("steps", "Steps", ParamValue::Int(4)).with_bounds(2.0, 6.0))
            .with_parameter(
                Parameter::new("range", "Range", ParamValue::IntMinMax { min: 2, max: 8 })
                    .with_bounds(0.0, 10.0),
            )
    }

    #[test]
    fn nothing_selected_is_an_error() {
        let live = pipeline();
        let tree = TestableParameter::from_group(&live);
        let err = build_plan(&tree, &live, &GridGenerator::default(), &PlanOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::NoDomains));
    }

    #[test]
    fn only_selected_leaves_are_varied() {
        let live = pipeline();
        let mut tree = TestableParameter::from_group(&live);
        tree.expect(&ParamId::from("iso"), &[Effect::Greater]).unwrap();
        tree.expect(&ParamId::from("steps"), &[Effect::Any]).unwrap();

        let plan = build_plan(&tree, &live, &GridGenerator::default(), &PlanOptions::default())
            .unwrap();
        assert_eq!(
            plan.summary.parameters,
            vec![ParamId::from("iso"), ParamId::from("steps")]
        );
        assert_eq!(plan.summary.candidates, 10);
        assert_eq!(plan.summary.naive_pairs, 25);
        assert_eq!(plan.summary.tests, plan.tests.len());
        assert!(plan.tests.len() <= 25);
        for test in &plan.tests {
            let params: Vec<_> = test.assignments().iter().map(|a| a.param.as_str()).collect();
            assert_eq!(params, vec!["iso", "steps"]);
        }
    }

    #[test]
    fn constrained_strategy_plans_every_domain() {
        let live = pipeline();
        let mut tree = TestableParameter::from_group(&live);
        tree.expect(&ParamId::from("iso"), &[Effect::Greater]).unwrap();
        tree.expect(&ParamId::from("range"), &[Effect::LessEqual, Effect::GreaterEqual])
            .unwrap();
        let options = PlanOptions {
            strategy: PlanStrategy::Constrained,
            ..PlanOptions::default()
        };
        let plan = build_plan(&tree, &live, &GridGenerator::default(), &options).unwrap();
        assert_eq!(plan.summary.strategy, PlanStrategy::Constrained);
        assert!(!plan.tests.is_empty());
        for test in &plan.tests {
            assert_eq!(test.len(), 2);
        }
    }

    #[test]
    fn strategy_parses_case_insensitively() {
        assert_eq!("Pairwise".parse::<PlanStrategy>().unwrap(), PlanStrategy::Pairwise);
        assert_eq!(
            "constrained".parse::<PlanStrategy>().unwrap(),
            PlanStrategy::Constrained
        );
        assert!("greedy".parse::<PlanStrategy>().is_err());
        assert_eq!(PlanStrategy::Constrained.to_string(), "constrained");
    }

    #[test]
    fn plan_serializes_to_json() {
        let live = pipeline();
        let mut tree = TestableParameter::from_group(&live);
        tree.expect(&ParamId::from("steps"), &[Effect::Less]).unwrap();
        let plan = build_plan(&tree, &live, &GridGenerator::default(), &PlanOptions::default())
            .unwrap();
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["summary"]["strategy"], "pairwise");
        assert_eq!(json["tests"].as_array().unwrap().len(), 5);
        let back: TestPlan = serde_json::from_value(json).unwrap();
        assert_eq!(back, plan);
    }
}
