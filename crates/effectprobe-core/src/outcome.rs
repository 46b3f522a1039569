//! Measured results of executed tests.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::assignment::Test;
use crate::error::{Error, Result};
use crate::parameter::ParamId;
use crate::testable::TestableParameter;
use crate::value::ParamValue;

/// What the execution driver reports for one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Derived scalar metric, e.g. a rendered image's counted pixels.
    pub metric: f64,
    /// Opaque reference to a produced artifact, e.g. an image path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
}

impl Measurement {
    #[must_use]
    pub fn new(metric: f64) -> Self {
        Self {
            metric,
            artifact: None,
        }
    }

    #[must_use]
    pub fn with_artifact(mut self, artifact: impl Into<PathBuf>) -> Self {
        self.artifact = Some(artifact.into());
        self
    }
}

/// The resolved result of running one test. Read-only once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    test: Test,
    values: BTreeMap<ParamId, ParamValue>,
    metric: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    artifact: Option<PathBuf>,
}

impl TestOutcome {
    /// Resolve every parameter's value for `test`: explicit assignments
    /// override the defaults stored in `tree`.
    #[must_use]
    pub fn resolve(tree: &TestableParameter, test: Test, measurement: Measurement) -> Self {
        let mut values = tree.defaults();
        for assignment in test.assignments().iter().rev() {
            values.insert(assignment.param.clone(), assignment.value);
        }
        Self {
            test,
            values,
            metric: measurement.metric,
            artifact: measurement.artifact,
        }
    }

    #[must_use]
    pub fn test(&self) -> &Test {
        &self.test
    }

    #[must_use]
    pub fn metric(&self) -> f64 {
        self.metric
    }

    #[must_use]
    pub fn artifact(&self) -> Option<&PathBuf> {
        self.artifact.as_ref()
    }

    /// Resolved value of `id`, if the outcome knows it.
    #[must_use]
    pub fn get(&self, id: &ParamId) -> Option<&ParamValue> {
        self.values.get(id)
    }

    pub fn value(&self, id: &ParamId) -> Result<&ParamValue> {
        self.get(id)
            .ok_or_else(|| Error::UnknownParameter { id: id.clone() })
    }

    #[must_use]
    pub fn values(&self) -> &BTreeMap<ParamId, ParamValue> {
        &self.values
    }
}
