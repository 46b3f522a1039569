//! Execution contract.
//!
//! Running a test (applying its assignments to live state, running the
//! pipeline, measuring the metric) happens outside this crate behind
//! [`ExecutionDriver`]. Failures are surfaced as-is; nothing is retried.

use std::collections::BTreeMap;

use crate::assignment::Test;
use crate::error::{DriverError, Error, Result};
use crate::outcome::{Measurement, TestOutcome};
use crate::parameter::{ParamId, ParameterStore};
use crate::testable::TestableParameter;
use crate::value::ParamValue;

/// Executes one test and measures its metric.
pub trait ExecutionDriver {
    fn execute(&mut self, test: &Test) -> std::result::Result<Measurement, DriverError>;
}

impl<F> ExecutionDriver for F
where
    F: FnMut(&Test) -> std::result::Result<Measurement, DriverError>,
{
    fn execute(&mut self, test: &Test) -> std::result::Result<Measurement, DriverError> {
        self(test)
    }
}

/// Execute `tests` in order and resolve each outcome against the tree's
/// stored defaults. Stops at the first failing test.
pub fn run_plan<D>(driver: &mut D, tree: &TestableParameter, tests: &[Test]) -> Result<Vec<TestOutcome>>
where
    D: ExecutionDriver + ?Sized,
{
    let mut outcomes = Vec::with_capacity(tests.len());
    for (index, test) in tests.iter().enumerate() {
        let measurement = driver
            .execute(test)
            .map_err(|source| Error::Execution { index, source })?;
        tracing::debug!(index, metric = measurement.metric, test = %test, "executed test");
        outcomes.push(TestOutcome::resolve(tree, test.clone(), measurement));
    }
    Ok(outcomes)
}

/// Drives an in-process pipeline: resets `store` to the captured defaults,
/// applies the test, then measures.
///
/// Reset and apply both happen before `measure` sees the store, so every
/// measurement observes exactly one test's assignments.
pub struct StoreDriver<S, M> {
    store: S,
    defaults: BTreeMap<ParamId, ParamValue>,
    measure: M,
}

impl<S, M> StoreDriver<S, M>
where
    S: ParameterStore,
    M: FnMut(&S) -> std::result::Result<Measurement, DriverError>,
{
    pub fn new(store: S, tree: &TestableParameter, measure: M) -> Self {
        Self {
            store,
            defaults: tree.defaults(),
            measure,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn reset(&mut self) -> Result<()> {
        for (id, value) in &self.defaults {
            self.store.set_value(id, *value)?;
        }
        Ok(())
    }
}

impl<S, M> ExecutionDriver for StoreDriver<S, M>
where
    S: ParameterStore,
    M: FnMut(&S) -> std::result::Result<Measurement, DriverError>,
{
    fn execute(&mut self, test: &Test) -> std::result::Result<Measurement, DriverError> {
        self.reset()
            .and_then(|()| test.apply_to(&mut self.store))
            .map_err(|err| DriverError::new(err.to_string()))?;
        (self.measure)(&self.store)
    }
}
