//! Assignments and tests.
//!
//! An [`Assignment`] binds one candidate value to one parameter. It is created
//! once by a domain generator and shared by `Arc` across every test that uses
//! it. A [`Test`] is an ordered list of assignments: the baseline first, then
//! one varied assignment per targeted parameter.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parameter::{ParamId, ParameterStore};
use crate::value::ParamValue;

/// One candidate value bound to one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub param: ParamId,
    pub value: ParamValue,
}

impl Assignment {
    #[must_use]
    pub fn new(param: impl Into<ParamId>, value: ParamValue) -> Self {
        Self {
            param: param.into(),
            value,
        }
    }

    #[must_use]
    pub fn shared(param: impl Into<ParamId>, value: ParamValue) -> Arc<Self> {
        Arc::new(Self::new(param, value))
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.param, self.value)
    }
}

/// An ordered list of assignments handed to the execution driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Test {
    assignments: Vec<Arc<Assignment>>,
}

impl Test {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_assignments(assignments: Vec<Arc<Assignment>>) -> Self {
        Self { assignments }
    }

    pub fn push(&mut self, assignment: Arc<Assignment>) {
        self.assignments.push(assignment);
    }

    /// Baseline plus `extra`, in order.
    #[must_use]
    pub fn extended<I>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = Arc<Assignment>>,
    {
        let mut test = self.clone();
        test.assignments.extend(extra);
        test
    }

    #[must_use]
    pub fn assignments(&self) -> &[Arc<Assignment>] {
        &self.assignments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The explicit value for `param`; the first assignment wins.
    #[must_use]
    pub fn value_of(&self, param: &ParamId) -> Option<&ParamValue> {
        self.assignments
            .iter()
            .find(|a| &a.param == param)
            .map(|a| &a.value)
    }

    /// Distinct parameters this test assigns.
    #[must_use]
    pub fn parameters(&self) -> BTreeSet<&ParamId> {
        self.assignments.iter().map(|a| &a.param).collect()
    }

    /// Write every assignment into `store`.
    ///
    /// All assignments are validated before the first write, so a rejected
    /// test leaves the store untouched.
    pub fn apply_to<S: ParameterStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        for assignment in &self.assignments {
            let current = store.value(&assignment.param)?;
            if current.kind() != assignment.value.kind() {
                return Err(Error::TypeMismatch {
                    id: assignment.param.clone(),
                    expected: current.kind(),
                    found: assignment.value.kind(),
                });
            }
        }
        let mut applied = BTreeSet::new();
        for assignment in &self.assignments {
            if applied.insert(&assignment.param) {
                store.set_value(&assignment.param, assignment.value)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (n, assignment) in self.assignments.iter().enumerate() {
            if n > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{assignment}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{Parameter, ParameterGroup};

    fn store() -> ParameterGroup {
        ParameterGroup::new("root", "Root")
            .with_parameter(Parameter::new("a", "A", ParamValue::Int(1)))
            .with_parameter(Parameter::new("b", "B", ParamValue::Double(0.5)))
    }

    #[test]
    fn assignments_are_shared_not_copied() {
        let candidate = Assignment::shared("a", ParamValue::Int(4));
        let baseline = Test::new();
        let t1 = baseline.extended([Arc::clone(&candidate)]);
        let t2 = baseline.extended([Arc::clone(&candidate)]);
        assert!(Arc::ptr_eq(&t1.assignments()[0], &t2.assignments()[0]));
        assert_eq!(Arc::strong_count(&candidate), 3);
    }

    #[test]
    fn first_assignment_wins() {
        let test = Test::from_assignments(vec![
            Assignment::shared("a", ParamValue::Int(2)),
            Assignment::shared("a", ParamValue::Int(3)),
        ]);
        assert_eq!(test.value_of(&ParamId::from("a")), Some(&ParamValue::Int(2)));
        assert_eq!(test.value_of(&ParamId::from("b")), None);
        assert_eq!(test.parameters().len(), 1);
    }

    #[test]
    fn apply_writes_all_values() {
        let mut store = store();
        let test = Test::from_assignments(vec![
            Assignment::shared("a", ParamValue::Int(9)),
            Assignment::shared("b", ParamValue::Double(0.25)),
        ]);
        test.apply_to(&mut store).unwrap();
        assert_eq!(store.value(&ParamId::from("a")).unwrap(), ParamValue::Int(9));
        assert_eq!(store.value(&ParamId::from("b")).unwrap(), ParamValue::Double(0.25));
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let mut store = store();
        let test = Test::from_assignments(vec![
            Assignment::shared("a", ParamValue::Int(9)),
            Assignment::shared("b", ParamValue::Int(0)),
        ]);
        assert!(test.apply_to(&mut store).is_err());
        assert_eq!(store.value(&ParamId::from("a")).unwrap(), ParamValue::Int(1));
    }

    #[test]
    fn display_lists_assignments() {
        let test = Test::from_assignments(vec![
            Assignment::shared("a", ParamValue::Int(2)),
            Assignment::shared("b", ParamValue::Double(0.5)),
        ]);
        assert_eq!(test.to_string(), "[a = 2, b = 0.5]");
    }

    #[test]
    fn serde_is_a_plain_list() {
        let test = Test::from_assignments(vec![Assignment::shared("a", ParamValue::Int(2))]);
        let json = serde_json::to_string(&test).unwrap();
        assert_eq!(json, r#"[{"param":"a","value":{"int":2}}]"#);
        let back: Test = serde_json::from_str(&json).unwrap();
        assert_eq!(back, test);
    }
}
