//! Live configurable parameters of a pipeline.
//!
//! A [`ParameterGroup`] is the parameter-owning container the testable tree
//! is built over. Values are read and written only through the
//! [`ParameterStore`] seam, so the tree never holds references into live
//! state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::{Bounds, ParamValue};

/// Identifier of a parameter or parameter group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamId(String);

impl ParamId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParamId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ParamId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single configurable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: ParamId,
    pub display_name: String,
    pub value: ParamValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

impl Parameter {
    #[must_use]
    pub fn new(id: impl Into<ParamId>, display_name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            value,
            bounds: None,
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.bounds = Some(Bounds::new(min, max));
        self
    }
}

/// A member of a [`ParameterGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterNode {
    Value(Parameter),
    Group(ParameterGroup),
    /// A parameter whose value type cannot be tested (strings, buttons, ...).
    Opaque { id: ParamId, type_name: String },
}

impl ParameterNode {
    #[must_use]
    pub fn id(&self) -> &ParamId {
        match self {
            Self::Value(param) => &param.id,
            Self::Group(group) => &group.id,
            Self::Opaque { id, .. } => id,
        }
    }
}

/// A parameter-owning container. Groups nest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterGroup {
    pub id: ParamId,
    pub display_name: String,
    #[serde(default)]
    pub members: Vec<ParameterNode>,
}

impl ParameterGroup {
    #[must_use]
    pub fn new(id: impl Into<ParamId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.members.push(ParameterNode::Value(parameter));
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: Self) -> Self {
        self.members.push(ParameterNode::Group(group));
        self
    }

    #[must_use]
    pub fn with_opaque(mut self, id: impl Into<ParamId>, type_name: impl Into<String>) -> Self {
        self.members.push(ParameterNode::Opaque {
            id: id.into(),
            type_name: type_name.into(),
        });
        self
    }

    fn find(&self, id: &ParamId) -> Option<&Parameter> {
        self.members.iter().find_map(|member| match member {
            ParameterNode::Value(param) if &param.id == id => Some(param),
            ParameterNode::Group(group) => group.find(id),
            _ => None,
        })
    }

    fn find_mut(&mut self, id: &ParamId) -> Option<&mut Parameter> {
        self.members.iter_mut().find_map(|member| match member {
            ParameterNode::Value(param) if &param.id == id => Some(param),
            ParameterNode::Group(group) => group.find_mut(id),
            _ => None,
        })
    }
}

/// Read/write access to live parameter state.
pub trait ParameterStore {
    /// Look up a parameter anywhere in the store.
    fn parameter(&self, id: &ParamId) -> Option<&Parameter>;

    /// Replace a parameter's value. The kind must not change.
    fn set_value(&mut self, id: &ParamId, value: ParamValue) -> Result<()>;

    /// Current value of a parameter.
    fn value(&self, id: &ParamId) -> Result<ParamValue> {
        self.parameter(id)
            .map(|param| param.value)
            .ok_or_else(|| Error::UnknownParameter { id: id.clone() })
    }
}

impl ParameterStore for ParameterGroup {
    fn parameter(&self, id: &ParamId) -> Option<&Parameter> {
        self.find(id)
    }

    fn set_value(&mut self, id: &ParamId, value: ParamValue) -> Result<()> {
        let param = self
            .find_mut(id)
            .ok_or_else(|| Error::UnknownParameter { id: id.clone() })?;
        if param.value.kind() != value.kind() {
            return Err(Error::TypeMismatch {
                id: id.clone(),
                expected: param.value.kind(),
                found: value.kind(),
            });
        }
        param.value = value;
        Ok(())
    }
}
