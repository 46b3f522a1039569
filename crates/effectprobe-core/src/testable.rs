//! The testable-parameter tree.
//!
//! A [`TestableParameter`] wraps live parameters into a uniform interface.
//! Leaves own one parameter plus one declared [`Effect`] per scalar
//! component; composites own their children exclusively and combine the
//! children's effects with the algebra. The tree refers to live state only
//! by [`ParamId`] and reaches it through a [`ParameterStore`].
//!
//! ```text
//! Composite "pipeline"
//! ├── Leaf "iso"        Double         [GREATER]
//! └── Composite "camera"
//!     └── Leaf "range"  IntMinMax      [LESS_EQUAL, GREATER_EQUAL]
//! ```

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::domain::AssignmentGenerator;
use crate::effect::{Effect, combine, combine_all, directional_effect};
use crate::error::{Error, Result};
use crate::outcome::TestOutcome;
use crate::parameter::{ParamId, Parameter, ParameterGroup, ParameterNode, ParameterStore};
use crate::value::ParamValue;

// =============================================================================
// Tree node
// =============================================================================

/// A node of the testable-parameter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TestableParameter {
    Leaf(TestableLeaf),
    Composite(TestableComposite),
}

impl TestableParameter {
    /// Classify a parameter-group member. Unsupported members yield `None`.
    #[must_use]
    pub fn classify(node: &ParameterNode) -> Option<Self> {
        match node {
            ParameterNode::Value(param) => Some(Self::Leaf(TestableLeaf::from_parameter(param))),
            ParameterNode::Group(group) => Some(Self::from_group(group)),
            ParameterNode::Opaque { id, type_name } => {
                tracing::debug!(param = %id, type_name = %type_name, "skipping untestable parameter");
                None
            }
        }
    }

    /// Build a composite over a parameter-owning container.
    #[must_use]
    pub fn from_group(group: &ParameterGroup) -> Self {
        Self::Composite(TestableComposite::from_group(group))
    }

    #[must_use]
    pub fn id(&self) -> &ParamId {
        match self {
            Self::Leaf(leaf) => &leaf.id,
            Self::Composite(comp) => &comp.id,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Leaf(leaf) => &leaf.display_name,
            Self::Composite(comp) => &comp.display_name,
        }
    }

    /// A leaf is selected explicitly; a composite iff any child is.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        match self {
            Self::Leaf(leaf) => leaf.selected,
            Self::Composite(comp) => comp.children.iter().any(Self::is_selected),
        }
    }

    /// Select or deselect this node and everything below it.
    pub fn set_selected(&mut self, selected: bool) {
        match self {
            Self::Leaf(leaf) => leaf.selected = selected,
            Self::Composite(comp) => {
                for child in &mut comp.children {
                    child.set_selected(selected);
                }
            }
        }
    }

    /// Write every stored default back into live state.
    pub fn set_to_default<S: ParameterStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        match self {
            Self::Leaf(leaf) => leaf.set_to_default(store),
            Self::Composite(comp) => comp
                .children
                .iter()
                .try_for_each(|child| child.set_to_default(store)),
        }
    }

    /// Capture current live values as the stored defaults.
    pub fn store_default<S: ParameterStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        match self {
            Self::Leaf(leaf) => leaf.store_default(store),
            Self::Composite(comp) => comp
                .children
                .iter_mut()
                .try_for_each(|child| child.store_default(store)),
        }
    }

    /// Candidate assignments of every leaf, concatenated in tree order. Each
    /// assignment targets exactly one leaf parameter.
    pub fn generate_assignments<S, G>(&self, store: &S, generator: &G) -> Result<Vec<Arc<Assignment>>>
    where
        S: ParameterStore + ?Sized,
        G: AssignmentGenerator + ?Sized,
    {
        match self {
            Self::Leaf(leaf) => leaf.generate_assignments(store, generator),
            Self::Composite(comp) => {
                let mut assignments = Vec::new();
                for child in &comp.children {
                    assignments.extend(child.generate_assignments(store, generator)?);
                }
                Ok(assignments)
            }
        }
    }

    /// Expected effect on the metric going from `variant` to `reference`.
    ///
    /// Contradictions anywhere in the subtree yield `NOT_COMPARABLE`.
    pub fn effect(&self, reference: &TestOutcome, variant: &TestOutcome) -> Result<Effect> {
        match self {
            Self::Leaf(leaf) => leaf.effect(reference, variant),
            Self::Composite(comp) => {
                let mut acc = Effect::Any;
                for child in &comp.children {
                    acc = combine(acc, child.effect(reference, variant)?);
                    if acc == Effect::NotComparable {
                        break;
                    }
                }
                Ok(acc)
            }
        }
    }

    /// `value` for leaves, `(a, b, ...)` for composites.
    pub fn value_string(&self, outcome: &TestOutcome) -> Result<String> {
        match self {
            Self::Leaf(leaf) => Ok(outcome.value(&leaf.id)?.to_string()),
            Self::Composite(comp) => {
                let parts = comp
                    .children
                    .iter()
                    .map(|child| child.value_string(outcome))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("({})", parts.join(", ")))
            }
        }
    }

    /// Human-readable comparison of both outcomes, one line per leaf.
    pub fn describe_pair(&self, reference: &TestOutcome, variant: &TestOutcome) -> Result<String> {
        let mut out = String::new();
        self.describe_into(&mut out, 0, reference, variant)?;
        Ok(out)
    }

    fn describe_into(
        &self,
        out: &mut String,
        depth: usize,
        reference: &TestOutcome,
        variant: &TestOutcome,
    ) -> Result<()> {
        let indent = "  ".repeat(depth);
        match self {
            Self::Leaf(leaf) => {
                let _ = writeln!(
                    out,
                    "{indent}\"{}\" ({}): {} vs {}; expected {}",
                    leaf.display_name,
                    leaf.id,
                    reference.value(&leaf.id)?,
                    variant.value(&leaf.id)?,
                    leaf.effect(reference, variant)?,
                );
            }
            Self::Composite(comp) => {
                let _ = writeln!(out, "{indent}{}:", comp.display_name);
                for child in &comp.children {
                    child.describe_into(out, depth + 1, reference, variant)?;
                }
            }
        }
        Ok(())
    }

    /// Stored default of the leaf `id`, anywhere in the subtree.
    #[must_use]
    pub fn find_default(&self, id: &ParamId) -> Option<&ParamValue> {
        self.find_leaf(id).map(|leaf| &leaf.default)
    }

    #[must_use]
    pub fn find_leaf(&self, id: &ParamId) -> Option<&TestableLeaf> {
        match self {
            Self::Leaf(leaf) => (&leaf.id == id).then_some(leaf),
            Self::Composite(comp) => comp.children.iter().find_map(|child| child.find_leaf(id)),
        }
    }

    pub fn find_leaf_mut(&mut self, id: &ParamId) -> Option<&mut TestableLeaf> {
        match self {
            Self::Leaf(leaf) => (&leaf.id == id).then_some(leaf),
            Self::Composite(comp) => comp
                .children
                .iter_mut()
                .find_map(|child| child.find_leaf_mut(id)),
        }
    }

    /// Leaves in tree order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&TestableLeaf> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a TestableLeaf>) {
        match self {
            Self::Leaf(leaf) => leaves.push(leaf),
            Self::Composite(comp) => {
                for child in &comp.children {
                    child.collect_leaves(leaves);
                }
            }
        }
    }

    /// Stored defaults of every leaf.
    #[must_use]
    pub fn defaults(&self) -> BTreeMap<ParamId, ParamValue> {
        self.leaves()
            .into_iter()
            .map(|leaf| (leaf.id.clone(), leaf.default))
            .collect()
    }

    /// Declare the expected effects of leaf `id` and select it.
    pub fn expect(&mut self, id: &ParamId, effects: &[Effect]) -> Result<()> {
        let leaf = self
            .find_leaf_mut(id)
            .ok_or_else(|| Error::UnknownParameter { id: id.clone() })?;
        leaf.set_effects(effects)?;
        leaf.selected = true;
        Ok(())
    }
}

// =============================================================================
// Leaf
// =============================================================================

/// A single testable parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestableLeaf {
    id: ParamId,
    display_name: String,
    default: ParamValue,
    /// Expected effect on the metric when the component increases.
    effects: Vec<Effect>,
    #[serde(default)]
    selected: bool,
}

impl TestableLeaf {
    #[must_use]
    pub fn from_parameter(param: &Parameter) -> Self {
        Self {
            id: param.id.clone(),
            display_name: param.display_name.clone(),
            default: param.value,
            effects: vec![Effect::Any; param.value.components()],
            selected: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ParamId {
        &self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn default_value(&self) -> &ParamValue {
        &self.default
    }

    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Replace the per-component effects. One effect per component.
    pub fn set_effects(&mut self, effects: &[Effect]) -> Result<()> {
        let expected = self.default.components();
        if effects.len() != expected {
            return Err(Error::ComponentCount {
                id: self.id.clone(),
                expected,
                found: effects.len(),
            });
        }
        self.effects = effects.to_vec();
        Ok(())
    }

    pub fn set_to_default<S: ParameterStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        store.set_value(&self.id, self.default)
    }

    pub fn store_default<S: ParameterStore + ?Sized>(&mut self, store: &S) -> Result<()> {
        let value = store.value(&self.id)?;
        if value.kind() != self.default.kind() {
            return Err(Error::TypeMismatch {
                id: self.id.clone(),
                expected: self.default.kind(),
                found: value.kind(),
            });
        }
        self.default = value;
        Ok(())
    }

    pub fn generate_assignments<S, G>(&self, store: &S, generator: &G) -> Result<Vec<Arc<Assignment>>>
    where
        S: ParameterStore + ?Sized,
        G: AssignmentGenerator + ?Sized,
    {
        let param = store
            .parameter(&self.id)
            .ok_or_else(|| Error::UnknownParameter { id: self.id.clone() })?;
        Ok(generator.generate(param))
    }

    /// Per-component directional effects combined into one prediction.
    ///
    /// Mismatched kinds and unordered components (NaN) cannot be ordered and
    /// yield `NOT_COMPARABLE`, so the effect stays the reverse of the effect
    /// with the arguments swapped.
    #[must_use]
    pub fn value_effect(&self, new_val: &ParamValue, old_val: &ParamValue) -> Effect {
        if new_val.kind() != old_val.kind() || new_val.kind() != self.default.kind() {
            return Effect::NotComparable;
        }
        combine_all(self.effects.iter().enumerate().map(|(i, &selected)| {
            match (new_val.component(i), old_val.component(i)) {
                (Some(new_c), Some(old_c)) if new_c.partial_cmp(&old_c).is_some() => {
                    directional_effect(selected, &new_c, &old_c)
                }
                _ => Effect::NotComparable,
            }
        }))
    }

    /// Effect between two outcomes, resolving this parameter in each.
    ///
    /// A value known to only one of the outcomes is a structural
    /// disagreement and yields `NOT_COMPARABLE`; unknown to both is an error.
    pub fn effect(&self, reference: &TestOutcome, variant: &TestOutcome) -> Result<Effect> {
        match (reference.get(&self.id), variant.get(&self.id)) {
            (Some(new_val), Some(old_val)) => Ok(self.value_effect(new_val, old_val)),
            (None, None) => Err(Error::UnknownParameter {
                id: self.id.clone(),
            }),
            _ => Ok(Effect::NotComparable),
        }
    }

    /// Compatibility predicate between two candidates of this parameter's
    /// domain; `None` when they can never share a configuration.
    #[must_use]
    pub fn assignment_effect(&self, a: &Assignment, b: &Assignment) -> Option<Effect> {
        if a.param != self.id || b.param != self.id {
            return None;
        }
        match self.value_effect(&a.value, &b.value) {
            Effect::NotComparable => None,
            effect => Some(effect),
        }
    }
}

// =============================================================================
// Composite
// =============================================================================

/// An ordered, exclusively owned list of testable children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestableComposite {
    id: ParamId,
    display_name: String,
    children: Vec<TestableParameter>,
}

impl TestableComposite {
    /// Classify every member of `group`, skipping untestable ones.
    #[must_use]
    pub fn from_group(group: &ParameterGroup) -> Self {
        Self {
            id: group.id.clone(),
            display_name: group.display_name.clone(),
            children: group
                .members
                .iter()
                .filter_map(TestableParameter::classify)
                .collect(),
        }
    }

    #[must_use]
    pub fn new(
        id: impl Into<ParamId>,
        display_name: impl Into<String>,
        children: Vec<TestableParameter>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            children,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[TestableParameter] {
        &self.children
    }
}
