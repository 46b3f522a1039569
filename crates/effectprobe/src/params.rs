//! Input files of the CLI.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use effectprobe_core::{
    Effect, Measurement, ParamId, ParameterGroup, Test, TestOutcome, TestableParameter,
};

/// A pipeline's parameters plus the declared expected effects.
///
/// ```toml
/// [pipeline]
/// id = "raycaster"
/// display_name = "Raycaster"
///
/// [[pipeline.members]]
/// kind = "value"
/// id = "iso"
/// display_name = "Iso value"
/// value = { double = 0.5 }
/// bounds = { min = 0.0, max = 1.0 }
///
/// [expectations]
/// iso = ["LESS"]
/// ```
///
/// Every parameter named under `[expectations]` is selected for testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamsFile {
    pub pipeline: ParameterGroup,
    #[serde(default)]
    pub expectations: BTreeMap<ParamId, Vec<Effect>>,
}

impl ParamsFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read params file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Failed to parse params file {}", path.display()))
    }

    /// Testable tree with every expectation applied.
    pub fn tree(&self) -> effectprobe_core::Result<TestableParameter> {
        let mut tree = TestableParameter::from_group(&self.pipeline);
        for (id, effects) in &self.expectations {
            tree.expect(id, effects)?;
        }
        Ok(tree)
    }
}

/// One executed test as reported by an external driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedOutcome {
    pub test: Test,
    #[serde(flatten)]
    pub measurement: Measurement,
}

pub fn load_outcomes(path: &Path, tree: &TestableParameter) -> anyhow::Result<Vec<Arc<TestOutcome>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read outcomes file {}", path.display()))?;
    let recorded: Vec<RecordedOutcome> = serde_json::from_str(&text)
        .map_err(effectprobe_core::Error::from)
        .with_context(|| format!("Failed to parse outcomes file {}", path.display()))?;
    Ok(recorded
        .into_iter()
        .map(|r| Arc::new(TestOutcome::resolve(tree, r.test, r.measurement)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use effectprobe_core::ParamValue;

    const PARAMS: &str = r#"
        [pipeline]
        id = "raycaster"
        display_name = "Raycaster"

        [[pipeline.members]]
        kind = "value"
        id = "iso"
        display_name = "Iso value"
        value = { double = 0.5 }
        bounds = { min = 0.0, max = 1.0 }

        [[pipeline.members]]
        kind = "value"
        id = "range"
        display_name = "Range"
        value = { int_min_max = { min = 2, max = 8 } }

        [expectations]
        range = ["LESS_EQUAL", "GREATER_EQUAL"]
    "#;

    #[test]
    fn expectations_select_leaves() {
        let params: ParamsFile = toml::from_str(PARAMS).unwrap();
        let tree = params.tree().unwrap();
        let selected: Vec<_> = tree
            .leaves()
            .into_iter()
            .filter(|leaf| leaf.is_selected())
            .map(|leaf| leaf.id().to_string())
            .collect();
        assert_eq!(selected, vec!["range"]);
        assert_eq!(
            tree.find_default(&ParamId::from("range")),
            Some(&ParamValue::IntMinMax { min: 2, max: 8 })
        );
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let text = PARAMS.replace(r#"["LESS_EQUAL", "GREATER_EQUAL"]"#, r#"["LESS"]"#);
        let params: ParamsFile = toml::from_str(&text).unwrap();
        assert!(matches!(
            params.tree(),
            Err(effectprobe_core::Error::ComponentCount { .. })
        ));
    }

    #[test]
    fn recorded_outcome_is_flat() {
        let json = r#"{"test":[{"param":"iso","value":{"double":0.25}}],"metric":12.0,"artifact":"out/1.png"}"#;
        let recorded: RecordedOutcome = serde_json::from_str(json).unwrap();
        assert_eq!(recorded.test.len(), 1);
        assert_eq!(recorded.measurement.metric, 12.0);
        assert!(recorded.measurement.artifact.is_some());
    }
}
