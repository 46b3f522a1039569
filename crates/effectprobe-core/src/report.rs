//! Plain-text rendering of violations.

use std::fmt::Write;

use crate::analyzer::Violation;
use crate::error::Result;
use crate::testable::TestableParameter;

/// Render `violations` for a terminal, one block per violation.
pub fn render_text(violations: &[Violation], tree: &TestableParameter) -> Result<String> {
    let mut out = String::new();
    if violations.is_empty() {
        out.push_str("No violations found.\n");
        return Ok(out);
    }
    let _ = writeln!(out, "{} violation(s) found.", violations.len());
    for (n, violation) in violations.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Violation {}: expected {} ({}), observed {} vs {}",
            n + 1,
            violation.expected,
            violation.expected.orderings(),
            violation.reference_metric,
            violation.variant_metric,
        );
        let _ = writeln!(out, "  reference: {}", violation.reference.test());
        if let Some(artifact) = violation.reference.artifact() {
            let _ = writeln!(out, "    artifact: {}", artifact.display());
        }
        let _ = writeln!(out, "  variant:   {}", violation.variant.test());
        if let Some(artifact) = violation.variant.artifact() {
            let _ = writeln!(out, "    artifact: {}", artifact.display());
        }
        let details = tree.describe_pair(&violation.reference, &violation.variant)?;
        for line in details.lines() {
            let _ = writeln!(out, "  {line}");
        }
    }
    Ok(out)
}
