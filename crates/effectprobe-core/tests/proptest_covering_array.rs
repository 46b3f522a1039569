//! Property-based tests for the covering-array builders.
//!
//! Verifies:
//! - Plain builder: every cross-domain pair of candidates appears in some test
//! - Plain builder: never larger than the naive pairwise matrix
//! - Plain builder: a single domain of size k yields exactly k tests
//! - Both builders: identical inputs produce identical output
//! - Both builders: baseline first, then one candidate per domain in order
//! - Constrained builder: exactly one shared candidate per domain in every test

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use effectprobe_core::assignment::{Assignment, Test};
use effectprobe_core::covering::{
    ConstrainedDomain, CoveringConfig, constrained_covering_array, covering_array,
    naive_pair_count,
};
use effectprobe_core::effect::{Effect, directional_effect};
use effectprobe_core::value::ParamValue;

// ────────────────────────────────────────────────────────────────────
// Strategies
// ────────────────────────────────────────────────────────────────────

fn arb_sizes(max_domains: usize, max_size: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1..=max_size, 1..=max_domains)
}

fn arb_effect() -> impl Strategy<Value = Effect> {
    prop::sample::select(Effect::ALL.to_vec())
}

fn domains(sizes: &[usize]) -> Vec<Vec<Arc<Assignment>>> {
    sizes
        .iter()
        .enumerate()
        .map(|(d, &size)| {
            (0..size)
                .map(|v| Assignment::shared(format!("p{d}"), ParamValue::Int(v as i32)))
                .collect()
        })
        .collect()
}

fn baseline() -> Test {
    Test::from_assignments(vec![Assignment::shared("held", ParamValue::Double(1.5))])
}

fn index_of(test: &Test, position: usize) -> usize {
    match test.assignments()[position].value {
        ParamValue::Int(v) => v as usize,
        ref other => panic!("unexpected value {other:?}"),
    }
}

fn assert_shape(tests: &[Test], domain_count: usize) {
    for test in tests {
        assert_eq!(test.len(), domain_count + 1);
        assert_eq!(test.assignments()[0].param.as_str(), "held");
        for d in 0..domain_count {
            assert_eq!(test.assignments()[d + 1].param.as_str(), format!("p{d}"));
        }
    }
}

// ────────────────────────────────────────────────────────────────────
// Plain builder
// ────────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Every interaction (i, j, ii, ji) with j < i is covered.
    #[test]
    fn prop_pairwise_coverage(sizes in arb_sizes(5, 5), seed in any::<u64>()) {
        let vars = domains(&sizes);
        let config = CoveringConfig { seed, ..CoveringConfig::default() };
        let tests = covering_array(&baseline(), &vars, &config).unwrap();
        assert_shape(&tests, sizes.len());

        if sizes.len() == 1 {
            prop_assert_eq!(tests.len(), sizes[0]);
        }
        for i in 1..sizes.len() {
            for j in 0..i {
                let seen: BTreeSet<(usize, usize)> = tests
                    .iter()
                    .map(|t| (index_of(t, i + 1), index_of(t, j + 1)))
                    .collect();
                prop_assert_eq!(seen.len(), sizes[i] * sizes[j]);
            }
        }
    }

    /// Output never exceeds the naive matrix (single domains excepted).
    #[test]
    fn prop_pairwise_not_larger_than_naive(sizes in arb_sizes(5, 5)) {
        prop_assume!(sizes.len() >= 2);
        let tests = covering_array(&baseline(), &domains(&sizes), &CoveringConfig::default()).unwrap();
        prop_assert!(tests.len() <= naive_pair_count(&sizes));
    }

    /// Same inputs, same seed: same plan.
    #[test]
    fn prop_pairwise_deterministic(sizes in arb_sizes(4, 4), seed in any::<u64>()) {
        let vars = domains(&sizes);
        let config = CoveringConfig { seed, ..CoveringConfig::default() };
        let first = covering_array(&baseline(), &vars, &config).unwrap();
        let second = covering_array(&baseline(), &vars, &config).unwrap();
        prop_assert_eq!(first, second);
    }

    /// A single domain yields its candidates in order.
    #[test]
    fn prop_single_domain_in_order(size in 1usize..20) {
        let vars = domains(&[size]);
        let tests = covering_array(&baseline(), &vars, &CoveringConfig::default()).unwrap();
        prop_assert_eq!(tests.len(), size);
        for (k, test) in tests.iter().enumerate() {
            prop_assert_eq!(index_of(test, 1), k);
        }
    }
}

#[test]
fn two_by_three_fits_in_six_tests() {
    let vars = domains(&[2, 3]);
    let tests = covering_array(&Test::new(), &vars, &CoveringConfig::default()).unwrap();
    assert!(tests.len() <= 6);
    let seen: BTreeSet<(usize, usize)> = tests
        .iter()
        .map(|t| (index_of(t, 0), index_of(t, 1)))
        .collect();
    assert_eq!(seen.len(), 6);
}

// ────────────────────────────────────────────────────────────────────
// Constraint-aware builder
// ────────────────────────────────────────────────────────────────────

/// Predicate of a leaf declaring `selected` for "value increases".
fn directional(selected: Effect) -> impl Fn(&Assignment, &Assignment) -> Option<Effect> {
    move |a, b| {
        let (ParamValue::Int(x), ParamValue::Int(y)) = (a.value, b.value) else {
            return None;
        };
        match directional_effect(selected, &x, &y) {
            Effect::NotComparable => None,
            effect => Some(effect),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// One candidate per domain, in domain order, after the baseline.
    #[test]
    fn prop_constrained_shape(
        sizes in arb_sizes(4, 3),
        effects in prop::collection::vec(arb_effect(), 4),
    ) {
        let vars: Vec<ConstrainedDomain<'_>> = domains(&sizes)
            .into_iter()
            .zip(&effects)
            .map(|(values, &effect)| ConstrainedDomain::new(directional(effect), values))
            .collect();
        let tests = constrained_covering_array(&baseline(), &vars).unwrap();
        prop_assert!(!tests.is_empty());
        assert_shape(&tests, sizes.len());
    }

    /// Each configuration picks exactly one candidate per domain, so no two
    /// candidates of one domain ever meet in a test.
    #[test]
    fn prop_constrained_one_candidate_per_domain(
        sizes in arb_sizes(3, 3),
        effects in prop::collection::vec(arb_effect(), 3),
    ) {
        let vars: Vec<ConstrainedDomain<'_>> = domains(&sizes)
            .into_iter()
            .zip(&effects)
            .map(|(values, &effect)| ConstrainedDomain::new(directional(effect), values))
            .collect();
        let tests = constrained_covering_array(&Test::new(), &vars).unwrap();
        for test in &tests {
            prop_assert_eq!(test.parameters().len(), sizes.len());
            prop_assert_eq!(test.len(), sizes.len());
            for (d, domain) in vars.iter().enumerate() {
                let chosen = &test.assignments()[d];
                prop_assert!(domain.values.iter().any(|v| Arc::ptr_eq(v, chosen)));
            }
        }
    }

    /// Same inputs: same configurations.
    #[test]
    fn prop_constrained_deterministic(
        sizes in arb_sizes(3, 3),
        effects in prop::collection::vec(arb_effect(), 3),
    ) {
        let build = || {
            let vars: Vec<ConstrainedDomain<'_>> = domains(&sizes)
                .into_iter()
                .zip(&effects)
                .map(|(values, &effect)| ConstrainedDomain::new(directional(effect), values))
                .collect();
            constrained_covering_array(&baseline(), &vars).unwrap()
        };
        prop_assert_eq!(build(), build());
    }
}
