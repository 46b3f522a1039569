//! Property-based tests for the effect algebra.
//!
//! Verifies the laws the builders and the analyzer rely on:
//! - Effect ↔ ordering-set bijection over all eight subsets
//! - combine: commutative, associative, idempotent, ANY identity,
//!   NOT_COMPARABLE absorbing, equal to set intersection
//! - reverse: involution, distributes over combine
//! - directional_effect: selected / ANY / reversed by value ordering,
//!   antisymmetric under swapping the operands
//! - comparator: agrees with ordering-set membership, symmetric under
//!   reverse with swapped operands
//! - Effect serde and FromStr roundtrips

use std::cmp::Ordering;

use proptest::prelude::*;

use effectprobe_core::effect::{
    Effect, OrderingSet, combine, combine_all, comparator, directional_effect, reverse,
};

// ────────────────────────────────────────────────────────────────────
// Strategies
// ────────────────────────────────────────────────────────────────────

fn arb_effect() -> impl Strategy<Value = Effect> {
    prop::sample::select(Effect::ALL.to_vec())
}

fn arb_metric() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1000i32..1000).prop_map(f64::from),
        -1.0e6f64..1.0e6,
    ]
}

fn ordering_of(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

// ────────────────────────────────────────────────────────────────────
// Bijection
// ────────────────────────────────────────────────────────────────────

#[test]
fn every_subset_maps_to_one_effect() {
    let mut seen = std::collections::BTreeSet::new();
    for bits in 0u8..8 {
        let effect = Effect::from_orderings(OrderingSet::from_bits(bits));
        assert_eq!(effect.orderings().bits(), bits);
        assert!(seen.insert(effect));
    }
    assert_eq!(seen.len(), 8);
}

// ────────────────────────────────────────────────────────────────────
// combine
// ────────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// combine(a, b) = combine(b, a).
    #[test]
    fn prop_combine_commutative(a in arb_effect(), b in arb_effect()) {
        prop_assert_eq!(combine(a, b), combine(b, a));
    }

    /// combine(combine(a, b), c) = combine(a, combine(b, c)).
    #[test]
    fn prop_combine_associative(a in arb_effect(), b in arb_effect(), c in arb_effect()) {
        prop_assert_eq!(combine(combine(a, b), c), combine(a, combine(b, c)));
    }

    /// combine(x, x) = x.
    #[test]
    fn prop_combine_idempotent(x in arb_effect()) {
        prop_assert_eq!(combine(x, x), x);
    }

    /// ANY is the identity, NOT_COMPARABLE absorbs.
    #[test]
    fn prop_combine_identity_and_absorption(x in arb_effect()) {
        prop_assert_eq!(combine(x, Effect::Any), x);
        prop_assert_eq!(combine(Effect::NotComparable, x), Effect::NotComparable);
    }

    /// combine is exactly set intersection.
    #[test]
    fn prop_combine_is_intersection(a in arb_effect(), b in arb_effect()) {
        let expected = a.orderings().intersect(b.orderings());
        prop_assert_eq!(combine(a, b).orderings(), expected);
    }

    /// combine_all folds combine from ANY.
    #[test]
    fn prop_combine_all_folds(effects in prop::collection::vec(arb_effect(), 0..8)) {
        let folded = effects.iter().fold(Effect::Any, |acc, &e| combine(acc, e));
        prop_assert_eq!(combine_all(effects), folded);
    }
}

// ────────────────────────────────────────────────────────────────────
// reverse
// ────────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// reverse(reverse(e)) = e.
    #[test]
    fn prop_reverse_involution(e in arb_effect()) {
        prop_assert_eq!(reverse(reverse(e)), e);
    }

    /// reverse distributes over combine.
    #[test]
    fn prop_reverse_distributes(a in arb_effect(), b in arb_effect()) {
        prop_assert_eq!(reverse(combine(a, b)), combine(reverse(a), reverse(b)));
    }

    /// Symmetric effects are fixed points.
    #[test]
    fn prop_reverse_fixed_points(e in arb_effect()) {
        let symmetric = e.orderings().contains(Ordering::Less)
            == e.orderings().contains(Ordering::Greater);
        prop_assert_eq!(reverse(e) == e, symmetric);
    }
}

// ────────────────────────────────────────────────────────────────────
// directional_effect / comparator
// ────────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// selected when increasing, ANY when equal, reversed when decreasing.
    #[test]
    fn prop_directional_by_ordering(sel in arb_effect(), new_val in -50i32..50, old_val in -50i32..50) {
        let got = directional_effect(sel, &new_val, &old_val);
        let expected = match new_val.cmp(&old_val) {
            Ordering::Greater => sel,
            Ordering::Equal => Effect::Any,
            Ordering::Less => reverse(sel),
        };
        prop_assert_eq!(got, expected);
    }

    /// Swapping the operands reverses the prediction.
    #[test]
    fn prop_directional_antisymmetric(sel in arb_effect(), a in -50i32..50, b in -50i32..50) {
        prop_assert_eq!(
            directional_effect(sel, &a, &b),
            reverse(directional_effect(sel, &b, &a))
        );
    }

    /// comparator holds iff the observed ordering is in the effect's set.
    #[test]
    fn prop_comparator_is_membership(e in arb_effect(), a in arb_metric(), b in arb_metric()) {
        prop_assert_eq!(comparator(e, &a, &b), e.orderings().contains(ordering_of(a, b)));
    }

    /// comparator(e, a, b) = comparator(reverse(e), b, a).
    #[test]
    fn prop_comparator_reverse_symmetry(e in arb_effect(), a in arb_metric(), b in arb_metric()) {
        prop_assert_eq!(comparator(e, &a, &b), comparator(reverse(e), &b, &a));
    }

    /// ANY always holds, NOT_COMPARABLE never does.
    #[test]
    fn prop_comparator_extremes(a in arb_metric(), b in arb_metric()) {
        prop_assert!(comparator(Effect::Any, &a, &b));
        prop_assert!(!comparator(Effect::NotComparable, &a, &b));
    }
}

// ────────────────────────────────────────────────────────────────────
// Serialization
// ────────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Serde and FromStr agree with Display.
    #[test]
    fn prop_effect_names_roundtrip(e in arb_effect()) {
        let json = serde_json::to_string(&e).unwrap();
        prop_assert_eq!(&json, &format!("\"{e}\""));
        let back: Effect = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, e);
        let parsed: Effect = e.to_string().to_lowercase().replace('_', "-").parse().unwrap();
        prop_assert_eq!(parsed, e);
    }
}
