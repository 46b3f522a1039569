#![no_main]

use std::collections::BTreeSet;
use std::sync::Arc;

use effectprobe_core::assignment::{Assignment, Test};
use effectprobe_core::covering::{
    ConstrainedDomain, CoveringConfig, constrained_covering_array, covering_array,
};
use effectprobe_core::effect::{Effect, directional_effect};
use effectprobe_core::value::ParamValue;
use libfuzzer_sys::fuzz_target;

const MAX_DOMAINS: usize = 5;
const MAX_SIZE: u8 = 6;

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

fn index_of(test: &Test, position: usize) -> usize {
    match test.assignments()[position].value {
        ParamValue::Int(v) => v as usize,
        ref other => panic!("unexpected value {other:?}"),
    }
}

fn effect_for(tag: u8) -> Effect {
    Effect::ALL[usize::from(tag) % Effect::ALL.len()]
}

fuzz_target!(|data: &[u8]| {
    let Some((&seed, shape)) = data.split_first() else {
        return;
    };
    let sizes: Vec<usize> = shape
        .iter()
        .take(MAX_DOMAINS)
        .map(|b| usize::from(b % MAX_SIZE) + 1)
        .collect();
    if sizes.is_empty() {
        return;
    }
    let vars = domains(&sizes);

    let config = CoveringConfig {
        seed: u64::from(seed),
        ..CoveringConfig::default()
    };
    let tests = covering_array(&Test::new(), &vars, &config).expect("plain builder terminates");
    for i in 1..sizes.len() {
        for j in 0..i {
            let seen: BTreeSet<(usize, usize)> = tests
                .iter()
                .map(|t| (index_of(t, i), index_of(t, j)))
                .collect();
            assert_eq!(seen.len(), sizes[i] * sizes[j], "pair ({i}, {j}) not covered");
        }
    }

    let constrained: Vec<ConstrainedDomain<'_>> = vars
        .into_iter()
        .zip(shape)
        .map(|(values, &tag)| {
            let selected = effect_for(tag / MAX_SIZE);
            ConstrainedDomain::new(
                move |a: &Assignment, b: &Assignment| {
                    let (ParamValue::Int(x), ParamValue::Int(y)) = (a.value, b.value) else {
                        return None;
                    };
                    match directional_effect(selected, &x, &y) {
                        Effect::NotComparable => None,
                        effect => Some(effect),
                    }
                },
                values,
            )
        })
        .collect();
    if let Ok(tests) = constrained_covering_array(&Test::new(), &constrained) {
        for test in &tests {
            assert_eq!(test.len(), sizes.len());
        }
    }
});
