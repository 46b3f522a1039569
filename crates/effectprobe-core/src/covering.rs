//! Covering-array builders.
//!
//! Both builders turn a baseline [`Test`] plus a list of parameter domains
//! into a list of tests, one candidate per domain appended to the baseline.
//!
//! - [`covering_array`]: randomized greedy 2-coverage. Every pair of candidate
//!   values from two distinct domains appears in at least one test.
//! - [`constrained_covering_array`]: greedy growth of configurations that stay
//!   directionally comparable with the configurations already produced.
//!
//! Both are deterministic for identical inputs. The plain builder draws rows
//! from an explicitly seeded generator; the constrained builder uses no
//! randomness at all.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::assignment::{Assignment, Test};
use crate::effect::{Effect, combine};
use crate::error::{Error, Result};

/// Settings for [`covering_array`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoveringConfig {
    /// Seed of the row sampler. Identical seeds give identical plans.
    pub seed: u64,
    /// Rows sampled per accepted row before giving up.
    pub max_resamples: u64,
}

impl Default for CoveringConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_resamples: 1_000_000,
        }
    }
}

fn check_domains(sizes: &[usize]) -> Result<()> {
    if sizes.is_empty() {
        return Err(Error::NoDomains);
    }
    match sizes.iter().position(|&size| size == 0) {
        Some(index) => Err(Error::EmptyDomain { index }),
        None => Ok(()),
    }
}

/// Number of tests in the full pairwise matrix, `Σ_{i>j} |dom_i|·|dom_j|`.
#[must_use]
pub fn naive_pair_count(sizes: &[usize]) -> usize {
    let mut total = 0;
    for (i, &a) in sizes.iter().enumerate() {
        for &b in &sizes[..i] {
            total += a * b;
        }
    }
    total
}

// =============================================================================
// Plain builder
// =============================================================================

/// Dense numbering of every interaction `(i, j, ii, ji)` with `j < i`.
struct InteractionIndex {
    sizes: Vec<usize>,
    /// `offsets[i][j]` is the id of `(i, j, 0, 0)`.
    offsets: Vec<Vec<usize>>,
    total: usize,
}

impl InteractionIndex {
    fn new(sizes: Vec<usize>) -> Self {
        let mut offsets = Vec::with_capacity(sizes.len());
        let mut total = 0;
        for i in 0..sizes.len() {
            let mut row = Vec::with_capacity(i);
            for j in 0..i {
                row.push(total);
                total += sizes[i] * sizes[j];
            }
            offsets.push(row);
        }
        Self {
            sizes,
            offsets,
            total,
        }
    }

    fn id(&self, i: usize, j: usize, ii: usize, ji: usize) -> usize {
        self.offsets[i][j] + ii * self.sizes[j] + ji
    }

    fn row_ids<'a>(&'a self, row: &'a [usize]) -> impl Iterator<Item = usize> + 'a {
        (1..row.len()).flat_map(move |i| (0..i).map(move |j| self.id(i, j, row[i], row[j])))
    }

    fn coverage(&self, row: &[usize], uncovered: &[bool]) -> usize {
        self.row_ids(row).filter(|&id| uncovered[id]).count()
    }

    /// Mark the row's interactions covered; returns how many were new.
    fn cover(&self, row: &[usize], uncovered: &mut [bool]) -> usize {
        let mut newly = 0;
        for id in self.row_ids(row) {
            if std::mem::replace(&mut uncovered[id], false) {
                newly += 1;
            }
        }
        newly
    }
}

/// Pairwise covering array with a generator seeded from `config.seed`.
pub fn covering_array(
    init: &Test,
    vars: &[Vec<Arc<Assignment>>],
    config: &CoveringConfig,
) -> Result<Vec<Test>> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    covering_array_with_rng(init, vars, &mut rng, config.max_resamples)
}

/// Pairwise covering array drawing rows from `rng`.
///
/// A single domain of size `k` yields exactly `k` tests. Otherwise rows are
/// sampled until one covers at least `ceil(uncovered / v²)` new interactions,
/// `v` being the largest domain size. Such a row always exists, since a
/// uniformly random row covers `uncovered / v²` of them on average.
/// `max_resamples` bounds the attempts per accepted row.
pub fn covering_array_with_rng<R>(
    init: &Test,
    vars: &[Vec<Arc<Assignment>>],
    rng: &mut R,
    max_resamples: u64,
) -> Result<Vec<Test>>
where
    R: Rng + ?Sized,
{
    let sizes: Vec<usize> = vars.iter().map(Vec::len).collect();
    check_domains(&sizes)?;
    tracing::debug!(domains = vars.len(), "building pairwise covering array");

    if let [only] = vars {
        return Ok(only
            .iter()
            .map(|candidate| init.extended([Arc::clone(candidate)]))
            .collect());
    }

    let v = sizes.iter().copied().max().unwrap_or(1);
    let index = InteractionIndex::new(sizes);
    let mut uncovered = vec![true; index.total];
    let mut remaining = index.total;
    tracing::debug!(interactions = remaining, max_domain = v, "enumerated interactions");

    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut row = vec![0; vars.len()];
    while remaining > 0 {
        let expected = remaining.div_ceil(v * v);
        let mut attempts = 0u64;
        loop {
            if attempts >= max_resamples {
                return Err(Error::ResampleLimit {
                    attempts,
                    uncovered: remaining,
                });
            }
            attempts += 1;
            for (slot, domain) in row.iter_mut().zip(vars) {
                *slot = rng.random_range(0..domain.len());
            }
            if index.coverage(&row, &uncovered) >= expected {
                break;
            }
        }
        remaining -= index.cover(&row, &mut uncovered);
        tracing::trace!(row = rows.len(), attempts, expected, remaining, "accepted row");
        rows.push(row.clone());
    }

    let tests: Vec<Test> = rows
        .iter()
        .map(|row| {
            init.extended(
                row.iter()
                    .zip(vars)
                    .map(|(&i, domain)| Arc::clone(&domain[i])),
            )
        })
        .collect();
    tracing::info!(naive = index.total, tests = tests.len(), "size reduction");
    Ok(tests)
}

// =============================================================================
// Constraint-aware builder
// =============================================================================

/// Compatibility predicate between two candidates of one domain.
pub type Compatibility<'a> = Box<dyn Fn(&Assignment, &Assignment) -> Option<Effect> + 'a>;

/// A parameter domain with its compatibility predicate.
pub struct ConstrainedDomain<'a> {
    /// `None` means the two values may never meet in one configuration.
    pub compare: Compatibility<'a>,
    pub values: Vec<Arc<Assignment>>,
}

impl<'a> ConstrainedDomain<'a> {
    pub fn new<F>(compare: F, values: Vec<Arc<Assignment>>) -> Self
    where
        F: Fn(&Assignment, &Assignment) -> Option<Effect> + 'a,
    {
        Self {
            compare: Box::new(compare),
            values,
        }
    }

    /// Every pair of candidates is comparable with no prediction.
    #[must_use]
    pub fn unconstrained(values: Vec<Arc<Assignment>>) -> Self {
        Self::new(|_, _| Some(Effect::Any), values)
    }
}

impl fmt::Debug for ConstrainedDomain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstrainedDomain")
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

/// Chosen candidate index per domain index.
type Configuration = BTreeMap<usize, usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Unused,
    Finished,
}

/// Whether `entries` stay comparable with `reference`: the combined effect of
/// each entry against the reference's value for the same domain must not
/// collapse to `NOT_COMPARABLE`.
fn comparable<I>(vars: &[ConstrainedDomain<'_>], reference: &Configuration, entries: I) -> bool
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let mut acc = Effect::Any;
    for (var, i) in entries {
        let Some(&j) = reference.get(&var) else {
            continue;
        };
        let domain = &vars[var];
        match (domain.compare)(&domain.values[i], &domain.values[j]) {
            None => return false,
            Some(effect) => {
                acc = combine(effect, acc);
                if acc == Effect::NotComparable {
                    return false;
                }
            }
        }
    }
    true
}

/// Finished configurations that stay comparable if `candidate` were merged
/// into `current`.
fn score(
    vars: &[ConstrainedDomain<'_>],
    finished: &[Configuration],
    current: &Configuration,
    candidate: &Configuration,
) -> usize {
    let merged: Vec<(usize, usize)> = current
        .iter()
        .chain(candidate.iter().filter(|(var, _)| !current.contains_key(var)))
        .map(|(&var, &i)| (var, i))
        .collect();
    finished
        .iter()
        .filter(|reference| comparable(vars, reference, merged.iter().copied()))
        .count()
}

fn extends(current: &Configuration, candidate: &Configuration) -> bool {
    candidate.keys().any(|var| !current.contains_key(var))
}

/// The extending candidate with the strictly highest score, scanning unused
/// pairs before finished configurations.
fn best_candidate(
    vars: &[ConstrainedDomain<'_>],
    unused: &[Configuration],
    finished: &[Configuration],
    current: &Configuration,
) -> Option<(Source, usize)> {
    let candidates = unused
        .iter()
        .enumerate()
        .map(|(idx, c)| (Source::Unused, idx, c))
        .chain(
            finished
                .iter()
                .enumerate()
                .map(|(idx, c)| (Source::Finished, idx, c)),
        );
    let mut best: Option<(usize, Source, usize)> = None;
    for (source, idx, candidate) in candidates {
        if !extends(current, candidate) {
            continue;
        }
        let value = score(vars, finished, current, candidate);
        if best.is_none_or(|(top, _, _)| value > top) {
            best = Some((value, source, idx));
        }
    }
    best.map(|(_, source, idx)| (source, idx))
}

fn merge(current: &mut Configuration, candidate: &Configuration) {
    for (&var, &i) in candidate {
        current.entry(var).or_insert(i);
    }
}

/// Covering array whose configurations are grown greedily to stay comparable
/// with the ones already finished.
///
/// Every cross-domain pair of candidates seeds or joins a configuration. The
/// next merge is the candidate (unused pairs first, then finished
/// configurations) keeping the most finished configurations comparable; on
/// ties the first one encountered wins. A single domain of size `k` yields
/// exactly `k` tests.
///
/// `Error::Stalled` guards the growth loop; well-formed domains never
/// produce it.
pub fn constrained_covering_array(init: &Test, vars: &[ConstrainedDomain<'_>]) -> Result<Vec<Test>> {
    let sizes: Vec<usize> = vars.iter().map(|domain| domain.values.len()).collect();
    check_domains(&sizes)?;
    tracing::debug!(domains = vars.len(), "building constrained covering array");

    if let [only] = vars {
        return Ok(only
            .values
            .iter()
            .map(|candidate| init.extended([Arc::clone(candidate)]))
            .collect());
    }

    let mut unused: Vec<Configuration> = Vec::new();
    for (var, domain) in vars.iter().enumerate() {
        for i in 0..domain.values.len() {
            for (var2, domain2) in vars[..var].iter().enumerate() {
                for i2 in 0..domain2.values.len() {
                    unused.push(Configuration::from([(var, i), (var2, i2)]));
                }
            }
        }
    }
    let naive = unused.len();
    tracing::debug!(interactions = naive, "enumerated interactions");

    let mut finished: Vec<Configuration> = Vec::new();
    while let Some(mut current) = unused.pop() {
        while current.len() < vars.len() {
            let best = best_candidate(vars, &unused, &finished, &current);
            debug_assert!(best.is_some(), "no candidate extends an incomplete configuration");
            let Some((source, idx)) = best else {
                return Err(Error::Stalled {
                    remaining: vars.len() - current.len(),
                });
            };
            match source {
                Source::Unused => {
                    let candidate = unused.swap_remove(idx);
                    merge(&mut current, &candidate);
                }
                Source::Finished => merge(&mut current, &finished[idx]),
            }
        }
        tracing::trace!(configuration = finished.len(), unused = unused.len(), "finished configuration");
        finished.push(current);
    }

    let tests: Vec<Test> = finished
        .iter()
        .map(|configuration| {
            init.extended(
                configuration
                    .iter()
                    .map(|(&var, &i)| Arc::clone(&vars[var].values[i])),
            )
        })
        .collect();
    tracing::info!(naive, tests = tests.len(), "size reduction");
    Ok(tests)
}
