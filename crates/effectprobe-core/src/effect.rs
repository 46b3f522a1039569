//! Effect algebra: composable monotonicity relations.
//!
//! An [`Effect`] names a *set* of allowed orderings between two scalar
//! observations, drawn from `{<, =, >}`. The eight enum values are in
//! bijection with the eight subsets of that three-element set:
//!
//! | Effect           | Orderings   |
//! |------------------|-------------|
//! | `EQUAL`          | `{=}`       |
//! | `NOT_EQUAL`      | `{<, >}`    |
//! | `LESS`           | `{<}`       |
//! | `LESS_EQUAL`     | `{<, =}`    |
//! | `GREATER`        | `{>}`       |
//! | `GREATER_EQUAL`  | `{>, =}`    |
//! | `ANY`            | `{<, =, >}` |
//! | `NOT_COMPARABLE` | `{}`        |
//!
//! [`combine`] intersects two sets, [`reverse`] swaps `<` and `>`. Because
//! every subset maps back to exactly one variant, both operations are total
//! and never lose information. `NOT_COMPARABLE` is an ordinary value meaning
//! "no ordering can satisfy every prediction", not an error.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Expected change of the observed metric when a parameter value increases.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    Equal = 0,
    NotEqual = 1,
    Less = 2,
    LessEqual = 3,
    Greater = 4,
    GreaterEqual = 5,
    #[default]
    Any = 6,
    NotComparable = 7,
}

/// Bitset over `{<, =, >}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OrderingSet(u8);

impl OrderingSet {
    const LESS: u8 = 0b001;
    const EQUAL: u8 = 0b010;
    const GREATER: u8 = 0b100;

    pub const EMPTY: Self = Self(0);
    pub const FULL: Self = Self(Self::LESS | Self::EQUAL | Self::GREATER);

    #[must_use]
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::FULL.0)
    }

    #[must_use]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn contains(self, ordering: Ordering) -> bool {
        self.0 & Self::bit(ordering) != 0
    }

    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Swap `<` and `>`.
    #[must_use]
    pub fn mirrored(self) -> Self {
        let less = self.0 & Self::LESS;
        let greater = self.0 & Self::GREATER;
        Self((self.0 & Self::EQUAL) | (less << 2) | (greater >> 2))
    }

    fn bit(ordering: Ordering) -> u8 {
        match ordering {
            Ordering::Less => Self::LESS,
            Ordering::Equal => Self::EQUAL,
            Ordering::Greater => Self::GREATER,
        }
    }
}

impl fmt::Display for OrderingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = [
            (Ordering::Less, "<"),
            (Ordering::Equal, "="),
            (Ordering::Greater, ">"),
        ]
        .into_iter()
        .filter(|(ordering, _)| self.contains(*ordering))
        .map(|(_, symbol)| symbol)
        .collect();
        write!(f, "{{{}}}", symbols.join(", "))
    }
}

impl Effect {
    /// All effects in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::LessEqual,
        Self::Greater,
        Self::GreaterEqual,
        Self::Any,
        Self::NotComparable,
    ];

    /// The set of orderings this effect allows.
    #[must_use]
    pub fn orderings(self) -> OrderingSet {
        let bits = match self {
            Self::Equal => OrderingSet::EQUAL,
            Self::NotEqual => OrderingSet::LESS | OrderingSet::GREATER,
            Self::Less => OrderingSet::LESS,
            Self::LessEqual => OrderingSet::LESS | OrderingSet::EQUAL,
            Self::Greater => OrderingSet::GREATER,
            Self::GreaterEqual => OrderingSet::GREATER | OrderingSet::EQUAL,
            Self::Any => OrderingSet::FULL.0,
            Self::NotComparable => 0,
        };
        OrderingSet(bits)
    }

    /// The unique effect whose ordering set equals `set`.
    #[must_use]
    pub fn from_orderings(set: OrderingSet) -> Self {
        const LT: u8 = OrderingSet::LESS;
        const EQ: u8 = OrderingSet::EQUAL;
        const GT: u8 = OrderingSet::GREATER;
        match set.bits() {
            EQ => Self::Equal,
            0b101 => Self::NotEqual,
            LT => Self::Less,
            0b011 => Self::LessEqual,
            GT => Self::Greater,
            0b110 => Self::GreaterEqual,
            0b111 => Self::Any,
            _ => Self::NotComparable,
        }
    }

    /// Whether this effect makes a concrete prediction that can be violated.
    #[must_use]
    pub fn is_prediction(self) -> bool {
        !matches!(self, Self::Any | Self::NotComparable)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::NotEqual => "NOT_EQUAL",
            Self::Less => "LESS",
            Self::LessEqual => "LESS_EQUAL",
            Self::Greater => "GREATER",
            Self::GreaterEqual => "GREATER_EQUAL",
            Self::Any => "ANY",
            Self::NotComparable => "NOT_COMPARABLE",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Effect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|effect| effect.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown effect: {s}. Expected one of: {}",
                    Self::ALL.map(Self::as_str).join(", ")
                )
            })
    }
}

/// Reconcile two independent predictions about the same pair of outcomes.
///
/// Set intersection: commutative, associative, idempotent, `ANY` is the
/// identity and `NOT_COMPARABLE` absorbs.
#[must_use]
pub fn combine(a: Effect, b: Effect) -> Effect {
    Effect::from_orderings(a.orderings().intersect(b.orderings()))
}

/// Fold [`combine`] over a sequence, stopping at the first contradiction.
pub fn combine_all<I>(effects: I) -> Effect
where
    I: IntoIterator<Item = Effect>,
{
    let mut acc = Effect::Any;
    for effect in effects {
        acc = combine(acc, effect);
        if acc == Effect::NotComparable {
            break;
        }
    }
    acc
}

/// Swap `<` and `>` in the ordering set. An involution.
#[must_use]
pub fn reverse(effect: Effect) -> Effect {
    Effect::from_orderings(effect.orderings().mirrored())
}

/// Turn a declared "value increases" effect into a prediction for a concrete
/// pair of parameter values.
///
/// Returns `selected` when `new_val > old_val`, `ANY` when they are equal and
/// the reversed effect otherwise. Unordered values (NaN) take the reversed
/// branch.
pub fn directional_effect<T>(selected: Effect, new_val: &T, old_val: &T) -> Effect
where
    T: PartialOrd + ?Sized,
{
    if new_val > old_val {
        selected
    } else if new_val == old_val {
        Effect::Any
    } else {
        reverse(selected)
    }
}

/// Whether the concrete pair `(a, b)` satisfies `effect`.
pub fn comparator<A, B>(effect: Effect, a: &A, b: &B) -> bool
where
    A: PartialOrd<B> + ?Sized,
    B: ?Sized,
{
    match effect {
        Effect::NotComparable => false,
        Effect::Any => true,
        Effect::NotEqual => a != b,
        Effect::Equal => a == b,
        Effect::Less => a < b,
        Effect::LessEqual => a <= b,
        Effect::Greater => a > b,
        Effect::GreaterEqual => a >= b,
    }
}
