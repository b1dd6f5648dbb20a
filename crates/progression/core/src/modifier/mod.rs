//! Additive / multiplicative modifier stack.
//!
//! Every derived value in the engine (attribute totals, stat scaling, resource
//! pool sizes) goes through the same resolution order:
//!
//! ```text
//! base ─► + ADD (insertion order) ─► × Π(1 + MULTIPLY_PERCENTAGE) ─► clamp[min, max]
//! ```
//!
//! The order is load-bearing: additions are summed first and the combined
//! multiplier applies to the whole running total, so a `+10` next to a `+50%`
//! always yields `(base + 10) × 1.5` regardless of which was inserted first.
//!
//! `MULTIPLY_PERCENTAGE` magnitudes are fractions added to a neutral factor of
//! one: `0.25` means ×1.25, `-0.5` means ×0.5.

mod bounds;
mod stack;

pub use bounds::StatBounds;
pub use stack::ModifierStack;

use crate::state::SourceId;

/// Identity of a modifier inside the stack that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierId(pub u64);

/// How a modifier combines with the running total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ModifierOp {
    /// Added to the running total before any multiplication.
    Add,
    /// Contributes a factor of `1 + magnitude` to the combined multiplier.
    MultiplyPercentage,
}

impl ModifierOp {
    /// Folds one modifier into the accumulator.
    ///
    /// This is the only place operation kinds are interpreted.
    fn fold(self, acc: &mut Fold, magnitude: f64) {
        match self {
            ModifierOp::Add => acc.sum += magnitude,
            ModifierOp::MultiplyPercentage => acc.factor *= 1.0 + magnitude,
        }
    }
}

/// Running state of a resolution.
#[derive(Clone, Copy, Debug)]
struct Fold {
    sum: f64,
    factor: f64,
}

impl Fold {
    fn new(base: f64) -> Self {
        Self {
            sum: base,
            factor: 1.0,
        }
    }

    fn finish(self, bounds: StatBounds) -> f64 {
        bounds.clamp(self.sum * self.factor)
    }
}

/// Parameters of a modifier before it is inserted.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierSpec {
    pub op: ModifierOp,
    pub magnitude: f64,
    /// Persistent modifiers survive [`ModifierStack::remove_non_persistent`].
    pub persistent: bool,
    pub source: Option<SourceId>,
}

impl ModifierSpec {
    /// Additive, non-persistent modifier.
    pub fn add(magnitude: f64) -> Self {
        Self {
            op: ModifierOp::Add,
            magnitude,
            persistent: false,
            source: None,
        }
    }

    /// Multiplicative, non-persistent modifier (`0.2` = +20%).
    pub fn multiply(magnitude: f64) -> Self {
        Self {
            op: ModifierOp::MultiplyPercentage,
            magnitude,
            persistent: false,
            source: None,
        }
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    pub fn from_source(mut self, source: impl Into<SourceId>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A modifier held by a [`ModifierStack`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier<K> {
    pub id: ModifierId,
    pub subject: K,
    pub op: ModifierOp,
    pub magnitude: f64,
    pub persistent: bool,
    pub source: Option<SourceId>,
}
