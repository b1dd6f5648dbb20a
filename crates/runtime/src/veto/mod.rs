//! Veto policies consulted before the engine commits a tentative mutation.
//!
//! The engine asks a single [`progression_core::CommitHook`]; the runtime
//! answers with a [`VetoRegistry`] that fans the question out to every
//! registered [`VetoPolicy`].
//!
//! # Execution Order
//!
//! Policies are sorted by priority (lower values run first). Evaluation stops
//! at the first denial, so a cheap blanket policy should carry a lower
//! priority than an expensive one.

mod policies;
mod registry;

pub use policies::{SkillLock, VetoFn};
pub use registry::VetoRegistry;

use progression_core::{Transaction, Verdict};

/// External rule that may deny a tentative mutation.
pub trait VetoPolicy: Send + Sync {
    /// Returns a human-readable name for this policy (used in logging).
    fn name(&self) -> &'static str;

    /// Returns the evaluation priority.
    ///
    /// Default is 0. Lower values run first.
    fn priority(&self) -> i32 {
        0
    }

    fn evaluate(&self, transaction: &Transaction) -> Verdict;
}
