//! Traits describing read-only definition tables.
//!
//! Oracles expose attribute cost tables, skill definitions and class
//! definitions. The [`ProgressionEnv`] aggregate bundles them with the
//! [`ProgressionConfig`] so the engine can reach everything it needs without
//! coupling to a concrete content source.
mod attributes;
mod classes;
mod requirement;
mod scaled;
mod skills;

pub use attributes::{AttributeDefinition, AttributeOracle, StatScaling};
pub use classes::{ClassDefinition, ClassOracle, GroupSettings};
pub use requirement::{ProgressionView, Requirement};
pub use scaled::ScaledValue;
pub use skills::{SkillDefinition, SkillOracle};

use crate::config::ProgressionConfig;

/// Aggregates the read-only oracles required by the engine.
#[derive(Clone, Copy)]
pub struct ProgressionEnv<'a> {
    pub attributes: &'a dyn AttributeOracle,
    pub skills: &'a dyn SkillOracle,
    pub classes: &'a dyn ClassOracle,
    pub config: &'a ProgressionConfig,
}

impl<'a> ProgressionEnv<'a> {
    pub fn new(
        attributes: &'a dyn AttributeOracle,
        skills: &'a dyn SkillOracle,
        classes: &'a dyn ClassOracle,
        config: &'a ProgressionConfig,
    ) -> Self {
        Self {
            attributes,
            skills,
            classes,
            config,
        }
    }

    /// Uses one value for every oracle, typically a content table bundle.
    pub fn from_tables<T>(tables: &'a T, config: &'a ProgressionConfig) -> Self
    where
        T: AttributeOracle + SkillOracle + ClassOracle,
    {
        Self::new(tables, tables, tables, config)
    }
}

impl std::fmt::Debug for ProgressionEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionEnv")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
