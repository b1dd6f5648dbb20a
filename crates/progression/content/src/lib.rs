//! Data-driven progression content and loaders.
//!
//! This crate houses the definition tables the engine consults through its
//! oracle traits and the loaders that read them from disk:
//! - Attribute cost tables and stat scaling (RON)
//! - Skill definitions with per-level values and requirements (RON)
//! - Class definitions and group settings (RON)
//! - Engine tunables (TOML)
//!
//! A default data set is embedded at compile time so hosts can run without a
//! data directory. Content is read-only at runtime and never appears in an
//! actor's progression state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AttributeCatalog, AttributeLoader, ClassCatalog, ClassLoader, ConfigLoader, ContentBundle,
    ContentFactory, SkillCatalog, SkillLoader,
};
