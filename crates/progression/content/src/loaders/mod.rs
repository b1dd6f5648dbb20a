//! Content loaders for reading progression data from files.
//!
//! Each loader parses one file format into `progression-core` definition
//! types; [`ContentFactory`] ties them to a data directory and
//! [`ContentBundle`] holds the result.

pub mod attributes;
pub mod bundle;
pub mod classes;
pub mod config;
pub mod factory;
pub mod skills;

pub use attributes::{AttributeCatalog, AttributeLoader};
pub use bundle::ContentBundle;
pub use classes::{ClassCatalog, ClassLoader};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use skills::{SkillCatalog, SkillLoader};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
