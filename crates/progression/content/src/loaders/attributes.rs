//! Attribute table loader.

use std::path::Path;

use progression_core::AttributeDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Attribute table structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeCatalog {
    pub attributes: Vec<AttributeDefinition>,
}

/// Loader for attribute tables from RON files.
pub struct AttributeLoader;

impl AttributeLoader {
    /// Load attribute definitions from a RON file, in file order.
    pub fn load(path: &Path) -> LoadResult<Vec<AttributeDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse attribute table at {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<Vec<AttributeDefinition>> {
        let catalog: AttributeCatalog = ron::from_str(content)?;
        for def in &catalog.attributes {
            anyhow::ensure!(
                def.max_stage >= 0,
                "attribute '{}' has a negative max_stage",
                def.key
            );
        }
        Ok(catalog.attributes)
    }
}
