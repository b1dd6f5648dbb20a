//! Skill table loader.

use std::path::Path;

use progression_core::SkillDefinition;
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Skill table structure for RON files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillCatalog {
    pub skills: Vec<SkillDefinition>,
}

/// Loader for skill definitions from RON files.
pub struct SkillLoader;

impl SkillLoader {
    pub fn load(path: &Path) -> LoadResult<Vec<SkillDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse skill table at {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<Vec<SkillDefinition>> {
        let catalog: SkillCatalog = ron::from_str(content)?;
        for def in &catalog.skills {
            anyhow::ensure!(def.max_level > 0, "skill '{}' must have max_level > 0", def.key);
        }
        Ok(catalog.skills)
    }
}
