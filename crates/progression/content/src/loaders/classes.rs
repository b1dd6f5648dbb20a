//! Class and group settings loader.

use std::path::Path;

use progression_core::{ClassDefinition, GroupSettings};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Class table structure for RON files.
///
/// Groups without an entry in `groups` use [`GroupSettings`] defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassCatalog {
    #[serde(default)]
    pub groups: Vec<GroupSettings>,
    pub classes: Vec<ClassDefinition>,
}

/// Loader for class definitions from RON files.
pub struct ClassLoader;

impl ClassLoader {
    pub fn load(path: &Path) -> LoadResult<ClassCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse class table at {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<ClassCatalog> {
        let catalog: ClassCatalog = ron::from_str(content)?;
        for class in &catalog.classes {
            anyhow::ensure!(class.max_level > 0, "class '{}' must have max_level > 0", class.id);
            if let Some(parent) = &class.parent {
                let parent_group = catalog
                    .classes
                    .iter()
                    .find(|candidate| &candidate.id == parent)
                    .map(|candidate| &candidate.group);
                anyhow::ensure!(
                    parent_group == Some(&class.group),
                    "class '{}' names parent '{}' outside its group",
                    class.id,
                    parent
                );
            }
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_groups_and_parent_links() {
        let content = r#"(
            groups: [(group: "class", starting_points: 3, profess_reset: true)],
            classes: [
                (id: "mage", name: "Mage", group: "class", max_level: 10,
                 exp_curve: (base: 100.0, scale: 25.0)),
                (id: "wizard", name: "Wizard", group: "class", parent: Some("mage"),
                 max_level: 20, exp_curve: (base: 300.0, scale: 50.0)),
            ],
        )"#;

        let catalog = ClassLoader::parse(content);
        assert!(catalog.is_ok(), "{catalog:?}");
        let catalog = catalog.unwrap_or_default();
        assert_eq!(catalog.groups[0].starting_points, 3);
        assert_eq!(catalog.groups[0].starting_attribute_points, 1);
        assert!(catalog.groups[0].profess_reset);
        assert_eq!(catalog.classes[1].parent.as_ref().map(|p| p.as_str()), Some("mage"));
        assert_eq!(catalog.classes[0].required_exp(2), 150.0);
    }

    #[test]
    fn parent_in_another_group_is_rejected() {
        let content = r#"(
            classes: [
                (id: "mage", name: "Mage", group: "class", max_level: 10,
                 exp_curve: (base: 100.0, scale: 0.0)),
                (id: "smith", name: "Smith", group: "craft", parent: Some("mage"),
                 max_level: 10, exp_curve: (base: 100.0, scale: 0.0)),
            ],
        )"#;

        assert!(ClassLoader::parse(content).is_err());
    }
}
