//! Content factory for building definition tables from a data directory.

use std::path::{Path, PathBuf};

use progression_core::{AttributeDefinition, ProgressionConfig, SkillDefinition};
use tracing::debug;

use crate::loaders::{
    AttributeLoader, ClassCatalog, ClassLoader, ConfigLoader, ContentBundle, LoadResult, SkillLoader,
};

/// Content factory that loads all progression content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml      (optional, defaults when absent)
/// ├── attributes.ron
/// ├── skills.ron
/// └── classes.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`, or defaults when the
    /// file does not exist.
    pub fn load_config(&self) -> LoadResult<ProgressionConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ProgressionConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load attribute definitions from `attributes.ron`.
    pub fn load_attributes(&self) -> LoadResult<Vec<AttributeDefinition>> {
        AttributeLoader::load(&self.data_dir.join("attributes.ron"))
    }

    /// Load skill definitions from `skills.ron`.
    pub fn load_skills(&self) -> LoadResult<Vec<SkillDefinition>> {
        SkillLoader::load(&self.data_dir.join("skills.ron"))
    }

    /// Load classes and group settings from `classes.ron`.
    pub fn load_classes(&self) -> LoadResult<ClassCatalog> {
        ClassLoader::load(&self.data_dir.join("classes.ron"))
    }

    /// Load every table and validate cross references.
    pub fn load_bundle(&self) -> LoadResult<ContentBundle> {
        let bundle = ContentBundle::new(
            self.load_config()?,
            self.load_attributes()?,
            self.load_skills()?,
            self.load_classes()?,
        )?;
        debug!(data_dir = %self.data_dir.display(), "content loaded");
        Ok(bundle)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progression_core::{ClassOracle, SkillOracle};

    fn write(dir: &Path, name: &str, content: &str) {
        let written = std::fs::write(dir.join(name), content);
        assert!(written.is_ok(), "{written:?}");
    }

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn loads_a_directory_without_config() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        write(dir.path(), "attributes.ron", "(attributes: [])");
        write(
            dir.path(),
            "skills.ron",
            r#"(skills: [(key: "heal", name: "Heal", max_level: 3, cost: (base: 1.0, scale: 0.0))])"#,
        );
        write(
            dir.path(),
            "classes.ron",
            r#"(classes: [(id: "cleric", name: "Cleric", group: "class", max_level: 5,
                exp_curve: (base: 50.0, scale: 0.0), skills: ["heal"])])"#,
        );

        let bundle = ContentFactory::new(dir.path()).load_bundle();

        assert!(bundle.is_ok(), "{bundle:?}");
        let bundle = bundle.unwrap_or_default();
        assert_eq!(bundle.config(), &ProgressionConfig::default());
        assert!(bundle.skill(&"heal".into()).is_some());
        assert!(bundle.class(&"cleric".into()).is_some());
    }

    #[test]
    fn missing_table_is_an_error() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };

        assert!(ContentFactory::new(dir.path()).load_bundle().is_err());
    }
}
