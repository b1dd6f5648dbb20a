//! Engine configuration loader.

use std::path::Path;

use progression_core::ProgressionConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`ProgressionConfig`] from TOML files.
///
/// Missing keys keep their defaults, so a partial file only overrides what it
/// names.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load(path: &Path) -> LoadResult<ProgressionConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML at {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<ProgressionConfig> {
        let config: ProgressionConfig = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::parse("throttle_ticks = 5\nmana_enabled = false\n");

        assert!(config.is_ok(), "{config:?}");
        let config = config.unwrap_or_default();
        assert_eq!(config.throttle_ticks, 5);
        assert!(!config.mana_enabled);
        assert_eq!(config.regen_interval_ticks, ProgressionConfig::DEFAULT_REGEN_INTERVAL_TICKS);
    }

    #[test]
    fn missing_file_names_the_path() {
        let result = ConfigLoader::load(Path::new("/nonexistent/progression.toml"));

        let message = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(message.contains("/nonexistent/progression.toml"));
    }
}
