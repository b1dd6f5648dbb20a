//! File-based SnapshotRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use progression_core::ProgressSnapshot;

use super::{RepositoryError, Result, SnapshotRepository, validate_key};

/// File-based implementation of SnapshotRepository.
///
/// # File Format
///
/// Snapshots are stored as `{key}.json` (pretty-printed JSON) so saves stay
/// readable and diffable. Writes go to a temp file first and are renamed into
/// place, so a crash mid-save never leaves a truncated snapshot behind.
pub struct FileSnapshotRepository {
    base_dir: PathBuf,
}

impl FileSnapshotRepository {
    /// Create a new file-based snapshot repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to a snapshot file.
    fn snapshot_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }
}

impl SnapshotRepository for FileSnapshotRepository {
    fn save(&self, key: &str, snapshot: &ProgressSnapshot) -> Result<()> {
        validate_key(key)?;
        let path = self.snapshot_path(key);
        let temp_path = path.with_extension("json.tmp");

        let json = serde_json::to_string_pretty(snapshot)?;

        // Write to temp file
        fs::write(&temp_path, json)?;

        // Atomic rename
        fs::rename(&temp_path, &path)?;

        tracing::debug!("Saved snapshot[{}] to {}", key, path.display());

        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<ProgressSnapshot>> {
        validate_key(key)?;
        let path = self.snapshot_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)?;
        let snapshot: ProgressSnapshot = serde_json::from_str(&json)?;

        tracing::debug!("Loaded snapshot[{}] from {}", key, path.display());

        Ok(Some(snapshot))
    }

    fn exists(&self, key: &str) -> bool {
        validate_key(key).is_ok() && self.snapshot_path(key).exists()
    }

    fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let path = self.snapshot_path(key);

        if path.exists() {
            fs::remove_file(&path).map_err(RepositoryError::Io)?;
            tracing::debug!("Deleted snapshot[{}]", key);
        }

        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(key) = filename.strip_suffix(".json")
                && validate_key(key).is_ok()
            {
                keys.push(key.to_owned());
            }
        }

        keys.sort_unstable();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progression_core::{ClassState, SkillSnapshot};

    fn sample() -> ProgressSnapshot {
        let mut snapshot = ProgressSnapshot {
            attribute_points: 2,
            mana: 37.5,
            hunger: 0.25,
            ..ProgressSnapshot::default()
        };
        snapshot
            .classes
            .insert("class".into(), ClassState::new("mage".into(), 3));
        snapshot.skills.insert(
            "fireball".into(),
            SkillSnapshot {
                level: 2,
                invested_cost: 3,
                cooldown_remaining: 40,
            },
        );
        snapshot
    }

    #[test]
    fn snapshots_survive_a_reopen() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let Ok(repo) = FileSnapshotRepository::new(dir.path()) else {
            panic!("repository");
        };
        assert!(repo.save("hero", &sample()).is_ok());

        let Ok(reopened) = FileSnapshotRepository::new(dir.path()) else {
            panic!("repository");
        };
        assert!(reopened.exists("hero"));
        assert_eq!(reopened.load("hero").ok().flatten(), Some(sample()));
        assert_eq!(reopened.list_keys().ok(), Some(vec!["hero".to_owned()]));
    }

    #[test]
    fn missing_snapshot_loads_as_none() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let Ok(repo) = FileSnapshotRepository::new(dir.path()) else {
            panic!("repository");
        };

        assert!(matches!(repo.load("nobody"), Ok(None)));
        assert!(repo.delete("nobody").is_ok());
    }

    #[test]
    fn corrupted_file_is_a_serialization_error() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let Ok(repo) = FileSnapshotRepository::new(dir.path()) else {
            panic!("repository");
        };
        assert!(fs::write(dir.path().join("hero.json"), "{ not json").is_ok());

        assert!(matches!(repo.load("hero"), Err(RepositoryError::Serialization(_))));
    }
}
