//! Repository contract for saving and loading actor progress.

use progression_core::ProgressSnapshot;

use super::{RepositoryError, Result};

/// Repository for progress snapshots keyed by profile name.
pub trait SnapshotRepository: Send + Sync {
    /// Save a snapshot, replacing any previous one under `key`
    fn save(&self, key: &str, snapshot: &ProgressSnapshot) -> Result<()>;

    /// Load a snapshot by key
    fn load(&self, key: &str) -> Result<Option<ProgressSnapshot>>;

    /// Check if a snapshot exists
    fn exists(&self, key: &str) -> bool;

    /// Delete a snapshot; deleting a missing key is not an error
    fn delete(&self, key: &str) -> Result<()>;

    /// List all stored keys in ascending order
    fn list_keys(&self) -> Result<Vec<String>> {
        Ok(vec![])
    }
}

/// Keys double as file names, so only ASCII alphanumerics, `-` and `_` are
/// accepted.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RepositoryError::InvalidKey(key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_reject_path_components() {
        assert!(validate_key("hero_01").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("../hero").is_err());
        assert!(validate_key("a/b").is_err());
    }
}
