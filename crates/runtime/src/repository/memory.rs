//! In-memory SnapshotRepository implementation for tests and local runs.

use std::collections::BTreeMap;
use std::sync::RwLock;

use progression_core::ProgressSnapshot;

use super::{RepositoryError, Result, SnapshotRepository, validate_key};

/// In-memory implementation of SnapshotRepository.
#[derive(Debug, Default)]
pub struct InMemorySnapshotRepository {
    snapshots: RwLock<BTreeMap<String, ProgressSnapshot>>,
}

impl InMemorySnapshotRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotRepository for InMemorySnapshotRepository {
    fn save(&self, key: &str, snapshot: &ProgressSnapshot) -> Result<()> {
        validate_key(key)?;
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        snapshots.insert(key.to_owned(), snapshot.clone());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<ProgressSnapshot>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshots.get(key).cloned())
    }

    fn exists(&self, key: &str) -> bool {
        self.snapshots
            .read()
            .map(|snapshots| snapshots.contains_key(key))
            .unwrap_or(false)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        snapshots.remove(key);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>> {
        let snapshots = self
            .snapshots
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(snapshots.keys().cloned().collect())
    }
}
