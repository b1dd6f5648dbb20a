//! Arena of live actors keyed by stable handles.

use std::collections::BTreeMap;

use progression_core::{ActorAdapter, ActorHandle, ActorProgress, ResourcePool, StatKey};

/// Everything the runtime keeps for one actor.
pub struct ActorRecord {
    pub name: String,
    pub progress: ActorProgress,
    pub adapter: Box<dyn ActorAdapter + Send>,
}

impl std::fmt::Debug for ActorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorRecord")
            .field("name", &self.name)
            .field("progress", &self.progress)
            .finish_non_exhaustive()
    }
}

/// Actor records indexed by [`ActorHandle`].
///
/// Handles are issued from a monotonically increasing counter and are never
/// handed out again after removal, so a stale handle held by a pending job
/// resolves to nothing instead of aliasing a newer actor.
#[derive(Debug, Default)]
pub struct Roster {
    records: BTreeMap<ActorHandle, ActorRecord>,
    next_handle: u64,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        progress: ActorProgress,
        adapter: Box<dyn ActorAdapter + Send>,
    ) -> ActorHandle {
        self.next_handle += 1;
        let handle = ActorHandle(self.next_handle);
        self.records.insert(
            handle,
            ActorRecord {
                name: name.into(),
                progress,
                adapter,
            },
        );
        handle
    }

    pub fn remove(&mut self, handle: ActorHandle) -> Option<ActorRecord> {
        self.records.remove(&handle)
    }

    pub fn get(&self, handle: ActorHandle) -> Option<&ActorRecord> {
        self.records.get(&handle)
    }

    pub fn get_mut(&mut self, handle: ActorHandle) -> Option<&mut ActorRecord> {
        self.records.get_mut(&handle)
    }

    pub fn contains(&self, handle: ActorHandle) -> bool {
        self.records.contains_key(&handle)
    }

    /// Live handles in issue order.
    pub fn handles(&self) -> Vec<ActorHandle> {
        self.records.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActorHandle, &ActorRecord)> {
        self.records.iter().map(|(handle, record)| (*handle, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Host-side mirror of the values the engine writes to an actor.
///
/// Stands in for a world entity: host base values go in through
/// [`StatSheet::with_base`], recomputed stats and the resource pool come out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatSheet {
    base: BTreeMap<StatKey, f64>,
    stats: BTreeMap<StatKey, f64>,
    pool: ResourcePool,
}

impl StatSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(mut self, stat: StatKey, value: f64) -> Self {
        self.base.insert(stat, value);
        self
    }

    /// Last value written for `stat`.
    pub fn stat(&self, stat: StatKey) -> Option<f64> {
        self.stats.get(&stat).copied()
    }

    pub fn pool(&self) -> ResourcePool {
        self.pool
    }
}

impl ActorAdapter for StatSheet {
    fn base_value(&self, stat: StatKey) -> Option<f64> {
        self.base.get(&stat).copied()
    }

    fn write_stat(&mut self, stat: StatKey, value: f64) {
        self.stats.insert(stat, value);
    }

    fn write_resource_pool(&mut self, pool: ResourcePool) {
        self.pool = pool;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use progression_core::{DetachedActor, ProgressionConfig};

    fn progress() -> ActorProgress {
        ActorProgress::new(&ProgressionConfig::default())
    }

    #[test]
    fn handles_are_never_reused() {
        let mut roster = Roster::new();
        let first = roster.insert("a", progress(), Box::new(DetachedActor));
        assert!(roster.remove(first).is_some());
        let second = roster.insert("b", progress(), Box::new(DetachedActor));

        assert_ne!(first, second);
        assert!(roster.get(first).is_none());
        assert_eq!(roster.get(second).map(|r| r.name.as_str()), Some("b"));
    }

    #[test]
    fn stat_sheet_serves_base_values() {
        let mut sheet = StatSheet::new().with_base(StatKey::MoveSpeed, 0.1);
        sheet.write_stat(StatKey::Health, 24.0);

        assert_eq!(sheet.base_value(StatKey::MoveSpeed), Some(0.1));
        assert_eq!(sheet.base_value(StatKey::Armor), None);
        assert_eq!(sheet.stat(StatKey::Health), Some(24.0));
    }
}
