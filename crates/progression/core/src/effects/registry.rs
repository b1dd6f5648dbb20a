use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::{EffectError, EffectSpec, EffectSubject, EffectTaskId, ModifierHost, ScheduledEffect};
use crate::env::AttributeOracle;
use crate::modifier::ModifierSpec;
use crate::schedule::{DeferredJob, DeferredTasks};
use crate::state::ActorHandle;

/// Registry of running timed effects, keyed by `(source, target, subject)`.
///
/// The subject (the stat or attribute a modifier adjusts) is part of the key
/// so one source can keep separate effects on different subjects of the same
/// target: a health buff and an armor buff from one caster coexist, while
/// re-applying the health buff replaces only the health one. With a single
/// subject per source this is exactly the `(source, target)` pairing.
///
/// Non-stackable effects replace the running task for their key; stackable
/// ones install alongside. Modifiers installed here are tagged with the source
/// actor and marked persistent, so only the registry revokes them.
#[derive(Clone, Debug, Default)]
pub struct TimedEffectRegistry {
    tasks: BTreeMap<EffectTaskId, ScheduledEffect>,
    next_id: u64,
}

impl TimedEffectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a timed modifier from `source` on `target`.
    ///
    /// `duration` of `None` or a negative value makes the effect permanent
    /// until stopped.
    #[allow(clippy::too_many_arguments)]
    pub fn apply(
        &mut self,
        host: &mut dyn ModifierHost,
        tasks: &mut dyn DeferredTasks,
        attributes: &dyn AttributeOracle,
        source: ActorHandle,
        target: ActorHandle,
        spec: EffectSpec,
        duration: Option<i64>,
        stackable: bool,
    ) -> Result<EffectTaskId, EffectError> {
        if let EffectSubject::Attribute(key) = &spec.subject {
            if attributes.attribute(key).is_none() {
                return Err(EffectError::UnknownAttribute(key.clone()));
            }
        }
        if host.modifiers_mut(target).is_none() {
            return Err(EffectError::UnknownTarget(target));
        }

        if !stackable {
            let replaced: Vec<_> = self
                .tasks
                .values()
                .filter(|task| task.source == source && task.target == target && task.subject == spec.subject)
                .map(|task| task.id)
                .collect();
            for id in replaced {
                self.finish(id, host, Some(&mut *tasks));
            }
        }

        let modifier_spec = ModifierSpec {
            op: spec.op,
            magnitude: spec.magnitude,
            persistent: true,
            source: Some(source.into()),
        };
        let modifier = match host.modifiers_mut(target) {
            Some(modifiers) => match &spec.subject {
                EffectSubject::Attribute(key) => modifiers.add_attribute(key.clone(), modifier_spec),
                EffectSubject::Stat(stat) => modifiers.add_stat(*stat, modifier_spec),
            },
            None => return Err(EffectError::UnknownTarget(target)),
        };

        self.next_id += 1;
        let id = EffectTaskId(self.next_id);
        let (timer, expires_at) = match duration {
            Some(ticks) if ticks >= 0 => {
                let ticks = ticks as u64;
                let handle = tasks.schedule(ticks, DeferredJob::ExpireEffect(id));
                (Some(handle), Some(tasks.now() + ticks.max(1)))
            }
            _ => (None, None),
        };

        debug!(
            effect = %id,
            source = %source,
            target = %target,
            subject = ?spec.subject,
            ?expires_at,
            stackable,
            "timed effect applied"
        );
        self.tasks.insert(
            id,
            ScheduledEffect {
                id,
                source,
                target,
                subject: spec.subject,
                modifier,
                stackable,
                timer,
                expires_at,
            },
        );
        host.modifiers_changed(target);
        Ok(id)
    }

    /// Stops a task, cancelling its timer and revoking its modifier.
    ///
    /// Returns `false` when the task is already gone.
    pub fn stop(
        &mut self,
        id: EffectTaskId,
        host: &mut dyn ModifierHost,
        tasks: &mut dyn DeferredTasks,
    ) -> bool {
        match self.finish(id, host, Some(tasks)) {
            Some(target) => {
                host.modifiers_changed(target);
                true
            }
            None => false,
        }
    }

    /// Ends a task whose timer fired. The timer is not cancelled.
    pub fn expire(&mut self, id: EffectTaskId, host: &mut dyn ModifierHost) -> bool {
        match self.finish(id, host, None) {
            Some(target) => {
                debug!(effect = %id, target = %target, "timed effect expired");
                host.modifiers_changed(target);
                true
            }
            None => false,
        }
    }

    /// Stops every task owned by `source`. Must run before the source's own
    /// records are torn down.
    pub fn cleanup(
        &mut self,
        source: ActorHandle,
        host: &mut dyn ModifierHost,
        tasks: &mut dyn DeferredTasks,
    ) -> usize {
        self.stop_matching(|task| task.source == source, host, tasks)
    }

    /// Stops every task targeting `target`.
    pub fn cleanup_target(
        &mut self,
        target: ActorHandle,
        host: &mut dyn ModifierHost,
        tasks: &mut dyn DeferredTasks,
    ) -> usize {
        self.stop_matching(|task| task.target == target, host, tasks)
    }

    pub fn get(&self, id: EffectTaskId) -> Option<&ScheduledEffect> {
        self.tasks.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledEffect> {
        self.tasks.values()
    }

    /// Running tasks from `source` on `target`.
    pub fn active_for(
        &self,
        source: ActorHandle,
        target: ActorHandle,
    ) -> impl Iterator<Item = &ScheduledEffect> {
        self.tasks
            .values()
            .filter(move |task| task.source == source && task.target == target)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn stop_matching(
        &mut self,
        matches: impl Fn(&ScheduledEffect) -> bool,
        host: &mut dyn ModifierHost,
        tasks: &mut dyn DeferredTasks,
    ) -> usize {
        let ids: Vec<_> = self
            .tasks
            .values()
            .filter(|task| matches(task))
            .map(|task| task.id)
            .collect();

        let mut touched = BTreeSet::new();
        for id in &ids {
            if let Some(target) = self.finish(*id, host, Some(&mut *tasks)) {
                touched.insert(target);
            }
        }
        for target in touched {
            host.modifiers_changed(target);
        }
        ids.len()
    }

    /// Removes the task, cancels its timer if asked, and revokes its modifier.
    /// Returns the target when a task was removed.
    fn finish(
        &mut self,
        id: EffectTaskId,
        host: &mut dyn ModifierHost,
        tasks: Option<&mut dyn DeferredTasks>,
    ) -> Option<ActorHandle> {
        let task = self.tasks.remove(&id)?;
        if let (Some(timer), Some(tasks)) = (task.timer, tasks) {
            tasks.cancel(timer);
        }
        if let Some(modifiers) = host.modifiers_mut(task.target) {
            modifiers.remove(task.modifier);
        }
        Some(task.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::AttributeDefinition;
    use crate::modifier::{ModifierOp, StatBounds};
    use crate::schedule::TickScheduler;
    use crate::state::{ActorModifiers, AttributeKey, Tick};
    use crate::stats::StatKey;
    use crate::testing::TestTables;

    const CASTER: ActorHandle = ActorHandle(1);
    const TARGET: ActorHandle = ActorHandle(2);

    #[derive(Default)]
    struct Host {
        actors: BTreeMap<ActorHandle, ActorModifiers>,
        changed: Vec<ActorHandle>,
    }

    impl Host {
        fn with_actors(handles: &[ActorHandle]) -> Self {
            Self {
                actors: handles.iter().map(|h| (*h, ActorModifiers::default())).collect(),
                changed: Vec::new(),
            }
        }

        fn armor(&self, actor: ActorHandle) -> f64 {
            self.actors[&actor].stats.resolve(&StatKey::Armor, 0.0, StatBounds::UNCLAMPED)
        }
    }

    impl ModifierHost for Host {
        fn modifiers_mut(&mut self, actor: ActorHandle) -> Option<&mut ActorModifiers> {
            self.actors.get_mut(&actor)
        }

        fn modifiers_changed(&mut self, actor: ActorHandle) {
            self.changed.push(actor);
        }
    }

    fn armor(magnitude: f64) -> EffectSpec {
        EffectSpec::stat(StatKey::Armor, ModifierOp::Add, magnitude)
    }

    fn tables() -> TestTables {
        TestTables::default().with_attribute(AttributeDefinition::new("strength", 1, 0.0, 5))
    }

    #[test]
    fn non_stackable_replaces_the_running_task() {
        let mut registry = TimedEffectRegistry::new();
        let mut host = Host::with_actors(&[CASTER, TARGET]);
        let mut tasks = TickScheduler::new();
        let tables = tables();

        let first = registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, armor(5.0), Some(100), false);
        let second = registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, armor(7.0), Some(100), false);

        assert!(first.is_ok() && second.is_ok());
        assert_eq!(registry.active_for(CASTER, TARGET).count(), 1);
        assert_eq!(host.actors[&TARGET].stats.len(), 1);
        assert_eq!(host.armor(TARGET), 7.0);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn one_source_keeps_one_effect_per_subject() {
        let mut registry = TimedEffectRegistry::new();
        let mut host = Host::with_actors(&[TARGET]);
        let mut tasks = TickScheduler::new();
        let tables = tables();
        let health = EffectSpec::stat(StatKey::Health, ModifierOp::Add, 4.0);

        assert!(registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, armor(5.0), None, false).is_ok());
        assert!(registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, health, None, false).is_ok());
        assert!(registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, armor(3.0), None, false).is_ok());

        assert_eq!(registry.active_for(CASTER, TARGET).count(), 2);
        assert_eq!(host.armor(TARGET), 3.0);
        assert_eq!(host.actors[&TARGET].stats.len(), 2);
    }

    #[test]
    fn effect_modifiers_survive_a_non_persistent_clear() {
        let mut registry = TimedEffectRegistry::new();
        let mut host = Host::with_actors(&[TARGET]);
        let mut tasks = TickScheduler::new();
        let tables = tables();
        let Ok(id) = registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, armor(5.0), Some(10), false) else {
            panic!("apply failed");
        };

        let cleared = host.actors.get_mut(&TARGET).map(ActorModifiers::clear_non_persistent);

        assert_eq!(cleared, Some(0));
        assert_eq!(host.armor(TARGET), 5.0);
        assert!(registry.stop(id, &mut host, &mut tasks));
        assert_eq!(host.armor(TARGET), 0.0);
    }

    #[test]
    fn stackable_effects_install_alongside() {
        let mut registry = TimedEffectRegistry::new();
        let mut host = Host::with_actors(&[TARGET]);
        let mut tasks = TickScheduler::new();
        let tables = tables();

        for _ in 0..3 {
            assert!(registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, armor(2.0), None, true).is_ok());
        }
        assert_eq!(host.armor(TARGET), 6.0);
        assert_eq!(registry.cleanup(CASTER, &mut host, &mut tasks), 3);
        assert_eq!(host.armor(TARGET), 0.0);
    }

    #[test]
    fn expiry_restores_the_baseline() {
        let mut registry = TimedEffectRegistry::new();
        let mut host = Host::with_actors(&[TARGET]);
        let mut tasks = TickScheduler::new();
        let tables = tables();

        let Ok(id) = registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, armor(5.0), Some(10), false) else {
            panic!("apply failed");
        };
        assert_eq!(host.armor(TARGET), 5.0);
        assert_eq!(tasks.pop_due(Tick(9)), None);

        let due = tasks.pop_due(Tick(10));
        assert_eq!(due.map(|d| d.job), Some(DeferredJob::ExpireEffect(id)));
        assert!(registry.expire(id, &mut host));
        assert_eq!(host.armor(TARGET), 0.0);
        assert!(registry.is_empty());
    }

    #[test]
    fn stop_is_idempotent() {
        let mut registry = TimedEffectRegistry::new();
        let mut host = Host::with_actors(&[TARGET]);
        let mut tasks = TickScheduler::new();
        let tables = tables();

        let Ok(id) = registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, armor(5.0), Some(10), false) else {
            panic!("apply failed");
        };
        assert!(registry.stop(id, &mut host, &mut tasks));
        assert!(!registry.stop(id, &mut host, &mut tasks));
        assert!(!registry.expire(id, &mut host));
        assert!(tasks.is_empty());
        assert_eq!(host.armor(TARGET), 0.0);
    }

    #[test]
    fn negative_duration_is_permanent() {
        let mut registry = TimedEffectRegistry::new();
        let mut host = Host::with_actors(&[TARGET]);
        let mut tasks = TickScheduler::new();
        let tables = tables();

        let Ok(id) = registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, armor(1.0), Some(-1), false) else {
            panic!("apply failed");
        };
        assert!(tasks.is_empty());
        assert_eq!(registry.get(id).and_then(|t| t.expires_at), None);
    }

    #[test]
    fn cleanup_target_revokes_foreign_effects() {
        let mut registry = TimedEffectRegistry::new();
        let mut host = Host::with_actors(&[CASTER, TARGET]);
        let mut tasks = TickScheduler::new();
        let tables = tables();
        let strength = EffectSpec::attribute("strength", ModifierOp::MultiplyPercentage, 0.5);

        assert!(registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, strength, Some(5), false).is_ok());
        assert!(registry.apply(&mut host, &mut tasks, &tables, TARGET, CASTER, armor(1.0), Some(5), false).is_ok());

        assert_eq!(registry.cleanup_target(TARGET, &mut host, &mut tasks), 1);
        assert!(host.actors[&TARGET].attributes.is_empty());
        assert_eq!(registry.len(), 1);
        assert_eq!(host.changed.last(), Some(&TARGET));
    }

    #[test]
    fn unknown_targets_and_attributes_are_rejected() {
        let mut registry = TimedEffectRegistry::new();
        let mut host = Host::with_actors(&[TARGET]);
        let mut tasks = TickScheduler::new();
        let tables = tables();

        assert_eq!(
            registry.apply(&mut host, &mut tasks, &tables, CASTER, ActorHandle(9), armor(1.0), None, false),
            Err(EffectError::UnknownTarget(ActorHandle(9)))
        );
        let unknown = EffectSpec::attribute("charisma", ModifierOp::Add, 1.0);
        assert_eq!(
            registry.apply(&mut host, &mut tasks, &tables, CASTER, TARGET, unknown, None, false),
            Err(EffectError::UnknownAttribute(AttributeKey::new("charisma")))
        );
        assert!(registry.is_empty());
    }
}
