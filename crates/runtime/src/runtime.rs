//! High-level runtime orchestrator.
//!
//! The runtime owns every live actor, the tick clock and the timed effects
//! that reference actors across the roster. Engine calls run synchronously
//! through [`ProgressionRuntime::with_engine`]; their events are published on
//! the [`EventBus`] once the call returns. Deferred jobs fire only from
//! [`ProgressionRuntime::advance`], in `(due tick, schedule order)` order.

use std::sync::Arc;

use progression_content::ContentBundle;
use progression_core::cast::clear_throttle;
use progression_core::{
    ActorAdapter, ActorHandle, ActorModifiers, ActorProgress, CastReceipt, DeferredJob,
    DeferredTasks, DueJob, EffectPayload, EffectSpec, EffectTaskId, ModifierHost, Ports,
    ProgressSnapshot, ProgressionEngine, ProgressionEnv, ProgressionEvent, SkillKey, StatPipeline,
    TaskHandle, Tick, TickScheduler, TimedEffectRegistry,
};
use tokio::sync::broadcast;
use tracing::{debug, info, trace};

use crate::error::{Result, RuntimeError};
use crate::events::{EffectEnd, EffectEvent, Event, EventBus, RosterEvent, Topic};
use crate::oracle::OracleManager;
use crate::repository::SnapshotRepository;
use crate::roster::{ActorRecord, Roster};
use crate::veto::{VetoPolicy, VetoRegistry};

/// Runtime configuration that is not part of the progression rules.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    /// Clock value the scheduler starts from.
    pub start_tick: Tick,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            start_tick: Tick::ZERO,
        }
    }
}

/// Main runtime that drives progression for every live actor.
pub struct ProgressionRuntime {
    oracles: OracleManager,
    roster: Roster,
    scheduler: TickScheduler,
    effects: TimedEffectRegistry,
    vetoes: VetoRegistry,
    bus: EventBus,
    regen: Option<TaskHandle>,
}

impl ProgressionRuntime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn now(&self) -> Tick {
        self.scheduler.now()
    }

    pub fn content(&self) -> &ContentBundle {
        self.oracles.content()
    }

    pub fn oracles(&self) -> &OracleManager {
        &self.oracles
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn actor(&self, actor: ActorHandle) -> Option<&ActorRecord> {
        self.roster.get(actor)
    }

    pub fn progress(&self, actor: ActorHandle) -> Result<&ActorProgress> {
        self.roster
            .get(actor)
            .map(|record| &record.progress)
            .ok_or(RuntimeError::UnknownActor(actor))
    }

    pub fn effects(&self) -> &TimedEffectRegistry {
        &self.effects
    }

    pub fn vetoes_mut(&mut self) -> &mut VetoRegistry {
        &mut self.vetoes
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    /// Adds an actor with fresh progress and writes its initial stats.
    pub fn add_actor(
        &mut self,
        name: impl Into<String>,
        adapter: impl ActorAdapter + Send + 'static,
    ) -> ActorHandle {
        let name = name.into();
        let progress = ActorProgress::new(self.oracles.config());
        let actor = self.roster.insert(name.clone(), progress, Box::new(adapter));
        info!(actor = %actor, name = %name, "actor added");
        self.bus
            .publish(Event::Roster(RosterEvent::ActorAdded { actor, name }));
        // The handle was issued above, so the lookup cannot miss.
        let _ = self.with_engine(actor, |engine| engine.recompute());
        actor
    }

    /// Removes an actor after tearing down every timed effect it owns or is
    /// affected by, and cancels its pending throttle job.
    pub fn remove_actor(&mut self, actor: ActorHandle) -> Result<ActorRecord> {
        let throttle = self.progress(actor)?.cast.throttle;

        let env = self.oracles.as_env();
        let mut host = RosterHost::new(&mut self.roster, env);
        let owned = self.effects.cleanup(actor, &mut host, &mut self.scheduler);
        let targeted = self
            .effects
            .cleanup_target(actor, &mut host, &mut self.scheduler);
        let events = host.into_events();

        if let Some(handle) = throttle {
            self.scheduler.cancel(handle);
        }
        let record = self
            .roster
            .remove(actor)
            .ok_or(RuntimeError::UnknownActor(actor))?;

        self.publish_progression(events);
        self.bus
            .publish(Event::Roster(RosterEvent::ActorRemoved { actor }));
        info!(actor = %actor, owned, targeted, "actor removed");
        Ok(record)
    }

    /// Runs `f` against the actor's engine and publishes the events it
    /// recorded.
    pub fn with_engine<R>(
        &mut self,
        actor: ActorHandle,
        f: impl FnOnce(&mut ProgressionEngine<'_>) -> R,
    ) -> Result<R> {
        let env = self.oracles.as_env();
        let record = self
            .roster
            .get_mut(actor)
            .ok_or(RuntimeError::UnknownActor(actor))?;
        let ports = Ports::new(record.adapter.as_mut(), &mut self.vetoes, &mut self.scheduler);
        let mut engine = ProgressionEngine::new(actor, &mut record.progress, env, ports);

        let result = f(&mut engine);
        let events = engine.take_events();
        drop(engine);

        self.publish_progression(events);
        Ok(result)
    }

    /// Casts `skill` with the given payload.
    pub fn cast(
        &mut self,
        actor: ActorHandle,
        skill: &SkillKey,
        payload: &mut dyn EffectPayload,
    ) -> Result<CastReceipt> {
        let receipt = self.with_engine(actor, |engine| engine.cast(skill, payload))??;
        Ok(receipt)
    }

    /// Installs a timed modifier from `source` on `target`.
    ///
    /// `duration` of `None` (or negative) keeps the effect until stopped or
    /// until either actor leaves.
    pub fn apply_effect(
        &mut self,
        source: ActorHandle,
        target: ActorHandle,
        spec: EffectSpec,
        duration: Option<i64>,
        stackable: bool,
    ) -> Result<EffectTaskId> {
        if !self.roster.contains(source) {
            return Err(RuntimeError::UnknownActor(source));
        }

        let env = self.oracles.as_env();
        let mut host = RosterHost::new(&mut self.roster, env);
        let applied = self.effects.apply(
            &mut host,
            &mut self.scheduler,
            env.attributes,
            source,
            target,
            spec,
            duration,
            stackable,
        );
        let events = host.into_events();
        self.publish_progression(events);

        let id = applied?;
        let expires_at = self.effects.get(id).and_then(|task| task.expires_at);
        self.bus.publish(Event::Effect(EffectEvent::Applied {
            id,
            source,
            target,
            expires_at,
        }));
        Ok(id)
    }

    /// Stops a timed effect early. Returns `false` when it already ended.
    pub fn stop_effect(&mut self, id: EffectTaskId) -> bool {
        let env = self.oracles.as_env();
        let mut host = RosterHost::new(&mut self.roster, env);
        let stopped = self.effects.stop(id, &mut host, &mut self.scheduler);
        let events = host.into_events();

        self.publish_progression(events);
        if stopped {
            self.bus.publish(Event::Effect(EffectEvent::Ended {
                id,
                reason: EffectEnd::Stopped,
            }));
        }
        stopped
    }

    /// Moves the clock `ticks` forward, firing every job that comes due on
    /// the way. Returns the number of jobs fired.
    pub fn advance(&mut self, ticks: u64) -> usize {
        let until = self.scheduler.now() + ticks;
        let mut fired = 0;
        while let Some(due) = self.scheduler.pop_due(until) {
            self.dispatch(due);
            fired += 1;
        }
        trace!(now = %self.scheduler.now(), fired, "clock advanced");
        fired
    }

    fn dispatch(&mut self, due: DueJob) {
        match due.job {
            DeferredJob::ExpireEffect(id) => {
                let env = self.oracles.as_env();
                let mut host = RosterHost::new(&mut self.roster, env);
                let expired = self.effects.expire(id, &mut host);
                let events = host.into_events();

                self.publish_progression(events);
                if expired {
                    self.bus.publish(Event::Effect(EffectEvent::Ended {
                        id,
                        reason: EffectEnd::Expired,
                    }));
                }
            }
            DeferredJob::ClearThrottle { actor } => {
                if let Some(record) = self.roster.get_mut(actor)
                    && clear_throttle(&mut record.progress, due.handle)
                {
                    trace!(actor = %actor, "cast throttle cleared");
                }
            }
            DeferredJob::RegenResources => {
                for actor in self.roster.handles() {
                    let _ = self.with_engine(actor, |engine| engine.regen_resources());
                }
                self.schedule_regen();
            }
        }
    }

    fn schedule_regen(&mut self) {
        let interval = self.oracles.config().regen_interval_ticks;
        self.regen = Some(self.scheduler.schedule(interval, DeferredJob::RegenResources));
    }

    /// Captures the persisted part of an actor's progress.
    pub fn snapshot(&self, actor: ActorHandle) -> Result<ProgressSnapshot> {
        Ok(self.progress(actor)?.snapshot(self.scheduler.now()))
    }

    pub fn save_snapshot(
        &self,
        actor: ActorHandle,
        key: &str,
        repository: &dyn SnapshotRepository,
    ) -> Result<()> {
        let snapshot = self.snapshot(actor)?;
        repository.save(key, &snapshot)?;
        debug!(actor = %actor, key, "progress saved");
        Ok(())
    }

    pub fn load_snapshot(
        &mut self,
        actor: ActorHandle,
        key: &str,
        repository: &dyn SnapshotRepository,
    ) -> Result<()> {
        let snapshot = repository
            .load(key)?
            .ok_or_else(|| RuntimeError::SnapshotNotFound(key.to_owned()))?;
        self.restore(actor, &snapshot)?;
        debug!(actor = %actor, key, "progress loaded");
        Ok(())
    }

    /// Replaces an actor's progress with `snapshot`.
    ///
    /// Timed effects on the actor are stopped first since their modifiers
    /// live in the progress being replaced. Effects the actor applied to
    /// others keep running.
    pub fn restore(&mut self, actor: ActorHandle, snapshot: &ProgressSnapshot) -> Result<()> {
        let throttle = self.progress(actor)?.cast.throttle;
        if let Some(handle) = throttle {
            self.scheduler.cancel(handle);
        }

        let env = self.oracles.as_env();
        let mut host = RosterHost::new(&mut self.roster, env);
        self.effects
            .cleanup_target(actor, &mut host, &mut self.scheduler);
        let events = host.into_events();
        self.publish_progression(events);

        let now = self.scheduler.now();
        let record = self
            .roster
            .get_mut(actor)
            .ok_or(RuntimeError::UnknownActor(actor))?;
        record.progress = ActorProgress::restore(snapshot, &env, now);

        self.bus
            .publish(Event::Roster(RosterEvent::ActorRestored { actor }));
        self.with_engine(actor, |engine| engine.recompute())?;
        Ok(())
    }

    fn publish_progression(&self, events: Vec<ProgressionEvent>) {
        self.bus.publish_all(events.into_iter().map(Event::from));
    }
}

impl std::fmt::Debug for ProgressionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionRuntime")
            .field("now", &self.scheduler.now())
            .field("actors", &self.roster.len())
            .field("effects", &self.effects.len())
            .field("vetoes", &self.vetoes)
            .field("regen", &self.regen)
            .finish()
    }
}

/// Modifier access across the whole roster for the effect registry.
///
/// Recomputes happen here so effects can target any live actor, not just the
/// one an engine call is borrowing.
struct RosterHost<'r> {
    roster: &'r mut Roster,
    env: ProgressionEnv<'r>,
    events: Vec<ProgressionEvent>,
}

impl<'r> RosterHost<'r> {
    fn new(roster: &'r mut Roster, env: ProgressionEnv<'r>) -> Self {
        Self {
            roster,
            env,
            events: Vec::new(),
        }
    }

    fn into_events(self) -> Vec<ProgressionEvent> {
        self.events
    }
}

impl ModifierHost for RosterHost<'_> {
    fn modifiers_mut(&mut self, actor: ActorHandle) -> Option<&mut ActorModifiers> {
        self.roster
            .get_mut(actor)
            .map(|record| &mut record.progress.modifiers)
    }

    fn modifiers_changed(&mut self, actor: ActorHandle) {
        let Some(record) = self.roster.get_mut(actor) else {
            return;
        };
        let outcome = StatPipeline::recompute(&mut record.progress, self.env, record.adapter.as_mut());
        if outcome.changed {
            self.events.push(ProgressionEvent::DerivedStatsChanged {
                actor,
                stats: outcome.derived,
            });
        }
    }
}

/// Builder for [`ProgressionRuntime`].
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    oracles: Option<OracleManager>,
    policies: Vec<Arc<dyn VetoPolicy>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            oracles: None,
            policies: Vec::new(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set required oracle manager
    pub fn oracles(mut self, oracles: OracleManager) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Shorthand for [`RuntimeBuilder::oracles`] over a loaded bundle.
    pub fn content(self, content: ContentBundle) -> Self {
        self.oracles(OracleManager::from(content))
    }

    /// Add a veto policy consulted before every commit.
    pub fn policy(mut self, policy: Arc<dyn VetoPolicy>) -> Self {
        self.policies.push(policy);
        self
    }

    pub fn build(self) -> Result<ProgressionRuntime> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingContent)?;

        let mut runtime = ProgressionRuntime {
            oracles,
            roster: Roster::new(),
            scheduler: TickScheduler::starting_at(self.config.start_tick),
            effects: TimedEffectRegistry::new(),
            vetoes: VetoRegistry::new(self.policies),
            bus: EventBus::with_capacity(self.config.event_buffer_size),
            regen: None,
        };
        runtime.schedule_regen();
        info!(
            policies = runtime.vetoes.len(),
            start = %runtime.scheduler.now(),
            "progression runtime ready"
        );
        Ok(runtime)
    }
}
