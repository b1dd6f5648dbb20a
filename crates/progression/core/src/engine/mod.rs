//! Mutation entry points for one actor's progression.
//!
//! The [`ProgressionEngine`] borrows an actor's [`ActorProgress`] together with
//! the read-only [`ProgressionEnv`] and the host ports it writes through. Every
//! operation that changes ledger totals, skill levels, professed classes or
//! modifiers finishes with a synchronous [`StatPipeline::recompute`] before it
//! returns, so callers never observe stale derived stats.
//!
//! Operations are grouped by concern across the submodules:
//! attributes, skills, classes and casting.

mod attributes;
mod cast;
mod classes;
mod events;
mod skills;

pub use cast::CastReceipt;
pub use events::ProgressionEvent;

use tracing::debug;

use crate::env::ProgressionEnv;
use crate::hook::CommitHook;
use crate::modifier::ModifierSpec;
use crate::schedule::DeferredTasks;
use crate::state::{ActorHandle, ActorProgress, AttributeKey, ModifierHandle};
use crate::stats::{ActorAdapter, RecomputeOutcome, StatKey, StatPipeline, subtract_hunger};

/// Host collaborators the engine writes through.
pub struct Ports<'a> {
    pub actor: &'a mut dyn ActorAdapter,
    pub hook: &'a mut dyn CommitHook,
    pub tasks: &'a mut dyn DeferredTasks,
}

impl<'a> Ports<'a> {
    pub fn new(
        actor: &'a mut dyn ActorAdapter,
        hook: &'a mut dyn CommitHook,
        tasks: &'a mut dyn DeferredTasks,
    ) -> Self {
        Self { actor, hook, tasks }
    }
}

pub struct ProgressionEngine<'a> {
    actor: ActorHandle,
    progress: &'a mut ActorProgress,
    env: ProgressionEnv<'a>,
    ports: Ports<'a>,
    events: Vec<ProgressionEvent>,
}

impl<'a> ProgressionEngine<'a> {
    pub fn new(
        actor: ActorHandle,
        progress: &'a mut ActorProgress,
        env: ProgressionEnv<'a>,
        ports: Ports<'a>,
    ) -> Self {
        Self {
            actor,
            progress,
            env,
            ports,
            events: Vec::new(),
        }
    }

    pub fn actor(&self) -> ActorHandle {
        self.actor
    }

    pub fn progress(&self) -> &ActorProgress {
        &*self.progress
    }

    /// Read-only evaluator over the current state.
    pub fn pipeline(&self) -> StatPipeline<'_> {
        StatPipeline::new(self.progress, self.env)
    }

    /// Events recorded since the last drain.
    pub fn events(&self) -> &[ProgressionEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<ProgressionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recomputes derived stats and records a change notification when the
    /// values moved.
    pub fn recompute(&mut self) -> RecomputeOutcome {
        let outcome = StatPipeline::recompute(self.progress, self.env, self.ports.actor);
        if outcome.changed {
            self.record(ProgressionEvent::DerivedStatsChanged {
                actor: self.actor,
                stats: outcome.derived,
            });
        }
        outcome
    }

    pub fn add_attribute_modifier(&mut self, key: impl Into<AttributeKey>, spec: ModifierSpec) -> ModifierHandle {
        let handle = self.progress.modifiers.add_attribute(key.into(), spec);
        self.recompute();
        handle
    }

    pub fn add_stat_modifier(&mut self, stat: StatKey, spec: ModifierSpec) -> ModifierHandle {
        let handle = self.progress.modifiers.add_stat(stat, spec);
        self.recompute();
        handle
    }

    /// Removes a modifier; absent handles are ignored.
    pub fn remove_modifier(&mut self, handle: ModifierHandle) -> bool {
        let removed = self.progress.modifiers.remove(handle);
        if removed {
            self.recompute();
        }
        removed
    }

    /// Drops every non-persistent modifier from both stacks.
    pub fn clear_modifiers(&mut self) -> usize {
        let removed = self.progress.modifiers.clear_non_persistent();
        if removed > 0 {
            self.recompute();
        }
        removed
    }

    /// Restores the sum of every professed class's scaled mana regeneration.
    pub fn regen_resources(&mut self) -> f64 {
        if !self.env.config.mana_enabled {
            return 0.0;
        }
        let amount = self.progress.derived.mana_regen;
        let restored = self.progress.mana.restore(amount);
        if restored > 0.0 {
            self.ports.actor.write_resource_pool(self.progress.mana);
        }
        restored
    }

    pub fn give_mana(&mut self, amount: f64) -> f64 {
        let restored = self.progress.mana.restore(amount);
        self.ports.actor.write_resource_pool(self.progress.mana);
        restored
    }

    pub fn use_mana(&mut self, amount: f64) -> f64 {
        let used = self.progress.mana.use_amount(amount);
        self.ports.actor.write_resource_pool(self.progress.mana);
        used
    }

    /// Drains hunger; returns the whole points the host should remove.
    pub fn subtract_hunger(&mut self, amount: f64) -> i32 {
        let mut hunger = self.progress.hunger;
        let lost = subtract_hunger(&mut hunger, &self.pipeline(), amount);
        self.progress.hunger = hunger;
        if lost > 0 {
            debug!(actor = %self.actor, lost, hunger, "hunger drained");
        }
        lost
    }

    pub fn set_hunger(&mut self, hunger: f64) {
        self.progress.hunger = hunger;
    }

    fn record(&mut self, event: ProgressionEvent) {
        self.events.push(event);
    }
}
