//! Deterministic progression rules shared by every host.
//!
//! `progression-core` owns the attribute ledger, the modifier stack, derived
//! stat recomputation, the skill level state machine, cast gating and timed
//! effects. It performs no I/O and owns no clock: definition tables arrive
//! through the oracle traits in [`env`], time through [`schedule::DeferredTasks`],
//! and host side effects through [`stats::ActorAdapter`]. All per-actor
//! mutation flows through [`engine::ProgressionEngine`].
pub mod cast;
pub mod config;
pub mod effects;
pub mod engine;
pub mod env;
pub mod error;
pub mod hook;
pub mod ledger;
pub mod modifier;
pub mod schedule;
pub mod state;
pub mod stats;

#[cfg(test)]
mod testing;

pub use cast::{CastCheck, CastChecks, CastContext, CastFailure, EffectPayload, NoPayload, PayloadError};
pub use config::ProgressionConfig;
pub use effects::{
    EffectError, EffectSpec, EffectSubject, EffectTaskId, ModifierHost, ScheduledEffect,
    TimedEffectRegistry,
};
pub use engine::{CastReceipt, Ports, ProgressionEngine, ProgressionEvent};
pub use env::{
    AttributeDefinition, AttributeOracle, ClassDefinition, ClassOracle, GroupSettings,
    ProgressionEnv, ProgressionView, Requirement, ScaledValue, SkillDefinition, SkillOracle,
    StatScaling,
};
pub use error::{ErrorKind, ErrorSeverity, ProgressionError, ProgressionFault};
pub use hook::{AllowAll, CommitHook, Transaction, Verdict};
pub use ledger::{AttributeLedger, LedgerEntry, LedgerReceipt};
pub use modifier::{Modifier, ModifierId, ModifierOp, ModifierSpec, ModifierStack, StatBounds};
pub use schedule::{DeferredJob, DeferredTasks, DueJob, TaskHandle, TickScheduler};
pub use state::{
    ActorHandle, ActorModifiers, ActorProgress, AttributeKey, ClassGroup, ClassId, ClassState,
    ExternalGrant, GrantSource, ModifierHandle, ModifierLayer, ProgressSnapshot, ResourcePool,
    SkillKey, SkillSnapshot, SkillState, SourceId, Tick,
};
pub use stats::{ActorAdapter, DerivedStats, DetachedActor, RecomputeOutcome, StatKey, StatPipeline};
