//! Host-side orchestration for the progression engine.
//!
//! This crate wires the deterministic `progression-core` engine to loaded
//! content, a tick clock and the outside world. Consumers embed
//! [`ProgressionRuntime`] to add actors, drive engine calls, advance time and
//! subscribe to events.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`roster`] keeps live actors under stable handles
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`veto`] fans commit checks out to registered policies
//! - [`oracle`] and [`repository`] provide data adapters reused by other crates
pub mod error;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod roster;
pub mod runtime;
pub mod veto;

pub use error::{Result, RuntimeError};
pub use events::{EffectEnd, EffectEvent, Event, EventBus, RosterEvent, Topic};
pub use oracle::OracleManager;
pub use repository::{
    FileSnapshotRepository, InMemorySnapshotRepository, RepositoryError, SnapshotRepository,
};
pub use roster::{ActorRecord, Roster, StatSheet};
pub use runtime::{ProgressionRuntime, RuntimeBuilder, RuntimeConfig};
pub use veto::{SkillLock, VetoFn, VetoPolicy, VetoRegistry};
