//! Per-actor progression state.
//!
//! Everything here is plain data; the rules that mutate it live in
//! [`crate::ledger`], [`crate::engine`] and [`crate::cast`].
mod class;
mod common;
mod progress;
mod resource;
mod skill;
mod snapshot;

pub use class::ClassState;
pub use common::{ActorHandle, AttributeKey, ClassGroup, ClassId, GrantSource, SkillKey, SourceId, Tick};
pub use progress::{ActorModifiers, ActorProgress, CastState, ModifierHandle, ModifierLayer};
pub use resource::ResourcePool;
pub use skill::{ExternalGrant, SkillState};
pub use snapshot::{ProgressSnapshot, SkillSnapshot};
