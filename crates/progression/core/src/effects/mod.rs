//! Timed effects: temporary modifiers owned by a scheduled task.
//!
//! A [`ScheduledEffect`] is the only link between a running timer and the
//! modifier it installed. Every way a task can end (expiry, explicit stop,
//! cleanup of its source or target) revokes the modifier before the task is
//! dropped, so no modifier outlives its task.
mod registry;

pub use registry::TimedEffectRegistry;

use crate::error::{ErrorSeverity, ProgressionFault};
use crate::modifier::ModifierOp;
use crate::schedule::TaskHandle;
use crate::state::{ActorHandle, ActorModifiers, AttributeKey, ModifierHandle, Tick};
use crate::stats::StatKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectTaskId(pub u64);

impl std::fmt::Display for EffectTaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

/// What a timed effect modifies on its target.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectSubject {
    Attribute(AttributeKey),
    Stat(StatKey),
}

/// Modifier installed by a timed effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSpec {
    pub subject: EffectSubject,
    pub op: ModifierOp,
    pub magnitude: f64,
}

impl EffectSpec {
    pub fn attribute(key: impl Into<AttributeKey>, op: ModifierOp, magnitude: f64) -> Self {
        Self {
            subject: EffectSubject::Attribute(key.into()),
            op,
            magnitude,
        }
    }

    pub fn stat(stat: StatKey, op: ModifierOp, magnitude: f64) -> Self {
        Self {
            subject: EffectSubject::Stat(stat),
            op,
            magnitude,
        }
    }
}

/// A running timed effect.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledEffect {
    pub id: EffectTaskId,
    pub source: ActorHandle,
    pub target: ActorHandle,
    pub subject: EffectSubject,
    pub modifier: ModifierHandle,
    pub stackable: bool,
    /// `None` for permanent effects.
    pub timer: Option<TaskHandle>,
    pub expires_at: Option<Tick>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error("unknown effect target {0}")]
    UnknownTarget(ActorHandle),

    #[error("unknown attribute '{0}'")]
    UnknownAttribute(AttributeKey),
}

impl ProgressionFault for EffectError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownTarget(_) => "EFFECT_UNKNOWN_TARGET",
            Self::UnknownAttribute(_) => "EFFECT_UNKNOWN_ATTRIBUTE",
        }
    }
}

/// Access to the modifier stacks of every live actor.
pub trait ModifierHost {
    fn modifiers_mut(&mut self, actor: ActorHandle) -> Option<&mut ActorModifiers>;

    /// Called after a modifier of `actor` was added or removed; the host must
    /// recompute the actor's derived stats before returning.
    fn modifiers_changed(&mut self, actor: ActorHandle);
}
