//! Cast gate: unlock, throttle, cooldown and resource checks around a skill cast.
//!
//! A skill is `Ready` or `OnCooldown`; independently, the actor may be inside
//! a short global throttle window armed by its previous cast. [`check`]
//! reports the first failing condition in a fixed priority order and never
//! mutates. [`apply_use`] books a successful cast: resource debit, cooldown
//! start, and a fresh throttle marker replacing any armed one.
//!
//! Skill effect payloads run behind [`run_guarded`]; a payload that errors or
//! panics turns into [`CastFailure::EffectFailed`] and leaves already
//! committed state untouched.

mod payload;

pub use payload::{CastContext, EffectPayload, NoPayload, PayloadError, run_guarded};

use crate::config::ProgressionConfig;
use crate::env::SkillDefinition;
use crate::error::{ErrorSeverity, ProgressionFault};
use crate::schedule::{DeferredJob, DeferredTasks, TaskHandle};
use crate::state::{ActorHandle, ActorProgress, SkillKey, Tick};

/// Reason a cast did not happen.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastFailure {
    #[error("unknown skill '{0}'")]
    UnknownSkill(SkillKey),

    #[error("skill is not unlocked")]
    NotUnlocked,

    #[error("casting is throttled")]
    Throttled,

    #[error("skill is on cooldown for {remaining} more ticks")]
    OnCooldown { remaining: u64 },

    #[error("insufficient resource: required {required}, available {available}")]
    InsufficientResource { required: f64, available: f64 },

    #[error("cast cancelled by commit hook")]
    Cancelled,

    #[error("skill effect failed")]
    EffectFailed,
}

impl ProgressionFault for CastFailure {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownSkill(_) | Self::NotUnlocked => ErrorSeverity::Validation,
            Self::Throttled
            | Self::OnCooldown { .. }
            | Self::InsufficientResource { .. }
            | Self::Cancelled
            | Self::EffectFailed => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSkill(_) => "CAST_UNKNOWN_SKILL",
            Self::NotUnlocked => "CAST_NOT_UNLOCKED",
            Self::Throttled => "CAST_THROTTLED",
            Self::OnCooldown { .. } => "CAST_ON_COOLDOWN",
            Self::InsufficientResource { .. } => "CAST_INSUFFICIENT_RESOURCE",
            Self::Cancelled => "CAST_CANCELLED",
            Self::EffectFailed => "CAST_EFFECT_FAILED",
        }
    }
}

/// Which optional checks to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastChecks {
    pub cooldown: bool,
    pub resource: bool,
}

impl CastChecks {
    pub const ALL: Self = Self {
        cooldown: true,
        resource: true,
    };

    pub const UNLOCK_ONLY: Self = Self {
        cooldown: false,
        resource: false,
    };
}

/// Values resolved by a passing [`check`], reused by [`apply_use`].
#[derive(Clone, Debug, PartialEq)]
pub struct CastCheck {
    pub skill: SkillKey,
    pub level: i32,
    pub resource_cost: f64,
    pub cooldown_ticks: u64,
}

/// Validates a cast of `def` without mutating anything.
///
/// Priority: not unlocked, throttled, on cooldown, insufficient resource.
pub fn check(
    progress: &ActorProgress,
    def: &SkillDefinition,
    config: &ProgressionConfig,
    now: Tick,
    checks: CastChecks,
) -> Result<CastCheck, CastFailure> {
    let level = progress.skill_level(&def.key);
    if level <= 0 {
        return Err(CastFailure::NotUnlocked);
    }
    if progress.is_throttled() {
        return Err(CastFailure::Throttled);
    }
    if checks.cooldown {
        let remaining = progress
            .skill(&def.key)
            .map_or(0, |skill| skill.cooldown_remaining(now));
        if remaining > 0 {
            return Err(CastFailure::OnCooldown { remaining });
        }
    }

    let resource_cost = if config.mana_enabled {
        def.resource_cost_at(level)
    } else {
        0.0
    };
    if checks.resource && !progress.mana.has(resource_cost) {
        return Err(CastFailure::InsufficientResource {
            required: resource_cost,
            available: progress.mana.current,
        });
    }

    Ok(CastCheck {
        skill: def.key.clone(),
        level,
        resource_cost,
        cooldown_ticks: def.cooldown_at(level),
    })
}

/// Books a successful cast.
///
/// Returns the handle of the newly armed throttle marker.
pub fn apply_use(
    progress: &mut ActorProgress,
    actor: ActorHandle,
    cast: &CastCheck,
    config: &ProgressionConfig,
    tasks: &mut dyn DeferredTasks,
) -> TaskHandle {
    let now = tasks.now();
    progress.mana.use_amount(cast.resource_cost);
    if let Some(skill) = progress.skills.get_mut(&cast.skill) {
        skill.cooldown_until = Some(now + cast.cooldown_ticks);
    }

    if let Some(previous) = progress.cast.throttle.take() {
        tasks.cancel(previous);
    }
    let handle = tasks.schedule(config.throttle_ticks, DeferredJob::ClearThrottle { actor });
    progress.cast.throttle = Some(handle);
    handle
}

/// Clears the throttle marker if `fired` is still the armed one.
///
/// A stale job (its marker was replaced by a later cast) is ignored.
pub fn clear_throttle(progress: &mut ActorProgress, fired: TaskHandle) -> bool {
    if progress.cast.throttle == Some(fired) {
        progress.cast.throttle = None;
        true
    } else {
        false
    }
}
