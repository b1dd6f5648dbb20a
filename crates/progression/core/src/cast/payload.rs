use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::error;

use crate::state::{ActorHandle, SkillKey};

/// What a payload knows about the cast it executes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastContext {
    pub actor: ActorHandle,
    pub skill: SkillKey,
    pub level: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct PayloadError(pub String);

impl PayloadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Skill-specific effect executed by a successful cast.
pub trait EffectPayload {
    /// Returns `Ok(false)` when the effect found nothing to act on; the cast
    /// is then not charged.
    fn fire(&mut self, cast: &CastContext) -> Result<bool, PayloadError>;
}

impl<F> EffectPayload for F
where
    F: FnMut(&CastContext) -> Result<bool, PayloadError>,
{
    fn fire(&mut self, cast: &CastContext) -> Result<bool, PayloadError> {
        self(cast)
    }
}

/// Payload that always succeeds, for skills that only need bookkeeping.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPayload;

impl EffectPayload for NoPayload {
    fn fire(&mut self, _cast: &CastContext) -> Result<bool, PayloadError> {
        Ok(true)
    }
}

/// Runs `payload` behind a fault boundary.
///
/// Returned errors and panics are logged and reported as `false`.
pub fn run_guarded(payload: &mut dyn EffectPayload, cast: &CastContext) -> bool {
    match catch_unwind(AssertUnwindSafe(|| payload.fire(cast))) {
        Ok(Ok(fired)) => fired,
        Ok(Err(err)) => {
            error!(actor = %cast.actor, skill = %cast.skill, error = %err, "skill payload failed");
            false
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic".to_owned());
            error!(actor = %cast.actor, skill = %cast.skill, panic = %message, "skill payload panicked");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CastContext {
        CastContext {
            actor: ActorHandle(1),
            skill: "fireball".into(),
            level: 1,
        }
    }

    #[test]
    fn errors_and_panics_are_contained() {
        let mut failing = |_: &CastContext| -> Result<bool, PayloadError> {
            Err(PayloadError::new("no target"))
        };
        let mut panicking = |_: &CastContext| -> Result<bool, PayloadError> {
            panic!("payload bug");
        };

        assert!(run_guarded(&mut NoPayload, &context()));
        assert!(!run_guarded(&mut failing, &context()));
        assert!(!run_guarded(&mut panicking, &context()));
    }
}
