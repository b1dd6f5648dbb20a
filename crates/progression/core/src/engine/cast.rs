use tracing::{debug, warn};

use super::{ProgressionEngine, ProgressionEvent};
use crate::cast::{self, CastCheck, CastChecks, CastContext, CastFailure, EffectPayload, run_guarded};
use crate::hook::Transaction;
use crate::schedule::TaskHandle;
use crate::state::SkillKey;

/// Bookkeeping of a committed cast.
#[derive(Clone, Debug, PartialEq)]
pub struct CastReceipt {
    pub skill: SkillKey,
    pub level: i32,
    pub resource_cost: f64,
    pub cooldown_ticks: u64,
    /// Throttle marker armed by this cast.
    pub throttle: TaskHandle,
}

impl<'a> ProgressionEngine<'a> {
    /// Validates a cast without mutating anything.
    pub fn check_cast(&self, key: &SkillKey, checks: CastChecks) -> Result<CastCheck, CastFailure> {
        let skills = self.env.skills;
        let def = skills
            .skill(key)
            .ok_or_else(|| CastFailure::UnknownSkill(key.clone()))?;
        cast::check(self.progress, def, self.env.config, self.ports.tasks.now(), checks)
    }

    /// Casts a skill: gate checks, commit hook, payload, then resource debit,
    /// cooldown and throttle. Nothing is charged unless the payload succeeds.
    pub fn cast(&mut self, key: &SkillKey, payload: &mut dyn EffectPayload) -> Result<CastReceipt, CastFailure> {
        let outcome = self.try_cast(key, payload);
        if let Err(reason) = &outcome {
            debug!(actor = %self.actor, skill = %key, %reason, "cast rejected");
            self.record(ProgressionEvent::CastFailed {
                actor: self.actor,
                skill: key.clone(),
                reason: reason.clone(),
            });
        }
        outcome
    }

    /// Clears the throttle marker when `fired` is still the armed one.
    pub fn clear_throttle(&mut self, fired: TaskHandle) -> bool {
        cast::clear_throttle(self.progress, fired)
    }

    fn try_cast(&mut self, key: &SkillKey, payload: &mut dyn EffectPayload) -> Result<CastReceipt, CastFailure> {
        let check = self.check_cast(key, CastChecks::ALL)?;

        let transaction = Transaction::Cast {
            actor: self.actor,
            skill: key.clone(),
            level: check.level,
            resource_cost: check.resource_cost,
        };
        if self.ports.hook.before_commit(&transaction).is_denied() {
            warn!(actor = %self.actor, skill = %key, "cast vetoed");
            return Err(CastFailure::Cancelled);
        }

        let context = CastContext {
            actor: self.actor,
            skill: key.clone(),
            level: check.level,
        };
        if !run_guarded(payload, &context) {
            return Err(CastFailure::EffectFailed);
        }

        let throttle = cast::apply_use(self.progress, self.actor, &check, self.env.config, self.ports.tasks);
        self.ports.actor.write_resource_pool(self.progress.mana);
        self.record(ProgressionEvent::SkillCast {
            actor: self.actor,
            skill: key.clone(),
            level: check.level,
            resource_cost: check.resource_cost,
        });
        debug!(actor = %self.actor, skill = %key, level = check.level, "skill cast");

        Ok(CastReceipt {
            skill: check.skill,
            level: check.level,
            resource_cost: check.resource_cost,
            cooldown_ticks: check.cooldown_ticks,
            throttle,
        })
    }
}
