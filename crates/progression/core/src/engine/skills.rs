//! Skill level state machine.
//!
//! ```text
//! Locked(0) ──upgrade/force/grant──► Unlocked(1..max) ──► … ──► max
//!     ▲                                  │
//!     └──────downgrade/refund────────────┘
//! ```
//!
//! Player upgrades and downgrades move points between the owning class budget
//! and `invested_cost` and are subject to the commit hook. Forced changes and
//! external grants bypass both. Crossing 0 → 1 unlocks the skill and settles
//! auto-levelling across every skill the actor holds.

use tracing::{debug, warn};

use super::{ProgressionEngine, ProgressionEvent};
use crate::env::{Requirement, SkillDefinition};
use crate::error::ProgressionError;
use crate::hook::Transaction;
use crate::state::{ClassGroup, GrantSource, SkillKey, SkillState};

impl<'a> ProgressionEngine<'a> {
    /// Buys the next level of a skill with the owning class's points.
    pub fn upgrade_skill(&mut self, key: &SkillKey) -> Result<i32, ProgressionError> {
        let def = self.skill_def(key)?;
        let state = self.skill_state(key)?;
        let level = state.level;
        if level >= def.max_level {
            return Err(ProgressionError::AtMaximum { max: def.max_level });
        }
        let owner = state.class.clone();
        if !self.is_eligible(def, owner.as_ref(), level) {
            return Err(ProgressionError::RequirementsNotMet(key.clone()));
        }
        let Some(group) = owner else {
            return Err(ProgressionError::RequirementsNotMet(key.clone()));
        };

        let cost = def.cost_at(level);
        let available = self
            .progress
            .classes
            .get(&group)
            .map(|class| class.points)
            .ok_or_else(|| ProgressionError::GroupNotProfessed(group.clone()))?;
        if cost > available {
            return Err(ProgressionError::InsufficientPoints {
                required: cost,
                available,
            });
        }

        let before = state.clone();
        self.with_class_points(&group, -cost);
        if let Some(skill) = self.progress.skills.get_mut(key) {
            skill.level += 1;
            skill.funded_level += 1;
            skill.invested_cost += cost;
        }

        let transaction = Transaction::SkillUpgrade {
            actor: self.actor,
            skill: key.clone(),
            level: level + 1,
            cost,
        };
        if self.ports.hook.before_commit(&transaction).is_denied() {
            warn!(actor = %self.actor, skill = %key, "skill upgrade vetoed");
            self.with_class_points(&group, cost);
            self.progress.skills.insert(key.clone(), before);
            return Err(ProgressionError::Vetoed);
        }

        debug!(actor = %self.actor, skill = %key, level = level + 1, cost, "skill upgraded");
        self.level_changed(key, level, level + 1);
        self.recompute();
        Ok(level + 1)
    }

    /// Sells back the top level of a skill.
    pub fn downgrade_skill(&mut self, key: &SkillKey) -> Result<i32, ProgressionError> {
        let def = self.skill_def(key)?;
        let state = self.skill_state(key)?;
        let level = state.level;
        if level <= 0 || level - 1 < state.max_grant() {
            return Err(ProgressionError::AtMinimum);
        }

        let refund = def.cost_at(level - 1);
        if refund == 0 {
            return Err(ProgressionError::FreeSkill(key.clone()));
        }
        if let Some(dependent) = self.dependent_of(key, level) {
            return Err(ProgressionError::RequiredBy {
                skill: key.clone(),
                dependent,
            });
        }

        let before = state.clone();
        let owner = state.class.clone();
        if let Some(group) = &owner {
            self.with_class_points(group, refund);
        }
        if let Some(skill) = self.progress.skills.get_mut(key) {
            skill.level -= 1;
            skill.funded_level = (skill.funded_level - 1).clamp(0, skill.level);
            skill.invested_cost = (skill.invested_cost - refund).max(0);
        }

        let transaction = Transaction::SkillDowngrade {
            actor: self.actor,
            skill: key.clone(),
            level: level - 1,
            refund,
        };
        if self.ports.hook.before_commit(&transaction).is_denied() {
            warn!(actor = %self.actor, skill = %key, "skill downgrade vetoed");
            if let Some(group) = &owner {
                self.with_class_points(group, -refund);
            }
            self.progress.skills.insert(key.clone(), before);
            return Err(ProgressionError::Vetoed);
        }

        debug!(actor = %self.actor, skill = %key, level = level - 1, refund, "skill downgraded");
        self.level_changed(key, level, level - 1);
        self.recompute();
        Ok(level - 1)
    }

    /// Raises a skill by `amount` levels without eligibility, cost or hook.
    /// Zero is a no-op.
    pub fn force_upgrade_skill(&mut self, key: &SkillKey, amount: u32) -> Result<i32, ProgressionError> {
        let def = self.skill_def(key)?;
        let level = self.skill_state(key)?.level;
        if amount == 0 {
            return Ok(level);
        }
        let new_level = self.raise_level(key, def, amount, true);
        if new_level != level {
            self.level_changed(key, level, new_level);
            self.recompute();
        }
        Ok(new_level)
    }

    /// Lowers a skill by `amount` levels, never below its highest grant.
    /// Zero is a no-op.
    pub fn force_downgrade_skill(&mut self, key: &SkillKey, amount: u32) -> Result<i32, ProgressionError> {
        let level = self.skill_state(key)?.level;
        if amount == 0 {
            return Ok(level);
        }
        let target = level.saturating_sub(i32::try_from(amount).unwrap_or(i32::MAX));
        let new_level = self.lower_level(key, target);
        if new_level != level {
            self.level_changed(key, level, new_level);
            self.recompute();
        }
        Ok(new_level)
    }

    /// Advances a skill through its free levels as far as the owning class
    /// level allows. Returns the resulting level.
    pub fn auto_level_skill(&mut self, key: &SkillKey) -> Result<i32, ProgressionError> {
        self.skill_def(key)?;
        let before = self.skill_state(key)?.level;
        if self.auto_level(key) {
            self.settle_auto_levels();
        }
        let after = self.progress.skill_level(key);
        if after != before {
            self.recompute();
        }
        Ok(after)
    }

    /// Records a grant from `source` and lifts the skill to at least the
    /// granted level. A grant from the same source replaces the old one.
    pub fn add_external_skill(
        &mut self,
        key: &SkillKey,
        source: GrantSource,
        level: i32,
    ) -> Result<i32, ProgressionError> {
        let def = self.skill_def(key)?;
        let granted = level.clamp(0, def.max_level);
        let skill = self
            .progress
            .skills
            .entry(key.clone())
            .or_insert_with(|| SkillState::locked(key.clone(), None));
        skill.put_grant(source.clone(), granted);
        let current = skill.level;

        debug!(actor = %self.actor, skill = %key, %source, level = granted, "external skill granted");
        if granted > current {
            let amount = u32::try_from(granted - current).unwrap_or(0);
            let new_level = self.raise_level(key, def, amount, false);
            self.level_changed(key, current, new_level);
            self.recompute();
            return Ok(new_level);
        }
        Ok(current)
    }

    /// Withdraws the grant from `source`. The skill falls back to the highest
    /// remaining grant or the player-funded level, whichever is higher.
    pub fn remove_external_skill(&mut self, key: &SkillKey, source: &GrantSource) -> Result<i32, ProgressionError> {
        let skill = self
            .progress
            .skills
            .get_mut(key)
            .ok_or_else(|| ProgressionError::UnknownSkill(key.clone()))?;
        if !skill.take_grant(source) {
            return Ok(skill.level);
        }
        let level = skill.level;
        let floor = skill.funded_level.max(skill.max_grant());

        debug!(actor = %self.actor, skill = %key, %source, "external skill withdrawn");
        let new_level = if level > floor {
            self.lower_level(key, floor)
        } else {
            level
        };
        if let Some(skill) = self.progress.skills.get(key) {
            if skill.class.is_none() && skill.level == 0 && skill.grants.is_empty() {
                self.progress.skills.remove(key);
            }
        }
        if new_level != level {
            self.level_changed(key, level, new_level);
            self.recompute();
        }
        Ok(new_level)
    }

    /// Returns every invested point of a skill to its class budget and drops
    /// the skill to its highest grant. Free skills are left alone.
    pub fn refund_skill(&mut self, key: &SkillKey) -> Result<i64, ProgressionError> {
        let state = self.skill_state(key)?;
        let credit = state.invested_cost;
        let level = state.level;
        if credit == 0 || level == 0 {
            return Ok(0);
        }
        let owner = state.class.clone();
        let floor = state.max_grant();

        if let Some(group) = &owner {
            self.with_class_points(group, credit);
        }
        if let Some(skill) = self.progress.skills.get_mut(key) {
            skill.invested_cost = 0;
            skill.funded_level = 0;
            skill.level = floor;
        }

        debug!(actor = %self.actor, skill = %key, credit, "skill refunded");
        self.level_changed(key, level, floor);
        self.recompute();
        Ok(credit)
    }

    /// Refunds every skill. Returns the total credited.
    pub fn refund_all_skills(&mut self) -> i64 {
        let keys: Vec<_> = self.progress.skills.keys().cloned().collect();
        keys.iter()
            .filter_map(|key| self.refund_skill(key).ok())
            .sum()
    }

    /// Points invested across every skill.
    pub fn invested_skill_points(&self) -> i64 {
        self.progress.invested_skill_points()
    }

    pub(super) fn skill_def(&self, key: &SkillKey) -> Result<&'a SkillDefinition, ProgressionError> {
        let skills = self.env.skills;
        skills
            .skill(key)
            .ok_or_else(|| ProgressionError::UnknownSkill(key.clone()))
    }

    fn skill_state(&self, key: &SkillKey) -> Result<&SkillState, ProgressionError> {
        self.progress
            .skills
            .get(key)
            .ok_or_else(|| ProgressionError::UnknownSkill(key.clone()))
    }

    /// Class level requirement for the next level plus every declared predicate.
    fn is_eligible(&self, def: &SkillDefinition, owner: Option<&ClassGroup>, level: i32) -> bool {
        self.owner_level(owner) >= def.level_requirement_at(level)
            && Requirement::all_met(&def.requirements, &self.pipeline(), owner)
    }

    fn owner_level(&self, owner: Option<&ClassGroup>) -> i32 {
        match owner {
            Some(group) => self.progress.class(group).map_or(0, |class| class.level),
            None => self
                .progress
                .classes
                .values()
                .map(|class| class.level)
                .max()
                .unwrap_or(0),
        }
    }

    /// Another unlocked skill that requires `key` at `level` or above.
    fn dependent_of(&self, key: &SkillKey, level: i32) -> Option<SkillKey> {
        let skills = self.env.skills;
        self.progress
            .skills
            .values()
            .filter(|other| &other.key != key && other.is_unlocked())
            .find(|other| {
                skills
                    .skill(&other.key)
                    .and_then(|def| def.required_level_of(key))
                    .is_some_and(|required| level <= required)
            })
            .map(|other| other.key.clone())
    }

    fn with_class_points(&mut self, group: &ClassGroup, delta: i64) {
        if let Some(class) = self.progress.classes.get_mut(group) {
            class.give_points(delta);
        }
    }

    /// Raises the level by up to `amount`, capped at the definition maximum.
    /// With `fund` the levels actually gained count as player-held rather
    /// than granted.
    fn raise_level(&mut self, key: &SkillKey, def: &SkillDefinition, amount: u32, fund: bool) -> i32 {
        let Some(skill) = self.progress.skills.get_mut(key) else {
            return 0;
        };
        let amount = i32::try_from(amount).unwrap_or(i32::MAX);
        let before = skill.level;
        skill.level = skill.level.saturating_add(amount).min(def.max_level);
        if fund {
            skill.funded_level = (skill.funded_level + skill.level - before).min(skill.level);
        }
        skill.level
    }

    /// Lowers the level to `target`, never below the highest grant or zero.
    fn lower_level(&mut self, key: &SkillKey, target: i32) -> i32 {
        let Some(skill) = self.progress.skills.get_mut(key) else {
            return 0;
        };
        skill.level = target.max(skill.max_grant()).max(0).min(skill.level);
        skill.funded_level = skill.funded_level.min(skill.level);
        skill.level
    }

    /// Records level change events and settles auto-levelling on unlock.
    fn level_changed(&mut self, key: &SkillKey, from: i32, to: i32) {
        if to > from {
            self.record(ProgressionEvent::SkillUpgraded {
                actor: self.actor,
                skill: key.clone(),
                level: to,
            });
        } else if to < from {
            self.record(ProgressionEvent::SkillDowngraded {
                actor: self.actor,
                skill: key.clone(),
                level: to,
            });
        }
        if from == 0 && to > 0 {
            self.record(ProgressionEvent::SkillUnlocked {
                actor: self.actor,
                skill: key.clone(),
            });
            self.settle_auto_levels();
        }
    }

    /// Auto-levels every skill until a pass unlocks nothing new.
    pub(super) fn settle_auto_levels(&mut self) {
        loop {
            let keys: Vec<_> = self.progress.skills.keys().cloned().collect();
            let mut unlocked = false;
            for key in &keys {
                unlocked |= self.auto_level(key);
            }
            if !unlocked {
                break;
            }
        }
    }

    /// Force-upgrades one skill level by level while the next level is free
    /// and reachable. Stops as soon as a step makes no progress. Returns
    /// whether the skill was unlocked along the way.
    fn auto_level(&mut self, key: &SkillKey) -> bool {
        let skills = self.env.skills;
        let Some(def) = skills.skill(key) else {
            return false;
        };
        let mut unlocked = false;
        loop {
            let Some(skill) = self.progress.skills.get(key) else {
                break;
            };
            let level = skill.level;
            let owner = skill.class.clone();
            if level >= def.max_level
                || !def.can_auto_level(level)
                || def.level_requirement_at(level) > self.owner_level(owner.as_ref())
            {
                break;
            }

            let new_level = self.raise_level(key, def, 1, true);
            if new_level == level {
                break;
            }
            self.record(ProgressionEvent::SkillUpgraded {
                actor: self.actor,
                skill: key.clone(),
                level: new_level,
            });
            if level == 0 {
                self.record(ProgressionEvent::SkillUnlocked {
                    actor: self.actor,
                    skill: key.clone(),
                });
                unlocked = true;
            }
        }
        unlocked
    }
}
