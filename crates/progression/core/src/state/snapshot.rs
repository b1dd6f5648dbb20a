use std::collections::BTreeMap;

use super::{
    ActorProgress, AttributeKey, ClassGroup, ClassState, ResourcePool, SkillKey, SkillState, Tick,
};
use crate::env::ProgressionEnv;
use crate::ledger::{AttributeLedger, LedgerEntry};

/// Persisted state of one skill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillSnapshot {
    /// Player-funded level. Granted levels are re-applied by their sources.
    pub level: i32,
    /// Points paid into the skill, kept as-is so a refund after restore
    /// returns exactly what was spent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub invested_cost: i64,
    pub cooldown_remaining: u64,
}

/// Storage layout of an actor's progression.
///
/// Modifiers, timed effects and external grants are runtime state owned by
/// their sources and are not part of the snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProgressSnapshot {
    pub classes: BTreeMap<ClassGroup, ClassState>,
    pub skills: BTreeMap<SkillKey, SkillSnapshot>,
    pub attributes: BTreeMap<AttributeKey, LedgerEntry>,
    pub attribute_points: i64,
    pub mana: f64,
    pub hunger: f64,
}

impl ActorProgress {
    /// Captures the persisted fields. Cooldowns are stored as ticks remaining
    /// at `now`.
    pub fn snapshot(&self, now: Tick) -> ProgressSnapshot {
        ProgressSnapshot {
            classes: self.classes.clone(),
            skills: self
                .skills
                .iter()
                .filter(|(_, skill)| skill.funded_level > 0 || skill.is_on_cooldown(now))
                .map(|(key, skill)| {
                    (
                        key.clone(),
                        SkillSnapshot {
                            level: skill.funded_level,
                            invested_cost: skill.invested_cost,
                            cooldown_remaining: skill.cooldown_remaining(now),
                        },
                    )
                })
                .collect(),
            attributes: self
                .ledger
                .entries()
                .map(|(key, entry)| (key.clone(), *entry))
                .collect(),
            attribute_points: self.ledger.points(),
            mana: self.mana.current,
            hunger: self.hunger,
        }
    }

    /// Rebuilds a record from a snapshot.
    ///
    /// Skills of every restored class are registered first, then the funded
    /// levels and invested cost are applied as saved. Skills
    /// whose definition disappeared are dropped. Derived stats are left stale
    /// until the caller recomputes.
    pub fn restore(snapshot: &ProgressSnapshot, env: &ProgressionEnv<'_>, now: Tick) -> Self {
        let mut progress = ActorProgress::new(env.config);
        progress.classes = snapshot.classes.clone();
        progress.hunger = snapshot.hunger;
        progress.ledger = AttributeLedger::restore(
            snapshot
                .attributes
                .iter()
                .map(|(key, entry)| (key.clone(), *entry)),
            snapshot.attribute_points,
        );

        for (group, class) in &snapshot.classes {
            let Some(def) = env.classes.class(&class.class) else {
                continue;
            };
            for key in &def.skills {
                progress
                    .skills
                    .entry(key.clone())
                    .or_insert_with(|| SkillState::locked(key.clone(), Some(group.clone())));
            }
        }

        for (key, saved) in &snapshot.skills {
            let Some(def) = env.skills.skill(key) else {
                continue;
            };
            let skill = progress
                .skills
                .entry(key.clone())
                .or_insert_with(|| SkillState::locked(key.clone(), None));
            let level = saved.level.clamp(0, def.max_level);
            skill.level = level;
            skill.funded_level = level;
            skill.invested_cost = saved.invested_cost.max(0);
            if saved.cooldown_remaining > 0 {
                skill.cooldown_until = Some(now + saved.cooldown_remaining);
            }
        }

        progress.mana = ResourcePool {
            current: snapshot.mana.max(0.0),
            max: snapshot.mana.max(0.0),
        };
        progress
    }
}
