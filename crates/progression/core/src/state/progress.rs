use std::collections::BTreeMap;

use super::{AttributeKey, ClassGroup, ClassState, ResourcePool, SkillKey, SkillState};
use crate::config::ProgressionConfig;
use crate::ledger::AttributeLedger;
use crate::modifier::{ModifierId, ModifierSpec, ModifierStack};
use crate::schedule::TaskHandle;
use crate::stats::{DerivedStats, StatKey};

/// Which stack a modifier lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierLayer {
    Attribute,
    Stat,
}

/// Identity of a modifier across both of an actor's stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierHandle {
    pub layer: ModifierLayer,
    pub id: ModifierId,
}

/// Attribute and stat modifier stacks of one actor.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorModifiers {
    pub attributes: ModifierStack<AttributeKey>,
    pub stats: ModifierStack<StatKey>,
}

impl ActorModifiers {
    pub fn add_attribute(&mut self, key: AttributeKey, spec: ModifierSpec) -> ModifierHandle {
        ModifierHandle {
            layer: ModifierLayer::Attribute,
            id: self.attributes.add(key, spec),
        }
    }

    pub fn add_stat(&mut self, stat: StatKey, spec: ModifierSpec) -> ModifierHandle {
        ModifierHandle {
            layer: ModifierLayer::Stat,
            id: self.stats.add(stat, spec),
        }
    }

    pub fn remove(&mut self, handle: ModifierHandle) -> bool {
        match handle.layer {
            ModifierLayer::Attribute => self.attributes.remove(handle.id),
            ModifierLayer::Stat => self.stats.remove(handle.id),
        }
    }

    /// Drops every non-persistent modifier from both stacks.
    pub fn clear_non_persistent(&mut self) -> usize {
        self.attributes.clear_non_persistent() + self.stats.clear_non_persistent()
    }
}

/// Cast bookkeeping that is not tied to a single skill.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CastState {
    /// Armed global throttle marker, cleared by its deferred job.
    pub throttle: Option<TaskHandle>,
}

/// Complete progression record of one actor.
///
/// Created empty when the actor joins; classes, skills and ledger entries are
/// added by professing. All mutation goes through
/// [`crate::engine::ProgressionEngine`].
#[derive(Clone, Debug, PartialEq)]
pub struct ActorProgress {
    pub classes: BTreeMap<ClassGroup, ClassState>,
    pub skills: BTreeMap<SkillKey, SkillState>,
    pub ledger: AttributeLedger,
    pub modifiers: ActorModifiers,
    pub mana: ResourcePool,
    pub hunger: f64,
    /// Values written by the last recompute.
    pub derived: DerivedStats,
    pub cast: CastState,
}

impl ActorProgress {
    pub fn new(config: &ProgressionConfig) -> Self {
        Self {
            classes: BTreeMap::new(),
            skills: BTreeMap::new(),
            ledger: AttributeLedger::default(),
            modifiers: ActorModifiers::default(),
            mana: ResourcePool::default(),
            hunger: config.starting_hunger,
            derived: DerivedStats::default(),
            cast: CastState::default(),
        }
    }

    pub fn has_class(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn class(&self, group: &ClassGroup) -> Option<&ClassState> {
        self.classes.get(group)
    }

    pub fn skill(&self, key: &SkillKey) -> Option<&SkillState> {
        self.skills.get(key)
    }

    pub fn skill_level(&self, key: &SkillKey) -> i32 {
        self.skills.get(key).map_or(0, |skill| skill.level)
    }

    /// Total skill points invested across every skill.
    pub fn invested_skill_points(&self) -> i64 {
        self.skills.values().map(|skill| skill.invested_cost).sum()
    }

    pub fn is_throttled(&self) -> bool {
        self.cast.throttle.is_some()
    }
}
