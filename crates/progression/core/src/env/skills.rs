use super::{Requirement, ScaledValue};
use crate::state::SkillKey;

pub trait SkillOracle: Send + Sync {
    fn skill(&self, key: &SkillKey) -> Option<&SkillDefinition>;

    fn skills(&self) -> Vec<&SkillDefinition>;
}

/// Static definition of a skill.
///
/// Every per-level value is evaluated at the skill's *current* level: the
/// cost of going `n → n + 1` is `cost.at(n)`, the resource cost of casting at
/// level `n` is `resource_cost.at(n)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub key: SkillKey,
    pub name: String,
    pub max_level: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub level_requirement: ScaledValue,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: ScaledValue,
    #[cfg_attr(feature = "serde", serde(default))]
    pub resource_cost: ScaledValue,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown_ticks: ScaledValue,
    #[cfg_attr(feature = "serde", serde(default))]
    pub requirements: Vec<Requirement>,
    /// Free levels of this skill advance on their own once reachable.
    #[cfg_attr(feature = "serde", serde(default))]
    pub auto_level: bool,
}

impl SkillDefinition {
    pub fn new(key: impl Into<SkillKey>, max_level: i32) -> Self {
        let key = key.into();
        Self {
            name: key.to_string(),
            key,
            max_level,
            level_requirement: ScaledValue::flat(1.0),
            cost: ScaledValue::flat(1.0),
            resource_cost: ScaledValue::ZERO,
            cooldown_ticks: ScaledValue::ZERO,
            requirements: Vec::new(),
            auto_level: false,
        }
    }

    /// Skill points needed to go from `level` to `level + 1`.
    pub fn cost_at(&self, level: i32) -> i64 {
        self.cost.at_int(level).max(0)
    }

    /// Class level needed to go from `level` to `level + 1`.
    pub fn level_requirement_at(&self, level: i32) -> i32 {
        self.level_requirement.at_int(level).clamp(0, i64::from(i32::MAX)) as i32
    }

    pub fn resource_cost_at(&self, level: i32) -> f64 {
        self.resource_cost.at(level).max(0.0)
    }

    pub fn cooldown_at(&self, level: i32) -> u64 {
        self.cooldown_ticks.at(level).max(0.0) as u64
    }

    /// Whether the level after `level` is granted without player input.
    pub fn can_auto_level(&self, level: i32) -> bool {
        self.auto_level && self.cost_at(level) == 0
    }

    /// Required level of `other` declared by this skill, if any.
    pub fn required_level_of(&self, other: &SkillKey) -> Option<i32> {
        self.requirements.iter().find_map(|req| match req {
            Requirement::Skill { key, level } if key == other => Some(*level),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_level_values_use_current_level() {
        let mut def = SkillDefinition::new("fireball", 3);
        def.cost = ScaledValue::new(1.0, 1.0);
        def.resource_cost = ScaledValue::new(10.0, 5.0);
        def.cooldown_ticks = ScaledValue::new(100.0, -20.0);

        assert_eq!(def.cost_at(0), 1);
        assert_eq!(def.cost_at(2), 3);
        assert_eq!(def.resource_cost_at(1), 15.0);
        assert_eq!(def.cooldown_at(2), 60);
        assert_eq!(def.cooldown_at(10), 0);
    }

    #[test]
    fn only_free_levels_auto_level() {
        let mut def = SkillDefinition::new("passive", 3);
        def.auto_level = true;
        def.cost = ScaledValue::new(0.0, 0.0);
        assert!(def.can_auto_level(0));

        def.cost = ScaledValue::new(0.0, 1.0);
        assert!(def.can_auto_level(0));
        assert!(!def.can_auto_level(1));
    }
}
