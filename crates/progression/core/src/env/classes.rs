use std::collections::BTreeMap;

use super::ScaledValue;
use crate::state::{AttributeKey, ClassGroup, ClassId, SkillKey};

pub trait ClassOracle: Send + Sync {
    fn class(&self, id: &ClassId) -> Option<&ClassDefinition>;

    /// Settings of a group. Unknown groups fall back to the defaults.
    fn group(&self, group: &ClassGroup) -> GroupSettings;
}

/// Static definition of a class (profession).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassDefinition {
    pub id: ClassId,
    pub name: String,
    pub group: ClassGroup,
    /// Class this one upgrades from once the parent reaches its max level.
    #[cfg_attr(feature = "serde", serde(default))]
    pub parent: Option<ClassId>,
    pub max_level: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub health: ScaledValue,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mana: ScaledValue,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mana_regen: ScaledValue,
    /// Base attribute contributions per class level.
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: BTreeMap<AttributeKey, ScaledValue>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills: Vec<SkillKey>,
    /// Experience needed to go from level `n` to `n + 1` is `exp_curve.at(n)`.
    pub exp_curve: ScaledValue,
    #[cfg_attr(feature = "serde", serde(default))]
    pub points_per_level: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub attribute_points_per_level: i64,
}

impl ClassDefinition {
    pub fn new(id: impl Into<ClassId>, group: impl Into<ClassGroup>, max_level: i32) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            group: group.into(),
            parent: None,
            max_level,
            health: ScaledValue::ZERO,
            mana: ScaledValue::ZERO,
            mana_regen: ScaledValue::ZERO,
            attributes: BTreeMap::new(),
            skills: Vec::new(),
            exp_curve: ScaledValue::new(100.0, 0.0),
            points_per_level: 1,
            attribute_points_per_level: 1,
        }
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    pub fn attribute_at(&self, key: &AttributeKey, level: i32) -> f64 {
        self.attributes.get(key).map_or(0.0, |value| value.at(level))
    }

    /// Experience required to leave `level`, never below one.
    pub fn required_exp(&self, level: i32) -> f64 {
        self.exp_curve.at(level).max(1.0)
    }
}

/// Per-group rules applied when professing and resetting.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GroupSettings {
    pub group: ClassGroup,
    pub starting_points: i64,
    pub starting_attribute_points: i64,
    /// Professing into a subclass starts from a fresh class record.
    pub profess_reset: bool,
    /// Refund invested skill points when resetting into a subclass.
    pub refund_skills_on_reset: bool,
    /// Refund invested attribute points when resetting into a subclass.
    pub refund_attributes_on_reset: bool,
}

impl GroupSettings {
    pub fn new(group: impl Into<ClassGroup>) -> Self {
        Self {
            group: group.into(),
            ..Self::default()
        }
    }
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            group: ClassGroup::new("class"),
            starting_points: 1,
            starting_attribute_points: 1,
            profess_reset: false,
            refund_skills_on_reset: false,
            refund_attributes_on_reset: false,
        }
    }
}
