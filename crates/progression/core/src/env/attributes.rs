use std::collections::BTreeMap;

use crate::state::AttributeKey;
use crate::stats::StatKey;

pub trait AttributeOracle: Send + Sync {
    fn attribute(&self, key: &AttributeKey) -> Option<&AttributeDefinition>;

    /// Every attribute in definition order.
    fn attributes(&self) -> Vec<&AttributeDefinition>;
}

/// How an attribute's effective total feeds into a stat.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatScaling {
    /// `value + per_point × total`
    Add { per_point: f64 },
    /// `value × (1 + per_point × total)`
    Percent { per_point: f64 },
}

impl StatScaling {
    pub fn apply(&self, value: f64, total: i32) -> f64 {
        let total = f64::from(total);
        match self {
            StatScaling::Add { per_point } => value + per_point * total,
            StatScaling::Percent { per_point } => value * (1.0 + per_point * total),
        }
    }
}

/// Cost table and stat contributions of one attribute.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeDefinition {
    pub key: AttributeKey,
    pub name: String,
    pub cost_base: i64,
    pub cost_modifier: f64,
    pub max_stage: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub stat_scaling: BTreeMap<StatKey, StatScaling>,
}

impl AttributeDefinition {
    pub fn new(key: impl Into<AttributeKey>, cost_base: i64, cost_modifier: f64, max_stage: i32) -> Self {
        let key = key.into();
        Self {
            name: key.to_string(),
            key,
            cost_base,
            cost_modifier,
            max_stage,
            stat_scaling: BTreeMap::new(),
        }
    }

    pub fn with_scaling(mut self, stat: StatKey, scaling: StatScaling) -> Self {
        self.stat_scaling.insert(stat, scaling);
        self
    }

    /// Price of the step that enters `stage`:
    /// `max(0, cost_base + floor(stage × cost_modifier))`.
    pub fn step_cost(&self, stage: i32) -> i64 {
        let scaled = (f64::from(stage) * self.cost_modifier).floor() as i64;
        (self.cost_base + scaled).max(0)
    }

    /// Price of the stage range `[from, to)`: `step_cost(from) + … + step_cost(to - 1)`.
    ///
    /// This is the range pricing used for granted stages and refund totals, one
    /// step below the single-step upgrade price of [`Self::step_cost`] at
    /// `stage + 1`. Moving down yields the negated cost of the matching upward
    /// move, so `cost_between(a, b) == -cost_between(b, a)` and
    /// `cost_between(a, a) == 0`.
    pub fn cost_between(&self, from: i32, to: i32) -> i64 {
        if from <= to {
            (from..to).map(|stage| self.step_cost(stage)).sum()
        } else {
            -self.cost_between(to, from)
        }
    }

    /// Contribution of this attribute to `stat` given its effective total.
    ///
    /// Non-positive totals contribute nothing.
    pub fn modify_stat(&self, stat: StatKey, value: f64, total: i32) -> f64 {
        match self.stat_scaling.get(&stat) {
            Some(scaling) if total > 0 => scaling.apply(value, total),
            _ => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strength() -> AttributeDefinition {
        AttributeDefinition::new("strength", 2, 1.0, 5)
    }

    #[test]
    fn step_cost_follows_stage() {
        let def = strength();
        assert_eq!(def.step_cost(1), 3);
        assert_eq!(def.step_cost(2), 4);
        assert_eq!(def.step_cost(3), 5);
    }

    #[test]
    fn step_cost_never_negative() {
        let def = AttributeDefinition::new("curse", -10, 0.5, 5);
        assert_eq!(def.step_cost(1), 0);
    }

    #[test]
    fn range_cost_is_antisymmetric() {
        let def = strength();
        assert_eq!(def.cost_between(2, 2), 0);
        assert_eq!(def.cost_between(2, 5), 4 + 5 + 6);
        assert_eq!(def.cost_between(0, 1), 2);
        assert_eq!(def.cost_between(5, 2), -def.cost_between(2, 5));
    }

    #[test]
    fn scaling_ignores_non_positive_totals() {
        let def = strength().with_scaling(StatKey::Health, StatScaling::Add { per_point: 2.0 });
        assert_eq!(def.modify_stat(StatKey::Health, 20.0, 3), 26.0);
        assert_eq!(def.modify_stat(StatKey::Health, 20.0, 0), 20.0);
        assert_eq!(def.modify_stat(StatKey::Mana, 20.0, 3), 20.0);
    }
}
