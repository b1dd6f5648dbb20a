//! Derived stat computation.
//!
//! ```text
//! class contributions ─► attribute scaling (total > 0) ─► stat modifiers ─► clamp
//! ```
//!
//! [`StatPipeline`] evaluates the chain above for every [`StatKey`] and writes
//! the results to the host through an [`ActorAdapter`]. The pipeline is
//! idempotent: recomputing twice without a state change issues the same writes.
mod hunger;
mod pipeline;

pub use hunger::subtract_hunger;
pub use pipeline::{RecomputeOutcome, StatPipeline};

use crate::modifier::StatBounds;
use crate::state::ResourcePool;

/// Stats the pipeline derives or scales.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum StatKey {
    Health,
    Mana,
    ManaRegen,
    MoveSpeed,
    AttackSpeed,
    Armor,
    ArmorToughness,
    Luck,
    KnockbackResist,
    /// Divisor applied to hunger drain.
    Hunger,
    /// Multiplier applied to experience gains.
    Experience,
}

impl StatKey {
    /// Stats owned by the host actor model, scaled from the host's base value.
    pub const HOST_STATS: [StatKey; 6] = [
        StatKey::MoveSpeed,
        StatKey::AttackSpeed,
        StatKey::Armor,
        StatKey::ArmorToughness,
        StatKey::Luck,
        StatKey::KnockbackResist,
    ];

    pub fn bounds(self) -> StatBounds {
        match self {
            StatKey::AttackSpeed => StatBounds::new(0.0, 1024.0),
            StatKey::Armor => StatBounds::new(0.0, 30.0),
            StatKey::ArmorToughness => StatBounds::new(0.0, 20.0),
            StatKey::Luck => StatBounds::new(-1024.0, 1024.0),
            StatKey::KnockbackResist => StatBounds::new(0.0, 1.0),
            StatKey::Health
            | StatKey::Mana
            | StatKey::ManaRegen
            | StatKey::MoveSpeed
            | StatKey::Hunger
            | StatKey::Experience => StatBounds::NON_NEGATIVE,
        }
    }

    /// Base value used when the host does not report one.
    pub fn default_base(self) -> f64 {
        match self {
            StatKey::MoveSpeed => 0.2,
            StatKey::AttackSpeed => 4.0,
            _ => 0.0,
        }
    }
}

impl TryFrom<String> for StatKey {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.trim()
            .parse()
            .map_err(|_| format!("unknown stat `{raw}`"))
    }
}

impl From<StatKey> for String {
    fn from(stat: StatKey) -> String {
        let name: &'static str = stat.into();
        name.to_owned()
    }
}

/// Last values written to the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedStats {
    pub health: f64,
    pub mana: f64,
    pub mana_regen: f64,
    pub move_speed: f64,
    pub attack_speed: f64,
    pub armor: f64,
    pub armor_toughness: f64,
    pub luck: f64,
    pub knockback_resist: f64,
}

impl DerivedStats {
    pub fn get(&self, stat: StatKey) -> Option<f64> {
        match stat {
            StatKey::Health => Some(self.health),
            StatKey::Mana => Some(self.mana),
            StatKey::ManaRegen => Some(self.mana_regen),
            StatKey::MoveSpeed => Some(self.move_speed),
            StatKey::AttackSpeed => Some(self.attack_speed),
            StatKey::Armor => Some(self.armor),
            StatKey::ArmorToughness => Some(self.armor_toughness),
            StatKey::Luck => Some(self.luck),
            StatKey::KnockbackResist => Some(self.knockback_resist),
            StatKey::Hunger | StatKey::Experience => None,
        }
    }

    fn set(&mut self, stat: StatKey, value: f64) {
        match stat {
            StatKey::Health => self.health = value,
            StatKey::Mana => self.mana = value,
            StatKey::ManaRegen => self.mana_regen = value,
            StatKey::MoveSpeed => self.move_speed = value,
            StatKey::AttackSpeed => self.attack_speed = value,
            StatKey::Armor => self.armor = value,
            StatKey::ArmorToughness => self.armor_toughness = value,
            StatKey::Luck => self.luck = value,
            StatKey::KnockbackResist => self.knockback_resist = value,
            StatKey::Hunger | StatKey::Experience => {}
        }
    }

    /// Every written stat with its value, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (StatKey, f64)> + '_ {
        use strum::IntoEnumIterator;
        StatKey::iter().filter_map(|stat| self.get(stat).map(|value| (stat, value)))
    }
}

/// Write side of the host actor model.
pub trait ActorAdapter {
    /// Host base value of a stat before scaling, `None` to use the default.
    fn base_value(&self, stat: StatKey) -> Option<f64> {
        let _ = stat;
        None
    }

    fn write_stat(&mut self, stat: StatKey, value: f64);

    fn write_resource_pool(&mut self, pool: ResourcePool);
}

/// Adapter that discards every write, for actors not present in the world.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedActor;

impl ActorAdapter for DetachedActor {
    fn write_stat(&mut self, _stat: StatKey, _value: f64) {}

    fn write_resource_pool(&mut self, _pool: ResourcePool) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_keys_parse_case_insensitively() {
        assert_eq!("Move-Speed".parse::<StatKey>().ok(), Some(StatKey::MoveSpeed));
        assert_eq!(StatKey::KnockbackResist.to_string(), "knockback-resist");
        assert!(StatKey::try_from("stamina".to_owned()).is_err());
    }

    #[test]
    fn unknown_stat_names_are_reported() {
        assert_eq!(StatKey::try_from(" Armor ".to_owned()), Ok(StatKey::Armor));
        assert_eq!(
            StatKey::try_from("stamina".to_owned()),
            Err("unknown stat `stamina`".to_owned())
        );
    }

    #[test]
    fn entries_skip_scaling_only_stats() {
        let stats = DerivedStats {
            health: 20.0,
            ..DerivedStats::default()
        };
        let keys: Vec<_> = stats.entries().map(|(stat, _)| stat).collect();
        assert_eq!(keys.len(), 9);
        assert!(!keys.contains(&StatKey::Hunger));
    }
}
