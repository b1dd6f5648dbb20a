use super::{ClassGroup, GrantSource, SkillKey, Tick};

/// Level granted to a skill by an external source (item, buff, quest).
///
/// Granted levels are free and never refunded.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExternalGrant {
    pub source: GrantSource,
    pub level: i32,
}

/// Per-actor state of one skill.
///
/// Invariants:
/// - `level >= max(grants.level)` whenever grants exist
/// - `funded_level <= level`; it counts the levels held by the player (paid,
///   forced or auto-levelled) and is the level the skill falls back to once
///   every grant is gone
/// - `invested_cost` only counts points paid from a class budget
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillState {
    pub key: SkillKey,
    /// Group whose class budget funds upgrades; `None` for skills that only
    /// exist through external grants.
    pub class: Option<ClassGroup>,
    pub level: i32,
    pub funded_level: i32,
    pub invested_cost: i64,
    pub grants: Vec<ExternalGrant>,
    pub cooldown_until: Option<Tick>,
}

impl SkillState {
    pub fn locked(key: SkillKey, class: Option<ClassGroup>) -> Self {
        Self {
            key,
            class,
            level: 0,
            funded_level: 0,
            invested_cost: 0,
            grants: Vec::new(),
            cooldown_until: None,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.level > 0
    }

    /// Highest externally granted level, zero without grants.
    pub fn max_grant(&self) -> i32 {
        self.grants.iter().map(|g| g.level).max().unwrap_or(0)
    }

    /// Replaces any grant from the same source.
    pub fn put_grant(&mut self, source: GrantSource, level: i32) {
        self.grants.retain(|g| g.source != source);
        self.grants.push(ExternalGrant { source, level });
    }

    /// Removes the grant from `source`. Returns whether one existed.
    pub fn take_grant(&mut self, source: &GrantSource) -> bool {
        let before = self.grants.len();
        self.grants.retain(|g| &g.source != source);
        before != self.grants.len()
    }

    /// Ticks left on the cooldown at `now`, zero when ready.
    pub fn cooldown_remaining(&self, now: Tick) -> u64 {
        self.cooldown_until.map_or(0, |until| now.until(until))
    }

    pub fn is_on_cooldown(&self, now: Tick) -> bool {
        self.cooldown_remaining(now) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_from_the_same_source_replace_each_other() {
        let mut skill = SkillState::locked("fireball".into(), None);
        skill.put_grant("items:ring".into(), 2);
        skill.put_grant("items:ring".into(), 4);
        skill.put_grant("quest:intro".into(), 1);

        assert_eq!(skill.grants.len(), 2);
        assert_eq!(skill.max_grant(), 4);
        assert!(skill.take_grant(&"items:ring".into()));
        assert!(!skill.take_grant(&"items:ring".into()));
        assert_eq!(skill.max_grant(), 1);
    }

    #[test]
    fn cooldown_counts_down_to_zero() {
        let mut skill = SkillState::locked("fireball".into(), None);
        skill.cooldown_until = Some(Tick(30));
        assert_eq!(skill.cooldown_remaining(Tick(10)), 20);
        assert!(!skill.is_on_cooldown(Tick(30)));
    }
}
