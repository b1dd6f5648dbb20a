use tracing::trace;

use super::{ActorAdapter, DerivedStats, StatKey};
use crate::env::{ProgressionEnv, ProgressionView};
use crate::modifier::StatBounds;
use crate::state::{ActorProgress, AttributeKey, ClassGroup, SkillKey};

/// Read-only evaluator of an actor's totals.
///
/// Also serves as the [`ProgressionView`] handed to eligibility predicates, so
/// requirement checks and stat scaling always see the same attribute totals.
#[derive(Clone, Copy, Debug)]
pub struct StatPipeline<'a> {
    progress: &'a ActorProgress,
    env: ProgressionEnv<'a>,
}

/// Result of [`StatPipeline::recompute`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecomputeOutcome {
    pub derived: DerivedStats,
    /// Whether the values differ from the previous recompute.
    pub changed: bool,
}

impl<'a> StatPipeline<'a> {
    pub fn new(progress: &'a ActorProgress, env: ProgressionEnv<'a>) -> Self {
        Self { progress, env }
    }

    /// Sum of every professed class's base contribution to `key`.
    pub fn class_base(&self, key: &AttributeKey) -> f64 {
        self.progress
            .classes
            .values()
            .filter_map(|state| {
                self.env
                    .classes
                    .class(&state.class)
                    .map(|def| def.attribute_at(key, state.level))
            })
            .sum()
    }

    /// Class base + bought stages + attribute modifiers, rounded, never negative.
    pub fn attribute_total(&self, key: &AttributeKey) -> i32 {
        self.progress.ledger.effective_total(
            key,
            self.class_base(key),
            &self.progress.modifiers.attributes,
        )
    }

    /// Scales `value` through every attribute with a positive total, then the
    /// stat modifier stack, then clamps to `bounds`.
    pub fn scale_stat(&self, stat: StatKey, value: f64, bounds: StatBounds) -> f64 {
        let scaled = self
            .env
            .attributes
            .attributes()
            .into_iter()
            .fold(value, |acc, def| {
                def.modify_stat(stat, acc, self.attribute_total(&def.key))
            });
        self.progress.modifiers.stats.resolve(&stat, scaled, bounds)
    }

    /// Computes every derived stat without touching the host.
    ///
    /// Actors without a professed class get the configured default health and
    /// zero for everything else; [`StatPipeline::recompute`] only writes their
    /// health to the host.
    pub fn derive(&self, actor: &dyn ActorAdapter) -> DerivedStats {
        if !self.progress.has_class() {
            return DerivedStats {
                health: self.env.config.default_health,
                ..DerivedStats::default()
            };
        }

        let (health, mana, regen) = self
            .progress
            .classes
            .values()
            .filter_map(|state| {
                self.env
                    .classes
                    .class(&state.class)
                    .map(|def| (def, state.level))
            })
            .fold((0.0, 0.0, 0.0), |(h, m, r), (def, level)| {
                (
                    h + def.health.at(level),
                    m + def.mana.at(level),
                    r + def.mana_regen.at(level),
                )
            });

        let mut derived = DerivedStats {
            health: self.scale_stat(StatKey::Health, health, StatKey::Health.bounds()),
            ..DerivedStats::default()
        };
        if self.env.config.mana_enabled {
            derived.mana = self.scale_stat(StatKey::Mana, mana, StatKey::Mana.bounds());
            derived.mana_regen = self.scale_stat(StatKey::ManaRegen, regen, StatKey::ManaRegen.bounds());
        }
        for stat in StatKey::HOST_STATS {
            let base = actor.base_value(stat).unwrap_or_else(|| stat.default_base());
            derived.set(stat, self.scale_stat(stat, base, stat.bounds()));
        }
        derived
    }

    /// Recomputes derived stats, clamps the resource pool to its new maximum
    /// and writes everything to `actor`.
    ///
    /// A classless actor only gets its health written; host stats such as
    /// movement speed and armor stay whatever the host set.
    pub fn recompute(
        progress: &mut ActorProgress,
        env: ProgressionEnv<'_>,
        actor: &mut dyn ActorAdapter,
    ) -> RecomputeOutcome {
        let derived = StatPipeline::new(progress, env).derive(actor);

        if progress.has_class() {
            for (stat, value) in derived.entries() {
                actor.write_stat(stat, value);
            }
            progress.mana.set_max(derived.mana);
            actor.write_resource_pool(progress.mana);
        } else {
            actor.write_stat(StatKey::Health, derived.health);
            progress.mana.set_max(0.0);
        }

        let changed = progress.derived != derived;
        progress.derived = derived;
        trace!(changed, health = derived.health, mana = derived.mana, "derived stats recomputed");
        RecomputeOutcome { derived, changed }
    }
}

impl ProgressionView for StatPipeline<'_> {
    fn class_level(&self, group: &ClassGroup) -> Option<i32> {
        self.progress.class(group).map(|class| class.level)
    }

    fn highest_class_level(&self) -> i32 {
        self.progress
            .classes
            .values()
            .map(|class| class.level)
            .max()
            .unwrap_or(0)
    }

    fn skill_level(&self, skill: &SkillKey) -> i32 {
        self.progress.skill_level(skill)
    }

    fn attribute_total(&self, key: &AttributeKey) -> i32 {
        StatPipeline::attribute_total(self, key)
    }

    fn invested_skill_points(&self) -> i64 {
        self.progress.invested_skill_points()
    }
}
