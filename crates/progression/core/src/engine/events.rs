use crate::cast::CastFailure;
use crate::state::{ActorHandle, AttributeKey, ClassGroup, ClassId, SkillKey};
use crate::stats::DerivedStats;

/// Externally observable outcome of an engine operation.
///
/// Events are recorded in the order the changes were committed and drained by
/// the host after the call returns.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProgressionEvent {
    AttributeUpgraded {
        actor: ActorHandle,
        attribute: AttributeKey,
        stage: i32,
        cost: i64,
    },
    AttributeRefunded {
        actor: ActorHandle,
        attribute: AttributeKey,
        stage: i32,
        credit: i64,
    },
    SkillUnlocked {
        actor: ActorHandle,
        skill: SkillKey,
    },
    SkillUpgraded {
        actor: ActorHandle,
        skill: SkillKey,
        level: i32,
    },
    SkillDowngraded {
        actor: ActorHandle,
        skill: SkillKey,
        level: i32,
    },
    ClassProfessed {
        actor: ActorHandle,
        class: ClassId,
        group: ClassGroup,
    },
    ClassReset {
        actor: ActorHandle,
        group: ClassGroup,
    },
    LevelUp {
        actor: ActorHandle,
        group: ClassGroup,
        level: i32,
    },
    SkillCast {
        actor: ActorHandle,
        skill: SkillKey,
        level: i32,
        resource_cost: f64,
    },
    CastFailed {
        actor: ActorHandle,
        skill: SkillKey,
        reason: CastFailure,
    },
    DerivedStatsChanged {
        actor: ActorHandle,
        stats: DerivedStats,
    },
}

impl ProgressionEvent {
    pub fn actor(&self) -> ActorHandle {
        match self {
            Self::AttributeUpgraded { actor, .. }
            | Self::AttributeRefunded { actor, .. }
            | Self::SkillUnlocked { actor, .. }
            | Self::SkillUpgraded { actor, .. }
            | Self::SkillDowngraded { actor, .. }
            | Self::ClassProfessed { actor, .. }
            | Self::ClassReset { actor, .. }
            | Self::LevelUp { actor, .. }
            | Self::SkillCast { actor, .. }
            | Self::CastFailed { actor, .. }
            | Self::DerivedStatsChanged { actor, .. } => *actor,
        }
    }

    pub fn is_stats_change(&self) -> bool {
        matches!(self, Self::DerivedStatsChanged { .. })
    }

    pub fn is_cast(&self) -> bool {
        matches!(self, Self::SkillCast { .. } | Self::CastFailed { .. })
    }
}
