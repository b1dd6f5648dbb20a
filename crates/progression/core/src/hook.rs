//! Pre-commit veto hook.
//!
//! Every mutating operation that third parties may cancel is structured as
//! `compute tentative state → ask the hook → commit or roll back`. The hook
//! sees the tentative change through a [`Transaction`] descriptor and answers
//! with a [`Verdict`]; on [`Verdict::Deny`] the caller restores every field it
//! touched before returning [`crate::ProgressionError::Vetoed`].

use crate::state::{ActorHandle, AttributeKey, ClassId, SkillKey};

/// Descriptor of a tentative, not yet committed mutation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Transaction {
    AttributeUpgrade {
        actor: ActorHandle,
        attribute: AttributeKey,
        stage: i32,
        cost: i64,
    },
    AttributeRefund {
        actor: ActorHandle,
        attribute: AttributeKey,
        stage: i32,
        credit: i64,
    },
    SkillUpgrade {
        actor: ActorHandle,
        skill: SkillKey,
        level: i32,
        cost: i64,
    },
    SkillDowngrade {
        actor: ActorHandle,
        skill: SkillKey,
        level: i32,
        refund: i64,
    },
    Profess {
        actor: ActorHandle,
        class: ClassId,
        previous: Option<ClassId>,
    },
    Cast {
        actor: ActorHandle,
        skill: SkillKey,
        level: i32,
        resource_cost: f64,
    },
}

impl Transaction {
    pub fn actor(&self) -> ActorHandle {
        match self {
            Self::AttributeUpgrade { actor, .. }
            | Self::AttributeRefund { actor, .. }
            | Self::SkillUpgrade { actor, .. }
            | Self::SkillDowngrade { actor, .. }
            | Self::Profess { actor, .. }
            | Self::Cast { actor, .. } => *actor,
        }
    }

    /// Short label used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AttributeUpgrade { .. } => "attribute_upgrade",
            Self::AttributeRefund { .. } => "attribute_refund",
            Self::SkillUpgrade { .. } => "skill_upgrade",
            Self::SkillDowngrade { .. } => "skill_downgrade",
            Self::Profess { .. } => "profess",
            Self::Cast { .. } => "cast",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verdict {
    Allow,
    Deny,
}

impl Verdict {
    pub fn is_denied(self) -> bool {
        self == Verdict::Deny
    }
}

/// External policy consulted after a tentative mutation and before commit.
pub trait CommitHook {
    fn before_commit(&mut self, transaction: &Transaction) -> Verdict;
}

/// Hook that approves every transaction.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl CommitHook for AllowAll {
    fn before_commit(&mut self, _transaction: &Transaction) -> Verdict {
        Verdict::Allow
    }
}

impl<F> CommitHook for F
where
    F: FnMut(&Transaction) -> Verdict,
{
    fn before_commit(&mut self, transaction: &Transaction) -> Verdict {
        self(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cast(resource_cost: f64) -> Transaction {
        Transaction::Cast {
            actor: ActorHandle(7),
            skill: "fireball".into(),
            level: 2,
            resource_cost,
        }
    }

    #[test]
    fn cast_transactions_compare_by_cost() {
        assert_eq!(cast(12.5), cast(12.5));
        assert_ne!(cast(12.5), cast(10.0));
        assert_eq!(cast(12.5).actor(), ActorHandle(7));
        assert_eq!(cast(12.5).label(), "cast");
    }

    #[test]
    fn closures_act_as_hooks() {
        let mut cheap_only = |transaction: &Transaction| match transaction {
            Transaction::Cast { resource_cost, .. } if *resource_cost > 10.0 => Verdict::Deny,
            _ => Verdict::Allow,
        };

        assert!(cheap_only.before_commit(&cast(12.5)).is_denied());
        assert!(!cheap_only.before_commit(&cast(5.0)).is_denied());
        assert!(!AllowAll.before_commit(&cast(99.0)).is_denied());
    }
}
