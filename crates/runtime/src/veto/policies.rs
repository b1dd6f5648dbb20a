//! Ready-made veto policies.

use std::collections::BTreeSet;
use std::sync::RwLock;

use progression_core::{SkillKey, Transaction, Verdict};

use super::VetoPolicy;

/// Blocks casting and upgrading of locked skills, e.g. while an actor is
/// silenced or a skill is disabled on a server.
#[derive(Debug, Default)]
pub struct SkillLock {
    locked: RwLock<BTreeSet<SkillKey>>,
}

impl SkillLock {
    pub fn new(skills: impl IntoIterator<Item = SkillKey>) -> Self {
        Self {
            locked: RwLock::new(skills.into_iter().collect()),
        }
    }

    /// Returns whether the skill was newly locked.
    pub fn lock(&self, skill: SkillKey) -> bool {
        self.locked
            .write()
            .map(|mut locked| locked.insert(skill))
            .unwrap_or(false)
    }

    pub fn unlock(&self, skill: &SkillKey) -> bool {
        self.locked
            .write()
            .map(|mut locked| locked.remove(skill))
            .unwrap_or(false)
    }

    pub fn is_locked(&self, skill: &SkillKey) -> bool {
        self.locked
            .read()
            .map(|locked| locked.contains(skill))
            .unwrap_or(false)
    }
}

impl VetoPolicy for SkillLock {
    fn name(&self) -> &'static str {
        "skill_lock"
    }

    fn evaluate(&self, transaction: &Transaction) -> Verdict {
        match transaction {
            Transaction::Cast { skill, .. } | Transaction::SkillUpgrade { skill, .. }
                if self.is_locked(skill) =>
            {
                Verdict::Deny
            }
            _ => Verdict::Allow,
        }
    }
}

/// Policy backed by a closure.
pub struct VetoFn<F> {
    name: &'static str,
    priority: i32,
    evaluate: F,
}

impl<F> VetoFn<F>
where
    F: Fn(&Transaction) -> Verdict + Send + Sync,
{
    pub fn new(name: &'static str, evaluate: F) -> Self {
        Self {
            name,
            priority: 0,
            evaluate,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl<F> VetoPolicy for VetoFn<F>
where
    F: Fn(&Transaction) -> Verdict + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn evaluate(&self, transaction: &Transaction) -> Verdict {
        (self.evaluate)(transaction)
    }
}
