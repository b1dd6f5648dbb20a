//! Priority-ordered registry of veto policies.

use std::sync::Arc;

use progression_core::{CommitHook, Transaction, Verdict};
use tracing::{trace, warn};

use super::VetoPolicy;

/// Registry that evaluates veto policies in priority order.
///
/// A transaction is denied as soon as one policy denies it; an empty registry
/// allows everything.
#[derive(Clone, Default)]
pub struct VetoRegistry {
    policies: Vec<Arc<dyn VetoPolicy>>,
}

impl VetoRegistry {
    /// Creates a registry; policies are sorted by priority.
    pub fn new(mut policies: Vec<Arc<dyn VetoPolicy>>) -> Self {
        policies.sort_by_key(|p| p.priority());
        Self { policies }
    }

    /// Adds a policy, keeping priority order. Policies of equal priority run
    /// in registration order.
    pub fn register(&mut self, policy: Arc<dyn VetoPolicy>) {
        let at = self
            .policies
            .partition_point(|existing| existing.priority() <= policy.priority());
        self.policies.insert(at, policy);
    }

    /// Removes every policy named `name`. Returns how many were removed.
    pub fn unregister(&mut self, name: &str) -> usize {
        let before = self.policies.len();
        self.policies.retain(|policy| policy.name() != name);
        before - self.policies.len()
    }

    /// Evaluates `transaction` against every policy in order.
    pub fn evaluate(&self, transaction: &Transaction) -> Verdict {
        for policy in self.policies.iter() {
            if policy.evaluate(transaction).is_denied() {
                warn!(
                    policy = policy.name(),
                    actor = %transaction.actor(),
                    transaction = transaction.label(),
                    "transaction vetoed"
                );
                return Verdict::Deny;
            }
        }
        trace!(transaction = transaction.label(), "transaction allowed");
        Verdict::Allow
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.policies.iter().map(|policy| policy.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl CommitHook for VetoRegistry {
    fn before_commit(&mut self, transaction: &Transaction) -> Verdict {
        self.evaluate(transaction)
    }
}

impl std::fmt::Debug for VetoRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VetoRegistry")
            .field("policies", &self.names())
            .finish()
    }
}
