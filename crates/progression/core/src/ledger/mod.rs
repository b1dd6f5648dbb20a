//! Attribute investment ledger.
//!
//! The ledger records, per attribute, how many stages were bought and how many
//! points they cost, next to the actor's spendable attribute point budget.
//! Points only move together with the entry they fund: an upgrade debits the
//! budget and credits `invested` by the same amount, a refund does the
//! reverse. Entries at stage zero are removed rather than kept empty.
//!
//! Upgrades and refunds follow the tentative-commit pattern of
//! [`crate::hook`]: the mutation is applied, the hook is consulted, and a
//! denial restores the previous entry and budget exactly.

use std::collections::BTreeMap;

use tracing::debug;

use crate::env::AttributeDefinition;
use crate::error::ProgressionError;
use crate::hook::{CommitHook, Transaction};
use crate::modifier::{ModifierStack, StatBounds};
use crate::state::{ActorHandle, AttributeKey};

/// Invested points and bought stages of one attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedgerEntry {
    pub invested: i64,
    pub stage: i32,
}

/// Result of a committed upgrade or refund.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerReceipt {
    pub attribute: AttributeKey,
    /// Stage after the operation.
    pub stage: i32,
    /// Points moved out of (negative) or into (positive) the budget.
    pub points_delta: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeLedger {
    entries: BTreeMap<AttributeKey, LedgerEntry>,
    points: i64,
}

impl AttributeLedger {
    pub fn new(points: i64) -> Self {
        Self {
            entries: BTreeMap::new(),
            points: points.max(0),
        }
    }

    /// Rebuilds a ledger from persisted entries. Empty entries are dropped.
    pub fn restore(entries: impl IntoIterator<Item = (AttributeKey, LedgerEntry)>, points: i64) -> Self {
        Self {
            entries: entries
                .into_iter()
                .filter(|(_, entry)| entry.stage > 0)
                .collect(),
            points: points.max(0),
        }
    }

    pub fn points(&self) -> i64 {
        self.points
    }

    pub fn stage(&self, key: &AttributeKey) -> i32 {
        self.entries.get(key).map_or(0, |entry| entry.stage)
    }

    pub fn invested(&self, key: &AttributeKey) -> i64 {
        self.entries.get(key).map_or(0, |entry| entry.invested)
    }

    pub fn entry(&self, key: &AttributeKey) -> Option<&LedgerEntry> {
        self.entries.get(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&AttributeKey, &LedgerEntry)> {
        self.entries.iter()
    }

    /// Cost relative to the current stage: `offset = 1` prices the next
    /// upgrade, `offset = 0` prices the stage last paid for.
    pub fn cost(&self, def: &AttributeDefinition, offset: i32) -> i64 {
        def.step_cost(self.stage(&def.key) + offset)
    }

    /// Buys one stage of `def`.
    pub fn upgrade(
        &mut self,
        def: &AttributeDefinition,
        actor: ActorHandle,
        hook: &mut dyn CommitHook,
    ) -> Result<LedgerReceipt, ProgressionError> {
        let before = self.entries.get(&def.key).copied();
        let stage = before.map_or(0, |entry| entry.stage);
        if stage >= def.max_stage {
            return Err(ProgressionError::AtMaximum { max: def.max_stage });
        }

        let cost = def.step_cost(stage + 1);
        if cost > self.points {
            return Err(ProgressionError::InsufficientPoints {
                required: cost,
                available: self.points,
            });
        }

        self.points -= cost;
        let entry = self.entries.entry(def.key.clone()).or_default();
        entry.invested += cost;
        entry.stage += 1;
        let new_stage = entry.stage;

        let transaction = Transaction::AttributeUpgrade {
            actor,
            attribute: def.key.clone(),
            stage: new_stage,
            cost,
        };
        if hook.before_commit(&transaction).is_denied() {
            self.points += cost;
            self.put_back(&def.key, before);
            return Err(ProgressionError::Vetoed);
        }

        debug!(%actor, attribute = %def.key, stage = new_stage, cost, "attribute upgraded");
        Ok(LedgerReceipt {
            attribute: def.key.clone(),
            stage: new_stage,
            points_delta: -cost,
        })
    }

    /// Sells back the last stage of `def`, crediting its price.
    pub fn refund(
        &mut self,
        def: &AttributeDefinition,
        actor: ActorHandle,
        hook: &mut dyn CommitHook,
    ) -> Result<LedgerReceipt, ProgressionError> {
        let Some(before) = self.entries.get(&def.key).copied() else {
            return Err(ProgressionError::AtMinimum);
        };

        let credit = def.step_cost(before.stage);
        let after = LedgerEntry {
            invested: before.invested - credit,
            stage: before.stage - 1,
        };
        self.points += credit;
        self.put_back(&def.key, Some(after));

        let transaction = Transaction::AttributeRefund {
            actor,
            attribute: def.key.clone(),
            stage: after.stage,
            credit,
        };
        if hook.before_commit(&transaction).is_denied() {
            self.points -= credit;
            self.put_back(&def.key, Some(before));
            return Err(ProgressionError::Vetoed);
        }

        debug!(%actor, attribute = %def.key, stage = after.stage, credit, "attribute refunded");
        Ok(LedgerReceipt {
            attribute: def.key.clone(),
            stage: after.stage,
            points_delta: credit,
        })
    }

    /// Drains one entry, crediting everything invested in it. Absent keys
    /// credit nothing.
    pub fn refund_all_of(&mut self, key: &AttributeKey) -> i64 {
        let credit = self.entries.remove(key).map_or(0, |entry| entry.invested);
        self.points += credit;
        credit
    }

    /// Drains every entry. Returns the total credited.
    pub fn refund_all(&mut self) -> i64 {
        let credit: i64 = self.entries.values().map(|entry| entry.invested).sum();
        self.entries.clear();
        self.points += credit;
        credit
    }

    /// Grants up to `amount` stages for free, capped at `max_stage`.
    ///
    /// `invested` grows by the price of the granted range so a later refund
    /// returns what those stages would have cost. Returns the new stage.
    pub fn give(&mut self, def: &AttributeDefinition, amount: i32) -> i32 {
        let current = self.stage(&def.key);
        if amount <= 0 {
            return current;
        }
        let target = current.saturating_add(amount).min(def.max_stage);
        if target <= current {
            return current;
        }
        let entry = self.entries.entry(def.key.clone()).or_default();
        entry.invested += def.cost_between(current, target);
        entry.stage = target;
        target
    }

    /// Clears every entry and replaces the budget.
    pub fn reset(&mut self, starting_points: i64) {
        self.entries.clear();
        self.points = starting_points.max(0);
    }

    pub fn grant_points(&mut self, amount: i64) {
        self.points = (self.points + amount).max(0);
    }

    pub fn set_points(&mut self, points: i64) {
        self.points = points.max(0);
    }

    /// `round(max(0, resolve(class_base + stage)))` through the attribute
    /// modifier stack.
    pub fn effective_total(
        &self,
        key: &AttributeKey,
        class_base: f64,
        modifiers: &ModifierStack<AttributeKey>,
    ) -> i32 {
        let base = class_base + f64::from(self.stage(key));
        modifiers
            .resolve(key, base, StatBounds::NON_NEGATIVE)
            .round()
            .min(f64::from(i32::MAX)) as i32
    }

    fn put_back(&mut self, key: &AttributeKey, entry: Option<LedgerEntry>) {
        match entry {
            Some(entry) if entry.stage > 0 => {
                self.entries.insert(key.clone(), entry);
            }
            _ => {
                self.entries.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::{AllowAll, Verdict};
    use crate::modifier::ModifierSpec;

    const ACTOR: ActorHandle = ActorHandle(1);

    fn strength() -> AttributeDefinition {
        AttributeDefinition::new("strength", 2, 1.0, 5)
    }

    #[test]
    fn third_upgrade_exceeds_budget() {
        let def = strength();
        let mut ledger = AttributeLedger::new(10);

        assert_eq!(ledger.upgrade(&def, ACTOR, &mut AllowAll).map(|r| r.stage), Ok(1));
        assert_eq!(ledger.upgrade(&def, ACTOR, &mut AllowAll).map(|r| r.stage), Ok(2));
        assert_eq!(
            ledger.upgrade(&def, ACTOR, &mut AllowAll),
            Err(ProgressionError::InsufficientPoints {
                required: 5,
                available: 3
            })
        );

        assert_eq!(ledger.stage(&def.key), 2);
        assert_eq!(ledger.invested(&def.key), 7);
        assert_eq!(ledger.points(), 3);
    }

    #[test]
    fn upgrade_then_refund_round_trips() {
        let def = strength();
        let mut ledger = AttributeLedger::new(20);
        ledger.upgrade(&def, ACTOR, &mut AllowAll).ok();
        let before = ledger.clone();

        ledger.upgrade(&def, ACTOR, &mut AllowAll).ok();
        ledger.refund(&def, ACTOR, &mut AllowAll).ok();
        assert_eq!(ledger, before);

        ledger.refund(&def, ACTOR, &mut AllowAll).ok();
        assert_eq!(ledger.entry(&def.key), None);
        assert_eq!(ledger.points(), 20);
    }

    #[test]
    fn invested_tracks_sum_of_paid_costs() {
        let def = strength();
        let mut ledger = AttributeLedger::new(100);
        let mut paid = 0;
        while let Ok(receipt) = ledger.upgrade(&def, ACTOR, &mut AllowAll) {
            paid -= receipt.points_delta;
            assert_eq!(ledger.invested(&def.key), paid);
        }
        assert_eq!(ledger.stage(&def.key), 5);
    }

    #[test]
    fn upgrade_at_max_stage_is_rejected() {
        let def = AttributeDefinition::new("luck", 0, 0.0, 1);
        let mut ledger = AttributeLedger::new(0);
        assert!(ledger.upgrade(&def, ACTOR, &mut AllowAll).is_ok());
        assert_eq!(
            ledger.upgrade(&def, ACTOR, &mut AllowAll),
            Err(ProgressionError::AtMaximum { max: 1 })
        );
    }

    #[test]
    fn vetoed_upgrade_rolls_back_exactly() {
        let def = strength();
        let mut ledger = AttributeLedger::new(10);
        let before = ledger.clone();
        let mut deny = |_: &Transaction| Verdict::Deny;

        assert_eq!(ledger.upgrade(&def, ACTOR, &mut deny), Err(ProgressionError::Vetoed));
        assert_eq!(ledger, before);
    }

    #[test]
    fn vetoed_refund_rolls_back_exactly() {
        let def = strength();
        let mut ledger = AttributeLedger::new(10);
        ledger.upgrade(&def, ACTOR, &mut AllowAll).ok();
        let before = ledger.clone();
        let mut deny = |_: &Transaction| Verdict::Deny;

        assert_eq!(ledger.refund(&def, ACTOR, &mut deny), Err(ProgressionError::Vetoed));
        assert_eq!(ledger, before);
    }

    #[test]
    fn refund_without_stage_is_rejected() {
        let mut ledger = AttributeLedger::new(10);
        assert_eq!(
            ledger.refund(&strength(), ACTOR, &mut AllowAll),
            Err(ProgressionError::AtMinimum)
        );
    }

    #[test]
    fn refund_all_is_idempotent() {
        let def = strength();
        let mut ledger = AttributeLedger::new(10);
        ledger.upgrade(&def, ACTOR, &mut AllowAll).ok();
        ledger.upgrade(&def, ACTOR, &mut AllowAll).ok();

        assert_eq!(ledger.refund_all_of(&def.key), 7);
        assert_eq!(ledger.refund_all_of(&def.key), 0);
        assert_eq!(ledger.points(), 10);
        assert_eq!(ledger.refund_all(), 0);
    }

    #[test]
    fn give_caps_at_max_and_prices_the_range() {
        let def = strength();
        let mut ledger = AttributeLedger::new(0);
        assert_eq!(ledger.give(&def, 2), 2);
        assert_eq!(ledger.invested(&def.key), 2 + 3);
        assert_eq!(ledger.give(&def, 10), 5);
        assert_eq!(ledger.invested(&def.key), def.cost_between(0, 5));
        assert_eq!(ledger.points(), 0);
    }

    #[test]
    fn effective_total_adds_class_base_and_modifiers() {
        let def = strength();
        let mut ledger = AttributeLedger::new(10);
        ledger.upgrade(&def, ACTOR, &mut AllowAll).ok();

        let mut modifiers = ModifierStack::new();
        modifiers.add(def.key.clone(), ModifierSpec::add(2.0));
        modifiers.add(def.key.clone(), ModifierSpec::multiply(0.5));

        // (2.4 + 1 + 2) × 1.5 = 8.1
        assert_eq!(ledger.effective_total(&def.key, 2.4, &modifiers), 8);

        modifiers.add(def.key.clone(), ModifierSpec::add(-100.0));
        assert_eq!(ledger.effective_total(&def.key, 2.4, &modifiers), 0);
    }
}
