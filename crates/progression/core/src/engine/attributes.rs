use super::{ProgressionEngine, ProgressionEvent};
use crate::env::AttributeDefinition;
use crate::error::ProgressionError;
use crate::ledger::LedgerReceipt;
use crate::state::AttributeKey;

impl<'a> ProgressionEngine<'a> {
    /// Buys the next stage of an attribute with attribute points.
    pub fn upgrade_attribute(&mut self, key: &AttributeKey) -> Result<LedgerReceipt, ProgressionError> {
        let def = self.attribute_def(key)?;
        let receipt = self.progress.ledger.upgrade(def, self.actor, self.ports.hook)?;
        self.record(ProgressionEvent::AttributeUpgraded {
            actor: self.actor,
            attribute: receipt.attribute.clone(),
            stage: receipt.stage,
            cost: -receipt.points_delta,
        });
        self.recompute();
        Ok(receipt)
    }

    /// Sells back the last stage of an attribute.
    pub fn refund_attribute(&mut self, key: &AttributeKey) -> Result<LedgerReceipt, ProgressionError> {
        let def = self.attribute_def(key)?;
        let receipt = self.progress.ledger.refund(def, self.actor, self.ports.hook)?;
        self.record(ProgressionEvent::AttributeRefunded {
            actor: self.actor,
            attribute: receipt.attribute.clone(),
            stage: receipt.stage,
            credit: receipt.points_delta,
        });
        self.recompute();
        Ok(receipt)
    }

    /// Drains every stage of one attribute. Returns the points credited.
    pub fn refund_attribute_fully(&mut self, key: &AttributeKey) -> i64 {
        let existed = self.progress.ledger.entry(key).is_some();
        let credit = self.progress.ledger.refund_all_of(key);
        if existed {
            self.recompute();
        }
        credit
    }

    /// Drains every attribute. Returns the points credited.
    pub fn refund_all_attributes(&mut self) -> i64 {
        let credit = self.progress.ledger.refund_all();
        self.recompute();
        credit
    }

    /// Grants stages for free, capped at the attribute's maximum.
    pub fn give_attribute(&mut self, key: &AttributeKey, amount: i32) -> Result<i32, ProgressionError> {
        let def = self.attribute_def(key)?;
        let stage = self.progress.ledger.give(def, amount);
        self.recompute();
        Ok(stage)
    }

    /// Clears every attribute and re-grants the starting and per-level
    /// attribute points of each professed class.
    pub fn reset_attributes(&mut self) {
        self.progress.ledger.reset(self.attribute_allowance());
        self.recompute();
    }

    pub fn give_attribute_points(&mut self, amount: i64) {
        self.progress.ledger.grant_points(amount);
    }

    pub fn set_attribute_points(&mut self, points: i64) {
        self.progress.ledger.set_points(points);
    }

    /// Effective total of an attribute (class base + stages + modifiers).
    pub fn attribute_total(&self, key: &AttributeKey) -> i32 {
        self.pipeline().attribute_total(key)
    }

    /// Price of moving an attribute between two stages; negative when moving
    /// down.
    pub fn attribute_cost_between(&self, key: &AttributeKey, from: i32, to: i32) -> Result<i64, ProgressionError> {
        Ok(self.attribute_def(key)?.cost_between(from, to))
    }

    /// Price of the next stage of an attribute.
    pub fn attribute_up_cost(&self, key: &AttributeKey) -> Result<i64, ProgressionError> {
        let def = self.attribute_def(key)?;
        Ok(self.progress.ledger.cost(def, 1))
    }

    fn attribute_def(&self, key: &AttributeKey) -> Result<&'a AttributeDefinition, ProgressionError> {
        let attributes = self.env.attributes;
        attributes
            .attribute(key)
            .ok_or_else(|| ProgressionError::UnknownAttribute(key.clone()))
    }
}
