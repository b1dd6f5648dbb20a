/// Resource pool (mana) owned by the actor's progression record.
///
/// `current` never drops below zero and never exceeds `max`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourcePool {
    pub current: f64,
    pub max: f64,
}

impl ResourcePool {
    pub fn new(current: f64, max: f64) -> Self {
        let max = max.max(0.0);
        Self {
            current: current.clamp(0.0, max),
            max,
        }
    }

    /// Debits `amount`, flooring at zero. Returns the amount actually removed.
    pub fn use_amount(&mut self, amount: f64) -> f64 {
        let before = self.current;
        self.current = (self.current - amount.max(0.0)).max(0.0);
        before - self.current
    }

    /// Credits `amount`, capping at `max`. Returns the amount actually added.
    pub fn restore(&mut self, amount: f64) -> f64 {
        let before = self.current;
        self.current = (self.current + amount.max(0.0)).min(self.max);
        self.current - before
    }

    /// Replaces the maximum and clamps `current` into the new range.
    pub fn set_max(&mut self, max: f64) {
        self.max = max.max(0.0);
        self.current = self.current.min(self.max);
    }

    pub fn set_current(&mut self, current: f64) {
        self.current = current.clamp(0.0, self.max);
    }

    pub fn has(&self, amount: f64) -> bool {
        self.current >= amount
    }
}
