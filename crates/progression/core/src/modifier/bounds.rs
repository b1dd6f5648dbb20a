/// Clamp range applied as the last step of a resolution.
///
/// Each derived stat declares its own range (see `StatKey::bounds`); the
/// constants here cover the generic cases.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatBounds {
    pub min: f64,
    pub max: f64,
}

impl StatBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `[0, f64::MAX]`, the default for pool sizes and scaled stats.
    pub const NON_NEGATIVE: Self = Self {
        min: 0.0,
        max: f64::MAX,
    };

    /// No clamping.
    pub const UNCLAMPED: Self = Self {
        min: f64::MIN,
        max: f64::MAX,
    };

    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

impl Default for StatBounds {
    fn default() -> Self {
        Self::NON_NEGATIVE
    }
}
