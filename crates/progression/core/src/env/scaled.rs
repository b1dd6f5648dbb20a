/// Linear per-level value: `base + scale × level`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScaledValue {
    pub base: f64,
    pub scale: f64,
}

impl ScaledValue {
    pub const ZERO: Self = Self {
        base: 0.0,
        scale: 0.0,
    };

    pub const fn new(base: f64, scale: f64) -> Self {
        Self { base, scale }
    }

    pub const fn flat(base: f64) -> Self {
        Self { base, scale: 0.0 }
    }

    pub fn at(&self, level: i32) -> f64 {
        self.base + self.scale * f64::from(level)
    }

    /// Integer value at `level`, truncated toward zero.
    pub fn at_int(&self, level: i32) -> i64 {
        self.at(level) as i64
    }
}
