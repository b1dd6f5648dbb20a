/// Progression tunables shared by every actor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProgressionConfig {
    /// Global cast throttle window armed after every successful cast.
    pub throttle_ticks: u64,
    /// Minimum remaining cooldown worth reporting to the player.
    pub cooldown_notice_ticks: u64,
    /// Interval between resource regeneration passes.
    pub regen_interval_ticks: u64,
    /// Health written to actors without any professed class.
    pub default_health: f64,
    pub mana_enabled: bool,
    pub starting_hunger: f64,
}

impl ProgressionConfig {
    pub const DEFAULT_THROTTLE_TICKS: u64 = 20;
    pub const DEFAULT_COOLDOWN_NOTICE_TICKS: u64 = 40;
    pub const DEFAULT_REGEN_INTERVAL_TICKS: u64 = 20;
    pub const DEFAULT_HEALTH: f64 = 20.0;
    pub const DEFAULT_STARTING_HUNGER: f64 = 1.0;

    pub fn new() -> Self {
        Self {
            throttle_ticks: Self::DEFAULT_THROTTLE_TICKS,
            cooldown_notice_ticks: Self::DEFAULT_COOLDOWN_NOTICE_TICKS,
            regen_interval_ticks: Self::DEFAULT_REGEN_INTERVAL_TICKS,
            default_health: Self::DEFAULT_HEALTH,
            mana_enabled: true,
            starting_hunger: Self::DEFAULT_STARTING_HUNGER,
        }
    }

    pub fn with_throttle_ticks(mut self, ticks: u64) -> Self {
        self.throttle_ticks = ticks;
        self
    }

    /// Whether a remaining cooldown is long enough to be worth a notice.
    pub fn should_notify_cooldown(&self, remaining: u64) -> bool {
        remaining >= self.cooldown_notice_ticks
    }
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self::new()
    }
}
