use super::{StatKey, StatPipeline};
use crate::modifier::StatBounds;

/// Drains `amount` of hunger and returns how many whole hunger points the
/// host should remove.
///
/// The drain is divided by the actor's scaled hunger stat, and the fractional
/// accumulator in `hunger` carries across calls:
///
/// ```text
/// scaled = amount / scale(HUNGER, amount)
/// lost   = scaled >= hunger ? trunc(scaled - hunger) + 1 : 0
/// hunger += lost - amount
/// ```
///
/// Non-positive amounts leave the accumulator untouched.
pub fn subtract_hunger(hunger: &mut f64, pipeline: &StatPipeline<'_>, amount: f64) -> i32 {
    if amount <= 0.0 {
        return 0;
    }
    let divisor = pipeline.scale_stat(StatKey::Hunger, amount, StatBounds::NON_NEGATIVE);
    apply_drain(hunger, amount, amount / divisor)
}

fn apply_drain(hunger: &mut f64, amount: f64, scaled: f64) -> i32 {
    let lost = if scaled >= *hunger {
        ((scaled - *hunger) as i32).saturating_add(1)
    } else {
        0
    };
    *hunger += f64::from(lost) - amount;
    lost
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carry_fires_exactly_at_the_threshold() {
        let mut hunger = 1.0;
        assert_eq!(apply_drain(&mut hunger, 1.0, 1.0), 1);
        assert_eq!(hunger, 1.0);
    }

    #[test]
    fn below_threshold_only_accumulates() {
        let mut hunger = 1.5;
        assert_eq!(apply_drain(&mut hunger, 0.5, 1.0), 0);
        assert_eq!(hunger, 1.0);
    }

    #[test]
    fn just_below_threshold_does_not_carry() {
        let mut hunger = 1.0;
        assert_eq!(apply_drain(&mut hunger, 0.25, 0.999), 0);
        assert_eq!(hunger, 0.75);
    }

    #[test]
    fn large_overflow_carries_whole_points() {
        let mut hunger = 0.5;
        // trunc(3.2 - 0.5) + 1 = 3
        assert_eq!(apply_drain(&mut hunger, 3.2, 3.2), 3);
        assert!((hunger - 0.3).abs() < 1e-9);
    }

    #[test]
    fn zero_divisor_saturates() {
        let mut hunger = 1.0;
        assert_eq!(apply_drain(&mut hunger, 1.0, f64::INFINITY), i32::MAX);
    }
}
