//! Gear-indexed linear speed-to-power model.
//!
//! Each gear maps speed (km/h) to power (watts) through a fitted linear
//! relation `power = speed * gradient - shift`, clamped below at zero.

use thiserror::Error;

/// Per-gear slope of the speed/power relation, lowest gear first.
const GRADIENTS: [f64; 10] = [3.3, 4.3, 5.44, 6.4, 7.5, 8.5, 10.0, 10.95, 11.35, 12.85];

/// Per-gear offset of the speed/power relation, lowest gear first.
const SHIFTS: [f64; 10] = [
    -20.0, -30.0, -30.0, -40.0, -50.0, -54.0, -70.0, -70.0, -50.0, -67.0,
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("gear {0} out of range (1..=10)")]
pub struct InvalidGear(pub u8);

/// A selected gear, 1 (easiest) through 10 (hardest).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gear(u8);

impl Gear {
    pub fn new(gear: u8) -> Result<Self, InvalidGear> {
        if (1..=10).contains(&gear) {
            Ok(Gear(gear))
        } else {
            Err(InvalidGear(gear))
        }
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    fn index(&self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl Default for Gear {
    fn default() -> Self {
        Gear(2)
    }
}

/// Estimated power in watts for the given speed (km/h) and gear.
///
/// Never returns a negative value: below a gear-dependent threshold speed the
/// model bottoms out at zero.
pub fn speed_to_power(speed_kmh: f64, gear: Gear) -> f64 {
    let watts = speed_kmh * GRADIENTS[gear.index()] - SHIFTS[gear.index()];

    watts.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gear_range() {
        assert!(Gear::new(1).is_ok());
        assert!(Gear::new(10).is_ok());
        assert_eq!(Gear::new(0), Err(InvalidGear(0)));
        assert_eq!(Gear::new(11), Err(InvalidGear(11)));
    }

    #[test]
    fn test_lowest_gear_power() {
        // Gear 1: 3.3 W per km/h with a -20 shift.
        let watts = speed_to_power(20.0, Gear::new(1).unwrap());
        assert!((watts - 86.0).abs() < 1e-9);
    }

    #[test]
    fn test_hardest_gear_power() {
        // Gear 10: 12.85 W per km/h with a -67 shift.
        let watts = speed_to_power(30.0, Gear::new(10).unwrap());
        assert!((watts - 452.5).abs() < 1e-9);
    }

    #[test]
    fn test_power_never_negative() {
        assert_eq!(speed_to_power(0.0, Gear::default()), 30.0);
        assert_eq!(speed_to_power(-5.0, Gear::new(1).unwrap()), 3.5);

        // All-zero input across every gear stays non-negative.
        for g in 1..=10 {
            assert!(speed_to_power(0.0, Gear::new(g).unwrap()) >= 0.0);
        }
    }

    #[test]
    fn test_harder_gear_costs_more_at_speed() {
        let easy = speed_to_power(25.0, Gear::new(3).unwrap());
        let hard = speed_to_power(25.0, Gear::new(8).unwrap());
        assert!(hard > easy);
    }
}
