//! Decision randomness
//!
//! Each mob owns its own generator so its choices only depend on its seed
//! and the `dt` sequence it was fed, never on update order.

use crate::config::MsRange;

/// Concrete generator owned by every mob
pub type MobRng = rand_xoshiro::Xoshiro256PlusPlus;

/// Random rolls used by the movement AI
pub trait DecisionRng {
    /// Uniform integer in `0..100`
    fn roll_percent(&mut self) -> u32;

    /// Uniform duration inside `range`, in milliseconds
    fn roll_ms(&mut self, range: MsRange) -> f32;

    /// Fair coin flip
    fn coin(&mut self) -> bool;

    /// True with probability `percent / 100`
    fn chance(&mut self, percent: u32) -> bool {
        self.roll_percent() < percent
    }
}

impl<T: ?Sized + rand::Rng> DecisionRng for T {
    fn roll_percent(&mut self) -> u32 {
        self.gen_range(0..100)
    }

    fn roll_ms(&mut self, range: MsRange) -> f32 {
        if range.max <= range.min {
            return range.min as f32;
        }
        self.gen_range(range.min..range.max) as f32
    }

    fn coin(&mut self) -> bool {
        rand::Rng::r#gen(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_roll_percent_range() {
        let mut rng = MobRng::seed_from_u64(12345);
        for _ in 0..1000 {
            assert!(rng.roll_percent() < 100);
        }
    }

    #[test]
    fn test_roll_ms_stays_in_window() {
        let mut rng = MobRng::seed_from_u64(7);
        let range = MsRange::new(800, 2000);
        for _ in 0..1000 {
            let ms = rng.roll_ms(range);
            assert!((800.0..2000.0).contains(&ms));
        }
    }

    #[test]
    fn test_roll_ms_degenerate_window() {
        let mut rng = MobRng::seed_from_u64(7);
        assert_eq!(rng.roll_ms(MsRange::new(500, 500)), 500.0);
        assert_eq!(rng.roll_ms(MsRange::new(900, 100)), 900.0);
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = MobRng::seed_from_u64(99);
        for _ in 0..100 {
            assert!(rng.chance(100));
            assert!(!rng.chance(0));
        }
    }

    #[test]
    fn test_same_seed_same_rolls() {
        let mut a = MobRng::seed_from_u64(42);
        let mut b = MobRng::seed_from_u64(42);
        for _ in 0..50 {
            assert_eq!(a.roll_percent(), b.roll_percent());
            assert_eq!(a.coin(), b.coin());
        }
    }
}
