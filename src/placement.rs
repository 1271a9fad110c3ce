//! Randomised scalars for scattering scene props.
//!
//! [`Placement::randomize`] draws a value between `min` and `max`:
//!
//! - [`Mode::Int`]: `floor(r * (max - min + 1)) + min`, an integer in `[min, max]`
//! - [`Mode::Float`]: `r * (max - min + 1) + min`, a float in `[min, max + 1)`
//!
//! with `r` uniform in `[0, 1)`. The `+ 1` in the float formula widens the
//! range past `max`; the scene's layouts were tuned with it, so it is kept.
//! Both formulas also work with `min > max`, which the palm tree rows use to
//! scatter to the left.
//!
//! A draw equal to the previous value of the same mode is re-rolled, at most
//! [`MAX_REROLLS`] times. A degenerate range that can only produce the
//! previous value returns it after the last re-roll. What "previous" means
//! is chosen with [`AntiRepeat`].

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Re-rolls allowed before a repeated value is accepted.
pub const MAX_REROLLS: u32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Float,
    Int,
}

/// Which value a fresh draw is compared against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AntiRepeat {
    /// The previous value is reset to zero for every call, so the only value
    /// ever re-rolled is an exact `0`. This keeps the layouts of the scene as
    /// they were designed.
    #[default]
    PerCall,
    /// The previous value survives between calls, so two consecutive draws of
    /// the same mode never repeat.
    Persistent,
}

#[derive(Debug)]
pub struct Placement {
    rng: StdRng,
    anti_repeat: AntiRepeat,
    previous_float: f32,
    previous_int: f32,
}

impl Placement {
    pub fn new(anti_repeat: AntiRepeat) -> Self {
        Self::with_rng(StdRng::from_os_rng(), anti_repeat)
    }

    /// Deterministic placement, for reproducible layouts and tests.
    pub fn seeded(seed: u64, anti_repeat: AntiRepeat) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), anti_repeat)
    }

    fn with_rng(rng: StdRng, anti_repeat: AntiRepeat) -> Self {
        Self {
            rng,
            anti_repeat,
            previous_float: 0.0,
            previous_int: 0.0,
        }
    }

    pub fn anti_repeat(&self) -> AntiRepeat {
        self.anti_repeat
    }

    pub fn randomize(&mut self, min: f32, max: f32, mode: Mode) -> f32 {
        let previous = match (self.anti_repeat, mode) {
            (AntiRepeat::PerCall, _) => 0.0,
            (AntiRepeat::Persistent, Mode::Float) => self.previous_float,
            (AntiRepeat::Persistent, Mode::Int) => self.previous_int,
        };

        let mut value = self.draw(min, max, mode);
        let mut attempts = 0;
        while value == previous && attempts < MAX_REROLLS {
            value = self.draw(min, max, mode);
            attempts += 1;
        }

        match mode {
            Mode::Float => self.previous_float = value,
            Mode::Int => self.previous_int = value,
        }
        value
    }

    fn draw(&mut self, min: f32, max: f32, mode: Mode) -> f32 {
        let r: f64 = self.rng.random();
        let span = (max - min + 1.0) as f64;
        match mode {
            Mode::Float => (r * span + min as f64) as f32,
            Mode::Int => ((r * span).floor() + min as f64) as f32,
        }
    }

    /// Uniform float in `[low, high)`.
    pub fn range(&mut self, low: f32, high: f32) -> f32 {
        let r: f32 = self.rng.random();
        low + r * (high - low)
    }

    /// Uniform float in `[-range / 2, range / 2)`.
    pub fn spread(&mut self, range: f32) -> f32 {
        let r: f32 = self.rng.random();
        range * (0.5 - r)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::new(AntiRepeat::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints_stay_in_the_closed_range() {
        let mut placement = Placement::seeded(1, AntiRepeat::PerCall);
        for _ in 0..2000 {
            let v = placement.randomize(3.0, 8.0, Mode::Int);
            assert_eq!(v.fract(), 0.0);
            assert!((3.0..=8.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn floats_reach_past_max_by_up_to_one() {
        let mut placement = Placement::seeded(2, AntiRepeat::PerCall);
        let draws: Vec<f32> = (0..5000)
            .map(|_| placement.randomize(0.0, 2.0, Mode::Float))
            .collect();
        assert!(draws.iter().all(|v| (0.0..3.0).contains(v)));
        assert!(draws.iter().any(|v| *v > 2.0));
    }

    #[test]
    fn reversed_range_scatters_the_other_way() {
        let mut placement = Placement::seeded(3, AntiRepeat::PerCall);
        for _ in 0..2000 {
            let v = placement.randomize(-25.0, -200.0, Mode::Int);
            assert!((-199.0..=-25.0).contains(&v), "{v}");
        }
    }

    #[test]
    fn per_call_only_rerolls_zero() {
        let mut placement = Placement::seeded(4, AntiRepeat::PerCall);
        for _ in 0..500 {
            assert_ne!(placement.randomize(-1.0, 1.0, Mode::Int), 0.0);
        }
    }

    #[test]
    fn persistent_never_repeats_back_to_back() {
        let mut placement = Placement::seeded(5, AntiRepeat::Persistent);
        let mut last = placement.randomize(1.0, 2.0, Mode::Int);
        for _ in 0..500 {
            let next = placement.randomize(1.0, 2.0, Mode::Int);
            assert_ne!(next, last);
            last = next;
        }
    }

    #[test]
    fn degenerate_range_gives_up_after_the_reroll_cap() {
        // max - min + 1 == 0, so every draw is `min`
        for anti_repeat in [AntiRepeat::PerCall, AntiRepeat::Persistent] {
            let mut placement = Placement::seeded(5, anti_repeat);
            assert_eq!(placement.randomize(0.0, -1.0, Mode::Int), 0.0);
            assert_eq!(placement.randomize(0.0, -1.0, Mode::Float), 0.0);
        }
    }
}
