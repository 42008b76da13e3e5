use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Domain interface for randomness used by fallback selection and the
/// simulated sensor.
///
/// Isolated so tests can script exact sequences.
pub trait RandomSource: Send {
    /// Uniform float in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `[0, upper)`. `upper` must be non-zero.
    fn next_index(&mut self, upper: usize) -> usize {
        debug_assert!(upper > 0, "next_index requires a non-empty range");
        let idx = (self.next_unit() * upper as f64) as usize;
        idx.min(upper - 1)
    }

    /// Uniform float in `[low, high)`.
    fn next_in(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_unit() * (high - low)
    }
}

/// `RandomSource` backed by any `rand` generator.
pub struct RngRandomSource<R: Rng + Send> {
    rng: R,
}

impl<R: Rng + Send> RngRandomSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngRandomSource<StdRng> {
    /// Reproducible source for demo runs.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> RandomSource for RngRandomSource<R> {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn next_index(&mut self, upper: usize) -> usize {
        self.rng.gen_range(0..upper)
    }
}

/// Deterministic source that replays a fixed list of unit values in a loop.
///
/// Values are clamped into `[0, 1)`. An empty script always yields `0.0`.
pub struct ScriptedRandomSource {
    values: VecDeque<f64>,
    draws: usize,
}

impl ScriptedRandomSource {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
                .collect(),
            draws: 0,
        }
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for ScriptedRandomSource {
    fn next_unit(&mut self) -> f64 {
        self.draws += 1;
        match self.values.pop_front() {
            Some(v) => {
                self.values.push_back(v);
                v
            }
            None => 0.0,
        }
    }
}
