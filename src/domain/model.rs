// Glucose dynamics - one stochastic step of the virtual patient
use rand::Rng;
use rand_distr::StandardNormal;

/// Source of randomness for the patient model.
///
/// Passed explicitly so runs can be seeded, or silenced entirely in tests.
pub trait NoiseSource {
    /// One standard-normal draw.
    fn standard_normal(&mut self) -> f64;

    /// One draw from `[low, high)`. Callers guarantee `low < high`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

/// Noise backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomNoise<R> {
    rng: R,
}

impl<R: Rng> RandomNoise<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> NoiseSource for RandomNoise<R> {
    fn standard_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.rng.gen_range(low..high)
    }
}

/// Deterministic source: every normal draw is zero, uniform draws return `low`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNoise;

impl NoiseSource for SilentNoise {
    fn standard_normal(&mut self) -> f64 {
        0.0
    }

    fn uniform(&mut self, low: f64, _high: f64) -> f64 {
        low
    }
}

pub const DEFAULT_VARIABILITY_SCALE: f64 = 2.0;
pub const DEFAULT_NOISE_SCALE: f64 = 1.0;
pub const DEFAULT_DECAY_FACTOR: f64 = 0.1;

/// Single-compartment glucose response.
///
/// `next = glucose + variability_scale * n1 + noise_scale * n2 - insulin * decay_factor`
/// where `n1` models meals and other body variation and `n2` measurement noise.
/// The result is not clamped; extremes are left for the controller and the
/// status classifier to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlucoseModel {
    pub variability_scale: f64,
    pub noise_scale: f64,
    pub decay_factor: f64,
}

impl Default for GlucoseModel {
    fn default() -> Self {
        Self {
            variability_scale: DEFAULT_VARIABILITY_SCALE,
            noise_scale: DEFAULT_NOISE_SCALE,
            decay_factor: DEFAULT_DECAY_FACTOR,
        }
    }
}

impl GlucoseModel {
    pub fn new(variability_scale: f64, noise_scale: f64, decay_factor: f64) -> Self {
        Self {
            variability_scale,
            noise_scale,
            decay_factor,
        }
    }

    pub fn step<N: NoiseSource + ?Sized>(&self, glucose: f64, insulin: f64, noise: &mut N) -> f64 {
        let variability = noise.standard_normal() * self.variability_scale;
        let measurement = noise.standard_normal() * self.noise_scale;
        glucose + variability + measurement - insulin * self.decay_factor
    }
}
