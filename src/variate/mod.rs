//! Variate Generator
//!
//! Standard-normal, Gamma and Beta samplers driven by a single uniform source.
//!
//! Core principles:
//! - Normal: Box-Muller transform over two strictly positive uniforms
//! - Gamma: Marsaglia-Tsang rejection, with the `u^(1/shape)` boost for shape < 1
//! - Beta: `X / (X + Y)` for independent `X ~ Gamma(alpha)`, `Y ~ Gamma(beta)`
//!
//! The generator holds no state beyond its source, so two generators fed the
//! same seed produce identical draw sequences.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::error::{BanditError, Result};
use crate::sanitize::{validate_beta_params, validate_shape};
use crate::types::DEFAULT_MAX_GAMMA_ITERATIONS;

// ==================== Uniform Source ====================

/// A source of uniform draws in `[0, 1)`
///
/// Implemented for every [`RngCore`], so any `rand` generator plugs in
/// directly. Tests implement it by hand to script exact draw sequences.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<R: RngCore> UniformSource for R {
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

// ==================== Generator ====================

/// Sampling primitives over an owned uniform source
#[derive(Clone, Debug)]
pub struct VariateGenerator<S = ChaCha8Rng> {
    source: S,
    max_gamma_iterations: usize,
}

impl VariateGenerator<ChaCha8Rng> {
    /// Deterministic generator (for testing and replay)
    pub fn with_seed(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Generator seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }
}

impl<S: UniformSource> VariateGenerator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_gamma_iterations: DEFAULT_MAX_GAMMA_ITERATIONS,
        }
    }

    /// Override the Gamma rejection ceiling (at least one iteration)
    pub fn with_max_gamma_iterations(mut self, iterations: usize) -> Self {
        self.max_gamma_iterations = iterations.max(1);
        self
    }

    pub fn max_gamma_iterations(&self) -> usize {
        self.max_gamma_iterations
    }

    /// One uniform draw in `[0, 1)`
    pub fn uniform(&mut self) -> f64 {
        self.source.next_uniform()
    }

    /// One uniform draw in `(0, 1)`; exact zeros are redrawn
    fn uniform_positive(&mut self) -> f64 {
        loop {
            let u = self.source.next_uniform();
            if u > 0.0 {
                return u;
            }
        }
    }

    /// Sample from the standard normal distribution (Box-Muller)
    pub fn standard_normal(&mut self) -> f64 {
        let u1 = self.uniform_positive();
        let u2 = self.uniform_positive();
        box_muller(u1, u2)
    }

    // ==================== Budgeted Draws ====================
    //
    // Inside the Gamma sampler every rejection and every zero redraw spends
    // one unit of the iteration budget, so a broken source always ends in
    // `GammaIterationsExhausted`.

    fn spend(&self, budget: &mut usize, shape: f64) -> Result<()> {
        if *budget == 0 {
            warn!(
                shape,
                iterations = self.max_gamma_iterations,
                "gamma rejection loop exhausted"
            );
            return Err(BanditError::GammaIterationsExhausted {
                shape,
                iterations: self.max_gamma_iterations,
            });
        }
        *budget -= 1;
        Ok(())
    }

    fn try_uniform_positive(&mut self, budget: &mut usize, shape: f64) -> Result<f64> {
        loop {
            let u = self.source.next_uniform();
            if u > 0.0 {
                return Ok(u);
            }
            self.spend(budget, shape)?;
        }
    }

    fn try_standard_normal(&mut self, budget: &mut usize, shape: f64) -> Result<f64> {
        let u1 = self.try_uniform_positive(budget, shape)?;
        let u2 = self.try_uniform_positive(budget, shape)?;
        Ok(box_muller(u1, u2))
    }

    /// Sample from Gamma(shape, 1) using the Marsaglia-Tsang method
    ///
    /// Reference: Marsaglia, G., & Tsang, W. W. (2000).
    /// "A simple method for generating gamma variables."
    ///
    /// Returns [`BanditError::GammaIterationsExhausted`] instead of a fallback
    /// value if the rejection loop (or a zero-redraw loop inside it) never
    /// finishes within the ceiling.
    pub fn gamma(&mut self, shape: f64) -> Result<f64> {
        let shape = validate_shape(shape)?;
        let mut budget = self.max_gamma_iterations;

        if shape < 1.0 {
            // 1 + shape >= 1, so this recurses exactly once
            let boosted = self.gamma(1.0 + shape)?;
            let u = self.try_uniform_positive(&mut budget, shape)?;
            return Ok(boosted * u.powf(1.0 / shape));
        }

        let d = shape - 1.0 / 3.0;
        let c = 1.0 / (9.0 * d).sqrt();

        loop {
            self.spend(&mut budget, shape)?;

            let x = self.try_standard_normal(&mut budget, shape)?;
            let v_term = 1.0 + c * x;

            if v_term <= 0.0 {
                continue;
            }

            let v = v_term.powi(3);
            let u = self.uniform();
            let x2 = x * x;

            // Fast squeeze check
            if u < 1.0 - 0.0331 * x2 * x2 {
                return Ok(d * v);
            }

            if u.ln() < 0.5 * x2 + d * (1.0 - v + v.ln()) {
                return Ok(d * v);
            }
        }
    }

    /// Sample from Beta(alpha, beta) as a ratio of Gamma draws
    ///
    /// For very small parameters both Gamma draws can underflow to zero; the
    /// pair is then redrawn, bounded by the Gamma iteration ceiling.
    pub fn beta(&mut self, alpha: f64, beta: f64) -> Result<f64> {
        let (alpha, beta) = validate_beta_params(alpha, beta)?;

        for _ in 0..self.max_gamma_iterations {
            let x = self.gamma(alpha)?;
            let y = self.gamma(beta)?;
            let sum = x + y;

            if sum > 0.0 && sum.is_finite() {
                return Ok(x / sum);
            }
        }

        Err(BanditError::DegenerateBetaDraw { alpha, beta })
    }
}

fn box_muller(u1: f64, u2: f64) -> f64 {
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

// ==================== Unit Tests ====================
