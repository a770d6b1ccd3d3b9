//! Topic Model
//!
//! Beta-Bernoulli belief about a learner's success probability on one topic.
//!
//! - Correct answer -> alpha + 1, incorrect answer -> beta + 1
//! - Both parameters start at the uniform Beta(1, 1) prior
//! - Invariant: `alpha == correct + 1`, `beta == incorrect + 1`

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sanitize::validate_seed_counts;
use crate::types::{TopicStats, PRIOR_PSEUDO_COUNT};
use crate::variate::{UniformSource, VariateGenerator};

/// Per-topic accumulator (one bandit arm)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicModel {
    /// Successes plus prior pseudo-count (>= 1)
    alpha: f64,
    /// Failures plus prior pseudo-count (>= 1)
    beta: f64,
    total_attempts: u64,
    correct_answers: u64,
}

impl Default for TopicModel {
    fn default() -> Self {
        Self {
            alpha: PRIOR_PSEUDO_COUNT,
            beta: PRIOR_PSEUDO_COUNT,
            total_attempts: 0,
            correct_answers: 0,
        }
    }
}

impl TopicModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one answered question
    pub fn record_outcome(&mut self, is_correct: bool) {
        self.total_attempts += 1;
        if is_correct {
            self.alpha += 1.0;
            self.correct_answers += 1;
        } else {
            self.beta += 1.0;
        }
    }

    /// Build a model from aggregate counts, keeping the `+1` prior
    pub fn from_counts(correct: u64, incorrect: u64) -> Result<Self> {
        let total_attempts = validate_seed_counts(correct, incorrect)?;

        Ok(Self {
            alpha: correct as f64 + PRIOR_PSEUDO_COUNT,
            beta: incorrect as f64 + PRIOR_PSEUDO_COUNT,
            total_attempts,
            correct_answers: correct,
        })
    }

    /// Overwrite all state from aggregate counts; on error the model is unchanged
    pub fn seed_from_counts(&mut self, correct: u64, incorrect: u64) -> Result<()> {
        *self = Self::from_counts(correct, incorrect)?;
        Ok(())
    }

    /// One fresh draw from the current Beta posterior (never cached)
    pub fn draw_success_sample<S: UniformSource>(
        &self,
        variates: &mut VariateGenerator<S>,
    ) -> Result<f64> {
        variates.beta(self.alpha, self.beta)
    }

    /// Observed accuracy; 0 before any attempt
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.correct_answers as f64 / self.total_attempts as f64
        }
    }

    /// Posterior mean `alpha / (alpha + beta)`
    pub fn expected_value(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    pub fn correct_answers(&self) -> u64 {
        self.correct_answers
    }

    pub fn stats(&self) -> TopicStats {
        TopicStats {
            alpha: self.alpha,
            beta: self.beta,
            total_attempts: self.total_attempts,
            correct_answers: self.correct_answers,
            success_rate: self.success_rate(),
        }
    }
}
