//! Error Types
//!
//! Every fallible operation in the crate returns [`BanditError`]. A failed call
//! never changes a topic's counters; a failed selection may still have
//! initialized its candidates with the uniform prior.

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, BanditError>;

#[derive(Debug, thiserror::Error)]
pub enum BanditError {
    #[error("candidate topic list is empty")]
    EmptyCandidates,

    #[error("gamma shape must be finite and positive, got {shape}")]
    InvalidShape { shape: f64 },

    #[error("beta parameters must be finite and positive, got alpha={alpha}, beta={beta}")]
    InvalidBetaParams { alpha: f64, beta: f64 },

    /// The rejection loop never accepted. Only a broken uniform source or a
    /// ceiling configured far too low can cause this.
    #[error("gamma sampler exhausted {iterations} iterations for shape {shape}")]
    GammaIterationsExhausted { shape: f64, iterations: usize },

    /// Counts whose total overflows `u64`, or whose `+1` prior is not exactly
    /// representable as `f64`
    #[error("seed counts out of range: correct={correct}, incorrect={incorrect}")]
    InvalidSeedCounts { correct: u64, incorrect: u64 },

    #[error("beta draw degenerated to 0/0 for alpha={alpha}, beta={beta}")]
    DegenerateBetaDraw { alpha: f64, beta: f64 },

    #[error("stats serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
