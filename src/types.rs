//! Common Types and Constants
//!
//! Shared records passed between the models and the surrounding quiz flow.

use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Prior pseudo-count added to both alpha and beta (uniform Beta(1, 1) prior)
pub const PRIOR_PSEUDO_COUNT: f64 = 1.0;

/// Largest count whose `+1` prior is still exact in `f64` (2^53 - 1)
pub const MAX_EXACT_COUNT: u64 = (1 << 53) - 1;

/// Default ceiling on Gamma rejection-loop iterations
pub const DEFAULT_MAX_GAMMA_ITERATIONS: usize = 10_000;

/// Observation count at which selection confidence reaches 0.5
pub const CONFIDENCE_SCALE: f64 = 20.0;

/// Profile name that triggers demonstration seeding (compared case-insensitively)
pub const DEMO_ACCOUNT_NAME: &str = "testaccount";

/// `(topic, correct, incorrect)` counts loaded into the demonstration profile
pub const DEMO_ACCOUNT_SEED: &[(&str, u64, u64)] = &[
    ("moral_scenarios", 4, 16),
    ("high_school_mathematics", 8, 12),
    ("high_school_world_history", 12, 8),
    ("marketing", 15, 5),
    ("computer_security", 16, 4),
    ("high_school_geography", 14, 6),
    ("college_computer_science", 10, 1),
    ("professional_psychology", 18, 2),
    ("virology", 13, 7),
    ("prehistory", 11, 9),
    ("high_school_psychology", 17, 3),
    ("high_school_chemistry", 9, 11),
    ("logical_fallacies", 7, 13),
    ("business_ethics", 15, 5),
    ("world_religions", 14, 6),
    ("astronomy", 12, 8),
    ("college_biology", 16, 4),
    ("philosophy", 13, 7),
    ("machine_learning", 70, 10),
    ("nutrition", 11, 2),
];

// ==================== Records ====================

/// Read-only view of one topic model, for statistics display
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStats {
    pub alpha: f64,
    pub beta: f64,
    pub total_attempts: u64,
    pub correct_answers: u64,
    pub success_rate: f64,
}

/// Outcome of one Thompson Sampling round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSelection {
    /// Selected topic identifier
    pub topic_id: String,
    /// Sampled success probability of the selected topic (the minimum drawn)
    pub score: f64,
    /// Confidence in [0, 1) derived from the selected topic's observation count
    pub confidence: f64,
}

/// One answered question reported by the quiz flow
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvent {
    pub topic_id: String,
    pub is_correct: bool,
}

impl AnswerEvent {
    pub fn new(topic_id: impl Into<String>, is_correct: bool) -> Self {
        Self {
            topic_id: topic_id.into(),
            is_correct,
        }
    }
}
