//! # topic-bandit - adaptive quiz topic selection
//!
//! Decides which topic a learner should be quizzed on next from an online
//! per-topic estimate of competence:
//!
//! - **Variate Generator** - standard normal, Gamma and Beta samplers over an
//!   injectable uniform source
//! - **Topic Model** - Beta-Bernoulli accumulator per topic (one bandit arm)
//! - **Learner Profile** - Thompson Sampling over a candidate set, steering
//!   practice toward the topic with the lowest sampled success probability
//!
//! ## Module Structure
//!
//! - [`variate`] - sampling primitives and the [`UniformSource`] seam
//! - [`topic`] - per-topic Beta posterior
//! - [`profile`] - selection policy, options, parallel batch selection
//! - [`sanitize`] - parameter validation
//! - [`types`] - shared records and constants
//! - [`error`] - crate error type
//!
//! ## Example
//!
//! ```rust
//! use topic_bandit::LearnerProfile;
//!
//! let mut profile = LearnerProfile::with_seed("ada", 42);
//! profile.record_answer("algebra", true);
//! profile.record_answer("geometry", false);
//!
//! let next = profile.select_next_topic(&["algebra", "geometry"]).unwrap();
//! assert!(next == "algebra" || next == "geometry");
//! ```

pub mod error;
pub mod profile;
pub mod sanitize;
pub mod topic;
pub mod types;
pub mod variate;

pub use error::{BanditError, Result};
pub use profile::{select_next_topics_parallel, LearnerProfile, ProfileOptions};
pub use topic::TopicModel;
pub use types::*;
pub use variate::{UniformSource, VariateGenerator};
