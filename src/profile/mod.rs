//! Learner Profile (Selection Policy)
//!
//! Owns one [`TopicModel`] per topic identifier and picks the next topic to
//! practise with Thompson Sampling.
//!
//! Core principles:
//! - One Beta(alpha, beta) draw per candidate topic on every selection
//! - The candidate with the LOWEST draw wins: practice is steered toward the
//!   topics the learner currently looks weakest at, while sparsely observed
//!   topics still win whenever their wide posterior happens to draw low
//! - Topic models are created lazily with the Beta(1, 1) prior on first reference
//!
//! A profile is single-owner state: calls take `&mut self` and there is no
//! internal locking. Run many learners concurrently by giving each its own
//! profile (see [`select_next_topics_parallel`]).

use std::collections::{BTreeMap, HashMap};

use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::error::{BanditError, Result};
use crate::topic::TopicModel;
use crate::types::{
    AnswerEvent, TopicSelection, TopicStats, CONFIDENCE_SCALE, DEFAULT_MAX_GAMMA_ITERATIONS,
    DEMO_ACCOUNT_NAME, DEMO_ACCOUNT_SEED,
};
use crate::variate::{UniformSource, VariateGenerator};

// ==================== Options ====================

/// Profile construction options
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileOptions {
    /// Random seed for reproducibility (OS entropy when absent)
    pub seed: Option<u64>,
    /// Gamma rejection-loop ceiling (default: 10,000)
    pub max_gamma_iterations: Option<usize>,
}

impl ProfileOptions {
    /// Read options from `TOPIC_BANDIT_SEED` and `TOPIC_BANDIT_MAX_GAMMA_ITERATIONS`.
    /// Missing or unparsable values are left unset.
    pub fn from_env() -> Self {
        let seed = std::env::var("TOPIC_BANDIT_SEED")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok());

        let max_gamma_iterations = std::env::var("TOPIC_BANDIT_MAX_GAMMA_ITERATIONS")
            .ok()
            .and_then(|value| value.trim().parse::<usize>().ok());

        Self {
            seed,
            max_gamma_iterations,
        }
    }
}

// ==================== Profile ====================

/// One learner's topic models plus the uniform source that drives selection
#[derive(Clone, Debug)]
pub struct LearnerProfile<S = ChaCha8Rng> {
    name: String,
    /// Opaque onboarding data kept for the surrounding application
    preferences: serde_json::Value,
    topics: HashMap<String, TopicModel>,
    variates: VariateGenerator<S>,
}

impl LearnerProfile<ChaCha8Rng> {
    /// Create a profile with default options (entropy-seeded)
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, ProfileOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: ProfileOptions) -> Self {
        let variates = match options.seed {
            Some(seed) => VariateGenerator::with_seed(seed),
            None => VariateGenerator::from_entropy(),
        }
        .with_max_gamma_iterations(
            options
                .max_gamma_iterations
                .unwrap_or(DEFAULT_MAX_GAMMA_ITERATIONS),
        );

        Self::with_generator(name, variates)
    }

    /// Create a deterministic profile (for testing)
    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self::with_options(
            name,
            ProfileOptions {
                seed: Some(seed),
                ..Default::default()
            },
        )
    }
}

impl<S: UniformSource> LearnerProfile<S> {
    /// Create a profile around an explicit generator
    ///
    /// The demonstration identity (`testaccount`, any case) is pre-seeded
    /// with fixed per-topic counts.
    pub fn with_generator(name: impl Into<String>, variates: VariateGenerator<S>) -> Self {
        let mut profile = Self {
            name: name.into(),
            preferences: serde_json::Value::Null,
            topics: HashMap::new(),
            variates,
        };

        if profile.is_demo_account() {
            for &(topic_id, correct, incorrect) in DEMO_ACCOUNT_SEED {
                if let Err(err) = profile.seed_topic(topic_id, correct, incorrect) {
                    warn!(topic = topic_id, error = %err, "skipped demonstration topic");
                }
            }
            debug!(
                name = %profile.name,
                topics = DEMO_ACCOUNT_SEED.len(),
                "seeded demonstration profile"
            );
        }

        profile
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach the onboarding preferences supplied with the learner's identity
    pub fn with_preferences(mut self, preferences: serde_json::Value) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn preferences(&self) -> &serde_json::Value {
        &self.preferences
    }

    pub fn is_demo_account(&self) -> bool {
        self.name.eq_ignore_ascii_case(DEMO_ACCOUNT_NAME)
    }

    /// Number of initialized topics
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    // ==================== Updates ====================

    /// Create the topic with the uniform prior if it does not exist yet
    pub fn ensure_topic(&mut self, topic_id: &str) {
        self.topic_entry(topic_id);
    }

    pub fn record_answer(&mut self, topic_id: &str, is_correct: bool) {
        let model = self.topic_entry(topic_id);
        model.record_outcome(is_correct);
        trace!(
            topic = topic_id,
            is_correct,
            attempts = model.total_attempts(),
            "recorded answer"
        );
    }

    /// Batch form of [`record_answer`](Self::record_answer), applied in order
    pub fn record_answers<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = AnswerEvent>,
    {
        for event in events {
            self.record_answer(&event.topic_id, event.is_correct);
        }
    }

    /// Overwrite one topic from aggregate counts
    ///
    /// Invalid counts are rejected before the topic is touched or created.
    pub fn seed_topic(&mut self, topic_id: &str, correct: u64, incorrect: u64) -> Result<()> {
        let seeded = TopicModel::from_counts(correct, incorrect)?;
        self.topics.insert(topic_id.to_owned(), seeded);
        Ok(())
    }

    // ==================== Selection ====================

    /// Thompson Sampling round over `candidates`
    ///
    /// Initializes every candidate, then draws once per candidate and returns
    /// the candidate with the minimum draw. Ties go to the earliest candidate.
    pub fn select_topic<T: AsRef<str>>(&mut self, candidates: &[T]) -> Result<TopicSelection> {
        if candidates.is_empty() {
            return Err(BanditError::EmptyCandidates);
        }

        for candidate in candidates {
            self.ensure_topic(candidate.as_ref());
        }

        let mut best: Option<(usize, f64, f64)> = None;

        for (idx, candidate) in candidates.iter().enumerate() {
            // Present: every candidate was initialized above
            let model = &self.topics[candidate.as_ref()];
            let sample = model.draw_success_sample(&mut self.variates)?;

            if best.map_or(true, |(_, score, _)| sample < score) {
                best = Some((idx, sample, Self::confidence(model)));
            }
        }

        let (idx, score, confidence) = best.ok_or(BanditError::EmptyCandidates)?;
        let selection = TopicSelection {
            topic_id: candidates[idx].as_ref().to_owned(),
            score,
            confidence,
        };

        debug!(
            name = %self.name,
            topic = %selection.topic_id,
            score,
            candidates = candidates.len(),
            "selected next topic"
        );

        Ok(selection)
    }

    /// Identifier of the next topic to practise
    pub fn select_next_topic<T: AsRef<str>>(&mut self, candidates: &[T]) -> Result<String> {
        self.select_topic(candidates).map(|selection| selection.topic_id)
    }

    // ==================== Queries ====================

    /// Stats for one topic, initializing it if needed
    pub fn topic_stats(&mut self, topic_id: &str) -> TopicStats {
        self.topic_entry(topic_id).stats()
    }

    /// Read-only access without initializing
    pub fn topic(&self, topic_id: &str) -> Option<&TopicModel> {
        self.topics.get(topic_id)
    }

    /// Stats of every initialized topic, ordered by topic id
    pub fn all_topic_stats(&self) -> BTreeMap<String, TopicStats> {
        self.topics
            .iter()
            .map(|(id, model)| (id.clone(), model.stats()))
            .collect()
    }

    /// Initialized topics ranked weakest first by posterior mean
    pub fn weakest_topics(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .topics
            .iter()
            .map(|(id, model)| (id.clone(), model.expected_value()))
            .collect();

        ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// JSON snapshot of [`all_topic_stats`](Self::all_topic_stats) for display
    pub fn stats_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.all_topic_stats())?)
    }

    // ==================== Private Helper Methods ====================

    fn topic_entry(&mut self, topic_id: &str) -> &mut TopicModel {
        self.topics.entry(topic_id.to_owned()).or_default()
    }

    fn confidence(model: &TopicModel) -> f64 {
        let observations = model.total_attempts() as f64;
        (observations / (observations + CONFIDENCE_SCALE)).clamp(0.0, 1.0)
    }
}

// ==================== Batch Selection ====================

/// Run one selection per profile in parallel
///
/// Each profile is driven by exactly one rayon task with its own source, so
/// no draw sequence is shared between learners.
pub fn select_next_topics_parallel<S, T>(
    profiles: &mut [LearnerProfile<S>],
    candidates: &[T],
) -> Vec<Result<String>>
where
    S: UniformSource + Send,
    T: AsRef<str> + Sync,
{
    profiles
        .par_iter_mut()
        .map(|profile| profile.select_next_topic(candidates))
        .collect()
}

// ==================== Unit Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record_answer_creates_topic_lazily() {
        let mut profile = LearnerProfile::with_seed("ada", 42);
        assert!(profile.topic("algebra").is_none());

        profile.record_answer("algebra", true);
        profile.record_answer("algebra", false);
        profile.record_answer("algebra", true);

        let stats = profile.topic_stats("algebra");
        assert_eq!(stats.alpha, 3.0);
        assert_eq!(stats.beta, 2.0);
        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.correct_answers, 2);
    }

    #[test]
    fn test_ensure_topic_is_idempotent() {
        let mut profile = LearnerProfile::with_seed("ada", 42);
        profile.ensure_topic("history");
        profile.record_answer("history", false);
        profile.ensure_topic("history");
        profile.ensure_topic("history");

        let stats = profile.topic_stats("history");
        assert_eq!(stats.total_attempts, 1);
        assert_eq!(stats.beta, 2.0);
        assert_eq!(profile.topic_count(), 1);
    }

    #[test]
    fn test_topic_stats_initializes_default_prior() {
        let mut profile = LearnerProfile::with_seed("ada", 1);
        let stats = profile.topic_stats("unseen");
        assert_eq!(stats.alpha, 1.0);
        assert_eq!(stats.beta, 1.0);
        assert_eq!(stats.success_rate, 0.0);
        assert!(profile.topic("unseen").is_some());
    }

    #[test]
    fn test_select_empty_candidates_fails() {
        let mut profile = LearnerProfile::with_seed("ada", 42);
        let empty: Vec<String> = Vec::new();
        assert!(matches!(
            profile.select_next_topic(&empty),
            Err(BanditError::EmptyCandidates)
        ));
        assert_eq!(profile.topic_count(), 0);
    }

    #[test]
    fn test_select_initializes_all_candidates() {
        let mut profile = LearnerProfile::with_seed("ada", 42);
        let chosen = profile.select_next_topic(&["a", "b", "c"]).unwrap();

        assert!(["a", "b", "c"].contains(&chosen.as_str()));
        assert_eq!(profile.topic_count(), 3);
        for id in ["a", "b", "c"] {
            assert_eq!(profile.topic(id).unwrap(), &TopicModel::default());
        }
    }

    #[test]
    fn test_select_prefers_weak_topic() {
        let mut profile = LearnerProfile::with_seed("ada", 42);
        profile.seed_topic("weak", 0, 999).unwrap();
        profile.seed_topic("strong", 999, 0).unwrap();

        let candidates = ids(&["strong", "weak"]);
        let mut weak_count = 0;
        for _ in 0..1000 {
            if profile.select_next_topic(&candidates).unwrap() == "weak" {
                weak_count += 1;
            }
        }

        assert!(weak_count >= 950, "weak topic chosen only {} / 1000 times", weak_count);
    }

    #[test]
    fn test_single_candidate_always_selected() {
        let mut profile = LearnerProfile::with_seed("ada", 7);
        for _ in 0..20 {
            assert_eq!(profile.select_next_topic(&["only"]).unwrap(), "only");
        }
    }

    /// Constant source: every Gamma(1) draw consumes three 0.5s and accepts
    /// with the same value, so every Beta(1, 1) draw is exactly 0.5
    struct Constant(f64);

    impl UniformSource for Constant {
        fn next_uniform(&mut self) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_ties_go_to_first_candidate() {
        let mut profile =
            LearnerProfile::with_generator("ada", VariateGenerator::new(Constant(0.5)));

        let selection = profile.select_topic(&["b", "a", "c"]).unwrap();
        assert_eq!(selection.topic_id, "b");
        assert_eq!(selection.score, 0.5);

        assert_eq!(profile.select_next_topic(&["c", "b", "a"]).unwrap(), "c");
    }

    #[test]
    fn test_selection_reports_score_and_confidence() {
        let mut profile = LearnerProfile::with_seed("ada", 42);
        let first = profile.select_topic(&["fresh"]).unwrap();
        assert!((0.0..=1.0).contains(&first.score));
        assert_eq!(first.confidence, 0.0);

        profile.seed_topic("fresh", 10, 10).unwrap();
        let later = profile.select_topic(&["fresh"]).unwrap();
        assert!((later.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_seed_reproducibility() {
        let candidates = ids(&["a", "b", "c", "d"]);
        let mut p1 = LearnerProfile::with_seed("ada", 99);
        let mut p2 = LearnerProfile::with_seed("ada", 99);

        for _ in 0..25 {
            assert_eq!(
                p1.select_topic(&candidates).unwrap(),
                p2.select_topic(&candidates).unwrap()
            );
        }
    }

    #[test]
    fn test_record_answers_batch() {
        let mut profile = LearnerProfile::with_seed("ada", 42);
        profile.record_answers(vec![
            AnswerEvent::new("a", true),
            AnswerEvent::new("a", true),
            AnswerEvent::new("b", false),
        ]);

        assert_eq!(profile.topic("a").unwrap().correct_answers(), 2);
        assert_eq!(profile.topic("b").unwrap().beta(), 2.0);
    }

    #[test]
    fn test_demo_account_is_seeded() {
        let mut profile = LearnerProfile::with_seed("TestAccount", 42);
        assert!(profile.is_demo_account());
        assert_eq!(profile.topic_count(), DEMO_ACCOUNT_SEED.len());

        let stats = profile.topic_stats("moral_scenarios");
        assert_eq!(stats.alpha, 5.0);
        assert_eq!(stats.beta, 17.0);
        assert_eq!(stats.total_attempts, 20);
        assert_eq!(stats.correct_answers, 4);
        assert!((stats.success_rate - 0.2).abs() < 1e-12);

        let ml = profile.topic_stats("machine_learning");
        assert_eq!(ml.total_attempts, 80);
    }

    #[test]
    fn test_regular_account_starts_empty() {
        let profile = LearnerProfile::with_seed("testaccount2", 42);
        assert!(!profile.is_demo_account());
        assert_eq!(profile.topic_count(), 0);
    }

    #[test]
    fn test_weakest_topics_ordering() {
        let profile = LearnerProfile::with_seed("testaccount", 42);
        let ranked = profile.weakest_topics();

        assert_eq!(ranked.len(), DEMO_ACCOUNT_SEED.len());
        assert_eq!(ranked[0].0, "moral_scenarios");
        assert!(ranked.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[test]
    fn test_all_topic_stats_sorted_and_json() {
        let mut profile = LearnerProfile::with_seed("ada", 42);
        profile.record_answer("zoology", true);
        profile.record_answer("art", false);

        let all = profile.all_topic_stats();
        let keys: Vec<&String> = all.keys().collect();
        assert_eq!(keys, vec!["art", "zoology"]);

        let json: serde_json::Value = serde_json::from_str(&profile.stats_json().unwrap()).unwrap();
        assert_eq!(json["zoology"]["correctAnswers"], 1);
        assert_eq!(json["art"]["beta"], 2.0);
    }

    #[test]
    fn test_with_options_applies_ceiling() {
        let options = ProfileOptions {
            seed: Some(5),
            max_gamma_iterations: Some(250),
        };
        let mut profile = LearnerProfile::with_options("ada", options);
        profile.record_answer("a", true);
        assert!(profile.select_next_topic(&["a", "b"]).is_ok());
        assert_eq!(profile.variates.max_gamma_iterations(), 250);
    }

    #[test]
    fn test_parallel_selection_matches_sequential() {
        let candidates = ids(&["a", "b", "c"]);
        let mut parallel: Vec<_> = (0..8)
            .map(|i| LearnerProfile::with_seed(format!("learner-{}", i), i))
            .collect();
        let mut sequential = parallel.clone();

        let results = select_next_topics_parallel(&mut parallel, &candidates);
        assert_eq!(results.len(), 8);

        for (result, profile) in results.into_iter().zip(sequential.iter_mut()) {
            assert_eq!(
                result.unwrap(),
                profile.select_next_topic(&candidates).unwrap()
            );
        }
    }

    /// Every call yields exactly zero
    struct Zero;

    impl UniformSource for Zero {
        fn next_uniform(&mut self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_all_zero_source_fails_after_initializing_candidates() {
        let variates = VariateGenerator::new(Zero).with_max_gamma_iterations(10);
        let mut profile = LearnerProfile::with_generator("ada", variates);
        profile.record_answer("b", true);

        let result = profile.select_next_topic(&["a", "b", "c"]);
        assert!(matches!(
            result,
            Err(BanditError::GammaIterationsExhausted { iterations: 10, .. })
        ));

        // All candidates exist, and no counter moved
        assert_eq!(profile.topic_count(), 3);
        assert_eq!(profile.topic("a").unwrap(), &TopicModel::default());
        assert_eq!(profile.topic("c").unwrap(), &TopicModel::default());
        assert_eq!(profile.topic_stats("b").total_attempts, 1);
    }

    #[test]
    fn test_seed_topic_rejects_invalid_counts_without_creating() {
        let mut profile = LearnerProfile::with_seed("ada", 1);

        let err = profile.seed_topic("overflow", u64::MAX, 1).unwrap_err();
        assert!(matches!(err, BanditError::InvalidSeedCounts { .. }));
        assert!(profile.topic("overflow").is_none());

        profile.record_answer("kept", true);
        assert!(profile.seed_topic("kept", 1 << 53, 0).is_err());
        assert_eq!(profile.topic_stats("kept").correct_answers, 1);
    }

    #[test]
    fn test_preferences_are_opaque() {
        let prefs = serde_json::json!({ "name": "Ada", "goal": "exam" });
        let profile = LearnerProfile::with_seed("Ada", 1).with_preferences(prefs.clone());

        assert_eq!(profile.preferences(), &prefs);
        assert_eq!(profile.topic_count(), 0);
        assert_eq!(
            LearnerProfile::with_seed("Bob", 1).preferences(),
            &serde_json::Value::Null
        );
    }
}
