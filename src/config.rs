//! Engine configuration: thresholds, weights and display limits.
//!
//! Every tunable has a default matching the production survey. A config file
//! only needs to name the fields it overrides:
//!
//! ```json
//! { "response_policy": "clamp", "min_collision_questions": 3 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// What to do with a response outside the `[-2, 2]` Likert range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponsePolicy {
    /// Fail the whole scoring call before producing any output.
    #[default]
    Reject,
    /// Clamp into range and log a warning.
    Clamp,
}

/// Configuration for scoring, collision analysis and outlier detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // -- Scoring ------------------------------------------------------------

    /// Target weight for a question that declares none. Also the weight of the
    /// implicit primary link synthesized for link-less questions.
    pub default_question_weight: f64,
    /// Handling of out-of-range Likert values.
    pub response_policy: ResponsePolicy,

    // -- Collision analysis -------------------------------------------------

    /// Pairs backed by fewer questions than this are dropped.
    pub min_collision_questions: usize,
    /// |preference_index| below this is "balanced" (and strength "weak").
    pub balanced_threshold: f64,
    /// |preference_index| below this is "moderate".
    pub moderate_threshold: f64,
    /// |preference_index| below this is "strong"; at or above, "very strong".
    pub strong_threshold: f64,
    /// Question counts below this are low confidence.
    pub medium_confidence_questions: usize,
    /// Question counts below this (and not low) are medium confidence.
    pub high_confidence_questions: usize,

    // -- Interestingness ----------------------------------------------------
    // interestingness = |pi| * strength + count * per_question + bonus - balanced_penalty

    pub interest_strength_factor: f64,
    pub interest_per_question: f64,
    pub interest_high_bonus: f64,
    pub interest_medium_bonus: f64,
    pub interest_balanced_penalty: f64,

    /// Per-question |primary - collision| below this is shown as balanced.
    pub detail_balanced_diff: f64,

    // -- Outliers -----------------------------------------------------------

    /// Minimum |contribution| for a question to count as an outlier.
    pub outlier_min_contribution: f64,
    /// |overall score| must exceed this before anything can oppose it.
    pub outlier_score_threshold: f64,
    /// |contribution| above this has a direction; below it is neutral.
    pub direction_threshold: f64,

    // -- Reporting ----------------------------------------------------------

    /// Conceptual vs applied gaps above this are flagged as significant.
    pub gap_threshold: f64,
    /// Flavor matches kept in a report.
    pub top_flavors: usize,
    /// Flavor affinity a match must exceed to be persisted.
    pub min_persisted_affinity: f64,
    /// Collisions surfaced for display (low-confidence pairs excluded).
    pub displayed_collisions: usize,

    // -- Cross-session aggregates -------------------------------------------

    /// Points for a rank-1 flavor; each lower rank earns one point less.
    pub popularity_rank_points: usize,
    /// Flavors kept in the popularity ranking.
    pub popular_flavors: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_question_weight: 1.25,
            response_policy: ResponsePolicy::Reject,
            min_collision_questions: 2,
            balanced_threshold: 0.15,
            moderate_threshold: 0.35,
            strong_threshold: 0.60,
            medium_confidence_questions: 3,
            high_confidence_questions: 5,
            interest_strength_factor: 40.0,
            interest_per_question: 5.0,
            interest_high_bonus: 20.0,
            interest_medium_bonus: 10.0,
            interest_balanced_penalty: 10.0,
            detail_balanced_diff: 0.3,
            outlier_min_contribution: 1.5,
            outlier_score_threshold: 0.2,
            direction_threshold: 0.5,
            gap_threshold: 0.2,
            top_flavors: 5,
            min_persisted_affinity: 0.1,
            displayed_collisions: 5,
            popularity_rank_points: 5,
            popular_flavors: 15,
        }
    }
}

impl EngineConfig {
    /// Check that thresholds are finite and ordered.
    pub fn validate(&self) -> Result<()> {
        if !self.default_question_weight.is_finite() || self.default_question_weight <= 0.0 {
            return Err(EngineError::Config(
                "default_question_weight must be finite and > 0".to_string(),
            ));
        }
        if self.min_collision_questions == 0 {
            return Err(EngineError::Config(
                "min_collision_questions must be >= 1".to_string(),
            ));
        }
        let ladder = [
            self.balanced_threshold,
            self.moderate_threshold,
            self.strong_threshold,
        ];
        if ladder.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(EngineError::Config(
                "preference thresholds must be finite and >= 0".to_string(),
            ));
        }
        if !(ladder[0] <= ladder[1] && ladder[1] <= ladder[2]) {
            return Err(EngineError::Config(
                "preference thresholds must be ordered balanced <= moderate <= strong".to_string(),
            ));
        }
        if self.medium_confidence_questions > self.high_confidence_questions {
            return Err(EngineError::Config(
                "medium_confidence_questions must be <= high_confidence_questions".to_string(),
            ));
        }
        let coefficients = [
            self.interest_strength_factor,
            self.interest_per_question,
            self.interest_high_bonus,
            self.interest_medium_bonus,
            self.interest_balanced_penalty,
            self.detail_balanced_diff,
            self.outlier_min_contribution,
            self.outlier_score_threshold,
            self.direction_threshold,
            self.gap_threshold,
            self.min_persisted_affinity,
        ];
        if coefficients.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::Config(
                "all coefficients must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read, parse and validate an [`EngineConfig`] from a JSON file.
pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let config: EngineConfig = serde_json::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}
