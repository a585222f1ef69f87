//! Value-collision analysis.
//!
//! Scenario questions often pit two axes against each other: a question
//! *about* axis A (its primary link) that implicitly trades off against axis B
//! (its collision link). Across several such questions, the respondent's
//! answers reveal which of the two values they favor when forced to choose.
//!
//! Contributions here use each link's RAW weight, not the normalized weight
//! used for axis scores. Normalization keeps a question's total influence on
//! the profile fixed; collision strength should instead reflect how strongly
//! the question itself emphasizes each side.
//!
//! Pairs are keyed by the ORDERED `(primary, collision)` axis pair, so A→B
//! and B→A accumulate separately.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axes::AxisRegistry;
use crate::config::EngineConfig;
use crate::questions::{Question, QuestionAxisLink};
use crate::responses::ResponseSet;

const RESPONSE_MAGNITUDE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreferenceStrength {
    #[serde(rename = "weak")]
    Weak,
    #[serde(rename = "moderate")]
    Moderate,
    #[serde(rename = "strong")]
    Strong,
    #[serde(rename = "very strong")]
    VeryStrong,
}

/// Which side of a pair the respondent favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceDirection {
    Primary,
    Collision,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionScore {
    pub axis_primary: String,
    pub axis_collision: String,
    pub primary_name: String,
    pub collision_name: String,
    pub score_primary: f64,
    pub score_collision: f64,
    /// Positive leans toward the collision axis, negative toward the primary.
    pub preference_index: f64,
    pub preference_strength: PreferenceStrength,
    pub preference_direction: PreferenceDirection,
    pub question_count: usize,
    pub confidence_level: ConfidenceLevel,
    pub interestingness_score: f64,
}

/// How one question contributed to a specific collision pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionQuestionDetail {
    pub question_id: i64,
    pub question_text: String,
    pub response: i8,
    pub primary_contribution: f64,
    pub collision_contribution: f64,
    pub favored_axis: PreferenceDirection,
}

impl CollisionQuestionDetail {
    /// How decisively the question separated the two sides.
    pub fn decisiveness(&self) -> f64 {
        (self.primary_contribution - self.collision_contribution).abs()
    }
}

// ---------------------------------------------------------------------
//  Classification
// ---------------------------------------------------------------------

pub fn classify_preference(
    preference_index: f64,
    cfg: &EngineConfig,
) -> (PreferenceStrength, PreferenceDirection) {
    let magnitude = preference_index.abs();
    let strength = if magnitude < cfg.balanced_threshold {
        PreferenceStrength::Weak
    } else if magnitude < cfg.moderate_threshold {
        PreferenceStrength::Moderate
    } else if magnitude < cfg.strong_threshold {
        PreferenceStrength::Strong
    } else {
        PreferenceStrength::VeryStrong
    };
    let direction = if magnitude < cfg.balanced_threshold {
        PreferenceDirection::Balanced
    } else if preference_index > 0.0 {
        PreferenceDirection::Collision
    } else {
        PreferenceDirection::Primary
    };
    (strength, direction)
}

pub fn confidence_for(question_count: usize, cfg: &EngineConfig) -> ConfidenceLevel {
    if question_count < cfg.medium_confidence_questions {
        ConfidenceLevel::Low
    } else if question_count < cfg.high_confidence_questions {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::High
    }
}

/// Ranking heuristic: strong, well-sampled, confident preferences first;
/// balanced pairs are penalized as less informative.
pub fn interestingness(
    preference_index: f64,
    question_count: usize,
    confidence: ConfidenceLevel,
    direction: PreferenceDirection,
    cfg: &EngineConfig,
) -> f64 {
    let bonus = match confidence {
        ConfidenceLevel::High => cfg.interest_high_bonus,
        ConfidenceLevel::Medium => cfg.interest_medium_bonus,
        ConfidenceLevel::Low => 0.0,
    };
    let penalty = if direction == PreferenceDirection::Balanced {
        cfg.interest_balanced_penalty
    } else {
        0.0
    };
    preference_index.abs() * cfg.interest_strength_factor
        + question_count as f64 * cfg.interest_per_question
        + bonus
        - penalty
}

// ---------------------------------------------------------------------
//  Pair accumulation
// ---------------------------------------------------------------------

#[derive(Debug)]
struct PairData {
    primary: String,
    collision: String,
    question_count: usize,
    primary_sum: f64,
    collision_sum: f64,
    primary_weight: f64,
    collision_weight: f64,
}

impl PairData {
    fn new(primary: &str, collision: &str) -> Self {
        Self {
            primary: primary.to_string(),
            collision: collision.to_string(),
            question_count: 0,
            primary_sum: 0.0,
            collision_sum: 0.0,
            primary_weight: 0.0,
            collision_weight: 0.0,
        }
    }

    fn push(&mut self, r: f64, p: &QuestionAxisLink, c: &QuestionAxisLink) {
        self.question_count += 1;
        self.primary_sum += r * p.axis_key.sign() * p.weight;
        self.collision_sum += r * c.axis_key.sign() * c.weight;
        self.primary_weight += p.weight;
        self.collision_weight += c.weight;
    }
}

fn side_score(sum: f64, weight: f64) -> f64 {
    if weight > 0.0 {
        sum / (RESPONSE_MAGNITUDE * weight)
    } else {
        0.0
    }
}

/// Detect and rank collision pairs, most interesting first.
pub fn analyze_collisions(
    responses: &ResponseSet,
    questions: &[Question],
    axes: &AxisRegistry,
    cfg: &EngineConfig,
) -> Vec<CollisionScore> {
    let mut pairs: Vec<PairData> = Vec::new();
    let mut pair_index: HashMap<(String, String), usize> = HashMap::new();

    for q in questions.iter().filter(|q| q.active && q.is_multi_axis()) {
        let Some(r) = responses.value(q.id) else {
            continue;
        };
        if !q.has_collision() {
            debug!(
                question_id = q.id,
                "Multi-axis question lacks a primary/collision link pair; no collision recorded"
            );
            continue;
        }

        for p in q.primary_links() {
            for c in q.collision_links() {
                let key = (p.axis_id.clone(), c.axis_id.clone());
                let idx = match pair_index.get(&key).copied() {
                    Some(idx) => idx,
                    None => {
                        pairs.push(PairData::new(&p.axis_id, &c.axis_id));
                        let idx = pairs.len() - 1;
                        pair_index.insert(key, idx);
                        idx
                    }
                };
                pairs[idx].push(r, p, c);
            }
        }
    }

    let mut scores = Vec::new();
    for pair in pairs {
        if pair.question_count < cfg.min_collision_questions {
            debug!(
                primary = %pair.primary,
                collision = %pair.collision,
                question_count = pair.question_count,
                "Dropping under-sampled collision pair"
            );
            continue;
        }

        let score_primary = side_score(pair.primary_sum, pair.primary_weight);
        let score_collision = side_score(pair.collision_sum, pair.collision_weight);
        let preference_index = (score_collision - score_primary) / 2.0;

        let (strength, direction) = classify_preference(preference_index, cfg);
        let confidence = confidence_for(pair.question_count, cfg);
        let interest = interestingness(
            preference_index,
            pair.question_count,
            confidence,
            direction,
            cfg,
        );

        scores.push(CollisionScore {
            primary_name: axes.display_name(&pair.primary).to_string(),
            collision_name: axes.display_name(&pair.collision).to_string(),
            axis_primary: pair.primary,
            axis_collision: pair.collision,
            score_primary,
            score_collision,
            preference_index,
            preference_strength: strength,
            preference_direction: direction,
            question_count: pair.question_count,
            confidence_level: confidence,
            interestingness_score: interest,
        });
    }

    // Stable: ties keep first-seen pair order.
    scores.sort_by(|a, b| {
        b.interestingness_score
            .partial_cmp(&a.interestingness_score)
            .unwrap_or(Ordering::Equal)
    });
    scores
}

/// Collisions worth showing: low-confidence pairs removed, first `limit` kept.
pub fn displayable_collisions(scores: &[CollisionScore], limit: usize) -> Vec<CollisionScore> {
    scores
        .iter()
        .filter(|c| c.confidence_level != ConfidenceLevel::Low)
        .take(limit)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------
//  Per-pair drill-down
// ---------------------------------------------------------------------

fn pair_links<'a>(
    q: &'a Question,
    primary_axis: &str,
    collision_axis: &str,
) -> Option<(&'a QuestionAxisLink, &'a QuestionAxisLink)> {
    let p = q.primary_links().find(|l| l.axis_id == primary_axis)?;
    let c = q.collision_links().find(|l| l.axis_id == collision_axis)?;
    Some((p, c))
}

/// Questions carrying `primary_axis` as primary and `collision_axis` as collision.
pub fn find_collision_questions<'a>(
    primary_axis: &str,
    collision_axis: &str,
    questions: &'a [Question],
) -> Vec<&'a Question> {
    questions
        .iter()
        .filter(|q| q.is_multi_axis() && pair_links(q, primary_axis, collision_axis).is_some())
        .collect()
}

/// Per-question breakdown of one pair, most decisive question first.
pub fn collision_question_details(
    primary_axis: &str,
    collision_axis: &str,
    responses: &ResponseSet,
    questions: &[Question],
    cfg: &EngineConfig,
) -> Vec<CollisionQuestionDetail> {
    let mut details: Vec<CollisionQuestionDetail> =
        find_collision_questions(primary_axis, collision_axis, questions)
            .into_iter()
            .filter_map(|q| {
                let response = responses.get(q.id)?;
                let (p, c) = pair_links(q, primary_axis, collision_axis)?;
                let r = f64::from(response);
                let primary_contribution = r * p.axis_key.sign() * p.weight;
                let collision_contribution = r * c.axis_key.sign() * c.weight;

                let favored_axis =
                    if (primary_contribution - collision_contribution).abs() < cfg.detail_balanced_diff {
                        PreferenceDirection::Balanced
                    } else if primary_contribution > collision_contribution {
                        PreferenceDirection::Primary
                    } else {
                        PreferenceDirection::Collision
                    };

                Some(CollisionQuestionDetail {
                    question_id: q.id,
                    question_text: q.text.clone(),
                    response,
                    primary_contribution,
                    collision_contribution,
                    favored_axis,
                })
            })
            .collect();

    details.sort_by(|a, b| {
        b.decisiveness()
            .partial_cmp(&a.decisiveness())
            .unwrap_or(Ordering::Equal)
    });
    details
}
