//! Score aggregation: responses → per-axis normalized scores.
//!
//! Every question spreads a fixed amount of influence, its target weight,
//! across its links. A question linked to three axes therefore moves the
//! profile exactly as much in total as a question linked to one, instead of
//! dominating simply by being linked more often.
//!
//! For a question with response `r` and links `l_1..l_n`:
//!
//! ```text
//! factor        = target_weight / Σ l_i.weight
//! contribution  = r * l_i.key * l_i.weight * factor
//! score(axis)   = Σ contribution / (2 * Σ normalized weight)
//! ```
//!
//! The `2` is the largest possible `|r|`, so scores land in `[-1, 1]`. With a
//! single link per question and uniform weights this reduces to the classic
//! `Σ(r * key) / (2 * count)` average.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::debug;

use crate::axes::{AxisKind, AxisRegistry};
use crate::questions::{Question, QuestionType};
use crate::responses::ResponseSet;

/// Largest possible |response| on the Likert scale.
const RESPONSE_MAGNITUDE: f64 = 2.0;

// ---------------------------------------------------------------------
//  Output types
// ---------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScore {
    pub axis_id: String,
    pub name: String,
    /// Normalized score in `[-1, 1]`.
    pub score: f64,
    /// Σ normalized contributions.
    pub raw_sum: f64,
    /// Σ normalized link weights.
    pub total_weight: f64,
    /// Mean |response| over contributing answers (0..=2).
    pub confidence: f64,
    /// Population variance of |response| over contributing answers.
    pub response_variance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisContribution {
    pub axis_id: String,
    /// `r * key * link.weight`, before normalization.
    pub raw_contribution: f64,
    /// `r * key * link.weight * factor`, as accumulated into the score.
    pub normalized_contribution: f64,
}

/// Audit record of how one answered question was spread across axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionContribution {
    pub question_id: i64,
    pub response_value: i8,
    pub contributions: Vec<AxisContribution>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    /// One entry per axis that received at least one answer. Axes without
    /// answers are absent rather than scored 0.
    pub axis_scores: Vec<AxisScore>,
    pub question_contributions: Vec<QuestionContribution>,
}

impl ScoreOutcome {
    pub fn get(&self, axis_id: &str) -> Option<&AxisScore> {
        self.axis_scores.iter().find(|s| s.axis_id == axis_id)
    }
}

/// Axis scores partitioned by axis family.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreFacetSplit {
    pub core: Vec<AxisScore>,
    pub facets: Vec<AxisScore>,
}

/// Difference between abstract beliefs and scenario judgments on one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisGap {
    pub axis_id: String,
    pub name: String,
    pub conceptual: f64,
    pub applied: f64,
    pub gap: f64,
    pub significant: bool,
}

// ---------------------------------------------------------------------
//  Accumulation
// ---------------------------------------------------------------------

#[derive(Debug)]
struct AxisAccumulator {
    axis_id: String,
    sum: f64,
    total_weight: f64,
    magnitudes: Vec<f64>,
}

/// Per-axis accumulators in first-seen order.
#[derive(Debug, Default)]
struct Accumulators {
    axes: Vec<AxisAccumulator>,
    index: HashMap<String, usize>,
}

impl Accumulators {
    fn add(&mut self, axis_id: &str, contribution: f64, weight: f64, magnitude: f64) {
        let idx = match self.index.get(axis_id).copied() {
            Some(idx) => idx,
            None => {
                self.axes.push(AxisAccumulator {
                    axis_id: axis_id.to_string(),
                    sum: 0.0,
                    total_weight: 0.0,
                    magnitudes: Vec::new(),
                });
                let idx = self.axes.len() - 1;
                self.index.insert(axis_id.to_string(), idx);
                idx
            }
        };
        let acc = &mut self.axes[idx];
        acc.sum += contribution;
        acc.total_weight += weight;
        acc.magnitudes.push(magnitude);
    }
}

fn mean_and_variance(samples: &[f64]) -> (f64, f64) {
    match samples.len() {
        0 => (0.0, 0.0),
        1 => (samples[0], 0.0),
        _ => {
            let mean = samples.iter().mean();
            let variance = samples.iter().population_variance();
            (mean, variance.max(0.0))
        }
    }
}

// ---------------------------------------------------------------------
//  Scoring
// ---------------------------------------------------------------------

/// Score every active, answered question in `questions`.
pub fn score(responses: &ResponseSet, questions: &[Question], axes: &AxisRegistry) -> ScoreOutcome {
    score_filtered(responses, questions.iter(), axes)
}

/// Score only the questions of one type (conceptual or applied).
pub fn score_by_type(
    responses: &ResponseSet,
    questions: &[Question],
    axes: &AxisRegistry,
    question_type: QuestionType,
) -> ScoreOutcome {
    score_filtered(
        responses,
        questions.iter().filter(|q| q.question_type == question_type),
        axes,
    )
}

fn score_filtered<'a>(
    responses: &ResponseSet,
    questions: impl Iterator<Item = &'a Question>,
    axes: &AxisRegistry,
) -> ScoreOutcome {
    let mut acc = Accumulators::default();
    let mut question_contributions = Vec::new();

    for q in questions {
        if !q.active {
            continue;
        }
        let Some(response) = responses.get(q.id) else {
            continue;
        };
        let r = f64::from(response);

        let question_total_weight = q.total_link_weight();
        if question_total_weight <= 0.0 {
            debug!(question_id = q.id, "Question has zero total link weight; skipping");
            continue;
        }
        let factor = q.weight / question_total_weight;

        let mut contributions = Vec::with_capacity(q.links.len());
        for link in &q.links {
            let normalized_weight = link.weight * factor;
            let signed = r * link.axis_key.sign();
            let normalized_contribution = signed * normalized_weight;
            contributions.push(AxisContribution {
                axis_id: link.axis_id.clone(),
                raw_contribution: signed * link.weight,
                normalized_contribution,
            });
            if normalized_weight > 0.0 {
                acc.add(&link.axis_id, normalized_contribution, normalized_weight, r.abs());
            }
        }

        question_contributions.push(QuestionContribution {
            question_id: q.id,
            response_value: response,
            contributions,
        });
    }

    let axis_scores = acc
        .axes
        .into_iter()
        .map(|a| {
            let score = if a.total_weight > 0.0 {
                (a.sum / (RESPONSE_MAGNITUDE * a.total_weight)).clamp(-1.0, 1.0)
            } else {
                0.0
            };
            let (confidence, response_variance) = mean_and_variance(&a.magnitudes);
            AxisScore {
                name: axes.display_name(&a.axis_id).to_string(),
                axis_id: a.axis_id,
                score,
                raw_sum: a.sum,
                total_weight: a.total_weight,
                confidence,
                response_variance,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        axes = axis_scores.len(),
        questions = question_contributions.len(),
        "Scored responses"
    );

    ScoreOutcome {
        axis_scores,
        question_contributions,
    }
}

// ---------------------------------------------------------------------
//  Post-processing
// ---------------------------------------------------------------------

/// Partition scores into core axes and facets, preserving order.
pub fn split_core_and_facets(scores: &[AxisScore], axes: &AxisRegistry) -> CoreFacetSplit {
    let (core, facets): (Vec<AxisScore>, Vec<AxisScore>) = scores
        .iter()
        .cloned()
        .partition(|s| axes.kind_of(&s.axis_id) == AxisKind::Core);
    CoreFacetSplit { core, facets }
}

/// Compare conceptual and applied scores on every axis present in both,
/// largest gap first.
pub fn conceptual_applied_gaps(
    conceptual: &[AxisScore],
    applied: &[AxisScore],
    threshold: f64,
) -> Vec<AxisGap> {
    let applied_by_id: HashMap<&str, f64> = applied
        .iter()
        .map(|s| (s.axis_id.as_str(), s.score))
        .collect();

    let mut gaps: Vec<AxisGap> = conceptual
        .iter()
        .filter_map(|c| {
            let applied = *applied_by_id.get(c.axis_id.as_str())?;
            let gap = (c.score - applied).abs();
            Some(AxisGap {
                axis_id: c.axis_id.clone(),
                name: c.name.clone(),
                conceptual: c.score,
                applied,
                gap,
                significant: gap > threshold,
            })
        })
        .collect();

    gaps.sort_by(|a, b| b.gap.partial_cmp(&a.gap).unwrap_or(Ordering::Equal));
    gaps
}
