//! Per-question drill-down for a single axis.
//!
//! Explains an axis score by listing the answered questions behind it and
//! flagging outliers: strong answers that pull against the respondent's
//! overall tendency on that axis. Purely explanatory; nothing here feeds back
//! into scoring.

use serde::{Deserialize, Serialize};

use crate::axes::AxisRegistry;
use crate::config::EngineConfig;
use crate::questions::{Question, QuestionAxisLink, QuestionType};
use crate::responses::ResponseSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionDirection {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionInsight {
    pub question_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub response: i8,
    /// Normalized contribution of the question's link on this axis, the same
    /// value the scorer accumulates.
    pub contribution: f64,
    pub direction: ContributionDirection,
    pub is_outlier: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDrillDown {
    pub axis_id: String,
    pub axis_name: String,
    pub conceptual: Vec<QuestionInsight>,
    pub applied: Vec<QuestionInsight>,
    pub outlier_count: usize,
}

impl AxisDrillDown {
    pub fn is_empty(&self) -> bool {
        self.conceptual.is_empty() && self.applied.is_empty()
    }

    pub fn outliers(&self) -> impl Iterator<Item = &QuestionInsight> {
        self.conceptual
            .iter()
            .chain(self.applied.iter())
            .filter(|i| i.is_outlier)
    }
}

pub fn contribution_direction(contribution: f64, cfg: &EngineConfig) -> ContributionDirection {
    if contribution > cfg.direction_threshold {
        ContributionDirection::Positive
    } else if contribution < -cfg.direction_threshold {
        ContributionDirection::Negative
    } else {
        ContributionDirection::Neutral
    }
}

/// A contribution is an outlier when it is strong and opposes a clear overall
/// tendency.
pub fn is_outlier(contribution: f64, overall_score: f64, cfg: &EngineConfig) -> bool {
    let significant = contribution.abs() > cfg.outlier_min_contribution;
    let opposing = (overall_score > cfg.outlier_score_threshold
        && contribution < -cfg.direction_threshold)
        || (overall_score < -cfg.outlier_score_threshold
            && contribution > cfg.direction_threshold);
    significant && opposing
}

/// The link's share of the question's weight, as used for scoring.
fn normalized_weight(question: &Question, link: &QuestionAxisLink) -> f64 {
    let total = question.total_link_weight();
    if total > 0.0 {
        link.weight * (question.weight / total)
    } else {
        0.0
    }
}

/// Analyze one answered question against an axis's overall score.
///
/// Returns `None` when the question has no link on `axis_id`.
pub fn analyze_question(
    question: &Question,
    axis_id: &str,
    response: i8,
    overall_score: f64,
    cfg: &EngineConfig,
) -> Option<QuestionInsight> {
    let link = question.link_for(axis_id)?;
    let contribution =
        f64::from(response) * link.axis_key.sign() * normalized_weight(question, link);
    Some(QuestionInsight {
        question_id: question.id,
        question_text: question.text.clone(),
        question_type: question.question_type,
        response,
        contribution,
        direction: contribution_direction(contribution, cfg),
        is_outlier: is_outlier(contribution, overall_score, cfg),
    })
}

/// Build the drill-down for one axis. Conceptual questions are judged against
/// the conceptual score and applied questions against the applied score.
pub fn drill_down(
    axis_id: &str,
    questions: &[Question],
    responses: &ResponseSet,
    axes: &AxisRegistry,
    conceptual_score: f64,
    applied_score: f64,
    cfg: &EngineConfig,
) -> AxisDrillDown {
    let mut conceptual = Vec::new();
    let mut applied = Vec::new();

    for q in questions.iter().filter(|q| q.active) {
        let Some(response) = responses.get(q.id) else {
            continue;
        };
        let overall = match q.question_type {
            QuestionType::Conceptual => conceptual_score,
            QuestionType::Applied => applied_score,
        };
        let Some(insight) = analyze_question(q, axis_id, response, overall, cfg) else {
            continue;
        };
        match q.question_type {
            QuestionType::Conceptual => conceptual.push(insight),
            QuestionType::Applied => applied.push(insight),
        }
    }

    let outlier_count = conceptual
        .iter()
        .chain(applied.iter())
        .filter(|i| i.is_outlier)
        .count();

    AxisDrillDown {
        axis_id: axis_id.to_string(),
        axis_name: axes.display_name(axis_id).to_string(),
        conceptual,
        applied,
        outlier_count,
    }
}
