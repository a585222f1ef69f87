//! One-shot survey evaluation and report generation.
//!
//! [`evaluate_survey`] runs the full pipeline for one session: it validates
//! the raw input, scores all, conceptual-only and applied-only questions,
//! matches archetypes, analyzes collisions over the applied (scenario)
//! questions and bundles the results. Every report carries a blake3 hash of
//! its input so a stored result can be re-derived and compared later.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::archetypes::{
    match_archetypes, positive_matches, top_matches, ArchetypeCatalog, FlavorMatch,
};
use crate::axes::{pole_label, Axis, AxisKind, AxisRegistry};
use crate::collisions::{
    analyze_collisions, displayable_collisions, CollisionScore, PreferenceDirection,
};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::questions::{normalize_questions, QuestionRecord, QuestionType};
use crate::responses::{RawResponses, ResponseSet};
use crate::scoring::{
    conceptual_applied_gaps, score, score_by_type, split_core_and_facets, AxisGap, AxisScore,
    QuestionContribution,
};

/// Everything the storage layer supplies for one survey session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyInput {
    pub responses: RawResponses,
    pub questions: Vec<QuestionRecord>,
    pub axes: Vec<Axis>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSummary {
    pub axis_id: String,
    pub name: String,
    pub kind: AxisKind,
    pub score: f64,
    pub pole_label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub questions_total: usize,
    pub questions_answered: usize,
    pub axes_scored: usize,
    pub collision_pairs: usize,
    pub significant_gaps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyReport {
    pub input_hash: String,
    pub summary: ReportSummary,
    pub profile: Vec<AxisSummary>,
    pub axis_scores: Vec<AxisScore>,
    pub core_axes: Vec<AxisScore>,
    pub facets: Vec<AxisScore>,
    pub conceptual_scores: Vec<AxisScore>,
    pub applied_scores: Vec<AxisScore>,
    pub gaps: Vec<AxisGap>,
    /// Every archetype, best match first.
    pub flavor_matches: Vec<FlavorMatch>,
    pub top_flavors: Vec<FlavorMatch>,
    /// Matches above the persistence threshold.
    pub persisted_flavors: Vec<FlavorMatch>,
    pub collision_scores: Vec<CollisionScore>,
    pub displayed_collisions: Vec<CollisionScore>,
    pub question_contributions: Vec<QuestionContribution>,
}

/// Validate `input` and run every analysis. Fails before producing any output
/// if the input or configuration is invalid.
pub fn evaluate_survey(
    input: &SurveyInput,
    catalog: &ArchetypeCatalog,
    cfg: &EngineConfig,
) -> Result<SurveyReport> {
    cfg.validate()?;
    let responses = ResponseSet::from_raw(
        input.responses.iter().map(|(&q, &v)| (q, v)),
        cfg.response_policy,
    )?;
    let questions = normalize_questions(&input.questions, cfg)?;
    let axes: AxisRegistry = input.axes.iter().cloned().collect();

    let overall = score(&responses, &questions, &axes);
    let conceptual = score_by_type(&responses, &questions, &axes, QuestionType::Conceptual);
    let applied = score_by_type(&responses, &questions, &axes, QuestionType::Applied);
    let split = split_core_and_facets(&overall.axis_scores, &axes);
    let gaps = conceptual_applied_gaps(
        &conceptual.axis_scores,
        &applied.axis_scores,
        cfg.gap_threshold,
    );

    let flavor_matches = match_archetypes(&overall.axis_scores, catalog);
    let top_flavors = top_matches(&flavor_matches, cfg.top_flavors);
    let persisted_flavors = positive_matches(&flavor_matches, cfg.min_persisted_affinity);

    let applied_questions: Vec<_> = questions
        .iter()
        .filter(|q| q.question_type == QuestionType::Applied)
        .cloned()
        .collect();
    let collision_scores = analyze_collisions(&responses, &applied_questions, &axes, cfg);
    let displayed_collisions = displayable_collisions(&collision_scores, cfg.displayed_collisions);

    let profile = overall
        .axis_scores
        .iter()
        .map(|s| AxisSummary {
            axis_id: s.axis_id.clone(),
            name: s.name.clone(),
            kind: axes.kind_of(&s.axis_id),
            score: s.score,
            pole_label: axes
                .get(&s.axis_id)
                .map(|a| a.pole_label(s.score))
                .unwrap_or_else(|| pole_label(s.score, "Negative", "Positive")),
            confidence: s.confidence,
        })
        .collect();

    let summary = ReportSummary {
        questions_total: questions.iter().filter(|q| q.active).count(),
        questions_answered: overall.question_contributions.len(),
        axes_scored: overall.axis_scores.len(),
        collision_pairs: collision_scores.len(),
        significant_gaps: gaps.iter().filter(|g| g.significant).count(),
    };
    debug!(
        answered = summary.questions_answered,
        axes = summary.axes_scored,
        collisions = summary.collision_pairs,
        "Evaluated survey"
    );

    Ok(SurveyReport {
        input_hash: input_hash(input),
        summary,
        profile,
        axis_scores: overall.axis_scores,
        core_axes: split.core,
        facets: split.facets,
        conceptual_scores: conceptual.axis_scores,
        applied_scores: applied.axis_scores,
        gaps,
        flavor_matches,
        top_flavors,
        persisted_flavors,
        collision_scores,
        displayed_collisions,
        question_contributions: overall.question_contributions,
    })
}

/// blake3 of the canonical JSON form of the input.
pub fn input_hash(input: &SurveyInput) -> String {
    let bytes = serde_json::to_vec(input).unwrap_or_default();
    blake3::hash(&bytes).to_hex().to_string()
}

pub fn render_report_markdown(report: &SurveyReport) -> String {
    let mut out = String::new();
    out.push_str("# Survey Report\n\n");
    out.push_str(&format!("- Input hash: `{}`\n", report.input_hash));
    out.push_str(&format!(
        "- Questions answered: {}/{}\n",
        report.summary.questions_answered, report.summary.questions_total
    ));
    out.push_str(&format!("- Axes scored: {}\n", report.summary.axes_scored));
    out.push_str(&format!(
        "- Collision pairs: {}\n",
        report.summary.collision_pairs
    ));

    for (title, kind) in [("Core Axes", AxisKind::Core), ("Facets", AxisKind::Facet)] {
        let rows: Vec<&AxisSummary> = report.profile.iter().filter(|a| a.kind == kind).collect();
        if rows.is_empty() {
            continue;
        }
        out.push_str(&format!("\n## {title}\n\n"));
        for axis in rows {
            out.push_str(&format!(
                "- {} `{}`: {:+.3} ({}, confidence {:.2})\n",
                axis.name, axis.axis_id, axis.score, axis.pole_label, axis.confidence
            ));
        }
    }

    if !report.top_flavors.is_empty() {
        out.push_str("\n## Top Archetypes\n\n");
        for flavor in &report.top_flavors {
            out.push_str(&format!(
                "- {} ({}): {:+.3}\n",
                flavor.name,
                flavor.match_strength.label(),
                flavor.affinity
            ));
        }
    }

    if !report.displayed_collisions.is_empty() {
        out.push_str("\n## Value Tensions\n\n");
        for c in &report.displayed_collisions {
            let favored = match c.preference_direction {
                PreferenceDirection::Primary => c.primary_name.as_str(),
                PreferenceDirection::Collision => c.collision_name.as_str(),
                PreferenceDirection::Balanced => "balanced",
            };
            out.push_str(&format!(
                "- {} vs {}: favors {} (index {:+.3}, {} questions, {:?} confidence)\n",
                c.primary_name,
                c.collision_name,
                favored,
                c.preference_index,
                c.question_count,
                c.confidence_level
            ));
        }
    }

    let significant: Vec<&AxisGap> = report.gaps.iter().filter(|g| g.significant).collect();
    if !significant.is_empty() {
        out.push_str("\n## Conceptual vs Applied Gaps\n\n");
        for gap in significant {
            out.push_str(&format!(
                "- {}: conceptual {:+.3}, applied {:+.3} (gap {:.3})\n",
                gap.name, gap.conceptual, gap.applied, gap.gap
            ));
        }
    }

    out
}
