#![forbid(unsafe_code)]

//! # tenaxes
//!
//! Scoring and value-collision engine for the TenAxes survey.
//!
//! Respondents answer Likert questions (-2..=2). Each question is linked to
//! one or more axes. The engine turns one session's answers into:
//!
//! - normalized per-axis scores with confidence and variance ([`scoring`]),
//! - affinities with a catalog of ideological archetypes ([`archetypes`]),
//! - ranked "value collisions", pairs of axes the respondent trades off
//!   against each other in scenario questions ([`collisions`]),
//! - per-question outlier explanations ([`drilldown`]),
//! - cross-session axis and archetype statistics ([`aggregate`]).
//!
//! Everything is pure and deterministic: identical inputs give identical
//! outputs, with no I/O or shared state on the scoring path.

pub mod aggregate;
pub mod archetypes;
pub mod axes;
pub mod collisions;
pub mod config;
pub mod drilldown;
pub mod error;
pub mod ordering;
pub mod questions;
pub mod report;
pub mod responses;
pub mod scoring;

pub use aggregate::{axis_aggregates, flavor_popularity, AxisAggregate, FlavorPopularity};
pub use archetypes::{
    match_archetypes, ArchetypeCatalog, FlavorArchetype, FlavorMatch, MatchStrength,
};
pub use axes::{Axis, AxisKind, AxisRegistry};
pub use collisions::{
    analyze_collisions, CollisionScore, ConfidenceLevel, PreferenceDirection, PreferenceStrength,
};
pub use config::{load_config_from_path, EngineConfig, ResponsePolicy};
pub use drilldown::{drill_down, AxisDrillDown, QuestionInsight};
pub use error::{EngineError, Result};
pub use questions::{
    normalize_questions, AxisKey, LinkRole, Question, QuestionAxisLink, QuestionRecord,
    QuestionType,
};
pub use report::{evaluate_survey, render_report_markdown, SurveyInput, SurveyReport};
pub use responses::ResponseSet;
pub use scoring::{score, AxisScore, QuestionContribution, ScoreOutcome};
