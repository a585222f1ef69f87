//! Question link model and ingestion.
//!
//! Questions arrive from survey storage as [`QuestionRecord`]s. A record may
//! carry explicit axis links or none at all; older single-axis questions only
//! name a default axis, key and weight. [`normalize_question`] turns every
//! record into a canonical [`Question`] whose `links` list is never empty, so
//! scoring and collision analysis only ever walk links.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Directional key of a link: whether agreeing moves the axis toward its
/// positive or negative pole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum AxisKey {
    Negative,
    Positive,
}

impl AxisKey {
    pub fn sign(self) -> f64 {
        match self {
            AxisKey::Negative => -1.0,
            AxisKey::Positive => 1.0,
        }
    }
}

impl TryFrom<i64> for AxisKey {
    type Error = EngineError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            -1 => Ok(AxisKey::Negative),
            1 => Ok(AxisKey::Positive),
            other => Err(EngineError::InvalidAxisKey(other)),
        }
    }
}

impl From<AxisKey> for i64 {
    fn from(key: AxisKey) -> Self {
        match key {
            AxisKey::Negative => -1,
            AxisKey::Positive => 1,
        }
    }
}

/// Role of a link within its question.
///
/// A `primary` link names the axis the question is about; a `collision` link
/// names an axis the scenario implicitly trades off against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRole {
    Primary,
    Collision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Abstract statement of principle.
    #[default]
    Conceptual,
    /// Concrete scenario judgment.
    Applied,
}

// =============================================================================
// Storage records
// =============================================================================

/// Link row as stored alongside a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<i64>,
    pub axis_id: String,
    pub role: LinkRole,
    pub axis_key: AxisKey,
    pub weight: f64,
}

/// Question row as stored, with its (possibly empty) link list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: i64,
    #[serde(default)]
    pub text: String,
    /// Default axis, used when the question has no explicit links.
    pub axis_id: String,
    /// Default directional key, used when the question has no explicit links.
    pub key: AxisKey,
    /// Declared weight. `None` falls back to the configured default.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub question_type: QuestionType,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub question_axis_links: Vec<LinkRecord>,
}

fn default_active() -> bool {
    true
}

impl QuestionRecord {
    pub fn new(id: i64, axis_id: impl Into<String>, key: AxisKey) -> Self {
        Self {
            id,
            text: String::new(),
            axis_id: axis_id.into(),
            key,
            weight: None,
            question_type: QuestionType::Conceptual,
            active: true,
            question_axis_links: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_type(mut self, question_type: QuestionType) -> Self {
        self.question_type = question_type;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn with_link(
        mut self,
        axis_id: impl Into<String>,
        role: LinkRole,
        axis_key: AxisKey,
        weight: f64,
    ) -> Self {
        self.question_axis_links.push(LinkRecord {
            question_id: Some(self.id),
            axis_id: axis_id.into(),
            role,
            axis_key,
            weight,
        });
        self
    }
}

// =============================================================================
// Canonical model
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionAxisLink {
    pub question_id: i64,
    pub axis_id: String,
    pub role: LinkRole,
    pub axis_key: AxisKey,
    pub weight: f64,
}

/// A question with a validated, non-empty link list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub default_axis_id: String,
    pub default_key: AxisKey,
    /// Target weight: the total influence the question has across all its links.
    pub weight: f64,
    pub question_type: QuestionType,
    pub active: bool,
    pub links: Vec<QuestionAxisLink>,
}

impl Question {
    pub fn primary_links(&self) -> impl Iterator<Item = &QuestionAxisLink> {
        self.links.iter().filter(|l| l.role == LinkRole::Primary)
    }

    pub fn collision_links(&self) -> impl Iterator<Item = &QuestionAxisLink> {
        self.links.iter().filter(|l| l.role == LinkRole::Collision)
    }

    /// Linked to two or more axes (scenario questions).
    pub fn is_multi_axis(&self) -> bool {
        self.links.len() > 1
    }

    /// Carries at least one primary and one collision link.
    pub fn has_collision(&self) -> bool {
        self.primary_links().next().is_some() && self.collision_links().next().is_some()
    }

    pub fn total_link_weight(&self) -> f64 {
        self.links.iter().map(|l| l.weight).sum()
    }

    /// Link on `axis_id`, preferring a primary link when both roles exist.
    pub fn link_for(&self, axis_id: &str) -> Option<&QuestionAxisLink> {
        self.primary_links()
            .find(|l| l.axis_id == axis_id)
            .or_else(|| self.links.iter().find(|l| l.axis_id == axis_id))
    }
}

fn check_weight(question_id: i64, weight: f64) -> Result<f64> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(EngineError::InvalidWeight { question_id, weight })
    }
}

/// Validate a record and produce its canonical form.
///
/// A record without links gets one implicit primary link built from its
/// default axis, key and weight.
pub fn normalize_question(record: &QuestionRecord, cfg: &EngineConfig) -> Result<Question> {
    let weight = check_weight(
        record.id,
        record.weight.unwrap_or(cfg.default_question_weight),
    )?;

    let links = if record.question_axis_links.is_empty() {
        vec![QuestionAxisLink {
            question_id: record.id,
            axis_id: record.axis_id.clone(),
            role: LinkRole::Primary,
            axis_key: record.key,
            weight,
        }]
    } else {
        record
            .question_axis_links
            .iter()
            .map(|link| {
                if let Some(owner) = link.question_id {
                    if owner != record.id {
                        warn!(
                            question_id = record.id,
                            link_question_id = owner,
                            axis_id = %link.axis_id,
                            "Link names a different question; attaching it to its parent"
                        );
                    }
                }
                Ok(QuestionAxisLink {
                    question_id: record.id,
                    axis_id: link.axis_id.clone(),
                    role: link.role,
                    axis_key: link.axis_key,
                    weight: check_weight(record.id, link.weight)?,
                })
            })
            .collect::<Result<Vec<_>>>()?
    };

    Ok(Question {
        id: record.id,
        text: record.text.clone(),
        default_axis_id: record.axis_id.clone(),
        default_key: record.key,
        weight,
        question_type: record.question_type,
        active: record.active,
        links,
    })
}

/// Normalize a whole catalog, failing on the first invalid record.
pub fn normalize_questions(records: &[QuestionRecord], cfg: &EngineConfig) -> Result<Vec<Question>> {
    records.iter().map(|r| normalize_question(r, cfg)).collect()
}
