//! Error types for the scoring engine.

use thiserror::Error;

/// Errors raised while ingesting survey data or loading engine configuration.
///
/// Scoring itself never fails once inputs have been validated; every variant
/// here describes structurally invalid input caught before any output is built.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A response value fell outside the Likert range and the active
    /// policy rejects such values.
    #[error("response for question {question_id} is out of range: {value} (expected -2..=2)")]
    ResponseOutOfRange { question_id: i64, value: i64 },

    /// Directional keys must be exactly -1 or +1.
    #[error("invalid axis key {0} (expected -1 or 1)")]
    InvalidAxisKey(i64),

    /// Archetype component directions must be -1, 0 or +1.
    #[error("invalid archetype direction {0} (expected -1, 0 or 1)")]
    InvalidDirection(i64),

    /// Negative or non-finite weight on a question or link.
    #[error("invalid weight {weight} on question {question_id}")]
    InvalidWeight { question_id: i64, weight: f64 },

    /// Archetype catalog failed validation.
    #[error("archetype catalog error: {0}")]
    Catalog(String),

    /// Engine configuration failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
