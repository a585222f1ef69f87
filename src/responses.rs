//! Validated Likert responses.
//!
//! Raw answers arrive as a map from question id to integer. [`ResponseSet`]
//! checks every value against the `[-2, 2]` range once, according to the
//! configured [`ResponsePolicy`], so downstream code can trust them.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::config::ResponsePolicy;
use crate::error::{EngineError, Result};

pub const LIKERT_MIN: i64 = -2;
pub const LIKERT_MAX: i64 = 2;

/// Raw response map as submitted by the survey client.
pub type RawResponses = BTreeMap<i64, i64>;

/// Responses keyed by question id, every value within `[-2, 2]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResponseSet {
    values: BTreeMap<i64, i8>,
}

impl ResponseSet {
    /// Validate raw responses. Under [`ResponsePolicy::Reject`] the first
    /// out-of-range value fails the whole set.
    pub fn from_raw<I>(raw: I, policy: ResponsePolicy) -> Result<Self>
    where
        I: IntoIterator<Item = (i64, i64)>,
    {
        let mut values = BTreeMap::new();
        for (question_id, value) in raw {
            let checked = if (LIKERT_MIN..=LIKERT_MAX).contains(&value) {
                value
            } else {
                match policy {
                    ResponsePolicy::Reject => {
                        return Err(EngineError::ResponseOutOfRange { question_id, value });
                    }
                    ResponsePolicy::Clamp => {
                        let clamped = value.clamp(LIKERT_MIN, LIKERT_MAX);
                        warn!(question_id, value, clamped, "Clamping out-of-range response");
                        clamped
                    }
                }
            };
            // In range by construction, so the narrowing cannot truncate.
            values.insert(question_id, checked as i8);
        }
        Ok(Self { values })
    }

    pub fn get(&self, question_id: i64) -> Option<i8> {
        self.values.get(&question_id).copied()
    }

    /// Response as a float, for arithmetic.
    pub fn value(&self, question_id: i64) -> Option<f64> {
        self.get(question_id).map(f64::from)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, i8)> + '_ {
        self.values.iter().map(|(&q, &v)| (q, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_values_pass_through() {
        let set = ResponseSet::from_raw([(1, 2), (2, -2), (3, 0)], ResponsePolicy::Reject).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get(2), Some(-2));
        assert_eq!(set.value(1), Some(2.0));
        assert_eq!(set.get(99), None);
    }

    #[test]
    fn reject_policy_fails_on_out_of_range() {
        let err = ResponseSet::from_raw([(1, 2), (5, 3)], ResponsePolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ResponseOutOfRange {
                question_id: 5,
                value: 3
            }
        ));
    }

    #[test]
    fn clamp_policy_clamps() {
        let set = ResponseSet::from_raw([(1, 7), (2, -9)], ResponsePolicy::Clamp).unwrap();
        assert_eq!(set.get(1), Some(2));
        assert_eq!(set.get(2), Some(-2));
    }

    #[test]
    fn serializes_as_plain_map() {
        let set = ResponseSet::from_raw([(1, 2)], ResponsePolicy::Reject).unwrap();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"{"1":2}"#);
    }
}
