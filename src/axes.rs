//! Axis registry: the scored dimensions of the survey.
//!
//! Axes come in two disjoint families:
//!
//! - **Core** axes (`C1`, `C2`, ...) measure substantive positions.
//! - **Facet** axes (`F1`, `F2`, ...) measure stylistic or procedural
//!   tendencies such as change strategy or institutional trust.
//!
//! The registry is static metadata supplied by the caller. Scoring only reads
//! it, and any axis id it does not know still scores under its raw id.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Metadata for one scoring dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    pub id: String,
    pub name: String,
    /// Label of the -1 end of the axis.
    pub pole_negative: String,
    /// Label of the +1 end of the axis.
    pub pole_positive: String,
    /// Explicit facet flag. When absent the id prefix decides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_facet: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisKind {
    Core,
    Facet,
}

impl AxisKind {
    /// Classify by naming convention: `F*` ids are facets, everything else core.
    pub fn from_id(axis_id: &str) -> Self {
        if axis_id.starts_with('F') {
            AxisKind::Facet
        } else {
            AxisKind::Core
        }
    }
}

impl Axis {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        pole_negative: impl Into<String>,
        pole_positive: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pole_negative: pole_negative.into(),
            pole_positive: pole_positive.into(),
            is_facet: None,
        }
    }

    pub fn facet(mut self, is_facet: bool) -> Self {
        self.is_facet = Some(is_facet);
        self
    }

    pub fn kind(&self) -> AxisKind {
        match self.is_facet {
            Some(true) => AxisKind::Facet,
            Some(false) => AxisKind::Core,
            None => AxisKind::from_id(&self.id),
        }
    }

    /// Human label for where `score` falls between the two poles.
    pub fn pole_label(&self, score: f64) -> String {
        pole_label(score, &self.pole_negative, &self.pole_positive)
    }
}

/// Five-band label: strong/moderate on either side, centrist in the middle.
pub fn pole_label(score: f64, pole_negative: &str, pole_positive: &str) -> String {
    if score < -0.6 {
        format!("Strong {pole_negative}")
    } else if score < -0.2 {
        format!("Moderate {pole_negative}")
    } else if score <= 0.2 {
        "Centrist / Mixed".to_string()
    } else if score <= 0.6 {
        format!("Moderate {pole_positive}")
    } else {
        format!("Strong {pole_positive}")
    }
}

/// Read-only lookup of axis metadata, preserving catalog order.
#[derive(Debug, Clone, Default)]
pub struct AxisRegistry {
    axes: Vec<Axis>,
    index: HashMap<String, usize>,
}

impl AxisRegistry {
    /// Build a registry. Later duplicates of an id replace earlier ones.
    pub fn new(axes: impl IntoIterator<Item = Axis>) -> Self {
        let mut registry = Self::default();
        for axis in axes {
            match registry.index.get(&axis.id).copied() {
                Some(idx) => registry.axes[idx] = axis,
                None => {
                    registry.index.insert(axis.id.clone(), registry.axes.len());
                    registry.axes.push(axis);
                }
            }
        }
        registry
    }

    pub fn get(&self, axis_id: &str) -> Option<&Axis> {
        self.index.get(axis_id).map(|&idx| &self.axes[idx])
    }

    /// Display name for an axis, falling back to the raw id.
    pub fn display_name<'a>(&'a self, axis_id: &'a str) -> &'a str {
        self.get(axis_id).map(|a| a.name.as_str()).unwrap_or(axis_id)
    }

    /// Core/facet classification, falling back to the id prefix for unknown axes.
    pub fn kind_of(&self, axis_id: &str) -> AxisKind {
        self.get(axis_id)
            .map(Axis::kind)
            .unwrap_or_else(|| AxisKind::from_id(axis_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Axis> {
        self.axes.iter()
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }
}

impl FromIterator<Axis> for AxisRegistry {
    fn from_iter<T: IntoIterator<Item = Axis>>(iter: T) -> Self {
        Self::new(iter)
    }
}
