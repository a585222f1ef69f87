//! Archetype ("flavor") templates and affinity matching.
//!
//! An archetype is a weighted pattern over axes: each component says which
//! pole of an axis the archetype leans toward and how much that axis matters
//! to it. A respondent's affinity is the weighted mean alignment of their axis
//! scores with those poles:
//!
//! ```text
//! affinity = Σ(score[axis] * direction * weight) / Σ weight     (direction != 0)
//! ```
//!
//! Neutral components (`direction == 0`) describe axes the archetype is
//! indifferent to and are skipped. Axes the respondent has no score for count
//! as 0, so a sparse profile pulls affinity toward zero rather than
//! inflating it.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::scoring::AxisScore;

/// Which pole of an axis an archetype component leans toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Direction {
    Negative,
    Neutral,
    Positive,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Negative => -1.0,
            Direction::Neutral => 0.0,
            Direction::Positive => 1.0,
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = EngineError;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            -1 => Ok(Direction::Negative),
            0 => Ok(Direction::Neutral),
            1 => Ok(Direction::Positive),
            other => Err(EngineError::InvalidDirection(other)),
        }
    }
}

impl From<Direction> for i64 {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Negative => -1,
            Direction::Neutral => 0,
            Direction::Positive => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeComponent {
    pub axis_id: String,
    pub direction: Direction,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorArchetype {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Display color, e.g. `#2563eb`.
    pub color: String,
    pub components: Vec<ArchetypeComponent>,
}

/// Five-tier match strength on signed affinity.
///
/// | affinity | tier        |
/// |----------|-------------|
/// | ≥ 0.7    | Very Strong |
/// | ≥ 0.5    | Strong      |
/// | ≥ 0.3    | Moderate    |
/// | ≥ 0.1    | Weak        |
/// | below    | Minimal     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStrength {
    #[serde(rename = "Very Strong")]
    VeryStrong,
    Strong,
    Moderate,
    Weak,
    Minimal,
}

impl MatchStrength {
    pub fn from_affinity(affinity: f64) -> Self {
        if affinity >= 0.7 {
            MatchStrength::VeryStrong
        } else if affinity >= 0.5 {
            MatchStrength::Strong
        } else if affinity >= 0.3 {
            MatchStrength::Moderate
        } else if affinity >= 0.1 {
            MatchStrength::Weak
        } else {
            MatchStrength::Minimal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MatchStrength::VeryStrong => "Very Strong",
            MatchStrength::Strong => "Strong",
            MatchStrength::Moderate => "Moderate",
            MatchStrength::Weak => "Weak",
            MatchStrength::Minimal => "Minimal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorMatch {
    pub flavor_id: String,
    pub name: String,
    /// Weighted alignment in `[-1, 1]`.
    pub affinity: f64,
    pub match_strength: MatchStrength,
    pub description: String,
    pub color: String,
}

// =============================================================================
// Catalog
// =============================================================================

/// Validated, ordered set of archetype templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogDocument", into = "CatalogDocument")]
pub struct ArchetypeCatalog {
    archetypes: Vec<FlavorArchetype>,
}

/// On-disk shape of a catalog file: `{"archetypes": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogDocument {
    archetypes: Vec<FlavorArchetype>,
}

impl TryFrom<CatalogDocument> for ArchetypeCatalog {
    type Error = EngineError;

    fn try_from(doc: CatalogDocument) -> Result<Self> {
        ArchetypeCatalog::new(doc.archetypes)
    }
}

impl From<ArchetypeCatalog> for CatalogDocument {
    fn from(catalog: ArchetypeCatalog) -> Self {
        CatalogDocument {
            archetypes: catalog.archetypes,
        }
    }
}

impl ArchetypeCatalog {
    pub fn new(archetypes: Vec<FlavorArchetype>) -> Result<Self> {
        validate_archetypes(&archetypes)?;
        Ok(Self { archetypes })
    }

    /// Read and validate a catalog from a JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// A generic starter catalog over core axes `C1`..`C10` and facets `F1`..`F3`.
    ///
    /// Not the survey instrument's own archetype set; load that with
    /// [`ArchetypeCatalog::load_from_path`].
    pub fn builtin() -> Self {
        Self {
            archetypes: builtin_archetypes(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&FlavorArchetype> {
        self.archetypes.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlavorArchetype> {
        self.archetypes.iter()
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }
}

impl Default for ArchetypeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_archetypes(archetypes: &[FlavorArchetype]) -> Result<()> {
    let mut seen = HashSet::new();
    for archetype in archetypes {
        if archetype.id.trim().is_empty() {
            return Err(EngineError::Catalog("archetype id must be non-empty".to_string()));
        }
        if !seen.insert(archetype.id.as_str()) {
            return Err(EngineError::Catalog(format!(
                "duplicate archetype id '{}'",
                archetype.id
            )));
        }
        if archetype.components.is_empty() {
            return Err(EngineError::Catalog(format!(
                "archetype '{}' has no components",
                archetype.id
            )));
        }
        for component in &archetype.components {
            if !component.weight.is_finite() || component.weight <= 0.0 {
                return Err(EngineError::Catalog(format!(
                    "archetype '{}' component '{}' has invalid weight {}",
                    archetype.id, component.axis_id, component.weight
                )));
            }
        }
    }
    Ok(())
}

// =============================================================================
// Matching
// =============================================================================

/// Affinity of one archetype against a score lookup.
pub fn affinity(archetype: &FlavorArchetype, scores: &HashMap<&str, f64>) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for component in &archetype.components {
        if component.direction == Direction::Neutral {
            continue;
        }
        let score = scores.get(component.axis_id.as_str()).copied().unwrap_or(0.0);
        weighted += score * component.direction.sign() * component.weight;
        total_weight += component.weight;
    }
    if total_weight > 0.0 {
        (weighted / total_weight).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Match every archetype in the catalog, best affinity first.
///
/// Ties keep catalog order.
pub fn match_archetypes(axis_scores: &[AxisScore], catalog: &ArchetypeCatalog) -> Vec<FlavorMatch> {
    let scores: HashMap<&str, f64> = axis_scores
        .iter()
        .map(|s| (s.axis_id.as_str(), s.score))
        .collect();

    let mut matches: Vec<FlavorMatch> = catalog
        .iter()
        .map(|archetype| {
            let affinity = affinity(archetype, &scores);
            FlavorMatch {
                flavor_id: archetype.id.clone(),
                name: archetype.name.clone(),
                affinity,
                match_strength: MatchStrength::from_affinity(affinity),
                description: archetype.description.clone(),
                color: archetype.color.clone(),
            }
        })
        .collect();

    matches.sort_by(|a, b| b.affinity.partial_cmp(&a.affinity).unwrap_or(Ordering::Equal));
    matches
}

/// First `n` matches.
pub fn top_matches(matches: &[FlavorMatch], n: usize) -> Vec<FlavorMatch> {
    matches.iter().take(n).cloned().collect()
}

/// Matches whose affinity exceeds `threshold`, in existing order.
pub fn positive_matches(matches: &[FlavorMatch], threshold: f64) -> Vec<FlavorMatch> {
    matches
        .iter()
        .filter(|m| m.affinity > threshold)
        .cloned()
        .collect()
}

// =============================================================================
// Built-in catalog
// =============================================================================

fn component(axis_id: &str, direction: Direction, weight: f64) -> ArchetypeComponent {
    ArchetypeComponent {
        axis_id: axis_id.to_string(),
        direction,
        weight,
    }
}

fn archetype(
    id: &str,
    name: &str,
    description: &str,
    color: &str,
    components: Vec<ArchetypeComponent>,
) -> FlavorArchetype {
    FlavorArchetype {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        color: color.to_string(),
        components,
    }
}

fn builtin_archetypes() -> Vec<FlavorArchetype> {
    use Direction::{Negative as Neg, Neutral as Any, Positive as Pos};

    vec![
        archetype(
            "classical_liberal",
            "Classical Liberal",
            "Markets, individual rights and a limited state.",
            "#2563eb",
            vec![
                component("C1", Pos, 1.5),
                component("C2", Neg, 1.0),
                component("C3", Pos, 1.25),
                component("C5", Pos, 0.75),
                component("F1", Neg, 0.5),
            ],
        ),
        archetype(
            "social_democrat",
            "Social Democrat",
            "Regulated markets with a broad welfare state, reformed gradually.",
            "#dc2626",
            vec![
                component("C1", Neg, 1.25),
                component("C2", Pos, 1.5),
                component("C9", Pos, 0.75),
                component("F1", Neg, 0.75),
                component("F2", Pos, 0.5),
            ],
        ),
        archetype(
            "democratic_socialist",
            "Democratic Socialist",
            "Collective ownership and equality pursued through democratic means.",
            "#b91c1c",
            vec![
                component("C1", Neg, 1.5),
                component("C2", Pos, 1.5),
                component("C4", Neg, 0.75),
                component("F1", Pos, 0.75),
            ],
        ),
        archetype(
            "traditional_conservative",
            "Traditional Conservative",
            "Continuity, inherited institutions and social order.",
            "#1e3a8a",
            vec![
                component("C4", Pos, 1.5),
                component("C5", Neg, 1.0),
                component("C6", Pos, 1.0),
                component("F1", Neg, 1.0),
                component("F2", Pos, 0.75),
            ],
        ),
        archetype(
            "libertarian",
            "Libertarian",
            "Maximal personal and economic freedom, minimal coercion.",
            "#ca8a04",
            vec![
                component("C1", Pos, 1.5),
                component("C3", Pos, 1.5),
                component("C6", Neg, 1.0),
                component("F2", Neg, 0.75),
            ],
        ),
        archetype(
            "progressive_reformer",
            "Progressive Reformer",
            "Expanding rights and inclusion through institutions.",
            "#7c3aed",
            vec![
                component("C5", Pos, 1.25),
                component("C7", Pos, 1.0),
                component("C10", Pos, 1.0),
                component("F1", Neg, 0.5),
                component("F2", Pos, 0.75),
            ],
        ),
        archetype(
            "green",
            "Green",
            "Ecological limits come before growth.",
            "#16a34a",
            vec![
                component("C9", Pos, 1.5),
                component("C1", Neg, 0.75),
                component("C10", Pos, 0.75),
                component("F3", Any, 1.0),
            ],
        ),
        archetype(
            "technocrat",
            "Technocrat",
            "Evidence-led governance by expert institutions.",
            "#0891b2",
            vec![
                component("C8", Pos, 1.5),
                component("F2", Pos, 1.25),
                component("F1", Neg, 0.75),
                component("C4", Neg, 0.5),
            ],
        ),
        archetype(
            "populist",
            "Populist",
            "The common people against entrenched elites.",
            "#ea580c",
            vec![
                component("F2", Neg, 1.5),
                component("F1", Pos, 1.0),
                component("C8", Neg, 0.75),
                component("C10", Neg, 0.75),
            ],
        ),
        archetype(
            "communitarian",
            "Communitarian",
            "Shared obligations and local community over individual choice.",
            "#65a30d",
            vec![
                component("C3", Neg, 1.25),
                component("C6", Pos, 1.0),
                component("C2", Pos, 0.75),
                component("F3", Neg, 0.75),
            ],
        ),
    ]
}
