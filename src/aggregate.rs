//! Cross-session statistics over stored engine output.
//!
//! These run over many respondents' results at once: per-axis score
//! distributions and a rank-weighted popularity table of archetype matches.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::archetypes::FlavorMatch;
use crate::config::EngineConfig;
use crate::scoring::AxisScore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisAggregate {
    pub axis_id: String,
    pub axis_name: String,
    pub avg_score: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorPopularity {
    pub flavor_id: String,
    pub flavor_name: String,
    /// Sum of rank points across sessions.
    pub points: usize,
    /// Mean affinity over the sessions that ranked the flavor.
    pub avg_affinity: f64,
}

/// Mean and spread of every axis across sessions, ordered by axis id.
///
/// Each item is one session's axis scores (core axes and facets together).
/// The display name is taken from the first session that scored the axis.
pub fn axis_aggregates<'a, I>(sessions: I) -> Vec<AxisAggregate>
where
    I: IntoIterator<Item = &'a [AxisScore]>,
{
    let mut by_axis: BTreeMap<&'a str, (&'a str, Vec<f64>)> = BTreeMap::new();
    for session in sessions {
        for s in session {
            by_axis
                .entry(s.axis_id.as_str())
                .or_insert_with(|| (s.name.as_str(), Vec::new()))
                .1
                .push(s.score);
        }
    }

    by_axis
        .into_iter()
        .map(|(axis_id, (name, scores))| {
            let (avg_score, std_dev) = if scores.len() == 1 {
                (scores[0], 0.0)
            } else {
                (scores.iter().mean(), scores.iter().population_std_dev())
            };
            AxisAggregate {
                axis_id: axis_id.to_string(),
                axis_name: name.to_string(),
                avg_score,
                std_dev,
                sample_size: scores.len(),
            }
        })
        .collect()
}

#[derive(Debug)]
struct FlavorTally<'a> {
    flavor: &'a FlavorMatch,
    points: usize,
    affinities: Vec<f64>,
}

/// Rank-weighted flavor popularity, most popular first.
///
/// Each item is one session's ranked top flavors. Rank 1 earns
/// `popularity_rank_points`, rank 2 one point less, and ranks that would earn
/// nothing are ignored. Ties keep first-seen order.
pub fn flavor_popularity<'a, I>(sessions: I, cfg: &EngineConfig) -> Vec<FlavorPopularity>
where
    I: IntoIterator<Item = &'a [FlavorMatch]>,
{
    let mut tallies: Vec<FlavorTally<'a>> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for session in sessions {
        for (rank, flavor) in session.iter().enumerate() {
            let points = cfg.popularity_rank_points.saturating_sub(rank);
            if points == 0 {
                break;
            }
            let idx = *index.entry(flavor.flavor_id.as_str()).or_insert_with(|| {
                tallies.push(FlavorTally {
                    flavor,
                    points: 0,
                    affinities: Vec::new(),
                });
                tallies.len() - 1
            });
            tallies[idx].points += points;
            tallies[idx].affinities.push(flavor.affinity);
        }
    }

    // Stable: equal points keep first-seen order.
    tallies.sort_by(|a, b| b.points.cmp(&a.points));
    tallies
        .into_iter()
        .take(cfg.popular_flavors)
        .map(|t| FlavorPopularity {
            flavor_id: t.flavor.flavor_id.clone(),
            flavor_name: t.flavor.name.clone(),
            points: t.points,
            avg_affinity: t.affinities.iter().mean(),
        })
        .collect()
}
