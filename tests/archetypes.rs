use std::io::Write;

use tenaxes::archetypes::{
    match_archetypes, positive_matches, top_matches, ArchetypeCatalog, ArchetypeComponent,
    Direction, FlavorArchetype, MatchStrength,
};
use tenaxes::error::EngineError;
use tenaxes::scoring::AxisScore;

fn axis_score(axis_id: &str, score: f64) -> AxisScore {
    AxisScore {
        axis_id: axis_id.to_string(),
        name: axis_id.to_string(),
        score,
        raw_sum: score * 2.0,
        total_weight: 1.0,
        confidence: 2.0 * score.abs(),
        response_variance: 0.0,
    }
}

fn archetype(id: &str, components: &[(&str, i64, f64)]) -> FlavorArchetype {
    FlavorArchetype {
        id: id.to_string(),
        name: id.to_uppercase(),
        description: format!("{id} test archetype"),
        color: "#000000".to_string(),
        components: components
            .iter()
            .map(|&(axis_id, direction, weight)| ArchetypeComponent {
                axis_id: axis_id.to_string(),
                direction: Direction::try_from(direction).unwrap(),
                weight,
            })
            .collect(),
    }
}

#[test]
fn single_component_full_alignment_is_very_strong() {
    let catalog = ArchetypeCatalog::new(vec![archetype("market", &[("C1", 1, 1.0)])]).unwrap();
    let matches = match_archetypes(&[axis_score("C1", 1.0)], &catalog);

    assert_eq!(matches.len(), 1);
    assert!((matches[0].affinity - 1.0).abs() < 1e-12);
    assert_eq!(matches[0].match_strength, MatchStrength::VeryStrong);
    assert_eq!(matches[0].name, "MARKET");
}

#[test]
fn neutral_components_are_ignored_and_missing_axes_count_as_zero() {
    let catalog = ArchetypeCatalog::new(vec![
        archetype("with_neutral", &[("C1", 1, 1.0), ("C2", 0, 5.0)]),
        archetype("with_missing", &[("C1", 1, 1.0), ("C7", -1, 1.0)]),
    ])
    .unwrap();
    let matches = match_archetypes(&[axis_score("C1", 0.8), axis_score("C2", -1.0)], &catalog);

    let neutral = matches.iter().find(|m| m.flavor_id == "with_neutral").unwrap();
    assert!((neutral.affinity - 0.8).abs() < 1e-12);
    let missing = matches.iter().find(|m| m.flavor_id == "with_missing").unwrap();
    assert!((missing.affinity - 0.4).abs() < 1e-12);
    assert_eq!(missing.match_strength, MatchStrength::Moderate);
}

#[test]
fn matches_sorted_by_affinity_with_stable_ties() {
    let catalog = ArchetypeCatalog::new(vec![
        archetype("state", &[("C1", -1, 1.0)]),
        archetype("market_a", &[("C1", 1, 1.0)]),
        archetype("market_b", &[("C1", 1, 2.0)]),
        archetype("mixed", &[("C1", 1, 1.0), ("C2", 1, 1.0)]),
    ])
    .unwrap();
    let matches = match_archetypes(&[axis_score("C1", 0.6), axis_score("C2", 0.0)], &catalog);

    let ids: Vec<&str> = matches.iter().map(|m| m.flavor_id.as_str()).collect();
    assert_eq!(ids, vec!["market_a", "market_b", "mixed", "state"]);
    assert_eq!(matches[3].match_strength, MatchStrength::Minimal);

    let top = top_matches(&matches, 2);
    assert_eq!(top.len(), 2);
    let persisted = positive_matches(&matches, 0.1);
    assert_eq!(persisted.len(), 3);
}

#[test]
fn affinity_is_bounded() {
    let catalog = ArchetypeCatalog::builtin();
    let scores: Vec<AxisScore> = ["C1", "C2", "C3", "C4", "C5", "C6", "C7", "C8", "C9", "C10"]
        .iter()
        .enumerate()
        .map(|(i, id)| axis_score(id, if i % 2 == 0 { 1.0 } else { -1.0 }))
        .collect();
    let matches = match_archetypes(&scores, &catalog);
    assert_eq!(matches.len(), catalog.len());
    for m in &matches {
        assert!((-1.0..=1.0).contains(&m.affinity), "{}: {}", m.flavor_id, m.affinity);
    }
}

#[test]
fn empty_profile_scores_every_archetype_zero() {
    let catalog = ArchetypeCatalog::builtin();
    let matches = match_archetypes(&[], &catalog);
    assert!(matches.iter().all(|m| m.affinity == 0.0));
    // Stable sort keeps catalog order when everything ties.
    let catalog_ids: Vec<&str> = catalog.iter().map(|a| a.id.as_str()).collect();
    let match_ids: Vec<&str> = matches.iter().map(|m| m.flavor_id.as_str()).collect();
    assert_eq!(catalog_ids, match_ids);
}

#[test]
fn catalog_loads_from_json_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r##"{{
            "archetypes": [
                {{
                    "id": "localist",
                    "name": "Localist",
                    "description": "Power close to home",
                    "color": "#16a34a",
                    "components": [
                        {{"axis_id": "C4", "direction": -1, "weight": 1.5}},
                        {{"axis_id": "F2", "direction": 0, "weight": 1.0}}
                    ]
                }}
            ]
        }}"##
    )
    .unwrap();

    let catalog = ArchetypeCatalog::load_from_path(file.path()).unwrap();
    assert_eq!(catalog.len(), 1);
    let localist = catalog.get("localist").unwrap();
    assert_eq!(localist.components[0].direction, Direction::Negative);
    assert_eq!(localist.components[1].direction, Direction::Neutral);

    let matches = match_archetypes(&[axis_score("C4", -0.5)], &catalog);
    assert!((matches[0].affinity - 0.5).abs() < 1e-12);
}

#[test]
fn catalog_rejects_bad_direction() {
    let json = r#"{"archetypes": [{"id": "x", "name": "X", "description": "", "color": "",
        "components": [{"axis_id": "C1", "direction": 2, "weight": 1.0}]}]}"#;
    assert!(serde_json::from_str::<ArchetypeCatalog>(json).is_err());
}

#[test]
fn catalog_rejects_duplicates_and_bad_weights() {
    let dup = ArchetypeCatalog::new(vec![
        archetype("same", &[("C1", 1, 1.0)]),
        archetype("same", &[("C2", 1, 1.0)]),
    ]);
    assert!(matches!(dup, Err(EngineError::Catalog(_))));

    let zero = ArchetypeCatalog::new(vec![archetype("zero", &[("C1", 1, 0.0)])]);
    assert!(matches!(zero, Err(EngineError::Catalog(_))));

    let empty = ArchetypeCatalog::new(vec![archetype("empty", &[])]);
    assert!(matches!(empty, Err(EngineError::Catalog(_))));
}

#[test]
fn match_strength_serializes_as_display_label() {
    let json = serde_json::to_string(&MatchStrength::VeryStrong).unwrap();
    assert_eq!(json, r#""Very Strong""#);
    assert_eq!(MatchStrength::from_affinity(0.1), MatchStrength::Weak);
    assert_eq!(MatchStrength::from_affinity(0.0999), MatchStrength::Minimal);
    assert_eq!(MatchStrength::from_affinity(-0.8), MatchStrength::Minimal);
}
