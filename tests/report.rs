use std::io::Write;

use tenaxes::archetypes::ArchetypeCatalog;
use tenaxes::axes::AxisKind;
use tenaxes::collisions::{ConfidenceLevel, PreferenceDirection};
use tenaxes::config::{load_config_from_path, EngineConfig, ResponsePolicy};
use tenaxes::error::EngineError;
use tenaxes::ordering::question_order;
use tenaxes::questions::{normalize_questions, LinkRecord};
use tenaxes::report::{evaluate_survey, input_hash, render_report_markdown, SurveyInput};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

const SURVEY: &str = r#"{
    "responses": {"1": 2, "2": -1, "3": 2, "4": 1, "5": 0, "6": 2, "7": 2},
    "axes": [
        {"id": "C1", "name": "Economic Organization", "pole_negative": "State", "pole_positive": "Market"},
        {"id": "C2", "name": "Equality", "pole_negative": "Merit", "pole_positive": "Equality"},
        {"id": "F1", "name": "Change Strategy", "pole_negative": "Incremental", "pole_positive": "Radical", "is_facet": true}
    ],
    "questions": [
        {"id": 1, "text": "Markets allocate resources well.", "axis_id": "C1", "key": 1, "weight": 1.0},
        {"id": 2, "text": "Rewards should track effort.", "axis_id": "C2", "key": -1},
        {"id": 3, "text": "Scenario A", "axis_id": "C1", "key": 1, "question_type": "applied",
         "question_axis_links": [
            {"question_id": 3, "axis_id": "C1", "role": "primary", "axis_key": 1, "weight": 1.0},
            {"question_id": 3, "axis_id": "C2", "role": "collision", "axis_key": 1, "weight": 1.0}
         ]},
        {"id": 4, "text": "Scenario B", "axis_id": "C1", "key": 1, "question_type": "applied",
         "question_axis_links": [
            {"axis_id": "C1", "role": "primary", "axis_key": 1, "weight": 1.0},
            {"axis_id": "C2", "role": "collision", "axis_key": 1, "weight": 1.0}
         ]},
        {"id": 5, "text": "Change should be gradual.", "axis_id": "F1", "key": -1},
        {"id": 6, "text": "Retired question", "axis_id": "C1", "key": -1, "active": false},
        {"id": 7, "text": "Scenario C", "axis_id": "C1", "key": 1, "question_type": "applied",
         "question_axis_links": [
            {"axis_id": "C1", "role": "primary", "axis_key": 1, "weight": 1.0},
            {"axis_id": "C2", "role": "collision", "axis_key": 1, "weight": 1.0}
         ]}
    ]
}"#;

fn survey() -> SurveyInput {
    serde_json::from_str(SURVEY).unwrap()
}

#[test]
fn evaluates_full_survey() {
    init_tracing();
    let report = evaluate_survey(&survey(), &ArchetypeCatalog::builtin(), &EngineConfig::default())
        .unwrap();

    assert_eq!(report.summary.questions_total, 6);
    assert_eq!(report.summary.questions_answered, 6);
    assert_eq!(report.summary.axes_scored, 3);

    let ids: Vec<&str> = report.axis_scores.iter().map(|s| s.axis_id.as_str()).collect();
    assert_eq!(ids, vec!["C1", "C2", "F1"]);
    assert_eq!(report.core_axes.len(), 2);
    assert_eq!(report.facets.len(), 1);
    assert!(report.axis_scores.iter().all(|s| (-1.0..=1.0).contains(&s.score)));

    let c1 = &report.profile[0];
    assert_eq!(c1.kind, AxisKind::Core);
    assert_eq!(c1.pole_label, "Strong Market");
    let f1 = &report.profile[2];
    assert_eq!(f1.kind, AxisKind::Facet);
    assert_eq!(f1.pole_label, "Centrist / Mixed");

    assert_eq!(report.conceptual_scores.len(), 3);
    assert_eq!(report.applied_scores.len(), 2);
    // C1: conceptual 1.0 vs applied 0.833; C2: conceptual 0.5 vs applied 0.833.
    assert_eq!(report.gaps.len(), 2);
    assert_eq!(report.gaps[0].axis_id, "C2");
    assert!(report.gaps[0].significant);
    assert!(!report.gaps[1].significant);
    assert_eq!(report.summary.significant_gaps, 1);

    assert_eq!(report.flavor_matches.len(), ArchetypeCatalog::builtin().len());
    assert_eq!(report.top_flavors.len(), 5);
    assert!(report.persisted_flavors.iter().all(|m| m.affinity > 0.1));
    assert!(report
        .flavor_matches
        .windows(2)
        .all(|w| w[0].affinity >= w[1].affinity));

    assert_eq!(report.summary.collision_pairs, 1);
    let collision = &report.collision_scores[0];
    assert_eq!((collision.axis_primary.as_str(), collision.axis_collision.as_str()), ("C1", "C2"));
    assert_eq!(collision.question_count, 3);
    assert_eq!(collision.confidence_level, ConfidenceLevel::Medium);
    assert_eq!(collision.preference_direction, PreferenceDirection::Balanced);
    assert_eq!(report.displayed_collisions.len(), 1);
}

fn conceptual_pairing() -> Vec<LinkRecord> {
    serde_json::from_str(
        r#"[
            {"axis_id": "C1", "role": "primary", "axis_key": 1, "weight": 1.0},
            {"axis_id": "F1", "role": "collision", "axis_key": -1, "weight": 1.0}
        ]"#,
    )
    .unwrap()
}

#[test]
fn collisions_only_use_applied_questions() {
    let mut input = survey();
    // Two conceptual questions pairing C1 against F1: enough samples, wrong type.
    for q in input.questions.iter_mut().filter(|q| q.id == 1 || q.id == 2) {
        q.question_axis_links = conceptual_pairing();
    }

    let report =
        evaluate_survey(&input, &ArchetypeCatalog::builtin(), &EngineConfig::default()).unwrap();
    assert_eq!(report.collision_scores.len(), 1);
    assert!(report
        .collision_scores
        .iter()
        .all(|c| c.axis_collision != "F1"));
}

#[test]
fn out_of_range_response_rejected_by_default() {
    let mut input = survey();
    input.responses.insert(1, 3);

    let err = evaluate_survey(&input, &ArchetypeCatalog::builtin(), &EngineConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::ResponseOutOfRange {
            question_id: 1,
            value: 3
        }
    ));
}

#[test]
fn clamp_policy_matches_in_range_answer() {
    let mut clamped_input = survey();
    clamped_input.responses.insert(1, 9);
    let cfg = EngineConfig {
        response_policy: ResponsePolicy::Clamp,
        ..EngineConfig::default()
    };

    let clamped = evaluate_survey(&clamped_input, &ArchetypeCatalog::builtin(), &cfg).unwrap();
    let plain = evaluate_survey(&survey(), &ArchetypeCatalog::builtin(), &cfg).unwrap();
    assert_eq!(clamped.axis_scores, plain.axis_scores);
    assert_ne!(clamped.input_hash, plain.input_hash);
}

#[test]
fn invalid_records_fail_before_scoring() {
    let bad_key = SURVEY.replace(r#""axis_id": "F1", "key": -1"#, r#""axis_id": "F1", "key": 0"#);
    assert!(serde_json::from_str::<SurveyInput>(&bad_key).is_err());

    let mut input = survey();
    input.questions[0].weight = Some(-1.0);
    let err = evaluate_survey(&input, &ArchetypeCatalog::builtin(), &EngineConfig::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidWeight { question_id: 1, .. }));
}

#[test]
fn report_is_deterministic() {
    let cfg = EngineConfig::default();
    let catalog = ArchetypeCatalog::builtin();
    let a = evaluate_survey(&survey(), &catalog, &cfg).unwrap();
    let b = evaluate_survey(&survey(), &catalog, &cfg).unwrap();

    assert_eq!(a, b);
    assert_eq!(a.input_hash, input_hash(&survey()));
    assert_eq!(a.input_hash.len(), 64);
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );
}

#[test]
fn markdown_lists_sections() {
    let report = evaluate_survey(&survey(), &ArchetypeCatalog::builtin(), &EngineConfig::default())
        .unwrap();
    let md = render_report_markdown(&report);

    assert!(md.starts_with("# Survey Report"));
    assert!(md.contains(&report.input_hash));
    assert!(md.contains("Questions answered: 6/6"));
    assert!(md.contains("## Core Axes"));
    assert!(md.contains("## Facets"));
    assert!(md.contains("Strong Market"));
    assert!(md.contains("## Top Archetypes"));
    assert!(md.contains("## Value Tensions"));
    assert!(md.contains("favors balanced"));
    assert!(md.contains("## Conceptual vs Applied Gaps"));
}

#[test]
fn config_file_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"min_collision_questions": 4, "displayed_collisions": 0, "top_flavors": 2}}"#
    )
    .unwrap();
    let cfg = load_config_from_path(file.path()).unwrap();
    assert_eq!(cfg.min_collision_questions, 4);
    assert_eq!(cfg.gap_threshold, EngineConfig::default().gap_threshold);

    let report = evaluate_survey(&survey(), &ArchetypeCatalog::builtin(), &cfg).unwrap();
    assert!(report.collision_scores.is_empty());
    assert!(report.displayed_collisions.is_empty());
    assert_eq!(report.top_flavors.len(), 2);
}

#[test]
fn invalid_config_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"balanced_threshold": 0.9}}"#).unwrap();
    assert!(matches!(
        load_config_from_path(file.path()),
        Err(EngineError::Config(_))
    ));

    let missing = load_config_from_path("/nonexistent/tenaxes.json");
    assert!(matches!(missing, Err(EngineError::Io(_))));
}

#[test]
fn question_order_is_stable_per_session() {
    let questions = normalize_questions(&survey().questions, &EngineConfig::default()).unwrap();
    let first = question_order(&questions, "session-42");
    let again = question_order(&questions, "session-42");
    assert_eq!(first, again);

    let mut sorted = first.clone();
    sorted.sort_unstable();
    // Inactive question 6 is never presented.
    assert_eq!(sorted, vec![1, 2, 3, 4, 5, 7]);
}
