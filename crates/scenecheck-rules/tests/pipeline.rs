//! End-to-end tests: rule sets on disk, scenes on disk, runs, fixes and export.

use scenecheck_core::SceneCheckError;
use scenecheck_rules::{
    batch_check_multiple, list_configs, load_rule_config, render_csv, run_batch_check,
    try_load_rule_config, BatchRequest, CheckRegistry, CheckRunner, ResultBoard, Rule, Severity,
    ViolationReport,
};
use scenecheck_scene::{load_scene, save_scene, SceneGraph};
use std::fs;
use std::path::{Path, PathBuf};

const FLIPPED_SCENE: &str = r#"
[scene]
name = "Flipped"

[[node]]
name = "prop_crate_01"
type = "transform"
scale = [-1, 1, 1]

[[node]]
name = "prop_crate_01Shape"
parent = "prop_crate_01"
type = "mesh"
points = [[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0]]
faces = [[0, 1, 2, 3]]
uv_sets = ["map1"]
uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]
"#;

const TRANSFORM_RULES: &str = r#"{
    "name": "Transforms",
    "categories": {
        "Transform": [
            {"name": "Transform Issues", "severity": "warning", "function": "check_transform_issues"}
        ]
    }
}"#;

fn shipped_configs() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs")
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_shipped_configs_reference_registered_functions() {
    let registry = CheckRegistry::builtin();
    let configs = list_configs(shipped_configs());
    let ids: Vec<_> = configs.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["bg_checks", "effect_checks", "motion_checks"]);

    for summary in &configs {
        let config = try_load_rule_config(shipped_configs(), &summary.id).unwrap();
        assert!(!config.is_empty(), "{} has no rules", summary.id);
        for rule in config.rules() {
            assert!(
                registry.lookup(&rule.predicate).is_some(),
                "{}: unknown check {}",
                summary.id,
                rule.predicate
            );
            if let Some(corrective) = &rule.corrective {
                assert!(registry.lookup_corrective(corrective).is_some());
            }
        }
    }
}

#[test]
fn test_category_order_follows_file_order() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "ordered.json",
        r#"{"categories": {
            "Zeta": [{"name": "Z1", "function": "check_ngons"}],
            "Alpha": [{"name": "A1", "function": "check_zero_area_faces"},
                      {"name": "A2", "function": "check_shader_issues"}]
        }}"#,
    );

    let config = load_rule_config(dir.path(), "ordered");
    let registry = CheckRegistry::builtin();
    let mut messages = Vec::new();
    CheckRunner::new(&registry, config.rules()).run_with_progress(
        &SceneGraph::new(),
        |_, _, message| {
            messages.push(message.to_string());
            true
        },
    );

    assert_eq!(
        messages,
        vec!["チェック中: Z1", "チェック中: A1", "チェック中: A2"]
    );
}

#[test]
fn test_only_non_empty_reports_are_kept_and_exported() {
    let mut registry = CheckRegistry::new();
    registry.register_predicate("two_items", |_scene, rule| {
        Ok(vec![ViolationReport::for_rule(rule, vec!["|a".into(), "|b".into()])])
    });
    registry.register_predicate("nothing", |_scene, rule| {
        Ok(vec![ViolationReport::for_rule(rule, vec![])])
    });
    let rules = vec![
        Rule::new("First", Severity::Error, "two_items"),
        Rule::new("Second", Severity::Warning, "nothing"),
        Rule::new("Third", Severity::Warning, "two_items"),
    ];

    let session = CheckRunner::new(&registry, rules).run(&SceneGraph::new());
    let names: Vec<_> = session.reports().iter().map(|r| r.rule_name.as_str()).collect();
    assert_eq!(names, vec!["First", "Third"]);

    let csv = render_csv(session.reports());
    assert!(csv.starts_with('\u{feff}'));
    // Header plus one row per report; items share a field
    assert_eq!(csv.matches("\r\n").count(), 3);
    assert!(csv.contains("First,error,2,,\"|a\n|b\"\r\n"));
}

#[test]
fn test_batch_missing_scene_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.csv");
    let request = BatchRequest::new(shipped_configs())
        .with_scene(dir.path().join("missing.toml"))
        .with_output(&output);

    let mut scene = SceneGraph::new();
    let result = run_batch_check(&mut scene, &CheckRegistry::builtin(), &request);
    assert!(matches!(result, Err(SceneCheckError::SceneNotFound(_))));
    assert!(!output.exists());
}

#[test]
fn test_batch_with_missing_config_exports_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let scene_file = write(dir.path(), "flipped.toml", FLIPPED_SCENE);
    let request = BatchRequest::new(dir.path())
        .with_config("no_such_rules")
        .with_scene(&scene_file)
        .with_output(dir.path().join("report.csv"));

    let mut scene = SceneGraph::new();
    let written = run_batch_check(&mut scene, &CheckRegistry::builtin(), &request).unwrap();
    let csv = fs::read_to_string(written).unwrap();
    assert_eq!(csv.matches("\r\n").count(), 1);
    assert_eq!(scene.name(), "Flipped");
}

#[test]
fn test_batch_multiple_skips_failures() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "transforms.json", TRANSFORM_RULES);
    let good = write(dir.path(), "flipped.toml", FLIPPED_SCENE);
    let missing = dir.path().join("missing.toml");
    let out_dir = dir.path().join("reports");

    let written = batch_check_multiple(
        &CheckRegistry::builtin(),
        &[good, missing],
        dir.path(),
        "transforms",
        Some(&out_dir),
    );

    assert_eq!(written, vec![out_dir.join("flipped_check_results.csv")]);
    let csv = fs::read_to_string(&written[0]).unwrap();
    assert!(csv.contains("Negative Scale,error,1,"));
    assert!(csv.contains("|prop_crate_01"));
}

#[test]
fn test_check_adjust_save_and_recheck() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "transforms.json", TRANSFORM_RULES);
    let scene_file = write(dir.path(), "flipped.toml", FLIPPED_SCENE);

    let registry = CheckRegistry::builtin();
    let rules = load_rule_config(dir.path(), "transforms").rules();
    let (mut scene, _) = load_scene(&scene_file).unwrap();

    let session = CheckRunner::new(&registry, rules.clone()).run(&scene);
    let mut board = ResultBoard::from_session(session);
    let names: Vec<_> = board.reports().iter().map(|r| r.rule_name.as_str()).collect();
    assert_eq!(names, vec!["Non-Frozen Transforms", "Negative Scale"]);

    let index = board.position("Negative Scale").unwrap();
    let outcome = board.adjust(index, &mut scene, &registry).unwrap();
    assert_eq!(outcome.items, 1);
    assert!(board.is_stale());

    save_scene(&scene_file, &scene).unwrap();
    let (reloaded, _) = load_scene(&scene_file).unwrap();
    let rerun = CheckRunner::new(&registry, rules).run(&reloaded);
    assert!(rerun.reports().is_empty());
    assert!(rerun.summary().is_clean());
}
