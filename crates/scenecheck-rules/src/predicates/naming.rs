//! Naming checks

use super::scene_objects;
use crate::report::ViolationReport;
use crate::types::{Rule, Severity};
use regex::Regex;
use scenecheck_core::{NodeId, Result};
use scenecheck_scene::SceneGraph;
use std::sync::LazyLock;

/// Names Maya gives new primitives and groups
const DEFAULT_PREFIXES: [&str; 7] = [
    "pCube",
    "pSphere",
    "pCylinder",
    "pPlane",
    "pTorus",
    "polySurface",
    "group",
];

const INVALID_CHARS: [char; 5] = [' ', '.', '-', ':', ';'];

/// `{area}_{modelname}_{id}`: four letters, one to ten letters, three digits
static BG_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]{4}_[a-zA-Z]{1,10}_\d{3}$").expect("valid regex")
});

/// Object short and long names, skipping nodes that cannot be named
fn named_objects(scene: &SceneGraph) -> Vec<(NodeId, String, String)> {
    scene_objects(scene)
        .into_iter()
        .filter_map(|id| match (scene.short_name(id), scene.long_name(id)) {
            (Ok(short), Ok(long)) => Some((id, short, long)),
            (Err(err), _) | (_, Err(err)) => {
                tracing::debug!(check = "naming", error = %err, "node skipped");
                None
            }
        })
        .collect()
}

/// Default names, duplicate short names and invalid characters
pub fn check_naming_issues(scene: &SceneGraph, _rule: &Rule) -> Result<Vec<ViolationReport>> {
    let objects = named_objects(scene);

    let default_names: Vec<String> = objects
        .iter()
        .filter(|(_, short, _)| DEFAULT_PREFIXES.iter().any(|p| short.starts_with(p)))
        .map(|(_, _, long)| long.clone())
        .collect();

    // Groups keep the order each short name first appears in
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for (_, short, long) in &objects {
        match groups.iter_mut().find(|(name, _)| *name == short.as_str()) {
            Some((_, members)) => members.push(long.as_str()),
            None => groups.push((short.as_str(), vec![long.as_str()])),
        }
    }
    let duplicates: Vec<String> = groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .flat_map(|(_, members)| members.into_iter().map(str::to_string))
        .collect();

    let invalid_chars: Vec<String> = objects
        .iter()
        .filter(|(_, short, _)| short.contains(&INVALID_CHARS[..]))
        .map(|(_, _, long)| long.clone())
        .collect();

    Ok(vec![
        ViolationReport::new(
            "Default Names",
            Severity::Warning,
            "デフォルト名のオブジェクトが検出されました",
            default_names,
        ),
        ViolationReport::new(
            "Duplicate Names",
            Severity::Error,
            "重複した名前のオブジェクトが検出されました",
            duplicates,
        ),
        ViolationReport::new(
            "Invalid Characters",
            Severity::Warning,
            "無効な文字を含む名前が検出されました",
            invalid_chars,
        ),
    ])
}

/// Strict background-asset naming; always reported as an error
pub fn check_bg_naming_convention(scene: &SceneGraph, rule: &Rule) -> Result<Vec<ViolationReport>> {
    let items: Vec<String> = named_objects(scene)
        .into_iter()
        .filter(|(_, short, _)| !BG_NAME_PATTERN.is_match(short))
        .map(|(_, _, long)| format!("{} (期待形式: area_modelname_id)", long))
        .collect();

    let mut report = ViolationReport::for_rule(rule, items);
    report.severity = Severity::Error;
    Ok(vec![report])
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecheck_scene::NodeKind;

    fn rule() -> Rule {
        Rule::new("Naming", Severity::Warning, "check_naming_issues")
    }

    #[test]
    fn test_default_names() {
        let mut scene = SceneGraph::new();
        scene.spawn("pCube1", "pCube1", NodeKind::Transform).unwrap();
        scene.spawn("group3", "group3", NodeKind::Transform).unwrap();
        scene.spawn("wall", "wall", NodeKind::Transform).unwrap();

        let reports = check_naming_issues(&scene, &rule()).unwrap();
        assert_eq!(reports[0].rule_name, "Default Names");
        assert_eq!(reports[0].items, vec!["|pCube1", "|group3"]);
    }

    #[test]
    fn test_duplicate_names_keep_first_seen_order() {
        let mut scene = SceneGraph::new();
        let a = scene.spawn("a", "a", NodeKind::Transform).unwrap();
        let b = scene.spawn("b", "b", NodeKind::Transform).unwrap();
        let lamp1 = scene.spawn("lampB", "lamp", NodeKind::Transform).unwrap();
        let post1 = scene.spawn("postA", "post", NodeKind::Transform).unwrap();
        let lamp2 = scene.spawn("lampA", "lamp", NodeKind::Transform).unwrap();
        let post2 = scene.spawn("postB", "post", NodeKind::Transform).unwrap();
        scene.set_parent(lamp1, b).unwrap();
        scene.set_parent(lamp2, a).unwrap();
        scene.set_parent(post1, a).unwrap();
        scene.set_parent(post2, b).unwrap();

        let reports = check_naming_issues(&scene, &rule()).unwrap();
        let dupes = &reports[1];
        assert_eq!(dupes.severity, Severity::Error);
        assert_eq!(dupes.items, vec!["|b|lamp", "|a|lamp", "|a|post", "|b|post"]);
    }

    #[test]
    fn test_invalid_characters() {
        let mut scene = SceneGraph::new();
        scene.spawn("bad name", "bad name", NodeKind::Transform).unwrap();
        scene.spawn("ns:rock", "ns:rock", NodeKind::Transform).unwrap();
        scene.spawn("rock_01", "rock_01", NodeKind::Transform).unwrap();

        let reports = check_naming_issues(&scene, &rule()).unwrap();
        assert_eq!(reports[2].items, vec!["|bad name", "|ns:rock"]);
    }

    #[test]
    fn test_cameras_are_ignored() {
        let mut scene = SceneGraph::new();
        let cam = scene.spawn("persp", "persp", NodeKind::Transform).unwrap();
        let shape = scene.spawn("perspShape", "perspShape", NodeKind::Camera).unwrap();
        scene.set_parent(shape, cam).unwrap();

        let bg = Rule::new("BG Naming", Severity::Warning, "check_bg_naming_convention");
        let reports = check_bg_naming_convention(&scene, &bg).unwrap();
        assert!(reports[0].is_empty());
    }

    #[test]
    fn test_bg_naming_convention() {
        let mut scene = SceneGraph::new();
        for name in ["maps_building_001", "city_tree_99", "ab_tree_001", "park_bench_042"] {
            scene.spawn(name, name, NodeKind::Transform).unwrap();
        }

        let bg = Rule::new("BG Naming", Severity::Warning, "check_bg_naming_convention")
            .with_description("area_modelname_id");
        let reports = check_bg_naming_convention(&scene, &bg).unwrap();
        let report = &reports[0];
        assert_eq!(report.severity, Severity::Error);
        assert_eq!(report.rule_name, "BG Naming");
        assert_eq!(
            report.items,
            vec![
                "|city_tree_99 (期待形式: area_modelname_id)",
                "|ab_tree_001 (期待形式: area_modelname_id)",
            ]
        );
    }

    #[test]
    fn test_bg_name_pattern() {
        assert!(BG_NAME_PATTERN.is_match("city_tower_001"));
        assert!(!BG_NAME_PATTERN.is_match("cty_tower_001"));
        assert!(!BG_NAME_PATTERN.is_match("city_tower_01"));
        assert!(!BG_NAME_PATTERN.is_match("city_averyverylongname_001"));
    }
}
