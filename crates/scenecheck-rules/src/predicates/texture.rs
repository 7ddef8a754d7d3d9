//! File texture checks

use crate::probe::{collect_items, Probe};
use crate::report::ViolationReport;
use crate::types::Rule;
use regex::Regex;
use scenecheck_core::{NodeId, Result};
use scenecheck_scene::{FileTexture, NodeKind, SceneGraph};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Tokens such as `<UDIM>` or `<f>` in sequence paths
static SEQUENCE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// File nodes whose texture does not exist on disk.
///
/// Sequence paths are left to `check_texture_sequences`.
pub fn check_missing_textures(scene: &SceneGraph, rule: &Rule) -> Result<Vec<ViolationReport>> {
    let items = collect_items(
        "check_missing_textures",
        scene.nodes_of_kind(NodeKind::File).into_iter().map(|id| {
            Probe::from_result(texture(scene, id).map(|(name, tex)| {
                let missing = !tex.path.is_empty()
                    && !tex.is_sequence()
                    && !resolve(scene, Path::new(&tex.path)).exists();
                missing.then(|| vec![format!("{} -> {}", name, tex.path)])
            }))
        }),
    );
    Ok(vec![ViolationReport::for_rule(rule, items)])
}

/// Sequence textures whose directory is missing
pub fn check_texture_sequences(scene: &SceneGraph, rule: &Rule) -> Result<Vec<ViolationReport>> {
    let items = collect_items(
        "check_texture_sequences",
        scene.nodes_of_kind(NodeKind::File).into_iter().map(|id| {
            Probe::from_result(texture(scene, id).map(|(name, tex)| {
                if !tex.is_sequence() {
                    return None;
                }
                let pattern = SEQUENCE_TOKEN.replace_all(&tex.path, "*");
                let Some(dir) = Path::new(&*pattern).parent() else {
                    return None;
                };
                if dir.as_os_str().is_empty() || resolve(scene, dir).exists() {
                    return None;
                }
                Some(vec![format!(
                    "{} -> {} (ディレクトリが見つかりません)",
                    name, tex.path
                )])
            }))
        }),
    );
    Ok(vec![ViolationReport::for_rule(rule, items)])
}

fn texture(scene: &SceneGraph, id: NodeId) -> Result<(String, FileTexture)> {
    let tex = (*scene.get::<FileTexture>(id)?).clone();
    Ok((scene.short_name(id)?, tex))
}

/// Relative paths are taken relative to the scene file's directory
fn resolve(scene: &SceneGraph, path: &Path) -> PathBuf {
    match scene.source_dir() {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use std::fs;

    fn add_file(scene: &mut SceneGraph, name: &str, path: &str) {
        let id = scene.spawn(name, name, NodeKind::File).unwrap();
        scene
            .insert(id, FileTexture { path: path.to_string() })
            .unwrap();
    }

    fn scene_in(dir: &Path) -> SceneGraph {
        let mut scene = SceneGraph::new();
        scene.set_source_path(dir.join("level.toml"));
        scene
    }

    #[test]
    fn test_missing_textures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("brick.png"), b"png").unwrap();

        let mut scene = scene_in(dir.path());
        add_file(&mut scene, "file1", "brick.png");
        add_file(&mut scene, "file2", "gone.png");
        add_file(&mut scene, "file3", "");
        add_file(&mut scene, "file4", "seq/tex.<UDIM>.png");

        let rule = Rule::new("Missing Textures", Severity::Error, "check_missing_textures");
        let reports = check_missing_textures(&scene, &rule).unwrap();
        assert_eq!(reports[0].items, vec!["file2 -> gone.png"]);
        assert_eq!(reports[0].rule_name, "Missing Textures");
    }

    #[test]
    fn test_texture_sequences() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("present")).unwrap();

        let mut scene = scene_in(dir.path());
        add_file(&mut scene, "seqOk", "present/tex.<UDIM>.png");
        add_file(&mut scene, "seqBad", "absent/tex.<f>.png");
        add_file(&mut scene, "seqLocal", "tex.<UDIM>.png");
        add_file(&mut scene, "plain", "absent/tex.png");

        let rule = Rule::new("Sequences", Severity::Warning, "check_texture_sequences");
        let reports = check_texture_sequences(&scene, &rule).unwrap();
        assert_eq!(
            reports[0].items,
            vec!["seqBad -> absent/tex.<f>.png (ディレクトリが見つかりません)"]
        );
    }

    #[test]
    fn test_token_inside_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = scene_in(dir.path());
        add_file(&mut scene, "seq", "shots/<f>/tex.png");

        let rule = Rule::new("Sequences", Severity::Warning, "check_texture_sequences");
        let reports = check_texture_sequences(&scene, &rule).unwrap();
        assert_eq!(reports[0].count(), 1);
    }

    #[test]
    fn test_sequence_tokens_become_wildcards() {
        assert_eq!(
            SEQUENCE_TOKEN.replace_all("seq/<UDIM>/tex.<f>.png", "*"),
            "seq/*/tex.*.png"
        );
        assert_eq!(SEQUENCE_TOKEN.replace_all("plain.png", "*"), "plain.png");
    }
}
