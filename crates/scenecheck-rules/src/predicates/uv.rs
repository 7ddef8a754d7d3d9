//! UV checks

use crate::probe::{collect_items, Probe};
use crate::report::ViolationReport;
use crate::types::{Rule, Severity};
use scenecheck_core::{NodeId, Result};
use scenecheck_scene::{ComponentKind, ComponentPath, Mesh, NodeKind, SceneGraph};

/// Out-of-range UVs reported across the whole scene
const MAX_OUT_OF_RANGE_UVS: usize = 50;

/// Meshes without any UV set, and UVs outside the 0-1 tile
pub fn check_uv_issues(scene: &SceneGraph, _rule: &Rule) -> Result<Vec<ViolationReport>> {
    let meshes = scene.nodes_of_kind(NodeKind::Mesh);

    let missing = collect_items(
        "check_uv_issues",
        meshes
            .iter()
            .map(|&id| Probe::from_result(unmapped_owner(scene, id))),
    );

    let mut out_of_range = collect_items(
        "check_uv_issues",
        meshes
            .iter()
            .map(|&id| Probe::from_result(out_of_range_uvs(scene, id))),
    );
    out_of_range.truncate(MAX_OUT_OF_RANGE_UVS);

    Ok(vec![
        ViolationReport::new(
            "Missing UVs",
            Severity::Error,
            "UVが設定されていないメッシュがあります",
            missing,
        ),
        ViolationReport::new(
            "UV Out of Range",
            Severity::Warning,
            "0-1範囲外のUVが検出されました",
            out_of_range,
        ),
    ])
}

/// The transform owning a mesh with no UV set; that is what artists select
fn unmapped_owner(scene: &SceneGraph, id: NodeId) -> Result<Option<Vec<String>>> {
    if !scene.get::<Mesh>(id)?.uv_sets.is_empty() {
        return Ok(None);
    }
    match scene.parent(id) {
        Some(parent) => Ok(Some(vec![scene.long_name(parent)?])),
        None => Ok(None),
    }
}

fn out_of_range_uvs(scene: &SceneGraph, id: NodeId) -> Result<Option<Vec<String>>> {
    let hits: Vec<usize> = scene
        .get::<Mesh>(id)?
        .uvs
        .iter()
        .enumerate()
        .filter(|(_, [u, v])| !(0.0..=1.0).contains(u) || !(0.0..=1.0).contains(v))
        .map(|(i, _)| i)
        .collect();
    if hits.is_empty() {
        return Ok(None);
    }

    let node = scene.long_name(id)?;
    Ok(Some(
        hits.into_iter()
            .map(|i| ComponentPath::new(node.clone(), ComponentKind::Uv, i).to_string())
            .collect(),
    ))
}
