//! Transform checks

use crate::correctives::{ADJUST_NEGATIVE_SCALE, ADJUST_NON_FROZEN_TRANSFORMS};
use crate::probe::{collect_items, Probe};
use crate::report::ViolationReport;
use crate::types::{Rule, Severity};
use scenecheck_core::{NodeId, Result};
use scenecheck_scene::{NodeKind, SceneGraph, ZERO_TOLERANCE};

/// Unfrozen mesh transforms and negative scale
pub fn check_transform_issues(scene: &SceneGraph, _rule: &Rule) -> Result<Vec<ViolationReport>> {
    let mut transforms = scene.nodes_of_kind(NodeKind::Transform);
    transforms.extend(scene.nodes_of_kind(NodeKind::Joint));
    transforms.sort();

    let non_frozen = collect_items(
        "check_transform_issues",
        transforms
            .iter()
            .map(|&id| Probe::from_result(non_frozen(scene, id))),
    );
    let negative = collect_items(
        "check_transform_issues",
        transforms
            .iter()
            .map(|&id| Probe::from_result(negative_scale(scene, id))),
    );

    Ok(vec![
        ViolationReport::new(
            "Non-Frozen Transforms",
            Severity::Warning,
            "フリーズされていないトランスフォームが検出されました",
            non_frozen,
        )
        .with_corrective(ADJUST_NON_FROZEN_TRANSFORMS),
        ViolationReport::new(
            "Negative Scale",
            Severity::Error,
            "負のスケール値が検出されました",
            negative,
        )
        .with_corrective(ADJUST_NEGATIVE_SCALE),
    ])
}

/// Only transforms that carry a mesh need to be frozen
fn non_frozen(scene: &SceneGraph, id: NodeId) -> Result<Option<Vec<String>>> {
    if scene.shapes(id, NodeKind::Mesh).is_empty() {
        return Ok(None);
    }
    if scene.transform(id)?.is_identity(ZERO_TOLERANCE) {
        return Ok(None);
    }
    Ok(Some(vec![scene.long_name(id)?]))
}

fn negative_scale(scene: &SceneGraph, id: NodeId) -> Result<Option<Vec<String>>> {
    let scale = scene.transform(id)?.scale;
    if scale.to_array().iter().all(|&s| s >= 0.0) {
        return Ok(None);
    }
    Ok(Some(vec![scene.long_name(id)?]))
}
