//! Shader checks

use crate::report::ViolationReport;
use crate::types::Rule;
use scenecheck_core::Result;
use scenecheck_scene::{NodeKind, SceneGraph};

/// The one material every scene keeps
const DEFAULT_MATERIAL: &str = "lambert1";

/// Any material besides the default; shading is assigned on the target side
pub fn check_shader_issues(scene: &SceneGraph, rule: &Rule) -> Result<Vec<ViolationReport>> {
    let items: Vec<String> = scene
        .nodes_of_kind(NodeKind::Material)
        .into_iter()
        .filter_map(|id| scene.short_name(id).ok())
        .filter(|name| name != DEFAULT_MATERIAL)
        .collect();

    Ok(vec![ViolationReport::for_rule(rule, items).with_description(
        "不要なマテリアルが見つかりました（シェーダーは実機側で付与するため）",
    )])
}
