//! Rig and animation checks

use crate::correctives::ADJUST_UNUSED_INFLUENCES;
use crate::probe::{collect_items, Probe};
use crate::report::ViolationReport;
use crate::types::{Rule, Severity};
use scenecheck_core::{NodeId, Result, SceneCheckError};
use scenecheck_scene::{
    AnimCurve, ComponentKind, ComponentPath, Joint, Mesh, NodeKind, SceneGraph, SkinCluster,
    ZERO_TOLERANCE,
};

/// Joint orient angles beyond this are treated as flipped
const MAX_JOINT_ORIENT: f64 = 170.0;

/// Joints with an extreme joint orient on any axis
pub fn check_joint_orientation(scene: &SceneGraph, rule: &Rule) -> Result<Vec<ViolationReport>> {
    let items = collect_items(
        "check_joint_orientation",
        scene
            .nodes_of_kind(NodeKind::Joint)
            .into_iter()
            .map(|id| Probe::from_result(extreme_orient(scene, id))),
    );
    Ok(vec![ViolationReport::for_rule(rule, items)])
}

fn extreme_orient(scene: &SceneGraph, id: NodeId) -> Result<Option<Vec<String>>> {
    let orient = scene.get::<Joint>(id)?.orient;
    if orient.to_array().iter().all(|a| a.abs() <= MAX_JOINT_ORIENT) {
        return Ok(None);
    }
    Ok(Some(vec![scene.long_name(id)?]))
}

/// One report per skin cluster listing vertices with no weight
pub fn check_skin_weights(scene: &SceneGraph, _rule: &Rule) -> Result<Vec<ViolationReport>> {
    let mut reports = Vec::new();
    for id in scene.nodes_of_kind(NodeKind::SkinCluster) {
        match zero_weight_vertices(scene, id) {
            Ok((skin, items)) => reports.push(ViolationReport::new(
                format!("Zero Weight Vertices ({})", skin),
                Severity::Error,
                "ウェイトが0の頂点が検出されました",
                items,
            )),
            Err(err) => tracing::debug!(check = "check_skin_weights", error = %err, "skin skipped"),
        }
    }
    Ok(reports)
}

fn zero_weight_vertices(scene: &SceneGraph, id: NodeId) -> Result<(String, Vec<String>)> {
    let skin = (*scene.get::<SkinCluster>(id)?).clone();
    let geometry = bound_mesh(scene, &skin.geometry)?;
    let vertex_count = scene.get::<Mesh>(geometry)?.points.len();
    let node = scene.long_name(geometry)?;

    let items = (0..vertex_count)
        .filter(|&v| skin.vertex_total(v).map_or(true, |total| total.abs() < ZERO_TOLERANCE))
        .map(|v| ComponentPath::new(node.clone(), ComponentKind::Vertex, v).to_string())
        .collect();
    Ok((scene.short_name(id)?, items))
}

/// The mesh a skin is bound to; a transform resolves to its mesh shape
fn bound_mesh(scene: &SceneGraph, geometry: &str) -> Result<NodeId> {
    let id = scene
        .get_id(geometry)
        .or_else(|| scene.find(geometry))
        .ok_or_else(|| SceneCheckError::NodeNotFound(geometry.to_string()))?;
    match scene.kind(id) {
        Some(NodeKind::Mesh) => Ok(id),
        _ => scene
            .shapes(id, NodeKind::Mesh)
            .first()
            .copied()
            .ok_or_else(|| SceneCheckError::WrongNodeType {
                node: geometry.to_string(),
                expected: NodeKind::Mesh.to_string(),
            }),
    }
}

/// Influences carrying no weight anywhere, as `skin -> influence`
pub fn check_unused_influences(scene: &SceneGraph, rule: &Rule) -> Result<Vec<ViolationReport>> {
    let items = collect_items(
        "check_unused_influences",
        scene
            .nodes_of_kind(NodeKind::SkinCluster)
            .into_iter()
            .map(|id| Probe::from_result(unused_influences(scene, id))),
    );
    Ok(vec![
        ViolationReport::for_rule(rule, items).with_default_corrective(ADJUST_UNUSED_INFLUENCES)
    ])
}

fn unused_influences(scene: &SceneGraph, id: NodeId) -> Result<Option<Vec<String>>> {
    let name = scene.short_name(id)?;
    let skin = scene.get::<SkinCluster>(id)?;
    let unused: Vec<String> = skin
        .influences
        .iter()
        .enumerate()
        .filter(|(i, _)| skin.influence_total(*i).map_or(true, |total| total < ZERO_TOLERANCE))
        .map(|(_, influence)| format!("{} -> {}", name, influence))
        .collect();
    Ok((!unused.is_empty()).then_some(unused))
}

/// Curves holding exactly one key
pub fn check_animation_keys(scene: &SceneGraph, rule: &Rule) -> Result<Vec<ViolationReport>> {
    let items = collect_items(
        "check_animation_keys",
        scene.nodes_of_kind(NodeKind::AnimCurve).into_iter().map(|id| {
            Probe::from_result((|| -> Result<Option<Vec<String>>> {
                if scene.get::<AnimCurve>(id)?.key_count() != 1 {
                    return Ok(None);
                }
                Ok(Some(vec![format!("{} (キーが1つだけ)", scene.short_name(id)?)]))
            })())
        }),
    );
    Ok(vec![ViolationReport::for_rule(rule, items)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicates::fixtures::{add_mesh, quad};
    use scenecheck_core::Vec3;

    fn rule(name: &str, predicate: &str) -> Rule {
        Rule::new(name, Severity::Warning, predicate).with_description("rig")
    }

    fn add_skin(scene: &mut SceneGraph, name: &str, skin: SkinCluster) {
        let id = scene.spawn(name, name, NodeKind::SkinCluster).unwrap();
        scene.insert(id, skin).unwrap();
    }

    #[test]
    fn test_joint_orientation() {
        let mut scene = SceneGraph::new();
        let root = scene.spawn("root", "root", NodeKind::Joint).unwrap();
        let spine = scene.spawn("spine", "spine", NodeKind::Joint).unwrap();
        scene.set_parent(spine, root).unwrap();
        scene.insert(root, Joint { orient: Vec3::new(0.0, 90.0, 0.0) }).unwrap();
        scene.insert(spine, Joint { orient: Vec3::new(0.0, 0.0, -175.0) }).unwrap();

        let reports =
            check_joint_orientation(&scene, &rule("Joint Orient", "check_joint_orientation")).unwrap();
        assert_eq!(reports[0].items, vec!["|root|spine"]);
        assert_eq!(reports[0].description, "rig");
    }

    #[test]
    fn test_skin_weights_per_cluster() {
        let mut scene = SceneGraph::new();
        add_mesh(&mut scene, "body", quad());
        add_skin(
            &mut scene,
            "skinCluster1",
            SkinCluster {
                geometry: "bodyShape".to_string(),
                influences: vec!["root".into(), "spine".into()],
                weights: vec![vec![1.0, 0.0], vec![0.0, 0.0], vec![0.5, 0.5]],
            },
        );

        let reports =
            check_skin_weights(&scene, &rule("Skin Weights", "check_skin_weights")).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].rule_name, "Zero Weight Vertices (skinCluster1)");
        assert_eq!(reports[0].severity, Severity::Error);
        // Vertex 3 has no weight row at all
        assert_eq!(
            reports[0].items,
            vec!["|body|bodyShape.vtx[1]", "|body|bodyShape.vtx[3]"]
        );
    }

    #[test]
    fn test_skin_bound_to_missing_mesh_is_skipped() {
        let mut scene = SceneGraph::new();
        add_skin(
            &mut scene,
            "skinCluster1",
            SkinCluster {
                geometry: "ghost".to_string(),
                ..SkinCluster::default()
            },
        );
        let reports =
            check_skin_weights(&scene, &rule("Skin Weights", "check_skin_weights")).unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn test_unused_influences() {
        let mut scene = SceneGraph::new();
        add_mesh(&mut scene, "body", quad());
        add_skin(
            &mut scene,
            "skinCluster1",
            SkinCluster {
                geometry: "body".to_string(),
                influences: vec!["root".into(), "spine".into(), "tip".into()],
                weights: vec![vec![1.0, 0.0, 0.0], vec![0.5, 0.5, 0.0]],
            },
        );

        let reports = check_unused_influences(
            &scene,
            &rule("Unused Influences", "check_unused_influences"),
        )
        .unwrap();
        assert_eq!(reports[0].items, vec!["skinCluster1 -> tip"]);
        assert_eq!(reports[0].corrective.as_deref(), Some(ADJUST_UNUSED_INFLUENCES));
    }

    #[test]
    fn test_animation_keys() {
        let mut scene = SceneGraph::new();
        for (name, keys) in [
            ("pCube1_translateX", vec![[1.0, 0.0]]),
            ("pCube1_translateY", vec![[1.0, 0.0], [10.0, 5.0]]),
            ("pCube1_translateZ", vec![]),
        ] {
            let id = scene.spawn(name, name, NodeKind::AnimCurve).unwrap();
            scene.insert(id, AnimCurve { keys }).unwrap();
        }

        let reports =
            check_animation_keys(&scene, &rule("Anim Keys", "check_animation_keys")).unwrap();
        assert_eq!(reports[0].items, vec!["pCube1_translateX (キーが1つだけ)"]);
    }
}
