//! Mesh topology checks

use super::probe_mesh;
use crate::correctives::{ADJUST_LAMINA_FACES, ADJUST_NGONS, ADJUST_ZERO_AREA_FACES, ADJUST_ZERO_EDGE_LENGTH};
use crate::probe::collect_items;
use crate::report::ViolationReport;
use crate::types::{Rule, Severity};
use scenecheck_core::Result;
use scenecheck_scene::{ComponentKind, NodeKind, SceneGraph, ZERO_TOLERANCE};

/// Non-manifold vertices, lamina faces and zero-length edges in one pass
pub fn check_geometry_issues(scene: &SceneGraph, _rule: &Rule) -> Result<Vec<ViolationReport>> {
    let meshes = scene.nodes_of_kind(NodeKind::Mesh);

    let non_manifold = collect_items(
        "check_geometry_issues",
        meshes
            .iter()
            .map(|&id| probe_mesh(scene, id, ComponentKind::Vertex, |mesh| mesh.non_manifold_vertices())),
    );

    let lamina = collect_items(
        "check_geometry_issues",
        meshes
            .iter()
            .map(|&id| probe_mesh(scene, id, ComponentKind::Face, |mesh| mesh.lamina_faces())),
    );

    let zero_edges = collect_items(
        "check_geometry_issues",
        meshes.iter().map(|&id| {
            probe_mesh(scene, id, ComponentKind::Edge, |mesh| {
                Ok(mesh
                    .edges()
                    .into_iter()
                    .enumerate()
                    .filter(|(_, edge)| {
                        mesh.edge_length(*edge)
                            .map(|len| len < ZERO_TOLERANCE)
                            .unwrap_or(false)
                    })
                    .map(|(i, _)| i)
                    .collect())
            })
        }),
    );

    Ok(vec![
        ViolationReport::new(
            "Non-Manifold Vertices",
            Severity::Error,
            "非多様体頂点が検出されました",
            non_manifold,
        ),
        ViolationReport::new(
            "Lamina Faces",
            Severity::Error,
            "ラミナフェースが検出されました",
            lamina,
        )
        .with_corrective(ADJUST_LAMINA_FACES),
        ViolationReport::new(
            "Zero Edge Length",
            Severity::Warning,
            "長さがゼロのエッジが検出されました",
            zero_edges,
        )
        .with_corrective(ADJUST_ZERO_EDGE_LENGTH),
    ])
}

/// Faces with more than four sides
pub fn check_ngons(scene: &SceneGraph, rule: &Rule) -> Result<Vec<ViolationReport>> {
    let items = collect_items(
        "check_ngons",
        scene
            .nodes_of_kind(NodeKind::Mesh)
            .into_iter()
            .map(|id| probe_mesh(scene, id, ComponentKind::Face, |mesh| Ok(mesh.ngons()))),
    );
    Ok(vec![
        ViolationReport::for_rule(rule, items).with_default_corrective(ADJUST_NGONS)
    ])
}

/// Faces whose area is below tolerance
pub fn check_zero_area_faces(scene: &SceneGraph, rule: &Rule) -> Result<Vec<ViolationReport>> {
    let items = collect_items(
        "check_zero_area_faces",
        scene.nodes_of_kind(NodeKind::Mesh).into_iter().map(|id| {
            probe_mesh(scene, id, ComponentKind::Face, |mesh| {
                // Faces that cannot be measured are left to the topology checks
                Ok((0..mesh.faces.len())
                    .filter(|&f| {
                        mesh.face_area(f)
                            .map(|area| area < ZERO_TOLERANCE)
                            .unwrap_or(false)
                    })
                    .collect())
            })
        }),
    );
    Ok(vec![
        ViolationReport::for_rule(rule, items).with_default_corrective(ADJUST_ZERO_AREA_FACES)
    ])
}
