//! Built-in corrective actions
//!
//! Each corrective works item by item: items that no longer resolve are
//! skipped, and the action reports success only if at least one item was
//! fixed.

use crate::registry::CheckRegistry;
use scenecheck_core::{mat4_approx_eq, mat4_mul, NodeId, Result, SceneCheckError, Transform, Vec3};
use scenecheck_scene::{ComponentKind, Mesh, NodeKind, SceneGraph, SkinCluster};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const ADJUST_LAMINA_FACES: &str = "adjust_lamina_faces";
pub const ADJUST_ZERO_EDGE_LENGTH: &str = "adjust_zero_edge_length";
pub const ADJUST_NGONS: &str = "adjust_ngons";
pub const ADJUST_ZERO_AREA_FACES: &str = "adjust_zero_area_faces";
pub const ADJUST_NON_FROZEN_TRANSFORMS: &str = "adjust_non_frozen_transforms";
pub const ADJUST_NEGATIVE_SCALE: &str = "adjust_negative_scale";
pub const ADJUST_UNUSED_INFLUENCES: &str = "adjust_unused_influences";

/// Vertices closer than this are merged when collapsing an edge
const MERGE_DISTANCE: f64 = 1e-3;

pub(crate) fn register(registry: &mut CheckRegistry) {
    registry.register_corrective(ADJUST_LAMINA_FACES, adjust_lamina_faces);
    registry.register_corrective(ADJUST_ZERO_EDGE_LENGTH, adjust_zero_edge_length);
    registry.register_corrective(ADJUST_NGONS, adjust_ngons);
    registry.register_corrective(ADJUST_ZERO_AREA_FACES, adjust_zero_area_faces);
    registry.register_corrective(ADJUST_NON_FROZEN_TRANSFORMS, adjust_non_frozen_transforms);
    registry.register_corrective(ADJUST_NEGATIVE_SCALE, adjust_negative_scale);
    registry.register_corrective(ADJUST_UNUSED_INFLUENCES, adjust_unused_influences);
}

/// Delete lamina faces
pub fn adjust_lamina_faces(scene: &mut SceneGraph, items: &[String]) -> bool {
    delete_faces(scene, items, ADJUST_LAMINA_FACES)
}

/// Delete zero-area faces
pub fn adjust_zero_area_faces(scene: &mut SceneGraph, items: &[String]) -> bool {
    delete_faces(scene, items, ADJUST_ZERO_AREA_FACES)
}

/// Triangulate n-gons
pub fn adjust_ngons(scene: &mut SceneGraph, items: &[String]) -> bool {
    let grouped = group_components(scene, items, ComponentKind::Face, ADJUST_NGONS);
    let mut split = 0;
    for (mesh, faces) in grouped {
        match scene.get_mut::<Mesh>(mesh) {
            Ok(mut m) => split += m.triangulate_faces(&faces),
            Err(err) => tracing::debug!(corrective = ADJUST_NGONS, error = %err, "mesh skipped"),
        }
    }
    finish(ADJUST_NGONS, split)
}

/// Collapse zero-length edges by merging their end points
pub fn adjust_zero_edge_length(scene: &mut SceneGraph, items: &[String]) -> bool {
    let grouped = group_components(scene, items, ComponentKind::Edge, ADJUST_ZERO_EDGE_LENGTH);
    let mut merged = 0;

    for (id, edges) in grouped {
        let Ok(mut mesh) = scene.get_mut::<Mesh>(id) else {
            continue;
        };
        // Edge indices refer to the mesh before any merge, so resolve them all first
        let all_edges = mesh.edges();
        let pairs: Vec<[usize; 2]> = edges
            .iter()
            .filter_map(|&e| all_edges.get(e).copied())
            .collect();

        let mut merged_into: HashMap<usize, usize> = HashMap::new();
        let resolve = |map: &HashMap<usize, usize>, mut v: usize| {
            while let Some(&next) = map.get(&v) {
                v = next;
            }
            v
        };

        for [a, b] in pairs {
            let (keep, remove) = (resolve(&merged_into, a), resolve(&merged_into, b));
            if keep == remove {
                continue;
            }
            let close = mesh
                .edge_length([keep, remove])
                .map(|len| len <= MERGE_DISTANCE)
                .unwrap_or(false);
            if close && mesh.merge_vertices(keep, remove).is_ok() {
                merged_into.insert(remove, keep);
                merged += 1;
            } else {
                tracing::debug!(
                    corrective = ADJUST_ZERO_EDGE_LENGTH,
                    keep,
                    remove,
                    "vertices not merged"
                );
            }
        }
    }

    finish(ADJUST_ZERO_EDGE_LENGTH, merged)
}

/// Bake each transform into its mesh shapes and reset it to identity.
///
/// Child transforms take on the old local transform so they stay in place.
pub fn adjust_non_frozen_transforms(scene: &mut SceneGraph, items: &[String]) -> bool {
    let mut frozen = 0;
    for item in items {
        match freeze(scene, item) {
            Ok(()) => frozen += 1,
            Err(err) => tracing::debug!(
                corrective = ADJUST_NON_FROZEN_TRANSFORMS,
                item = %item,
                error = %err,
                "item skipped"
            ),
        }
    }
    finish(ADJUST_NON_FROZEN_TRANSFORMS, frozen)
}

fn freeze(scene: &mut SceneGraph, item: &str) -> Result<()> {
    let id = find_node(scene, item)?;
    let matrix = scene.transform(id)?.to_matrix();

    let mut children = Vec::new();
    for child in scene.children(id) {
        if scene.kind(child).is_some_and(|k| k.is_transform()) {
            children.push((child, scene.world_matrix(child)?));
        }
    }

    for shape in scene.shapes(id, NodeKind::Mesh) {
        scene.get_mut::<Mesh>(shape)?.apply_matrix(&matrix);
    }
    for &(child, _) in &children {
        let local = scene.transform(child)?.to_matrix();
        scene.set_transform(child, Transform::from_matrix(&mat4_mul(&matrix, &local)))?;
    }
    scene.set_transform(id, Transform::IDENTITY)?;

    for (child, before) in children {
        if !mat4_approx_eq(&scene.world_matrix(child)?, &before, 1e-6) {
            tracing::warn!(
                corrective = ADJUST_NON_FROZEN_TRANSFORMS,
                node = %item,
                child = %scene.long_name(child)?,
                "child placement approximated; sheared transforms cannot be kept"
            );
        }
    }
    Ok(())
}

/// Make every negative scale axis positive, reversing the first mesh shape's
/// normals once per flipped axis.
pub fn adjust_negative_scale(scene: &mut SceneGraph, items: &[String]) -> bool {
    let mut fixed = 0;
    for item in items {
        match unflip(scene, item) {
            Ok(true) => fixed += 1,
            Ok(false) => {}
            Err(err) => tracing::debug!(
                corrective = ADJUST_NEGATIVE_SCALE,
                item = %item,
                error = %err,
                "item skipped"
            ),
        }
    }
    finish(ADJUST_NEGATIVE_SCALE, fixed)
}

fn unflip(scene: &mut SceneGraph, item: &str) -> Result<bool> {
    let id = find_node(scene, item)?;
    let mut transform = scene.transform(id)?;
    let mut scale = transform.scale.to_array();
    let flipped = scale.iter().filter(|&&s| s < 0.0).count();
    if flipped == 0 {
        return Ok(false);
    }

    for s in &mut scale {
        *s = s.abs();
    }
    transform.scale = Vec3::from_array(scale);
    scene.set_transform(id, transform)?;

    if let Some(&shape) = scene.shapes(id, NodeKind::Mesh).first() {
        let mut mesh = scene.get_mut::<Mesh>(shape)?;
        for _ in 0..flipped {
            mesh.reverse_normals();
        }
    }
    Ok(true)
}

/// Remove influences given as `skin -> influence`
pub fn adjust_unused_influences(scene: &mut SceneGraph, items: &[String]) -> bool {
    let mut removed = 0;
    for item in items {
        let Some((skin, influence)) = item.split_once(" -> ") else {
            tracing::debug!(corrective = ADJUST_UNUSED_INFLUENCES, item = %item, "not a skin influence pair");
            continue;
        };
        let result = find_node(scene, skin)
            .and_then(|id| scene.get_mut::<SkinCluster>(id).map(|mut s| s.remove_influence(influence)));
        match result {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(err) => tracing::debug!(
                corrective = ADJUST_UNUSED_INFLUENCES,
                item = %item,
                error = %err,
                "item skipped"
            ),
        }
    }
    finish(ADJUST_UNUSED_INFLUENCES, removed)
}

fn delete_faces(scene: &mut SceneGraph, items: &[String], corrective: &str) -> bool {
    let grouped = group_components(scene, items, ComponentKind::Face, corrective);
    let mut deleted = 0;
    for (mesh, faces) in grouped {
        match scene.get_mut::<Mesh>(mesh) {
            Ok(mut m) => deleted += m.delete_faces(&faces),
            Err(err) => tracing::debug!(corrective, error = %err, "mesh skipped"),
        }
    }
    finish(corrective, deleted)
}

/// Resolve component paths and group their indices by mesh.
///
/// All paths are resolved before any edit so indices still match the scene
/// the report was taken from.
fn group_components(
    scene: &SceneGraph,
    items: &[String],
    kind: ComponentKind,
    corrective: &str,
) -> BTreeMap<NodeId, BTreeSet<usize>> {
    let mut grouped: BTreeMap<NodeId, BTreeSet<usize>> = BTreeMap::new();
    for item in items {
        match scene.resolve_component(item) {
            Ok((mesh, path)) if path.kind == kind => {
                grouped.entry(mesh).or_default().insert(path.index);
            }
            Ok(_) => tracing::debug!(corrective, item = %item, "unexpected component kind"),
            Err(err) => tracing::debug!(corrective, item = %item, error = %err, "item skipped"),
        }
    }
    grouped
}

fn find_node(scene: &SceneGraph, name: &str) -> Result<NodeId> {
    scene
        .find(name)
        .ok_or_else(|| SceneCheckError::NodeNotFound(name.to_string()))
}

fn finish(corrective: &str, fixed: usize) -> bool {
    tracing::info!(corrective, fixed, "corrective applied");
    fixed > 0
}
