//! Built-in predicates
//!
//! Every predicate is read-only. Predicates may return zero-count reports;
//! the runner drops them.

mod geometry;
mod naming;
mod rig;
mod shader;
mod texture;
mod transform;
mod uv;

pub use geometry::{check_geometry_issues, check_ngons, check_zero_area_faces};
pub use naming::{check_bg_naming_convention, check_naming_issues};
pub use rig::{check_animation_keys, check_joint_orientation, check_skin_weights, check_unused_influences};
pub use shader::check_shader_issues;
pub use texture::{check_missing_textures, check_texture_sequences};
pub use transform::check_transform_issues;
pub use uv::check_uv_issues;

use crate::probe::Probe;
use crate::registry::CheckRegistry;
use scenecheck_core::{NodeId, Result, SceneCheckError};
use scenecheck_scene::{ComponentKind, ComponentPath, Mesh, MeshError, NodeKind, SceneGraph};

pub(crate) fn register(registry: &mut CheckRegistry) {
    registry.register_predicate("check_geometry_issues", check_geometry_issues);
    registry.register_predicate("check_ngons", check_ngons);
    registry.register_predicate("check_zero_area_faces", check_zero_area_faces);
    registry.register_predicate("check_uv_issues", check_uv_issues);
    registry.register_predicate("check_missing_textures", check_missing_textures);
    registry.register_predicate("check_texture_sequences", check_texture_sequences);
    registry.register_predicate("check_naming_issues", check_naming_issues);
    registry.register_predicate("check_bg_naming_convention", check_bg_naming_convention);
    registry.register_predicate("check_transform_issues", check_transform_issues);
    registry.register_predicate("check_joint_orientation", check_joint_orientation);
    registry.register_predicate("check_skin_weights", check_skin_weights);
    registry.register_predicate("check_unused_influences", check_unused_influences);
    registry.register_predicate("check_animation_keys", check_animation_keys);
    registry.register_predicate("check_shader_issues", check_shader_issues);
}

/// Run a component query on one mesh node and format the hits as component paths
pub(crate) fn probe_mesh<F>(
    scene: &SceneGraph,
    id: NodeId,
    kind: ComponentKind,
    query: F,
) -> Probe<Vec<String>>
where
    F: FnOnce(&Mesh) -> std::result::Result<Vec<usize>, MeshError>,
{
    Probe::from_result(mesh_components(scene, id, kind, query))
}

fn mesh_components<F>(
    scene: &SceneGraph,
    id: NodeId,
    kind: ComponentKind,
    query: F,
) -> Result<Option<Vec<String>>>
where
    F: FnOnce(&Mesh) -> std::result::Result<Vec<usize>, MeshError>,
{
    let indices = {
        let mesh = scene.get::<Mesh>(id)?;
        query(&mesh).map_err(|e| SceneCheckError::MalformedMesh {
            mesh: scene.short_name(id).unwrap_or_default(),
            reason: e.to_string(),
        })?
    };
    if indices.is_empty() {
        return Ok(None);
    }

    let node = scene.long_name(id)?;
    Ok(Some(
        indices
            .into_iter()
            .map(|i| ComponentPath::new(node.clone(), kind, i).to_string())
            .collect(),
    ))
}

/// Transform-like DAG objects, excluding camera transforms
pub(crate) fn scene_objects(scene: &SceneGraph) -> Vec<NodeId> {
    let mut objects = scene.nodes_of_kind(NodeKind::Transform);
    objects.extend(scene.nodes_of_kind(NodeKind::Joint));
    objects.sort();
    objects.retain(|&id| scene.shapes(id, NodeKind::Camera).is_empty());
    objects
}

#[cfg(test)]
pub(crate) mod fixtures {
    use scenecheck_core::{NodeId, Vec3};
    use scenecheck_scene::{Mesh, NodeKind, SceneGraph};

    /// Unit quad on the XZ plane
    pub fn quad() -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            vec![vec![0, 1, 2, 3]],
        )
    }

    /// Add a transform with a mesh shape named `<name>Shape`
    pub fn add_mesh(scene: &mut SceneGraph, name: &str, mesh: Mesh) -> (NodeId, NodeId) {
        let xform = scene.spawn(name, name, NodeKind::Transform).unwrap();
        let shape_name = format!("{name}Shape");
        let shape = scene.spawn(shape_name.clone(), shape_name, NodeKind::Mesh).unwrap();
        scene.insert(shape, mesh).unwrap();
        scene.set_parent(shape, xform).unwrap();
        (xform, shape)
    }
}
