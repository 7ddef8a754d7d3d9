//! Scene saving to TOML files

use crate::component::{AnimCurve, FileTexture, Joint, Material, Node, NodeKind, SkinCluster};
use crate::format::{NodeData, NodeDef, SceneFile};
use crate::graph::SceneGraph;
use crate::mesh::Mesh;
use scenecheck_core::{Result, Transform};
use std::fs;
use std::path::Path;

/// Save a scene graph to a file
pub fn save_scene<P: AsRef<Path>>(path: P, graph: &SceneGraph) -> Result<()> {
    let content = save_scene_string(graph)?;
    fs::write(path.as_ref(), content)?;
    tracing::debug!(path = %path.as_ref().display(), "scene saved");
    Ok(())
}

/// Save a scene graph to a TOML string
pub fn save_scene_string(graph: &SceneGraph) -> Result<String> {
    let scene_file = graph_to_scene_file(graph)?;
    let content = toml::to_string_pretty(&scene_file)?;
    Ok(content)
}

/// Convert a SceneGraph to a SceneFile, nodes in spawn order
pub fn graph_to_scene_file(graph: &SceneGraph) -> Result<SceneFile> {
    let mut scene = SceneFile::new(graph.name());

    for id in graph.all_nodes() {
        let node = (*graph.get::<Node>(id)?).clone();

        let data = match node.kind {
            NodeKind::Transform => NodeData::Transform {
                transform: graph.transform(id)?,
            },
            NodeKind::Mesh => NodeData::Mesh {
                mesh: graph.get::<Mesh>(id).map(|m| (*m).clone()).unwrap_or_default(),
            },
            NodeKind::Camera => NodeData::Camera,
            NodeKind::Joint => NodeData::Joint {
                transform: graph.get::<Transform>(id).map(|t| *t).unwrap_or_default(),
                joint: graph.get::<Joint>(id).map(|j| *j).unwrap_or_default(),
            },
            NodeKind::File => NodeData::File {
                texture: graph
                    .get::<FileTexture>(id)
                    .map(|t| (*t).clone())
                    .unwrap_or_default(),
            },
            NodeKind::Material => NodeData::Material {
                material: graph.get::<Material>(id).map(|m| (*m).clone()).unwrap_or_default(),
            },
            NodeKind::SkinCluster => NodeData::SkinCluster {
                skin: graph
                    .get::<SkinCluster>(id)
                    .map(|s| (*s).clone())
                    .unwrap_or_default(),
            },
            NodeKind::AnimCurve => NodeData::AnimCurve {
                curve: graph.get::<AnimCurve>(id).map(|c| (*c).clone()).unwrap_or_default(),
            },
        };

        let mut def = NodeDef::new(node.name.clone(), data);
        if node.key != node.name {
            def = def.with_key(node.key.clone());
        }
        if let Some(parent) = graph.parent(id).and_then(|p| graph.info(p)) {
            def = def.with_parent(parent.key);
        }

        scene.add_node(def);
    }

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_scene_string;

    #[test]
    fn test_save_scene_string() {
        let mut graph = SceneGraph::new();
        graph.set_name("Saved");
        graph.spawn("grp", "grp", NodeKind::Transform).unwrap();
        graph.spawn("lambert1", "lambert1", NodeKind::Material).unwrap();

        let toml_str = save_scene_string(&graph).unwrap();

        assert!(toml_str.contains("Saved"));
        assert!(toml_str.contains("grp"));
        assert!(toml_str.contains("lambert1"));
    }

    #[test]
    fn test_saved_scene_reloads_with_hierarchy() {
        let original = r#"
[scene]
name = "Reload Test"

[[node]]
name = "pCube1"
key = "cubeA"
type = "transform"
rotate = [0, 45, 0]

[[node]]
name = "pCubeShape1"
parent = "cubeA"
type = "mesh"
points = [[0, 0, 0], [1, 0, 0], [1, 1, 0]]
faces = [[0, 1, 2]]
"#;

        let (graph, _) = load_scene_string(original).unwrap();
        let saved = save_scene_string(&graph).unwrap();
        let (reloaded, scene) = load_scene_string(&saved).unwrap();

        assert_eq!(scene.scene.name, "Reload Test");
        let shape = reloaded.get_id("pCubeShape1").unwrap();
        assert_eq!(reloaded.long_name(shape).unwrap(), "|pCube1|pCubeShape1");
        let cube = reloaded.get_id("cubeA").unwrap();
        assert_eq!(reloaded.transform(cube).unwrap().rotate.y, 45.0);
    }
}
