//! Scene loading from TOML files

use crate::format::{NodeData, SceneFile};
use crate::graph::SceneGraph;
use scenecheck_core::{Result, SceneCheckError};
use std::fs;
use std::path::Path;

/// Load a scene from a TOML file.
///
/// A missing file is reported as `SceneNotFound` rather than a bare IO error.
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<(SceneGraph, SceneFile)> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SceneCheckError::SceneNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let (mut graph, scene_file) = load_scene_string(&content)?;
    graph.set_source_path(path);

    tracing::debug!(
        path = %path.display(),
        nodes = graph.node_count(),
        "scene loaded"
    );

    Ok((graph, scene_file))
}

/// Load a scene from a TOML string
pub fn load_scene_string(content: &str) -> Result<(SceneGraph, SceneFile)> {
    let scene_file: SceneFile = toml::from_str(content)?;
    let mut graph = SceneGraph::new();
    graph.set_name(scene_file.scene.name.clone());

    // First pass: create all nodes with their data
    for def in &scene_file.nodes {
        let id = graph.spawn(def.key(), def.name.clone(), def.data.kind())?;

        match &def.data {
            NodeData::Transform { transform } => graph.insert(id, *transform)?,
            NodeData::Mesh { mesh } => graph.insert(id, mesh.clone())?,
            NodeData::Camera => {}
            NodeData::Joint { transform, joint } => {
                graph.insert(id, *transform)?;
                graph.insert(id, *joint)?;
            }
            NodeData::File { texture } => graph.insert(id, texture.clone())?,
            NodeData::Material { material } => graph.insert(id, material.clone())?,
            NodeData::SkinCluster { skin } => graph.insert(id, skin.clone())?,
            NodeData::AnimCurve { curve } => graph.insert(id, curve.clone())?,
        }
    }

    // Second pass: relationships, now that every key exists
    for def in &scene_file.nodes {
        if let Some(parent) = &def.parent {
            graph.set_parent_by_key(def.key(), parent)?;
        }
    }

    Ok((graph, scene_file))
}
