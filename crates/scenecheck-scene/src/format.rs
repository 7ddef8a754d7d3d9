//! Scene file format definitions

use crate::component::{AnimCurve, FileTexture, Joint, Material, NodeKind, SkinCluster};
use crate::mesh::Mesh;
use scenecheck_core::Transform;
use serde::{Deserialize, Serialize};

/// Root structure of a scene TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub scene: SceneMetadata,
    /// Nodes in file order; parents may appear after their children
    #[serde(default, rename = "node")]
    pub nodes: Vec<NodeDef>,
}

/// Scene metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Definition of a node in a scene file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    /// Short name; may repeat under different parents
    pub name: String,
    /// Unique key other nodes refer to; defaults to `name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Key of the parent node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub data: NodeData,
}

impl NodeDef {
    pub fn new(name: impl Into<String>, data: NodeData) -> Self {
        Self {
            name: name.into(),
            key: None,
            parent: None,
            data,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// The unique key, falling back to the short name
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }
}

/// Type-specific node data, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeData {
    Transform {
        #[serde(flatten)]
        transform: Transform,
    },
    Mesh {
        #[serde(flatten)]
        mesh: Mesh,
    },
    Camera,
    Joint {
        #[serde(flatten)]
        transform: Transform,
        #[serde(flatten)]
        joint: Joint,
    },
    File {
        #[serde(flatten)]
        texture: FileTexture,
    },
    Material {
        #[serde(flatten)]
        material: Material,
    },
    SkinCluster {
        #[serde(flatten)]
        skin: SkinCluster,
    },
    AnimCurve {
        #[serde(flatten)]
        curve: AnimCurve,
    },
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::Transform { .. } => NodeKind::Transform,
            NodeData::Mesh { .. } => NodeKind::Mesh,
            NodeData::Camera => NodeKind::Camera,
            NodeData::Joint { .. } => NodeKind::Joint,
            NodeData::File { .. } => NodeKind::File,
            NodeData::Material { .. } => NodeKind::Material,
            NodeData::SkinCluster { .. } => NodeKind::SkinCluster,
            NodeData::AnimCurve { .. } => NodeKind::AnimCurve,
        }
    }
}

impl SceneFile {
    /// Create a new scene file
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scene: SceneMetadata {
                name: name.into(),
                version: default_version(),
                description: None,
            },
            nodes: Vec::new(),
        }
    }

    /// Append a node to the scene
    pub fn add_node(&mut self, node: NodeDef) {
        self.nodes.push(node);
    }
}
