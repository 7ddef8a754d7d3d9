//! Typed node components stored in the scene graph

use scenecheck_core::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Transform,
    Mesh,
    Camera,
    Joint,
    File,
    Material,
    SkinCluster,
    AnimCurve,
}

impl NodeKind {
    /// Shape kinds live under a transform and carry no transform of their own
    pub fn is_shape(&self) -> bool {
        matches!(self, NodeKind::Mesh | NodeKind::Camera)
    }

    /// DAG kinds carry a `Transform` component
    pub fn is_transform(&self) -> bool {
        matches!(self, NodeKind::Transform | NodeKind::Joint)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Transform => "transform",
            NodeKind::Mesh => "mesh",
            NodeKind::Camera => "camera",
            NodeKind::Joint => "joint",
            NodeKind::File => "file",
            NodeKind::Material => "material",
            NodeKind::SkinCluster => "skin_cluster",
            NodeKind::AnimCurve => "anim_curve",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity component present on every node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique key within the scene file
    pub key: String,
    /// Short (leaf) name; may repeat under different parents
    pub name: String,
    pub kind: NodeKind,
}

/// Joint-specific data; the joint's local transform is a separate `Transform`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    /// Joint orient in degrees
    #[serde(default)]
    pub orient: Vec3,
}

/// A file texture node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileTexture {
    /// Texture path as authored; may contain `<UDIM>`-style sequence tokens
    #[serde(default)]
    pub path: String,
}

impl FileTexture {
    pub fn is_sequence(&self) -> bool {
        self.path.contains('<')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(default = "default_shading_model")]
    pub model: String,
}

fn default_shading_model() -> String {
    "lambert".to_string()
}

/// Skin binding between a mesh and a set of influence nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinCluster {
    /// Key of the bound mesh node
    pub geometry: String,
    /// Influence node names, one per weight column
    #[serde(default)]
    pub influences: Vec<String>,
    /// One row per mesh vertex, one column per influence
    #[serde(default)]
    pub weights: Vec<Vec<f64>>,
}

impl SkinCluster {
    /// Total weight on a vertex, or `None` when the vertex has no weight row
    pub fn vertex_total(&self, vertex: usize) -> Option<f64> {
        self.weights.get(vertex).map(|row| row.iter().sum())
    }

    /// Total weight an influence carries across every vertex
    pub fn influence_total(&self, influence: usize) -> Option<f64> {
        if influence >= self.influences.len() {
            return None;
        }
        Some(
            self.weights
                .iter()
                .filter_map(|row| row.get(influence))
                .sum(),
        )
    }

    /// Remove an influence and its weight column. Returns false if absent.
    pub fn remove_influence(&mut self, name: &str) -> bool {
        let Some(index) = self.influences.iter().position(|i| i == name) else {
            return false;
        };
        self.influences.remove(index);
        for row in &mut self.weights {
            if index < row.len() {
                row.remove(index);
            }
        }
        true
    }
}

/// An animation curve: `[time, value]` keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimCurve {
    #[serde(default)]
    pub keys: Vec<[f64; 2]>,
}

impl AnimCurve {
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skin() -> SkinCluster {
        SkinCluster {
            geometry: "bodyShape".to_string(),
            influences: vec!["hip".to_string(), "knee".to_string(), "toe".to_string()],
            weights: vec![vec![1.0, 0.0, 0.0], vec![0.5, 0.5, 0.0], vec![0.0, 0.0, 0.0]],
        }
    }

    #[test]
    fn test_weight_totals() {
        let s = skin();
        assert_eq!(s.vertex_total(1), Some(1.0));
        assert_eq!(s.vertex_total(2), Some(0.0));
        assert_eq!(s.vertex_total(9), None);
        assert_eq!(s.influence_total(0), Some(1.5));
        assert_eq!(s.influence_total(2), Some(0.0));
        assert_eq!(s.influence_total(3), None);
    }

    #[test]
    fn test_remove_influence_drops_column() {
        let mut s = skin();
        assert!(s.remove_influence("knee"));
        assert_eq!(s.influences, vec!["hip".to_string(), "toe".to_string()]);
        assert_eq!(s.weights[1], vec![0.5, 0.0]);
        assert!(!s.remove_influence("knee"));
    }

    #[test]
    fn test_node_kind_classes() {
        assert!(NodeKind::Mesh.is_shape());
        assert!(NodeKind::Joint.is_transform());
        assert!(!NodeKind::File.is_shape());
        assert_eq!(NodeKind::SkinCluster.to_string(), "skin_cluster");
    }
}
