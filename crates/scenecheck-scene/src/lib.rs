//! Scenecheck Scene - the scene graph that rules inspect
//!
//! This crate wraps hecs with stable node identifiers, DAG parenting and
//! typed node components, and handles loading and saving scenes in TOML.

mod component;
mod diff;
mod format;
mod graph;
mod loader;
mod mesh;
mod path;
mod saver;

pub use component::{AnimCurve, FileTexture, Joint, Material, Node, NodeKind, SkinCluster};
pub use diff::diff_scene_text;
pub use format::{NodeData, NodeDef, SceneFile, SceneMetadata};
pub use graph::{NodeInfo, SceneGraph};
pub use loader::{load_scene, load_scene_string};
pub use mesh::{Mesh, MeshError, ZERO_TOLERANCE};
pub use path::{ComponentKind, ComponentPath};
pub use saver::{save_scene, save_scene_string, graph_to_scene_file};
