//! SceneGraph - hecs world with stable ids, DAG parenting and typed nodes

use crate::component::{Node, NodeKind};
use crate::path::ComponentPath;
use bimap::BiMap;
use scenecheck_core::{mat4_mul, NodeId, Result, SceneCheckError, Transform};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Snapshot of a node's identity
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub key: String,
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
}

/// The scene being checked
///
/// Wraps hecs::World with:
/// - Stable NodeId mapping
/// - Key lookup (unique) and short/long name lookup (short names may repeat)
/// - Parent relationships forming the DAG used for long names
pub struct SceneGraph {
    /// The underlying hecs world
    world: hecs::World,
    /// Bidirectional mapping: NodeId <-> hecs::Entity
    id_map: BiMap<NodeId, hecs::Entity>,
    /// Node key -> NodeId mapping
    key_map: HashMap<String, NodeId>,
    /// Parent relationships: child -> parent
    parents: HashMap<NodeId, NodeId>,
    next_id: NodeId,
    name: String,
    source: Option<PathBuf>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a new empty, untitled scene
    pub fn new() -> Self {
        Self {
            world: hecs::World::new(),
            id_map: BiMap::new(),
            key_map: HashMap::new(),
            parents: HashMap::new(),
            next_id: NodeId::from_raw(1),
            name: String::new(),
            source: None,
        }
    }

    /// Scene display name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// File the scene was loaded from, if any
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn set_source_path(&mut self, path: impl Into<PathBuf>) {
        self.source = Some(path.into());
    }

    /// Directory relative paths inside the scene resolve against
    pub fn source_dir(&self) -> Option<&Path> {
        self.source.as_deref().and_then(Path::parent)
    }

    /// Spawn a node. Keys must be unique; short names need not be.
    pub fn spawn(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> Result<NodeId> {
        let key = key.into();

        if self.key_map.contains_key(&key) {
            return Err(SceneCheckError::DuplicateNodeKey(key));
        }

        let id = self.next_id;
        self.next_id = id.next();

        let node = Node {
            key: key.clone(),
            name: name.into(),
            kind,
        };
        let entity = if kind.is_transform() {
            self.world.spawn((node, Transform::IDENTITY))
        } else {
            self.world.spawn((node,))
        };

        self.id_map.insert(id, entity);
        self.key_map.insert(key, id);

        Ok(id)
    }

    /// Attach a typed component to a node, replacing any previous value
    pub fn insert<T: hecs::Component>(&mut self, id: NodeId, component: T) -> Result<()> {
        let entity = self.entity(id)?;
        self.world
            .insert_one(entity, component)
            .map_err(|_| SceneCheckError::NodeNotFound(id.to_string()))
    }

    /// Borrow a typed component
    pub fn get<T: hecs::Component>(&self, id: NodeId) -> Result<hecs::Ref<'_, T>> {
        let entity = self.entity(id)?;
        self.world
            .get::<&T>(entity)
            .map_err(|_| self.wrong_type::<T>(id))
    }

    /// Mutably borrow a typed component
    pub fn get_mut<T: hecs::Component>(&mut self, id: NodeId) -> Result<hecs::RefMut<'_, T>> {
        let entity = self.entity(id)?;
        self.world
            .get::<&mut T>(entity)
            .map_err(|_| self.wrong_type::<T>(id))
    }

    /// Set parent relationship, rejecting cycles
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        self.entity(child)?;
        self.entity(parent)?;

        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(SceneCheckError::SceneError(format!(
                    "parenting {} under {} would create a cycle",
                    child, parent
                )));
            }
            cursor = self.parents.get(&current).copied();
        }

        self.parents.insert(child, parent);
        Ok(())
    }

    /// Set parent by key
    pub fn set_parent_by_key(&mut self, child: &str, parent: &str) -> Result<()> {
        let child_id = self
            .get_id(child)
            .ok_or_else(|| SceneCheckError::NodeNotFound(child.to_string()))?;
        let parent_id = self
            .get_id(parent)
            .ok_or_else(|| SceneCheckError::NodeNotFound(parent.to_string()))?;

        self.set_parent(child_id, parent_id)
    }

    /// Get node id by key
    pub fn get_id(&self, key: &str) -> Option<NodeId> {
        self.key_map.get(key).copied()
    }

    pub fn parent(&self, child: NodeId) -> Option<NodeId> {
        self.parents.get(&child).copied()
    }

    /// Children in spawn order
    pub fn children(&self, parent: NodeId) -> Vec<NodeId> {
        let mut children: Vec<NodeId> = self
            .parents
            .iter()
            .filter(|(_, p)| **p == parent)
            .map(|(c, _)| *c)
            .collect();
        children.sort();
        children
    }

    /// Shape children of a given kind, in spawn order
    pub fn shapes(&self, parent: NodeId, kind: NodeKind) -> Vec<NodeId> {
        self.children(parent)
            .into_iter()
            .filter(|c| self.kind(*c) == Some(kind))
            .collect()
    }

    pub fn info(&self, id: NodeId) -> Option<NodeInfo> {
        let node = self.get::<Node>(id).ok()?;
        Some(NodeInfo {
            id,
            key: node.key.clone(),
            name: node.name.clone(),
            kind: node.kind,
            parent: self.parent(id),
        })
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get::<Node>(id).ok().map(|n| n.kind)
    }

    /// Short (leaf) name
    pub fn short_name(&self, id: NodeId) -> Result<String> {
        Ok(self.get::<Node>(id)?.name.clone())
    }

    /// Full DAG path such as `|grp|pCube1`. Non-DAG nodes use their short name.
    pub fn long_name(&self, id: NodeId) -> Result<String> {
        let node = self.get::<Node>(id)?;
        if !(node.kind.is_transform() || node.kind.is_shape()) {
            return Ok(node.name.clone());
        }
        drop(node);

        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            segments.push(self.short_name(current)?);
            cursor = self.parent(current);
        }
        segments.reverse();

        Ok(format!("|{}", segments.join("|")))
    }

    /// Look up a node by long name; bare short names match when unique
    pub fn find(&self, name: &str) -> Option<NodeId> {
        if name.starts_with('|') {
            return self
                .all_nodes()
                .into_iter()
                .find(|id| self.long_name(*id).ok().as_deref() == Some(name));
        }
        match self.find_by_short_name(name).as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Every node with this short name, in spawn order
    pub fn find_by_short_name(&self, name: &str) -> Vec<NodeId> {
        let mut found: Vec<NodeId> = self
            .world
            .query::<&Node>()
            .iter()
            .filter(|(_, node)| node.name == name)
            .filter_map(|(entity, _)| self.id_map.get_by_right(&entity).copied())
            .collect();
        found.sort();
        found
    }

    /// Every node of a kind, in spawn order
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        let mut found: Vec<NodeId> = self
            .world
            .query::<&Node>()
            .iter()
            .filter(|(_, node)| node.kind == kind)
            .filter_map(|(entity, _)| self.id_map.get_by_right(&entity).copied())
            .collect();
        found.sort();
        found
    }

    /// Every node, in spawn order
    pub fn all_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.id_map.left_values().copied().collect();
        ids.sort();
        ids
    }

    pub fn node_count(&self) -> usize {
        self.id_map.len()
    }

    /// Local transform of a transform or joint node
    pub fn transform(&self, id: NodeId) -> Result<Transform> {
        Ok(*self.get::<Transform>(id)?)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<()> {
        *self.get_mut::<Transform>(id)? = transform;
        Ok(())
    }

    /// World-space matrix, walking the parent chain
    pub fn world_matrix(&self, id: NodeId) -> Result<[[f64; 4]; 4]> {
        let local = self
            .get::<Transform>(id)
            .map(|t| t.to_matrix())
            .unwrap_or_else(|_| Transform::IDENTITY.to_matrix());
        match self.parent(id) {
            Some(parent) => Ok(mat4_mul(&self.world_matrix(parent)?, &local)),
            None => Ok(local),
        }
    }

    /// Resolve a component path to its mesh node.
    ///
    /// A transform path resolves to its first mesh shape.
    pub fn resolve_component(&self, path: &str) -> Result<(NodeId, ComponentPath)> {
        let parsed = ComponentPath::parse(path)?;
        let id = self
            .find(&parsed.node)
            .ok_or_else(|| SceneCheckError::NodeNotFound(parsed.node.clone()))?;

        let mesh = match self.kind(id) {
            Some(NodeKind::Mesh) => id,
            Some(kind) if kind.is_transform() => self
                .shapes(id, NodeKind::Mesh)
                .first()
                .copied()
                .ok_or_else(|| SceneCheckError::WrongNodeType {
                    node: parsed.node.clone(),
                    expected: NodeKind::Mesh.to_string(),
                })?,
            _ => {
                return Err(SceneCheckError::WrongNodeType {
                    node: parsed.node.clone(),
                    expected: NodeKind::Mesh.to_string(),
                })
            }
        };

        Ok((mesh, parsed))
    }

    fn entity(&self, id: NodeId) -> Result<hecs::Entity> {
        self.id_map
            .get_by_left(&id)
            .copied()
            .ok_or_else(|| SceneCheckError::NodeNotFound(id.to_string()))
    }

    fn wrong_type<T>(&self, id: NodeId) -> SceneCheckError {
        let expected = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or("component")
            .to_string();
        let node = self
            .entity(id)
            .ok()
            .and_then(|entity| self.world.get::<&Node>(entity).ok().map(|n| n.key.clone()))
            .unwrap_or_else(|| id.to_string());
        SceneCheckError::WrongNodeType { node, expected }
    }
}
