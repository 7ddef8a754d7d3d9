//! Component paths such as `|grp|pCube1|pCubeShape1.f[3]`

use scenecheck_core::{Result, SceneCheckError};
use std::fmt;

/// The kind of mesh component a path addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Vertex,
    Edge,
    Face,
    Uv,
}

impl ComponentKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            ComponentKind::Vertex => "vtx",
            ComponentKind::Edge => "e",
            ComponentKind::Face => "f",
            ComponentKind::Uv => "map",
        }
    }

    fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "vtx" => Some(ComponentKind::Vertex),
            "e" => Some(ComponentKind::Edge),
            "f" => Some(ComponentKind::Face),
            "map" => Some(ComponentKind::Uv),
            _ => None,
        }
    }
}

/// A parsed reference to one mesh component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentPath {
    /// Long name of the node the component belongs to
    pub node: String,
    pub kind: ComponentKind,
    pub index: usize,
}

impl ComponentPath {
    pub fn new(node: impl Into<String>, kind: ComponentKind, index: usize) -> Self {
        Self {
            node: node.into(),
            kind,
            index,
        }
    }

    /// Parse `node.kind[index]`. The node part may itself contain dots.
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = || SceneCheckError::InvalidComponentPath(path.to_string());

        let body = path.strip_suffix(']').ok_or_else(invalid)?;
        let (head, index) = body.rsplit_once('[').ok_or_else(invalid)?;
        let (node, suffix) = head.rsplit_once('.').ok_or_else(invalid)?;
        let kind = ComponentKind::from_suffix(suffix).ok_or_else(invalid)?;
        let index = index.parse::<usize>().map_err(|_| invalid())?;

        if node.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(node, kind, index))
    }
}

impl fmt::Display for ComponentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}[{}]", self.node, self.kind.suffix(), self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_face_path() {
        let path = ComponentPath::parse("|grp|pCube1|pCubeShape1.f[3]").unwrap();
        assert_eq!(path.node, "|grp|pCube1|pCubeShape1");
        assert_eq!(path.kind, ComponentKind::Face);
        assert_eq!(path.index, 3);
    }

    #[test]
    fn test_parse_node_with_dot_in_name() {
        let path = ComponentPath::parse("|bad.name.e[12]").unwrap();
        assert_eq!(path.node, "|bad.name");
        assert_eq!(path.kind, ComponentKind::Edge);
        assert_eq!(path.index, 12);
    }

    #[test]
    fn test_display_matches_parse() {
        let path = ComponentPath::new("|mesh", ComponentKind::Vertex, 7);
        assert_eq!(path.to_string(), "|mesh.vtx[7]");
        assert_eq!(ComponentPath::parse(&path.to_string()).unwrap(), path);
    }

    #[test]
    fn test_rejects_malformed_paths() {
        for bad in ["|mesh", "|mesh.f[x]", "|mesh.q[1]", ".f[1]", "|mesh.f[1"] {
            assert!(
                matches!(
                    ComponentPath::parse(bad),
                    Err(SceneCheckError::InvalidComponentPath(_))
                ),
                "expected {bad} to be rejected"
            );
        }
    }
}
