//! Polygon mesh component and its topology queries and edits

use scenecheck_core::{transform_point, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Lengths, areas and weights below this are treated as zero
pub const ZERO_TOLERANCE: f64 = 1e-4;

/// Structural problems found while querying a mesh
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("face {0} does not exist")]
    MissingFace(usize),

    #[error("face {face} references vertex {vertex} but the mesh has {count} points")]
    VertexOutOfRange {
        face: usize,
        vertex: usize,
        count: usize,
    },

    #[error("face {0} has fewer than 3 vertices")]
    DegenerateFace(usize),

    #[error("vertex {0} does not exist")]
    MissingVertex(usize),
}

/// A polygon mesh: points, faces as vertex index loops, and UVs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    #[serde(default)]
    pub points: Vec<Vec3>,
    #[serde(default)]
    pub faces: Vec<Vec<usize>>,
    #[serde(default)]
    pub uv_sets: Vec<String>,
    #[serde(default)]
    pub uvs: Vec<[f64; 2]>,
}

impl Mesh {
    pub fn new(points: Vec<Vec3>, faces: Vec<Vec<usize>>) -> Self {
        Self {
            points,
            faces,
            uv_sets: Vec::new(),
            uvs: Vec::new(),
        }
    }

    pub fn with_uvs(mut self, set: impl Into<String>, uvs: Vec<[f64; 2]>) -> Self {
        self.uv_sets.push(set.into());
        self.uvs = uvs;
        self
    }

    /// Vertex loop of a face, checked against the point list
    pub fn face_vertices(&self, face: usize) -> Result<&[usize], MeshError> {
        let verts = self.faces.get(face).ok_or(MeshError::MissingFace(face))?;
        if verts.len() < 3 {
            return Err(MeshError::DegenerateFace(face));
        }
        if let Some(&vertex) = verts.iter().find(|&&v| v >= self.points.len()) {
            return Err(MeshError::VertexOutOfRange {
                face,
                vertex,
                count: self.points.len(),
            });
        }
        Ok(verts)
    }

    /// Check every face references valid points
    pub fn validate(&self) -> Result<(), MeshError> {
        for face in 0..self.faces.len() {
            self.face_vertices(face)?;
        }
        Ok(())
    }

    /// Face area from the Newell normal
    pub fn face_area(&self, face: usize) -> Result<f64, MeshError> {
        let verts = self.face_vertices(face)?;
        let mut normal = Vec3::ZERO;
        for (i, &a) in verts.iter().enumerate() {
            let b = verts[(i + 1) % verts.len()];
            normal = normal + self.points[a].cross(&self.points[b]);
        }
        Ok(normal.length() * 0.5)
    }

    /// Unique edges in order of first appearance while walking the faces.
    ///
    /// Edge `i` of this list is what `.e[i]` component paths refer to.
    /// Out-of-range vertex references are ignored here; `validate` reports them.
    pub fn edges(&self) -> Vec<[usize; 2]> {
        let mut seen = BTreeSet::new();
        let mut edges = Vec::new();
        for verts in &self.faces {
            for (i, &a) in verts.iter().enumerate() {
                let b = verts[(i + 1) % verts.len()];
                if a == b || a >= self.points.len() || b >= self.points.len() {
                    continue;
                }
                if seen.insert(edge_key(a, b)) {
                    edges.push([a, b]);
                }
            }
        }
        edges
    }

    pub fn edge_length(&self, edge: [usize; 2]) -> Result<f64, MeshError> {
        let a = self.points.get(edge[0]).ok_or(MeshError::MissingVertex(edge[0]))?;
        let b = self.points.get(edge[1]).ok_or(MeshError::MissingVertex(edge[1]))?;
        Ok(a.distance(b))
    }

    /// Faces with more than four sides
    pub fn ngons(&self) -> Vec<usize> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, verts)| verts.len() > 4)
            .map(|(i, _)| i)
            .collect()
    }

    /// Vertices whose surrounding faces do not form a single fan, plus both
    /// ends of any edge shared by more than two faces.
    pub fn non_manifold_vertices(&self) -> Result<Vec<usize>, MeshError> {
        self.validate()?;

        let edge_faces = self.edge_faces();
        let mut bad = BTreeSet::new();

        for (&[a, b], faces) in &edge_faces {
            if faces.len() > 2 {
                bad.insert(a);
                bad.insert(b);
            }
        }

        let mut vertex_faces: Vec<Vec<usize>> = vec![Vec::new(); self.points.len()];
        for (f, verts) in self.faces.iter().enumerate() {
            for &v in verts {
                if !vertex_faces[v].contains(&f) {
                    vertex_faces[v].push(f);
                }
            }
        }

        for (v, fan) in vertex_faces.iter().enumerate() {
            if fan.len() < 2 || bad.contains(&v) {
                continue;
            }
            let local: HashMap<usize, usize> =
                fan.iter().enumerate().map(|(i, &f)| (f, i)).collect();
            let mut sets = DisjointSet::new(fan.len());

            for &f in fan {
                for w in self.neighbours_in_face(f, v) {
                    if let Some(shared) = edge_faces.get(&edge_key(v, w)) {
                        for g in shared {
                            if let Some(&j) = local.get(g) {
                                sets.union(local[&f], j);
                            }
                        }
                    }
                }
            }

            if sets.count() > 1 {
                bad.insert(v);
            }
        }

        Ok(bad.into_iter().collect())
    }

    /// Faces that share their full vertex set with another face
    pub fn lamina_faces(&self) -> Result<Vec<usize>, MeshError> {
        self.validate()?;

        let mut groups: HashMap<Vec<usize>, Vec<usize>> = HashMap::new();
        for (f, verts) in self.faces.iter().enumerate() {
            let mut key = verts.clone();
            key.sort_unstable();
            key.dedup();
            groups.entry(key).or_default().push(f);
        }

        let mut lamina: Vec<usize> = groups
            .into_values()
            .filter(|faces| faces.len() > 1)
            .flatten()
            .collect();
        lamina.sort_unstable();
        Ok(lamina)
    }

    /// Remove the given faces. Returns how many were removed.
    pub fn delete_faces(&mut self, faces: &BTreeSet<usize>) -> usize {
        let before = self.faces.len();
        let mut index = 0;
        self.faces.retain(|_| {
            let keep = !faces.contains(&index);
            index += 1;
            keep
        });
        before - self.faces.len()
    }

    /// Collapse `remove` into `keep`, placing the result at their midpoint.
    ///
    /// Faces that drop below three distinct vertices are removed. The orphaned
    /// point stays in the point list so other vertex indices remain stable.
    pub fn merge_vertices(&mut self, keep: usize, remove: usize) -> Result<(), MeshError> {
        let a = *self.points.get(keep).ok_or(MeshError::MissingVertex(keep))?;
        let b = *self.points.get(remove).ok_or(MeshError::MissingVertex(remove))?;
        if keep == remove {
            return Ok(());
        }
        self.points[keep] = (a + b) * 0.5;

        for verts in &mut self.faces {
            for v in verts.iter_mut() {
                if *v == remove {
                    *v = keep;
                }
            }
            verts.dedup();
            while verts.len() > 1 && verts.first() == verts.last() {
                verts.pop();
            }
        }
        self.faces.retain(|verts| verts.len() >= 3);
        Ok(())
    }

    /// Fan-triangulate the given faces in place. Returns how many were split.
    pub fn triangulate_faces(&mut self, faces: &BTreeSet<usize>) -> usize {
        let mut split = 0;
        let mut result = Vec::with_capacity(self.faces.len());
        for (f, verts) in self.faces.drain(..).enumerate() {
            if faces.contains(&f) && verts.len() > 3 {
                for i in 1..verts.len() - 1 {
                    result.push(vec![verts[0], verts[i], verts[i + 1]]);
                }
                split += 1;
            } else {
                result.push(verts);
            }
        }
        self.faces = result;
        split
    }

    /// Reverse every face's winding, flipping its normal
    pub fn reverse_normals(&mut self) {
        for verts in &mut self.faces {
            verts.reverse();
        }
    }

    /// Bake a matrix into the points
    pub fn apply_matrix(&mut self, matrix: &[[f64; 4]; 4]) {
        for p in &mut self.points {
            *p = transform_point(matrix, *p);
        }
    }

    fn edge_faces(&self) -> HashMap<[usize; 2], Vec<usize>> {
        let mut map: HashMap<[usize; 2], Vec<usize>> = HashMap::new();
        for (f, verts) in self.faces.iter().enumerate() {
            for (i, &a) in verts.iter().enumerate() {
                let b = verts[(i + 1) % verts.len()];
                if a == b {
                    continue;
                }
                let faces = map.entry(edge_key(a, b)).or_default();
                if !faces.contains(&f) {
                    faces.push(f);
                }
            }
        }
        map
    }

    fn neighbours_in_face(&self, face: usize, vertex: usize) -> Vec<usize> {
        let verts = &self.faces[face];
        let n = verts.len();
        let mut out = Vec::new();
        for (i, &v) in verts.iter().enumerate() {
            if v == vertex {
                out.push(verts[(i + n - 1) % n]);
                out.push(verts[(i + 1) % n]);
            }
        }
        out.retain(|&w| w != vertex);
        out
    }
}

fn edge_key(a: usize, b: usize) -> [usize; 2] {
    if a < b {
        [a, b]
    } else {
        [b, a]
    }
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }

    fn count(&mut self) -> usize {
        (0..self.parent.len()).filter(|&i| self.find(i) == i).count()
    }
}
