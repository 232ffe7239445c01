//! Mesh construction utilities.
//!
//! [`MeshBuilder`] stitches a polygon soup into a [`HalfEdgeMesh`] one face at
//! a time. Callers address vertices by their own raw indices, which may be
//! sparse and arrive in any order; [`MeshBuilder::init_ids`] compacts them
//! into dense ids afterwards.
//!
//! ```
//! use meshdiv::mesh::{HalfEdgeMesh, MeshBuilder};
//! use nalgebra::Point3;
//!
//! let mut builder: MeshBuilder = MeshBuilder::new();
//! builder.add_face(&[0, 1, 2], None, None).unwrap();
//! builder.set_point(0, Point3::new(0.0, 0.0, 0.0));
//! builder.set_point(1, Point3::new(1.0, 0.0, 0.0));
//! builder.set_point(2, Point3::new(0.0, 1.0, 0.0));
//!
//! let mesh: HalfEdgeMesh = builder.finish();
//! assert_eq!(mesh.num_faces(), 1);
//! assert_eq!(mesh.num_edges(), 3);
//! ```

use std::collections::HashMap;

use nalgebra::{Point3, Vector2, Vector3};

use super::halfedge::{Edge, Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{ensure_fits, EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{MeshError, Result};

/// Incremental half-edge mesh construction.
#[derive(Debug, Clone)]
pub struct MeshBuilder<I: MeshIndex = u32> {
    mesh: HalfEdgeMesh<I>,
    /// Raw caller index -> vertex id (null where never used).
    slots: Vec<VertexId<I>>,
    /// Vertex id -> raw caller index.
    raw: Vec<usize>,
    /// Oriented raw pair (tail, head) -> half-edge.
    halfedge_map: HashMap<(usize, usize), HalfEdgeId<I>>,
    /// Canonical raw pair (min, max) -> edge.
    edge_map: HashMap<(usize, usize), EdgeId<I>>,
}

impl<I: MeshIndex> Default for MeshBuilder<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> MeshBuilder<I> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            mesh: HalfEdgeMesh::new(),
            slots: Vec::new(),
            raw: Vec::new(),
            halfedge_map: HashMap::new(),
            edge_map: HashMap::new(),
        }
    }

    /// Create a builder with room for the given element counts.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // Closed triangle meshes have E = 3F/2; polygons only need fewer.
        let num_edges = num_faces * 3 / 2 + 3;
        Self {
            mesh: HalfEdgeMesh::with_capacity(num_vertices, num_edges, num_faces),
            slots: Vec::with_capacity(num_vertices),
            raw: Vec::with_capacity(num_vertices),
            halfedge_map: HashMap::with_capacity(num_edges * 2),
            edge_map: HashMap::with_capacity(num_edges),
        }
    }

    /// Number of vertices created so far.
    pub fn num_vertices(&self) -> usize {
        self.mesh.num_vertices()
    }

    /// Number of faces added so far.
    pub fn num_faces(&self) -> usize {
        self.mesh.num_faces()
    }

    /// Number of undirected edges created so far.
    pub fn num_edges(&self) -> usize {
        self.mesh.num_edges()
    }

    /// Number of half-edges created so far.
    pub fn num_halfedges(&self) -> usize {
        self.mesh.num_halfedges()
    }

    /// Current id of the vertex with the given raw index.
    pub fn vertex_id(&self, raw: usize) -> Option<VertexId<I>> {
        self.slots.get(raw).and_then(|id| id.valid())
    }

    /// Add a polygon given by raw vertex indices.
    ///
    /// Optional per-corner normals and texture coordinates are stored on the
    /// half-edge leaving each corner, i.e. `normals[k]` lands on the half-edge
    /// from `indices[k]` to `indices[k + 1]`.
    ///
    /// # Errors
    ///
    /// - [`MeshError::DegenerateFace`] for fewer than three corners or a
    ///   repeated vertex
    /// - [`MeshError::SizeMismatch`] if an attribute list has the wrong length
    /// - [`MeshError::NonManifoldEdge`] if an oriented edge of the face is
    ///   already used by another face
    /// - [`MeshError::IndexOverflow`] if the new elements cannot be addressed
    ///   by `I`
    ///
    /// The builder is untouched when an error is returned.
    pub fn add_face(
        &mut self,
        indices: &[usize],
        normals: Option<&[Vector3<f64>]>,
        texcoords: Option<&[Vector2<f64>]>,
    ) -> Result<FaceId<I>> {
        let n = indices.len();
        let face_index = self.mesh.num_faces();

        if n < 3 {
            return Err(MeshError::DegenerateFace {
                face: face_index,
                reason: "fewer than three corners",
            });
        }
        if let Some(normals) = normals {
            if normals.len() != n {
                return Err(MeshError::SizeMismatch {
                    attribute: "normals",
                    expected: n,
                    found: normals.len(),
                });
            }
        }
        if let Some(texcoords) = texcoords {
            if texcoords.len() != n {
                return Err(MeshError::SizeMismatch {
                    attribute: "texcoords",
                    expected: n,
                    found: texcoords.len(),
                });
            }
        }
        for (k, &i) in indices.iter().enumerate() {
            if indices[k + 1..].contains(&i) {
                return Err(MeshError::DegenerateFace {
                    face: face_index,
                    reason: "repeated vertex",
                });
            }
        }
        for k in 0..n {
            let (i, j) = (indices[k], indices[(k + 1) % n]);
            if let Some(&he) = self.halfedge_map.get(&(i, j)) {
                if !self.mesh.is_boundary_halfedge(he) {
                    return Err(MeshError::NonManifoldEdge { v0: i, v1: j });
                }
            }
        }

        let new_vertices = indices
            .iter()
            .filter(|&&i| self.slots.get(i).and_then(|v| v.valid()).is_none())
            .count();
        let new_edges = (0..n)
            .filter(|&k| !self.halfedge_map.contains_key(&(indices[k], indices[(k + 1) % n])))
            .count();
        ensure_fits::<I>("vertices", self.mesh.vertices.len() + new_vertices)?;
        ensure_fits::<I>("half-edges", self.mesh.halfedges.len() + 2 * new_edges)?;
        ensure_fits::<I>("faces", face_index + 1)?;

        // Nothing below can fail.
        let face = FaceId::<I>::new(face_index);
        self.mesh.faces.push(Face::new(HalfEdgeId::invalid()));

        let mut corner_halfedges = Vec::with_capacity(n);
        for k in 0..n {
            let (i, j) = (indices[k], indices[(k + 1) % n]);
            let vi = self.ensure_vertex(i);
            let vj = self.ensure_vertex(j);
            let (hij, hji) = self.ensure_edge(i, vi, j, vj);

            self.mesh.vertex_mut(vi).halfedge = hij;
            self.mesh.vertex_mut(vj).halfedge = hji;
            self.mesh.halfedge_mut(hij).face = face;
            corner_halfedges.push(hij);
        }

        for k in 0..n {
            let h01 = corner_halfedges[k];
            let h12 = corner_halfedges[(k + 1) % n];
            self.mesh.halfedge_mut(h01).next = h12;
            self.mesh.halfedge_mut(h12).prev = h01;

            let he = self.mesh.halfedge_mut(h01);
            he.normal = normals.map(|normals| normals[k]);
            he.texcoord = texcoords.map(|texcoords| texcoords[k]);
        }

        // Anchor on the half-edge arriving at the first corner so that the
        // face's vertex cycle starts with `indices[0]`.
        self.mesh.face_mut(face).halfedge = corner_halfedges[n - 1];

        Ok(face)
    }

    /// Set the position of the vertex with the given raw index, creating an
    /// isolated vertex if the index is new.
    ///
    /// The number of distinct raw indices must stay within
    /// [`MeshIndex::max_count`].
    pub fn set_point(&mut self, raw: usize, point: Point3<f64>) -> VertexId<I> {
        let v = self.ensure_vertex(raw);
        self.mesh.set_point(v, point);
        v
    }

    /// Compact vertex ids into `0..n` following raw index order.
    ///
    /// Faces, edges and half-edges already carry dense ids in creation order,
    /// which is stable for a given input.
    pub fn init_ids(&mut self) {
        let mut order: Vec<usize> = (0..self.raw.len()).collect();
        order.sort_unstable_by_key(|&id| self.raw[id]);
        if order.iter().enumerate().all(|(new, &old)| new == old) {
            return;
        }

        let mut remap = vec![VertexId::<I>::invalid(); order.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old] = VertexId::new(new);
        }

        let mut vertices = Vec::with_capacity(order.len());
        let mut raw = Vec::with_capacity(order.len());
        for &old in &order {
            vertices.push(self.mesh.vertices[old].clone());
            raw.push(self.raw[old]);
        }
        self.mesh.vertices = vertices;
        self.raw = raw;

        for he in &mut self.mesh.halfedges {
            he.vertex = remap[he.vertex.index()];
        }
        for slot in &mut self.slots {
            if slot.is_valid() {
                *slot = remap[slot.index()];
            }
        }
    }

    /// Anchor boundary vertices on their outgoing boundary half-edge and link
    /// boundary half-edges into closed loops.
    ///
    /// Must run after the last [`add_face`](Self::add_face) and before any
    /// traversal of the mesh.
    pub fn init_boundaries(&mut self) {
        let boundary: Vec<HalfEdgeId<I>> = self
            .mesh
            .halfedge_ids()
            .filter(|&he| self.mesh.is_boundary_halfedge(he))
            .collect();

        for &he in &boundary {
            let tail = self.mesh.from_vertex(he);
            self.mesh.vertex_mut(tail).halfedge = he;
        }
        for &he in &boundary {
            let head = self.mesh.to_vertex(he);
            let next = self.mesh.vertex(head).halfedge;
            self.mesh.halfedge_mut(he).next = next;
            self.mesh.halfedge_mut(next).prev = he;
        }
    }

    /// Finalize ids and boundaries and return the mesh.
    pub fn finish(mut self) -> HalfEdgeMesh<I> {
        self.init_ids();
        self.init_boundaries();
        self.mesh
    }

    fn ensure_vertex(&mut self, raw: usize) -> VertexId<I> {
        if raw >= self.slots.len() {
            self.slots.resize(raw + 1, VertexId::invalid());
        }
        if let Some(v) = self.slots[raw].valid() {
            return v;
        }
        let v = VertexId::new(self.mesh.vertices.len());
        self.mesh.vertices.push(Vertex::new(Point3::origin()));
        self.slots[raw] = v;
        self.raw.push(raw);
        v
    }

    /// Return the half-edges i -> j and j -> i, creating the edge the first
    /// time the pair is seen.
    fn ensure_edge(
        &mut self,
        i: usize,
        vi: VertexId<I>,
        j: usize,
        vj: VertexId<I>,
    ) -> (HalfEdgeId<I>, HalfEdgeId<I>) {
        if let Some(&edge) = self.edge_map.get(&(i.min(j), i.max(j))) {
            let he = self.mesh.edge(edge).halfedge;
            let twin = self.mesh.opposite(he);
            return if self.mesh.to_vertex(he) == vj {
                (he, twin)
            } else {
                (twin, he)
            };
        }

        let edge = EdgeId::<I>::new(self.mesh.edges.len());
        let hij = HalfEdgeId::<I>::new(self.mesh.halfedges.len());
        let hji = HalfEdgeId::<I>::new(self.mesh.halfedges.len() + 1);

        self.mesh.halfedges.push(HalfEdge {
            vertex: vj,
            edge,
            opposite: hji,
            ..HalfEdge::new()
        });
        self.mesh.halfedges.push(HalfEdge {
            vertex: vi,
            edge,
            opposite: hij,
            ..HalfEdge::new()
        });
        self.mesh.edges.push(Edge { halfedge: hij });

        self.halfedge_map.insert((i, j), hij);
        self.halfedge_map.insert((j, i), hji);
        self.edge_map.insert((i.min(j), i.max(j)), edge);

        (hij, hji)
    }
}

/// Build a half-edge mesh from positions and polygons of any degree.
///
/// Unlike file readers, which skip bad faces, this fails on the first face
/// the builder rejects.
///
/// # Example
/// ```
/// use meshdiv::mesh::{build_from_polygons, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.5, 2.0, 0.0),
/// ];
/// let faces = vec![vec![0, 1, 2, 3], vec![3, 2, 4]];
///
/// let mesh: HalfEdgeMesh = build_from_polygons(&points, &faces).unwrap();
/// assert_eq!(mesh.num_faces(), 2);
/// assert_eq!(mesh.num_edges(), 6);
/// ```
pub fn build_from_polygons<I: MeshIndex, F: AsRef<[usize]>>(
    points: &[Point3<f64>],
    faces: &[F],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.as_ref().iter().find(|&&vi| vi >= points.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
    }

    let mut builder = MeshBuilder::with_capacity(points.len(), faces.len());
    for face in faces {
        builder.add_face(face.as_ref(), None, None)?;
    }
    for (i, &p) in points.iter().enumerate() {
        builder.set_point(i, p);
    }

    Ok(builder.finish())
}

/// Build a half-edge mesh from triangles.
pub fn build_from_triangles<I: MeshIndex>(
    points: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(points, faces)
}

/// Build a half-edge mesh from quads.
pub fn build_from_quads<I: MeshIndex>(
    points: &[Point3<f64>],
    faces: &[[usize; 4]],
) -> Result<HalfEdgeMesh<I>> {
    build_from_polygons(points, faces)
}

/// Convert a half-edge mesh back to positions and per-face vertex cycles.
pub fn to_face_vertex<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
) -> (Vec<Point3<f64>>, Vec<Vec<usize>>) {
    let points = mesh.vertex_ids().map(|v| *mesh.point(v)).collect();
    let faces = mesh
        .face_ids()
        .map(|f| mesh.face_vertices(f).map(|v| v.index()).collect())
        .collect();
    (points, faces)
}
