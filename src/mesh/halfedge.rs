//! Half-edge mesh data structure.
//!
//! A [`HalfEdgeMesh`] stores polygons of arbitrary degree as a doubly-connected
//! edge list kept in four flat arenas (vertices, half-edges, edges, faces).
//! Entities refer to each other by typed ids instead of references, so the
//! whole topology is a plain value that can be cloned or moved freely.
//!
//! # Conventions
//!
//! - A half-edge stores its **head**: [`HalfEdge::vertex`] is the vertex it
//!   points to. Its tail is the head of its opposite ([`HalfEdgeMesh::from_vertex`]).
//! - A vertex stores one **outgoing** half-edge. Walking `opposite.next` from it
//!   visits every outgoing half-edge once.
//! - Every undirected [`Edge`] owns exactly two half-edges. On a boundary the
//!   outer one has no face, and boundary half-edges are linked through
//!   `next`/`prev` into closed loops, so traversal code never has to special-case
//!   them.
//! - A boundary vertex's representative half-edge is always its outgoing
//!   boundary half-edge.
//!
//! Meshes are produced by [`MeshBuilder`](super::MeshBuilder) (or the I/O and
//! subdivision code on top of it) and are read-only afterwards, apart from
//! vertex positions and normals.

use nalgebra::{Point3, Vector2, Vector3};

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub point: Point3<f64>,

    /// Per-vertex normal, set by [`compute_normals`](crate::algo::normals::compute_normals).
    pub normal: Option<Vector3<f64>>,

    /// One outgoing half-edge. Null for isolated vertices.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create an isolated vertex at the given position.
    pub fn new(point: Point3<f64>) -> Self {
        Self {
            point,
            normal: None,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// A directed half-edge.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this half-edge points to (its head).
    pub vertex: VertexId<I>,

    /// The face on the left of this half-edge. Null on the boundary.
    pub face: FaceId<I>,

    /// The undirected edge this half-edge is one side of.
    pub edge: EdgeId<I>,

    /// Next half-edge around the face or boundary loop.
    pub next: HalfEdgeId<I>,

    /// Previous half-edge around the face or boundary loop.
    pub prev: HalfEdgeId<I>,

    /// The twin half-edge pointing the other way.
    pub opposite: HalfEdgeId<I>,

    /// Normal of the corner at this half-edge's tail, when the input supplied one.
    pub normal: Option<Vector3<f64>>,

    /// Texture coordinate of the corner at this half-edge's tail.
    pub texcoord: Option<Vector2<f64>>,
}

impl<I: MeshIndex> HalfEdge<I> {
    /// Create an unlinked half-edge.
    pub fn new() -> Self {
        Self {
            vertex: VertexId::invalid(),
            face: FaceId::invalid(),
            edge: EdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            opposite: HalfEdgeId::invalid(),
            normal: None,
            texcoord: None,
        }
    }

    /// A half-edge is on the boundary when it has no face.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

impl<I: MeshIndex> Default for HalfEdge<I> {
    fn default() -> Self {
        Self::new()
    }
}

/// An undirected edge.
#[derive(Debug, Clone, Copy)]
pub struct Edge<I: MeshIndex = u32> {
    /// One of the two half-edges; the other is its opposite.
    pub halfedge: HalfEdgeId<I>,
}

/// A polygonal face.
#[derive(Debug, Clone, Copy)]
pub struct Face<I: MeshIndex = u32> {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId<I>,

    /// Unit face normal, set by [`compute_normals`](crate::algo::normals::compute_normals).
    pub normal: Option<Vector3<f64>>,
}

impl<I: MeshIndex> Face<I> {
    /// Create a face anchored at the given half-edge.
    pub fn new(halfedge: HalfEdgeId<I>) -> Self {
        Self {
            halfedge,
            normal: None,
        }
    }
}

/// A polygon mesh stored as a half-edge graph.
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) edges: Vec<Edge<I>>,
    pub(crate) faces: Vec<Face<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create an empty mesh with room for the given element counts.
    pub fn with_capacity(num_vertices: usize, num_edges: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_edges * 2),
            edges: Vec::with_capacity(num_edges),
            faces: Vec::with_capacity(num_faces),
        }
    }

    // ==================== Accessors ====================

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of half-edges, boundary half-edges included.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by id.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by id.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    #[inline]
    pub(crate) fn halfedge_mut(&mut self, id: HalfEdgeId<I>) -> &mut HalfEdge<I> {
        &mut self.halfedges[id.index()]
    }

    /// Get an edge by id.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        &self.edges[id.index()]
    }

    /// Get a face by id.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    #[inline]
    pub(crate) fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[id.index()]
    }

    /// Position of a vertex.
    #[inline]
    pub fn point(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertex(v).point
    }

    /// Move a vertex. Topology is unaffected; stored normals become stale.
    #[inline]
    pub fn set_point(&mut self, v: VertexId<I>, point: Point3<f64>) {
        self.vertex_mut(v).point = point;
    }

    // ==================== Half-edge navigation ====================

    /// Next half-edge around the face or boundary loop.
    #[inline]
    pub fn next(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).next
    }

    /// Previous half-edge around the face or boundary loop.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).prev
    }

    /// The twin half-edge.
    #[inline]
    pub fn opposite(&self, he: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.halfedge(he).opposite
    }

    /// Head vertex of a half-edge.
    #[inline]
    pub fn to_vertex(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.halfedge(he).vertex
    }

    /// Tail vertex of a half-edge.
    #[inline]
    pub fn from_vertex(&self, he: HalfEdgeId<I>) -> VertexId<I> {
        self.to_vertex(self.opposite(he))
    }

    /// Face of a half-edge (null on the boundary).
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId<I>) -> FaceId<I> {
        self.halfedge(he).face
    }

    /// Undirected edge of a half-edge.
    #[inline]
    pub fn edge_of(&self, he: HalfEdgeId<I>) -> EdgeId<I> {
        self.halfedge(he).edge
    }

    /// Whether a half-edge has no face.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId<I>) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Find the half-edge going from `from` to `to`, if the two are adjacent.
    pub fn find_halfedge(&self, from: VertexId<I>, to: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex_halfedges(from).find(|&he| self.to_vertex(he) == to)
    }

    // ==================== Vertex one-ring ====================

    /// Outgoing half-edges of a vertex, starting at its representative.
    ///
    /// Empty for isolated vertices.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> VertexHalfEdgeIter<'_, I> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Incoming half-edges of a vertex, in the same order as the outgoing ones.
    pub fn vertex_incoming_halfedges(
        &self,
        v: VertexId<I>,
    ) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.opposite(he))
    }

    /// One-ring neighbor vertices.
    pub fn vertex_neighbors(&self, v: VertexId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.to_vertex(he))
    }

    /// Faces around a vertex, skipping boundary gaps.
    pub fn vertex_faces(&self, v: VertexId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.vertex_halfedges(v)
            .filter_map(|he| self.face_of(he).valid())
    }

    /// Edges incident to a vertex.
    pub fn vertex_edges(&self, v: VertexId<I>) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.vertex_halfedges(v).map(|he| self.edge_of(he))
    }

    /// Number of edges incident to a vertex.
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.vertex_halfedges(v).count()
    }

    /// Whether the vertex lies on a boundary.
    ///
    /// Relies on the boundary anchor invariant: a boundary vertex's
    /// representative half-edge is a boundary half-edge. Isolated vertices are
    /// not boundary vertices.
    pub fn is_boundary_vertex(&self, v: VertexId<I>) -> bool {
        let he = self.vertex(v).halfedge;
        he.is_valid() && self.is_boundary_halfedge(he)
    }

    /// Whether the vertex has no incident edges.
    #[inline]
    pub fn is_isolated(&self, v: VertexId<I>) -> bool {
        !self.vertex(v).halfedge.is_valid()
    }

    // ==================== Faces ====================

    /// Half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId<I>) -> FaceHalfEdgeIter<'_, I> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Vertices of a face, in half-edge cycle order (heads of the face half-edges).
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.to_vertex(he))
    }

    /// Neighboring faces across each side; `None` across boundary edges.
    pub fn face_neighbors(&self, f: FaceId<I>) -> impl Iterator<Item = Option<FaceId<I>>> + '_ {
        self.face_halfedges(f)
            .map(|he| self.face_of(self.opposite(he)).valid())
    }

    /// Edges of a face.
    pub fn face_edges(&self, f: FaceId<I>) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.face_halfedges(f).map(|he| self.edge_of(he))
    }

    /// Number of sides of a face.
    pub fn face_degree(&self, f: FaceId<I>) -> usize {
        self.face_halfedges(f).count()
    }

    /// Whether any side of the face is a boundary edge.
    pub fn is_boundary_face(&self, f: FaceId<I>) -> bool {
        self.face_halfedges(f)
            .any(|he| self.is_boundary_halfedge(self.opposite(he)))
    }

    /// Arithmetic mean of the face's vertex positions.
    pub fn face_centroid(&self, f: FaceId<I>) -> Point3<f64> {
        let mut sum = Vector3::zeros();
        let mut count = 0usize;
        for v in self.face_vertices(f) {
            sum += self.point(v).coords;
            count += 1;
        }
        Point3::from(sum / count as f64)
    }

    /// Unit normal of a face.
    ///
    /// Sums the cross products at every corner, so it stays meaningful for
    /// non-planar polygons. Degenerate faces yield the zero vector.
    pub fn face_normal(&self, f: FaceId<I>) -> Vector3<f64> {
        let mut normal = Vector3::zeros();
        for he in self.face_halfedges(f) {
            let p0 = self.point(self.from_vertex(he));
            let p1 = self.point(self.to_vertex(he));
            let p2 = self.point(self.to_vertex(self.next(he)));
            normal += (p1 - p0).cross(&(p2 - p0));
        }
        normalize_or_zero(normal)
    }

    // ==================== Edges ====================

    /// The two half-edges of an edge: the representative and its opposite.
    #[inline]
    pub fn edge_halfedges(&self, e: EdgeId<I>) -> [HalfEdgeId<I>; 2] {
        let he = self.edge(e).halfedge;
        [he, self.opposite(he)]
    }

    /// The two endpoints of an edge.
    pub fn edge_vertices(&self, e: EdgeId<I>) -> [VertexId<I>; 2] {
        let [h0, h1] = self.edge_halfedges(e);
        [self.to_vertex(h0), self.to_vertex(h1)]
    }

    /// The faces on either side of an edge; `None` on the boundary side.
    pub fn edge_faces(&self, e: EdgeId<I>) -> [Option<FaceId<I>>; 2] {
        let [h0, h1] = self.edge_halfedges(e);
        [self.face_of(h0).valid(), self.face_of(h1).valid()]
    }

    /// Whether either side of the edge has no face.
    pub fn is_boundary_edge(&self, e: EdgeId<I>) -> bool {
        let [h0, h1] = self.edge_halfedges(e);
        self.is_boundary_halfedge(h0) || self.is_boundary_halfedge(h1)
    }

    /// Midpoint of an edge.
    pub fn edge_midpoint(&self, e: EdgeId<I>) -> Point3<f64> {
        let [v0, v1] = self.edge_vertices(e);
        Point3::from((self.point(v0).coords + self.point(v1).coords) * 0.5)
    }

    // ==================== Iteration ====================

    /// All vertex ids.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// All half-edge ids.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// All edge ids.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// All face ids.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// All vertices with their ids.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId<I>, &Vertex<I>)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// All half-edges with their ids.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId<I>, &HalfEdge<I>)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// All faces with their ids.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId<I>, &Face<I>)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::new(i), f))
    }

    // ==================== Whole-mesh queries ====================

    /// Whether every face is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_degree(f) == 3)
    }

    /// Whether every face is a quad.
    pub fn is_quad_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_degree(f) == 4)
    }

    /// Whether the mesh has no boundary half-edges.
    pub fn is_closed(&self) -> bool {
        self.halfedges.iter().all(|he| !he.is_boundary())
    }

    /// V - E + F.
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    /// Axis-aligned bounding box, or `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.point;
        let mut min = first;
        let mut max = first;
        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.point[i]);
                max[i] = max[i].max(v.point[i]);
            }
        }
        Some((min, max))
    }

    // ==================== Validation ====================

    /// Check every connectivity invariant of the structure.
    ///
    /// - `opposite` is an involution and `next`/`prev` are mutual inverses
    /// - consecutive half-edges meet at a vertex and share a face
    /// - each edge is anchored on one of its own half-edges
    /// - each face cycle closes and points back at the face
    /// - each vertex anchor is outgoing, boundary vertices are anchored on a
    ///   boundary half-edge, and the `opposite.next` walk reaches every
    ///   outgoing half-edge (single fan)
    pub fn is_valid(&self) -> bool {
        let n = self.halfedges.len();
        let mut outgoing = vec![0usize; self.vertices.len()];

        for (heid, he) in self.halfedges() {
            if !(he.opposite.is_valid() && he.next.is_valid() && he.prev.is_valid()) {
                return false;
            }
            if !(he.vertex.is_valid() && he.edge.is_valid()) {
                return false;
            }
            if self.opposite(he.opposite) != heid || he.opposite == heid {
                return false;
            }
            if self.prev(he.next) != heid || self.next(he.prev) != heid {
                return false;
            }
            if self.from_vertex(he.next) != he.vertex {
                return false;
            }
            if self.face_of(he.next) != he.face {
                return false;
            }
            let e = self.edge(he.edge).halfedge;
            if e != heid && e != he.opposite {
                return false;
            }
            let anchor = self.vertex(self.from_vertex(heid)).halfedge;
            if he.is_boundary() && !self.is_boundary_halfedge(anchor) {
                return false;
            }
            outgoing[self.from_vertex(heid).index()] += 1;
        }

        for (fid, f) in self.faces() {
            if !f.halfedge.is_valid() || self.face_of(f.halfedge) != fid {
                return false;
            }
            let mut he = self.next(f.halfedge);
            let mut steps = 1;
            while he != f.halfedge {
                if steps > n {
                    return false;
                }
                he = self.next(he);
                steps += 1;
            }
        }

        for (vid, v) in self.vertices() {
            if !v.halfedge.is_valid() {
                if outgoing[vid.index()] != 0 {
                    return false;
                }
                continue;
            }
            if self.from_vertex(v.halfedge) != vid {
                return false;
            }
            if self.valence(vid) != outgoing[vid.index()] {
                return false;
            }
        }

        true
    }
}

/// Normalize, leaving zero-length vectors untouched.
pub(crate) fn normalize_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    v.try_normalize(0.0).unwrap_or(v)
}

/// Iterator over the outgoing half-edges of a vertex.
pub struct VertexHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    // Bounds the walk if the fan is broken.
    remaining: usize,
}

impl<'a, I: MeshIndex> VertexHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() { mesh.num_halfedges() } else { 0 },
        }
    }
}

impl<'a, I: MeshIndex> Iterator for VertexHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.current;

        // v -> w, then w -> v, then the half-edge after it leaves v again.
        self.current = self.mesh.next(self.mesh.opposite(self.current));
        self.remaining = if self.current == self.start {
            0
        } else {
            self.remaining - 1
        };

        Some(result)
    }
}

/// Iterator over the half-edges of a face.
pub struct FaceHalfEdgeIter<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    remaining: usize,
}

impl<'a, I: MeshIndex> FaceHalfEdgeIter<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, f: FaceId<I>) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            remaining: if start.is_valid() { mesh.num_halfedges() } else { 0 },
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceHalfEdgeIter<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.current;
        self.current = self.mesh.next(self.current);
        self.remaining = if self.current == self.start {
            0
        } else {
            self.remaining - 1
        };
        Some(result)
    }
}
