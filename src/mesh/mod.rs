//! Core mesh data structures.
//!
//! This module provides the half-edge polygon mesh and the builder that
//! produces it.
//!
//! # Overview
//!
//! [`HalfEdgeMesh`] stores vertices, half-edges, undirected edges and faces
//! in flat arenas addressed by typed ids ([`VertexId`], [`HalfEdgeId`],
//! [`EdgeId`], [`FaceId`]). Faces may have any degree. All navigation goes
//! through the mesh, e.g. `mesh.opposite(he)` or `mesh.vertex_faces(v)`.
//!
//! # Construction
//!
//! Meshes come from [`MeshBuilder`], from the convenience constructors, or
//! from [`crate::io`]:
//!
//! ```
//! use meshdiv::mesh::{build_from_quads, HalfEdgeMesh};
//! use nalgebra::Point3;
//!
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_quads(&points, &[[0, 1, 2, 3]]).unwrap();
//! assert_eq!(mesh.num_halfedges(), 8);
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{
    build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex, MeshBuilder,
};
pub use halfedge::{
    Edge, Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter,
};
pub(crate) use halfedge::normalize_or_zero;
pub(crate) use index::ensure_fits;
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
