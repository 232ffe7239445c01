//! # meshdiv
//!
//! Half-edge polygon meshes with Loop and Catmull-Clark subdivision.
//!
//! meshdiv provides an arena-backed half-edge mesh that accepts faces of any
//! degree, a builder that assembles it from indexed face lists, OBJ and OFF
//! codecs, normal estimation, and two subdivision schemes that refine a mesh
//! into a new one without touching the input.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Polygon faces**: triangles, quads and mixed meshes, open or closed
//! - **File formats**: OBJ and OFF, read and write
//! - **Subdivision**: Loop (triangles) and Catmull-Clark (any polygons), with
//!   boundary rules and optional parallel point evaluation
//!
//! ## Quick Start
//!
//! ```no_run
//! use meshdiv::prelude::*;
//! use meshdiv::algo::subdivide::{catmull_clark_subdivide, SubdivideOptions};
//!
//! // Load a mesh
//! let mesh: HalfEdgeMesh = meshdiv::io::load("cube.off").unwrap();
//!
//! // Refine it twice
//! let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();
//! println!("{} -> {} faces", mesh.num_faces(), refined.num_faces());
//!
//! // Save the result
//! meshdiv::io::save(&refined, "cube_cc2.obj").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use meshdiv::prelude::*;
//! use nalgebra::Point3;
//!
//! // Define vertices and faces
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! // Build the mesh
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.num_vertices(), 4);
//! assert_eq!(mesh.num_faces(), 4);
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use meshdiv::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(1.0, 1.0, 0.0),
//! #     Point3::new(0.0, 1.0, 0.0),
//! # ];
//! # let mesh: HalfEdgeMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
//! // Iterate over neighbors of a vertex
//! let v = VertexId::new(0);
//! for neighbor in mesh.vertex_neighbors(v) {
//!     println!("Neighbor: {:?}", neighbor);
//! }
//!
//! // Walk a face in order
//! let f = FaceId::new(0);
//! let cycle: Vec<VertexId> = mesh.face_vertices(f).collect();
//! assert_eq!(cycle.len(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use meshdiv::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::normals::compute_normals;
    pub use crate::algo::subdivide::{catmull_clark_subdivide, loop_subdivide, SubdivideOptions};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex, EdgeId,
        Face, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh, MeshBuilder, MeshIndex, Vertex,
        VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
