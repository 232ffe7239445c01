//! Mesh subdivision algorithms.
//!
//! Both schemes follow the same three phases per pass:
//!
//! 1. compute a new point for every element that will host a vertex of the
//!    refined mesh (original vertices, edges, and for Catmull-Clark, faces)
//! 2. build the refined topology by splitting every face around its corners
//! 3. attach the computed points to the new vertex ids and recompute normals
//!
//! The input mesh is only borrowed; every pass allocates a fresh mesh.
//!
//! # Loop Subdivision (Triangle Meshes)
//!
//! Each triangle becomes four: one per corner plus a central triangle joining
//! the three edge points. Output vertex count is V + E. Every face of the
//! input must be a triangle.
//!
//! # Catmull-Clark Subdivision (Polygon Meshes)
//!
//! Each corner of every face becomes one quad joining the corner, its two
//! edge points and the face point. Faces of any degree are accepted; the
//! output is always an all-quad mesh with V + E + F vertices.
//!
//! # Boundaries
//!
//! Boundary edges take their midpoint and boundary vertices take
//! `3/4 v + 1/8 (left + right)` in both schemes.
//!
//! # Errors
//!
//! Non-manifold input, such as two fans of faces sharing one vertex, is
//! rejected with [`MeshError::NonManifoldMesh`] before the first pass. A pass
//! whose output would not fit in the mesh's index type fails with
//! [`MeshError::IndexOverflow`] before it starts.
//!
//! # Example
//!
//! ```
//! use meshdiv::prelude::*;
//! use meshdiv::algo::subdivide::{loop_subdivide, SubdivideOptions};
//! use nalgebra::Point3;
//!
//! let points = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mesh: HalfEdgeMesh = build_from_triangles(&points, &faces).unwrap();
//!
//! let refined = loop_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();
//! assert_eq!(refined.num_faces(), 4 * 4 * 4);
//! ```
//!
//! # References
//!
//! - Loop, C. (1987). "Smooth Subdivision Surfaces Based on Triangles."
//!   Master's thesis, University of Utah.
//! - Catmull, E. & Clark, J. (1978). "Recursively generated B-spline surfaces
//!   on arbitrary topological meshes." Computer-Aided Design, 10(6), 350-355.

mod catmull_clark;
mod loop_subdivision;

use nalgebra::Point3;
use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

pub use catmull_clark::catmull_clark_subdivide;
pub use loop_subdivision::loop_subdivide;

/// Options for subdivision algorithms.
#[derive(Debug, Clone)]
pub struct SubdivideOptions {
    /// Number of subdivision passes.
    pub iterations: usize,

    /// Whether to compute new points in parallel (default: true).
    pub parallel: bool,
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

impl SubdivideOptions {
    /// Create options with the specified number of passes.
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            parallel: true,
        }
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Reject input whose one-rings are not single fans; the vertex rules would
/// otherwise only see part of the neighborhood.
fn check_manifold<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Result<()> {
    if !mesh.is_valid() {
        return Err(MeshError::NonManifoldMesh);
    }
    Ok(())
}

/// Evaluate `f` for every index in `0..n`, keeping index order.
fn compute_points<F>(n: usize, parallel: bool, f: F) -> Vec<Point3<f64>>
where
    F: Fn(usize) -> Point3<f64> + Sync + Send,
{
    if parallel {
        (0..n).into_par_iter().map(f).collect()
    } else {
        (0..n).map(f).collect()
    }
}

/// Boundary vertex rule shared by both schemes: `3/4 v + 1/8 (w0 + w1)`,
/// where w0 and w1 are the neighbors along the boundary loop.
fn boundary_vertex_point<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Point3<f64> {
    let he = mesh.vertex(v).halfedge;
    let w0 = mesh.point(mesh.from_vertex(mesh.prev(he)));
    let w1 = mesh.point(mesh.to_vertex(he));
    Point3::from(mesh.point(v).coords * 0.75 + (w0.coords + w1.coords) * 0.125)
}
