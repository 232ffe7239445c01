//! Face and vertex normal estimation.
//!
//! Face normals sum the cross product at every corner of the polygon, which
//! keeps them well defined for quads and other non-planar faces. Vertex normals
//! are the normalized sum of the unit normals of the incident faces.

use nalgebra::Vector3;

use crate::mesh::{normalize_or_zero, HalfEdgeMesh, MeshIndex};

/// Compute and store normals for every face and every vertex.
///
/// A vertex without incident faces gets the zero vector. Recomputing on an
/// unchanged mesh reproduces the same values bit for bit.
///
/// # Example
///
/// ```
/// use meshdiv::prelude::*;
/// use meshdiv::algo::normals::compute_normals;
/// use nalgebra::{Point3, Vector3};
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mut mesh: HalfEdgeMesh = build_from_triangles(&points, &[[0, 1, 2]]).unwrap();
/// compute_normals(&mut mesh);
/// assert_eq!(mesh.face(FaceId::new(0)).normal, Some(Vector3::z()));
/// ```
pub fn compute_normals<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let face_normals: Vec<Vector3<f64>> = mesh.face_ids().map(|f| mesh.face_normal(f)).collect();

    let vertex_normals: Vec<Vector3<f64>> = mesh
        .vertex_ids()
        .map(|v| {
            let sum: Vector3<f64> = mesh
                .vertex_faces(v)
                .map(|f| face_normals[f.index()])
                .sum();
            normalize_or_zero(sum)
        })
        .collect();

    for (face, normal) in mesh.faces.iter_mut().zip(face_normals) {
        face.normal = Some(normal);
    }
    for (vertex, normal) in mesh.vertices.iter_mut().zip(vertex_normals) {
        vertex.normal = Some(normal);
    }
}
