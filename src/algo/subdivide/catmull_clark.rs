//! Catmull-Clark subdivision for polygon meshes.

use nalgebra::{Point3, Vector3};

use crate::algo::normals::compute_normals;
use crate::error::{MeshError, Result};
use crate::mesh::{
    ensure_fits, EdgeId, FaceId, HalfEdgeMesh, MeshBuilder, MeshIndex, VertexId,
};

use super::{boundary_vertex_point, check_manifold, compute_points, SubdivideOptions};

/// Performs Catmull-Clark subdivision on a polygon mesh.
///
/// Faces of any degree are accepted. After one pass every face is a quad.
/// Zero passes return a copy. Normals of the result are computed.
///
/// # Errors
///
/// [`MeshError::EmptyMesh`] if the mesh has no faces and
/// [`MeshError::NonManifoldMesh`] for non-manifold input, both before any
/// work is done. [`MeshError::IndexOverflow`] if a pass would create more
/// elements than `I` can address.
///
/// # Rules
///
/// - **Face point**: centroid of the face's vertices
/// - **Interior edge point**: `(v0 + v1)/4 + (f0 + f1)/4`, where f0 and f1
///   are the face points of the two adjacent faces
/// - **Boundary edge point**: `1/2 (v0 + v1)`
/// - **Interior vertex** of valence n: `(Q + 2R + (n - 3) v) / n`, where Q
///   averages the adjacent face points and R the incident edge midpoints
/// - **Boundary vertex**: `3/4 v + 1/8 (w0 + w1)`
pub fn catmull_clark_subdivide<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &SubdivideOptions,
) -> Result<HalfEdgeMesh<I>> {
    if mesh.num_faces() == 0 {
        return Err(MeshError::EmptyMesh);
    }
    check_manifold(mesh)?;
    if options.iterations == 0 {
        return Ok(mesh.clone());
    }

    let mut refined = catmull_clark_once(mesh, options.parallel)?;
    for _ in 1..options.iterations {
        refined = catmull_clark_once(&refined, options.parallel)?;
    }
    Ok(refined)
}

/// Perform one pass of Catmull-Clark subdivision.
fn catmull_clark_once<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    parallel: bool,
) -> Result<HalfEdgeMesh<I>> {
    // One quad per face corner.
    let num_quads: usize = mesh.face_ids().map(|f| mesh.face_degree(f)).sum();
    let (v, e, f) = (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces());
    ensure_fits::<I>("vertices", v + e + f)?;
    ensure_fits::<I>("faces", num_quads)?;
    ensure_fits::<I>("half-edges", 2 * (2 * e + num_quads))?;

    let face_points = compute_points(mesh.num_faces(), parallel, |f| {
        mesh.face_centroid(FaceId::new(f))
    });
    let edge_points = compute_points(mesh.num_edges(), parallel, |e| {
        cc_edge_point(mesh, EdgeId::new(e), &face_points)
    });
    let vertex_points = compute_points(mesh.num_vertices(), parallel, |v| {
        cc_vertex_point(mesh, VertexId::new(v), &face_points)
    });

    // New vertex layout: original vertices, edge points, face points.
    let edge_offset = mesh.num_vertices();
    let face_offset = edge_offset + mesh.num_edges();
    let mut builder = MeshBuilder::with_capacity(face_offset + mesh.num_faces(), num_quads);

    for f in mesh.face_ids() {
        let center = face_offset + f.index();
        for he in mesh.face_halfedges(f) {
            let quad = [
                edge_offset + mesh.edge_of(mesh.prev(he)).index(),
                mesh.from_vertex(he).index(),
                edge_offset + mesh.edge_of(he).index(),
                center,
            ];
            builder.add_face(&quad, None, None)?;
        }
    }

    for (i, p) in vertex_points.into_iter().enumerate() {
        builder.set_point(i, p);
    }
    for (i, p) in edge_points.into_iter().enumerate() {
        builder.set_point(edge_offset + i, p);
    }
    for (i, p) in face_points.into_iter().enumerate() {
        builder.set_point(face_offset + i, p);
    }

    let mut refined = builder.finish();
    compute_normals(&mut refined);

    log::debug!(
        "Catmull-Clark pass: {} faces -> {} quads, {} vertices -> {} vertices",
        mesh.num_faces(),
        refined.num_faces(),
        mesh.num_vertices(),
        refined.num_vertices()
    );

    Ok(refined)
}

fn cc_edge_point<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    e: EdgeId<I>,
    face_points: &[Point3<f64>],
) -> Point3<f64> {
    match mesh.edge_faces(e) {
        [Some(f0), Some(f1)] => {
            let [v0, v1] = mesh.edge_vertices(e);
            Point3::from(
                (mesh.point(v0).coords + mesh.point(v1).coords) * 0.25
                    + (face_points[f0.index()].coords + face_points[f1.index()].coords) * 0.25,
            )
        }
        _ => mesh.edge_midpoint(e),
    }
}

fn cc_vertex_point<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    v: VertexId<I>,
    face_points: &[Point3<f64>],
) -> Point3<f64> {
    if mesh.is_isolated(v) {
        return *mesh.point(v);
    }
    if mesh.is_boundary_vertex(v) {
        return boundary_vertex_point(mesh, v);
    }

    let mut face_sum = Vector3::zeros();
    let mut num_faces = 0usize;
    for f in mesh.vertex_faces(v) {
        face_sum += face_points[f.index()].coords;
        num_faces += 1;
    }

    let mut midpoint_sum = Vector3::zeros();
    let mut n = 0usize;
    for e in mesh.vertex_edges(v) {
        midpoint_sum += mesh.edge_midpoint(e).coords;
        n += 1;
    }

    let q = face_sum / num_faces as f64;
    let r = midpoint_sum / n as f64;
    let p = mesh.point(v).coords;
    let nf = n as f64;
    Point3::from((q + r * 2.0 + p * (nf - 3.0)) / nf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex};

    fn unit_cube() -> HalfEdgeMesh {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        let faces = vec![
            [0, 3, 2, 1],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [0, 4, 7, 3],
            [1, 2, 6, 5],
        ];
        build_from_quads(&points, &faces).unwrap()
    }

    fn unit_square() -> HalfEdgeMesh {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_quads(&points, &[[0, 1, 2, 3]]).unwrap()
    }

    #[test]
    fn test_cube_counts() {
        let mesh = unit_cube();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();

        assert_eq!(refined.num_vertices(), 8 + 12 + 6);
        assert_eq!(refined.num_faces(), 24);
        assert_eq!(refined.num_edges(), 48);
        assert!(refined.is_quad_mesh());
        assert!(refined.is_closed());
        assert!(refined.is_valid());
    }

    #[test]
    fn test_cube_corner_rule() {
        let mesh = unit_cube();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();

        // Q = (1/3, 1/3, 1/3), R = (1/6, 1/6, 1/6), n = 3
        let corner = refined.point(VertexId::new(0));
        let expected = Point3::new(2.0 / 9.0, 2.0 / 9.0, 2.0 / 9.0);
        assert!((corner - expected).norm() < 1e-12, "{:?}", corner);
    }

    #[test]
    fn test_cube_edge_rule() {
        let mesh = unit_cube();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();

        let he = mesh.find_halfedge(VertexId::new(0), VertexId::new(1)).unwrap();
        let e = mesh.edge_of(he);
        let p = refined.point(VertexId::new(8 + e.index()));
        assert!((p - Point3::new(0.5, 0.125, 0.125)).norm() < 1e-12, "{:?}", p);
    }

    #[test]
    fn test_cube_face_points_are_centroids() {
        let mesh = unit_cube();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();
        for f in mesh.face_ids() {
            let p = refined.point(VertexId::new(8 + 12 + f.index()));
            assert!((p - mesh.face_centroid(f)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_single_quad_with_boundary() {
        let mesh = unit_square();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();

        assert_eq!(refined.num_vertices(), 9);
        assert_eq!(refined.num_faces(), 4);
        assert!(refined.is_valid());
        assert!(!refined.is_closed());

        let corner = refined.point(VertexId::new(0));
        assert!((corner - Point3::new(0.125, 0.125, 0.0)).norm() < 1e-12);

        for e in mesh.edge_ids() {
            let p = refined.point(VertexId::new(4 + e.index()));
            assert!((p - mesh.edge_midpoint(e)).norm() < 1e-12);
        }

        let center = refined.point(VertexId::new(8));
        assert!((center - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_mixed_polygons_become_quads() {
        // A triangle and a quad sharing edge 1-2.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.5, 0.0),
        ];
        let faces: Vec<Vec<usize>> = vec![vec![0, 1, 2, 3], vec![1, 4, 2]];
        let mesh: HalfEdgeMesh = build_from_polygons(&points, &faces).unwrap();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();

        // One quad per face corner.
        assert_eq!(refined.num_faces(), 4 + 3);
        assert_eq!(refined.num_vertices(), 5 + 6 + 2);
        assert!(refined.is_quad_mesh());
        assert!(refined.is_valid());
    }

    #[test]
    fn test_triangle_mesh_input() {
        let points = vec![
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ];
        let faces = vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
        let mesh: HalfEdgeMesh = build_from_triangles(&points, &faces).unwrap();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();

        assert_eq!(refined.num_faces(), 12 * 4);
        assert!(refined.is_quad_mesh());
        assert_eq!(refined.euler_characteristic(), 2);
    }

    #[test]
    fn test_two_passes_on_cube() {
        let mesh = unit_cube();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();
        assert_eq!(refined.num_faces(), 96);
        assert_eq!(refined.num_vertices(), 98);
        assert!(refined.is_closed());

        // The limit surface shrinks toward the center but stays inside the cube.
        let (min, max) = refined.bounding_box().unwrap();
        assert!(min.x > 0.0 && max.x < 1.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mesh = unit_cube();
        let a = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();
        let b = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(2).sequential()).unwrap();
        for v in a.vertex_ids() {
            assert_eq!(a.point(v), b.point(v));
        }
    }

    #[test]
    fn test_normals_are_computed() {
        let mesh = unit_cube();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();
        let center = Point3::new(0.5, 0.5, 0.5);
        for (v, vertex) in refined.vertices() {
            let n = vertex.normal.unwrap();
            assert!(n.dot(&(refined.point(v) - center)) > 0.0);
        }
    }

    #[test]
    fn test_rejects_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert!(matches!(
            catmull_clark_subdivide(&mesh, &SubdivideOptions::new(1)),
            Err(MeshError::EmptyMesh)
        ));
    }

    #[test]
    fn test_rejects_bowtie() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-1.0, -1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_triangles(&points, &[[0, 1, 2], [0, 3, 4]]).unwrap();
        assert!(!mesh.is_valid());
        assert!(matches!(
            catmull_clark_subdivide(&mesh, &SubdivideOptions::new(1)),
            Err(MeshError::NonManifoldMesh)
        ));
    }

    #[test]
    fn test_index_overflow() {
        let (points, faces) = to_face_vertex(&unit_cube());
        let mesh: HalfEdgeMesh<u16> = build_from_polygons(&points, &faces).unwrap();

        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(5)).unwrap();
        assert_eq!(refined.num_faces(), 6144);

        // The next pass has 2 * (2 * 12288 + 24576) half-edges.
        match catmull_clark_subdivide(&refined, &SubdivideOptions::new(1)) {
            Err(MeshError::IndexOverflow {
                element,
                count,
                max,
            }) => {
                assert_eq!(element, "half-edges");
                assert_eq!(count, 98304);
                assert_eq!(max, 65535);
            }
            other => panic!("expected IndexOverflow, got {:?}", other.map(|m| m.num_faces())),
        }
    }
}
