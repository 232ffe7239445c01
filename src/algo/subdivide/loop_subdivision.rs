//! Loop subdivision for triangle meshes.

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};

use crate::algo::normals::compute_normals;
use crate::error::{MeshError, Result};
use crate::mesh::{ensure_fits, EdgeId, HalfEdgeMesh, MeshBuilder, MeshIndex, VertexId};

use super::{boundary_vertex_point, check_manifold, compute_points, SubdivideOptions};

/// Performs Loop subdivision on a triangle mesh.
///
/// Returns a new mesh after `options.iterations` passes; zero passes return a
/// copy. Normals of the result are computed.
///
/// # Errors
///
/// [`MeshError::DegreeMismatch`] if any face is not a triangle,
/// [`MeshError::EmptyMesh`] if there are no faces and
/// [`MeshError::NonManifoldMesh`] for non-manifold input. These are detected
/// before any work is done. [`MeshError::IndexOverflow`] is returned when a
/// pass would create more elements than `I` can address.
///
/// # Rules
///
/// - **Interior edge point**: `3/8 (v0 + v1) + 1/8 (w0 + w1)`, where w0 and w1
///   are the vertices opposite the edge in its two triangles
/// - **Boundary edge point**: `1/2 (v0 + v1)`
/// - **Interior vertex** of valence n: `α v + (1 - α)/n Σ neighbors`, with
///   `α = (3/8 + 1/4 cos(2π/n))² + 3/8`
/// - **Boundary vertex**: `3/4 v + 1/8 (w0 + w1)`
pub fn loop_subdivide<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    options: &SubdivideOptions,
) -> Result<HalfEdgeMesh<I>> {
    check_triangles(mesh)?;
    check_manifold(mesh)?;
    if options.iterations == 0 {
        return Ok(mesh.clone());
    }

    let mut refined = loop_subdivide_once(mesh, options.parallel)?;
    for _ in 1..options.iterations {
        refined = loop_subdivide_once(&refined, options.parallel)?;
    }
    Ok(refined)
}

fn check_triangles<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Result<()> {
    if mesh.num_faces() == 0 {
        return Err(MeshError::EmptyMesh);
    }
    for f in mesh.face_ids() {
        let degree = mesh.face_degree(f);
        if degree != 3 {
            return Err(MeshError::DegreeMismatch {
                face: f.index(),
                degree,
                expected: 3,
                scheme: "Loop subdivision",
            });
        }
    }
    Ok(())
}

/// Perform one pass of Loop subdivision.
fn loop_subdivide_once<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    parallel: bool,
) -> Result<HalfEdgeMesh<I>> {
    check_triangles(mesh)?;

    let (v, e, f) = (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces());
    ensure_fits::<I>("vertices", v + e)?;
    ensure_fits::<I>("faces", 4 * f)?;
    ensure_fits::<I>("half-edges", 2 * (2 * e + 3 * f))?;

    let edge_points = compute_points(mesh.num_edges(), parallel, |e| {
        loop_edge_point(mesh, EdgeId::new(e))
    });
    let vertex_points = compute_points(mesh.num_vertices(), parallel, |v| {
        loop_vertex_point(mesh, VertexId::new(v))
    });

    // New vertex layout: original vertices, then one per edge.
    let offset = mesh.num_vertices();
    let mut builder = MeshBuilder::with_capacity(offset + mesh.num_edges(), mesh.num_faces() * 4);

    for f in mesh.face_ids() {
        for he in mesh.face_halfedges(f) {
            let corner = [
                mesh.from_vertex(he).index(),
                offset + mesh.edge_of(he).index(),
                offset + mesh.edge_of(mesh.prev(he)).index(),
            ];
            builder.add_face(&corner, None, None)?;
        }
        let center: Vec<usize> = mesh.face_edges(f).map(|e| offset + e.index()).collect();
        builder.add_face(&center, None, None)?;
    }

    for (i, p) in vertex_points.into_iter().enumerate() {
        builder.set_point(i, p);
    }
    for (i, p) in edge_points.into_iter().enumerate() {
        builder.set_point(offset + i, p);
    }

    let mut refined = builder.finish();
    compute_normals(&mut refined);

    log::debug!(
        "Loop pass: {} faces -> {} faces, {} vertices -> {} vertices",
        mesh.num_faces(),
        refined.num_faces(),
        mesh.num_vertices(),
        refined.num_vertices()
    );

    Ok(refined)
}

fn loop_edge_point<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, e: EdgeId<I>) -> Point3<f64> {
    if mesh.is_boundary_edge(e) {
        return mesh.edge_midpoint(e);
    }

    let [h0, h1] = mesh.edge_halfedges(e);
    let [v0, v1] = mesh.edge_vertices(e);
    let w0 = mesh.to_vertex(mesh.next(h0));
    let w1 = mesh.to_vertex(mesh.next(h1));

    Point3::from(
        (mesh.point(v0).coords + mesh.point(v1).coords) * (3.0 / 8.0)
            + (mesh.point(w0).coords + mesh.point(w1).coords) * (1.0 / 8.0),
    )
}

fn loop_vertex_point<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Point3<f64> {
    if mesh.is_isolated(v) {
        return *mesh.point(v);
    }
    if mesh.is_boundary_vertex(v) {
        return boundary_vertex_point(mesh, v);
    }

    let mut neighbor_sum = Vector3::zeros();
    let mut n = 0usize;
    for w in mesh.vertex_neighbors(v) {
        neighbor_sum += mesh.point(w).coords;
        n += 1;
    }

    let alpha = loop_alpha(n);
    Point3::from(mesh.point(v).coords * alpha + neighbor_sum * ((1.0 - alpha) / n as f64))
}

/// Weight of the vertex itself for an interior vertex of valence `n`.
fn loop_alpha(n: usize) -> f64 {
    let inner = 3.0 / 8.0 + 0.25 * (2.0 * PI / n as f64).cos();
    inner * inner + 3.0 / 8.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{build_from_quads, build_from_triangles, FaceId};

    fn create_tetrahedron() -> HalfEdgeMesh {
        let points = vec![
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ];
        let faces = vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
        build_from_triangles(&points, &faces).unwrap()
    }

    fn create_single_triangle() -> HalfEdgeMesh {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
        ];
        build_from_triangles(&points, &[[0, 1, 2]]).unwrap()
    }

    #[test]
    fn test_single_triangle() {
        let mesh = create_single_triangle();
        let refined = loop_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();

        // 1 triangle -> 4 triangles, 3 original + 3 edge vertices
        assert_eq!(refined.num_faces(), 4);
        assert_eq!(refined.num_vertices(), 6);
        assert!(refined.is_triangle_mesh());
        assert!(refined.is_valid());

        // Edge points of a boundary edge are plain midpoints.
        for e in mesh.edge_ids() {
            let new_vertex = VertexId::new(mesh.num_vertices() + e.index());
            assert!((refined.point(new_vertex) - mesh.edge_midpoint(e)).norm() < 1e-12);
        }

        // Corner (0,0,0): 3/4 * 0 + 1/8 * ((1,0,0) + (0.5,1,0))
        let corner = refined.point(VertexId::new(0));
        assert!((corner - Point3::new(0.1875, 0.125, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_quadruples_faces() {
        let mesh = create_tetrahedron();
        let refined = loop_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();

        assert_eq!(refined.num_faces(), 4 * mesh.num_faces());
        assert_eq!(refined.num_vertices(), mesh.num_vertices() + mesh.num_edges());
        assert!(refined.is_triangle_mesh());
        assert!(refined.is_closed());
        assert!(refined.is_valid());
    }

    #[test]
    fn test_two_passes() {
        let mesh = create_tetrahedron();
        let refined = loop_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();
        assert_eq!(refined.num_faces(), 16 * mesh.num_faces());
        assert_eq!(refined.euler_characteristic(), 2);
        assert!(refined.is_valid());
    }

    #[test]
    fn test_zero_passes_copies() {
        let mesh = create_tetrahedron();
        let refined = loop_subdivide(&mesh, &SubdivideOptions::new(0)).unwrap();
        assert_eq!(refined.num_faces(), mesh.num_faces());
        assert_eq!(refined.num_vertices(), mesh.num_vertices());
    }

    #[test]
    fn test_source_is_untouched() {
        let mesh = create_tetrahedron();
        let before: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.point(v)).collect();
        let _ = loop_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();
        let after: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.point(v)).collect();
        assert_eq!(before, after);
        assert_eq!(mesh.num_faces(), 4);
    }

    #[test]
    fn test_regular_tetrahedron_rules() {
        let mesh = create_tetrahedron();
        let refined = loop_subdivide(&mesh, &SubdivideOptions::new(1).sequential()).unwrap();

        // Valence 3: α = 7/16, neighbors weighted 3/16 each. The other three
        // corners sum to -(1,1,1), so v0 = 7/16 (1,1,1) - 3/16 (1,1,1).
        let v0 = refined.point(VertexId::new(0));
        assert!((v0 - Point3::new(0.25, 0.25, 0.25)).norm() < 1e-12);

        // Interior edge 0-1: 3/8 ((1,1,1) + (1,-1,-1)) + 1/8 ((-1,1,-1) + (-1,-1,1))
        let he = mesh.find_halfedge(VertexId::new(0), VertexId::new(1)).unwrap();
        let e = mesh.edge_of(he);
        let p = refined.point(VertexId::new(mesh.num_vertices() + e.index()));
        assert!((p - Point3::new(0.5, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mesh = create_tetrahedron();
        let a = loop_subdivide(&mesh, &SubdivideOptions::new(2)).unwrap();
        let b = loop_subdivide(&mesh, &SubdivideOptions::new(2).sequential()).unwrap();
        for v in a.vertex_ids() {
            assert_eq!(a.point(v), b.point(v));
        }
    }

    #[test]
    fn test_normals_are_computed() {
        let mesh = create_tetrahedron();
        let refined = loop_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();
        for (_, v) in refined.vertices() {
            let n = v.normal.unwrap();
            assert!((n.norm() - 1.0).abs() < 1e-12);
        }
        assert!(refined.face(FaceId::new(0)).normal.is_some());
    }

    #[test]
    fn test_rejects_quads_up_front() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_quads(&points, &[[0, 1, 2, 3]]).unwrap();
        let result = loop_subdivide(&mesh, &SubdivideOptions::new(1));
        assert!(matches!(
            result,
            Err(MeshError::DegreeMismatch { face: 0, degree: 4, expected: 3, .. })
        ));
    }

    #[test]
    fn test_rejects_empty_mesh() {
        let mesh = HalfEdgeMesh::<u32>::new();
        assert!(matches!(
            loop_subdivide(&mesh, &SubdivideOptions::new(1)),
            Err(MeshError::EmptyMesh)
        ));
    }

    #[test]
    fn test_rejects_bowtie() {
        // Two triangles touching only at vertex 0.
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-1.0, -1.0, 0.0),
        ];
        let mesh: HalfEdgeMesh = build_from_triangles(&points, &[[0, 1, 2], [0, 3, 4]]).unwrap();
        assert!(matches!(
            loop_subdivide(&mesh, &SubdivideOptions::new(1)),
            Err(MeshError::NonManifoldMesh)
        ));
    }

    #[test]
    fn test_index_overflow() {
        let points = vec![
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(-1.0, 1.0, -1.0),
            Point3::new(-1.0, -1.0, 1.0),
        ];
        let faces = vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
        let mesh: HalfEdgeMesh<u16> = build_from_triangles(&points, &faces).unwrap();

        let options = SubdivideOptions::new(6).sequential();
        let refined = loop_subdivide(&mesh, &options).unwrap();
        assert_eq!(refined.num_faces(), 16384);
        assert!(refined.is_valid());

        // A seventh pass needs 65536 faces.
        let result = loop_subdivide(&refined, &SubdivideOptions::new(1).sequential());
        assert!(matches!(
            result,
            Err(MeshError::IndexOverflow {
                element: "faces",
                count: 65536,
                max: 65535
            })
        ));
    }

    #[test]
    fn test_alpha() {
        // Valence 3: 7/16
        assert!((loop_alpha(3) - 7.0 / 16.0).abs() < 1e-12);
        // Valence 6 (regular): 5/8
        assert!((loop_alpha(6) - 5.0 / 8.0).abs() < 1e-12);
    }
}
