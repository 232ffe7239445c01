//! Object File Format (OFF) support.
//!
//! Layout: the `OFF` keyword, a counts line `<vertices> <faces> <edges>`,
//! one `x y z` line per vertex, then one `<degree> i0 i1 ...` line per face
//! with 0-based indices. Blank lines and `#` comments may appear anywhere.

use std::fs;
use std::path::Path;

use super::{assemble, parse_point, parse_token, FaceRecord};
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Parse OFF text into a mesh.
///
/// A missing or wrong keyword is [`MeshError::BadMagic`]. Disagreements between
/// the declared and actual face count, or between a face's declared degree and
/// its index list, are logged and the data that was found is used.
pub fn read_off<I: MeshIndex>(content: &str) -> Result<HalfEdgeMesh<I>> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.split_whitespace().collect::<Vec<&str>>()))
        .filter(|(_, tokens)| tokens.first().is_some_and(|t| !t.starts_with('#')));

    let Some((line, header)) = lines.next() else {
        return Err(MeshError::BadMagic {
            found: String::new(),
        });
    };
    if header[0] != "OFF" {
        return Err(MeshError::BadMagic {
            found: header[0].to_string(),
        });
    }

    // Counts may share the keyword's line.
    let (line, counts) = if header.len() > 1 {
        (line, header[1..].to_vec())
    } else {
        lines
            .next()
            .ok_or_else(|| MeshError::parse(line, "missing vertex and face counts"))?
    };
    let num_vertices: usize = parse_token(&counts, 0, line, "vertex count")?;
    let num_faces: usize = parse_token(&counts, 1, line, "face count")?;

    // The declared counts are untrusted, so they never size an allocation.
    let mut points = Vec::new();
    let mut faces = Vec::new();

    for (line, tokens) in lines {
        if points.len() < num_vertices {
            points.push(parse_point(&tokens, 0, line)?);
        } else if faces.len() < num_faces {
            let degree: usize = parse_token(&tokens, 0, line, "face degree")?;
            let indices = (1..tokens.len())
                .map(|k| parse_token(&tokens, k, line, "vertex index"))
                .collect::<Result<Vec<usize>>>()?;
            if degree != indices.len() {
                log::warn!(
                    "line {}: face declares {} vertices but lists {}",
                    line,
                    degree,
                    indices.len()
                );
            }
            faces.push(FaceRecord::new(line, indices));
        } else {
            break;
        }
    }

    if points.len() != num_vertices {
        log::warn!(
            "inconsistent vertex count: {} declared vs {} found",
            num_vertices,
            points.len()
        );
    }
    if faces.len() != num_faces {
        log::warn!(
            "inconsistent face count: {} declared vs {} found",
            num_faces,
            faces.len()
        );
    }

    assemble(points, faces)
}

/// Serialize a mesh as OFF text.
///
/// Faces list 0-based vertex ids in half-edge cycle order.
pub fn write_off<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> String {
    let mut out = String::from("OFF\n");
    out.push_str(&format!("{} {} 0\n", mesh.num_vertices(), mesh.num_faces()));
    for v in mesh.vertex_ids() {
        let p = mesh.point(v);
        out.push_str(&format!("{} {} {}\n", p.x, p.y, p.z));
    }
    for f in mesh.face_ids() {
        let mut line = mesh.face_degree(f).to_string();
        for v in mesh.face_vertices(f) {
            line.push(' ');
            line.push_str(&v.index().to_string());
        }
        line.push('\n');
        out.push_str(&line);
    }
    out
}

/// Load a mesh from an OFF file.
///
/// # Example
///
/// ```no_run
/// use meshdiv::io::off;
/// use meshdiv::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = off::load("cube.off").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let mesh = read_off(&content)?;
    log::info!(
        "loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(mesh)
}

/// Save a mesh to an OFF file.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, write_off(mesh))?;
    log::info!("saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::subdivide::{catmull_clark_subdivide, SubdivideOptions};
    use crate::mesh::{to_face_vertex, FaceId, VertexId};

    const CUBE: &str = "OFF
8 6 0
0 0 0
1 0 0
1 1 0
0 1 0
0 0 1
1 0 1
1 1 1
0 1 1
4 0 3 2 1
4 4 5 6 7
4 0 1 5 4
4 2 3 7 6
4 0 4 7 3
4 1 2 6 5
";

    /// Face cycles rotated to start at their smallest index.
    fn canonical_faces(mesh: &HalfEdgeMesh) -> Vec<Vec<usize>> {
        let (_, faces) = to_face_vertex(mesh);
        faces
            .into_iter()
            .map(|mut f| {
                let start = f
                    .iter()
                    .enumerate()
                    .min_by_key(|&(_, v)| *v)
                    .map(|(i, _)| i)
                    .unwrap();
                f.rotate_left(start);
                f
            })
            .collect()
    }

    #[test]
    fn test_read_cube() {
        let mesh: HalfEdgeMesh = read_off(CUBE).unwrap();
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_faces(), 6);
        assert_eq!(mesh.num_edges(), 12);
        assert!(mesh.is_closed());
        assert!(mesh.is_valid());

        let first: Vec<usize> = mesh.face_vertices(FaceId::new(0)).map(|v| v.index()).collect();
        assert_eq!(first, vec![0, 3, 2, 1]);
    }

    #[test]
    fn test_cube_catmull_clark() {
        let mesh: HalfEdgeMesh = read_off(CUBE).unwrap();
        let refined = catmull_clark_subdivide(&mesh, &SubdivideOptions::new(1)).unwrap();
        assert_eq!(refined.num_vertices(), 26);
        assert_eq!(refined.num_faces(), 24);
        assert!(refined.is_quad_mesh());
    }

    #[test]
    fn test_round_trip() {
        let mesh: HalfEdgeMesh = read_off(CUBE).unwrap();
        let text = write_off(&mesh);
        let again: HalfEdgeMesh = read_off(&text).unwrap();

        assert_eq!(again.num_vertices(), mesh.num_vertices());
        assert_eq!(again.num_faces(), mesh.num_faces());
        assert_eq!(canonical_faces(&again), canonical_faces(&mesh));
        assert_eq!(write_off(&again), text);
    }

    #[test]
    fn test_write_header() {
        let mesh: HalfEdgeMesh = read_off(CUBE).unwrap();
        let text = write_off(&mesh);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "OFF");
        assert_eq!(lines[1], "8 6 0");
        assert_eq!(lines[2], "0 0 0");
        assert_eq!(lines[10], "4 0 3 2 1");
    }

    #[test]
    fn test_bad_magic() {
        let result = read_off::<u32>("COFF\n3 1 0\n");
        match result {
            Err(MeshError::BadMagic { found }) => assert_eq!(found, "COFF"),
            other => panic!("expected BadMagic, got {:?}", other.map(|m| m.num_faces())),
        }
        assert!(matches!(
            read_off::<u32>(""),
            Err(MeshError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let text = "# a triangle\nOFF\n\n# counts\n3 1 0\n0 0 0\n1 0 0\n\n0 1 0\n# face\n3 0 1 2\n";
        let mesh: HalfEdgeMesh = read_off(text).unwrap();
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_faces(), 1);
    }

    #[test]
    fn test_counts_on_keyword_line() {
        let text = "OFF 3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
        let mesh: HalfEdgeMesh = read_off(text).unwrap();
        assert_eq!(mesh.num_faces(), 1);
    }

    #[test]
    fn test_face_count_mismatch_is_soft() {
        // Declares three faces but only lists two.
        let text = "OFF\n4 3 0\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n3 0 1 2\n3 0 2 3\n";
        let mesh: HalfEdgeMesh = read_off(text).unwrap();
        assert_eq!(mesh.num_faces(), 2);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_degree_mismatch_is_soft() {
        let text = "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n4 0 1 2\n";
        let mesh: HalfEdgeMesh = read_off(text).unwrap();
        assert_eq!(mesh.face_degree(FaceId::new(0)), 3);
    }

    #[test]
    fn test_extra_lines_after_faces_are_ignored() {
        let text = "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n3 2 1 0\n";
        let mesh: HalfEdgeMesh = read_off(text).unwrap();
        assert_eq!(mesh.num_faces(), 1);
    }

    #[test]
    fn test_huge_declared_counts() {
        let mesh: HalfEdgeMesh = read_off("OFF\n1000000000000000 1 0\n0 0 0\n").unwrap();
        assert_eq!(mesh.num_vertices(), 1);
        assert_eq!(mesh.num_faces(), 0);

        let text = "OFF\n3 1000000000000000 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
        let mesh: HalfEdgeMesh = read_off(text).unwrap();
        assert_eq!(mesh.num_faces(), 1);
    }

    #[test]
    fn test_malformed_counts() {
        assert!(matches!(
            read_off::<u32>("OFF\nmany 1 0\n"),
            Err(MeshError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            read_off::<u32>("OFF\n"),
            Err(MeshError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_malformed_vertex() {
        let text = "OFF\n3 1 0\n0 0 0\n1 0\n0 1 0\n3 0 1 2\n";
        assert!(matches!(
            read_off::<u32>(text),
            Err(MeshError::Parse { line: 4, .. })
        ));
    }

    #[test]
    fn test_unreferenced_vertex_is_kept() {
        let text = "OFF\n4 1 0\n0 0 0\n1 0 0\n0 1 0\n9 9 9\n3 0 1 2\n";
        let mesh: HalfEdgeMesh = read_off(text).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert!(mesh.is_isolated(VertexId::new(3)));
        assert_eq!(mesh.point(VertexId::new(3)).z, 9.0);
    }
}
