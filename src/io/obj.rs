//! Wavefront OBJ format support.
//!
//! Only the geometry records are understood: `v`, `vt`, `vn` and `f`.
//! Everything else (groups, materials, smoothing groups) is ignored, as are
//! comments and lines with too few tokens to carry data. Face indices are
//! 1-based; relative (negative) indices are rejected.

use std::fs;
use std::path::Path;

use nalgebra::{Vector2, Vector3};

use super::{assemble, parse_point, parse_token, FaceRecord};
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Parse OBJ text into a mesh.
///
/// Per-corner normals and texture coordinates are attached to a face only
/// when every one of its corners references an existing `vn`/`vt` entry.
///
/// # Example
///
/// ```
/// use meshdiv::io::obj;
/// use meshdiv::mesh::HalfEdgeMesh;
///
/// let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
/// let mesh: HalfEdgeMesh = obj::read_obj(text).unwrap();
/// assert!(mesh.is_quad_mesh());
/// ```
pub fn read_obj<I: MeshIndex>(content: &str) -> Result<HalfEdgeMesh<I>> {
    let mut points = Vec::new();
    let mut normals: Vec<Vector3<f64>> = Vec::new();
    let mut texcoords: Vec<Vector2<f64>> = Vec::new();
    let mut faces = Vec::new();

    for (i, raw_line) in content.lines().enumerate() {
        let line = i + 1;
        let tokens: Vec<&str> = raw_line.split_whitespace().collect();
        let Some(&head) = tokens.first() else {
            continue;
        };
        if head.starts_with('#') {
            continue;
        }
        // Records need four tokens, except `vt u v`, which is accepted with
        // three so that 2D texture coordinates are not lost.
        let min_tokens = if head == "vt" { 3 } else { 4 };
        if tokens.len() < min_tokens {
            continue;
        }

        match head {
            "v" => points.push(parse_point(&tokens, 1, line)?),
            "vn" => normals.push(parse_point(&tokens, 1, line)?.coords),
            "vt" => texcoords.push(Vector2::new(
                parse_token(&tokens, 1, line, "u coordinate")?,
                parse_token(&tokens, 2, line, "v coordinate")?,
            )),
            "f" => faces.push(parse_face(&tokens[1..], line, &normals, &texcoords)?),
            _ => {}
        }
    }

    log::debug!(
        "read OBJ: {} points, {} normals, {} texcoords, {} faces",
        points.len(),
        normals.len(),
        texcoords.len(),
        faces.len()
    );
    assemble(points, faces)
}

fn parse_face(
    corners: &[&str],
    line: usize,
    normals: &[Vector3<f64>],
    texcoords: &[Vector2<f64>],
) -> Result<FaceRecord> {
    let mut indices = Vec::with_capacity(corners.len());
    let mut face_normals = Vec::with_capacity(corners.len());
    let mut face_texcoords = Vec::with_capacity(corners.len());

    for corner in corners {
        let mut parts = corner.split('/');
        let vertex = parts.next().unwrap_or_default();
        indices.push(parse_index(vertex, line)?);

        if let Some(t) = parts.next().filter(|t| !t.is_empty()) {
            if let Some(&uv) = texcoords.get(parse_index(t, line)?) {
                face_texcoords.push(uv);
            }
        }
        if let Some(n) = parts.next().filter(|n| !n.is_empty()) {
            if let Some(&normal) = normals.get(parse_index(n, line)?) {
                face_normals.push(normal);
            }
        }
    }

    let mut record = FaceRecord::new(line, indices);
    if face_normals.len() == record.indices.len() {
        record.normals = Some(face_normals);
    }
    if face_texcoords.len() == record.indices.len() {
        record.texcoords = Some(face_texcoords);
    }
    Ok(record)
}

/// Convert a 1-based OBJ index to 0-based.
fn parse_index(token: &str, line: usize) -> Result<usize> {
    let index: i64 = token
        .parse()
        .map_err(|_| MeshError::parse(line, format!("invalid index `{}`", token)))?;
    if index < 1 {
        return Err(MeshError::parse(
            line,
            format!("index {} is not supported; indices are 1-based and absolute", index),
        ));
    }
    Ok((index - 1) as usize)
}

/// Serialize a mesh as OBJ text.
///
/// One `v` line per vertex in id order, then one `f` line per face listing
/// 1-based vertex ids in half-edge cycle order.
pub fn write_obj<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> String {
    let mut out = String::new();
    for v in mesh.vertex_ids() {
        let p = mesh.point(v);
        out.push_str(&format!("v {} {} {}\n", p.x, p.y, p.z));
    }
    for f in mesh.face_ids() {
        let ids: Vec<String> = mesh
            .face_vertices(f)
            .map(|v| (v.index() + 1).to_string())
            .collect();
        out.push_str(&format!("f {}\n", ids.join(" ")));
    }
    out
}

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use meshdiv::io::obj;
/// use meshdiv::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let mesh = read_obj(&content)?;
    log::info!(
        "loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(mesh)
}

/// Save a mesh to an OBJ file.
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, write_obj(mesh))?;
    log::info!("saved {}", path.display());
    Ok(())
}
