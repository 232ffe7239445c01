//! Mesh file I/O.
//!
//! This module provides functions for reading and writing meshes in text
//! formats, either from in-memory strings or from files on disk.
//!
//! # Supported Formats
//!
//! | Format | Extension | Read | Write | Notes |
//! |--------|-----------|------|-------|-------|
//! | Wavefront OBJ | `.obj` | ✓ | ✓ | Per-corner `vt`/`vn` attributes are read |
//! | Object File Format | `.off` | ✓ | ✓ | Polygonal faces, 0-based indices |
//!
//! Extensions are matched case-insensitively. Anything else fails with
//! [`MeshError::UnsupportedFormat`].
//!
//! Faces that cannot be inserted (repeated vertices, an oriented edge already
//! in use) are logged and skipped; a face referencing a vertex that does not
//! exist fails the whole read.
//!
//! # Usage
//!
//! ```no_run
//! use meshdiv::io::{load, save};
//! use meshdiv::mesh::HalfEdgeMesh;
//!
//! // Load with automatic format detection
//! let mesh: HalfEdgeMesh = load("model.off").unwrap();
//!
//! // Save with automatic format detection
//! save(&mesh, "output.obj").unwrap();
//! ```
//!
//! The text-level functions select the codec from a file name without
//! touching the filesystem:
//!
//! ```
//! use meshdiv::io;
//! use meshdiv::mesh::HalfEdgeMesh;
//!
//! let text = "OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
//! let mesh: HalfEdgeMesh = io::read("triangle.off", text).unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//!
//! let obj = io::write(&mesh, "triangle.obj").unwrap();
//! assert!(obj.contains("f 1 2 3"));
//! ```

pub mod obj;
pub mod off;

use std::path::Path;
use std::str::FromStr;

use nalgebra::{Point3, Vector2, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{ensure_fits, HalfEdgeMesh, MeshBuilder, MeshIndex};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Wavefront OBJ format.
    Obj,
    /// Object File Format.
    Off,
}

impl Format {
    /// Detect format from file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "obj" => Some(Format::Obj),
            "off" => Some(Format::Off),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

fn detect(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default(),
    })
}

/// Parse mesh text, choosing the codec from `filename`'s extension.
pub fn read<I: MeshIndex>(filename: &str, content: &str) -> Result<HalfEdgeMesh<I>> {
    match detect(Path::new(filename))? {
        Format::Obj => obj::read_obj(content),
        Format::Off => off::read_off(content),
    }
}

/// Serialize a mesh, choosing the codec from `filename`'s extension.
pub fn write<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, filename: &str) -> Result<String> {
    match detect(Path::new(filename))? {
        Format::Obj => Ok(obj::write_obj(mesh)),
        Format::Off => Ok(off::write_off(mesh)),
    }
}

/// Load a mesh from a file with automatic format detection.
///
/// The format is determined by the file extension.
///
/// # Example
///
/// ```no_run
/// use meshdiv::io::load;
/// use meshdiv::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<HalfEdgeMesh<I>> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::load(path),
        Format::Off => off::load(path),
    }
}

/// Save a mesh to a file with automatic format detection.
///
/// The format is determined by the file extension.
///
/// # Example
///
/// ```no_run
/// use meshdiv::io::save;
/// use meshdiv::mesh::HalfEdgeMesh;
///
/// let mesh: HalfEdgeMesh = HalfEdgeMesh::new();
/// save(&mesh, "output.off").unwrap();
/// ```
pub fn save<P: AsRef<Path>, I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: P) -> Result<()> {
    let path = path.as_ref();
    match detect(path)? {
        Format::Obj => obj::save(mesh, path),
        Format::Off => off::save(mesh, path),
    }
}

/// A face as parsed from text, before insertion.
struct FaceRecord {
    /// 1-based source line, for diagnostics.
    line: usize,
    indices: Vec<usize>,
    normals: Option<Vec<Vector3<f64>>>,
    texcoords: Option<Vec<Vector2<f64>>>,
}

impl FaceRecord {
    fn new(line: usize, indices: Vec<usize>) -> Self {
        Self {
            line,
            indices,
            normals: None,
            texcoords: None,
        }
    }
}

/// Build a mesh from parsed points and faces.
///
/// Points are attached after all faces are in, so every point gets a vertex
/// even if no face references it. Faces the builder rejects are skipped,
/// except for [`MeshError::IndexOverflow`], which aborts the read.
fn assemble<I: MeshIndex>(
    points: Vec<Point3<f64>>,
    faces: Vec<FaceRecord>,
) -> Result<HalfEdgeMesh<I>> {
    ensure_fits::<I>("vertices", points.len())?;
    let mut builder = MeshBuilder::with_capacity(points.len(), faces.len());
    let mut skipped = 0usize;

    for (face, record) in faces.iter().enumerate() {
        if let Some(&vertex) = record.indices.iter().find(|&&i| i >= points.len()) {
            return Err(MeshError::InvalidVertexIndex { face, vertex });
        }
        match builder.add_face(
            &record.indices,
            record.normals.as_deref(),
            record.texcoords.as_deref(),
        ) {
            Ok(_) => {}
            Err(e @ MeshError::IndexOverflow { .. }) => return Err(e),
            Err(e) => {
                log::warn!("line {}: skipping face: {}", record.line, e);
                skipped += 1;
            }
        }
    }

    for (i, p) in points.into_iter().enumerate() {
        builder.set_point(i, p);
    }

    let mesh = builder.finish();
    log::debug!(
        "assembled mesh: {} vertices, {} faces ({} skipped)",
        mesh.num_vertices(),
        mesh.num_faces(),
        skipped
    );
    Ok(mesh)
}

/// Parse the token at `index`, reporting `what` on failure.
fn parse_token<T: FromStr>(tokens: &[&str], index: usize, line: usize, what: &str) -> Result<T> {
    let token = tokens
        .get(index)
        .ok_or_else(|| MeshError::parse(line, format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| MeshError::parse(line, format!("invalid {} `{}`", what, token)))
}

fn parse_point(tokens: &[&str], first: usize, line: usize) -> Result<Point3<f64>> {
    Ok(Point3::new(
        parse_token(tokens, first, line, "x coordinate")?,
        parse_token(tokens, first + 1, line, "y coordinate")?,
        parse_token(tokens, first + 2, line, "z coordinate")?,
    ))
}
