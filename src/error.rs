//! Error types for meshdiv.
//!
//! Every fallible operation in the crate returns [`Result`]. All conditions are
//! local and recoverable by the caller; a failed call never leaves a partially
//! mutated mesh behind.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building, reading, writing or subdividing meshes.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A per-corner attribute list does not match the face's corner count.
    #[error("face has {expected} corners but {found} per-corner {attribute} were given")]
    SizeMismatch {
        /// Which attribute was inconsistent ("normals" or "texcoords").
        attribute: &'static str,
        /// Number of corners of the face.
        expected: usize,
        /// Number of attribute values supplied.
        found: usize,
    },

    /// A face would reuse an oriented half-edge already owned by another face.
    #[error("non-manifold edge ({v0}, {v1}): oriented half-edge already has a face")]
    NonManifoldEdge {
        /// Tail vertex of the oriented edge.
        v0: usize,
        /// Head vertex of the oriented edge.
        v1: usize,
    },

    /// A face has fewer than three corners or repeats a vertex.
    #[error("face {face} is degenerate: {reason}")]
    DegenerateFace {
        /// Index the face would have received.
        face: usize,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A face references a vertex that has no position.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// An OFF file did not start with the `OFF` keyword.
    #[error("bad magic: expected `OFF`, found `{found}`")]
    BadMagic {
        /// The first token actually found.
        found: String,
    },

    /// Malformed mesh text.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension, dot-prefixed when present.
        extension: String,
    },

    /// A face's degree is not accepted by the requested algorithm.
    #[error("face {face} has degree {degree}, but {scheme} requires degree {expected}")]
    DegreeMismatch {
        /// The offending face.
        face: usize,
        /// Its degree.
        degree: usize,
        /// The degree the scheme requires.
        expected: usize,
        /// Name of the scheme.
        scheme: &'static str,
    },

    /// An element count does not fit in the mesh's index type.
    #[error("{count} {element} exceed the index type's capacity of {max}")]
    IndexOverflow {
        /// Which arena would overflow.
        element: &'static str,
        /// Number of elements required.
        count: usize,
        /// Largest count the index type can address.
        max: usize,
    },

    /// The mesh connectivity is not a 2-manifold, e.g. two fans of faces
    /// meeting at a single vertex.
    #[error("mesh is not manifold")]
    NonManifoldMesh,

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MeshError {
    /// Create a parse error for the given 1-based line.
    pub fn parse<T: std::fmt::Display>(line: usize, message: T) -> Self {
        MeshError::Parse {
            line,
            message: message.to_string(),
        }
    }
}
