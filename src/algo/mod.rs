//! Mesh processing algorithms.
//!
//! - **Normals**: per-face and per-vertex normal estimation
//! - **Subdivision**: Loop subdivision, Catmull-Clark subdivision

pub mod normals;
pub mod subdivide;
