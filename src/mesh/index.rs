//! Index types for mesh elements.
//!
//! Every entity of a [`HalfEdgeMesh`](super::HalfEdgeMesh) lives in a flat arena
//! and is addressed by a typed id. A reserved sentinel value plays the role of
//! "no element", e.g. the face of a boundary half-edge.

use std::fmt::{self, Debug};
use std::hash::Hash;

use crate::error::{MeshError, Result};

/// Integer types usable as mesh indices (`u16`, `u32`, `u64`).
pub trait MeshIndex:
    Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static
{
    /// Sentinel for a null index.
    const INVALID: Self;

    /// Convert from usize. Values that do not fit are a logic error; callers
    /// that grow arenas check [`max_count`](Self::max_count) first.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Largest number of elements of one kind a mesh can hold.
    #[inline]
    fn max_count() -> usize {
        Self::INVALID.to_usize()
    }
}

/// Fail with [`MeshError::IndexOverflow`] if `count` elements cannot be
/// addressed by `I`.
pub(crate) fn ensure_fits<I: MeshIndex>(element: &'static str, count: usize) -> Result<()> {
    let max = I::max_count();
    if count > max {
        return Err(MeshError::IndexOverflow {
            element,
            count,
            max,
        });
    }
    Ok(())
}

macro_rules! impl_mesh_index {
    ($($t:ty),*) => {
        $(
            impl MeshIndex for $t {
                const INVALID: Self = <$t>::MAX;

                #[inline]
                fn from_usize(v: usize) -> Self {
                    debug_assert!(
                        v < <$t>::MAX as usize,
                        "index {} too large for {}",
                        v,
                        stringify!($t)
                    );
                    v as $t
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_mesh_index!(u16, u32, u64);

/// Identifies a vertex.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// Identifies a half-edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId<I: MeshIndex = u32>(I);

/// Identifies an undirected edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

/// Identifies a face.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create an id from a dense arena position.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The null id.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Arena position of this id.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Whether this id refers to an element.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != I::INVALID
            }

            /// `Some(self)` when valid.
            #[inline]
            pub fn valid(self) -> Option<Self> {
                if self.is_valid() {
                    Some(self)
                } else {
                    None
                }
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(null)", $display)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl<I: MeshIndex> From<usize> for $name<I> {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "H");
impl_index_type!(EdgeId, "E");
impl_index_type!(FaceId, "F");
