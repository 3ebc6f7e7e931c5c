//! Typed element ids for the topological mesh.
//!
//! Ids are thin wrappers around an integer chosen through [`MeshIndex`]
//! (`u16`, `u32` or `u64`), so a vertex id can never be passed where an edge
//! id is expected.

use std::fmt::{self, Debug};
use std::hash::Hash;

/// Integer types usable as element ids.
pub trait MeshIndex:
    Copy + Clone + Eq + PartialEq + Ord + PartialOrd + Hash + Debug + Send + Sync + 'static
{
    /// Largest id value that is not the null sentinel.
    const MAX: Self;

    /// Sentinel value marking an unset id.
    const INVALID: Self;

    /// Convert from usize.
    ///
    /// # Panics
    /// Debug builds panic if the value does not fit.
    fn from_usize(v: usize) -> Self;

    /// Convert to usize.
    fn to_usize(self) -> usize;

    /// Whether this is a real (non-sentinel) value.
    fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

macro_rules! impl_mesh_index {
    ($($t:ty),*) => {
        $(
            impl MeshIndex for $t {
                const MAX: Self = <$t>::MAX - 1;
                const INVALID: Self = <$t>::MAX;

                #[inline]
                fn from_usize(v: usize) -> Self {
                    debug_assert!(
                        v <= Self::MAX as usize,
                        "id {} too large for {}",
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

/// Id of a vertex.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId<I: MeshIndex = u32>(I);

/// Id of an edge.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId<I: MeshIndex = u32>(I);

/// Id of a loop (one corner of one face).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct LoopId<I: MeshIndex = u32>(I);

/// Id of a face.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId<I: MeshIndex = u32>(I);

macro_rules! impl_id_type {
    ($name:ident, $tag:literal) => {
        impl<I: MeshIndex> $name<I> {
            /// Create an id from a storage position.
            #[inline]
            pub fn new(index: usize) -> Self {
                Self(I::from_usize(index))
            }

            /// The null id.
            #[inline]
            pub fn invalid() -> Self {
                Self(I::INVALID)
            }

            /// Storage position of the element.
            #[inline]
            pub fn index(self) -> usize {
                self.0.to_usize()
            }

            /// Whether this id refers to an element.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0.is_valid()
            }
        }

        impl<I: MeshIndex> Debug for $name<I> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $tag, self.index())
                } else {
                    write!(f, "{}(-)", $tag)
                }
            }
        }

        impl<I: MeshIndex> Default for $name<I> {
            fn default() -> Self {
                Self::invalid()
            }
        }
    };
}

impl_id_type!(VertexId, "V");
impl_id_type!(EdgeId, "E");
impl_id_type!(LoopId, "L");
impl_id_type!(FaceId, "F");
