//! Error types for meshbridge.
//!
//! This module defines all error types used by the converters and the
//! attribute-layer subsystem.

use thiserror::Error;

use crate::attr::{Domain, LayerKind};

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh conversion.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The flat mesh has no vertices, so there is nothing to read.
    #[error("flat mesh has no vertices")]
    EmptyInput,

    /// A polygon's edges do not form a closed boundary.
    #[error("polygon {polygon} has a malformed boundary: {reason}")]
    MalformedBoundary {
        /// The polygon index in the flat mesh (or face index when building directly).
        polygon: usize,
        /// What went wrong while walking the boundary.
        reason: &'static str,
    },

    /// Counted and visited element totals disagree while filling arrays.
    ///
    /// This always indicates a logic defect in the writer.
    #[error("{domain} count mismatch: allocated {expected}, visited {visited}")]
    CountMismatch {
        /// The domain being filled.
        domain: Domain,
        /// Number of elements the arrays were sized for.
        expected: usize,
        /// Number of elements actually written.
        visited: usize,
    },

    /// An element references an index outside of the target array.
    #[error("{domain} element {element} references index {index}, but only {len} exist")]
    IndexOutOfRange {
        /// The domain of the referencing element.
        domain: Domain,
        /// Index of the referencing element.
        element: usize,
        /// The out-of-range index.
        index: usize,
        /// Length of the referenced array.
        len: usize,
    },

    /// Polygon loop ranges do not partition the loop array.
    #[error("polygon {polygon} starts at loop {found}, expected {expected}")]
    LoopRangeGap {
        /// The polygon index.
        polygon: usize,
        /// The loop start that would keep the partition contiguous.
        expected: usize,
        /// The loop start actually stored.
        found: usize,
    },

    /// A flat domain holds more elements than the mesh's id type can address.
    #[error("{count} {domain} elements exceed the id limit of {max}")]
    TooManyElements {
        /// The overflowing domain.
        domain: Domain,
        /// Number of elements in the flat mesh.
        count: usize,
        /// Largest number of elements the id type can address.
        max: usize,
    },

    /// A value of the wrong kind was written into a layer.
    #[error("layer '{layer}' holds {expected:?} values, got {found:?}")]
    LayerKindMismatch {
        /// The layer name.
        layer: String,
        /// Kind registered for the layer.
        expected: LayerKind,
        /// Kind of the rejected value.
        found: LayerKind,
    },

    /// A layer with this name is already registered in the domain.
    #[error("layer '{name}' is already registered")]
    DuplicateLayer {
        /// The layer name.
        name: String,
    },
}

impl MeshError {
    /// Create a malformed boundary error.
    pub fn malformed(polygon: usize, reason: &'static str) -> Self {
        MeshError::MalformedBoundary { polygon, reason }
    }

    /// Check a visited count against the allocated count for a domain.
    pub(crate) fn check_count(domain: Domain, expected: usize, visited: usize) -> Result<()> {
        if expected == visited {
            Ok(())
        } else {
            Err(MeshError::CountMismatch {
                domain,
                expected,
                visited,
            })
        }
    }
}
