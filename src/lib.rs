//! # Meshbridge
//!
//! Bidirectional conversion between a flat, array-based mesh and an
//! editable, loop-based topological mesh.
//!
//! The flat form ([`flat::FlatMesh`]) is what gets stored: parallel arrays of
//! vertex, edge, polygon and loop records plus a legacy triangle/quad array
//! for consumers without n-gon support. The topological form
//! ([`mesh::TopoMesh`]) is what gets edited: faces of any arity with explicit
//! adjacency, sharing edge records between neighbouring faces.
//!
//! ## Features
//!
//! - **Reader**: flat arrays to topology, reusing the stored edges
//! - **Writer**: topology to flat arrays, with pluggable tessellation for the
//!   legacy face array
//! - **Attribute layers**: named, typed per-element payloads carried across
//!   both directions
//! - **Flexible indexing**: 16-bit, 32-bit and 64-bit element ids
//!
//! ## Quick Start
//!
//! ```
//! use meshbridge::prelude::*;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(2.0, 0.5, 0.0),
//! ];
//! let polygons = vec![vec![0usize, 1, 2, 3], vec![1, 4, 2]];
//! let flat = build_flat_mesh(&positions, &polygons).unwrap();
//!
//! // Enter edit mode
//! let mut mesh: TopoMesh = flat_to_topo(&flat, &ReadOptions::default()).unwrap();
//! assert_eq!(mesh.num_faces(), 2);
//!
//! // Edit, then commit
//! mesh.face_mut(FaceId::new(1)).flags |= ElemFlags::SMOOTH;
//! let out = topo_to_flat(&mesh, &WriteOptions::default()).unwrap();
//! assert_eq!(out.polys.len(), 2);
//! assert!(out.polys[1].flags.contains(meshbridge::flat::FaceFlags::SMOOTH));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod attr;
pub mod convert;
pub mod error;
pub mod flat;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use meshbridge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attr::{AttrValue, CustomData, Domain, LayerDef, LayerKind};
    pub use crate::convert::{
        flat_to_topo, read_flat_mesh, topo_to_flat, write_flat_mesh, ReadOptions,
        TessellationMethod, WriteOptions,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::flat::{build_flat_mesh, FlatMesh};
    pub use crate::mesh::{EdgeId, ElemFlags, FaceId, LoopId, MeshIndex, TopoMesh, VertexId};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
