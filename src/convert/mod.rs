//! Conversion between the flat and topological representations.
//!
//! - [`read_flat_mesh`] builds a [`TopoMesh`](crate::mesh::TopoMesh) from a
//!   [`FlatMesh`](crate::flat::FlatMesh) (entering edit mode)
//! - [`write_flat_mesh`] emits a flat mesh from a topological one
//!   (committing edits), including the legacy triangle/quad array
//!
//! Both converters build their result in a local value and only move it
//! into the destination once every step has succeeded.
//!
//! # Example
//!
//! ```
//! use meshbridge::convert::{flat_to_topo, topo_to_flat, ReadOptions, WriteOptions};
//! use meshbridge::flat::build_flat_mesh;
//! use meshbridge::mesh::TopoMesh;
//! use nalgebra::Point3;
//!
//! let positions = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let flat = build_flat_mesh(&positions, &[[0usize, 1, 2, 3]]).unwrap();
//!
//! let mesh: TopoMesh = flat_to_topo(&flat, &ReadOptions::default()).unwrap();
//! let back = topo_to_flat(&mesh, &WriteOptions::default()).unwrap();
//!
//! assert_eq!(back.faces.len(), 1);
//! assert!(back.faces[0].is_quad());
//! assert_eq!(back.polys[0].loop_count, 4);
//! ```

pub mod progress;
mod reader;
pub mod tessellate;
mod writer;

pub use reader::{flat_to_topo, read_flat_mesh, read_flat_mesh_with_progress};
pub use tessellate::{EarClipTessellator, FanTessellator, Piece, TessellationMethod, Tessellator};
pub use writer::{
    topo_to_flat, write_flat_mesh, write_flat_mesh_with_progress,
    write_flat_mesh_with_tessellator,
};

/// Options for [`read_flat_mesh`].
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Run [`FlatMesh::validate`](crate::flat::FlatMesh::validate) before
    /// creating any element (default: false, the input is trusted).
    pub validate: bool,
}

impl ReadOptions {
    /// Options that validate the input first.
    pub fn validated() -> Self {
        Self { validate: true }
    }

    /// Set whether to validate the input.
    pub fn with_validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

/// Options for [`write_flat_mesh`].
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Tessellator used for the legacy face array.
    pub tessellation: TessellationMethod,

    /// Whether to encode vertex and edge records in parallel (default: true).
    /// The output does not depend on this.
    pub parallel: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            tessellation: TessellationMethod::Fan,
            parallel: true,
        }
    }
}

impl WriteOptions {
    /// Set the tessellation method.
    pub fn with_tessellation(mut self, tessellation: TessellationMethod) -> Self {
        self.tessellation = tessellation;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}
