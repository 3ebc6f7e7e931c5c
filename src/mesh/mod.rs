//! Editable topological mesh.
//!
//! The primary type is [`TopoMesh`], a loop-based boundary representation in
//! which faces may have any number of corners and adjacent faces share a
//! single [`Edge`] record.
//!
//! # Ids
//!
//! Elements are identified by typed ids:
//! - [`VertexId`] - a vertex
//! - [`EdgeId`] - an edge
//! - [`LoopId`] - one corner of one face
//! - [`FaceId`] - a face
//!
//! Ids are generic over the underlying integer ([`MeshIndex`]), so small meshes
//! can use `u16` and huge ones `u64`.
//!
//! # Construction
//!
//! ```
//! use meshbridge::mesh::TopoMesh;
//! use nalgebra::Point3;
//!
//! let mut mesh: TopoMesh = TopoMesh::new();
//! let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
//!
//! let ab = mesh.add_edge(a, b);
//! let bc = mesh.add_edge(b, c);
//! let ca = mesh.add_edge(c, a);
//! let f = mesh.add_ngon(a, b, &[ab, bc, ca]).unwrap();
//!
//! assert_eq!(mesh.face_len(f), 3);
//! assert!(mesh.is_valid());
//! ```

mod index;
mod topo;

pub use index::{EdgeId, FaceId, LoopId, MeshIndex, VertexId};
pub use topo::{
    Edge, ElemFlags, Face, FaceLoopIter, Loop, RadialLoopIter, TopoLayouts, TopoMesh, Vertex,
};
