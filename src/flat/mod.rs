//! Flat array mesh.
//!
//! The persistent representation: parallel arrays of plain records plus one
//! [`CustomData`] per domain.
//!
//! - `verts` / `edges` hold geometry and edge connectivity
//! - `polys` index contiguous ranges of `loops`; each loop names the corner
//!   vertex and the edge leading to the next corner
//! - `faces` is a derived legacy array of triangles and quads (`v4 == 0`
//!   marks a triangle) for consumers without n-gon support
//!
//! Records store indices as `u32` and weights and normals as bytes (see
//! [`encode`]).

mod builder;
pub mod encode;

pub use builder::build_flat_mesh;

use bitflags::bitflags;

use crate::attr::{CustomData, Domain, QUAD_ROTATION, TRI_ROTATION};
use crate::error::{MeshError, Result};

bitflags! {
    /// Vertex record flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VertFlags: u8 {
        /// Selected.
        const SELECT = 1 << 0;
        /// Hidden.
        const HIDE = 1 << 4;
    }

    /// Edge record flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EdgeFlags: u16 {
        /// Selected.
        const SELECT = 1 << 0;
        /// UV seam.
        const SEAM = 1 << 2;
        /// Hidden.
        const HIDE = 1 << 4;
        /// Sharp.
        const SHARP = 1 << 9;
    }

    /// Legacy face and polygon record flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaceFlags: u8 {
        /// Smooth shaded.
        const SMOOTH = 1 << 0;
        /// Selected.
        const SELECT = 1 << 1;
        /// Hidden.
        const HIDE = 1 << 4;
    }
}

macro_rules! empty_default {
    ($($t:ty),*) => {
        $(
            impl Default for $t {
                fn default() -> Self {
                    Self::empty()
                }
            }
        )*
    };
}

empty_default!(VertFlags, EdgeFlags, FaceFlags);

/// A vertex record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VertexRecord {
    /// Position.
    pub position: [f32; 3],
    /// Normal, see [`encode::pack_normal`].
    pub normal: [i8; 3],
    /// Flags.
    pub flags: VertFlags,
    /// Bevel weight, see [`encode::pack_unit`].
    pub bevel_weight: u8,
}

/// An edge record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeRecord {
    /// First vertex index.
    pub v1: u32,
    /// Second vertex index.
    pub v2: u32,
    /// Flags.
    pub flags: EdgeFlags,
    /// Crease, see [`encode::pack_unit`].
    pub crease: u8,
    /// Bevel weight, see [`encode::pack_unit`].
    pub bevel_weight: u8,
}

/// A legacy triangle or quad.
///
/// A triangle stores `v4 == 0`. Faces with fewer than three corners only set
/// `v1` and `v2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyFaceRecord {
    /// First corner vertex index.
    pub v1: u32,
    /// Second corner vertex index.
    pub v2: u32,
    /// Third corner vertex index.
    pub v3: u32,
    /// Fourth corner vertex index, 0 for triangles.
    pub v4: u32,
    /// Material slot.
    pub material: i16,
    /// Flags.
    pub flags: FaceFlags,
}

impl LegacyFaceRecord {
    /// Whether this record is a quad.
    pub fn is_quad(&self) -> bool {
        self.v4 != 0
    }
}

/// An n-gon polygon: a range of the loop array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolygonRecord {
    /// First loop of the polygon.
    pub loop_start: u32,
    /// Number of loops (corners).
    pub loop_count: u32,
    /// Material slot.
    pub material: i16,
    /// Flags.
    pub flags: FaceFlags,
}

impl PolygonRecord {
    /// The loop index range of this polygon.
    pub fn loop_range(&self) -> std::ops::Range<usize> {
        let start = self.loop_start as usize;
        start..start + self.loop_count as usize
    }
}

/// One polygon corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopRecord {
    /// Corner vertex index.
    pub vertex: u32,
    /// Index of the edge from this corner to the next.
    pub edge: u32,
}

/// The flat mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatMesh {
    /// Vertex records.
    pub verts: Vec<VertexRecord>,
    /// Edge records.
    pub edges: Vec<EdgeRecord>,
    /// Legacy face records.
    pub faces: Vec<LegacyFaceRecord>,
    /// Loop records.
    pub loops: Vec<LoopRecord>,
    /// Polygon records.
    pub polys: Vec<PolygonRecord>,
    /// Vertex layers.
    pub vdata: CustomData,
    /// Edge layers.
    pub edata: CustomData,
    /// Legacy face layers.
    pub fdata: CustomData,
    /// Loop layers.
    pub ldata: CustomData,
    /// Polygon layers.
    pub pdata: CustomData,
}

impl FlatMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the mesh has no vertices.
    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    /// Layer storage of a domain.
    pub fn data(&self, domain: Domain) -> &CustomData {
        match domain {
            Domain::Vertex => &self.vdata,
            Domain::Edge => &self.edata,
            Domain::Face => &self.fdata,
            Domain::Loop => &self.ldata,
            Domain::Polygon => &self.pdata,
        }
    }

    /// Mutable layer storage of a domain.
    pub fn data_mut(&mut self, domain: Domain) -> &mut CustomData {
        match domain {
            Domain::Vertex => &mut self.vdata,
            Domain::Edge => &mut self.edata,
            Domain::Face => &mut self.fdata,
            Domain::Loop => &mut self.ldata,
            Domain::Polygon => &mut self.pdata,
        }
    }

    /// The loops of a polygon.
    pub fn polygon_loops(&self, poly: usize) -> &[LoopRecord] {
        &self.loops[self.polys[poly].loop_range()]
    }

    /// Corner vertex indices of a polygon in winding order.
    pub fn polygon_vertices(&self, poly: usize) -> impl Iterator<Item = u32> + '_ {
        self.polygon_loops(poly).iter().map(|l| l.vertex)
    }

    /// Check structural invariants.
    ///
    /// - edge and loop vertex indices are in range
    /// - loop edge indices are in range
    /// - polygon loop ranges partition the loop array in order
    /// - legacy face vertex indices are in range
    /// - every layer store matches its array length
    pub fn validate(&self) -> Result<()> {
        let nv = self.verts.len();
        let ne = self.edges.len();

        for (i, e) in self.edges.iter().enumerate() {
            check_index(Domain::Edge, i, e.v1, nv)?;
            check_index(Domain::Edge, i, e.v2, nv)?;
        }

        let mut next = 0usize;
        for (i, p) in self.polys.iter().enumerate() {
            if p.loop_start as usize != next {
                return Err(MeshError::LoopRangeGap {
                    polygon: i,
                    expected: next,
                    found: p.loop_start as usize,
                });
            }
            if p.loop_count == 0 {
                return Err(MeshError::malformed(i, "polygon has no loops"));
            }
            next += p.loop_count as usize;
        }
        if next != self.loops.len() {
            return Err(MeshError::LoopRangeGap {
                polygon: self.polys.len(),
                expected: next,
                found: self.loops.len(),
            });
        }

        for (i, l) in self.loops.iter().enumerate() {
            check_index(Domain::Loop, i, l.vertex, nv)?;
            check_index(Domain::Loop, i, l.edge, ne)?;
        }

        for (i, f) in self.faces.iter().enumerate() {
            for v in [f.v1, f.v2, f.v3, f.v4] {
                check_index(Domain::Face, i, v, nv)?;
            }
        }

        let lens = [
            (Domain::Vertex, nv),
            (Domain::Edge, ne),
            (Domain::Face, self.faces.len()),
            (Domain::Loop, self.loops.len()),
            (Domain::Polygon, self.polys.len()),
        ];
        for (domain, len) in lens {
            MeshError::check_count(domain, len, self.data(domain).len())?;
        }

        Ok(())
    }

    /// Move a zero vertex index away from the last corner of a legacy face.
    ///
    /// A quad with `v3 == 0` or `v4 == 0` is rotated by two corners; a
    /// triangle with `v3 == 0` is rotated by one. Corner layers of the face
    /// are permuted the same way so every corner keeps its data.
    pub fn normalize_face_corners(&mut self, face: usize, corners: usize) {
        let f = &mut self.faces[face];
        match corners {
            4 if f.v3 == 0 || f.v4 == 0 => {
                std::mem::swap(&mut f.v1, &mut f.v3);
                std::mem::swap(&mut f.v2, &mut f.v4);
                self.fdata.swap_corners(face, &QUAD_ROTATION);
            }
            3 if f.v3 == 0 => {
                let [a, b, c] = [f.v1, f.v2, f.v3];
                f.v1 = b;
                f.v2 = c;
                f.v3 = a;
                self.fdata.swap_corners(face, &TRI_ROTATION);
            }
            _ => {}
        }
    }
}

fn check_index(domain: Domain, element: usize, index: u32, len: usize) -> Result<()> {
    if (index as usize) < len {
        Ok(())
    } else {
        Err(MeshError::IndexOutOfRange {
            domain,
            element,
            index: index as usize,
            len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{AttrValue, LayerDef, LayerKind};

    fn quad_mesh() -> FlatMesh {
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        let mut mesh = FlatMesh::new();
        mesh.verts = positions
            .iter()
            .map(|&position| VertexRecord {
                position,
                ..Default::default()
            })
            .collect();
        mesh.edges = (0..4)
            .map(|i| EdgeRecord {
                v1: i,
                v2: (i + 1) % 4,
                ..Default::default()
            })
            .collect();
        mesh.loops = (0..4).map(|i| LoopRecord { vertex: i, edge: i }).collect();
        mesh.polys = vec![PolygonRecord {
            loop_start: 0,
            loop_count: 4,
            ..Default::default()
        }];
        mesh.vdata = CustomData::new(4);
        mesh.edata = CustomData::new(4);
        mesh.ldata = CustomData::new(4);
        mesh.pdata = CustomData::new(1);
        mesh
    }

    #[test]
    fn test_validate_ok() {
        let mesh = quad_mesh();
        mesh.validate().unwrap();
        assert_eq!(mesh.polygon_vertices(0).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_validate_index_out_of_range() {
        let mut mesh = quad_mesh();
        mesh.loops[2].edge = 9;
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange {
                domain: Domain::Loop,
                element: 2,
                index: 9,
                len: 4,
            })
        );
    }

    #[test]
    fn test_validate_loop_gap() {
        let mut mesh = quad_mesh();
        mesh.polys[0].loop_count = 3;
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::LoopRangeGap { .. })
        ));
    }

    #[test]
    fn test_validate_layer_length() {
        let mut mesh = quad_mesh();
        mesh.vdata.resize(3);
        assert!(matches!(
            mesh.validate(),
            Err(MeshError::CountMismatch {
                domain: Domain::Vertex,
                ..
            })
        ));
    }

    #[test]
    fn test_normalize_quad() {
        let mut mesh = FlatMesh::new();
        mesh.faces.push(LegacyFaceRecord {
            v1: 5,
            v2: 6,
            v3: 7,
            v4: 0,
            ..Default::default()
        });
        mesh.fdata = CustomData::new(1);
        let uv = mesh
            .fdata
            .add_corner_layer(LayerDef::new("uv", LayerKind::Float2))
            .unwrap();
        for c in 0..4 {
            mesh.fdata
                .set_corner(uv, 0, c, AttrValue::Float2([c as f32, 0.0]))
                .unwrap();
        }

        mesh.normalize_face_corners(0, 4);

        let f = mesh.faces[0];
        assert_eq!([f.v1, f.v2, f.v3, f.v4], [7, 0, 5, 6]);
        assert!(f.is_quad());
        // Corner 3 now holds what corner 1 held (vertex 6).
        assert_eq!(mesh.fdata.get_corner(uv, 0, 3), &AttrValue::Float2([1.0, 0.0]));
    }

    #[test]
    fn test_normalize_leaves_good_faces() {
        let mut mesh = FlatMesh::new();
        let quad = LegacyFaceRecord {
            v1: 0,
            v2: 1,
            v3: 2,
            v4: 3,
            ..Default::default()
        };
        mesh.faces.push(quad);
        mesh.fdata = CustomData::new(1);
        mesh.normalize_face_corners(0, 4);
        assert_eq!(mesh.faces[0], quad);
    }

    #[test]
    fn test_normalize_triangle() {
        let mut mesh = FlatMesh::new();
        mesh.faces.push(LegacyFaceRecord {
            v1: 4,
            v2: 2,
            v3: 0,
            v4: 0,
            ..Default::default()
        });
        mesh.fdata = CustomData::new(1);
        mesh.normalize_face_corners(0, 3);
        let f = mesh.faces[0];
        assert_eq!([f.v1, f.v2, f.v3], [2, 0, 4]);
    }
}
