//! Flat mesh construction from polygon lists.

use std::collections::HashMap;

use nalgebra::Point3;

use super::{EdgeRecord, FlatMesh, LoopRecord, PolygonRecord, VertexRecord};
use crate::attr::{CustomData, Domain};
use crate::error::{MeshError, Result};

/// Build a flat mesh from vertex positions and polygons given as vertex index lists.
///
/// Polygon corners are listed in winding order. Edges are created in the
/// order they are first met, oriented the way that first polygon walks them;
/// polygons that walk the same vertex pair share that edge. The legacy face
/// array is left empty, and every domain starts with no layers.
///
/// # Example
/// ```
/// use meshbridge::flat::build_flat_mesh;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh = build_flat_mesh(&positions, &[vec![0usize, 1, 2, 3]]).unwrap();
/// assert_eq!(mesh.edges.len(), 4);
/// assert_eq!(mesh.loops.len(), 4);
/// ```
pub fn build_flat_mesh<P: AsRef<[usize]>>(
    positions: &[Point3<f32>],
    polygons: &[P],
) -> Result<FlatMesh> {
    for (pi, poly) in polygons.iter().enumerate() {
        let poly = poly.as_ref();
        if poly.len() < 3 {
            return Err(MeshError::malformed(pi, "polygon has fewer than three corners"));
        }
        for (ci, &vi) in poly.iter().enumerate() {
            if vi >= positions.len() {
                return Err(MeshError::IndexOutOfRange {
                    domain: Domain::Polygon,
                    element: pi,
                    index: vi,
                    len: positions.len(),
                });
            }
            if poly[..ci].contains(&vi) {
                return Err(MeshError::malformed(pi, "polygon repeats a vertex"));
            }
        }
    }

    let mut mesh = FlatMesh::new();
    mesh.verts = positions
        .iter()
        .map(|p| VertexRecord {
            position: [p.x, p.y, p.z],
            ..Default::default()
        })
        .collect();

    // Undirected vertex pair -> edge index
    let mut edge_map: HashMap<(usize, usize), u32> = HashMap::new();

    for poly in polygons {
        let poly = poly.as_ref();
        let n = poly.len();
        mesh.polys.push(PolygonRecord {
            loop_start: mesh.loops.len() as u32,
            loop_count: n as u32,
            ..Default::default()
        });

        for i in 0..n {
            let a = poly[i];
            let b = poly[(i + 1) % n];
            let key = (a.min(b), a.max(b));
            let next_index = mesh.edges.len() as u32;
            let edge = *edge_map.entry(key).or_insert_with(|| {
                mesh.edges.push(EdgeRecord {
                    v1: a as u32,
                    v2: b as u32,
                    ..Default::default()
                });
                next_index
            });
            mesh.loops.push(LoopRecord {
                vertex: a as u32,
                edge,
            });
        }
    }

    mesh.vdata = CustomData::new(mesh.verts.len());
    mesh.edata = CustomData::new(mesh.edges.len());
    mesh.ldata = CustomData::new(mesh.loops.len());
    mesh.pdata = CustomData::new(mesh.polys.len());

    Ok(mesh)
}
