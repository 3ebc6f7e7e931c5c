//! Topological mesh to flat array mesh.
//!
//! The writer runs a fixed pipeline:
//!
//! 1. Build a tessellated duplicate (triangles and quads only)
//! 2. Size every array and layer store from the element counts
//! 3. Emit vertices, then edges, then legacy faces from the duplicate
//! 4. Emit polygons and loops from the original faces
//!
//! Vertex and edge numbering is fixed by iteration order and recorded in
//! side tables for the duration of the call. The duplicate gets its own
//! vertex table. Nothing is written to the destination until every array is
//! complete.

use log::{debug, trace, warn};
use rayon::prelude::*;

use super::progress::{Progress, Steps};
use super::tessellate::{tessellated_copy, Tessellator};
use super::WriteOptions;
use crate::attr::bridge::{block_to_flat, block_to_flat_corner, LayerMap};
use crate::attr::{CustomData, Domain, LEGACY_CORNERS};
use crate::error::{MeshError, Result};
use crate::flat::encode::{pack_normal, pack_unit};
use crate::flat::{
    EdgeFlags, EdgeRecord, FaceFlags, FlatMesh, LegacyFaceRecord, LoopRecord, PolygonRecord,
    VertFlags, VertexRecord,
};
use crate::mesh::{Edge, EdgeId, ElemFlags, LoopId, MeshIndex, TopoMesh, Vertex, VertexId};

const STEPS: usize = 5;

/// Write a topological mesh into a flat mesh.
///
/// Every array and layer of `dest` is replaced. Faces are tessellated with
/// `options.tessellation` for the legacy face array; the polygon and loop
/// arrays keep the original faces.
///
/// # Example
/// ```
/// use meshbridge::convert::{write_flat_mesh, WriteOptions};
/// use meshbridge::flat::FlatMesh;
/// use meshbridge::mesh::TopoMesh;
/// use nalgebra::Point3;
///
/// let mut mesh: TopoMesh = TopoMesh::new();
/// let v: Vec<_> = (0..5)
///     .map(|i| {
///         let t = i as f32 / 5.0 * std::f32::consts::TAU;
///         mesh.add_vertex(Point3::new(t.cos(), t.sin(), 0.0))
///     })
///     .collect();
/// let e: Vec<_> = (0..5).map(|i| mesh.add_edge(v[i], v[(i + 1) % 5])).collect();
/// mesh.add_ngon(v[0], v[1], &e).unwrap();
///
/// let mut flat = FlatMesh::new();
/// write_flat_mesh(&mesh, &mut flat, &WriteOptions::default()).unwrap();
/// assert_eq!(flat.polys.len(), 1);
/// assert_eq!(flat.polys[0].loop_count, 5);
/// assert_eq!(flat.faces.len(), 3);
/// ```
pub fn write_flat_mesh<I: MeshIndex>(
    mesh: &TopoMesh<I>,
    dest: &mut FlatMesh,
    options: &WriteOptions,
) -> Result<()> {
    write_flat_mesh_with_progress(mesh, dest, options, &Progress::none())
}

/// Write a topological mesh into a new flat mesh.
pub fn topo_to_flat<I: MeshIndex>(mesh: &TopoMesh<I>, options: &WriteOptions) -> Result<FlatMesh> {
    let mut flat = FlatMesh::new();
    write_flat_mesh(mesh, &mut flat, options)?;
    Ok(flat)
}

/// [`write_flat_mesh`] with progress reporting.
pub fn write_flat_mesh_with_progress<I: MeshIndex>(
    mesh: &TopoMesh<I>,
    dest: &mut FlatMesh,
    options: &WriteOptions,
    progress: &Progress,
) -> Result<()> {
    let tessellator = options.tessellation.tessellator();
    write_impl(mesh, dest, tessellator.as_ref(), options.parallel, progress)
}

/// [`write_flat_mesh`] with a caller-supplied tessellator.
///
/// `options.tessellation` is ignored.
pub fn write_flat_mesh_with_tessellator<I: MeshIndex>(
    mesh: &TopoMesh<I>,
    dest: &mut FlatMesh,
    tessellator: &dyn Tessellator,
    options: &WriteOptions,
) -> Result<()> {
    write_impl(mesh, dest, tessellator, options.parallel, &Progress::none())
}

fn write_impl<I: MeshIndex>(
    mesh: &TopoMesh<I>,
    dest: &mut FlatMesh,
    tessellator: &dyn Tessellator,
    parallel: bool,
    progress: &Progress,
) -> Result<()> {
    let mut steps = Steps::new(progress, STEPS);

    let tess = tessellated_copy(mesh, tessellator);
    steps.tick("tessellate");

    let nv = mesh.num_vertices();
    let ne = mesh.num_edges();
    let nf = mesh.num_faces();
    let ntess = tess.num_faces();
    let nloops: usize = mesh.faces().map(|(_, f)| f.len()).sum();

    // ==================== Layer stores ====================

    let layouts = mesh.layouts();
    let mut out = FlatMesh {
        verts: Vec::with_capacity(nv),
        edges: Vec::with_capacity(ne),
        faces: Vec::with_capacity(ntess),
        loops: vec![LoopRecord::default(); nloops],
        polys: Vec::with_capacity(nf),
        vdata: CustomData::from_layout(&layouts.verts, nv),
        edata: CustomData::from_layout(&layouts.edges, ne),
        fdata: CustomData::from_layout(&layouts.faces, ntess),
        ldata: CustomData::from_layout(&layouts.loops, nloops),
        pdata: CustomData::from_layout(&layouts.faces, nf),
    };
    for def in layouts.loops.iter() {
        if out.fdata.find(&def.name).is_some() {
            warn!(
                "loop layer '{}' clashes with a face layer, not written to legacy faces",
                def.name
            );
            continue;
        }
        out.fdata.add_corner_layer(def.clone())?;
    }

    let vmap = LayerMap::layout_to_flat(&layouts.verts, &out.vdata, 1);
    let emap = LayerMap::layout_to_flat(&layouts.edges, &out.edata, 1);
    let lmap = LayerMap::layout_to_flat(&layouts.loops, &out.ldata, 1);
    let pmap = LayerMap::layout_to_flat(&layouts.faces, &out.pdata, 1);
    let face_map = LayerMap::layout_to_flat(&tess.layouts().faces, &out.fdata, 1);
    let corner_map = LayerMap::layout_to_flat(&tess.layouts().loops, &out.fdata, LEGACY_CORNERS);

    // ==================== Vertices ====================

    let vindex = scratch_index(mesh.vertex_ids().map(|v| v.index()), nv);
    let tindex = scratch_index(tess.vertex_ids().map(|v| v.index()), tess.num_vertices());

    out.verts = if parallel {
        (0..nv)
            .into_par_iter()
            .map(|i| vertex_record(mesh.vertex(VertexId::new(i))))
            .collect()
    } else {
        mesh.vertices().map(|(_, v)| vertex_record(v)).collect()
    };
    for (id, v) in mesh.vertices() {
        block_to_flat(&v.data, &vmap, &mut out.vdata, vindex[id.index()] as usize);
    }
    MeshError::check_count(Domain::Vertex, nv, out.verts.len())?;
    steps.tick("vertices");

    // ==================== Edges ====================

    let eindex = scratch_index(mesh.edge_ids().map(|e| e.index()), ne);

    out.edges = if parallel {
        (0..ne)
            .into_par_iter()
            .map(|i| edge_record(mesh.edge(EdgeId::new(i)), &vindex))
            .collect()
    } else {
        mesh.edges().map(|(_, e)| edge_record(e, &vindex)).collect()
    };
    for (id, e) in mesh.edges() {
        block_to_flat(&e.data, &emap, &mut out.edata, eindex[id.index()] as usize);
    }
    MeshError::check_count(Domain::Edge, ne, out.edges.len())?;
    steps.tick("edges");

    // ==================== Legacy faces ====================

    for (fid, f) in tess.faces() {
        let i = out.faces.len();
        let mut rec = LegacyFaceRecord {
            material: f.material,
            flags: face_record_flags(f.flags),
            ..Default::default()
        };

        block_to_flat(&f.data, &face_map, &mut out.fdata, i);
        for (c, l) in tess.face_loops(fid).take(LEGACY_CORNERS).enumerate() {
            block_to_flat_corner(&tess.corner(l).data, &corner_map, &mut out.fdata, i, c);
        }

        if f.is_empty() {
            warn!("legacy face {} has no corners", i);
            out.faces.push(rec);
            continue;
        }

        let l1 = f.base();
        let l2 = tess.corner(l1).next();
        let l3 = tess.corner(l2).next();
        let l4 = tess.corner(l3).next();
        let vert = |l: LoopId<I>| tindex[tess.corner(l).vert().index()];

        rec.v1 = vert(l1);
        rec.v2 = vert(l2);
        match f.len() {
            1 | 2 => {
                warn!("legacy face {} has only {} corners", i, f.len());
                out.faces.push(rec);
            }
            3 => {
                rec.v3 = vert(l3);
                rec.v4 = 0;
                out.faces.push(rec);
            }
            _ => {
                rec.v3 = vert(l3);
                rec.v4 = vert(l4);
                out.faces.push(rec);
                out.normalize_face_corners(i, 4);
            }
        }
    }
    MeshError::check_count(Domain::Face, ntess, out.faces.len())?;
    trace!("legacy faces from {} tessellated faces", ntess);
    steps.tick("legacy faces");

    // ==================== Polygons and loops ====================

    let mut cursor = 0usize;
    for (fid, f) in mesh.faces() {
        let pi = out.polys.len();
        out.polys.push(PolygonRecord {
            loop_start: cursor as u32,
            loop_count: f.len() as u32,
            material: f.material,
            flags: face_record_flags(f.flags),
        });
        block_to_flat(&f.data, &pmap, &mut out.pdata, pi);

        for l in mesh.face_loops(fid) {
            let corner = mesh.corner(l);
            let slot = out
                .loops
                .get_mut(cursor)
                .ok_or(MeshError::CountMismatch {
                    domain: Domain::Loop,
                    expected: nloops,
                    visited: cursor + 1,
                })?;
            *slot = LoopRecord {
                vertex: vindex[corner.vert().index()],
                edge: eindex[corner.edge().index()],
            };
            block_to_flat(&corner.data, &lmap, &mut out.ldata, cursor);
            cursor += 1;
        }
    }
    MeshError::check_count(Domain::Polygon, nf, out.polys.len())?;
    MeshError::check_count(Domain::Loop, nloops, cursor)?;
    steps.tick("polygons");

    drop(tess);

    debug!(
        "wrote flat mesh: {} vertices, {} edges, {} legacy faces, {} polygons, {} loops",
        out.verts.len(),
        out.edges.len(),
        out.faces.len(),
        out.polys.len(),
        out.loops.len()
    );

    *dest = out;
    Ok(())
}

/// Sequential index of every element, keyed by element id.
fn scratch_index(ids: impl Iterator<Item = usize>, len: usize) -> Vec<u32> {
    let mut table = vec![0u32; len];
    for (i, id) in ids.enumerate() {
        table[id] = i as u32;
    }
    table
}

fn vertex_record(v: &Vertex) -> VertexRecord {
    let mut flags = VertFlags::empty();
    flags.set(VertFlags::SELECT, v.flags.contains(ElemFlags::SELECT));
    flags.set(VertFlags::HIDE, v.flags.contains(ElemFlags::HIDDEN));
    VertexRecord {
        position: [v.position.x, v.position.y, v.position.z],
        normal: pack_normal(&v.normal),
        flags,
        bevel_weight: pack_unit(v.bevel_weight),
    }
}

fn edge_record<I: MeshIndex>(e: &Edge<I>, vindex: &[u32]) -> EdgeRecord {
    EdgeRecord {
        v1: vindex[e.v1().index()],
        v2: vindex[e.v2().index()],
        flags: edge_record_flags(e.flags),
        crease: pack_unit(e.crease),
        bevel_weight: pack_unit(e.bevel_weight),
    }
}

/// Sharp and seam are crossed: flat `SEAM` mirrors topological `SHARP` and
/// flat `SHARP` mirrors topological `SEAM`. The reader maps them straight.
fn edge_record_flags(f: ElemFlags) -> EdgeFlags {
    let mut out = EdgeFlags::empty();
    out.set(EdgeFlags::SELECT, f.contains(ElemFlags::SELECT));
    out.set(EdgeFlags::HIDE, f.contains(ElemFlags::HIDDEN));
    out.set(EdgeFlags::SEAM, f.contains(ElemFlags::SHARP));
    out.set(EdgeFlags::SHARP, f.contains(ElemFlags::SEAM));
    out
}

fn face_record_flags(f: ElemFlags) -> FaceFlags {
    let mut out = FaceFlags::empty();
    out.set(FaceFlags::SELECT, f.contains(ElemFlags::SELECT));
    out.set(FaceFlags::HIDE, f.contains(ElemFlags::HIDDEN));
    out.set(FaceFlags::SMOOTH, f.contains(ElemFlags::SMOOTH));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{AttrValue, LayerDef, LayerKind};
    use crate::convert::TessellationMethod;
    use crate::mesh::FaceId;
    use nalgebra::{Point3, Vector3};

    /// A triangle (0, 1, 2) next to a quad (1, 3, 4, 2).
    fn tri_and_quad() -> TopoMesh {
        let mut mesh = TopoMesh::new();
        let v: Vec<VertexId> = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.5, 1.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 1.0, 0.0],
        ]
        .iter()
        .map(|p| mesh.add_vertex(Point3::new(p[0], p[1], p[2])))
        .collect();

        let e01 = mesh.add_edge(v[0], v[1]);
        let e12 = mesh.add_edge(v[1], v[2]);
        let e20 = mesh.add_edge(v[2], v[0]);
        let e13 = mesh.add_edge(v[1], v[3]);
        let e34 = mesh.add_edge(v[3], v[4]);
        let e42 = mesh.add_edge(v[4], v[2]);

        mesh.add_ngon(v[0], v[1], &[e01, e12, e20]).unwrap();
        mesh.add_ngon(v[1], v[3], &[e13, e34, e42, e12]).unwrap();
        mesh
    }

    #[test]
    fn test_counts() {
        let flat = topo_to_flat(&tri_and_quad(), &WriteOptions::default()).unwrap();
        assert_eq!(flat.verts.len(), 5);
        assert_eq!(flat.edges.len(), 6);
        assert_eq!(flat.faces.len(), 2);
        assert_eq!(flat.polys.len(), 2);
        assert_eq!(flat.loops.len(), 7);
        flat.validate().unwrap();

        // Triangle marker and quad.
        assert_eq!(flat.faces[0].v4, 0);
        assert!(flat.faces[1].is_quad());
        assert_eq!(flat.polys[1].loop_start, 3);
        assert_eq!(flat.polys[1].loop_count, 4);
    }

    #[test]
    fn test_loop_records() {
        let flat = topo_to_flat(&tri_and_quad(), &WriteOptions::default()).unwrap();
        let verts: Vec<u32> = flat.polygon_vertices(1).collect();
        assert_eq!(verts, vec![1, 3, 4, 2]);
        for l in &flat.loops {
            let e = flat.edges[l.edge as usize];
            assert!(e.v1 == l.vertex || e.v2 == l.vertex);
        }
    }

    #[test]
    fn test_sharp_seam_cross() {
        let mut mesh = tri_and_quad();
        mesh.edge_mut(EdgeId::new(0)).flags = ElemFlags::SHARP;
        mesh.edge_mut(EdgeId::new(1)).flags = ElemFlags::SEAM | ElemFlags::SELECT;

        let flat = topo_to_flat(&mesh, &WriteOptions::default()).unwrap();
        assert_eq!(flat.edges[0].flags, EdgeFlags::SEAM);
        assert_eq!(flat.edges[1].flags, EdgeFlags::SHARP | EdgeFlags::SELECT);
        assert_eq!(flat.edges[2].flags, EdgeFlags::empty());
    }

    #[test]
    fn test_quad_starting_at_vertex_zero() {
        let mut mesh = TopoMesh::<u32>::new();
        let v: Vec<VertexId> = (0..4)
            .map(|i| {
                let p = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]][i];
                mesh.add_vertex(Point3::new(p[0], p[1], 0.0))
            })
            .collect();
        let e: Vec<EdgeId> = (0..4).map(|i| mesh.add_edge(v[i], v[(i + 1) % 4])).collect();
        // Start at vertex 1 so that vertex 0 lands on the fourth corner.
        mesh.add_ngon(v[1], v[2], &[e[1], e[2], e[3], e[0]]).unwrap();
        let uv = mesh
            .add_loop_layer(LayerDef::new("uv", LayerKind::Float2))
            .unwrap();
        let layout = mesh.layouts().loops.clone();
        let loops: Vec<_> = mesh.face_loops(FaceId::new(0)).collect();
        for l in loops {
            let i = mesh.corner(l).vert().index() as f32;
            mesh.corner_mut(l)
                .data
                .set(&layout, uv, AttrValue::Float2([i, 0.0]))
                .unwrap();
        }

        let flat = topo_to_flat(&mesh, &WriteOptions::default()).unwrap();
        let f = flat.faces[0];
        assert_ne!(f.v4, 0);
        assert_eq!([f.v1, f.v2, f.v3, f.v4], [3, 0, 1, 2]);

        // Corner layer values moved with their vertices.
        let layer = flat.fdata.find("uv").unwrap();
        for (c, v) in [f.v1, f.v2, f.v3, f.v4].into_iter().enumerate() {
            assert_eq!(
                flat.fdata.get_corner(layer, 0, c),
                &AttrValue::Float2([v as f32, 0.0])
            );
        }
    }

    #[test]
    fn test_ngon_tessellation() {
        let mut mesh = TopoMesh::<u32>::new();
        let n = 8;
        let v: Vec<VertexId> = (0..n)
            .map(|i| {
                let t = i as f32 / n as f32 * std::f32::consts::TAU;
                mesh.add_vertex(Point3::new(t.cos(), t.sin(), 0.0))
            })
            .collect();
        let e: Vec<EdgeId> = (0..n).map(|i| mesh.add_edge(v[i], v[(i + 1) % n])).collect();
        mesh.add_ngon(v[0], v[1], &e).unwrap();

        for method in [TessellationMethod::Fan, TessellationMethod::EarClip] {
            let options = WriteOptions::default().with_tessellation(method);
            let flat = topo_to_flat(&mesh, &options).unwrap();
            assert_eq!(flat.faces.len(), n - 2);
            assert_eq!(flat.polys[0].loop_count as usize, n);
            // Diagonals only live in the duplicate.
            assert_eq!(flat.edges.len(), n);
            flat.validate().unwrap();
        }
    }

    #[test]
    fn test_encoded_weights() {
        let mut mesh = tri_and_quad();
        {
            let v = mesh.vertex_mut(VertexId::new(0));
            v.normal = Vector3::new(0.0, 0.6, 0.8);
            v.bevel_weight = 0.5;
        }
        mesh.edge_mut(EdgeId::new(3)).crease = 1.5;

        let flat = topo_to_flat(&mesh, &WriteOptions::default()).unwrap();
        assert_eq!(flat.verts[0].normal, [0, 76, 102]);
        assert_eq!(flat.verts[0].bevel_weight, 128);
        assert_eq!(flat.edges[3].crease, 255);
    }

    #[test]
    fn test_payload_layers() {
        let mut mesh = tri_and_quad();
        let temp = mesh
            .add_vertex_layer(LayerDef::new("temperature", LayerKind::Float))
            .unwrap();
        let group = mesh
            .add_face_layer(LayerDef::new("group", LayerKind::Int))
            .unwrap();
        let layout = mesh.layouts().clone();
        mesh.vertex_mut(VertexId::new(4))
            .data
            .set(&layout.verts, temp, AttrValue::Float(37.5))
            .unwrap();
        mesh.face_mut(FaceId::new(1))
            .data
            .set(&layout.faces, group, AttrValue::Int(9))
            .unwrap();

        let flat = topo_to_flat(&mesh, &WriteOptions::default()).unwrap();
        let t = flat.vdata.find("temperature").unwrap();
        assert_eq!(flat.vdata.get(t, 4), &AttrValue::Float(37.5));
        let g = flat.pdata.find("group").unwrap();
        assert_eq!(flat.pdata.get(g, 1), &AttrValue::Int(9));
        let g = flat.fdata.find("group").unwrap();
        assert_eq!(flat.fdata.get(g, 1), &AttrValue::Int(9));
    }

    #[test]
    fn test_replaces_destination() {
        let mut flat = topo_to_flat(&tri_and_quad(), &WriteOptions::default()).unwrap();
        flat.vdata
            .add_layer(LayerDef::new("stale", LayerKind::Bool))
            .unwrap();

        write_flat_mesh(&TopoMesh::<u32>::new(), &mut flat, &WriteOptions::default()).unwrap();
        assert_eq!(flat, FlatMesh::new());
    }

    #[test]
    fn test_two_corner_face() {
        let mut mesh = TopoMesh::<u32>::new();
        let a = mesh.add_vertex(Point3::origin());
        let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let e1 = mesh.add_edge(a, b);
        let e2 = mesh.add_edge(b, a);
        mesh.add_ngon(a, b, &[e1, e2]).unwrap();

        let flat = topo_to_flat(&mesh, &WriteOptions::default()).unwrap();
        assert_eq!(flat.faces.len(), 1);
        assert_eq!((flat.faces[0].v1, flat.faces[0].v2), (0, 1));
        assert_eq!(flat.polys[0].loop_count, 2);
    }

    #[test]
    fn test_flags_and_material() {
        let mut mesh = TopoMesh::<u32>::new();
        let hex: Vec<VertexId> = (0..6)
            .map(|i| {
                let t = i as f32 / 6.0 * std::f32::consts::TAU;
                mesh.add_vertex(Point3::new(t.cos(), t.sin(), 0.0))
            })
            .collect();
        let quad: Vec<VertexId> = [[3.0, 0.0], [4.0, 0.0], [4.0, 1.0], [3.0, 1.0]]
            .iter()
            .map(|p| mesh.add_vertex(Point3::new(p[0], p[1], 0.0)))
            .collect();
        let he: Vec<EdgeId> = (0..6).map(|i| mesh.add_edge(hex[i], hex[(i + 1) % 6])).collect();
        let qe: Vec<EdgeId> = (0..4)
            .map(|i| mesh.add_edge(quad[i], quad[(i + 1) % 4]))
            .collect();
        let f0 = mesh.add_ngon(hex[0], hex[1], &he).unwrap();
        let f1 = mesh.add_ngon(quad[0], quad[1], &qe).unwrap();

        mesh.vertex_mut(hex[1]).flags = ElemFlags::SELECT;
        mesh.vertex_mut(hex[2]).flags = ElemFlags::HIDDEN | ElemFlags::SMOOTH;
        mesh.face_mut(f0).material = 2;
        mesh.face_mut(f0).flags = ElemFlags::SMOOTH | ElemFlags::SELECT;
        mesh.face_mut(f1).material = 5;
        mesh.face_mut(f1).flags = ElemFlags::HIDDEN;

        let flat = topo_to_flat(&mesh, &WriteOptions::default()).unwrap();

        assert_eq!(flat.verts[0].flags, VertFlags::empty());
        assert_eq!(flat.verts[1].flags, VertFlags::SELECT);
        // Vertices have no smooth flag.
        assert_eq!(flat.verts[2].flags, VertFlags::HIDE);

        assert_eq!(flat.polys[0].material, 2);
        assert_eq!(flat.polys[0].flags, FaceFlags::SMOOTH | FaceFlags::SELECT);
        assert_eq!(flat.polys[1].material, 5);
        assert_eq!(flat.polys[1].flags, FaceFlags::HIDE);

        // Four fan triangles from the hexagon, then the quad.
        assert_eq!(flat.faces.len(), 5);
        for f in &flat.faces[..4] {
            assert_eq!(f.v4, 0);
            assert_eq!(f.material, 2);
            assert_eq!(f.flags, FaceFlags::SMOOTH | FaceFlags::SELECT);
        }
        let q = flat.faces[4];
        assert!(q.is_quad());
        assert_eq!(q.material, 5);
        assert_eq!(q.flags, FaceFlags::HIDE);
    }
}
