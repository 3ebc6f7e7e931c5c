//! Flat array mesh to topological mesh.
//!
//! Elements are created domain by domain: all vertices, then all edges, then
//! one face per polygon. Lookup tables translate flat indices into the ids
//! of the elements just created; they live only for the duration of the call.

use log::{debug, trace};
use nalgebra::Point3;

use super::progress::{Progress, Steps};
use super::ReadOptions;
use crate::attr::bridge::{flat_to_block, LayerMap};
use crate::attr::Domain;
use crate::error::{MeshError, Result};
use crate::flat::encode::{unpack_normal, unpack_unit};
use crate::flat::{EdgeFlags, FaceFlags, FlatMesh, VertFlags};
use crate::mesh::{EdgeId, ElemFlags, MeshIndex, TopoLayouts, TopoMesh, VertexId};

const STEPS: usize = 3;

/// Read a flat mesh into a topological mesh.
///
/// On success `mesh` is replaced by the result: the previous contents and
/// layer layouts are gone. On error `mesh` is left untouched.
///
/// # Errors
/// - [`MeshError::EmptyInput`] if `flat` has no vertices
/// - [`MeshError::MalformedBoundary`] if a polygon's loops do not walk a
///   closed chain of edges
/// - [`MeshError::TooManyElements`] if a domain does not fit the id type `I`
/// - any validation error when `options.validate` is set
///
/// # Example
/// ```
/// use meshbridge::convert::{read_flat_mesh, ReadOptions};
/// use meshbridge::flat::build_flat_mesh;
/// use meshbridge::mesh::TopoMesh;
/// use nalgebra::Point3;
///
/// let positions = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let flat = build_flat_mesh(&positions, &[[0usize, 1, 2]]).unwrap();
///
/// let mut mesh: TopoMesh = TopoMesh::new();
/// read_flat_mesh(&flat, &mut mesh, &ReadOptions::default()).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// ```
pub fn read_flat_mesh<I: MeshIndex>(
    flat: &FlatMesh,
    mesh: &mut TopoMesh<I>,
    options: &ReadOptions,
) -> Result<()> {
    read_flat_mesh_with_progress(flat, mesh, options, &Progress::none())
}

/// Read a flat mesh into a new topological mesh.
pub fn flat_to_topo<I: MeshIndex>(flat: &FlatMesh, options: &ReadOptions) -> Result<TopoMesh<I>> {
    let mut mesh = TopoMesh::new();
    read_flat_mesh(flat, &mut mesh, options)?;
    Ok(mesh)
}

/// [`read_flat_mesh`] with progress reporting.
pub fn read_flat_mesh_with_progress<I: MeshIndex>(
    flat: &FlatMesh,
    mesh: &mut TopoMesh<I>,
    options: &ReadOptions,
    progress: &Progress,
) -> Result<()> {
    if flat.verts.is_empty() {
        return Err(MeshError::EmptyInput);
    }
    check_capacity::<I>(flat)?;
    if options.validate {
        flat.validate()?;
    }

    let mut steps = Steps::new(progress, STEPS);
    let out = build(flat, &mut steps)?;
    steps.finish("read");

    debug!(
        "read flat mesh: {} vertices, {} edges, {} faces, {} loops",
        out.num_vertices(),
        out.num_edges(),
        out.num_faces(),
        out.num_loops()
    );

    *mesh = out;
    Ok(())
}

/// Fail before creating anything if an element count would overflow `I`.
fn check_capacity<I: MeshIndex>(flat: &FlatMesh) -> Result<()> {
    // Ids run from 0 to MAX inclusive.
    let max = I::MAX.to_usize().saturating_add(1);
    let counts = [
        (Domain::Vertex, flat.verts.len()),
        (Domain::Edge, flat.edges.len()),
        (Domain::Loop, flat.loops.len()),
        (Domain::Polygon, flat.polys.len()),
    ];
    match counts.into_iter().find(|&(_, count)| count > max) {
        Some((domain, count)) => Err(MeshError::TooManyElements { domain, count, max }),
        None => Ok(()),
    }
}

fn build<I: MeshIndex>(flat: &FlatMesh, steps: &mut Steps<'_>) -> Result<TopoMesh<I>> {
    let layouts = TopoLayouts {
        verts: flat.vdata.layout(),
        edges: flat.edata.layout(),
        loops: flat.ldata.layout(),
        faces: flat.pdata.layout(),
    };
    let vmap = LayerMap::flat_to_layout(&flat.vdata, &layouts.verts);
    let emap = LayerMap::flat_to_layout(&flat.edata, &layouts.edges);
    let lmap = LayerMap::flat_to_layout(&flat.ldata, &layouts.loops);
    let pmap = LayerMap::flat_to_layout(&flat.pdata, &layouts.faces);

    let mut mesh = TopoMesh::with_layouts(layouts);
    mesh.reserve(
        flat.verts.len(),
        flat.edges.len(),
        flat.loops.len(),
        flat.polys.len(),
    );

    // ==================== Vertices ====================

    let mut vtable: Vec<VertexId<I>> = Vec::with_capacity(flat.verts.len());
    for (i, rec) in flat.verts.iter().enumerate() {
        let [x, y, z] = rec.position;
        let id = mesh.add_vertex(Point3::new(x, y, z));
        let v = mesh.vertex_mut(id);
        v.normal = unpack_normal(rec.normal);
        v.bevel_weight = unpack_unit(rec.bevel_weight);
        v.flags = vert_flags(rec.flags);
        flat_to_block(&flat.vdata, i, &vmap, &mut v.data);
        vtable.push(id);
    }
    steps.tick("vertices");

    if flat.edges.is_empty() {
        return Ok(mesh);
    }

    // ==================== Edges ====================

    let mut etable: Vec<EdgeId<I>> = Vec::with_capacity(flat.edges.len());
    for (i, rec) in flat.edges.iter().enumerate() {
        let id = mesh.add_edge(vtable[rec.v1 as usize], vtable[rec.v2 as usize]);
        let e = mesh.edge_mut(id);
        e.crease = unpack_unit(rec.crease);
        e.bevel_weight = unpack_unit(rec.bevel_weight);
        e.flags = edge_flags(rec.flags);
        flat_to_block(&flat.edata, i, &emap, &mut e.data);
        etable.push(id);
    }
    steps.tick("edges");

    if flat.polys.is_empty() {
        return Ok(mesh);
    }

    // ==================== Faces ====================

    let mut edges = Vec::new();
    for (pi, poly) in flat.polys.iter().enumerate() {
        if poly.loop_count == 0 {
            return Err(MeshError::malformed(pi, "polygon has no loops"));
        }
        let loops = flat.polygon_loops(pi);

        edges.clear();
        edges.extend(loops.iter().map(|l| etable[l.edge as usize]));

        // Orient the first edge so the walk starts at the first loop's vertex.
        let first = mesh.edge(edges[0]);
        let start = vtable[loops[0].vertex as usize];
        let (v1, v2) = if start == first.v1() {
            (first.v1(), first.v2())
        } else {
            (first.v2(), first.v1())
        };

        let fid = mesh
            .add_ngon(v1, v2, &edges)
            .map_err(|e| match e {
                MeshError::MalformedBoundary { reason, .. } => MeshError::malformed(pi, reason),
                other => other,
            })?;

        let face = mesh.face_mut(fid);
        face.material = poly.material;
        face.flags = face_flags(poly.flags);
        flat_to_block(&flat.pdata, pi, &pmap, &mut face.data);

        if !lmap.is_empty() {
            let ids: Vec<_> = mesh.face_loops(fid).collect();
            for (li, l) in poly.loop_range().zip(ids) {
                flat_to_block(&flat.ldata, li, &lmap, &mut mesh.corner_mut(l).data);
            }
        }
    }
    trace!("built {} faces", flat.polys.len());
    steps.tick("faces");

    Ok(mesh)
}

fn vert_flags(f: VertFlags) -> ElemFlags {
    let mut out = ElemFlags::empty();
    out.set(ElemFlags::SELECT, f.contains(VertFlags::SELECT));
    out.set(ElemFlags::HIDDEN, f.contains(VertFlags::HIDE));
    out
}

fn edge_flags(f: EdgeFlags) -> ElemFlags {
    let mut out = ElemFlags::empty();
    out.set(ElemFlags::SELECT, f.contains(EdgeFlags::SELECT));
    out.set(ElemFlags::HIDDEN, f.contains(EdgeFlags::HIDE));
    out.set(ElemFlags::SHARP, f.contains(EdgeFlags::SHARP));
    out.set(ElemFlags::SEAM, f.contains(EdgeFlags::SEAM));
    out
}

fn face_flags(f: FaceFlags) -> ElemFlags {
    let mut out = ElemFlags::empty();
    out.set(ElemFlags::SELECT, f.contains(FaceFlags::SELECT));
    out.set(ElemFlags::HIDDEN, f.contains(FaceFlags::HIDE));
    out.set(ElemFlags::SMOOTH, f.contains(FaceFlags::SMOOTH));
    out
}
