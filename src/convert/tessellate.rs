//! Triangle/quad coverings of n-gon faces.
//!
//! The legacy face array only holds triangles and quads, so the writer first
//! builds a tessellated duplicate of the topological mesh. How an n-gon is
//! split is delegated to a [`Tessellator`]; [`tessellated_copy`] takes care
//! of the topology (shared boundary edges, new interior edges, payloads).

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::attr::bridge::{block_to_block, LayerMap};
use crate::mesh::{EdgeId, FaceId, LoopId, MeshIndex, TopoMesh, VertexId};

/// One face of a covering, as corner indices into the input polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece {
    /// A triangle.
    Tri([usize; 3]),
    /// A quad.
    Quad([usize; 4]),
}

impl Piece {
    /// Corner indices in winding order.
    pub fn corners(&self) -> &[usize] {
        match self {
            Piece::Tri(c) => &c[..],
            Piece::Quad(c) => &c[..],
        }
    }
}

/// Splits a polygon into triangles and quads.
///
/// Implementations receive the corner positions of one face in winding
/// order and return pieces that cover it, each listing corners in the same
/// winding. Every piece corner must be a valid index into `corners`.
pub trait Tessellator {
    /// Cover a polygon with triangles and quads.
    fn tessellate(&self, corners: &[Point3<f32>]) -> Vec<Piece>;
}

/// Faces that need no splitting.
fn small_face(n: usize) -> Option<Vec<Piece>> {
    match n {
        0..=2 => Some(Vec::new()),
        3 => Some(vec![Piece::Tri([0, 1, 2])]),
        4 => Some(vec![Piece::Quad([0, 1, 2, 3])]),
        _ => None,
    }
}

/// Fan triangulation from the first corner.
///
/// Exact for convex polygons and the cheapest choice; concave polygons may
/// get overlapping triangles.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanTessellator;

impl Tessellator for FanTessellator {
    fn tessellate(&self, corners: &[Point3<f32>]) -> Vec<Piece> {
        let n = corners.len();
        if let Some(pieces) = small_face(n) {
            return pieces;
        }
        (1..n - 1).map(|i| Piece::Tri([0, i, i + 1])).collect()
    }
}

/// Ear clipping in the plane of the polygon.
///
/// Handles simple concave polygons. The plane is taken from the Newell
/// normal, so slightly non-planar faces work too. If no ear can be found
/// (self-intersecting input) the first remaining corner is clipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarClipTessellator;

impl Tessellator for EarClipTessellator {
    fn tessellate(&self, corners: &[Point3<f32>]) -> Vec<Piece> {
        let n = corners.len();
        if let Some(pieces) = small_face(n) {
            return pieces;
        }

        let normal = newell_normal(corners);
        let mut remaining: Vec<usize> = (0..n).collect();
        let mut pieces = Vec::with_capacity(n - 2);

        while remaining.len() > 3 {
            let m = remaining.len();
            let ear = (0..m)
                .find(|&i| is_ear(corners, &remaining, i, &normal))
                .unwrap_or(0);
            let prev = remaining[(ear + m - 1) % m];
            let next = remaining[(ear + 1) % m];
            pieces.push(Piece::Tri([prev, remaining[ear], next]));
            remaining.remove(ear);
        }
        pieces.push(Piece::Tri([remaining[0], remaining[1], remaining[2]]));
        pieces
    }
}

/// Area-weighted polygon normal (not normalized).
fn newell_normal(p: &[Point3<f32>]) -> Vector3<f32> {
    let mut n = Vector3::zeros();
    for i in 0..p.len() {
        let a = p[i];
        let b = p[(i + 1) % p.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}

fn is_ear(p: &[Point3<f32>], remaining: &[usize], i: usize, normal: &Vector3<f32>) -> bool {
    let m = remaining.len();
    let ia = remaining[(i + m - 1) % m];
    let ib = remaining[i];
    let ic = remaining[(i + 1) % m];
    let (a, b, c) = (p[ia], p[ib], p[ic]);

    // Reflex or collinear corners are never ears.
    if (b - a).cross(&(c - b)).dot(normal) <= 0.0 {
        return false;
    }

    remaining
        .iter()
        .filter(|&&j| j != ia && j != ib && j != ic)
        .all(|&j| !in_triangle(&p[j], &a, &b, &c, normal))
}

fn in_triangle(
    q: &Point3<f32>,
    a: &Point3<f32>,
    b: &Point3<f32>,
    c: &Point3<f32>,
    normal: &Vector3<f32>,
) -> bool {
    let side = |u: &Point3<f32>, v: &Point3<f32>| (v - u).cross(&(q - u)).dot(normal) >= 0.0;
    side(a, b) && side(b, c) && side(c, a)
}

/// Built-in tessellators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TessellationMethod {
    /// [`FanTessellator`].
    #[default]
    Fan,
    /// [`EarClipTessellator`].
    EarClip,
}

impl TessellationMethod {
    /// The tessellator this method stands for.
    pub fn tessellator(self) -> Box<dyn Tessellator> {
        match self {
            TessellationMethod::Fan => Box::new(FanTessellator),
            TessellationMethod::EarClip => Box::new(EarClipTessellator),
        }
    }
}

/// Copy a mesh, splitting every face with more than four corners.
///
/// Vertices and edges keep their order and ids. Faces with up to four
/// corners are copied as they are. Larger faces are replaced by the pieces
/// `tess` returns; the diagonals between pieces become new edges. Every piece
/// carries the flags, material and payload of its source face, and each
/// piece corner carries the payload of the source corner it sits on.
pub fn tessellated_copy<I: MeshIndex>(mesh: &TopoMesh<I>, tess: &dyn Tessellator) -> TopoMesh<I> {
    let mut out = TopoMesh::with_layouts(mesh.layouts().clone());
    out.reserve(
        mesh.num_vertices(),
        mesh.num_edges(),
        mesh.num_loops(),
        mesh.num_faces(),
    );

    for (_, v) in mesh.vertices() {
        let id = out.add_vertex(v.position);
        *out.vertex_mut(id) = v.clone();
    }

    let edge_map = LayerMap::between_layouts(&mesh.layouts().edges, &out.layouts().edges);
    let maps = PayloadMaps {
        faces: LayerMap::between_layouts(&mesh.layouts().faces, &out.layouts().faces),
        loops: LayerMap::between_layouts(&mesh.layouts().loops, &out.layouts().loops),
    };

    for (_, e) in mesh.edges() {
        let id = out.add_edge(e.v1(), e.v2());
        let copy = out.edge_mut(id);
        copy.flags = e.flags;
        copy.crease = e.crease;
        copy.bevel_weight = e.bevel_weight;
        block_to_block(&e.data, &edge_map, &mut copy.data);
    }

    for fid in mesh.face_ids() {
        let loops: Vec<LoopId<I>> = mesh.face_loops(fid).collect();
        let verts: Vec<VertexId<I>> = loops.iter().map(|&l| mesh.corner(l).vert()).collect();
        let edges: Vec<EdgeId<I>> = loops.iter().map(|&l| mesh.corner(l).edge()).collect();
        let n = loops.len();

        if n <= 4 {
            let piece = out.push_face(&verts, &edges);
            copy_face_payload(mesh, fid, &loops, &mut out, piece, &(0..n).collect::<Vec<_>>(), &maps);
            continue;
        }

        let pieces = tess.tessellate(&mesh.face_positions(fid));
        let mut diagonals: HashMap<(usize, usize), EdgeId<I>> = HashMap::new();

        for piece in &pieces {
            let corners = piece.corners();
            let m = corners.len();
            let mut piece_verts = Vec::with_capacity(m);
            let mut piece_edges = Vec::with_capacity(m);

            for k in 0..m {
                let a = corners[k];
                let b = corners[(k + 1) % m];
                piece_verts.push(verts[a]);
                let edge = if b == (a + 1) % n {
                    edges[a]
                } else if a == (b + 1) % n {
                    edges[b]
                } else {
                    *diagonals
                        .entry((a.min(b), a.max(b)))
                        .or_insert_with(|| out.add_edge(verts[a], verts[b]))
                };
                piece_edges.push(edge);
            }

            let id = out.push_face(&piece_verts, &piece_edges);
            copy_face_payload(mesh, fid, &loops, &mut out, id, corners, &maps);
        }
    }

    out
}

/// Face and loop layer maps between a mesh and its tessellated copy.
struct PayloadMaps {
    faces: LayerMap,
    loops: LayerMap,
}

/// Copy face attributes onto `piece`, whose corner `k` sits on source corner `corners[k]`.
fn copy_face_payload<I: MeshIndex>(
    mesh: &TopoMesh<I>,
    src: FaceId<I>,
    src_loops: &[LoopId<I>],
    out: &mut TopoMesh<I>,
    piece: FaceId<I>,
    corners: &[usize],
    maps: &PayloadMaps,
) {
    let face = mesh.face(src);
    let dst = out.face_mut(piece);
    dst.material = face.material;
    dst.flags = face.flags;
    block_to_block(&face.data, &maps.faces, &mut dst.data);

    let piece_loops: Vec<LoopId<I>> = out.face_loops(piece).collect();
    for (l, &c) in piece_loops.into_iter().zip(corners) {
        block_to_block(
            &mesh.corner(src_loops[c]).data,
            &maps.loops,
            &mut out.corner_mut(l).data,
        );
    }
}
