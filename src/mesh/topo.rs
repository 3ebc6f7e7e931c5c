//! Loop-based topological mesh.
//!
//! This is the editable representation: vertices, edges, faces and loops
//! connected by explicit links, with faces of any arity.
//!
//! # Structure
//!
//! - Each **edge** joins two vertices in a fixed `v1`/`v2` order chosen at creation
//! - Each **face** owns a closed chain of **loops**, one per corner, entered
//!   through its base loop
//! - Each loop knows its corner vertex, the edge leading to the next corner,
//!   its face, the next/previous loop of the face, and the next/previous loop
//!   in the radial cycle of every loop that uses the same edge
//!
//! Two faces sharing an edge reference the same [`Edge`] record; nothing
//! here deduplicates edges by vertex pair, so callers decide edge identity.

use bitflags::bitflags;
use nalgebra::{Point3, Vector3};

use super::index::{EdgeId, FaceId, LoopId, MeshIndex, VertexId};
use crate::attr::{AttrBlock, LayerDef, LayerLayout};
use crate::error::{MeshError, Result};

bitflags! {
    /// State flags carried by topological elements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ElemFlags: u8 {
        /// Element is selected.
        const SELECT = 1 << 0;
        /// Element is hidden.
        const HIDDEN = 1 << 1;
        /// Edge is marked sharp.
        const SHARP = 1 << 2;
        /// Edge is a UV seam.
        const SEAM = 1 << 3;
        /// Face is smooth shaded.
        const SMOOTH = 1 << 4;
    }
}

impl Default for ElemFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// A vertex of the topological mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Position.
    pub position: Point3<f32>,
    /// Normal.
    pub normal: Vector3<f32>,
    /// Selection and visibility flags.
    pub flags: ElemFlags,
    /// Bevel weight in [0, 1].
    pub bevel_weight: f32,
    /// Attribute payload, aligned with the vertex layout.
    pub data: AttrBlock,
}

/// An edge between two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<I: MeshIndex = u32> {
    verts: [VertexId<I>; 2],
    /// Selection, visibility, sharp and seam flags.
    pub flags: ElemFlags,
    /// Subdivision crease in [0, 1].
    pub crease: f32,
    /// Bevel weight in [0, 1].
    pub bevel_weight: f32,
    /// Attribute payload, aligned with the edge layout.
    pub data: AttrBlock,
    radial: LoopId<I>,
}

impl<I: MeshIndex> Edge<I> {
    /// Both endpoints in creation order.
    #[inline]
    pub fn verts(&self) -> [VertexId<I>; 2] {
        self.verts
    }

    /// First endpoint.
    #[inline]
    pub fn v1(&self) -> VertexId<I> {
        self.verts[0]
    }

    /// Second endpoint.
    #[inline]
    pub fn v2(&self) -> VertexId<I> {
        self.verts[1]
    }

    /// The endpoint opposite `v`, or `None` if `v` is not an endpoint.
    #[inline]
    pub fn other(&self, v: VertexId<I>) -> Option<VertexId<I>> {
        if v == self.verts[0] {
            Some(self.verts[1])
        } else if v == self.verts[1] {
            Some(self.verts[0])
        } else {
            None
        }
    }

    /// Whether `v` is an endpoint.
    #[inline]
    pub fn contains(&self, v: VertexId<I>) -> bool {
        self.verts[0] == v || self.verts[1] == v
    }

    /// One loop in the radial cycle of this edge (invalid for wire edges).
    #[inline]
    pub fn radial(&self) -> LoopId<I> {
        self.radial
    }
}

/// One corner of a face.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop<I: MeshIndex = u32> {
    vert: VertexId<I>,
    edge: EdgeId<I>,
    face: FaceId<I>,
    next: LoopId<I>,
    prev: LoopId<I>,
    radial_next: LoopId<I>,
    radial_prev: LoopId<I>,
    /// Attribute payload, aligned with the loop layout.
    pub data: AttrBlock,
}

impl<I: MeshIndex> Loop<I> {
    /// Vertex at this corner.
    #[inline]
    pub fn vert(&self) -> VertexId<I> {
        self.vert
    }

    /// Edge from this corner to the next one.
    #[inline]
    pub fn edge(&self) -> EdgeId<I> {
        self.edge
    }

    /// Owning face.
    #[inline]
    pub fn face(&self) -> FaceId<I> {
        self.face
    }

    /// Next loop around the face.
    #[inline]
    pub fn next(&self) -> LoopId<I> {
        self.next
    }

    /// Previous loop around the face.
    #[inline]
    pub fn prev(&self) -> LoopId<I> {
        self.prev
    }

    /// Next loop sharing this loop's edge.
    #[inline]
    pub fn radial_next(&self) -> LoopId<I> {
        self.radial_next
    }
}

/// A face of any arity.
#[derive(Debug, Clone, PartialEq)]
pub struct Face<I: MeshIndex = u32> {
    base: LoopId<I>,
    len: usize,
    /// Material slot.
    pub material: i16,
    /// Selection, visibility and smooth flags.
    pub flags: ElemFlags,
    /// Attribute payload, aligned with the face layout.
    pub data: AttrBlock,
}

impl<I: MeshIndex> Face<I> {
    /// Entry loop of the corner chain.
    #[inline]
    pub fn base(&self) -> LoopId<I> {
        self.base
    }

    /// Number of corners.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the face has no corners (never true for faces built by this crate).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Layer layouts of the four topological domains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopoLayouts {
    /// Vertex layers.
    pub verts: LayerLayout,
    /// Edge layers.
    pub edges: LayerLayout,
    /// Loop (face corner) layers.
    pub loops: LayerLayout,
    /// Face layers.
    pub faces: LayerLayout,
}

/// The editable mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct TopoMesh<I: MeshIndex = u32> {
    vertices: Vec<Vertex>,
    edges: Vec<Edge<I>>,
    loops: Vec<Loop<I>>,
    faces: Vec<Face<I>>,
    layouts: TopoLayouts,
}

impl<I: MeshIndex> Default for TopoMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> TopoMesh<I> {
    /// Create an empty mesh with no layers.
    pub fn new() -> Self {
        Self::with_layouts(TopoLayouts::default())
    }

    /// Create an empty mesh with the given layer layouts.
    pub fn with_layouts(layouts: TopoLayouts) -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            loops: Vec::new(),
            faces: Vec::new(),
            layouts,
        }
    }

    /// Reserve room for the given element counts.
    pub fn reserve(&mut self, verts: usize, edges: usize, loops: usize, faces: usize) {
        self.vertices.reserve(verts);
        self.edges.reserve(edges);
        self.loops.reserve(loops);
        self.faces.reserve(faces);
    }

    // ==================== Accessors ====================

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of loops (total corners over all faces).
    #[inline]
    pub fn num_loops(&self) -> usize {
        self.loops.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no elements at all.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Layer layouts.
    #[inline]
    pub fn layouts(&self) -> &TopoLayouts {
        &self.layouts
    }

    /// Get a vertex.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a mutable vertex.
    #[inline]
    pub fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex {
        &mut self.vertices[id.index()]
    }

    /// Get an edge.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        &self.edges[id.index()]
    }

    /// Get a mutable edge.
    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId<I>) -> &mut Edge<I> {
        &mut self.edges[id.index()]
    }

    /// Get a loop.
    #[inline]
    pub fn corner(&self, id: LoopId<I>) -> &Loop<I> {
        &self.loops[id.index()]
    }

    /// Get a mutable loop.
    #[inline]
    pub fn corner_mut(&mut self, id: LoopId<I>) -> &mut Loop<I> {
        &mut self.loops[id.index()]
    }

    /// Get a face.
    #[inline]
    pub fn face(&self, id: FaceId<I>) -> &Face<I> {
        &self.faces[id.index()]
    }

    /// Get a mutable face.
    #[inline]
    pub fn face_mut(&mut self, id: FaceId<I>) -> &mut Face<I> {
        &mut self.faces[id.index()]
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f32> {
        &self.vertex(v).position
    }

    /// Number of corners of a face.
    #[inline]
    pub fn face_len(&self, f: FaceId<I>) -> usize {
        self.face(f).len
    }

    // ==================== Layers ====================

    /// Register a vertex layer; existing vertices get the default value.
    pub fn add_vertex_layer(&mut self, def: LayerDef) -> Result<usize> {
        let slot = self.layouts.verts.add(def)?;
        let layout = &self.layouts.verts;
        for v in &mut self.vertices {
            v.data = extend_block(&v.data, layout);
        }
        Ok(slot)
    }

    /// Register an edge layer; existing edges get the default value.
    pub fn add_edge_layer(&mut self, def: LayerDef) -> Result<usize> {
        let slot = self.layouts.edges.add(def)?;
        let layout = &self.layouts.edges;
        for e in &mut self.edges {
            e.data = extend_block(&e.data, layout);
        }
        Ok(slot)
    }

    /// Register a loop layer; existing loops get the default value.
    pub fn add_loop_layer(&mut self, def: LayerDef) -> Result<usize> {
        let slot = self.layouts.loops.add(def)?;
        let layout = &self.layouts.loops;
        for l in &mut self.loops {
            l.data = extend_block(&l.data, layout);
        }
        Ok(slot)
    }

    /// Register a face layer; existing faces get the default value.
    pub fn add_face_layer(&mut self, def: LayerDef) -> Result<usize> {
        let slot = self.layouts.faces.add(def)?;
        let layout = &self.layouts.faces;
        for f in &mut self.faces {
            f.data = extend_block(&f.data, layout);
        }
        Ok(slot)
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex ids.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices with their ids.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId<I>, &Vertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all edge ids.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over all edges with their ids.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId<I>, &Edge<I>)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeId::new(i), e))
    }

    /// Iterate over all face ids.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over all faces with their ids.
    pub fn faces(&self) -> impl Iterator<Item = (FaceId<I>, &Face<I>)> + '_ {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId::new(i), f))
    }

    /// Iterate over the loops of a face, starting at its base loop.
    pub fn face_loops(&self, f: FaceId<I>) -> FaceLoopIter<'_, I> {
        FaceLoopIter::new(self, self.face(f).base)
    }

    /// Iterate over the corner vertices of a face in winding order.
    pub fn face_vertices(&self, f: FaceId<I>) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.face_loops(f).map(|l| self.corner(l).vert)
    }

    /// Iterate over the boundary edges of a face in winding order.
    pub fn face_edges(&self, f: FaceId<I>) -> impl Iterator<Item = EdgeId<I>> + '_ {
        self.face_loops(f).map(|l| self.corner(l).edge)
    }

    /// Corner positions of a face in winding order.
    pub fn face_positions(&self, f: FaceId<I>) -> Vec<Point3<f32>> {
        self.face_vertices(f).map(|v| *self.position(v)).collect()
    }

    /// Iterate over every loop that uses an edge.
    pub fn edge_loops(&self, e: EdgeId<I>) -> RadialLoopIter<'_, I> {
        RadialLoopIter::new(self, self.edge(e).radial)
    }

    /// Iterate over the faces that use an edge.
    pub fn edge_faces(&self, e: EdgeId<I>) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.edge_loops(e).map(|l| self.corner(l).face)
    }

    // ==================== Construction ====================

    /// Add a vertex with default attributes.
    pub fn add_vertex(&mut self, position: Point3<f32>) -> VertexId<I> {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex {
            position,
            normal: Vector3::zeros(),
            flags: ElemFlags::empty(),
            bevel_weight: 0.0,
            data: self.layouts.verts.default_block(),
        });
        id
    }

    /// Add an edge from `v1` to `v2`.
    ///
    /// A new record is always created, even if the pair is already joined.
    pub fn add_edge(&mut self, v1: VertexId<I>, v2: VertexId<I>) -> EdgeId<I> {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(Edge {
            verts: [v1, v2],
            flags: ElemFlags::empty(),
            crease: 0.0,
            bevel_weight: 0.0,
            data: self.layouts.edges.default_block(),
            radial: LoopId::invalid(),
        });
        id
    }

    /// Add an n-gon bounded by `edges`, walking from `v1` towards `v2`.
    ///
    /// The first edge must join `v1` and `v2`; every following edge must
    /// continue from the vertex the previous one ended at, and the last edge
    /// must return to `v1`. Corner `i` of the new face sits at the vertex where
    /// `edges[i]` starts, so the base loop is at `v1`.
    pub fn add_ngon(
        &mut self,
        v1: VertexId<I>,
        v2: VertexId<I>,
        edges: &[EdgeId<I>],
    ) -> Result<FaceId<I>> {
        let face = self.faces.len();
        let first = edges
            .first()
            .ok_or_else(|| MeshError::malformed(face, "face has no edges"))?;
        if self.edge(*first).other(v1) != Some(v2) {
            return Err(MeshError::malformed(
                face,
                "first edge does not join the starting pair",
            ));
        }

        let mut verts = Vec::with_capacity(edges.len());
        let mut current = v1;
        for &e in edges {
            verts.push(current);
            current = self
                .edge(e)
                .other(current)
                .ok_or_else(|| MeshError::malformed(face, "edge chain is broken"))?;
        }
        if current != v1 {
            return Err(MeshError::malformed(face, "boundary does not close"));
        }

        Ok(self.push_face(&verts, edges))
    }

    /// Link a face from matching corner vertices and outgoing edges.
    ///
    /// `edges[i]` must join `verts[i]` and `verts[(i + 1) % n]`.
    pub(crate) fn push_face(&mut self, verts: &[VertexId<I>], edges: &[EdgeId<I>]) -> FaceId<I> {
        debug_assert_eq!(verts.len(), edges.len());

        let n = verts.len();
        let face = FaceId::new(self.faces.len());
        let first = self.loops.len();

        for (i, (&vert, &edge)) in verts.iter().zip(edges).enumerate() {
            let id = LoopId::new(first + i);
            self.loops.push(Loop {
                vert,
                edge,
                face,
                next: LoopId::new(first + (i + 1) % n),
                prev: LoopId::new(first + (i + n - 1) % n),
                radial_next: id,
                radial_prev: id,
                data: self.layouts.loops.default_block(),
            });
            self.attach_radial(edge, id);
        }

        self.faces.push(Face {
            base: LoopId::new(first),
            len: n,
            material: 0,
            flags: ElemFlags::empty(),
            data: self.layouts.faces.default_block(),
        });
        face
    }

    /// Insert a loop into the radial cycle of its edge.
    fn attach_radial(&mut self, e: EdgeId<I>, l: LoopId<I>) {
        let head = self.edge(e).radial;
        if !head.is_valid() {
            self.edge_mut(e).radial = l;
            return;
        }
        let after = self.corner(head).radial_next;
        self.corner_mut(head).radial_next = l;
        self.corner_mut(l).radial_prev = head;
        self.corner_mut(l).radial_next = after;
        self.corner_mut(after).radial_prev = l;
    }

    // ==================== Validation ====================

    /// Check that all links are consistent.
    pub fn is_valid(&self) -> bool {
        for (fid, f) in self.faces() {
            let mut count = 0;
            for l in self.face_loops(fid) {
                let lp = self.corner(l);
                let next = self.corner(lp.next);
                if lp.face != fid || next.prev != l {
                    return false;
                }
                let edge = self.edge(lp.edge);
                if !edge.contains(lp.vert) || !edge.contains(next.vert) {
                    return false;
                }
                count += 1;
                if count > self.loops.len() {
                    return false;
                }
            }
            if count != f.len {
                return false;
            }
        }

        for (eid, e) in self.edges() {
            if !e.radial.is_valid() {
                continue;
            }
            for l in self.edge_loops(eid) {
                let lp = self.corner(l);
                if lp.edge != eid || self.corner(lp.radial_next).radial_prev != l {
                    return false;
                }
            }
        }

        true
    }
}

fn extend_block(block: &AttrBlock, layout: &LayerLayout) -> AttrBlock {
    let mut out = layout.default_block();
    for (slot, value) in block.values().iter().enumerate() {
        out.put(slot, *value);
    }
    out
}

/// Iterator over the loops of a face.
pub struct FaceLoopIter<'a, I: MeshIndex = u32> {
    mesh: &'a TopoMesh<I>,
    start: LoopId<I>,
    current: LoopId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> FaceLoopIter<'a, I> {
    fn new(mesh: &'a TopoMesh<I>, start: LoopId<I>) -> Self {
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for FaceLoopIter<'a, I> {
    type Item = LoopId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.corner(self.current).next;
        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over the radial cycle of an edge.
pub struct RadialLoopIter<'a, I: MeshIndex = u32> {
    mesh: &'a TopoMesh<I>,
    start: LoopId<I>,
    current: LoopId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> RadialLoopIter<'a, I> {
    fn new(mesh: &'a TopoMesh<I>, start: LoopId<I>) -> Self {
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for RadialLoopIter<'a, I> {
    type Item = LoopId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.corner(self.current).radial_next;
        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{AttrValue, LayerKind};

    /// Two quads sharing the edge 1-2.
    fn two_quads() -> (TopoMesh, Vec<EdgeId>) {
        let mut mesh = TopoMesh::new();
        let v: Vec<VertexId> = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
            [2.0, 0.0, 0.0],
            [2.0, 1.0, 0.0],
        ]
        .iter()
        .map(|p| mesh.add_vertex(Point3::new(p[0], p[1], p[2])))
        .collect();

        let e = vec![
            mesh.add_edge(v[0], v[1]),
            mesh.add_edge(v[1], v[2]),
            mesh.add_edge(v[2], v[3]),
            mesh.add_edge(v[3], v[0]),
            mesh.add_edge(v[1], v[4]),
            mesh.add_edge(v[4], v[5]),
            mesh.add_edge(v[5], v[2]),
        ];

        mesh.add_ngon(v[0], v[1], &[e[0], e[1], e[2], e[3]]).unwrap();
        // Walks the shared edge 1-2 in the opposite direction.
        mesh.add_ngon(v[1], v[4], &[e[4], e[5], e[6], e[1]]).unwrap();
        (mesh, e)
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = TopoMesh::<u32>::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.num_loops(), 0);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_shared_edge_identity() {
        let (mesh, e) = two_quads();

        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_edges(), 7);
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_loops(), 8);
        assert!(mesh.is_valid());

        let shared: Vec<FaceId> = mesh.edge_faces(e[1]).collect();
        assert_eq!(shared.len(), 2);
        assert_eq!(mesh.edge_faces(e[0]).count(), 1);
    }

    #[test]
    fn test_face_walk_order() {
        let (mesh, _) = two_quads();
        let f1 = FaceId::new(1);
        let verts: Vec<usize> = mesh.face_vertices(f1).map(|v| v.index()).collect();
        assert_eq!(verts, vec![1, 4, 5, 2]);
        assert_eq!(mesh.face_len(f1), 4);

        let base = mesh.face(f1).base();
        assert_eq!(mesh.corner(base).vert().index(), 1);
        let last = mesh.corner(base).prev();
        assert_eq!(mesh.corner(last).next(), base);
    }

    #[test]
    fn test_ngon() {
        let mut mesh = TopoMesh::<u32>::new();
        let n = 7;
        let v: Vec<VertexId> = (0..n)
            .map(|i| {
                let a = i as f32 / n as f32 * std::f32::consts::TAU;
                mesh.add_vertex(Point3::new(a.cos(), a.sin(), 0.0))
            })
            .collect();
        // Edge direction alternates so the walk has to flip some of them.
        let e: Vec<EdgeId> = (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    mesh.add_edge(v[i], v[(i + 1) % n])
                } else {
                    mesh.add_edge(v[(i + 1) % n], v[i])
                }
            })
            .collect();

        let f = mesh.add_ngon(v[0], v[1], &e).unwrap();
        assert_eq!(mesh.face_len(f), 7);
        let order: Vec<usize> = mesh.face_vertices(f).map(|v| v.index()).collect();
        assert_eq!(order, (0..n).collect::<Vec<_>>());
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_malformed_boundary() {
        let mut mesh = TopoMesh::<u32>::new();
        let v: Vec<VertexId> = (0..4)
            .map(|i| mesh.add_vertex(Point3::new(i as f32, 0.0, 0.0)))
            .collect();
        let e01 = mesh.add_edge(v[0], v[1]);
        let e12 = mesh.add_edge(v[1], v[2]);
        let e23 = mesh.add_edge(v[2], v[3]);

        // Open chain.
        let err = mesh.add_ngon(v[0], v[1], &[e01, e12, e23]).unwrap_err();
        assert!(matches!(err, MeshError::MalformedBoundary { .. }));

        // Gap in the chain.
        let err = mesh.add_ngon(v[0], v[1], &[e01, e23, e12]).unwrap_err();
        assert!(matches!(err, MeshError::MalformedBoundary { .. }));

        // Wrong starting pair.
        assert!(mesh.add_ngon(v[0], v[2], &[e01]).is_err());
        assert!(mesh.add_ngon(v[0], v[1], &[]).is_err());

        assert_eq!(mesh.num_faces(), 0);
        assert_eq!(mesh.num_loops(), 0);
    }

    #[test]
    fn test_layers_extend_existing_elements() {
        let (mut mesh, e) = two_quads();
        let slot = mesh
            .add_edge_layer(LayerDef::new("weight", LayerKind::Float))
            .unwrap();

        let layout = mesh.layouts().edges.clone();
        mesh.edge_mut(e[2])
            .data
            .set(&layout, slot, AttrValue::Float(0.75))
            .unwrap();

        assert_eq!(mesh.edge(e[2]).data.get(slot), Some(&AttrValue::Float(0.75)));
        assert_eq!(mesh.edge(e[0]).data.get(slot), Some(&AttrValue::Float(0.0)));

        // New elements pick the layer up too.
        let v = mesh.add_vertex(Point3::origin());
        let w = mesh.add_vertex(Point3::new(1.0, 1.0, 1.0));
        let wire = mesh.add_edge(v, w);
        assert_eq!(mesh.edge(wire).data.len(), 1);
        assert_eq!(mesh.edge_faces(wire).count(), 0);
    }
}
