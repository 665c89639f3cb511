//! Half-edge mesh (DCEL) of the Voronoi diagram.
//!
//! Purpose
//! - Arena of half-edges addressed by `HalfEdgeId`. Twins are created together
//!   and refer to each other by index, so the cyclic twin relation never needs
//!   shared ownership.
//! - Per-cell edge lists keyed by `SiteId`, filled as breakpoints appear.
//!
//! Orientation
//! - Every half-edge has its cell on the left. A breakpoint `(left, right)` of
//!   the beachline traces the origin of its left cell's half-edge (equivalently
//!   the destination of the twin).
//!
//! Endpoints start unresolved. They become Voronoi vertices at circle events or
//! truncated far points during finalization; `origin_vertex` and
//! `destination_vertex` tell the two apart.

use nalgebra::Vector2;

use crate::geom2::{angle_around, ccw_offset, SiteId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HalfEdgeId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub usize);

/// One directed side of a Voronoi edge.
#[derive(Clone, Debug, PartialEq)]
pub struct HalfEdge {
    pub origin: Option<Vector2<f64>>,
    pub destination: Option<Vector2<f64>>,
    /// Vertex behind `origin`, if it is a real Voronoi vertex.
    pub origin_vertex: Option<VertexId>,
    /// Vertex behind `destination`, if it is a real Voronoi vertex.
    pub destination_vertex: Option<VertexId>,
    /// Cell on the left of this half-edge.
    pub cell: SiteId,
    pub twin: HalfEdgeId,
    pub next: Option<HalfEdgeId>,
    pub prev: Option<HalfEdgeId>,
}

impl HalfEdge {
    /// Both endpoints are known.
    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.origin.is_some() && self.destination.is_some()
    }

    /// Both endpoints are Voronoi vertices.
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.origin_vertex.is_some() && self.destination_vertex.is_some()
    }

    /// Midpoint of a finalized half-edge.
    pub fn midpoint(&self) -> Option<Vector2<f64>> {
        Some((self.origin? + self.destination?) * 0.5)
    }
}

/// Half-edge arena plus cell index.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    edges: Vec<HalfEdge>,
    vertices: Vec<Vector2<f64>>,
    cells: Vec<Vec<HalfEdgeId>>,
}

impl Mesh {
    /// Empty mesh with one (empty) cell per site.
    pub fn new(site_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            vertices: Vec::new(),
            cells: vec![Vec::new(); site_count],
        }
    }

    /// Create a twin pair between the cells of `left` and `right`.
    ///
    /// Returns the half-edge of `left`; its twin belongs to `right`.
    pub fn add_twin_pair(&mut self, left: SiteId, right: SiteId) -> HalfEdgeId {
        let a = HalfEdgeId(self.edges.len());
        let b = HalfEdgeId(self.edges.len() + 1);
        for (cell, twin) in [(left, b), (right, a)] {
            self.edges.push(HalfEdge {
                origin: None,
                destination: None,
                origin_vertex: None,
                destination_vertex: None,
                cell,
                twin,
                next: None,
                prev: None,
            });
        }
        self.cells[left.0].push(a);
        self.cells[right.0].push(b);
        a
    }

    pub fn add_vertex(&mut self, p: Vector2<f64>) -> VertexId {
        self.vertices.push(p);
        VertexId(self.vertices.len() - 1)
    }

    /// Resolve the origin of `he` (and the destination of its twin) at vertex `v`.
    pub fn set_origin(&mut self, he: HalfEdgeId, v: VertexId) {
        let p = self.vertices[v.0];
        let twin = self.edges[he.0].twin;
        let e = &mut self.edges[he.0];
        e.origin = Some(p);
        e.origin_vertex = Some(v);
        let t = &mut self.edges[twin.0];
        t.destination = Some(p);
        t.destination_vertex = Some(v);
    }

    /// Resolve the destination of `he` (and the origin of its twin) at vertex `v`.
    pub fn set_destination(&mut self, he: HalfEdgeId, v: VertexId) {
        let twin = self.edges[he.0].twin;
        self.set_origin(twin, v);
    }

    /// Give an unresolved origin a far point that is not a Voronoi vertex.
    pub fn truncate_origin(&mut self, he: HalfEdgeId, p: Vector2<f64>) {
        let twin = self.edges[he.0].twin;
        self.edges[he.0].origin = Some(p);
        self.edges[twin.0].destination = Some(p);
    }

    /// `prev.next = next` and `next.prev = prev`.
    pub fn link(&mut self, prev: HalfEdgeId, next: HalfEdgeId) {
        self.edges[prev.0].next = Some(next);
        self.edges[next.0].prev = Some(prev);
    }

    #[inline]
    pub fn half_edge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.edges[id.0]
    }

    #[inline]
    pub fn twin(&self, id: HalfEdgeId) -> HalfEdgeId {
        self.edges[id.0].twin
    }

    pub fn half_edges(&self) -> &[HalfEdge] {
        &self.edges
    }

    pub fn half_edge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.edges.len()).map(HalfEdgeId)
    }

    pub fn vertices(&self) -> &[Vector2<f64>] {
        &self.vertices
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Vector2<f64> {
        self.vertices[id.0]
    }

    /// Half-edges of one cell in creation order.
    pub fn cell(&self, site: SiteId) -> &[HalfEdgeId] {
        &self.cells[site.0]
    }

    pub fn cells(&self) -> &[Vec<HalfEdgeId>] {
        &self.cells
    }

    /// Number of twin pairs (undirected Voronoi edges).
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Half-edges of `site`'s cell ordered counterclockwise around `center`
    /// by the angle of their midpoints, starting from the first created one.
    ///
    /// Unfinalized half-edges are skipped.
    pub fn cell_ccw(&self, site: SiteId, center: Vector2<f64>) -> Vec<HalfEdgeId> {
        let mut keyed: Vec<(f64, HalfEdgeId)> = self.cells[site.0]
            .iter()
            .filter_map(|&id| {
                let m = self.edges[id.0].midpoint()?;
                Some((angle_around(center, m), id))
            })
            .collect();
        let Some(&(reference, _)) = keyed.first() else {
            return Vec::new();
        };
        for k in keyed.iter_mut() {
            k.0 = ccw_offset(reference, k.0);
        }
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        keyed.into_iter().map(|(_, id)| id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn twin_pair_is_mutual_and_indexed_by_cell() {
        let mut m = Mesh::new(3);
        let a = m.add_twin_pair(SiteId(0), SiteId(2));
        let b = m.twin(a);
        assert_eq!(m.twin(b), a);
        assert_eq!(m.half_edge(a).cell, SiteId(0));
        assert_eq!(m.half_edge(b).cell, SiteId(2));
        assert_eq!(m.cell(SiteId(0)), &[a]);
        assert_eq!(m.cell(SiteId(2)), &[b]);
        assert!(m.cell(SiteId(1)).is_empty());
        assert_eq!(m.edge_count(), 1);
    }

    #[test]
    fn endpoints_propagate_to_twin() {
        let mut m = Mesh::new(2);
        let a = m.add_twin_pair(SiteId(0), SiteId(1));
        let v = m.add_vertex(vector![1.0, 2.0]);
        m.set_origin(a, v);
        assert!(!m.half_edge(a).is_finalized());
        m.truncate_origin(m.twin(a), vector![5.0, 5.0]);
        let (e, t) = (m.half_edge(a), m.half_edge(m.twin(a)));
        assert_eq!(e.origin, t.destination);
        assert_eq!(e.destination, t.origin);
        assert_eq!(e.origin_vertex, Some(v));
        assert!(e.is_finalized());
        assert!(!e.is_bounded());
        assert_eq!(e.midpoint(), Some(vector![3.0, 3.5]));
    }

    #[test]
    fn set_destination_is_twin_origin() {
        let mut m = Mesh::new(2);
        let a = m.add_twin_pair(SiteId(0), SiteId(1));
        let v = m.add_vertex(vector![0.0, 0.0]);
        let w = m.add_vertex(vector![0.0, 1.0]);
        m.set_origin(a, v);
        m.set_destination(a, w);
        assert!(m.half_edge(a).is_bounded());
        assert_eq!(m.half_edge(m.twin(a)).origin_vertex, Some(w));
    }

    #[test]
    fn link_sets_both_directions() {
        let mut m = Mesh::new(2);
        let a = m.add_twin_pair(SiteId(0), SiteId(1));
        let b = m.add_twin_pair(SiteId(0), SiteId(1));
        m.link(a, b);
        assert_eq!(m.half_edge(a).next, Some(b));
        assert_eq!(m.half_edge(b).prev, Some(a));
    }

    #[test]
    fn cell_ccw_orders_by_angle_across_the_cut() {
        // Square cell around the origin, edges created in scrambled order.
        let mut m = Mesh::new(5);
        let corners = [
            vector![1.0, 1.0],
            vector![-1.0, 1.0],
            vector![-1.0, -1.0],
            vector![1.0, -1.0],
        ];
        let mut ids = Vec::new();
        for (k, nb) in [(1usize, 1usize), (2, 2), (0, 3), (3, 4)] {
            let id = m.add_twin_pair(SiteId(0), SiteId(nb));
            let (p, q) = (corners[k], corners[(k + 1) % 4]);
            let vp = m.add_vertex(p);
            let vq = m.add_vertex(q);
            m.set_origin(id, vp);
            m.set_destination(id, vq);
            ids.push(id);
        }
        let order = m.cell_ccw(SiteId(0), vector![0.0, 0.0]);
        // Midpoint angles: left (π), bottom (-π/2), top (π/2), right (0).
        assert_eq!(order, vec![ids[0], ids[1], ids[3], ids[2]]);
    }
}
