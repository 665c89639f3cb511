//! Finished Voronoi diagram: the mesh, the sites it was built from, and sweep counters.

use nalgebra::Vector2;

use crate::geom2::SiteId;
use crate::mesh::{HalfEdge, HalfEdgeId, Mesh};

/// Counters collected while sweeping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Site events popped, duplicates included.
    pub site_events: usize,
    /// Sites skipped because an identical site came earlier; their cells stay empty.
    pub duplicate_sites: usize,
    /// Circle events popped and processed into a vertex.
    pub circle_events: usize,
    /// Circle events dropped as stale: skipped in the queue, or live but without
    /// a matching arc in the beachline.
    pub stale_circles: usize,
    /// Consecutive arc triples without a circumcircle.
    pub degenerate_triples: usize,
    pub vertices: usize,
    pub half_edges: usize,
}

/// One undirected Voronoi edge, read off a twin pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSegment {
    /// Cell on the left when walking `from -> to`.
    pub left: SiteId,
    pub right: SiteId,
    pub from: Vector2<f64>,
    pub to: Vector2<f64>,
    /// Both ends are Voronoi vertices (not truncated far points).
    pub bounded: bool,
}

#[derive(Clone, Debug)]
pub struct VoronoiDiagram {
    sites: Vec<Vector2<f64>>,
    mesh: Mesh,
    stats: SweepStats,
}

impl VoronoiDiagram {
    pub(crate) fn new(sites: Vec<Vector2<f64>>, mesh: Mesh, stats: SweepStats) -> Self {
        Self { sites, mesh, stats }
    }

    pub fn sites(&self) -> &[Vector2<f64>] {
        &self.sites
    }

    pub fn site(&self, id: SiteId) -> Vector2<f64> {
        self.sites[id.0]
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn stats(&self) -> &SweepStats {
        &self.stats
    }

    pub fn vertices(&self) -> &[Vector2<f64>] {
        self.mesh.vertices()
    }

    pub fn half_edges(&self) -> &[HalfEdge] {
        self.mesh.half_edges()
    }

    /// Half-edges of `site`'s cell in creation order.
    pub fn cell(&self, site: SiteId) -> &[HalfEdgeId] {
        self.mesh.cell(site)
    }

    /// Half-edges of `site`'s cell counterclockwise around the site.
    pub fn cell_ccw(&self, site: SiteId) -> Vec<HalfEdgeId> {
        self.mesh.cell_ccw(site, self.sites[site.0])
    }

    /// Cells with at least one half-edge.
    pub fn non_empty_cells(&self) -> usize {
        self.mesh.cells().iter().filter(|c| !c.is_empty()).count()
    }

    /// Undirected edges, one per twin pair, skipping pairs with an unknown end.
    pub fn edge_segments(&self) -> Vec<EdgeSegment> {
        let edges = self.mesh.half_edges();
        edges
            .iter()
            .step_by(2)
            .filter_map(|e| {
                Some(EdgeSegment {
                    left: e.cell,
                    right: edges[e.twin.0].cell,
                    from: e.origin?,
                    to: e.destination?,
                    bounded: e.is_bounded(),
                })
            })
            .collect()
    }

    /// Site closest to `p` (ties go to the lower index).
    pub fn nearest_site(&self, p: Vector2<f64>) -> Option<SiteId> {
        self.sites
            .iter()
            .enumerate()
            .map(|(i, s)| ((s - p).norm_squared(), i))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, i)| SiteId(i))
    }
}
