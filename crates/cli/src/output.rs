//! JSON view of a diagram.

use serde::Serialize;
use voronoi::diagram::{SweepStats, VoronoiDiagram};
use voronoi::SiteId;

#[derive(Debug, Serialize)]
pub struct DiagramJson {
    pub sites: Vec<[f64; 2]>,
    pub vertices: Vec<[f64; 2]>,
    pub edges: Vec<EdgeJson>,
    pub cells: Vec<CellJson>,
    pub stats: StatsJson,
}

#[derive(Debug, Serialize)]
pub struct EdgeJson {
    pub left: usize,
    pub right: usize,
    pub from: [f64; 2],
    pub to: [f64; 2],
    pub bounded: bool,
}

/// One cell; `half_edges` index into the diagram's half-edge arena, ccw.
#[derive(Debug, Serialize)]
pub struct CellJson {
    pub site: usize,
    pub half_edges: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct StatsJson {
    pub site_events: usize,
    pub duplicate_sites: usize,
    pub circle_events: usize,
    pub stale_circles: usize,
    pub degenerate_triples: usize,
    pub vertices: usize,
    pub half_edges: usize,
}

impl From<&SweepStats> for StatsJson {
    fn from(s: &SweepStats) -> Self {
        Self {
            site_events: s.site_events,
            duplicate_sites: s.duplicate_sites,
            circle_events: s.circle_events,
            stale_circles: s.stale_circles,
            degenerate_triples: s.degenerate_triples,
            vertices: s.vertices,
            half_edges: s.half_edges,
        }
    }
}

impl From<&VoronoiDiagram> for DiagramJson {
    fn from(d: &VoronoiDiagram) -> Self {
        let xy = |p: &nalgebra::Vector2<f64>| [p.x, p.y];
        Self {
            sites: d.sites().iter().map(xy).collect(),
            vertices: d.vertices().iter().map(xy).collect(),
            edges: d
                .edge_segments()
                .into_iter()
                .map(|e| EdgeJson {
                    left: e.left.0,
                    right: e.right.0,
                    from: xy(&e.from),
                    to: xy(&e.to),
                    bounded: e.bounded,
                })
                .collect(),
            cells: (0..d.sites().len())
                .map(|s| CellJson {
                    site: s,
                    half_edges: d.cell_ccw(SiteId(s)).into_iter().map(|h| h.0).collect(),
                })
                .collect(),
            stats: d.stats().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn three_site_json_shape() {
        let sites = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(2.0, 4.0),
        ];
        let d = voronoi::compute(&sites).unwrap();
        let v = serde_json::to_value(DiagramJson::from(&d)).unwrap();
        assert_eq!(v["sites"].as_array().unwrap().len(), 3);
        assert_eq!(v["vertices"][0][0], 2.0);
        assert_eq!(v["vertices"][0][1], 1.5);
        assert_eq!(v["edges"].as_array().unwrap().len(), 3);
        assert_eq!(v["cells"][1]["half_edges"].as_array().unwrap().len(), 2);
        assert_eq!(v["stats"]["circle_events"], 1);
    }
}
