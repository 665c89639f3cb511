//! Sweep engine: pops events, edits the beachline, emits mesh elements.
//!
//! The engine owns the queue, the beachline and the mesh for the duration of
//! one run; nothing else holds a handle into them.

use std::collections::HashMap;

use nalgebra::Vector2;
use tracing::{debug, info, trace, warn};

use crate::avl::NodeId;
use crate::diagram::{SweepStats, VoronoiDiagram};
use crate::error::{VoronoiError, VoronoiResult};
use crate::geom2::rand::Bounds2;
use crate::geom2::{
    breakpoint_point, circumcircle, is_realizable, orientation, Circle, SiteId, SweepCfg,
    SweepLine,
};
use crate::mesh::{HalfEdgeId, Mesh};

use super::beachline::{ArcLocation, ArcSide, BeachItem, Beachline};
use super::queue::{CircleEvent, CircleId, Event, EventQueue, SiteEvent};

/// In-order neighbours inspected on each side of the search hit when
/// re-locating the vanishing arc of a circle event.
const LOCATE_WINDOW: usize = 2;

/// One Fortune sweep over a fixed site set, advanced event by event.
pub struct Sweep {
    sites: Vec<Vector2<f64>>,
    cfg: SweepCfg,
    bounds: Bounds2,
    sweep: SweepLine,
    queue: EventQueue,
    beachline: Beachline,
    mesh: Mesh,
    /// Live circle event per arc triple; at most one is scheduled at a time.
    pending: HashMap<[SiteId; 3], CircleId>,
    /// Breakpoints each circle event was registered on, indexed by `CircleId`.
    circle_nodes: Vec<(NodeId, NodeId)>,
    last_site: Option<SiteEvent>,
    stats: SweepStats,
}

impl Sweep {
    /// Validate `sites` and seed the queue. Tolerances in `cfg` are scaled by the
    /// input extent.
    pub fn new(sites: Vec<Vector2<f64>>, cfg: SweepCfg) -> VoronoiResult<Self> {
        if let Some((index, p)) = sites
            .iter()
            .enumerate()
            .find(|(_, p)| !(p.x.is_finite() && p.y.is_finite()))
        {
            return Err(VoronoiError::NonFiniteSite {
                index,
                x: p.x,
                y: p.y,
            });
        }
        let bounds = Bounds2::of_points(&sites).unwrap_or_default();
        let queue = EventQueue::with_sites(&sites);
        let mesh = Mesh::new(sites.len());
        Ok(Self {
            cfg: cfg.scaled(bounds.extent().max(1.0)),
            bounds,
            sweep: SweepLine::default(),
            queue,
            beachline: Beachline::new(),
            mesh,
            pending: HashMap::new(),
            circle_nodes: Vec::new(),
            last_site: None,
            stats: SweepStats::default(),
            sites,
        })
    }

    /// Current sweep position; `+inf` before the first site event.
    pub fn sweep_line(&self) -> SweepLine {
        self.sweep
    }

    /// Arcs and breakpoints at the current sweep position.
    pub fn beachline(&self) -> &Beachline {
        &self.beachline
    }

    /// Mesh built so far; ends of edges still on the beachline are open.
    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn sites(&self) -> &[Vector2<f64>] {
        &self.sites
    }

    /// Tolerances after scaling.
    pub fn cfg(&self) -> SweepCfg {
        self.cfg
    }

    /// Counters so far, including stale events skipped inside the queue.
    pub fn stats(&self) -> SweepStats {
        let mut s = self.stats;
        s.stale_circles += self.queue.stale_skipped();
        s.vertices = self.mesh.vertices().len();
        s.half_edges = self.mesh.half_edges().len();
        s
    }

    /// Sweep to completion, close open edges, and hand out the diagram.
    pub fn run(mut self) -> VoronoiDiagram {
        while self.step().is_some() {}
        let y_far = self.far_y();
        debug_assert!(y_far < self.sweep.y());
        self.finalize(y_far);
        self.into_diagram()
    }

    /// Process the next live event and return it; `None` once the queue is drained.
    pub fn step(&mut self) -> Option<Event> {
        let event = self.queue.pop()?;
        match event {
            Event::Site(s) => self.handle_site(s),
            Event::Circle(c) => self.handle_circle(c),
        }
        if tracing::enabled!(tracing::Level::TRACE) {
            trace!(sweep_y = self.sweep.y(), arcs = ?self.beachline.arc_sites(), "beachline");
        }
        Some(event)
    }

    /// Sweep position used to close the edges still open at the end.
    ///
    /// Lies below both the lowest site and the last processed event, so every
    /// surviving breakpoint is evaluated past the vertex its edge started at.
    pub fn far_y(&self) -> f64 {
        let reach = self.cfg.truncation_factor * self.bounds.extent().max(1.0);
        self.sweep.y().min(self.bounds.min.y) - reach
    }

    fn handle_site(&mut self, ev: SiteEvent) {
        self.stats.site_events += 1;
        if let Some(prev) = self.last_site {
            if prev.point == ev.point {
                self.stats.duplicate_sites += 1;
                debug!(site = ev.site.0, duplicate_of = prev.site.0, "skipping coincident site");
                return;
            }
        }
        self.last_site = Some(ev);
        self.sweep.advance_to(ev.point.y);
        let s = ev.site;

        let Some(loc) = self.beachline.locate_arc(ev.point.x, &self.sites, &self.sweep) else {
            self.beachline.insert_marker(s);
            debug!(site = s.0, "first arc");
            return;
        };
        let old = loc.arc;
        let old_p = self.sites[old.0];

        if old_p.y <= self.sweep.y() {
            // Both sites on the sweep line: their arcs are vertical rays and one
            // breakpoint separates them.
            let (l, r) = if old_p.x <= ev.point.x { (old, s) } else { (s, old) };
            let edge = self.mesh.add_twin_pair(l, r);
            let item = BeachItem::breakpoint(l, r, edge);
            let id = if loc.is_marker {
                self.beachline.replace(loc.node, item);
                loc.node
            } else {
                match loc.side {
                    ArcSide::Right => self.beachline.insert_after(loc.node, item),
                    ArcSide::Left => self.beachline.insert_before(loc.node, item),
                }
            };
            debug!(site = s.0, arc = old.0, "site on the sweep line beside its neighbour");
            if let Some(p) = self.beachline.predecessor(id) {
                self.check_circle(p, id);
            }
            if let Some(n) = self.beachline.successor(id) {
                self.check_circle(id, n);
            }
            return;
        }

        self.invalidate_split_arc(&loc, ev.point);

        let edge = self.mesh.add_twin_pair(old, s);
        let twin = self.mesh.twin(edge);
        let left = BeachItem::breakpoint(old, s, edge);
        let right = BeachItem::breakpoint(s, old, twin);
        let (l_id, r_id) = if loc.is_marker {
            self.beachline.replace(loc.node, left);
            let r = self.beachline.insert_after(loc.node, right);
            (loc.node, r)
        } else {
            match loc.side {
                ArcSide::Right => {
                    let l = self.beachline.insert_after(loc.node, left);
                    let r = self.beachline.insert_after(l, right);
                    (l, r)
                }
                ArcSide::Left => {
                    let r = self.beachline.insert_before(loc.node, right);
                    let l = self.beachline.insert_before(r, left);
                    (l, r)
                }
            }
        };
        debug!(site = s.0, arc = old.0, y = ev.point.y, "split arc");

        if let Some(p) = self.beachline.predecessor(l_id) {
            self.check_circle(p, l_id);
        }
        if let Some(n) = self.beachline.successor(r_id) {
            self.check_circle(r_id, n);
        }
    }

    /// Drop pending circle events of the arc being split whose circle contains
    /// the new site.
    fn invalidate_split_arc(&mut self, loc: &ArcLocation, p: Vector2<f64>) {
        let Some(bp) = self.beachline.breakpoint(loc.node) else {
            return;
        };
        let slack = self.cfg.eps_locate;
        let hits: Vec<CircleId> = bp
            .circles
            .iter()
            .copied()
            .filter(|&id| {
                let c = self.queue.circle(id);
                c.valid && c.triple[1] == loc.arc && c.circle().contains(p, slack)
            })
            .collect();
        for id in hits {
            debug!(circle = id.0, "false alarm: site inside pending circle");
            self.drop_circle(id);
        }
    }

    fn handle_circle(&mut self, ev: CircleEvent) {
        if self.pending.get(&ev.triple) == Some(&ev.id) {
            self.pending.remove(&ev.triple);
        }
        self.sweep.advance_to(ev.lowest.y);

        let Some((n1, n2)) = self.locate_vanishing_arc(&ev) else {
            self.queue.invalidate(ev.id);
            self.stats.stale_circles += 1;
            debug!(circle = ev.id.0, triple = ?ev.triple, "no arc matches circle event; dropped");
            return;
        };
        self.queue.invalidate(ev.id);
        for node in [n1, n2] {
            let ids = self
                .beachline
                .breakpoint_mut(node)
                .map(|bp| std::mem::take(&mut bp.circles))
                .unwrap_or_default();
            for id in ids {
                self.drop_circle(id);
            }
        }

        let (a, e1) = match self.beachline.breakpoint(n1) {
            Some(bp) => (bp.left, bp.edge),
            None => return,
        };
        let (c, e2) = match self.beachline.breakpoint(n2) {
            Some(bp) => (bp.right, bp.edge),
            None => return,
        };
        self.stats.circle_events += 1;

        let v = self.mesh.add_vertex(ev.center);
        self.mesh.set_origin(e1, v);
        self.mesh.set_origin(e2, v);
        let h = self.mesh.add_twin_pair(a, c);
        self.mesh.set_destination(h, v);
        let (t1, t2, th) = (self.mesh.twin(e1), self.mesh.twin(e2), self.mesh.twin(h));
        self.mesh.link(h, e1);
        self.mesh.link(t1, e2);
        self.mesh.link(t2, th);

        self.beachline.remove(n2);
        self.beachline.replace(n1, BeachItem::breakpoint(a, c, h));
        debug!(
            circle = ev.id.0,
            vertex = v.0,
            x = ev.center.x,
            y = ev.center.y,
            arc = ev.triple[1].0,
            "arc vanished"
        );

        if let Some(p) = self.beachline.predecessor(n1) {
            self.check_circle(p, n1);
        }
        if let Some(n) = self.beachline.successor(n1) {
            self.check_circle(n1, n);
        }
    }

    /// Adjacent breakpoints `(t0, t1)`, `(t1, t2)` of the event's triple.
    ///
    /// Searches the beachline at the circle center and scans a small window
    /// around the hit, taking the pair whose keys are closest to the center.
    /// Falls back to the breakpoints the event was registered on.
    fn locate_vanishing_arc(&self, ev: &CircleEvent) -> Option<(NodeId, NodeId)> {
        let x = ev.center.x;
        let hit = self.beachline.search_x(x, &self.sites, &self.sweep)?;
        let mut cur = hit;
        for _ in 0..LOCATE_WINDOW {
            match self.beachline.predecessor(cur) {
                Some(p) => cur = p,
                None => break,
            }
        }
        let mut best: Option<(f64, NodeId, NodeId)> = None;
        for _ in 0..2 * LOCATE_WINDOW + 1 {
            let Some(next) = self.beachline.successor(cur) else {
                break;
            };
            if self.beachline.flanks(cur, next, ev.triple) {
                let err = (self.beachline.key(cur, &self.sites, &self.sweep) - x)
                    .abs()
                    .max((self.beachline.key(next, &self.sites, &self.sweep) - x).abs());
                if best.map_or(true, |(e, _, _)| err < e) {
                    best = Some((err, cur, next));
                }
            }
            cur = next;
        }
        if let Some((err, l, r)) = best {
            if err <= self.cfg.eps_locate {
                return Some((l, r));
            }
        }

        let &(l, r) = self.circle_nodes.get(ev.id.0)?;
        let adjacent = self.beachline.contains_node(l)
            && self.beachline.contains_node(r)
            && self.beachline.successor(l) == Some(r)
            && self.beachline.flanks(l, r, ev.triple);
        if adjacent {
            warn!(
                circle = ev.id.0,
                x,
                key_err = ?best.map(|b| b.0),
                "vanishing arc found through registered breakpoints only"
            );
            return Some((l, r));
        }
        None
    }

    /// Schedule the circle event of the arc between breakpoints `l` and `r` if
    /// they converge and the event is not behind the sweep line.
    fn check_circle(&mut self, l: NodeId, r: NodeId) {
        let (Some(bl), Some(br)) = (self.beachline.breakpoint(l), self.beachline.breakpoint(r))
        else {
            return;
        };
        debug_assert_eq!(bl.right, br.left);
        let triple = [bl.left, bl.right, br.right];
        if triple[0] == triple[2] {
            return;
        }
        if let Some(&id) = self.pending.get(&triple) {
            if self.queue.is_valid(id) {
                return;
            }
        }
        let circle = match self.circle_of(triple) {
            Ok(c) => c,
            Err(err) => {
                self.stats.degenerate_triples += 1;
                debug!(%err, "no circle event");
                return;
            }
        };
        let [a, b, c] = triple.map(|s| self.sites[s.0]);
        if orientation(a, b, c) >= 0.0 {
            return;
        }
        if !is_realizable(&circle, self.sweep.y(), self.cfg.eps_time) {
            return;
        }
        let id = self.queue.push_circle(triple, circle);
        debug_assert_eq!(id.0, self.circle_nodes.len());
        self.circle_nodes.push((l, r));
        self.pending.insert(triple, id);
        for node in [l, r] {
            if let Some(bp) = self.beachline.breakpoint_mut(node) {
                bp.circles.push(id);
            }
        }
        trace!(
            circle = id.0,
            triple = ?triple,
            lowest_y = circle.center.y - circle.radius,
            "circle event scheduled"
        );
    }

    fn circle_of(&self, triple: [SiteId; 3]) -> VoronoiResult<Circle> {
        let [a, b, c] = triple.map(|s| self.sites[s.0]);
        circumcircle(a, b, c, self.cfg.eps_det).ok_or(VoronoiError::DegenerateInput { sites: triple })
    }

    fn drop_circle(&mut self, id: CircleId) {
        if self.queue.invalidate(id) {
            let triple = self.queue.circle(id).triple;
            if self.pending.get(&triple) == Some(&id) {
                self.pending.remove(&triple);
            }
        }
    }

    /// Close every edge end still open after the last event.
    ///
    /// Breakpoints left in the beachline are evaluated at `y_far`. Remaining
    /// loose ends belong to bisectors of sites that shared the topmost row and
    /// run upwards; they are cut at the same depth above the sites.
    pub fn finalize(&mut self, y_far: f64) {
        let open: Vec<(HalfEdgeId, Vector2<f64>)> = self
            .beachline
            .breakpoints()
            .filter(|(_, bp)| self.mesh.half_edge(bp.edge).origin.is_none())
            .map(|(_, bp)| {
                let p = breakpoint_point(self.sites[bp.left.0], self.sites[bp.right.0], y_far);
                (bp.edge, p)
            })
            .collect();
        let traced = open.len();
        for (he, p) in open {
            self.mesh.truncate_origin(he, p);
        }

        let reach = self.cfg.truncation_factor * self.bounds.extent().max(1.0);
        let loose: Vec<HalfEdgeId> = self
            .mesh
            .half_edge_ids()
            .filter(|&id| self.mesh.half_edge(id).origin.is_none())
            .collect();
        for he in &loose {
            let e = self.mesh.half_edge(*he);
            let l = self.sites[e.cell.0];
            let r = self.sites[self.mesh.half_edge(e.twin).cell.0];
            let d = r - l;
            let mut dir = Vector2::new(-d.y, d.x);
            if dir.y < 0.0 {
                dir = -dir;
            }
            let n = dir.norm();
            if n > 0.0 {
                dir /= n;
            }
            self.mesh.truncate_origin(*he, (l + r) * 0.5 + dir * reach);
        }
        debug!(y_far, traced, upward = loose.len(), "finalized open edges");
    }

    pub fn into_diagram(self) -> VoronoiDiagram {
        let stats = self.stats();
        info!(
            sites = self.sites.len(),
            vertices = stats.vertices,
            edges = self.mesh.edge_count(),
            stale_circles = stats.stale_circles,
            degenerate_triples = stats.degenerate_triples,
            duplicate_sites = stats.duplicate_sites,
            "sweep finished"
        );
        VoronoiDiagram::new(self.sites, self.mesh, stats)
    }
}
