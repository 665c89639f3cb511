//! Beachline: the ordered breakpoints of the sweep, stored in an `AvlTree`.
//!
//! Arcs are never materialized. The arc of a site is the gap between two
//! in-order neighbours `(.., s)` and `(s, ..)`; the outermost arcs are open on
//! one side. While only one arc exists it is represented by a `Marker`.
//!
//! Keys are computed on demand from `(left, right, sweep.y())`. Every keyed
//! operation takes the `SweepLine` explicitly; see `avl` for the comparator
//! hazard this guards against.

use std::cmp::Ordering;

use nalgebra::Vector2;

use crate::avl::{AvlTree, NodeId};
use crate::geom2::{breakpoint_x, SiteId, SweepLine};
use crate::mesh::HalfEdgeId;

use super::queue::CircleId;

/// Boundary between the arcs of `left` and `right`.
#[derive(Clone, Debug, PartialEq)]
pub struct Breakpoint {
    pub left: SiteId,
    pub right: SiteId,
    /// Half-edge of `left`'s cell whose origin this breakpoint traces.
    pub edge: HalfEdgeId,
    /// Circle events that would remove this breakpoint.
    pub circles: Vec<CircleId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BeachItem {
    /// The single arc of a beachline that has no breakpoint yet.
    Marker(SiteId),
    Breakpoint(Breakpoint),
}

impl BeachItem {
    pub fn breakpoint(left: SiteId, right: SiteId, edge: HalfEdgeId) -> Self {
        BeachItem::Breakpoint(Breakpoint {
            left,
            right,
            edge,
            circles: Vec::new(),
        })
    }

    /// Site of the arc left of this item.
    pub fn left_site(&self) -> SiteId {
        match self {
            BeachItem::Marker(s) => *s,
            BeachItem::Breakpoint(b) => b.left,
        }
    }

    /// Site of the arc right of this item.
    pub fn right_site(&self) -> SiteId {
        match self {
            BeachItem::Marker(s) => *s,
            BeachItem::Breakpoint(b) => b.right,
        }
    }

    /// Current x-position for the sweep line at `sweep`.
    pub fn key(&self, sites: &[Vector2<f64>], sweep: &SweepLine) -> f64 {
        match self {
            BeachItem::Marker(s) => sites[s.0].x,
            BeachItem::Breakpoint(b) => breakpoint_x(sites[b.left.0], sites[b.right.0], sweep.y()),
        }
    }
}

/// Which side of the located node the arc lies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArcSide {
    Left,
    Right,
}

/// Result of `Beachline::locate_arc`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcLocation {
    /// Node bracketing the arc.
    pub node: NodeId,
    pub side: ArcSide,
    pub arc: SiteId,
    pub is_marker: bool,
}

#[derive(Clone, Debug, Default)]
pub struct Beachline {
    tree: AvlTree<BeachItem>,
}

impl Beachline {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn tree(&self) -> &AvlTree<BeachItem> {
        &self.tree
    }

    pub fn item(&self, id: NodeId) -> &BeachItem {
        &self.tree[id]
    }

    pub fn breakpoint(&self, id: NodeId) -> Option<&Breakpoint> {
        match self.tree.get(id)? {
            BeachItem::Breakpoint(b) => Some(b),
            BeachItem::Marker(_) => None,
        }
    }

    pub fn breakpoint_mut(&mut self, id: NodeId) -> Option<&mut Breakpoint> {
        match self.tree.get_mut(id)? {
            BeachItem::Breakpoint(b) => Some(b),
            BeachItem::Marker(_) => None,
        }
    }

    pub fn key(&self, id: NodeId, sites: &[Vector2<f64>], sweep: &SweepLine) -> f64 {
        self.tree[id].key(sites, sweep)
    }

    /// Node where a search for `x` ends (exact key match or in-order neighbour
    /// of the insertion point). `None` for an empty beachline.
    pub fn search_x(&self, x: f64, sites: &[Vector2<f64>], sweep: &SweepLine) -> Option<NodeId> {
        self.tree
            .search_candidate_location_by(|item| x.total_cmp(&item.key(sites, sweep)))
            .1
    }

    /// Arc directly above `x` for the sweep line at `sweep`.
    ///
    /// On an exact hit of a breakpoint the arc to its right is reported.
    pub fn locate_arc(
        &self,
        x: f64,
        sites: &[Vector2<f64>],
        sweep: &SweepLine,
    ) -> Option<ArcLocation> {
        let node = self.search_x(x, sites, sweep)?;
        let item = &self.tree[node];
        let side = match item.key(sites, sweep).total_cmp(&x) {
            Ordering::Greater => ArcSide::Left,
            Ordering::Less | Ordering::Equal => ArcSide::Right,
        };
        let arc = match side {
            ArcSide::Left => item.left_site(),
            ArcSide::Right => item.right_site(),
        };
        Some(ArcLocation {
            node,
            side,
            arc,
            is_marker: matches!(item, BeachItem::Marker(_)),
        })
    }

    pub fn insert_marker(&mut self, site: SiteId) -> NodeId {
        debug_assert!(self.tree.is_empty());
        self.tree.clear();
        match self.tree.insert(BeachItem::Marker(site), |_, _| Ordering::Equal) {
            Ok(id) => id,
            Err(_) => unreachable!("insert into a cleared tree"),
        }
    }

    pub fn insert_before(&mut self, id: NodeId, item: BeachItem) -> NodeId {
        self.tree.insert_before(id, item)
    }

    pub fn insert_after(&mut self, id: NodeId, item: BeachItem) -> NodeId {
        self.tree.insert_after(id, item)
    }

    pub fn replace(&mut self, id: NodeId, item: BeachItem) -> BeachItem {
        self.tree.replace(id, item)
    }

    pub fn remove(&mut self, id: NodeId) -> BeachItem {
        self.tree.remove_node(id)
    }

    #[inline]
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        self.tree.predecessor(id)
    }

    #[inline]
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        self.tree.successor(id)
    }

    #[inline]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.tree.contains_node(id)
    }

    /// Whether `l`, `r` are the breakpoints `(t0, t1)`, `(t1, t2)` of `triple`.
    pub fn flanks(&self, l: NodeId, r: NodeId, triple: [SiteId; 3]) -> bool {
        match (self.breakpoint(l), self.breakpoint(r)) {
            (Some(a), Some(b)) => {
                a.left == triple[0] && a.right == triple[1] && b.left == triple[1] && b.right == triple[2]
            }
            _ => false,
        }
    }

    /// Breakpoints in left-to-right order.
    pub fn breakpoints(&self) -> impl Iterator<Item = (NodeId, &Breakpoint)> + '_ {
        self.tree.iter().filter_map(|(id, item)| match item {
            BeachItem::Breakpoint(b) => Some((id, b)),
            BeachItem::Marker(_) => None,
        })
    }

    /// Arc sites left to right, rebuilt from the leaf-classified traversal.
    ///
    /// Of two in-order neighbours at least one has at most one child, so the
    /// reported nodes touch every arc; a skipped node only hides the arc pair
    /// it separates, which the neighbours on both sides report.
    pub fn arc_sites(&self) -> Vec<SiteId> {
        let mut out: Vec<SiteId> = Vec::new();
        let mut push = |s: SiteId| {
            if out.last() != Some(&s) {
                out.push(s);
            }
        };
        for (_, id) in self.tree.leaf_classified() {
            let item = &self.tree[id];
            push(item.left_site());
            push(item.right_site());
        }
        out
    }

    /// Arc sites left to right from the full in-order walk.
    pub fn arc_sites_in_order(&self) -> Vec<SiteId> {
        let mut out: Vec<SiteId> = Vec::new();
        for (_, item) in self.tree.iter() {
            if out.is_empty() {
                out.push(item.left_site());
            }
            if out.last() != Some(&item.right_site()) {
                out.push(item.right_site());
            }
        }
        out
    }

    /// Consistency of the current order at `sweep` (non-decreasing keys, shared
    /// arcs between neighbours, cached tree shape).
    pub fn check(&self, sites: &[Vector2<f64>], sweep: &SweepLine, tol: f64) -> Result<(), String> {
        self.tree.check_invariants(|_, _| Ordering::Less)?;
        let items: Vec<&BeachItem> = self.tree.iter().map(|(_, v)| v).collect();
        for w in items.windows(2) {
            if w[0].right_site() != w[1].left_site() {
                return Err(format!("arc mismatch between {:?} and {:?}", w[0], w[1]));
            }
            let (k0, k1) = (w[0].key(sites, sweep), w[1].key(sites, sweep));
            if k0 > k1 + tol {
                return Err(format!("keys out of order: {k0} > {k1}"));
            }
        }
        Ok(())
    }
}
