//! Fortune's sweep over a set of planar sites.
//!
//! Purpose
//! - Turn a finite site list into a half-edge `Mesh` with one cell per site.
//!
//! Why this design
//! - The beachline is a positional `AvlTree` of breakpoints whose keys are
//!   recomputed from the current `SweepLine` on every comparison. Inserts at a
//!   site event and removals at a circle event go through node handles, so the
//!   tree never needs a comparator that would silently depend on the sweep
//!   position.
//! - Circle events are invalidated lazily (flag in the queue record) and
//!   re-located in the beachline by searching at the circle center.
//! - Breakpoints carry the half-edge whose origin they trace; the edge is
//!   resolved either at a circle event (Voronoi vertex) or during `finalize`
//!   (far point).
//!
//! References
//! - S. Fortune, "A sweepline algorithm for Voronoi diagrams", Algorithmica 2 (1987).
//! - de Berg et al., "Computational Geometry", ch. 7.
//! - Code cross-refs: `geom2::kernel` (keys, circles), `mesh::Mesh`, `diagram::VoronoiDiagram`.

pub mod beachline;
pub mod engine;
pub mod queue;

use nalgebra::Vector2;

pub use beachline::{ArcLocation, ArcSide, BeachItem, Beachline, Breakpoint};
pub use engine::Sweep;
pub use queue::{CircleEvent, CircleId, Event, EventQueue, SiteEvent};

use crate::diagram::VoronoiDiagram;
use crate::error::VoronoiResult;
use crate::geom2::SweepCfg;

/// Voronoi diagram of `sites` with default tolerances.
pub fn compute(sites: &[Vector2<f64>]) -> VoronoiResult<VoronoiDiagram> {
    compute_with_cfg(sites, SweepCfg::default())
}

/// Voronoi diagram of `sites`; fails on non-finite coordinates.
pub fn compute_with_cfg(sites: &[Vector2<f64>], cfg: SweepCfg) -> VoronoiResult<VoronoiDiagram> {
    Ok(Sweep::new(sites.to_vec(), cfg)?.run())
}
