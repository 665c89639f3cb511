//! Planar geometry for the sweep.
//!
//! Purpose
//! - Pure predicates and constructions the sweep needs: breakpoint positions on
//!   a parabolic beachline, circumcircles, event realizability, angular order.
//! - Small value types (`SiteId`, `Circle`, `SweepLine`) and the tolerance
//!   bundle `SweepCfg`.
//!
//! Why this design
//! - The beachline key depends on simulation time. Keeping the kernel pure and
//!   taking the sweep position as an argument makes that dependency explicit
//!   at every call site.
//!
//! References
//! - S. Fortune, "A sweepline algorithm for Voronoi diagrams", Algorithmica 2 (1987).
//! - Code cross-refs: `sweep::beachline` (keys), `sweep::engine` (events), `mesh` (ordering).

pub mod kernel;
pub mod rand;
mod types;

pub use kernel::{
    angle_around, breakpoint_point, breakpoint_x, ccw_offset, circumcircle, is_realizable,
    orientation, parabola_y,
};
pub use types::{Circle, SiteId, SweepCfg, SweepLine};

#[cfg(test)]
mod tests;
