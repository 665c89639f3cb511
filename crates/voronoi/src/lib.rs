//! Voronoi diagrams of planar point sets by Fortune's sweep.
//!
//! Layout
//! - `geom2`: pure kernel (breakpoints, circumcircles, predicates) and site samplers.
//! - `avl`: arena-backed AVL tree with stable node handles; hosts the beachline.
//! - `sweep`: event queue, beachline, and the engine that drives them.
//! - `mesh`: half-edge output; `diagram`: the finished result plus counters.
//!
//! API Policy
//! - The crate is consumed by the workspace CLI. There is no stable public API;
//!   breaking changes are fine when they improve clarity.

pub mod avl;
pub mod diagram;
pub mod error;
pub mod geom2;
pub mod mesh;
pub mod sweep;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use diagram::{EdgeSegment, SweepStats, VoronoiDiagram};
pub use error::{VoronoiError, VoronoiResult};
pub use geom2::{SiteId, SweepCfg};
pub use nalgebra::Vector2 as Vec2;
pub use sweep::{compute, compute_with_cfg};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::diagram::{EdgeSegment, SweepStats, VoronoiDiagram};
    pub use crate::geom2::rand::{uniform_sites, Bounds2, ReplayToken};
    pub use crate::geom2::{SiteId, SweepCfg};
    pub use crate::mesh::{HalfEdge, HalfEdgeId, Mesh, VertexId};
    pub use crate::sweep::{compute, compute_with_cfg};
    pub use crate::{VoronoiError, VoronoiResult};
    pub use nalgebra::Vector2 as Vec2;
}
