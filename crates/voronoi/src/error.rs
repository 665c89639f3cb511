//! Error type shared by the kernel and the sweep.

use thiserror::Error;

use crate::geom2::SiteId;

/// Failures surfaced by the core.
///
/// Stale circle events are not errors; they are an expected steady state of
/// lazy deletion and only show up in `SweepStats::stale_circles`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoronoiError {
    /// A site with a NaN or infinite coordinate. Rejected before the sweep starts.
    #[error("site {index} has non-finite coordinates ({x}, {y})")]
    NonFiniteSite { index: usize, x: f64, y: f64 },
    /// Three sites without a circumcircle (collinear or coincident).
    #[error("sites {sites:?} are collinear or coincident; no circumcircle")]
    DegenerateInput { sites: [SiteId; 3] },
}

pub type VoronoiResult<T> = Result<T, VoronoiError>;
