//! Basic 2D types and tolerances used by the sweep.
//!
//! - `SiteId`: stable index of an input site; doubles as the cell identity.
//! - `SweepCfg`: centralizes epsilons for degeneracy, event timing, arc
//!   relocation, and the truncation depth of unbounded edges.
//! - `SweepLine`: the one piece of global simulation time. Every beachline key
//!   is evaluated against an explicit `SweepLine`, never against hidden state.
//! - `Circle`: circumcircle of three sites; its lowest point is the event time.

use nalgebra::Vector2;

/// Index of an input site (and of the Voronoi cell it generates).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SiteId(pub usize);

/// Sweep configuration (tolerances).
///
/// `eps_time`, `eps_locate` are relative to the input extent; the engine scales
/// them once before the sweep starts.
#[derive(Clone, Copy, Debug)]
pub struct SweepCfg {
    /// Relative sine threshold below which three sites count as collinear.
    pub eps_det: f64,
    /// Slack for `is_realizable`: a circle whose lowest point is at most this far
    /// above the sweep line is still scheduled.
    pub eps_time: f64,
    /// Max distance between a breakpoint key and a circle center when re-locating
    /// the vanishing arc of a circle event.
    pub eps_locate: f64,
    /// `finalize` evaluates open breakpoints this many extents below the lower of
    /// the lowest site and the last event.
    pub truncation_factor: f64,
}

impl Default for SweepCfg {
    fn default() -> Self {
        Self {
            eps_det: 1e-12,
            eps_time: 1e-9,
            eps_locate: 1e-6,
            truncation_factor: 10.0,
        }
    }
}

impl SweepCfg {
    /// Copy with the absolute tolerances multiplied by `scale` (input extent, >= 1).
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            eps_det: self.eps_det,
            eps_time: self.eps_time * scale,
            eps_locate: self.eps_locate * scale,
            truncation_factor: self.truncation_factor,
        }
    }
}

/// Horizontal sweep line moving from `+inf` towards `-inf`.
///
/// Invariant: `y` never increases. Beachline order is only meaningful for the
/// value of `y` at the time of a comparison; do not move the line between a
/// search and the insert that relies on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepLine {
    y: f64,
}

impl SweepLine {
    pub fn new(y: f64) -> Self {
        Self { y }
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Move the line down to `y`. Requests to move up are ignored.
    #[inline]
    pub fn advance_to(&mut self, y: f64) {
        if y < self.y {
            self.y = y;
        }
    }
}

impl Default for SweepLine {
    fn default() -> Self {
        Self::new(f64::INFINITY)
    }
}

/// Circle through three sites.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vector2<f64>,
    pub radius: f64,
}

impl Circle {
    /// Point where a descending sweep line first leaves the circle.
    #[inline]
    pub fn lowest_point(&self) -> Vector2<f64> {
        Vector2::new(self.center.x, self.center.y - self.radius)
    }

    /// Membership with `slack` added to the radius.
    ///
    /// `slack > 0` is permissive (points on the boundary count as inside),
    /// `slack < 0` demands a margin.
    #[inline]
    pub fn contains(&self, p: Vector2<f64>, slack: f64) -> bool {
        (p - self.center).norm() < self.radius + slack
    }
}
