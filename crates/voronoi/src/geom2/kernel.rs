//! Geometry kernel: breakpoints, circumcircles, event predicates.
//!
//! All functions are pure. The sweep position enters as a plain `f64` argument;
//! callers pass `SweepLine::y()`.
//!
//! Conventions
//! - The sweep line descends. A site `f` above the line at `l` induces the
//!   parabola of points equidistant from `f` and the line; the beachline is the
//!   lower envelope of those parabolas.
//! - A breakpoint is addressed by its ordered arc pair `(left, right)`.

use std::f64::consts::TAU;

use nalgebra::Vector2;

use super::types::Circle;

/// x-coordinate of the breakpoint between the arc of `a` (left) and the arc of
/// `b` (right) for the sweep line at `sweep_y`.
///
/// With `u = x - a.x`, `da = a.y - l`, `db = b.y - l`, the two parabolas meet at
/// `u = (-da·dx + sqrt(da·db)·|b - a|) / (b.y - a.y)`; the `+` root is the one
/// with `a` on the left. The expression is evaluated in whichever of its two
/// algebraically equal forms avoids cancellation.
///
/// Special cases
/// - `a.y == b.y`: vertical bisector `x = (a.x + b.x) / 2`.
/// - A focus on (or below) the line degenerates to a vertical ray at its own x.
pub fn breakpoint_x(a: Vector2<f64>, b: Vector2<f64>, sweep_y: f64) -> f64 {
    let da = a.y - sweep_y;
    let db = b.y - sweep_y;
    if da <= 0.0 {
        return a.x;
    }
    if db <= 0.0 {
        return b.x;
    }
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let s = (da * db).sqrt() * dx.hypot(dy);
    let lead = da * dx;
    if lead >= 0.0 {
        // lead + s > 0 unless a == b
        let den = lead + s;
        if den > 0.0 {
            return a.x + da * (dx * dx + db * dy) / den;
        }
        return a.x;
    }
    if dy == 0.0 {
        // a right of b on the same row: no such breakpoint; fall back to the bisector.
        return 0.5 * (a.x + b.x);
    }
    a.x + (s - lead) / dy
}

/// Height of the parabola with `focus` over the directrix `sweep_y` at `x`.
///
/// Requires `focus.y > sweep_y`.
#[inline]
pub fn parabola_y(focus: Vector2<f64>, sweep_y: f64, x: f64) -> f64 {
    let d = focus.y - sweep_y;
    let u = x - focus.x;
    (u * u) / (2.0 * d) + 0.5 * (focus.y + sweep_y)
}

/// Point on the breakpoint `(a, b)` at sweep position `sweep_y`.
pub fn breakpoint_point(a: Vector2<f64>, b: Vector2<f64>, sweep_y: f64) -> Vector2<f64> {
    let x = breakpoint_x(a, b, sweep_y);
    // The higher focus gives the better conditioned parabola.
    let focus = if a.y >= b.y { a } else { b };
    Vector2::new(x, parabola_y(focus, sweep_y, x))
}

/// Twice the signed area of `(a, b, c)`; positive for a counterclockwise turn.
///
/// For arcs `a, b, c` read left to right on a descending beachline, the two
/// breakpoints converge iff this is negative.
#[inline]
pub fn orientation(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Circumcircle of `a, b, c`; `None` if the points are collinear or coincident.
///
/// `eps_det` is a threshold on the sine of the angle at `a`: the triple is
/// rejected when `|ab × ac| <= eps_det · |ab| · |ac|`.
pub fn circumcircle(
    a: Vector2<f64>,
    b: Vector2<f64>,
    c: Vector2<f64>,
    eps_det: f64,
) -> Option<Circle> {
    let ab = b - a;
    let ac = c - a;
    let cross = ab.x * ac.y - ab.y * ac.x;
    let ab2 = ab.norm_squared();
    let ac2 = ac.norm_squared();
    if !(cross.abs() > eps_det * (ab2 * ac2).sqrt()) {
        return None;
    }
    let d = 2.0 * cross;
    let ux = (ac.y * ab2 - ab.y * ac2) / d;
    let uy = (ab.x * ac2 - ac.x * ab2) / d;
    let rel = Vector2::new(ux, uy);
    Some(Circle {
        center: a + rel,
        radius: rel.norm(),
    })
}

/// True iff the circle's lowest point lies below `sweep_y + tol`.
///
/// `tol = 0` is the strict predicate `center.y - radius < sweep_y`.
#[inline]
pub fn is_realizable(circle: &Circle, sweep_y: f64, tol: f64) -> bool {
    circle.center.y - circle.radius < sweep_y + tol
}

/// Angle of `p` around `site` in `(-π, π]`.
#[inline]
pub fn angle_around(site: Vector2<f64>, p: Vector2<f64>) -> f64 {
    (p.y - site.y).atan2(p.x - site.x)
}

/// Counterclockwise offset of `angle` from `reference`, in `[0, 2π)`.
///
/// Wrap rule: when the raw difference is negative (the angles straddle ±π),
/// 2π is added to the smaller side.
#[inline]
pub fn ccw_offset(reference: f64, angle: f64) -> f64 {
    let raw = angle - reference;
    if raw < 0.0 {
        raw + TAU
    } else if raw >= TAU {
        raw - TAU
    } else {
        raw
    }
}
