use super::*;
use nalgebra::{vector, Vector2};

fn on_both_parabolas(a: Vector2<f64>, b: Vector2<f64>, l: f64) -> bool {
    let x = breakpoint_x(a, b, l);
    (parabola_y(a, l, x) - parabola_y(b, l, x)).abs() < 1e-9
}

#[test]
fn breakpoint_horizontal_pair_is_bisector() {
    let a = vector![0.0, 0.0];
    let b = vector![4.0, 0.0];
    for l in [-0.5, -1.0, -10.0, -1e4] {
        assert!((breakpoint_x(a, b, l) - 2.0).abs() < 1e-9);
    }
}

#[test]
fn breakpoint_picks_root_by_arc_order() {
    // a low and narrow, b high and wide.
    let a = vector![0.0, 1.0];
    let b = vector![2.0, 2.0];
    let l = 0.0;
    let left = breakpoint_x(a, b, l);
    let right = breakpoint_x(b, a, l);
    assert!(on_both_parabolas(a, b, l));
    assert!(on_both_parabolas(b, a, l));
    // The narrow arc of `a` sits between the two breakpoints.
    assert!(right < a.x && a.x < left);
    assert!((left - 1.1622776601683795).abs() < 1e-12);
    // Left of (a, b) the arc of a is the lower one.
    let probe = left - 0.5;
    assert!(parabola_y(a, l, probe) < parabola_y(b, l, probe));
}

#[test]
fn breakpoint_focus_on_sweep_line_is_vertical_ray() {
    let a = vector![3.0, 5.0];
    let b = vector![1.0, 2.0];
    assert_eq!(breakpoint_x(a, b, 2.0), 1.0);
    assert_eq!(breakpoint_x(b, a, 2.0), 1.0);
}

#[test]
fn breakpoint_far_below_stays_on_bisector() {
    let a = vector![0.0, 4.0];
    let b = vector![3.0, 0.0];
    for l in [-10.0, -100.0, -1e4] {
        let p = breakpoint_point(a, b, l);
        let da = (p - a).norm();
        let db = (p - b).norm();
        assert!((da - db).abs() < 1e-6 * da.max(1.0), "l={l}: {da} vs {db}");
    }
}

#[test]
fn circumcircle_of_example_triangle() {
    let c = circumcircle(vector![0.0, 0.0], vector![4.0, 0.0], vector![2.0, 4.0], 1e-12).unwrap();
    assert!((c.center - vector![2.0, 1.5]).norm() < 1e-12);
    assert!((c.radius - 2.5).abs() < 1e-12);
    assert!((c.lowest_point() - vector![2.0, -1.0]).norm() < 1e-12);
}

#[test]
fn circumcircle_rejects_collinear_and_coincident() {
    let eps = SweepCfg::default().eps_det;
    assert!(circumcircle(vector![0.0, 0.0], vector![1.0, 1.0], vector![3.0, 3.0], eps).is_none());
    assert!(circumcircle(vector![1.0, 2.0], vector![1.0, 2.0], vector![5.0, 0.0], eps).is_none());
    assert!(circumcircle(vector![0.0, 0.0], vector![0.0, 0.0], vector![0.0, 0.0], eps).is_none());
}

#[test]
fn realizable_compares_lowest_point() {
    let c = Circle {
        center: vector![0.0, 1.0],
        radius: 2.0,
    };
    assert!(is_realizable(&c, 0.0, 0.0));
    assert!(!is_realizable(&c, -1.0, 0.0));
    assert!(is_realizable(&c, -1.0, 1e-9));
    assert!(!is_realizable(&c, -2.0, 1e-9));
}

#[test]
fn orientation_sign_matches_convergence() {
    // Arcs a, c, b with c above: the middle arc gets squeezed.
    let a = vector![0.0, 0.0];
    let c = vector![2.0, 4.0];
    let b = vector![4.0, 0.0];
    assert!(orientation(a, c, b) < 0.0);
    assert!(orientation(b, c, a) > 0.0);
    assert_eq!(orientation(a, vector![1.0, 0.0], b), 0.0);
}

#[test]
fn ccw_offset_wraps_across_pi() {
    use std::f64::consts::PI;
    let ref_angle = 0.9 * PI;
    let off = ccw_offset(ref_angle, -0.9 * PI);
    assert!((off - 0.2 * PI).abs() < 1e-12);
    assert!((ccw_offset(0.0, 0.5) - 0.5).abs() < 1e-12);
    let site = vector![1.0, 1.0];
    assert!((angle_around(site, vector![1.0, 3.0]) - PI / 2.0).abs() < 1e-12);
}

#[test]
fn sweep_line_only_descends() {
    let mut s = SweepLine::new(5.0);
    s.advance_to(3.0);
    s.advance_to(4.0);
    assert_eq!(s.y(), 3.0);
    assert_eq!(SweepLine::default().y(), f64::INFINITY);
}

#[test]
fn scaled_cfg_keeps_relative_terms() {
    let cfg = SweepCfg::default().scaled(100.0);
    assert_eq!(cfg.eps_det, SweepCfg::default().eps_det);
    assert!((cfg.eps_locate - 1e-4).abs() < 1e-18);
}
