//! Line and grid helpers shared by the renderer and the line-of-sight probe.
//!
//! Lines are kept in slope–intercept form (`y = m·x + b`).  A vertical
//! line has no such form, so every helper that needs one takes an
//! `Option<LineEq>` and treats `None` as "vertical" – never a numerically
//! zero gradient, which is a perfectly good horizontal line.

use std::f64::consts::{PI, TAU};

use glam::DVec2;

/// `y = gradient · x + intercept`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineEq {
    pub gradient: f64,
    pub intercept: f64,
}

impl LineEq {
    /// Line through `a` and `b`; `None` when `a.x == b.x` (vertical).
    pub fn through(a: DVec2, b: DVec2) -> Option<Self> {
        if a.x == b.x {
            return None;
        }
        let m = gradient(a.x, a.y, b.x, b.y);
        Some(Self {
            gradient: m,
            intercept: a.y - m * a.x,
        })
    }
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    ((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt()
}

/// Gradient of the line through two points. Caller guarantees `x1 != x2`.
#[inline]
pub fn gradient(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    debug_assert!(x1 != x2, "gradient of a vertical line");
    (y2 - y1) / (x2 - x1)
}

#[inline]
pub fn line_y_for_x(x: f64, m: f64, b: f64) -> f64 {
    x * m + b
}

#[inline]
pub fn line_x_for_y(y: f64, m: f64, b: f64) -> f64 {
    (y - b) / m
}

/// Whichever candidate is nearer to `c`.
///
/// A missing candidate loses unconditionally; equal distances favour `p2`.
/// Returns `None` only when both candidates are missing.
pub fn closest_point(c: DVec2, p1: Option<DVec2>, p2: Option<DVec2>) -> Option<DVec2> {
    match (p1, p2) {
        (Some(a), Some(b)) => {
            if c.distance(a) < c.distance(b) {
                Some(a)
            } else {
                Some(b)
            }
        }
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

/// Next whole-x boundary after `ray_x`, walking in the direction of travel.
///
/// When `ray_x` already sits on a boundary the *adjacent* one is returned,
/// otherwise the march would stall on the line it just reached.
#[inline]
fn next_whole(v: f64, increasing: bool, on_boundary: bool) -> f64 {
    match (increasing, on_boundary) {
        (true, true) => v + 1.0,
        (true, false) => v.ceil(),
        (false, true) => v - 1.0,
        (false, false) => v.floor(),
    }
}

/// Point where the ray next crosses a whole x coordinate.
///
/// `None` for a vertical ray (`ray_x == origin_x` or no line equation):
/// x never changes, so there is no next x crossing.
pub fn next_x_crossing(
    origin_x: f64,
    ray_x: f64,
    line: Option<LineEq>,
    x_increasing: bool,
    x_is_integer: bool,
) -> Option<DVec2> {
    if ray_x == origin_x {
        return None;
    }
    let line = line?;
    let x = next_whole(ray_x, x_increasing, x_is_integer);
    Some(DVec2::new(x, line_y_for_x(x, line.gradient, line.intercept)))
}

/// Point where the ray next crosses a whole y coordinate.
///
/// `None` for a horizontal ray (`ray_y == origin_y`).  A vertical ray has
/// no line equation; its x stays at `origin_x`.
pub fn next_y_crossing(
    origin_x: f64,
    origin_y: f64,
    ray_y: f64,
    line: Option<LineEq>,
    y_increasing: bool,
    y_is_integer: bool,
) -> Option<DVec2> {
    if ray_y == origin_y {
        return None;
    }
    let y = next_whole(ray_y, y_increasing, y_is_integer);
    let x = match line {
        // numerically flat: the line itself never reaches another row
        Some(l) if l.gradient == 0.0 => return None,
        Some(l) => line_x_for_y(y, l.gradient, l.intercept),
        None => origin_x,
    };
    Some(DVec2::new(x, y))
}

/// Wrap an angle into `(-π, π]`.
#[inline]
pub fn normalize_angle(a: f64) -> f64 {
    let r = a.rem_euclid(TAU);
    if r > PI { r - TAU } else { r }
}

/// Point `dist` units away from `from` along `angle`.
#[inline]
pub fn step_towards(from: DVec2, angle: f64, dist: f64) -> DVec2 {
    let (s, c) = angle.sin_cos();
    from + DVec2::new(c, s) * dist
}

/*──────────────────────────────── Tests ───────────────────────────────*/
