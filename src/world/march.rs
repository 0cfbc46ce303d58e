//! Cell-by-cell ray march over the tile grid.
//!
//! A ray is advanced from one grid boundary to the next: at every step the
//! next whole-x and next whole-y crossings are computed and the nearer one
//! wins, so no cell the ray passes through is ever skipped.  The renderer
//! and the line-of-sight probe both consume the same [`GridMarch`]
//! iterator; they differ only in what they do with each [`Crossing`].

use bitflags::bitflags;
use glam::DVec2;
use smallvec::SmallVec;

use super::geometry::{LineEq, closest_point, next_x_crossing, next_y_crossing, step_towards};
use super::map::TileMap;

/// Distance the ray is pushed off its origin before marching, so the
/// first step never starts on the origin itself.
pub const SEED_OFFSET: f64 = 0.05;

bitflags! {
    /// Per-axis flags (direction of travel, "sitting on a boundary").
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Axes: u8 {
        const X = 0b01;
        const Y = 0b10;
    }
}

/// One boundary crossing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    /// Ray position, on at least one grid line.
    pub pos: DVec2,
    /// Point inside the cell the ray has just entered.
    pub cell: DVec2,
    /// Axes on which `pos` is a whole number.
    pub on_grid: Axes,
}

/// Iterator over the boundary crossings of a ray.  Unbounded; limit it
/// with `take`.
#[derive(Clone, Debug)]
pub struct GridMarch {
    origin: DVec2,
    ray: DVec2,
    line: Option<LineEq>,
    increasing: Axes,
    on_grid: Axes,
    /// boundaries the seed step itself jumped over, nearest last
    pending: SmallVec<[Crossing; 2]>,
}

impl GridMarch {
    /// March from `origin` through `seed`, starting at `seed`.
    pub fn new(origin: DVec2, seed: DVec2) -> Self {
        let line = LineEq::through(origin, seed);

        let mut increasing = Axes::empty();
        increasing.set(Axes::X, line.is_some() && seed.x > origin.x);
        increasing.set(Axes::Y, seed.y > origin.y);

        let mut on_grid = Axes::empty();
        on_grid.set(Axes::X, seed.x.fract() == 0.0);
        on_grid.set(Axes::Y, seed.y.fract() == 0.0);

        Self {
            origin,
            ray: seed,
            line,
            increasing,
            on_grid,
            pending: seed_crossings(origin, seed, increasing),
        }
    }

    /// Ray leaving `origin` at `angle`.
    pub fn from_angle(origin: DVec2, angle: f64) -> Self {
        Self::new(origin, step_towards(origin, angle, SEED_OFFSET))
    }

    /// Ray from `from` heading at `to`.  Yields nothing if they coincide.
    pub fn towards(from: DVec2, to: DVec2) -> Self {
        let dir = (to - from).normalize_or_zero();
        Self::new(from, from + dir * SEED_OFFSET)
    }

    #[inline]
    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    /// Current ray position.
    #[inline]
    pub fn position(&self) -> DVec2 {
        self.ray
    }
}

impl Iterator for GridMarch {
    type Item = Crossing;

    fn next(&mut self) -> Option<Crossing> {
        if let Some(c) = self.pending.pop() {
            return Some(c);
        }
        let x_poi = next_x_crossing(
            self.origin.x,
            self.ray.x,
            self.line,
            self.increasing.contains(Axes::X),
            self.on_grid.contains(Axes::X),
        );
        let y_poi = next_y_crossing(
            self.origin.x,
            self.origin.y,
            self.ray.y,
            self.line,
            self.increasing.contains(Axes::Y),
            self.on_grid.contains(Axes::Y),
        );

        // Both missing means the ray has no direction at all.
        let Some(pos) = closest_point(self.ray, x_poi, y_poi) else {
            debug_assert!(self.ray == self.origin, "directional ray produced no crossing");
            return None;
        };

        let mut on_grid = Axes::empty();
        on_grid.set(Axes::X, x_poi.is_some_and(|p| p.x == pos.x));
        on_grid.set(Axes::Y, y_poi.is_some_and(|p| p.y == pos.y));

        self.ray = pos;
        self.on_grid = on_grid;
        Some(crossing_at(pos, on_grid, self.increasing))
    }
}

fn crossing_at(pos: DVec2, on_grid: Axes, increasing: Axes) -> Crossing {
    // Walking down an axis, a boundary belongs to the cell below it.
    let mut cell = pos;
    if on_grid.contains(Axes::X) && !increasing.contains(Axes::X) {
        cell.x -= 1.0;
    }
    if on_grid.contains(Axes::Y) && !increasing.contains(Axes::Y) {
        cell.y -= 1.0;
    }
    Crossing { pos, cell, on_grid }
}

/// Grid lines crossed between `origin` and `seed`.
///
/// Only happens when the origin sits within [`SEED_OFFSET`] of a
/// boundary.  Walking down an axis, a boundary at the origin itself
/// counts, since the ray leaves the origin's cell straight away.
fn seed_crossings(origin: DVec2, seed: DVec2, increasing: Axes) -> SmallVec<[Crossing; 2]> {
    fn boundary(o: f64, s: f64) -> Option<f64> {
        if s > o {
            let b = s.floor();
            (b > o).then_some(b)
        } else if s < o {
            let b = s.ceil();
            (b <= o).then_some(b)
        } else {
            None
        }
    }

    let d = seed - origin;
    let mut hits: SmallVec<[(f64, Crossing); 2]> = SmallVec::new();
    for axis in [Axes::X, Axes::Y] {
        let (o, s, dv) = if axis == Axes::X {
            (origin.x, seed.x, d.x)
        } else {
            (origin.y, seed.y, d.y)
        };
        let Some(b) = boundary(o, s) else {
            continue;
        };
        let t = (b - o) / dv;
        let mut pos = origin + d * t;
        if axis == Axes::X {
            pos.x = b;
        } else {
            pos.y = b;
        }
        let mut on_grid = axis;
        on_grid.set(Axes::X, on_grid.contains(Axes::X) || (d.x != 0.0 && pos.x.fract() == 0.0));
        on_grid.set(Axes::Y, on_grid.contains(Axes::Y) || (d.y != 0.0 && pos.y.fract() == 0.0));
        hits.push((t, crossing_at(pos, on_grid, increasing)));
    }
    hits.sort_by(|a, b| b.0.total_cmp(&a.0));
    hits.into_iter().map(|(_, c)| c).collect()
}

/// `true` when no wall lies between `from` and `to`.
///
/// Marching stops once the ray is within one map unit of `to`; a wall in
/// that final stretch (or beyond the map edge) does not block sight.
pub fn has_los(map: &TileMap, from: DVec2, to: DVec2) -> bool {
    if from.distance(to) <= 1.0 {
        return true;
    }
    let d = (to - from).abs();
    let max_steps = (d.x.ceil() + d.y.ceil()) as usize + 2;

    for crossing in GridMarch::towards(from, to).take(max_steps) {
        if !map.is_empty_at(crossing.cell.x, crossing.cell.y) {
            return false;
        }
        if crossing.pos.distance(to) <= 1.0 {
            return true;
        }
    }
    true
}

/*──────────────────────────────── Tests ───────────────────────────────*/
