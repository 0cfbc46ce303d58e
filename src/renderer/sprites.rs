use std::sync::Arc;

use glam::DVec2;
use smallvec::SmallVec;

use crate::{
    renderer::{
        Renderer,
        raycaster::{DepthBuffer, FrameFaults, RayCaster, visible_rows},
    },
    world::{Camera, TextureAtlas, TileIndex, TileLookupError, geometry::normalize_angle},
};

/// What the compositor needs from a world object: where it is and which
/// tile it currently shows.
#[derive(Clone, Debug)]
pub struct Billboard {
    pub pos: DVec2,
    pub atlas: Arc<TextureAtlas>,
    pub tile: TileIndex,
}

/// Screen columns are reported as runs; most sprites produce one or two.
pub type ColumnRuns = SmallVec<[(i32, i32); 2]>;

/// Result of projecting one object.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteSpan {
    /// index into the slice given to `render_objects`
    pub index: usize,
    pub dist: f64,
    /// on-screen edge length in pixels
    pub size: usize,
    /// inclusive column runs that were painted
    pub drawn: ColumnRuns,
    /// inclusive column runs hidden behind a nearer wall
    pub occluded: ColumnRuns,
}

/// Append column `x` to `runs`, extending the last run when adjacent.
fn push_column(runs: &mut ColumnRuns, x: i32) {
    match runs.last_mut() {
        Some((_, end)) if *end + 1 == x => *end = x,
        _ => runs.push((x, x)),
    }
}

/// Every column listed in `runs`.
pub fn columns(runs: &ColumnRuns) -> impl Iterator<Item = i32> + '_ {
    runs.iter().flat_map(|&(a, b)| a..=b)
}

impl RayCaster {
    /// Paint `objects` over the walls of the frame `depth` came from.
    ///
    /// Objects are drawn far to near so nearer ones overwrite farther
    /// ones; a column is painted only where the object is not farther
    /// than the wall recorded there.  Returns one span per drawn object.
    pub fn render_objects<R: Renderer>(
        &mut self,
        target: &mut R,
        camera: &Camera,
        depth: &DepthBuffer,
        objects: &[Billboard],
    ) -> Vec<SpriteSpan> {
        let mut order: Vec<(usize, f64)> = objects
            .iter()
            .enumerate()
            .map(|(i, o)| (i, camera.pos.distance(o.pos)))
            .collect();
        order.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut faults = FrameFaults::default();
        let mut spans = Vec::with_capacity(order.len());
        for (index, _) in order {
            match self.draw_object(target, camera, depth, index, &objects[index]) {
                Ok(Some(span)) => spans.push(span),
                Ok(None) => {}
                Err(err) => faults.tile(index, err),
            }
        }
        faults.flush();
        spans
    }

    /// Project and paint a single object.
    ///
    /// `Ok(None)` when the object is behind the camera, sits on it, or is
    /// too far away to cover a pixel.
    pub fn draw_object<R: Renderer>(
        &mut self,
        target: &mut R,
        camera: &Camera,
        depth: &DepthBuffer,
        index: usize,
        obj: &Billboard,
    ) -> Result<Option<SpriteSpan>, TileLookupError> {
        let to_obj = obj.pos - camera.pos;
        let dist = to_obj.length();
        let delta = normalize_angle(to_obj.y.atan2(to_obj.x) - camera.yaw);
        if dist <= 0.0 || delta.abs() > std::f64::consts::FRAC_PI_2 {
            return Ok(None);
        }

        let raw = (self.config.height as f64 / dist).floor();
        if raw < 1.0 {
            return Ok(None);
        }
        let size = (raw as usize).min(self.config.max_sprite_size);
        let tile = obj.atlas.tile(obj.tile)?;
        let tile_size = tile.size();

        let render_w = self.render_width as f64;
        let centre_x = delta / self.config.fov * render_w + render_w / 2.0 + self.render_offset as f64;
        let left = (centre_x - size as f64 / 2.0).floor() as i32;
        let top = (self.half_height - size as f64 / 2.0).floor() as i64;
        let (rows, y) = visible_rows(top, size as i64, self.config.height as i64);

        let mut span = SpriteSpan {
            index,
            dist,
            size,
            drawn: ColumnRuns::new(),
            occluded: ColumnRuns::new(),
        };
        for k in 0..size {
            let x = left + k as i32;
            let Some(wall) = depth.at_screen(x) else {
                continue;
            };
            if dist > wall {
                push_column(&mut span.occluded, x);
                continue;
            }
            let tex_x = k * tile_size / size;
            self.column.clear();
            tile.scaled_column_into(tex_x, size, rows.clone(), &mut self.column)?;
            target.draw_column(x, y, &self.column);
            push_column(&mut span.drawn, x);
        }
        Ok(Some(span))
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
