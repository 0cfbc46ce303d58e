//! ---------------------------------------------------------------------------
//! Column ray caster
//!
//! One ray per screen column, fanned linearly across the field of view.
//! Each ray walks the grid with [`GridMarch`] until it enters a wall cell
//! or runs out of steps; a hit records the distance in the [`DepthBuffer`]
//! and blits one stretched texture strip.
//!
//! Bad frame data (unknown wall symbols, rays leaving the map) never aborts
//! the frame: the column is left as is and one warning per frame is logged.
//! ---------------------------------------------------------------------------

use std::sync::Arc;

use glam::DVec2;

use crate::{
    renderer::{
        Renderer, Rgba,
        config::{ConfigError, RenderConfig},
        overlay::{CAMERA_COLOUR, MapOverlay, RAY_COLOUR},
    },
    world::{
        Camera, EMPTY, GridMarch, MapError, TextureAtlas, TileLookupError, TileMap,
        tile_for_symbol,
    },
};

/// Depth of a column whose ray hit nothing.
pub const DEPTH_SENTINEL: f64 = 999.0;

/// Wall strips taller than this are cut down.
const MAX_COLUMN_HEIGHT: f64 = 1.0e7;

/// Per-column wall distance of one frame.
///
/// Only [`RayCaster::cast`] hands these out, so sprites can never be
/// composited against a frame whose walls have not been cast.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthBuffer {
    depths: Vec<f64>,
    offset: usize,
}

impl DepthBuffer {
    pub(crate) fn filled(len: usize, offset: usize) -> Self {
        Self {
            depths: vec![DEPTH_SENTINEL; len],
            offset,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.depths
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.depths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Screen x of ray column 0.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Depth of ray column `i`.
    #[inline]
    pub fn get(&self, i: usize) -> Option<f64> {
        self.depths.get(i).copied()
    }

    /// Depth under screen column `x`; `None` outside the 3-D view.
    #[inline]
    pub fn at_screen(&self, x: i32) -> Option<f64> {
        let i = usize::try_from(x).ok()?.checked_sub(self.offset)?;
        self.get(i)
    }
}

/// Column faults seen during one frame, logged once at the end of it.
#[derive(Default)]
pub(crate) struct FrameFaults {
    /// first failing column (or object) and its error
    tile: Option<(usize, TileLookupError)>,
    tile_count: usize,
    bounds: Option<(usize, MapError)>,
    bounds_count: usize,
}

impl FrameFaults {
    pub(crate) fn tile(&mut self, at: usize, err: TileLookupError) {
        self.tile_count += 1;
        self.tile.get_or_insert((at, err));
    }

    fn bounds(&mut self, column: usize, err: MapError) {
        self.bounds_count += 1;
        self.bounds.get_or_insert((column, err));
    }

    pub(crate) fn flush(self) {
        if let Some((first, err)) = self.tile {
            tracing::warn!(
                first,
                count = self.tile_count,
                error = %err,
                "skipped strips with bad texture lookups"
            );
        }
        if let Some((column, err)) = self.bounds {
            tracing::warn!(
                column,
                count = self.bounds_count,
                error = %err,
                "rays left the map"
            );
        }
    }
}

/// Visible part of a strip `len` pixels tall whose top is at `top`.
///
/// Returns the row range inside the strip and the screen row of its
/// first texel.
#[inline]
pub(crate) fn visible_rows(top: i64, len: i64, screen_h: i64) -> (std::ops::Range<i64>, i32) {
    let first = (-top).max(0);
    let last = (screen_h - top).min(len);
    (first..last, (top + first) as i32)
}

/// Walls-and-depth half of the frame.  Sprites are composited by
/// [`RayCaster::render_objects`] (see `sprites.rs`).
pub struct RayCaster {
    pub(crate) config: RenderConfig,
    map: Arc<TileMap>,
    walls: Arc<TextureAtlas>,

    pub(crate) half_fov: f64,
    pub(crate) half_height: f64,
    pub(crate) render_width: usize,
    pub(crate) render_offset: usize,

    /// reused strip buffer
    pub(crate) column: Vec<Rgba>,
    overlay: Option<MapOverlay>,
}

impl RayCaster {
    pub fn new(
        config: RenderConfig,
        map: Arc<TileMap>,
        walls: Arc<TextureAtlas>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let render_width = config.render_width();
        let overlay = config
            .dev_mode
            .then(|| MapOverlay::new(&map, render_width, config.height));
        tracing::debug!(
            width = config.width,
            height = config.height,
            fov = config.fov,
            draw_distance = config.draw_distance,
            dev_mode = config.dev_mode,
            "ray caster ready"
        );
        Ok(Self {
            half_fov: config.fov / 2.0,
            half_height: config.height as f64 / 2.0,
            render_width,
            render_offset: config.render_offset(),
            column: Vec::with_capacity(config.height),
            overlay,
            config,
            map,
            walls,
        })
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[inline]
    pub fn map(&self) -> &Arc<TileMap> {
        &self.map
    }

    /// Ray angle of render column `i`.
    #[inline]
    pub fn column_angle(&self, yaw: f64, i: usize) -> f64 {
        yaw - self.half_fov + self.config.fov * i as f64 / self.render_width as f64
    }

    /// Cast every column for `camera`, drawing walls into `target`.
    ///
    /// The angle needs no normalising.  The frame must already have been
    /// started with `begin_frame` at the configured size.
    pub fn cast<R: Renderer>(&mut self, target: &mut R, camera: &Camera) -> DepthBuffer {
        let mut depth = DepthBuffer::filled(self.render_width, self.render_offset);
        let mut faults = FrameFaults::default();

        if let Some(overlay) = &self.overlay {
            overlay.draw_map(target, &self.map);
            overlay.plot(target, camera.pos, CAMERA_COLOUR);
        }

        for i in 0..self.render_width {
            let angle = self.column_angle(camera.yaw, i);
            let screen_x = (i + self.render_offset) as i32;

            let march = GridMarch::from_angle(camera.pos, angle);
            for crossing in march.take(self.config.draw_distance) {
                if let Some(overlay) = &self.overlay {
                    overlay.plot(target, crossing.pos, RAY_COLOUR);
                }

                let symbol = match self.map.symbol_at(crossing.cell.x, crossing.cell.y) {
                    Ok(EMPTY) => continue,
                    Ok(symbol) => symbol,
                    Err(err) => {
                        faults.bounds(i, err);
                        break;
                    }
                };

                let dist = camera.pos.distance(crossing.pos);
                depth.depths[i] = dist;

                // fisheye: project onto the view direction
                let height = self.config.height as f64 / (dist * (angle - camera.yaw).cos());
                if let Err(err) = self.draw_wall(target, screen_x, symbol, crossing.pos, height) {
                    faults.tile(i, err);
                }
                break;
            }
        }

        faults.flush();
        depth
    }

    fn draw_wall<R: Renderer>(
        &mut self,
        target: &mut R,
        screen_x: i32,
        symbol: char,
        hit: DVec2,
        height: f64,
    ) -> Result<(), TileLookupError> {
        let tile = self.walls.get_tile(tile_for_symbol(symbol)?, 0)?;
        let tex_x = texture_x(hit, self.walls.tile_size());

        let height = height.clamp(0.0, MAX_COLUMN_HEIGHT).floor();
        if height < 1.0 {
            return Ok(());
        }
        let top = (self.half_height - height / 2.0).floor() as i64;
        let (rows, y) = visible_rows(top, height as i64, self.config.height as i64);

        self.column.clear();
        tile.scaled_column_into(tex_x, height as usize, rows, &mut self.column)?;
        target.draw_column(screen_x, y, &self.column);
        Ok(())
    }
}

/// Texel column for a wall hit at `hit`.
///
/// A hit sits on a grid line, so one coordinate has no fractional part;
/// the other says how far along the wall face the ray landed.
#[inline]
fn texture_x(hit: DVec2, tile_size: usize) -> usize {
    let fx = hit.x.fract().abs();
    let fy = hit.y.fract().abs();
    let along = if fy > fx { fy } else { fx };
    ((along * tile_size as f64) as usize).min(tile_size.saturating_sub(1))
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::Software;
    use crate::world::Texture;
    use std::f64::consts::PI;

    const WALL: Rgba = 0xFF_C0_10_10;

    /// `n × n` room: border of `edge`, empty inside.
    fn room(n: usize, edge: char) -> Arc<TileMap> {
        let mut s = String::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                let border = x == 0 || y == 0 || x == n - 1 || y == n - 1;
                s.push(if border { edge } else { EMPTY });
            }
        }
        Arc::new(TileMap::new(&s, n, n).unwrap())
    }

    fn solid_walls() -> Arc<TextureAtlas> {
        Arc::new(TextureAtlas::new(Texture::solid(8, 8, WALL), 8).unwrap())
    }

    fn small_config() -> RenderConfig {
        RenderConfig {
            width: 96,
            height: 72,
            max_sprite_size: 72,
            ..RenderConfig::default()
        }
    }

    fn wall_rows(sw: &Software, x: usize, h: usize) -> usize {
        (0..h).filter(|&y| sw.pixel(x, y) == Some(WALL)).count()
    }

    #[test]
    fn facing_a_wall_at_three_units() {
        let cfg = small_config();
        let mut rc = RayCaster::new(cfg.clone(), room(16, '0'), solid_walls()).unwrap();
        let mut sw = Software::default();
        sw.begin_frame(cfg.width, cfg.height);

        let cam = Camera::new(DVec2::new(12.0, 8.5), 0.0);
        let depth = rc.cast(&mut sw, &cam);

        assert_eq!(depth.len(), cfg.width);
        assert!(depth.as_slice().iter().all(|&d| d < DEPTH_SENTINEL));

        let mid = cfg.width / 2;
        let centre = depth.get(mid).unwrap();
        assert!((centre - 3.0).abs() < 1e-6, "centre depth {centre}");
        assert!(depth.get(0).unwrap() > centre + 0.1);
        assert!(depth.get(cfg.width - 1).unwrap() > centre + 0.1);
        // monotonic away from the centre
        for i in 1..mid {
            assert!(depth.get(i).unwrap() <= depth.get(i - 1).unwrap() + 1e-9);
        }
    }

    #[test]
    fn flat_wall_renders_flat() {
        let cfg = small_config();
        let mut rc = RayCaster::new(cfg.clone(), room(16, '0'), solid_walls()).unwrap();
        let mut sw = Software::default();
        sw.begin_frame(cfg.width, cfg.height);
        rc.cast(&mut sw, &Camera::new(DVec2::new(12.0, 8.5), 0.0));

        let heights: Vec<usize> = (0..cfg.width).map(|x| wall_rows(&sw, x, cfg.height)).collect();
        let lo = *heights.iter().min().unwrap();
        let hi = *heights.iter().max().unwrap();
        assert!(hi - lo <= 1, "heights vary from {lo} to {hi}");
        // 72 / 3
        assert!((23..=24).contains(&hi));
    }

    #[test]
    fn wall_a_hair_away_fills_every_column() {
        let cfg = small_config();
        let mut rc = RayCaster::new(cfg.clone(), room(16, '0'), solid_walls()).unwrap();
        let mut sw = Software::default();
        sw.begin_frame(cfg.width, cfg.height);
        // closer to the wall than the seed step
        let depth = rc.cast(&mut sw, &Camera::new(DVec2::new(1.02, 8.5), PI));

        assert!(depth.as_slice().iter().all(|&d| d < 0.05), "{:?}", depth.as_slice());
        for x in 0..cfg.width {
            assert_eq!(wall_rows(&sw, x, cfg.height), cfg.height, "column {x}");
        }
    }

    #[test]
    fn close_walls_are_clipped_to_the_screen() {
        let cfg = small_config();
        let mut rc = RayCaster::new(cfg.clone(), room(16, '0'), solid_walls()).unwrap();
        let mut sw = Software::default();
        sw.begin_frame(cfg.width, cfg.height);
        let depth = rc.cast(&mut sw, &Camera::new(DVec2::new(14.9, 8.5), 0.0));

        assert!(depth.get(cfg.width / 2).unwrap() < 0.2);
        assert_eq!(wall_rows(&sw, cfg.width / 2, cfg.height), cfg.height);
    }

    #[test]
    fn rays_that_hit_nothing_keep_the_sentinel() {
        let cfg = RenderConfig {
            draw_distance: 3,
            ..small_config()
        };
        let mut rc = RayCaster::new(cfg.clone(), room(40, '0'), solid_walls()).unwrap();
        let mut sw = Software::default();
        sw.begin_frame(cfg.width, cfg.height);
        let depth = rc.cast(&mut sw, &Camera::new(DVec2::new(20.5, 20.5), 1.0));

        assert!(depth.as_slice().iter().all(|&d| d == DEPTH_SENTINEL));
        assert!((0..cfg.width).all(|x| wall_rows(&sw, x, cfg.height) == 0));
    }

    #[test]
    fn unknown_symbol_skips_the_column_but_keeps_depth() {
        let cfg = small_config();
        let mut rc = RayCaster::new(cfg.clone(), room(8, 'x'), solid_walls()).unwrap();
        let mut sw = Software::default();
        sw.begin_frame(cfg.width, cfg.height);
        let depth = rc.cast(&mut sw, &Camera::new(DVec2::new(4.5, 4.5), 0.3));

        assert!(depth.as_slice().iter().all(|&d| d < DEPTH_SENTINEL));
        assert!((0..cfg.width).all(|x| wall_rows(&sw, x, cfg.height) == 0));
    }

    #[test]
    fn missing_atlas_column_is_a_lookup_error() {
        // '5' asks for atlas column 5; the atlas has one
        let cfg = small_config();
        let mut rc = RayCaster::new(cfg.clone(), room(8, '5'), solid_walls()).unwrap();
        let mut sw = Software::default();
        sw.begin_frame(cfg.width, cfg.height);
        rc.cast(&mut sw, &Camera::new(DVec2::new(4.5, 4.5), 0.0));
        assert!((0..cfg.width).all(|x| wall_rows(&sw, x, cfg.height) == 0));
    }

    #[test]
    fn open_map_edge_stops_the_ray() {
        let cfg = small_config();
        let map = Arc::new(TileMap::new(&" ".repeat(16), 4, 4).unwrap());
        let mut rc = RayCaster::new(cfg.clone(), map, solid_walls()).unwrap();
        let mut sw = Software::default();
        sw.begin_frame(cfg.width, cfg.height);
        let depth = rc.cast(&mut sw, &Camera::new(DVec2::new(2.0, 2.0), 0.0));
        assert!(depth.as_slice().iter().all(|&d| d == DEPTH_SENTINEL));
    }

    #[test]
    fn dev_mode_renders_into_the_right_half() {
        let cfg = RenderConfig {
            dev_mode: true,
            ..small_config()
        };
        let mut rc = RayCaster::new(cfg.clone(), room(16, '0'), solid_walls()).unwrap();
        let mut sw = Software::default();
        sw.begin_frame(cfg.width, cfg.height);
        let depth = rc.cast(&mut sw, &Camera::new(DVec2::new(12.0, 8.5), 0.0));

        let half = cfg.width / 2;
        assert_eq!(depth.len(), half);
        assert_eq!(depth.offset(), half);
        assert_eq!(depth.at_screen(half as i32), depth.get(0));
        assert_eq!(depth.at_screen(half as i32 - 1), None);

        assert!((0..half).all(|x| wall_rows(&sw, x, cfg.height) == 0));
        assert!((half..cfg.width).all(|x| wall_rows(&sw, x, cfg.height) > 0));

        // map on the left: border walls, the camera, and the ray fan
        let left: Vec<Rgba> = (0..half)
            .flat_map(|x| (0..cfg.height).map(move |y| (x, y)))
            .filter_map(|(x, y)| sw.pixel(x, y))
            .collect();
        assert!(left.contains(&crate::renderer::overlay::WALL_COLOUR));
        assert!(left.contains(&RAY_COLOUR));
    }

    #[test]
    fn texture_x_uses_the_fractional_coordinate() {
        assert_eq!(texture_x(DVec2::new(3.0, 2.25), 64), 16);
        assert_eq!(texture_x(DVec2::new(5.5, 7.0), 64), 32);
        assert_eq!(texture_x(DVec2::new(-1.0, -0.75), 64), 48);
        assert_eq!(texture_x(DVec2::new(2.0, 3.0), 64), 0);
    }

    #[test]
    fn visible_rows_clip_both_ends() {
        assert_eq!(visible_rows(10, 20, 100), (0..20, 10));
        assert_eq!(visible_rows(-5, 20, 100), (5..20, 0));
        assert_eq!(visible_rows(-50, 200, 100), (50..150, 0));
        assert_eq!(visible_rows(90, 20, 100), (0..10, 90));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = RenderConfig {
            draw_distance: 0,
            ..small_config()
        };
        assert!(matches!(
            RayCaster::new(cfg, room(4, '0'), solid_walls()),
            Err(ConfigError::DrawDistance)
        ));
    }
}
