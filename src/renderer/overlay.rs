use glam::DVec2;

use crate::{
    renderer::{Renderer, Rgba},
    world::{EMPTY, TileMap},
};

pub const BACKGROUND_COLOUR: Rgba = 0xFF_00_00_00;
pub const WALL_COLOUR: Rgba = 0xFF_00_FF_FF;
pub const CAMERA_COLOUR: Rgba = 0xFF_64_FF_00;
pub const RAY_COLOUR: Rgba = 0xFF_FF_64_00;

/// Top-down map drawn into the top-left `region_w × region_h` pixels of
/// the frame (debug view).
#[derive(Clone, Copy, Debug)]
pub struct MapOverlay {
    /// pixels per map unit on each axis
    scale: DVec2,
    region_w: usize,
    region_h: usize,
}

impl MapOverlay {
    pub fn new(map: &TileMap, region_w: usize, region_h: usize) -> Self {
        Self {
            scale: DVec2::new(
                region_w as f64 / map.width() as f64,
                region_h as f64 / map.height() as f64,
            ),
            region_w,
            region_h,
        }
    }

    /// Pixel containing map coordinate `p`.
    #[inline]
    pub fn to_pixel(&self, p: DVec2) -> (i32, i32) {
        let px = (p * self.scale).floor();
        (px.x as i32, px.y as i32)
    }

    /// Clear the region and fill every wall cell.
    pub fn draw_map<R: Renderer>(&self, target: &mut R, map: &TileMap) {
        target.fill_rect(
            0,
            0,
            self.region_w as i32,
            self.region_h as i32,
            BACKGROUND_COLOUR,
        );
        for (col, row, symbol) in map.cells() {
            if symbol == EMPTY {
                continue;
            }
            let (x0, y0) = self.to_pixel(DVec2::new(col as f64, row as f64));
            let (x1, y1) = self.to_pixel(DVec2::new(col as f64 + 1.0, row as f64 + 1.0));
            target.fill_rect(x0, y0, x1 - x0, y1 - y0, WALL_COLOUR);
        }
    }

    /// Mark a single map point.  Points outside the region are dropped.
    pub fn plot<R: Renderer>(&self, target: &mut R, p: DVec2, colour: Rgba) {
        let (x, y) = self.to_pixel(p);
        if (0..self.region_w as i32).contains(&x) && (0..self.region_h as i32).contains(&y) {
            target.set_pixel(x, y, colour);
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
