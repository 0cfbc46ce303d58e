//! Rendering abstraction layer.
//!
//! *The ray caster never touches a pixel buffer directly.*
//! It hands finished wall and sprite strips to a type that implements
//! [`Renderer`], so a window back-end, an off-screen test target or a
//! GPU uploader can all sit behind the same calls.
//!
//! Per frame the order is fixed: [`RayCaster::cast`] first, which returns
//! the [`DepthBuffer`], then [`RayCaster::render_objects`], which needs it.

pub mod config;
pub mod overlay;
pub mod raycaster;
pub mod software;
pub mod sprites;

pub use crate::world::texture::Rgba;

pub use config::{ConfigError, RenderConfig};
pub use overlay::MapOverlay;
pub use raycaster::{DEPTH_SENTINEL, DepthBuffer, RayCaster};
pub use software::Software;
pub use sprites::{Billboard, SpriteSpan};

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
/// Software callers typically forward it to their window-manager;
/// GPU back-ends can ignore the slice because they never allocate it.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and
    /// paint the background.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Current `(width, height)` in pixels.
    fn size(&self) -> (usize, usize);

    /// Write one pixel; coordinates outside the frame are ignored.
    fn set_pixel(&mut self, x: i32, y: i32, colour: Rgba);

    /// Blit a 1-px wide strip whose first texel lands on row `y_top`.
    ///
    /// Texels with zero alpha are skipped, partially transparent ones are
    /// blended over what is already there.
    fn draw_column(&mut self, x: i32, y_top: i32, texels: &[Rgba]);

    /// Solid axis-aligned rectangle, clipped to the frame.
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Rgba) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set_pixel(xx, yy, colour);
            }
        }
    }

    /// Bresenham line, clipped per pixel.
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, colour: Rgba) {
        let (mut x, mut y) = (x0, y0);
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x, y, colour);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}
