//! ---------------------------------------------------------------------------
//! Software (CPU) frame-buffer back-end
//!
//! * Fills an internal `Vec<u32>` in **0xAARRGGBB** format.
//! * `begin_frame` paints the flat ceiling/floor backdrop that walls and
//!   sprites are drawn over; nothing else ever clears it.
//! ---------------------------------------------------------------------------

use crate::renderer::{Renderer, Rgba};

/// Column renderer writing into a CPU buffer.
pub struct Software {
    scratch: Vec<Rgba>,
    width: usize,
    height: usize,
    /// backdrop above the horizon
    pub ceiling: Rgba,
    /// backdrop below the horizon
    pub floor: Rgba,
}

impl Default for Software {
    fn default() -> Self {
        Self {
            scratch: Vec::new(),
            width: 0,
            height: 0,
            ceiling: 0xFF_38_38_38,
            floor: 0xFF_70_70_70,
        }
    }
}

impl Software {
    /// Pixel at `(x, y)` of the frame being built.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.scratch[y * self.width + x])
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if (0..self.width as i32).contains(&x) && (0..self.height as i32).contains(&y) {
            Some(y as usize * self.width + x as usize)
        } else {
            None
        }
    }
}

/// `src` over `dst`, using the alpha of `src`.
#[inline]
fn blend(src: Rgba, dst: Rgba) -> Rgba {
    let a = src >> 24;
    match a {
        0 => dst,
        0xFF => src,
        _ => {
            let mut out = 0xFF00_0000;
            for shift in [0, 8, 16] {
                let s = (src >> shift) & 0xFF;
                let d = (dst >> shift) & 0xFF;
                out |= ((s * a + d * (0xFF - a)) / 0xFF) << shift;
            }
            out
        }
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }
        let horizon = (h / 2) * w;
        self.scratch[..horizon].fill(self.ceiling);
        self.scratch[horizon..].fill(self.floor);
    }

    #[inline]
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn set_pixel(&mut self, x: i32, y: i32, colour: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.scratch[i] = colour;
        }
    }

    fn draw_column(&mut self, x: i32, y_top: i32, texels: &[Rgba]) {
        if !(0..self.width as i32).contains(&x) {
            return;
        }
        let skip = (-y_top).max(0) as usize;
        let y0 = y_top.max(0) as usize;
        let col = x as usize;
        for (y, &texel) in (y0..self.height).zip(texels.iter().skip(skip)) {
            let px = &mut self.scratch[y * self.width + col];
            *px = blend(texel, *px);
        }
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch, self.width, self.height);
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
