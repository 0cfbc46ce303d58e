use std::f64::consts::{FRAC_PI_3, PI};

use thiserror::Error;

/// Default number of grid crossings a ray may take before giving up.
pub const DEFAULT_DRAW_DISTANCE: usize = 16;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("viewport {width}x{height} is too small")]
    Viewport { width: usize, height: usize },

    #[error("field of view {0} rad must lie in (0, π)")]
    FieldOfView(f64),

    #[error("draw distance must be at least one grid step")]
    DrawDistance,

    #[error("sprite size cap must be at least one pixel")]
    SpriteSize,
}

/// Everything the ray caster needs to know about the view it renders.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// frame width in pixels
    pub width: usize,
    /// frame height in pixels
    pub height: usize,
    /// full horizontal field of view, radians
    pub fov: f64,
    /// grid-crossing steps per ray
    pub draw_distance: usize,
    /// split screen: top-down map on the left, 3-D view on the right
    pub dev_mode: bool,
    /// largest on-screen sprite edge, pixels
    pub max_sprite_size: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fov: FRAC_PI_3,
            draw_distance: DEFAULT_DRAW_DISTANCE,
            dev_mode: false,
            max_sprite_size: 480,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min_width = if self.dev_mode { 2 } else { 1 };
        if self.width < min_width || self.height == 0 {
            return Err(ConfigError::Viewport {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.fov > 0.0 && self.fov < PI) {
            return Err(ConfigError::FieldOfView(self.fov));
        }
        if self.draw_distance == 0 {
            return Err(ConfigError::DrawDistance);
        }
        if self.max_sprite_size == 0 {
            return Err(ConfigError::SpriteSize);
        }
        Ok(())
    }

    /// Columns that receive rays.
    #[inline]
    pub fn render_width(&self) -> usize {
        if self.dev_mode { self.width / 2 } else { self.width }
    }

    /// Screen x of the first ray column.
    #[inline]
    pub fn render_offset(&self) -> usize {
        if self.dev_mode { self.render_width() } else { 0 }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
