use glam::DVec2;

/// View-point on the map grid.
///
/// * `pos` is in map units (one unit = one cell), fractional.
/// * `yaw` is radians from the +X axis; +Y is "down" the map rows, so a
///   positive turn swings the view clockwise on a top-down plot.
/// * The angle is not kept normalised; every consumer copes with any value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub pos: DVec2,
    pub yaw: f64,
}

impl Camera {
    pub fn new(pos: DVec2, yaw: f64) -> Self {
        Self { pos, yaw }
    }

    /// Unit vector pointing where the camera looks.
    #[inline(always)]
    pub fn forward(self) -> DVec2 {
        let (s, c) = self.yaw.sin_cos();
        DVec2::new(c, s)
    }

    /// Rotate by `delta_yaw`, keeping the result in `[0, 2π)`.
    pub fn turn(&mut self, delta_yaw: f64) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f64::consts::TAU);
    }

    /// Position `dist` units along the facing direction (not applied).
    #[inline]
    pub fn step(self, dist: f64) -> DVec2 {
        self.pos + self.forward() * dist
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, TAU};

    #[test]
    fn forward_is_unit() {
        let cam = Camera::new(DVec2::ZERO, 0.3);
        assert!((cam.forward().length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn turn_wraps() {
        let mut cam = Camera::new(DVec2::ZERO, 0.1);
        cam.turn(-0.2);
        assert!((cam.yaw - (TAU - 0.1)).abs() < 1e-12);
        cam.turn(0.3);
        assert!((cam.yaw - 0.2).abs() < 1e-12);
    }

    #[test]
    fn step_follows_yaw() {
        let cam = Camera::new(DVec2::new(2.0, 2.0), FRAC_PI_2);
        assert!((cam.step(0.5) - DVec2::new(2.0, 2.5)).length() < 1e-12);
    }
}
