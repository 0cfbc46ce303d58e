use std::sync::Arc;

use glam::DVec2;

use super::Animation;
use crate::world::{TextureAtlas, TileIndex, geometry::step_towards};

/// Map-space position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub DVec2);

/// Drawn by the sprite compositor.  Without an [`Animation`] the object
/// always shows `tile`.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub atlas: Arc<TextureAtlas>,
    pub tile: TileIndex,
}

impl Sprite {
    pub fn new(atlas: Arc<TextureAtlas>) -> Self {
        Self {
            atlas,
            tile: TileIndex::default(),
        }
    }

    #[inline]
    pub fn display_tile(&self, anim: Option<&Animation>) -> TileIndex {
        anim.map_or(self.tile, Animation::display_tile)
    }
}

/// Hostile actor.  Stays in the world after death until its death
/// animation has played.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub hp: i32,
    pub max_hp: i32,
    /// map units per step
    pub speed: f64,
    pub attack_range: f64,
    pub attack_damage: i32,
    /// first tic on which the enemy may act again
    pub wait_until: u64,
}

impl Enemy {
    pub const DEFAULT_HP: i32 = 50;
    pub const DEFAULT_SPEED: f64 = 0.25;
    pub const DEFAULT_ATTACK_RANGE: f64 = 1.0;
    pub const DEFAULT_ATTACK_DAMAGE: i32 = 20;
    /// Attack frame on which the hit lands.
    pub const DAMAGE_FRAME: usize = 3;

    pub fn new(max_hp: i32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            speed: Self::DEFAULT_SPEED,
            attack_range: Self::DEFAULT_ATTACK_RANGE,
            attack_damage: Self::DEFAULT_ATTACK_DAMAGE,
            wait_until: 0,
        }
    }

    #[inline]
    pub fn dead(&self) -> bool {
        self.hp <= 0
    }

    /// Returns `true` if this hit killed it.  Hits on a corpse are ignored.
    pub fn take_damage(&mut self, damage: i32) -> bool {
        if self.dead() {
            return false;
        }
        self.hp -= damage;
        self.dead()
    }

    #[inline]
    pub fn in_range(&self, from: DVec2, target: DVec2) -> bool {
        from.distance(target) < self.attack_range
    }
}

impl Default for Enemy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HP)
    }
}

/// Straight-line projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub angle: f64,
    /// map units per step
    pub speed: f64,
    pub damage: i32,
}

impl Bullet {
    #[inline]
    pub fn next_position(&self, from: DVec2) -> DVec2 {
        step_towards(from, self.angle, self.speed)
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
