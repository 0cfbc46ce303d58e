use std::{f64::consts::PI, sync::Arc};

use glam::DVec2;

use super::{Level, systems};
use crate::world::{Camera, TextureAtlas};

/// What a weapon fires.
#[derive(Debug, Clone)]
pub struct BulletStats {
    pub speed: f64,
    pub damage: i32,
    pub atlas: Arc<TextureAtlas>,
}

#[derive(Debug, Clone)]
pub struct Weapon {
    pub name: &'static str,
    pub ammo: u32,
    /// tics between shots
    pub cooldown: u64,
    pub cooldown_until: u64,
    pub bullet: BulletStats,
}

impl Weapon {
    pub fn pistol(bullet_atlas: Arc<TextureAtlas>) -> Self {
        Self {
            name: "Pistol",
            ammo: 100,
            cooldown: 1,
            cooldown_until: 0,
            bullet: BulletStats {
                speed: 0.2,
                damage: 25,
                atlas: bullet_atlas,
            },
        }
    }

    #[inline]
    pub fn ready(&self, now: u64) -> bool {
        self.ammo > 0 && now >= self.cooldown_until
    }
}

/// One tic worth of player intent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputCmd {
    pub forward: f64, // –1 … +1
    pub turn: f64,    // –1 (left) … +1 (right)
    pub fire: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub camera: Camera,
    pub hp: i32,
    pub weapon: Weapon,
}

impl Player {
    pub const MAX_HP: i32 = 100;
    pub const TURN_SPEED: f64 = 10.0 * PI / 360.0;
    pub const MOVE_SPEED: f64 = 0.2;

    pub fn new(pos: DVec2, yaw: f64, weapon: Weapon) -> Self {
        Self {
            camera: Camera::new(pos, yaw),
            hp: Self::MAX_HP,
            weapon,
        }
    }

    #[inline]
    pub fn pos(&self) -> DVec2 {
        self.camera.pos
    }

    #[inline]
    pub fn dead(&self) -> bool {
        self.hp <= 0
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.hp -= damage;
        tracing::debug!(damage, hp = self.hp, "player hit");
    }

    /// Step `speed` units along the view direction (negative: backwards).
    /// Walls and enemies block the move entirely.  Returns whether it moved.
    pub fn move_by(&mut self, speed: f64, level: &Level) -> bool {
        let next = self.camera.step(speed);
        if !level.location_is_valid(next, None) {
            return false;
        }
        self.camera.pos = next;
        true
    }

    #[inline]
    pub fn turn(&mut self, direction: f64) {
        self.camera.turn(direction * Self::TURN_SPEED);
    }

    /// Fire the current weapon.  The bullet is stepped once straight away,
    /// so it may already have hit something when this returns.
    pub fn shoot(&mut self, level: &mut Level, now: u64) -> Option<hecs::Entity> {
        if !self.weapon.ready(now) {
            return None;
        }
        self.weapon.ammo -= 1;
        self.weapon.cooldown_until = now + self.weapon.cooldown;
        tracing::debug!(weapon = self.weapon.name, ammo = self.weapon.ammo, "bang");

        let bullet = level.spawn_bullet(self.pos(), self.camera.yaw, &self.weapon.bullet);
        systems::step_bullet(level, bullet).then_some(bullet)
    }

    /// Apply one tic of input.
    pub fn apply(&mut self, cmd: InputCmd, level: &mut Level, now: u64) {
        if cmd.turn != 0.0 {
            self.turn(cmd.turn.clamp(-1.0, 1.0));
        }
        if cmd.forward != 0.0 {
            self.move_by(cmd.forward.clamp(-1.0, 1.0) * Self::MOVE_SPEED, level);
        }
        if cmd.fire {
            self.shoot(level, now);
        }
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
