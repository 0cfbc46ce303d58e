use std::sync::Arc;

use glam::DVec2;
use hecs::{Entity, World};
use thiserror::Error;

use super::{
    Animation, BulletStats,
    components::{Bullet, Enemy, Position, Sprite},
};
use crate::{
    renderer::Billboard,
    world::{AtlasError, MapError, Texture, TextureAtlas, TileMap, has_los},
};

/// Radius around an enemy's position that it occupies.
pub const ENEMY_RADIUS: f64 = 0.5;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Atlas(#[from] AtlasError),
}

/// Everything needed to place an enemy.
#[derive(Debug, Clone)]
pub struct EnemySpec {
    pub pos: DVec2,
    pub atlas: Arc<TextureAtlas>,
    pub max_hp: i32,
    pub speed: f64,
    pub attack_range: f64,
    pub attack_damage: i32,
}

impl EnemySpec {
    /// Stock enemy at `pos`.
    pub fn new(pos: DVec2, atlas: Arc<TextureAtlas>) -> Self {
        Self {
            pos,
            atlas,
            max_hp: Enemy::DEFAULT_HP,
            speed: Enemy::DEFAULT_SPEED,
            attack_range: Enemy::DEFAULT_ATTACK_RANGE,
            attack_damage: Enemy::DEFAULT_ATTACK_DAMAGE,
        }
    }
}

/// One loaded level: the map, its wall textures and every object in it.
pub struct Level {
    map: Arc<TileMap>,
    walls: Arc<TextureAtlas>,
    world: World,
}

impl Level {
    pub fn new(map: TileMap, walls: Arc<TextureAtlas>) -> Self {
        Self {
            map: Arc::new(map),
            walls,
            world: World::new(),
        }
    }

    /// Build from the raw pieces an asset loader hands over.
    pub fn from_parts(
        symbols: &str,
        width: usize,
        height: usize,
        wall_image: Texture,
        tile_size: usize,
    ) -> Result<Self, LevelError> {
        let map = TileMap::new(symbols, width, height)?;
        let walls = TextureAtlas::new(wall_image, tile_size)?;
        Ok(Self::new(map, Arc::new(walls)))
    }

    #[inline]
    pub fn map(&self) -> &Arc<TileMap> {
        &self.map
    }

    #[inline]
    pub fn walls(&self) -> &Arc<TextureAtlas> {
        &self.walls
    }

    #[inline]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Walls and everything off the map are solid.
    #[inline]
    pub fn wall_at_location(&self, p: DVec2) -> bool {
        !self.map.is_empty_at(p.x, p.y)
    }

    /// An enemy (alive or not) occupying `p`, other than `exclude`.
    pub fn enemy_near_location(&self, p: DVec2, exclude: Option<Entity>) -> Option<Entity> {
        self.world
            .query::<(&Position, &Enemy)>()
            .iter()
            .find(|(e, (pos, _))| Some(*e) != exclude && pos.0.distance(p) < ENEMY_RADIUS)
            .map(|(e, _)| e)
    }

    /// Nothing blocks a move to `p`.
    pub fn location_is_valid(&self, p: DVec2, exclude: Option<Entity>) -> bool {
        !self.wall_at_location(p) && self.enemy_near_location(p, exclude).is_none()
    }

    #[inline]
    pub fn line_of_sight(&self, from: DVec2, to: DVec2) -> bool {
        has_los(&self.map, from, to)
    }

    pub fn spawn_enemy(&mut self, spec: EnemySpec) -> Entity {
        let anim = Animation::for_atlas(&spec.atlas);
        let enemy = Enemy {
            speed: spec.speed,
            attack_range: spec.attack_range,
            attack_damage: spec.attack_damage,
            ..Enemy::new(spec.max_hp)
        };
        tracing::debug!(x = spec.pos.x, y = spec.pos.y, hp = spec.max_hp, "enemy spawned");
        self.world
            .spawn((Position(spec.pos), Sprite::new(spec.atlas), anim, enemy))
    }

    pub fn spawn_bullet(&mut self, origin: DVec2, angle: f64, stats: &BulletStats) -> Entity {
        self.world.spawn((
            Position(origin),
            Sprite::new(stats.atlas.clone()),
            Bullet {
                angle,
                speed: stats.speed,
                damage: stats.damage,
            },
        ))
    }

    pub fn enemy_count(&self) -> usize {
        self.world.query::<&Enemy>().iter().count()
    }

    pub fn enemies_alive(&self) -> usize {
        self.world
            .query::<&Enemy>()
            .iter()
            .filter(|(_, e)| !e.dead())
            .count()
    }

    pub fn bullet_count(&self) -> usize {
        self.world.query::<&Bullet>().iter().count()
    }

    /// Every drawable object with the tile it shows right now.
    pub fn billboards(&self) -> Vec<Billboard> {
        self.world
            .query::<(&Position, &Sprite, Option<&Animation>)>()
            .iter()
            .map(|(_, (pos, sprite, anim))| Billboard {
                pos: pos.0,
                atlas: sprite.atlas.clone(),
                tile: sprite.display_tile(anim),
            })
            .collect()
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
