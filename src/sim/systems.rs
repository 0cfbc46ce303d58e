use hecs::Entity;

use super::{
    AnimationKind, Level, Player,
    animation::Animation,
    components::{Bullet, Enemy, Position},
    tic::{ANIMATION_WAIT_TICS, TicEvents},
};
use crate::world::geometry::step_towards;

/* ── Bullets ──────────────────────────────────────────────────────── */

/// Advance one bullet.  Returns `false` once it is gone.
pub fn step_bullet(level: &mut Level, bullet: Entity) -> bool {
    step_bullet_counting(level, bullet, &mut TicEvents::default())
}

fn step_bullet_counting(level: &mut Level, bullet: Entity, events: &mut TicEvents) -> bool {
    let Ok((pos, b)) = level
        .world_mut()
        .query_one_mut::<(&Position, &Bullet)>(bullet)
        .map(|(p, b)| (p.0, *b))
    else {
        return false;
    };
    let next = b.next_position(pos);

    if level.wall_at_location(next) {
        despawn(level, bullet);
        return false;
    }

    if let Some(target) = level.enemy_near_location(next, None) {
        if let Ok(enemy) = level.world_mut().query_one_mut::<&mut Enemy>(target) {
            if enemy.take_damage(b.damage) {
                tracing::info!(?target, "enemy killed");
                events.enemies_killed += 1;
            }
        }
        despawn(level, bullet);
        return false;
    }

    if let Ok(p) = level.world_mut().query_one_mut::<&mut Position>(bullet) {
        p.0 = next;
    }
    true
}

pub fn bullet_behaviour(level: &mut Level, events: &mut TicEvents) {
    let bullets: Vec<Entity> = level
        .world()
        .query::<&Bullet>()
        .iter()
        .map(|(e, _)| e)
        .collect();
    for b in bullets {
        step_bullet_counting(level, b, events);
    }
}

/* ── Enemies ──────────────────────────────────────────────────────── */

pub fn enemy_behaviour(level: &mut Level, player: &mut Player, now: u64, events: &mut TicEvents) {
    let enemies: Vec<Entity> = level
        .world()
        .query::<&Enemy>()
        .iter()
        .map(|(e, _)| e)
        .collect();
    for e in enemies {
        enemy_act(level, player, e, now, events);
    }
}

/// One enemy's turn: only enemies that can see the player do anything.
fn enemy_act(level: &mut Level, player: &mut Player, e: Entity, now: u64, events: &mut TicEvents) {
    let Ok((mut pos, mut enemy, mut anim)) = level
        .world_mut()
        .query_one_mut::<(&Position, &Enemy, &Animation)>(e)
        .map(|(p, en, a)| (p.0, *en, *a))
    else {
        return;
    };

    if now < enemy.wait_until || !level.line_of_sight(pos, player.pos()) {
        return;
    }

    if enemy.dead() {
        anim.set_kind(AnimationKind::Death);
        if anim.on_last_frame() {
            despawn(level, e);
            events.enemies_removed += 1;
            return;
        }
    } else if enemy.in_range(pos, player.pos()) {
        anim.set_kind(AnimationKind::Attack);
        if anim.frame() == Enemy::DAMAGE_FRAME.min(anim.max_frame()) {
            player.take_damage(enemy.attack_damage);
            events.player_hits += 1;
        }
    } else {
        let to = player.pos() - pos;
        let next = step_towards(pos, to.y.atan2(to.x), enemy.speed);
        if level.location_is_valid(next, Some(e)) {
            anim.set_kind(AnimationKind::Move);
            pos = next;
        }
    }

    anim.animate();
    enemy.wait_until = now + ANIMATION_WAIT_TICS;

    if let Ok((p, en, a)) = level
        .world_mut()
        .query_one_mut::<(&mut Position, &mut Enemy, &mut Animation)>(e)
    {
        p.0 = pos;
        *en = enemy;
        *a = anim;
    }
}

fn despawn(level: &mut Level, e: Entity) {
    if level.world_mut().despawn(e).is_err() {
        tracing::debug!(?e, "despawn of a missing entity");
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sim::{BulletStats, EnemySpec, Weapon},
        world::{Texture, TextureAtlas, TileMap},
    };
    use glam::DVec2;
    use std::sync::Arc;

    /// 5 frames × 3 rows.
    fn enemy_atlas() -> Arc<TextureAtlas> {
        Arc::new(TextureAtlas::new(Texture::solid(40, 24, 0xFF_FF_00_00), 8).unwrap())
    }

    fn small_atlas() -> Arc<TextureAtlas> {
        Arc::new(TextureAtlas::new(Texture::solid(8, 8, 0xFF_FF_FF_FF), 8).unwrap())
    }

    /// 10×6 room, pillar at (5, 1‥3).
    fn level() -> Level {
        let rows = [
            "0000000000",
            "0    0   0",
            "0    0   0",
            "0    0   0",
            "0        0",
            "0000000000",
        ];
        Level::new(TileMap::new(&rows.concat(), 10, 6).unwrap(), small_atlas())
    }

    fn player_at(x: f64, y: f64) -> Player {
        Player::new(DVec2::new(x, y), 0.0, Weapon::pistol(small_atlas()))
    }

    fn bullet_stats() -> BulletStats {
        BulletStats {
            speed: 0.2,
            damage: 25,
            atlas: small_atlas(),
        }
    }

    fn pos(level: &Level, e: Entity) -> DVec2 {
        level.world().get::<&Position>(e).unwrap().0
    }

    #[test]
    fn bullet_flies_until_a_wall() {
        let mut lvl = level();
        let b = lvl.spawn_bullet(DVec2::new(1.5, 4.5), 0.0, &bullet_stats());
        let mut ev = TicEvents::default();
        bullet_behaviour(&mut lvl, &mut ev);
        assert!((pos(&lvl, b).x - 1.7).abs() < 1e-12);

        for _ in 0..100 {
            bullet_behaviour(&mut lvl, &mut ev);
        }
        assert_eq!(lvl.bullet_count(), 0);
        assert_eq!(ev, TicEvents::default());
    }

    #[test]
    fn bullets_kill_enemies() {
        let mut lvl = level();
        let e = lvl.spawn_enemy(EnemySpec::new(DVec2::new(3.0, 4.5), enemy_atlas()));
        let mut ev = TicEvents::default();

        for _ in 0..2 {
            lvl.spawn_bullet(DVec2::new(1.5, 4.5), 0.0, &bullet_stats());
            for _ in 0..10 {
                bullet_behaviour(&mut lvl, &mut ev);
            }
        }
        assert_eq!(lvl.bullet_count(), 0);
        assert_eq!(ev.enemies_killed, 1);
        assert!(lvl.world().get::<&Enemy>(e).unwrap().dead());
        // a corpse still blocks shots and soaks them up
        assert_eq!(lvl.enemy_count(), 1);
        assert_eq!(lvl.enemies_alive(), 0);
    }

    #[test]
    fn enemy_walks_towards_a_visible_player() {
        let mut lvl = level();
        let e = lvl.spawn_enemy(EnemySpec::new(DVec2::new(1.5, 4.5), enemy_atlas()));
        let mut p = player_at(4.5, 4.5);
        let mut ev = TicEvents::default();

        enemy_behaviour(&mut lvl, &mut p, 0, &mut ev);
        assert!((pos(&lvl, e).x - 1.75).abs() < 1e-12);

        // waiting: nothing happens before the next action tic
        enemy_behaviour(&mut lvl, &mut p, ANIMATION_WAIT_TICS - 1, &mut ev);
        assert!((pos(&lvl, e).x - 1.75).abs() < 1e-12);

        enemy_behaviour(&mut lvl, &mut p, ANIMATION_WAIT_TICS, &mut ev);
        assert!((pos(&lvl, e).x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn enemy_without_line_of_sight_stays_put() {
        let mut lvl = level();
        let e = lvl.spawn_enemy(EnemySpec::new(DVec2::new(2.5, 2.5), enemy_atlas()));
        let mut p = player_at(7.5, 2.5);
        let mut ev = TicEvents::default();
        for t in 0..200 {
            enemy_behaviour(&mut lvl, &mut p, t, &mut ev);
        }
        assert_eq!(pos(&lvl, e), DVec2::new(2.5, 2.5));
        assert_eq!(p.hp, Player::MAX_HP);
    }

    #[test]
    fn enemy_in_range_hits_on_the_damage_frame() {
        let mut lvl = level();
        let e = lvl.spawn_enemy(EnemySpec::new(DVec2::new(2.5, 4.5), enemy_atlas()));
        let mut p = player_at(3.3, 4.5);
        let mut ev = TicEvents::default();

        let mut hp_after = Vec::new();
        for step in 0..6 {
            enemy_behaviour(&mut lvl, &mut p, step * ANIMATION_WAIT_TICS, &mut ev);
            hp_after.push(p.hp);
        }
        // frames shown: 0 (restart), 0, 1, 2, 3 → hit, 4
        assert_eq!(hp_after, vec![100, 100, 100, 100, 80, 80]);
        assert_eq!(ev.player_hits, 1);
        let anim = *lvl.world().get::<&Animation>(e).unwrap();
        assert_eq!(anim.kind(), AnimationKind::Attack);
        assert_eq!(pos(&lvl, e), DVec2::new(2.5, 4.5));
    }

    #[test]
    fn dead_enemy_plays_death_then_vanishes() {
        let mut lvl = level();
        let e = lvl.spawn_enemy(EnemySpec::new(DVec2::new(2.5, 4.5), enemy_atlas()));
        lvl.world_mut().query_one_mut::<&mut Enemy>(e).unwrap().take_damage(100);
        let mut p = player_at(6.5, 4.5);
        let mut ev = TicEvents::default();

        let mut ticks = 0;
        while lvl.enemy_count() > 0 {
            enemy_behaviour(&mut lvl, &mut p, ticks * ANIMATION_WAIT_TICS, &mut ev);
            ticks += 1;
            assert!(ticks < 20, "corpse never removed");
        }
        // restart at 0, then 0 → 4, then removal on the last frame
        assert_eq!(ticks, 6);
        assert_eq!(ev.enemies_removed, 1);
        assert_eq!(p.hp, Player::MAX_HP);
    }

    #[test]
    fn enemies_do_not_walk_into_each_other() {
        let mut lvl = level();
        let front = lvl.spawn_enemy(EnemySpec::new(DVec2::new(2.0, 4.5), enemy_atlas()));
        let back = lvl.spawn_enemy(EnemySpec::new(DVec2::new(1.5, 4.5), enemy_atlas()));
        let mut p = player_at(8.5, 4.5);
        let mut ev = TicEvents::default();

        // front moves off first, then the back one may follow
        enemy_behaviour(&mut lvl, &mut p, 0, &mut ev);
        let (f, b) = (pos(&lvl, front), pos(&lvl, back));
        assert!(f.distance(b) >= 0.5 - 1e-12);
    }
}
