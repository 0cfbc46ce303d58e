use super::{InputCmd, Level, Player, systems};
use std::time::{Duration, Instant};

pub const SIM_FPS: u32 = 35;
const TIC: Duration = Duration::from_micros(1_000_000 / SIM_FPS as u64);

/// Tics an enemy waits between actions (about half a second).
pub const ANIMATION_WAIT_TICS: u64 = SIM_FPS as u64 / 2;

/// What happened during one or more tics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TicEvents {
    pub enemies_killed: usize,
    /// corpses whose death animation finished
    pub enemies_removed: usize,
    pub player_hits: u32,
    pub player_died: bool,
}

impl TicEvents {
    fn merge(&mut self, other: TicEvents) {
        self.enemies_killed += other.enemies_killed;
        self.enemies_removed += other.enemies_removed;
        self.player_hits += other.player_hits;
        self.player_died |= other.player_died;
    }
}

/// Drives all game-logic systems at a fixed rate.
pub struct TicRunner {
    tic: u64,
    last: Instant,
}

impl Default for TicRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TicRunner {
    pub fn new() -> Self {
        Self {
            tic: 0,
            last: Instant::now(),
        }
    }

    /// Tics run so far.
    #[inline]
    pub fn now(&self) -> u64 {
        self.tic
    }

    /// Advance enough tics to synchronise simulation with real time.
    /// `cmd` is applied on every tic run.
    pub fn pump(&mut self, level: &mut Level, player: &mut Player, cmd: InputCmd) -> TicEvents {
        let mut events = TicEvents::default();
        while self.last.elapsed() >= TIC {
            events.merge(self.tick(level, player, cmd));
            self.last += TIC;
        }
        events
    }

    /// Run one fixed-rate game tic.
    pub fn tick(&mut self, level: &mut Level, player: &mut Player, cmd: InputCmd) -> TicEvents {
        let mut events = TicEvents::default();
        let was_dead = player.dead();
        if !was_dead {
            player.apply(cmd, level, self.tic);
        }
        systems::bullet_behaviour(level, &mut events);
        systems::enemy_behaviour(level, player, self.tic, &mut events);

        if !was_dead && player.dead() {
            tracing::info!(tic = self.tic, "player died");
            events.player_died = true;
        }
        self.tic += 1;
        events
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sim::{EnemySpec, Weapon},
        world::{Texture, TextureAtlas, TileMap},
    };
    use glam::DVec2;
    use std::sync::Arc;

    fn atlas(frames: usize) -> Arc<TextureAtlas> {
        Arc::new(TextureAtlas::new(Texture::solid(8 * frames, 24, 0xFF_FF_FF_FF), 8).unwrap())
    }

    fn corridor() -> Level {
        let rows = ["00000000", "0      0", "00000000"];
        Level::new(TileMap::new(&rows.concat(), 8, 3).unwrap(), atlas(1))
    }

    #[test]
    fn tick_counts_and_applies_input() {
        let mut lvl = corridor();
        let mut p = Player::new(DVec2::new(1.5, 1.5), 0.0, Weapon::pistol(atlas(1)));
        let mut sim = TicRunner::new();
        let fwd = InputCmd {
            forward: 1.0,
            ..InputCmd::default()
        };
        for _ in 0..5 {
            sim.tick(&mut lvl, &mut p, fwd);
        }
        assert_eq!(sim.now(), 5);
        assert!((p.pos().x - 2.5).abs() < 1e-9);
    }

    #[test]
    fn shots_travel_and_kill() {
        let mut lvl = corridor();
        lvl.spawn_enemy(EnemySpec {
            max_hp: 25,
            ..EnemySpec::new(DVec2::new(5.5, 1.5), atlas(4))
        });
        let mut p = Player::new(DVec2::new(1.5, 1.5), 0.0, Weapon::pistol(atlas(1)));
        let mut sim = TicRunner::new();

        let fire = InputCmd {
            fire: true,
            ..InputCmd::default()
        };
        let mut events = sim.tick(&mut lvl, &mut p, fire);
        for _ in 0..40 {
            events.merge(sim.tick(&mut lvl, &mut p, InputCmd::default()));
        }
        assert_eq!(events.enemies_killed, 1);
        assert_eq!(lvl.bullet_count(), 0);
        assert_eq!(lvl.enemies_alive(), 0);
    }

    #[test]
    fn player_death_is_reported_once() {
        let mut lvl = corridor();
        lvl.spawn_enemy(EnemySpec {
            attack_damage: 200,
            ..EnemySpec::new(DVec2::new(2.3, 1.5), atlas(5))
        });
        let mut p = Player::new(DVec2::new(1.5, 1.5), 0.0, Weapon::pistol(atlas(1)));
        let mut sim = TicRunner::new();

        let mut deaths = 0;
        for _ in 0..10 * ANIMATION_WAIT_TICS {
            if sim.tick(&mut lvl, &mut p, InputCmd::default()).player_died {
                deaths += 1;
            }
        }
        assert!(p.dead());
        assert_eq!(deaths, 1);
    }

    #[test]
    fn pump_without_elapsed_time_runs_nothing() {
        let mut lvl = corridor();
        let mut p = Player::new(DVec2::new(1.5, 1.5), 0.0, Weapon::pistol(atlas(1)));
        let mut sim = TicRunner::new();
        let ev = sim.pump(&mut lvl, &mut p, InputCmd::default());
        assert_eq!(ev, TicEvents::default());
        assert!(sim.now() <= 1);
    }
}
