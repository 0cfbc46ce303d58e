pub mod animation;
pub mod components;
mod level;
mod player;
pub mod systems;
mod tic;

pub use animation::{Animation, AnimationKind};
pub use components::{Bullet, Enemy, Position, Sprite};
pub use level::{ENEMY_RADIUS, EnemySpec, Level, LevelError};
pub use player::{BulletStats, InputCmd, Player, Weapon};
pub use tic::{ANIMATION_WAIT_TICS, SIM_FPS, TicEvents, TicRunner};
