//! First-person view of a small demo level.
//!
//! ```bash
//! cargo run --release -- [--dev] [--fov 60] [--width 960 --height 600]
//! ```
//!
//! Arrows / WASD move and turn, Space or Ctrl fires, Esc quits.

use std::{
    f64::consts::FRAC_PI_2,
    sync::Arc,
    time::{Duration, Instant},
};

use clap::Parser;
use glam::DVec2;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing::Level as LogLevel;
use tracing_subscriber::FmtSubscriber;

use wolfcast_rs::{
    renderer::{RayCaster, RenderConfig, Renderer, Software},
    sim::{EnemySpec, InputCmd, Level, Player, SIM_FPS, TicRunner, Weapon},
    world::{Rgba, Texture, TextureAtlas, TileMap, texture::OVERLAY_COLOUR},
};

/// 16×16 demo level; digits pick the wall tile.
const MAP: [&str; 16] = [
    "0000222222220000",
    "1              0",
    "1      11111   0",
    "1     0        0",
    "0     0  1110000",
    "0     3        0",
    "0   10000      0",
    "0   3   11100  0",
    "0   0   0      0",
    "0   0   1  00000",
    "0       1      0",
    "2       1      0",
    "0       0      0",
    "0 000000       0",
    "0              0",
    "0000000000000000",
];

const WALL_TILE: usize = 64;
const WALL_COLOURS: [Rgba; 4] = [0xFF_80_80_80, 0xFF_8B_45_13, 0xFF_40_60_A0, 0xFF_30_80_30];
const ENEMY_TILE: usize = 64;
const ENEMY_FRAMES: usize = 5;
const BULLET_TILE: usize = 16;

#[derive(Parser, Debug)]
#[command(version, about = "Grid ray caster demo")]
struct Args {
    /// window width in pixels
    #[arg(long, default_value_t = 960)]
    width: usize,
    /// window height in pixels
    #[arg(long, default_value_t = 600)]
    height: usize,
    /// horizontal field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    fov: f64,
    /// grid crossings per ray
    #[arg(long, default_value_t = 16)]
    draw_distance: usize,
    /// show the top-down map next to the 3-D view
    #[arg(long)]
    dev: bool,
    /// log at debug level
    #[arg(short, long)]
    verbose: bool,
}

/// Brick pattern in one flat colour per tile.
fn wall_texture() -> Texture {
    let mut tex = Texture::solid(WALL_TILE * WALL_COLOURS.len(), WALL_TILE, 0);
    for y in 0..tex.h {
        for x in 0..tex.w {
            let base = WALL_COLOURS[x / WALL_TILE];
            let (lx, ly) = (x % WALL_TILE, y % WALL_TILE);
            let shift = if (ly / 16) % 2 == 0 { 0 } else { 16 };
            let mortar = ly % 16 == 15 || (lx + shift) % 32 == 31;
            tex.pixels[y * tex.w + x] = if mortar { 0xFF_20_20_20 } else { base };
        }
    }
    tex
}

/// Round blob per frame, rows for walking, attacking and dying.
fn enemy_texture() -> Texture {
    let (w, h) = (ENEMY_TILE * ENEMY_FRAMES, ENEMY_TILE * 3);
    let mut tex = Texture::solid(w, h, OVERLAY_COLOUR);
    let tints: [Rgba; 3] = [0xFF_C0_30_30, 0xFF_F0_A0_20, 0xFF_60_20_20];
    for y in 0..h {
        for x in 0..w {
            let (frame, row) = (x / ENEMY_TILE, y / ENEMY_TILE);
            let c = ENEMY_TILE as f64 / 2.0;
            let wobble = frame as f64 * 2.0;
            let radius = if row == 2 {
                c * (1.0 - frame as f64 / (ENEMY_FRAMES as f64 + 1.0))
            } else {
                c - 6.0 + wobble
            };
            let d = DVec2::new((x % ENEMY_TILE) as f64 - c, (y % ENEMY_TILE) as f64 - c);
            if d.length() < radius {
                tex.pixels[y * w + x] = tints[row];
            }
        }
    }
    tex
}

fn bullet_texture() -> Texture {
    let mut tex = Texture::solid(BULLET_TILE, BULLET_TILE, OVERLAY_COLOUR);
    let c = BULLET_TILE as f64 / 2.0;
    for y in 0..BULLET_TILE {
        for x in 0..BULLET_TILE {
            if DVec2::new(x as f64 - c, y as f64 - c).length() < 2.5 {
                tex.pixels[y * BULLET_TILE + x] = 0xFF_FF_FF_60;
            }
        }
    }
    tex
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            LogLevel::DEBUG
        } else {
            LogLevel::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // ─────────── assets & level ───────────
    let map = TileMap::new(&MAP.concat(), 16, 16)?;
    let mut level = Level::new(map, Arc::new(TextureAtlas::new(wall_texture(), WALL_TILE)?));
    let enemy_atlas = Arc::new(TextureAtlas::new(enemy_texture(), ENEMY_TILE)?);
    let bullet_atlas = Arc::new(TextureAtlas::new(bullet_texture(), BULLET_TILE)?);

    for (x, y) in [(10.5, 1.5), (3.5, 12.5), (12.5, 11.5), (6.5, 8.5)] {
        level.spawn_enemy(EnemySpec::new(DVec2::new(x, y), enemy_atlas.clone()));
    }
    let mut player = Player::new(DVec2::new(2.5, 2.5), FRAC_PI_2, Weapon::pistol(bullet_atlas));

    let config = RenderConfig {
        width: args.width,
        height: args.height,
        fov: args.fov.to_radians(),
        draw_distance: args.draw_distance,
        dev_mode: args.dev,
        max_sprite_size: args.height,
    };
    let mut caster = RayCaster::new(config, level.map().clone(), level.walls().clone())?;
    let mut renderer = Software::default();
    let mut sim = TicRunner::new();

    let mut win = Window::new(
        "wolfcast",
        args.width,
        args.height,
        WindowOptions::default(),
    )?;
    win.set_target_fps(SIM_FPS as usize * 2);

    tracing::info!(enemies = level.enemy_count(), "level ready");

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();
    let mut announced_win = false;

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        /* --------------- one InputCmd per frame ---------------------------- */
        let mut cmd = InputCmd::default();
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            cmd.forward += 1.0;
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            cmd.forward -= 1.0;
        }
        if win.is_key_down(Key::Left) || win.is_key_down(Key::A) {
            cmd.turn -= 1.0;
        }
        if win.is_key_down(Key::Right) || win.is_key_down(Key::D) {
            cmd.turn += 1.0;
        }
        cmd.fire = win.is_key_pressed(Key::Space, KeyRepeat::No)
            || win.is_key_down(Key::LeftCtrl)
            || win.is_key_down(Key::RightCtrl);

        let events = sim.pump(&mut level, &mut player, cmd);
        if events.player_died {
            tracing::info!("you died");
        }
        if !announced_win && level.enemies_alive() == 0 {
            tracing::info!(tic = sim.now(), "level cleared");
            announced_win = true;
        }

        /* draw */
        renderer.begin_frame(args.width, args.height);
        let depth = caster.cast(&mut renderer, &player.camera);
        caster.render_objects(&mut renderer, &player.camera, &depth, &level.billboards());

        let mut shown = Ok(());
        renderer.end_frame(|fb, w, h| {
            acc_time += t0.elapsed();
            acc_frames += 1;
            shown = win.update_with_buffer(fb, w, h);
        });
        shown?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames.max(1) as f64;
            tracing::info!(
                avg_ms = format_args!("{avg_ms:.2}"),
                fps = format_args!("{:.1}", 1000.0 / avg_ms),
                hp = player.hp,
                ammo = player.weapon.ammo,
                "render stats"
            );
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
