//! Grovebound - a scrolling-world survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world generation, tick engine, game modes)
//! - `settings`: Graphics quality and audio preferences
//! - `audio`: Web Audio cue playback (browser only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod settings;
pub mod sim;

pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation tick period in milliseconds
    pub const TICK_MS: u32 = 16;
    /// Maximum ticks run per frame to prevent spiral of death
    pub const MAX_TICKS_PER_FRAME: u32 = 8;

    /// World dimensions (long horizontal strip)
    pub const WORLD_WIDTH: f32 = 30_000.0;
    pub const WORLD_HEIGHT: f32 = 3_000.0;

    /// Virtual viewport used for camera and aim
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;

    /// Collision radii
    pub const PLAYER_RADIUS: f32 = 12.0;
    pub const ENEMY_RADIUS: f32 = 16.0;
    pub const BOSS_RADIUS: f32 = 25.0;
    pub const STONE_RADIUS: f32 = 14.0;
    pub const PORTAL_RADIUS: f32 = 30.0;
    pub const PICKUP_RADIUS: f32 = 12.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 2.0;
    pub const PLAYER_LIVES: i32 = 3;
    pub const MAX_HEALTH: f32 = 100.0;
    pub const MAX_STAMINA: f32 = 100.0;

    /// Sprint and stamina (per tick)
    pub const SPRINT_MULTIPLIER: f32 = 1.8;
    pub const STAMINA_DRAIN: f32 = 0.7;
    pub const STAMINA_REGEN_WALKING: f32 = 0.35;
    pub const STAMINA_REGEN_IDLE: f32 = 0.5;

    /// Touch joystick: full deflection radius and speed gain over keyboard
    pub const JOYSTICK_RADIUS: f32 = 40.0;
    pub const JOYSTICK_GAIN: f32 = 2.0;

    /// Enemy speeds
    pub const CHASER_SPEED: f32 = 2.0;
    pub const BOSS_SPEED: f32 = 1.5;
    pub const WANDERER_SPEED: f32 = 1.0;
    /// Max heading change per tick for wanderers (radians, either way)
    pub const WANDER_TURN: f32 = 0.1;

    /// Combat
    pub const ATTACK_COOLDOWN_TICKS: u32 = 30;
    pub const ATTACK_REACH: f32 = PLAYER_RADIUS + 20.0;
    pub const TREE_DAMAGE_INTERVAL: u64 = 30;
    pub const INVULNERABILITY_TICKS: u64 = 36;
    pub const TREE_KNOCKBACK: f32 = 15.0;
    pub const ENEMY_KNOCKBACK: f32 = 20.0;

    /// Bullets
    pub const BULLET_SPEED: f32 = 12.0;
    pub const BULLET_LIFE_TICKS: u32 = 90;
    pub const BULLET_HIT_MARGIN: f32 = 2.0;

    /// Campfires
    pub const CAMPFIRE_WOOD_COST: u32 = 3;
    pub const CAMPFIRE_LIFE_TICKS: u32 = 1800;
    pub const CAMPFIRE_COOLDOWN_TICKS: u64 = 60;
    pub const CAMPFIRE_LURE_RADIUS: f32 = 160.0;
    pub const CAMPFIRE_LURE_SPEED: f32 = 0.5;

    /// Particles
    pub const PARTICLE_LIFE_TICKS: u32 = 60;
    pub const WEATHER_INTERVAL: u64 = 10;

    /// Pickups
    pub const HEALTH_PICKUP_HEALING: f32 = 25.0;
}

/// Unit vector from `from` toward `to`, or zero when the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Clamp a position so a circle of `radius` stays inside the world
#[inline]
pub fn clamp_to_world(pos: Vec2, radius: f32) -> Vec2 {
    use consts::{WORLD_HEIGHT, WORLD_WIDTH};
    Vec2::new(
        pos.x.clamp(radius, WORLD_WIDTH - radius),
        pos.y.clamp(radius, WORLD_HEIGHT - radius),
    )
}

/// Push `pos` away from `source` by `force`; coincident points are not moved
#[inline]
pub fn knockback(pos: Vec2, source: Vec2, force: f32) -> Vec2 {
    pos + direction_to(source, pos) * force
}

/// Strict circle overlap test (touching circles do not overlap)
#[inline]
pub fn within(a: Vec2, b: Vec2, reach: f32) -> bool {
    a.distance(b) < reach
}
