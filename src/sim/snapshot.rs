//! Read-only view of the game for the presentation layer
//!
//! Borrowed from `Game` each frame and serialized for the page; nothing
//! here is ever fed back into the simulation. Scenery is culled to the
//! camera; entities the minimap needs are always sent whole.

use glam::Vec2;
use serde::Serialize;

use super::game::{Game, Mode};
use super::level::Level;
use super::state::{
    Bullet, Campfire, Enemy, Flower, GameEvent, Grass, HealthPickup, ItemPickup, Particle,
    Player, SimState, Stone, Tree,
};
use crate::consts::{MAX_STAMINA, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// Extra border around the viewport kept when culling scenery
pub const CULL_MARGIN: f32 = 60.0;

fn on_screen(camera: Vec2, pos: Vec2) -> bool {
    let rel = pos - camera;
    rel.x >= -CULL_MARGIN
        && rel.y >= -CULL_MARGIN
        && rel.x <= VIEWPORT_WIDTH + CULL_MARGIN
        && rel.y <= VIEWPORT_HEIGHT + CULL_MARGIN
}

fn cull<T>(items: &[T], camera: Vec2, pos: impl Fn(&T) -> Vec2) -> Vec<&T> {
    items.iter().filter(|item| on_screen(camera, pos(*item))).collect()
}

/// Values shown on the heads-up display
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HudValues {
    pub stones_collected: u32,
    pub stones_required: u32,
    /// 0..=100
    pub stamina_percent: u32,
    pub health: f32,
    pub lives: i32,
    pub wood: u32,
    pub has_axe: bool,
    pub has_gun: bool,
}

impl HudValues {
    pub fn from_sim(sim: &SimState) -> Self {
        let player = &sim.player;
        Self {
            stones_collected: player.stones,
            stones_required: sim.level.stone_count,
            stamina_percent: (player.stamina / MAX_STAMINA * 100.0).round().clamp(0.0, 100.0)
                as u32,
            health: player.health,
            lives: player.lives,
            wood: player.wood,
            has_axe: player.has_axe,
            has_gun: sim.has_gun(),
        }
    }
}

/// Entities of the running level
#[derive(Debug, Serialize)]
pub struct WorldView<'a> {
    pub level: &'a Level,
    pub tick: u64,
    pub camera: Vec2,
    pub portal: Vec2,
    pub portal_open: bool,
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub stones: &'a [Stone],
    pub health_pickups: &'a [HealthPickup],
    pub axe_pickups: &'a [ItemPickup],
    pub gun_pickups: &'a [ItemPickup],
    pub trees: Vec<&'a Tree>,
    pub grass: Vec<&'a Grass>,
    pub flowers: Vec<&'a Flower>,
    pub bullets: &'a [Bullet],
    pub campfires: &'a [Campfire],
    pub particles: Vec<&'a Particle>,
    pub hud: HudValues,
}

impl<'a> WorldView<'a> {
    fn from_sim(sim: &'a SimState) -> Self {
        let camera = sim.camera;
        Self {
            level: &sim.level,
            tick: sim.time_ticks,
            camera,
            portal: SimState::portal_pos(),
            portal_open: sim.stones_remaining() == 0,
            player: &sim.player,
            enemies: &sim.enemies,
            stones: &sim.stones,
            health_pickups: &sim.health_pickups,
            axe_pickups: &sim.axe_pickups,
            gun_pickups: &sim.gun_pickups,
            trees: cull(&sim.trees, camera, |t| t.pos),
            grass: cull(&sim.grass, camera, |g| g.pos),
            flowers: cull(&sim.flowers, camera, |f| f.pos),
            bullets: &sim.bullets,
            campfires: &sim.campfires,
            particles: cull(&sim.particles, camera, |p| p.pos),
            hud: HudValues::from_sim(sim),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub mode: Mode,
    pub levels: &'a [Level],
    pub current_level: usize,
    pub show_minimap: bool,
    /// Effects since the last published snapshot
    pub events: &'a [GameEvent],
    /// Present once a level has been started
    pub world: Option<WorldView<'a>>,
}

impl<'a> Snapshot<'a> {
    pub fn capture(game: &'a Game) -> Self {
        Self {
            mode: game.mode(),
            levels: game.catalog().levels(),
            current_level: game.current_level_index(),
            show_minimap: game.show_minimap(),
            events: game.events(),
            world: game.sim().map(WorldView::from_sim),
        }
    }

    /// Replace the last tick's events with those gathered over a frame
    pub fn with_events(self, events: &'a [GameEvent]) -> Self {
        Self { events, ..self }
    }

    pub fn hud(&self) -> Option<HudValues> {
        self.world.as_ref().map(|w| w.hud)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Events from every tick run since the last snapshot was published.
/// A frame may run several ticks; `Game::events` only holds the last one.
#[derive(Debug, Default)]
pub struct FrameEvents {
    events: Vec<GameEvent>,
}

impl FrameEvents {
    /// Append what the tick just run produced
    pub fn record(&mut self, game: &Game) {
        self.events.extend_from_slice(game.events());
    }

    pub fn as_slice(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
