//! Simulation state and entity types
//!
//! One `SimState` holds everything the tick engine mutates for the active
//! level. It is rebuilt from scratch whenever a level (re)starts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::Level;
use super::rng::{SeededRng, level_seed};
use super::world::{WorldContent, generate_world};
use crate::consts::*;

/// The player's avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    /// 0-100
    pub health: f32,
    /// Stones collected this level
    pub stones: u32,
    pub speed: f32,
    /// 0-100
    pub stamina: f32,
    /// Ticks until the next chop is allowed
    pub attack_cooldown: u32,
    /// Terminal once <= 0
    pub lives: i32,
    pub has_axe: bool,
    /// Chopped wood, spent on campfires
    pub wood: u32,
}

impl Default for Player {
    /// Level-start defaults: world centre, full health and stamina
    fn default() -> Self {
        Self {
            pos: Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0),
            health: MAX_HEALTH,
            stones: 0,
            speed: PLAYER_SPEED,
            stamina: MAX_STAMINA,
            attack_cooldown: 0,
            lives: PLAYER_LIVES,
            has_axe: false,
            wood: 0,
        }
    }
}

/// Enemy behaviour archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Homes directly toward the player
    Chaser,
    /// Random walk, reflected at world edges
    Wanderer,
    /// Homes like a chaser; tougher and larger
    Boss,
}

impl EnemyKind {
    pub fn speed(self) -> f32 {
        match self {
            EnemyKind::Chaser => CHASER_SPEED,
            EnemyKind::Wanderer => WANDERER_SPEED,
            EnemyKind::Boss => BOSS_SPEED,
        }
    }

    pub fn max_health(self) -> i32 {
        match self {
            EnemyKind::Boss => 3,
            _ => 1,
        }
    }

    pub fn radius(self) -> f32 {
        match self {
            EnemyKind::Boss => BOSS_RADIUS,
            _ => ENEMY_RADIUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Unique within a level
    pub id: u32,
    pub pos: Vec2,
    pub speed: f32,
    pub kind: EnemyKind,
    pub health: i32,
    pub radius: f32,
    /// Heading in radians (wanderers only)
    pub heading: Option<f32>,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, heading: Option<f32>) -> Self {
        Self {
            id,
            pos,
            speed: kind.speed(),
            kind,
            health: kind.max_health(),
            radius: kind.radius(),
            heading,
        }
    }
}

/// Objective pickup; the level's stone count is the portal quota
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stone {
    pub id: u32,
    pub pos: Vec2,
    pub collected: bool,
    pub glowing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthPickup {
    pub id: u32,
    pub pos: Vec2,
    pub collected: bool,
    pub healing: f32,
}

/// Axe and gun pickups share a shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPickup {
    pub id: u32,
    pub pos: Vec2,
    pub collected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeSpecies {
    Pine,
    Oak,
    Dead,
    Palm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub pos: Vec2,
    /// Visual size; half of it is the collision reach
    pub size: f32,
    pub species: TreeSpecies,
}

/// Decorative grass blade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grass {
    pub pos: Vec2,
    pub height: f32,
}

/// Decorative flower, color as 0xRRGGBB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flower {
    pub pos: Vec2,
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: u32,
    pub max_life: u32,
    /// 0xRRGGBB
    pub color: u32,
    pub size: f32,
}

/// Player-placed lure that draws nearby enemies away
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campfire {
    pub pos: Vec2,
    pub life: u32,
}

/// Named audio cues; the audio collaborator owns how they sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    Pickup,
    Hit,
    Chop,
    Victory,
    Portal,
    Shoot,
}

/// Particle colors (0xRRGGBB)
pub mod palette {
    pub const BLOOD: u32 = 0xef4444;
    pub const STONE: u32 = 0xfbbf24;
    pub const HEALTH: u32 = 0x10b981;
    pub const AXE: u32 = 0xffd700;
    pub const GUN: u32 = 0x9ca3af;
    pub const WOOD: u32 = 0x92400e;
    pub const FIRE: u32 = 0xf97316;
    pub const RAIN: u32 = 0x60a5fa;
    pub const SNOW: u32 = 0xffffff;
}

/// Side effects produced by a tick, in the order they happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Cue(Cue),
    ParticleBurst { pos: Vec2, color: u32, count: u32 },
    LifeLost { lives: i32 },
    EnemyKilled { id: u32, pos: Vec2 },
    StoneCollected { id: u32 },
    TreeChopped { pos: Vec2 },
    LevelWon,
    LevelLost,
}

/// Outcome of a tick for the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    Continue,
    Won,
    Lost,
}

/// Complete per-level simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    /// Level being played (copied in at level start)
    pub level: Level,
    /// Ticks since level start
    pub time_ticks: u64,
    pub player: Player,
    /// Top-left of the viewport in world space
    pub camera: Vec2,
    pub enemies: Vec<Enemy>,
    pub stones: Vec<Stone>,
    pub health_pickups: Vec<HealthPickup>,
    pub axe_pickups: Vec<ItemPickup>,
    pub gun_pickups: Vec<ItemPickup>,
    pub trees: Vec<Tree>,
    pub grass: Vec<Grass>,
    pub flowers: Vec<Flower>,
    pub bullets: Vec<Bullet>,
    pub campfires: Vec<Campfire>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Effects emitted by the last tick
    pub events: Vec<GameEvent>,
    /// Tick of the last enemy contact that cost a life
    pub last_enemy_hit: Option<u64>,
    /// Tick of the last campfire placement
    pub last_campfire: Option<u64>,
    /// Gameplay randomness (wanderer headings)
    pub rng: SeededRng,
    /// Cosmetic randomness (particles, weather); never read by gameplay
    pub fx_rng: SeededRng,
    next_id: u32,
}

impl SimState {
    /// Build the initial state of `level`; same level => same world
    pub fn new(level: &Level) -> Self {
        let WorldContent {
            trees,
            grass,
            enemies,
            stones,
            health_pickups,
            axe_pickups,
            gun_pickups,
            flowers,
        } = generate_world(level);

        let seed = level_seed(level.id);
        let player = Player::default();
        let mut state = Self {
            level: level.clone(),
            time_ticks: 0,
            camera: Vec2::ZERO,
            player,
            enemies,
            stones,
            health_pickups,
            axe_pickups,
            gun_pickups,
            trees,
            grass,
            flowers,
            bullets: Vec::new(),
            campfires: Vec::new(),
            particles: Vec::new(),
            events: Vec::new(),
            last_enemy_hit: None,
            last_campfire: None,
            rng: SeededRng::new(seed ^ 0x5eed_0001),
            fx_rng: SeededRng::new(seed ^ 0x5eed_0002),
            next_id: 1,
        };
        state.camera = state.camera_for(state.player.pos);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Viewport origin centred on `focus`, kept inside the world
    pub fn camera_for(&self, focus: Vec2) -> Vec2 {
        Vec2::new(
            (focus.x - VIEWPORT_WIDTH / 2.0).clamp(0.0, WORLD_WIDTH - VIEWPORT_WIDTH),
            (focus.y - VIEWPORT_HEIGHT / 2.0).clamp(0.0, WORLD_HEIGHT - VIEWPORT_HEIGHT),
        )
    }

    pub fn has_gun(&self) -> bool {
        self.gun_pickups.iter().any(|g| g.collected)
    }

    /// Stones still needed before the portal opens
    pub fn stones_remaining(&self) -> u32 {
        self.level.stone_count.saturating_sub(self.player.stones)
    }

    pub fn portal_pos() -> Vec2 {
        Vec2::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn cue(&mut self, cue: Cue) {
        self.events.push(GameEvent::Cue(cue));
    }
}
