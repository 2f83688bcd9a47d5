//! Deterministic world generation
//!
//! A level's content is a pure function of its definition. All draws come
//! from one stream seeded by the level id, consumed in a fixed order:
//! trees, grass, enemies, stones, health pickups, axe, guns, flowers.
//! Reordering any of these changes every layout after it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::{Environment, Level};
use super::rng::SeededRng;
use super::state::{
    Enemy, EnemyKind, Flower, Grass, HealthPickup, ItemPickup, Stone, Tree, TreeSpecies,
};
use crate::clamp_to_world;
use crate::consts::*;

/// Tree population per environment
pub const DENSE_TREE_COUNT: usize = 2500;
pub const SPARSE_TREE_COUNT: usize = 800;
/// Grass blades per square world unit
pub const GRASS_DENSITY: f32 = 0.0012;
pub const SPARSE_GRASS_DENSITY: f32 = 0.0002;
pub const FLOWER_COUNT: usize = 600;
/// Inset of stones and health pickups from the world edge
pub const STONE_MARGIN: f32 = 100.0;
pub const HEALTH_PICKUP_MARGIN: f32 = 50.0;
pub const MAX_HEALTH_PICKUPS: u32 = 5;
pub const MAX_GUN_PICKUPS: u32 = 2;

/// Everything placed in the world at level start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldContent {
    pub trees: Vec<Tree>,
    pub grass: Vec<Grass>,
    pub enemies: Vec<Enemy>,
    pub stones: Vec<Stone>,
    pub health_pickups: Vec<HealthPickup>,
    pub axe_pickups: Vec<ItemPickup>,
    pub gun_pickups: Vec<ItemPickup>,
    pub flowers: Vec<Flower>,
}

/// Populate the world for `level`
pub fn generate_world(level: &Level) -> WorldContent {
    let mut rng = SeededRng::for_level(level.id);

    let trees = generate_trees(&mut rng, level.environment);
    let grass = generate_grass(&mut rng, level.environment);
    let enemies = generate_enemies(&mut rng, level.enemy_count);

    let stones = (0..level.stone_count)
        .map(|id| Stone {
            id,
            pos: inset_point(&mut rng, STONE_MARGIN),
            collected: false,
            glowing: true,
        })
        .collect::<Vec<_>>();

    let health_count = MAX_HEALTH_PICKUPS.min(level.enemy_count / 2);
    let health_pickups = (0..health_count)
        .map(|id| HealthPickup {
            id,
            pos: inset_point(&mut rng, HEALTH_PICKUP_MARGIN),
            collected: false,
            healing: HEALTH_PICKUP_HEALING,
        })
        .collect::<Vec<_>>();

    let axe_pickups = if level.id == 1 {
        vec![ItemPickup {
            id: 0,
            pos: world_point(&mut rng, PICKUP_RADIUS),
            collected: false,
        }]
    } else {
        Vec::new()
    };

    let gun_count = if level.id >= 2 {
        MAX_GUN_PICKUPS.min(level.id / 2)
    } else {
        0
    };
    let gun_pickups = (0..gun_count)
        .map(|id| ItemPickup {
            id,
            pos: world_point(&mut rng, PICKUP_RADIUS),
            collected: false,
        })
        .collect::<Vec<_>>();

    let flowers = generate_flowers(&mut rng, level.environment);

    log::debug!(
        "Level {} world: {} trees, {} grass, {} enemies, {} stones, {} health, {} axe, {} guns",
        level.id,
        trees.len(),
        grass.len(),
        enemies.len(),
        stones.len(),
        health_pickups.len(),
        axe_pickups.len(),
        gun_pickups.len()
    );

    WorldContent {
        trees,
        grass,
        enemies,
        stones,
        health_pickups,
        axe_pickups,
        gun_pickups,
        flowers,
    }
}

/// Uniform point anywhere in the world, pulled inside by `radius`
fn world_point(rng: &mut SeededRng, radius: f32) -> Vec2 {
    let x = rng.next_f32() * WORLD_WIDTH;
    let y = rng.next_f32() * WORLD_HEIGHT;
    clamp_to_world(Vec2::new(x, y), radius)
}

/// Uniform point at least `margin` from every edge
fn inset_point(rng: &mut SeededRng, margin: f32) -> Vec2 {
    let x = margin + rng.next_f32() * (WORLD_WIDTH - 2.0 * margin);
    let y = margin + rng.next_f32() * (WORLD_HEIGHT - 2.0 * margin);
    Vec2::new(x, y)
}

fn generate_trees(rng: &mut SeededRng, environment: Environment) -> Vec<Tree> {
    let count = match environment {
        Environment::Desert => SPARSE_TREE_COUNT,
        _ => DENSE_TREE_COUNT,
    };

    (0..count)
        .map(|_| {
            // Species roll comes first; island trees need no roll
            let species = match environment {
                Environment::Winter if rng.next_f32() > 0.7 => TreeSpecies::Dead,
                Environment::Winter => TreeSpecies::Pine,
                Environment::Desert if rng.next_f32() > 0.8 => TreeSpecies::Dead,
                Environment::Desert => TreeSpecies::Palm,
                Environment::Island => TreeSpecies::Palm,
                Environment::Forest if rng.next_f32() > 0.3 => TreeSpecies::Pine,
                Environment::Forest => TreeSpecies::Oak,
            };
            let x = rng.next_f32() * WORLD_WIDTH;
            let y = rng.next_f32() * WORLD_HEIGHT;
            let size = 15.0 + rng.next_f32() * 35.0;
            Tree {
                pos: clamp_to_world(Vec2::new(x, y), size / 2.0),
                size,
                species,
            }
        })
        .collect()
}

fn generate_grass(rng: &mut SeededRng, environment: Environment) -> Vec<Grass> {
    let density = match environment {
        Environment::Desert => SPARSE_GRASS_DENSITY,
        _ => GRASS_DENSITY,
    };
    let count = (WORLD_WIDTH * WORLD_HEIGHT * density).floor() as usize;

    (0..count)
        .map(|_| {
            let x = rng.next_f32() * WORLD_WIDTH;
            let y = rng.next_f32() * WORLD_HEIGHT;
            Grass {
                pos: Vec2::new(x, y),
                height: 6.0 + rng.next_f32() * 10.0,
            }
        })
        .collect()
}

/// All chasers except the last slot (boss) and the one before it (wanderer)
pub fn enemy_kind_for_slot(slot: u32, count: u32) -> EnemyKind {
    if slot + 1 == count {
        EnemyKind::Boss
    } else if slot + 2 == count {
        EnemyKind::Wanderer
    } else {
        EnemyKind::Chaser
    }
}

fn generate_enemies(rng: &mut SeededRng, count: u32) -> Vec<Enemy> {
    (0..count)
        .map(|id| {
            let kind = enemy_kind_for_slot(id, count);
            let x = rng.next_f32() * WORLD_WIDTH;
            let y = rng.next_f32() * WORLD_HEIGHT;
            // Heading is drawn for every slot so the stream stays aligned
            let heading = rng.next_f32() * std::f32::consts::TAU;
            let heading = (kind == EnemyKind::Wanderer).then_some(heading);
            Enemy::new(id, kind, clamp_to_world(Vec2::new(x, y), kind.radius()), heading)
        })
        .collect()
}

/// Flower colors per environment (0xRRGGBB)
pub fn flower_palette(environment: Environment) -> &'static [u32] {
    match environment {
        Environment::Desert => &[0xfbbf24, 0xeab308, 0xf59e0b],
        Environment::Winter => &[0x93c5fd, 0xe5e7eb, 0xbfdbfe],
        _ => &[0xef4444, 0x22c55e, 0xa78bfa, 0xf472b6],
    }
}

fn generate_flowers(rng: &mut SeededRng, environment: Environment) -> Vec<Flower> {
    let palette = flower_palette(environment);
    (0..FLOWER_COUNT)
        .map(|_| {
            let x = rng.next_f32() * WORLD_WIDTH;
            let y = rng.next_f32() * WORLD_HEIGHT;
            let color = palette[rng.index(palette.len())];
            Flower {
                pos: Vec2::new(x, y),
                color,
            }
        })
        .collect()
}
