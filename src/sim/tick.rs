//! Fixed timestep simulation tick
//!
//! Advances one level's state by exactly one tick. Steps run in a fixed
//! order because later steps read what earlier ones wrote this tick.

use glam::Vec2;

use super::input::TickInput;
use super::level::Weather;
use super::state::{
    Bullet, Campfire, Cue, EnemyKind, GameEvent, Particle, SimState, TickOutcome, palette,
};
use crate::consts::*;
use crate::settings::Settings;
use crate::{clamp_to_world, direction_to, knockback, within};

/// Advance the simulation by one tick
pub fn tick(state: &mut SimState, input: &TickInput, settings: &Settings) -> TickOutcome {
    state.events.clear();

    let outcome = run_steps(state, input, settings);

    // Particle bursts are cosmetic; realise them after gameplay has settled
    spawn_bursts(state, settings);
    outcome
}

fn run_steps(state: &mut SimState, input: &TickInput, settings: &Settings) -> TickOutcome {
    state.time_ticks += 1;
    update_particles(state);
    if state.time_ticks % WEATHER_INTERVAL == 0 {
        emit_weather(state, settings);
    }

    move_player(state, input);
    state.camera = state.camera_for(state.player.pos);

    if input.shoot {
        fire_bullet(state, input.aim);
    }
    update_bullets(state);
    resolve_bullet_hits(state);

    move_enemies(state);

    collect_stones(state);
    collect_pickups(state);

    tree_contact(state);
    enemy_contact(state);

    if input.campfire {
        place_campfire(state);
    }
    update_campfires(state);

    if input.attack {
        chop(state, input.aim);
    }

    if state.player.lives <= 0 {
        log::info!("Level {} lost at tick {}", state.level.id, state.time_ticks);
        state.emit(GameEvent::LevelLost);
        return TickOutcome::Lost;
    }

    if state.player.stones >= state.level.stone_count
        && within(state.player.pos, SimState::portal_pos(), PLAYER_RADIUS + PORTAL_RADIUS)
    {
        log::info!("Level {} won at tick {}", state.level.id, state.time_ticks);
        state.cue(Cue::Victory);
        state.emit(GameEvent::LevelWon);
        return TickOutcome::Won;
    }

    TickOutcome::Continue
}

fn update_particles(state: &mut SimState) {
    for particle in &mut state.particles {
        particle.pos += particle.vel;
        particle.life = particle.life.saturating_sub(1);
    }
    state.particles.retain(|p| p.life > 0);
}

fn emit_weather(state: &mut SimState, settings: &Settings) {
    if !settings.weather_enabled() || !state.level.weather.has_precipitation() {
        return;
    }
    let (drops, color) = match state.level.weather {
        Weather::Rain => (3, palette::RAIN),
        _ => (2, palette::SNOW),
    };
    let cap = settings.max_particles();
    for _ in 0..drops {
        let x = state.fx_rng.next_f32() * WORLD_WIDTH;
        spawn_particles(state, Vec2::new(x, 0.0), color, 1, cap);
    }
}

fn move_player(state: &mut SimState, input: &TickInput) {
    let player = &mut state.player;

    let moving = input.is_moving();
    let sprinting = input.sprint && player.stamina > 0.0;
    let multiplier = if sprinting { SPRINT_MULTIPLIER } else { 1.0 };

    let analog = input.analog.clamp_length_max(1.0);
    let step = (input.keys + analog * JOYSTICK_GAIN) * player.speed * multiplier;
    player.pos = clamp_to_world(player.pos + step, PLAYER_RADIUS);

    let stamina_delta = match (moving, sprinting) {
        (true, true) => -STAMINA_DRAIN,
        (true, false) => STAMINA_REGEN_WALKING,
        (false, _) => STAMINA_REGEN_IDLE,
    };
    player.stamina = (player.stamina + stamina_delta).clamp(0.0, MAX_STAMINA);
    player.attack_cooldown = player.attack_cooldown.saturating_sub(1);
}

fn fire_bullet(state: &mut SimState, aim: f32) {
    if !state.has_gun() {
        return;
    }
    let id = state.next_entity_id();
    state.bullets.push(Bullet {
        id,
        pos: state.player.pos,
        vel: Vec2::from_angle(aim) * BULLET_SPEED,
        life: BULLET_LIFE_TICKS,
    });
    state.cue(Cue::Shoot);
}

fn update_bullets(state: &mut SimState) {
    for bullet in &mut state.bullets {
        bullet.pos += bullet.vel;
        bullet.life = bullet.life.saturating_sub(1);
    }
    state.bullets.retain(|b| {
        b.life > 0
            && b.pos.x > 0.0
            && b.pos.x < WORLD_WIDTH
            && b.pos.y > 0.0
            && b.pos.y < WORLD_HEIGHT
    });
}

/// Each bullet damages at most one enemy; enemies at <= 0 health die
fn resolve_bullet_hits(state: &mut SimState) {
    if state.bullets.is_empty() || state.enemies.is_empty() {
        return;
    }

    let mut consumed = vec![false; state.bullets.len()];
    let mut hits = Vec::new();
    for enemy in &mut state.enemies {
        for (i, bullet) in state.bullets.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            if within(bullet.pos, enemy.pos, enemy.radius + BULLET_HIT_MARGIN) {
                enemy.health -= 1;
                consumed[i] = true;
                hits.push(enemy.pos);
            }
        }
    }

    for pos in hits {
        state.emit(GameEvent::ParticleBurst {
            pos,
            color: palette::BLOOD,
            count: 6,
        });
    }

    let mut killed = Vec::new();
    state.enemies.retain(|e| {
        if e.health <= 0 {
            killed.push(GameEvent::EnemyKilled { id: e.id, pos: e.pos });
            false
        } else {
            true
        }
    });
    state.events.extend(killed);

    let mut flags = consumed.into_iter();
    state.bullets.retain(|_| !flags.next().unwrap_or(false));
}

fn move_enemies(state: &mut SimState) {
    let SimState {
        enemies,
        player,
        rng,
        ..
    } = state;
    let target = player.pos;

    for enemy in enemies.iter_mut() {
        match enemy.kind {
            EnemyKind::Chaser | EnemyKind::Boss => {
                enemy.pos += direction_to(enemy.pos, target) * enemy.speed;
            }
            EnemyKind::Wanderer => {
                let mut heading = enemy.heading.unwrap_or(0.0) + rng.jitter(WANDER_TURN);
                let next = enemy.pos + Vec2::from_angle(heading) * enemy.speed;
                let r = enemy.radius;
                if next.x < r || next.x > WORLD_WIDTH - r {
                    heading = std::f32::consts::PI - heading;
                }
                if next.y < r || next.y > WORLD_HEIGHT - r {
                    heading = -heading;
                }
                enemy.heading = Some(heading);
                enemy.pos = next;
            }
        }
        enemy.pos = clamp_to_world(enemy.pos, enemy.radius);
    }
}

fn collect_stones(state: &mut SimState) {
    let player_pos = state.player.pos;
    let mut collected = Vec::new();
    for stone in state.stones.iter_mut().filter(|s| !s.collected) {
        if within(player_pos, stone.pos, PLAYER_RADIUS + STONE_RADIUS) {
            stone.collected = true;
            stone.glowing = false;
            collected.push((stone.id, stone.pos));
        }
    }

    for (id, pos) in collected {
        state.player.stones += 1;
        state.emit(GameEvent::StoneCollected { id });
        state.emit(GameEvent::ParticleBurst {
            pos,
            color: palette::STONE,
            count: 10,
        });
        state.cue(Cue::Pickup);
    }
}

fn collect_pickups(state: &mut SimState) {
    let player_pos = state.player.pos;
    let reach = PLAYER_RADIUS + PICKUP_RADIUS;
    let mut bursts = Vec::new();

    for pickup in state.health_pickups.iter_mut().filter(|p| !p.collected) {
        if within(player_pos, pickup.pos, reach) {
            pickup.collected = true;
            state.player.health = (state.player.health + pickup.healing).min(MAX_HEALTH);
            bursts.push((pickup.pos, palette::HEALTH, 8, false));
        }
    }

    for axe in state.axe_pickups.iter_mut().filter(|p| !p.collected) {
        if within(player_pos, axe.pos, reach) {
            axe.collected = true;
            state.player.has_axe = true;
            bursts.push((axe.pos, palette::AXE, 10, true));
        }
    }

    for gun in state.gun_pickups.iter_mut().filter(|p| !p.collected) {
        if within(player_pos, gun.pos, reach) {
            gun.collected = true;
            bursts.push((gun.pos, palette::GUN, 10, true));
        }
    }

    for (pos, color, count, with_cue) in bursts {
        if with_cue {
            state.cue(Cue::Pickup);
        }
        state.emit(GameEvent::ParticleBurst { pos, color, count });
    }
}

/// Trees hurt a player without an axe, at most once per damage interval.
/// The throttle follows the absolute tick counter, not time since contact.
fn tree_contact(state: &mut SimState) {
    let player = &state.player;
    if player.has_axe || player.lives <= 0 || state.time_ticks % TREE_DAMAGE_INTERVAL != 0 {
        return;
    }
    let Some(tree_pos) = state
        .trees
        .iter()
        .find(|t| within(player.pos, t.pos, PLAYER_RADIUS + t.size / 2.0))
        .map(|t| t.pos)
    else {
        return;
    };

    lose_life(state, tree_pos, TREE_KNOCKBACK, 5);
}

/// One global invulnerability window covers all enemies
fn enemy_contact(state: &mut SimState) {
    if let Some(last) = state.last_enemy_hit {
        if state.time_ticks - last < INVULNERABILITY_TICKS {
            return;
        }
    }
    let player_pos = state.player.pos;
    let Some(enemy_pos) = state
        .enemies
        .iter()
        .find(|e| within(player_pos, e.pos, PLAYER_RADIUS + e.radius))
        .map(|e| e.pos)
    else {
        return;
    };

    state.last_enemy_hit = Some(state.time_ticks);
    lose_life(state, enemy_pos, ENEMY_KNOCKBACK, 8);
}

fn lose_life(state: &mut SimState, source: Vec2, force: f32, particles: u32) {
    let player = &mut state.player;
    player.lives -= 1;
    let hit_pos = player.pos;
    player.pos = clamp_to_world(knockback(player.pos, source, force), PLAYER_RADIUS);
    let lives = player.lives;

    state.cue(Cue::Hit);
    state.emit(GameEvent::ParticleBurst {
        pos: hit_pos,
        color: palette::BLOOD,
        count: particles,
    });
    state.emit(GameEvent::LifeLost { lives });
}

fn place_campfire(state: &mut SimState) {
    if state.player.wood < CAMPFIRE_WOOD_COST {
        return;
    }
    if let Some(last) = state.last_campfire {
        if state.time_ticks - last <= CAMPFIRE_COOLDOWN_TICKS {
            return;
        }
    }

    state.player.wood -= CAMPFIRE_WOOD_COST;
    state.last_campfire = Some(state.time_ticks);
    let pos = state.player.pos;
    state.campfires.push(Campfire {
        pos,
        life: CAMPFIRE_LIFE_TICKS,
    });
    state.cue(Cue::Portal);
    state.emit(GameEvent::ParticleBurst {
        pos,
        color: palette::FIRE,
        count: 10,
    });
}

/// Lure enemies toward the nearest campfire in range, then age the fires
fn update_campfires(state: &mut SimState) {
    if state.campfires.is_empty() {
        return;
    }

    let SimState {
        enemies, campfires, ..
    } = state;
    for enemy in enemies.iter_mut() {
        let nearest = campfires
            .iter()
            .map(|cf| (cf.pos, enemy.pos.distance(cf.pos)))
            .filter(|&(_, d)| d < CAMPFIRE_LURE_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((fire, _)) = nearest {
            enemy.pos += direction_to(enemy.pos, fire) * CAMPFIRE_LURE_SPEED;
            enemy.pos = clamp_to_world(enemy.pos, enemy.radius);
        }
    }

    for campfire in campfires.iter_mut() {
        campfire.life = campfire.life.saturating_sub(1);
    }
    campfires.retain(|cf| cf.life > 0);
}

/// Swing the axe: every tree whose size covers the strike point falls
fn chop(state: &mut SimState, aim: f32) {
    let player = &mut state.player;
    if player.attack_cooldown != 0 || !player.has_axe {
        return;
    }
    player.attack_cooldown = ATTACK_COOLDOWN_TICKS;
    let strike = player.pos + Vec2::from_angle(aim) * ATTACK_REACH;

    let mut felled = Vec::new();
    state.trees.retain(|tree| {
        if within(strike, tree.pos, tree.size) {
            felled.push(tree.pos);
            false
        } else {
            true
        }
    });

    for pos in felled {
        state.player.wood += 1;
        state.cue(Cue::Chop);
        state.emit(GameEvent::TreeChopped { pos });
        state.emit(GameEvent::ParticleBurst {
            pos,
            color: palette::WOOD,
            count: 15,
        });
    }
}

fn spawn_bursts(state: &mut SimState, settings: &Settings) {
    let cap = settings.max_particles();
    if cap == 0 {
        return;
    }
    let bursts: Vec<_> = state
        .events
        .iter()
        .filter_map(|e| match *e {
            GameEvent::ParticleBurst { pos, color, count } => Some((pos, color, count)),
            _ => None,
        })
        .collect();
    for (pos, color, count) in bursts {
        spawn_particles(state, pos, color, count, cap);
    }
}

fn spawn_particles(state: &mut SimState, pos: Vec2, color: u32, count: u32, cap: usize) {
    let rng = &mut state.fx_rng;
    for _ in 0..count {
        if state.particles.len() >= cap {
            break;
        }
        let offset = Vec2::new(rng.jitter(10.0), rng.jitter(10.0));
        let vel = Vec2::new(rng.jitter(2.0), rng.jitter(2.0));
        state.particles.push(Particle {
            pos: pos + offset,
            vel,
            life: PARTICLE_LIFE_TICKS,
            max_life: PARTICLE_LIFE_TICKS,
            color,
            size: rng.range(2.0, 6.0),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::{Level, LevelCatalog};
    use crate::sim::state::{Enemy, ItemPickup, Stone, Tree, TreeSpecies};
    use crate::settings::QualityPreset;
    use proptest::prelude::*;

    fn first_level() -> Level {
        LevelCatalog::new().levels()[0].clone()
    }

    /// Level 1 with every gameplay entity removed
    fn empty_state() -> SimState {
        let mut state = SimState::new(&first_level());
        state.enemies.clear();
        state.trees.clear();
        state.stones.clear();
        state.health_pickups.clear();
        state.axe_pickups.clear();
        state.gun_pickups.clear();
        state
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    fn run(state: &mut SimState, input: &TickInput, ticks: u32) -> TickOutcome {
        let settings = Settings::default();
        let mut outcome = TickOutcome::Continue;
        for _ in 0..ticks {
            outcome = tick(state, input, &settings);
            if outcome != TickOutcome::Continue {
                break;
            }
        }
        outcome
    }

    fn tree_at(pos: Vec2, size: f32) -> Tree {
        Tree {
            pos,
            size,
            species: TreeSpecies::Oak,
        }
    }

    #[test]
    fn test_sprint_drains_and_rest_regenerates() {
        let mut state = empty_state();
        let sprint = TickInput {
            keys: Vec2::new(1.0, 0.0),
            sprint: true,
            ..Default::default()
        };
        let start_x = state.player.pos.x;
        run(&mut state, &sprint, 10);
        assert!((state.player.stamina - 93.0).abs() < 1e-3);
        assert!((state.player.pos.x - start_x - 10.0 * PLAYER_SPEED * SPRINT_MULTIPLIER).abs() < 1e-2);

        run(&mut state, &idle(), 4);
        assert!((state.player.stamina - 95.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_sprint_without_stamina() {
        let mut state = empty_state();
        state.player.stamina = 0.0;
        let sprint = TickInput {
            keys: Vec2::new(1.0, 0.0),
            sprint: true,
            ..Default::default()
        };
        let start_x = state.player.pos.x;
        run(&mut state, &sprint, 1);
        assert!((state.player.pos.x - start_x - PLAYER_SPEED).abs() < 1e-3);
        // Walking regenerates
        assert!((state.player.stamina - STAMINA_REGEN_WALKING).abs() < 1e-6);
    }

    #[test]
    fn test_analog_input_clamped() {
        let mut state = empty_state();
        let input = TickInput {
            analog: Vec2::new(0.0, 50.0),
            ..Default::default()
        };
        let start_y = state.player.pos.y;
        run(&mut state, &input, 1);
        let moved = state.player.pos.y - start_y;
        assert!((moved - PLAYER_SPEED * JOYSTICK_GAIN).abs() < 1e-3);
    }

    #[test]
    fn test_player_clamped_to_world() {
        let mut state = empty_state();
        state.player.pos = Vec2::new(PLAYER_RADIUS + 1.0, PLAYER_RADIUS + 1.0);
        let input = TickInput {
            keys: Vec2::new(-1.0, -1.0),
            ..Default::default()
        };
        run(&mut state, &input, 5);
        assert_eq!(state.player.pos, Vec2::splat(PLAYER_RADIUS));
    }

    #[test]
    fn test_camera_follows_player() {
        let mut state = empty_state();
        state.player.pos = Vec2::new(1000.0, 1000.0);
        run(&mut state, &idle(), 1);
        assert_eq!(state.camera, Vec2::new(600.0, 700.0));
    }

    #[test]
    fn test_shoot_requires_gun() {
        let mut state = empty_state();
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        run(&mut state, &shoot, 1);
        assert!(state.bullets.is_empty());

        state.gun_pickups.push(ItemPickup {
            id: 0,
            pos: Vec2::ZERO,
            collected: true,
        });
        run(&mut state, &shoot, 1);
        assert_eq!(state.bullets.len(), 1);
        assert!(state.events.contains(&GameEvent::Cue(Cue::Shoot)));
        // Advanced once on the tick it was fired
        let expected = state.player.pos + Vec2::new(BULLET_SPEED, 0.0);
        assert!(state.bullets[0].pos.distance(expected) < 1e-3);
    }

    #[test]
    fn test_bullet_expires() {
        let mut state = empty_state();
        state.bullets.push(Bullet {
            id: 99,
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::new(0.1, 0.0),
            life: 3,
        });
        run(&mut state, &idle(), 2);
        assert_eq!(state.bullets.len(), 1);
        run(&mut state, &idle(), 1);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_bullet_leaves_world() {
        let mut state = empty_state();
        state.bullets.push(Bullet {
            id: 99,
            pos: Vec2::new(5.0, 100.0),
            vel: Vec2::new(-BULLET_SPEED, 0.0),
            life: 50,
        });
        run(&mut state, &idle(), 1);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_boss_takes_three_hits() {
        let mut state = empty_state();
        let boss_pos = Vec2::new(200.0, 200.0);
        state.enemies.push(Enemy::new(7, EnemyKind::Boss, boss_pos, None));
        // Three bullets that land on the boss this tick, one far away
        for id in 0..3 {
            state.bullets.push(Bullet {
                id,
                pos: boss_pos - Vec2::new(1.0, 0.0),
                vel: Vec2::ZERO,
                life: 10,
            });
        }
        state.bullets.push(Bullet {
            id: 3,
            pos: Vec2::new(900.0, 900.0),
            vel: Vec2::ZERO,
            life: 10,
        });
        run(&mut state, &idle(), 1);
        assert!(state.enemies.is_empty());
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.bullets[0].id, 3);
        assert!(state
            .events
            .contains(&GameEvent::EnemyKilled { id: 7, pos: boss_pos }));
    }

    #[test]
    fn test_bullet_hits_one_enemy_only() {
        let mut state = empty_state();
        let pos = Vec2::new(300.0, 300.0);
        state.enemies.push(Enemy::new(1, EnemyKind::Chaser, pos, None));
        state.enemies.push(Enemy::new(2, EnemyKind::Chaser, pos, None));
        state.bullets.push(Bullet {
            id: 0,
            pos,
            vel: Vec2::ZERO,
            life: 10,
        });
        run(&mut state, &idle(), 1);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].id, 2);
    }

    #[test]
    fn test_chaser_homes_on_player() {
        let mut state = empty_state();
        let player = state.player.pos;
        state
            .enemies
            .push(Enemy::new(0, EnemyKind::Chaser, player + Vec2::new(500.0, 0.0), None));
        run(&mut state, &idle(), 1);
        let e = &state.enemies[0];
        assert!((e.pos.x - (player.x + 500.0 - CHASER_SPEED)).abs() < 1e-3);
        assert!((e.pos.y - player.y).abs() < 1e-3);
    }

    #[test]
    fn test_coincident_chaser_stays_finite() {
        let mut state = empty_state();
        let player = state.player.pos;
        state.enemies.push(Enemy::new(0, EnemyKind::Chaser, player, None));
        run(&mut state, &idle(), 3);
        let e = &state.enemies[0];
        assert!(e.pos.is_finite());
        assert!(state.player.pos.is_finite());
    }

    #[test]
    fn test_wanderer_stays_in_bounds() {
        let mut state = empty_state();
        let corner = Vec2::splat(ENEMY_RADIUS);
        state
            .enemies
            .push(Enemy::new(0, EnemyKind::Wanderer, corner, Some(std::f32::consts::PI * 1.25)));
        state.player.pos = Vec2::new(5000.0, 1500.0);
        for _ in 0..500 {
            run(&mut state, &idle(), 1);
            let e = &state.enemies[0];
            assert!(e.pos.x >= e.radius && e.pos.x <= WORLD_WIDTH - e.radius);
            assert!(e.pos.y >= e.radius && e.pos.y <= WORLD_HEIGHT - e.radius);
        }
    }

    #[test]
    fn test_stone_collection() {
        let mut state = empty_state();
        let pos = state.player.pos + Vec2::new(PLAYER_RADIUS + STONE_RADIUS - 1.0, 0.0);
        state.stones.push(Stone {
            id: 4,
            pos,
            collected: false,
            glowing: true,
        });
        state.stones.push(Stone {
            id: 5,
            pos: pos + Vec2::new(100.0, 0.0),
            collected: false,
            glowing: true,
        });
        run(&mut state, &idle(), 2);
        assert_eq!(state.player.stones, 1);
        assert!(state.stones[0].collected);
        assert!(!state.stones[1].collected);
    }

    #[test]
    fn test_stone_collection_emits_cue_once() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state.stones.push(Stone {
            id: 0,
            pos,
            collected: false,
            glowing: true,
        });
        run(&mut state, &idle(), 1);
        assert!(state.events.contains(&GameEvent::Cue(Cue::Pickup)));
        run(&mut state, &idle(), 1);
        assert!(!state.events.contains(&GameEvent::Cue(Cue::Pickup)));
        assert_eq!(state.player.stones, 1);
    }

    #[test]
    fn test_health_pickup_capped() {
        let mut state = empty_state();
        state.player.health = 90.0;
        let pos = state.player.pos;
        state.health_pickups.push(crate::sim::state::HealthPickup {
            id: 0,
            pos,
            collected: false,
            healing: HEALTH_PICKUP_HEALING,
        });
        run(&mut state, &idle(), 1);
        assert_eq!(state.player.health, MAX_HEALTH);
        assert!(state.health_pickups[0].collected);
    }

    #[test]
    fn test_axe_and_gun_pickups() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state.axe_pickups.push(ItemPickup {
            id: 0,
            pos,
            collected: false,
        });
        state.gun_pickups.push(ItemPickup {
            id: 0,
            pos: pos + Vec2::new(5.0, 0.0),
            collected: false,
        });
        assert!(!state.has_gun());
        run(&mut state, &idle(), 1);
        assert!(state.player.has_axe);
        assert!(state.has_gun());
    }

    #[test]
    fn test_tree_damage_throttled_to_interval() {
        let mut state = empty_state();
        state.player.lives = 2;
        let pos = state.player.pos;
        state.trees.push(tree_at(pos, 40.0));

        let outcome = run(&mut state, &idle(), 29);
        assert_eq!(outcome, TickOutcome::Continue);
        assert_eq!(state.player.lives, 2);

        run(&mut state, &idle(), 1);
        assert_eq!(state.player.lives, 1);
        assert!(state.events.contains(&GameEvent::Cue(Cue::Hit)));

        let outcome = run(&mut state, &idle(), 30);
        assert_eq!(state.time_ticks, 60);
        assert_eq!(state.player.lives, 0);
        assert_eq!(outcome, TickOutcome::Lost);
    }

    #[test]
    fn test_tree_damage_once_per_tick() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state.trees.push(tree_at(pos, 40.0));
        state.trees.push(tree_at(pos, 30.0));
        run(&mut state, &idle(), 30);
        assert_eq!(state.player.lives, PLAYER_LIVES - 1);
    }

    #[test]
    fn test_tree_knockback() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state.trees.push(tree_at(pos - Vec2::new(10.0, 0.0), 40.0));
        state.time_ticks = 29;
        run(&mut state, &idle(), 1);
        assert!((state.player.pos.x - (pos.x + TREE_KNOCKBACK)).abs() < 1e-3);
    }

    #[test]
    fn test_axe_prevents_tree_damage() {
        let mut state = empty_state();
        state.player.has_axe = true;
        let pos = state.player.pos;
        state.trees.push(tree_at(pos, 40.0));
        run(&mut state, &idle(), 120);
        assert_eq!(state.player.lives, PLAYER_LIVES);
    }

    #[test]
    fn test_chop_fells_trees_and_grants_wood() {
        let mut state = empty_state();
        state.player.has_axe = true;
        let pos = state.player.pos;
        state.trees.push(tree_at(pos + Vec2::new(ATTACK_REACH, 0.0), 20.0));
        state.trees.push(tree_at(pos + Vec2::new(ATTACK_REACH + 5.0, 0.0), 20.0));
        state.trees.push(tree_at(pos - Vec2::new(ATTACK_REACH, 0.0), 20.0));
        let swing = TickInput {
            attack: true,
            aim: 0.0,
            ..Default::default()
        };
        run(&mut state, &swing, 1);
        assert_eq!(state.trees.len(), 1);
        assert_eq!(state.player.wood, 2);
        assert_eq!(state.player.attack_cooldown, ATTACK_COOLDOWN_TICKS);
        let chops = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::Cue(Cue::Chop))
            .count();
        assert_eq!(chops, 2);
    }

    #[test]
    fn test_chop_respects_cooldown() {
        let mut state = empty_state();
        state.player.has_axe = true;
        let pos = state.player.pos;
        let swing = TickInput {
            attack: true,
            ..Default::default()
        };
        run(&mut state, &swing, 1);
        state.trees.push(tree_at(pos + Vec2::new(ATTACK_REACH, 0.0), 20.0));
        run(&mut state, &swing, 29);
        assert_eq!(state.trees.len(), 1);
        run(&mut state, &swing, 1);
        assert!(state.trees.is_empty());
    }

    #[test]
    fn test_chop_requires_axe() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state.trees.push(tree_at(pos + Vec2::new(ATTACK_REACH, 0.0), 20.0));
        let swing = TickInput {
            attack: true,
            ..Default::default()
        };
        run(&mut state, &swing, 1);
        assert_eq!(state.trees.len(), 1);
        assert_eq!(state.player.wood, 0);
    }

    #[test]
    fn test_invulnerability_window() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state.enemies.push(Enemy::new(0, EnemyKind::Chaser, pos, None));

        run(&mut state, &idle(), 1);
        assert_eq!(state.player.lives, 2);
        // Contact continues through tick 36 (35 ticks later): no further loss
        run(&mut state, &idle(), 35);
        assert_eq!(state.player.lives, 2);
        // Tick 37 is 36 ticks after the first hit
        run(&mut state, &idle(), 1);
        assert_eq!(state.player.lives, 1);
    }

    #[test]
    fn test_enemy_knockback() {
        let mut state = empty_state();
        let pos = state.player.pos;
        state.enemies.push(Enemy::new(
            0,
            EnemyKind::Wanderer,
            pos + Vec2::new(0.0, 10.0),
            Some(0.0),
        ));
        run(&mut state, &idle(), 1);
        assert_eq!(state.player.lives, 2);
        assert!(state.player.pos.y < pos.y - ENEMY_KNOCKBACK + 1.0);
    }

    #[test]
    fn test_loss_halts_tick() {
        let mut state = empty_state();
        state.player.lives = 1;
        let pos = state.player.pos;
        state.enemies.push(Enemy::new(0, EnemyKind::Chaser, pos, None));
        state.player.has_axe = true;
        state.trees.push(tree_at(pos + Vec2::new(ATTACK_REACH, 0.0), 20.0));
        let swing = TickInput {
            attack: true,
            ..Default::default()
        };
        let outcome = run(&mut state, &swing, 1);
        assert_eq!(outcome, TickOutcome::Lost);
        assert!(state.events.contains(&GameEvent::LevelLost));
        assert!(state.player.lives <= 0);
    }

    #[test]
    fn test_campfire_placement_and_cooldown() {
        let mut state = empty_state();
        let place = TickInput {
            campfire: true,
            ..Default::default()
        };
        run(&mut state, &place, 1);
        assert!(state.campfires.is_empty());

        state.player.wood = 7;
        run(&mut state, &place, 1);
        assert_eq!(state.campfires.len(), 1);
        assert_eq!(state.player.wood, 4);
        assert!(state.events.contains(&GameEvent::Cue(Cue::Portal)));

        // Still within cooldown
        run(&mut state, &place, 60);
        assert_eq!(state.campfires.len(), 1);
        run(&mut state, &place, 1);
        assert_eq!(state.campfires.len(), 2);
        assert_eq!(state.player.wood, 1);
    }

    #[test]
    fn test_campfire_lures_and_expires() {
        let mut state = empty_state();
        let fire = Vec2::new(1000.0, 1000.0);
        state.campfires.push(Campfire { pos: fire, life: 2 });
        state.player.pos = Vec2::new(20_000.0, 1500.0);
        state.enemies.push(Enemy::new(
            0,
            EnemyKind::Wanderer,
            fire + Vec2::new(100.0, 0.0),
            Some(std::f32::consts::FRAC_PI_2),
        ));
        let before = state.enemies[0].pos;
        run(&mut state, &idle(), 1);
        let after = state.enemies[0].pos;
        // Wanderer moved ~1 down plus 0.5 toward the fire
        assert!(after.x < before.x);
        assert_eq!(state.campfires.len(), 1);
        run(&mut state, &idle(), 1);
        assert!(state.campfires.is_empty());
    }

    #[test]
    fn test_campfire_nearest_in_range_wins() {
        let mut state = empty_state();
        let start = Vec2::new(1000.0, 1000.0);
        // Chaser heads straight down toward the player, so x only moves by the lure
        state.player.pos = Vec2::new(1000.0, 2900.0);
        state.enemies.push(Enemy::new(0, EnemyKind::Chaser, start, None));
        state.campfires.push(Campfire {
            pos: start + Vec2::new(100.0, 0.0),
            life: 10,
        });
        state.campfires.push(Campfire {
            pos: start - Vec2::new(50.0, 0.0),
            life: 10,
        });
        run(&mut state, &idle(), 1);
        let pos = state.enemies[0].pos;
        assert!(pos.x < start.x);
        assert!((start.x - pos.x - CAMPFIRE_LURE_SPEED).abs() < 0.05);
        assert!(pos.y > start.y);
    }

    #[test]
    fn test_campfire_out_of_range_ignored() {
        let mut state = empty_state();
        let start = Vec2::new(1000.0, 1000.0);
        state.player.pos = Vec2::new(1000.0, 2900.0);
        state.enemies.push(Enemy::new(0, EnemyKind::Chaser, start, None));
        // Only fire sits just past the lure radius
        state.campfires.push(Campfire {
            pos: start - Vec2::new(CAMPFIRE_LURE_RADIUS + 10.0, 0.0),
            life: 10,
        });
        run(&mut state, &idle(), 1);
        assert!((state.enemies[0].pos.x - start.x).abs() < 1e-3);
    }

    #[test]
    fn test_win_requires_stones_and_portal() {
        let mut state = empty_state();
        state.player.pos = SimState::portal_pos();
        assert_eq!(run(&mut state, &idle(), 1), TickOutcome::Continue);

        state.player.stones = state.level.stone_count;
        state.player.pos = SimState::portal_pos() + Vec2::new(PLAYER_RADIUS + PORTAL_RADIUS, 0.0);
        assert_eq!(run(&mut state, &idle(), 1), TickOutcome::Continue);

        state.player.pos = SimState::portal_pos() + Vec2::new(PORTAL_RADIUS, 0.0);
        assert_eq!(run(&mut state, &idle(), 1), TickOutcome::Won);
        assert!(state.events.contains(&GameEvent::Cue(Cue::Victory)));
    }

    #[test]
    fn test_weather_respects_quality() {
        let mut low = empty_state();
        low.level.weather = Weather::Rain;
        let mut high = low.clone();
        let low_settings = Settings::from_preset(QualityPreset::Low);
        let high_settings = Settings::from_preset(QualityPreset::High);
        for _ in 0..10 {
            tick(&mut low, &idle(), &low_settings);
            tick(&mut high, &idle(), &high_settings);
        }
        assert!(low.particles.is_empty());
        assert_eq!(high.particles.len(), 3);
        assert!(high.particles.iter().all(|p| p.color == palette::RAIN));
    }

    #[test]
    fn test_particles_age_out() {
        let mut state = empty_state();
        state.particles.push(Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ONE,
            life: 2,
            max_life: 60,
            color: palette::WOOD,
            size: 3.0,
        });
        run(&mut state, &idle(), 1);
        assert_eq!(state.particles.len(), 1);
        assert_eq!(state.particles[0].pos, Vec2::ONE);
        run(&mut state, &idle(), 1);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_quality_does_not_change_gameplay() {
        let mut level = first_level();
        level.weather = Weather::Snow;
        let mut low = SimState::new(&level);
        let mut high = SimState::new(&level);
        let low_settings = Settings::from_preset(QualityPreset::Low);
        let high_settings = Settings::from_preset(QualityPreset::High);
        let input = TickInput {
            keys: Vec2::new(1.0, 1.0),
            sprint: true,
            ..Default::default()
        };
        for _ in 0..200 {
            let a = tick(&mut low, &input, &low_settings);
            let b = tick(&mut high, &input, &high_settings);
            assert_eq!(a, b);
            if a != TickOutcome::Continue {
                break;
            }
        }
        assert_eq!(low.player, high.player);
        assert_eq!(low.enemies, high.enemies);
        assert_eq!(low.trees.len(), high.trees.len());
    }

    #[test]
    fn test_determinism() {
        let level = first_level();
        let mut a = SimState::new(&level);
        let mut b = SimState::new(&level);
        let inputs = [
            TickInput {
                keys: Vec2::new(1.0, 0.0),
                ..Default::default()
            },
            TickInput {
                analog: Vec2::new(0.3, -0.8),
                sprint: true,
                ..Default::default()
            },
            TickInput {
                attack: true,
                aim: 1.0,
                ..Default::default()
            },
        ];
        for _ in 0..40 {
            for input in &inputs {
                let settings = Settings::default();
                let oa = tick(&mut a, input, &settings);
                let ob = tick(&mut b, input, &settings);
                assert_eq!(oa, ob);
            }
        }
        assert_eq!(a.player, b.player);
        assert_eq!(a.enemies, b.enemies);
        assert_eq!(a.particles, b.particles);
    }

    fn arb_input() -> impl Strategy<Value = TickInput> {
        (
            -1i8..=1,
            -1i8..=1,
            (-2.0f32..2.0, -2.0f32..2.0),
            any::<bool>(),
            any::<bool>(),
            -3.2f32..3.2,
        )
            .prop_map(|(kx, ky, (ax, ay), sprint, attack, aim)| TickInput {
                keys: Vec2::new(f32::from(kx), f32::from(ky)),
                analog: Vec2::new(ax, ay),
                sprint,
                attack,
                aim,
                ..Default::default()
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_bounds_and_stamina_hold(inputs in proptest::collection::vec(arb_input(), 1..200)) {
            let mut state = SimState::new(&first_level());
            // Start near a corner so clamping is exercised
            state.player.pos = Vec2::new(40.0, 40.0);
            state.player.lives = 1_000;
            let settings = Settings::default();
            for input in &inputs {
                let outcome = tick(&mut state, input, &settings);
                let p = state.player.pos;
                prop_assert!(p.x >= PLAYER_RADIUS && p.x <= WORLD_WIDTH - PLAYER_RADIUS);
                prop_assert!(p.y >= PLAYER_RADIUS && p.y <= WORLD_HEIGHT - PLAYER_RADIUS);
                prop_assert!((0.0..=MAX_STAMINA).contains(&state.player.stamina));
                for e in &state.enemies {
                    prop_assert!(e.pos.x >= e.radius && e.pos.x <= WORLD_WIDTH - e.radius);
                    prop_assert!(e.pos.y >= e.radius && e.pos.y <= WORLD_HEIGHT - e.radius);
                }
                if outcome != TickOutcome::Continue {
                    break;
                }
            }
        }
    }
}
