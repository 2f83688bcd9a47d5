//! Level catalog and procedural level generation

use serde::{Deserialize, Serialize};

use super::rng::SeededRng;

/// Biome of a level (drives tree species, grass density and palettes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Forest,
    Winter,
    Desert,
    Island,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Forest,
        Environment::Winter,
        Environment::Desert,
        Environment::Island,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    Clear,
    Rain,
    Snow,
    Fog,
}

impl Weather {
    pub const ALL: [Weather; 4] = [Weather::Clear, Weather::Rain, Weather::Snow, Weather::Fog];

    /// Weather that emits falling particles
    pub fn has_precipitation(self) -> bool {
        matches!(self, Weather::Rain | Weather::Snow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 2] = [TimeOfDay::Day, TimeOfDay::Night];
}

/// A playable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// 1-based level id (also the world seed input)
    pub id: u32,
    pub name: String,
    pub environment: Environment,
    pub unlocked: bool,
    pub completed: bool,
    /// Enemies to generate (not a live count)
    pub enemy_count: u32,
    /// Stones to generate, and the number required to open the portal
    pub stone_count: u32,
    pub weather: Weather,
    pub time_of_day: TimeOfDay,
}

/// Upper bounds for procedural difficulty
pub const MAX_PROCEDURAL_ENEMIES: u32 = 80;
pub const MAX_PROCEDURAL_STONES: u32 = 24;

/// Generate the level appended once the known catalog runs out.
///
/// Draw order: environment, enemy factor, stone factor, weather, time of day.
pub fn procedural_level(id: u32) -> Level {
    let mut rng = SeededRng::for_level(id);
    let difficulty = id.max(1) as f32;

    let environment = Environment::ALL[rng.index(Environment::ALL.len())];
    // Clamped in f32 so huge ids cannot overflow the integer add
    let enemy_count = (6.0 + (difficulty * (1.2 + rng.next_f32())).floor())
        .min(MAX_PROCEDURAL_ENEMIES as f32) as u32;
    let stone_count = (3.0 + (difficulty * (0.4 + rng.next_f32() * 0.6)).floor())
        .min(MAX_PROCEDURAL_STONES as f32) as u32;
    let weather = Weather::ALL[rng.index(Weather::ALL.len())];
    let time_of_day = TimeOfDay::ALL[rng.index(TimeOfDay::ALL.len())];

    log::info!(
        "Procedural level {}: {:?}, {} enemies, {} stones, {:?}/{:?}",
        id,
        environment,
        enemy_count,
        stone_count,
        weather,
        time_of_day
    );

    Level {
        id,
        name: format!("Procedural {id}"),
        environment,
        unlocked: true,
        completed: false,
        enemy_count,
        stone_count,
        weather,
        time_of_day,
    }
}

/// Ordered list of levels known this session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelCatalog {
    /// The four hand-authored levels; only the first starts unlocked
    pub fn new() -> Self {
        let fixed = |id, name: &str, environment, enemy_count, stone_count, weather, time_of_day| {
            Level {
                id,
                name: name.to_string(),
                environment,
                unlocked: id == 1,
                completed: false,
                enemy_count,
                stone_count,
                weather,
                time_of_day,
            }
        };
        Self {
            levels: vec![
                fixed(1, "Haunted Forest", Environment::Forest, 6, 3, Weather::Fog, TimeOfDay::Night),
                fixed(2, "Frozen Wasteland", Environment::Winter, 8, 4, Weather::Snow, TimeOfDay::Night),
                fixed(3, "Desert of Souls", Environment::Desert, 10, 5, Weather::Clear, TimeOfDay::Day),
                fixed(4, "Cursed Island", Environment::Island, 12, 6, Weather::Rain, TimeOfDay::Night),
            ],
        }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Index 0 is always playable; others once unlocked
    pub fn is_playable(&self, index: usize) -> bool {
        match self.levels.get(index) {
            Some(level) => index == 0 || level.unlocked,
            None => false,
        }
    }

    /// Mark `index` completed and unlock its successor, appending a
    /// procedural level when `index` was the last known one.
    pub fn complete(&mut self, index: usize) {
        let Some(level) = self.levels.get_mut(index) else {
            return;
        };
        level.completed = true;

        match self.levels.get_mut(index + 1) {
            Some(next) => next.unlocked = true,
            None => {
                let id = self.levels.len() as u32 + 1;
                self.levels.push(procedural_level(id));
            }
        }
    }
}
