//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, one stream for gameplay and one for cosmetics
//! - Stable iteration order (by entity ID / generation order)
//! - No rendering, audio or platform dependencies

pub mod game;
pub mod input;
pub mod level;
pub mod rng;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod world;

pub use game::{Game, Mode};
pub use input::{KeyState, TickInput, aim_from_pointer, analog_from_drag, to_viewport};
pub use level::{Environment, Level, LevelCatalog, TimeOfDay, Weather, procedural_level};
pub use rng::{SeededRng, level_seed};
pub use snapshot::{FrameEvents, HudValues, Snapshot};
pub use state::{Cue, EnemyKind, GameEvent, Player, SimState, TickOutcome};
pub use tick::tick;
pub use world::{WorldContent, generate_world};
