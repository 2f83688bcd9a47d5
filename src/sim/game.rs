//! Top-level game modes and level progression
//!
//! `Game` owns the level catalog, the active `SimState` and the current mode.
//! Requests that are not legal in the current mode are ignored and reported
//! as `false`.

use serde::{Deserialize, Serialize};

use super::input::TickInput;
use super::level::{Level, LevelCatalog};
use super::snapshot::Snapshot;
use super::state::{GameEvent, SimState, TickOutcome};
use super::tick::tick;
use crate::settings::Settings;

/// Which screen/mode the game is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Loading,
    Menu,
    Settings,
    LevelSelect,
    Playing,
    Paused,
    Victory,
    GameOver,
}

pub struct Game {
    mode: Mode,
    catalog: LevelCatalog,
    /// Index into the catalog of the level being played
    current_level: usize,
    sim: Option<SimState>,
    settings: Settings,
    /// Pause was caused by losing focus, not by the player
    paused_by_system: bool,
    show_minimap: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Game {
    pub fn new(settings: Settings) -> Self {
        Self {
            mode: Mode::Loading,
            catalog: LevelCatalog::new(),
            current_level: 0,
            sim: None,
            settings,
            paused_by_system: false,
            show_minimap: true,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn current_level_index(&self) -> usize {
        self.current_level
    }

    pub fn current_level(&self) -> Option<&Level> {
        self.catalog.get(self.current_level)
    }

    pub fn sim(&self) -> Option<&SimState> {
        self.sim.as_ref()
    }

    /// Direct access for hosts and tests that script scenarios
    pub fn sim_mut(&mut self) -> Option<&mut SimState> {
        self.sim.as_mut()
    }

    /// Wood carried by the player; survives level changes and retries
    pub fn wood(&self) -> u32 {
        self.sim.as_ref().map_or(0, |s| s.player.wood)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn show_minimap(&self) -> bool {
        self.show_minimap
    }

    /// Effects produced by the most recent tick
    pub fn events(&self) -> &[GameEvent] {
        self.sim.as_ref().map(|s| s.events.as_slice()).unwrap_or(&[])
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::capture(self)
    }

    fn transition(&mut self, to: Mode) {
        log::info!("Mode {:?} -> {:?}", self.mode, to);
        self.mode = to;
    }

    /// Accept `to` only when the current mode is one of `from`
    fn guarded(&mut self, from: &[Mode], to: Mode) -> bool {
        if from.contains(&self.mode) {
            self.transition(to);
            true
        } else {
            log::debug!("Ignoring {:?} -> {:?}", self.mode, to);
            false
        }
    }

    pub fn finish_loading(&mut self) -> bool {
        self.guarded(&[Mode::Loading], Mode::Menu)
    }

    pub fn open_level_select(&mut self) -> bool {
        self.guarded(&[Mode::Menu], Mode::LevelSelect)
    }

    pub fn open_settings(&mut self) -> bool {
        self.guarded(&[Mode::Menu], Mode::Settings)
    }

    /// Settings or level select back to the main menu
    pub fn back_to_menu(&mut self) -> bool {
        self.guarded(&[Mode::Settings, Mode::LevelSelect], Mode::Menu)
    }

    /// Start a level from the level select screen. Locked or unknown
    /// levels are ignored and the game stays on level select.
    pub fn select_level(&mut self, index: usize) -> bool {
        if self.mode != Mode::LevelSelect {
            log::debug!("Level select ignored in {:?}", self.mode);
            return false;
        }
        if !self.catalog.is_playable(index) {
            log::debug!("Level {} is locked or unknown", index);
            return false;
        }
        self.start_level(index);
        true
    }

    /// Manual pause; needs an explicit resume
    pub fn pause(&mut self) -> bool {
        let paused = self.guarded(&[Mode::Playing], Mode::Paused);
        if paused {
            self.paused_by_system = false;
        }
        paused
    }

    pub fn resume(&mut self) -> bool {
        let resumed = self.guarded(&[Mode::Paused], Mode::Playing);
        if resumed {
            self.paused_by_system = false;
        }
        resumed
    }

    /// Host lost foreground (tab hidden, window blurred)
    pub fn focus_lost(&mut self) {
        if self.mode == Mode::Playing {
            self.transition(Mode::Paused);
            self.paused_by_system = true;
        }
    }

    /// Host regained foreground; only undoes a system pause
    pub fn focus_gained(&mut self) {
        if self.mode == Mode::Paused && self.paused_by_system {
            self.paused_by_system = false;
            self.transition(Mode::Playing);
        }
    }

    /// Continue to the level after a victory
    pub fn next_level(&mut self) -> bool {
        if self.mode != Mode::Victory {
            return false;
        }
        let next = self.current_level + 1;
        if self.catalog.is_playable(next) {
            self.start_level(next);
        } else {
            self.transition(Mode::LevelSelect);
        }
        true
    }

    /// Replay the same level after a game over (same seed, same layout)
    pub fn retry(&mut self) -> bool {
        if self.mode != Mode::GameOver {
            return false;
        }
        self.start_level(self.current_level);
        true
    }

    /// Leave a level for the level select screen
    pub fn abandon(&mut self) -> bool {
        let left = self.guarded(
            &[Mode::Victory, Mode::GameOver, Mode::Paused],
            Mode::LevelSelect,
        );
        if left {
            self.paused_by_system = false;
        }
        left
    }

    fn start_level(&mut self, index: usize) {
        let Some(level) = self.catalog.get(index) else {
            return;
        };
        log::info!("Starting level {} ({})", level.id, level.name);
        // Wood belongs to the session, not the level
        let wood = self.wood();
        let mut sim = SimState::new(level);
        sim.player.wood = wood;
        self.sim = Some(sim);
        self.current_level = index;
        self.paused_by_system = false;
        self.transition(Mode::Playing);
    }

    /// Run one fixed tick with the latest input
    pub fn update(&mut self, input: &TickInput) -> TickOutcome {
        if input.toggle_map {
            self.show_minimap = !self.show_minimap;
        }
        if input.pause {
            match self.mode {
                Mode::Playing => {
                    self.pause();
                }
                Mode::Paused => {
                    self.resume();
                }
                _ => {}
            }
        }

        let Some(sim) = self.sim.as_mut() else {
            return TickOutcome::Continue;
        };
        if self.mode != Mode::Playing {
            // Nothing new happened; don't replay last tick's effects
            sim.events.clear();
            return TickOutcome::Continue;
        }

        let outcome = tick(sim, input, &self.settings);
        match outcome {
            TickOutcome::Won => {
                self.catalog.complete(self.current_level);
                self.transition(Mode::Victory);
            }
            TickOutcome::Lost => self.transition(Mode::GameOver),
            TickOutcome::Continue => {}
        }
        outcome
    }
}
