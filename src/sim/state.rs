//! Game state and core simulation types
//!
//! One `GameState` owns everything the engine thread mutates: the map, the
//! zone raster, the player, the summon oracle and the level clock.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::lane::Map;
use super::player::Player;
use super::summon::SummonOracle;
use super::zone::{Zone, ZoneError};
use crate::consts::*;
use crate::level::{LevelError, LevelSource};
use crate::persistence::SaveData;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Death animation; level time is frozen
    Dying { frame: u32, timer: f32 },
    /// Pause menu is up; level time is frozen
    Paused,
    /// Exit requested, the loop should tear down
    Stopped,
}

/// Pause menu entries, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PauseChoice {
    Exit,
    #[default]
    Resume,
    Save,
}

impl PauseChoice {
    pub const ALL: [PauseChoice; 3] = [PauseChoice::Exit, PauseChoice::Resume, PauseChoice::Save];

    pub fn as_str(&self) -> &'static str {
        match self {
            PauseChoice::Exit => "exit",
            PauseChoice::Resume => "resume",
            PauseChoice::Save => "save",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Overlay sprite for this entry
    pub fn sprite_name(&self) -> String {
        format!("pause_{}", self.as_str())
    }
}

/// Things that happened during a tick that the app layer acts on
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    LevelLoaded { level: usize },
    LevelCompleted { level: usize },
    PlayerDied { message: String },
    Paused,
    Resumed,
    SaveRequested,
    ExitRequested,
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}

/// Errors that stop the engine from starting
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Zone(#[from] ZoneError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error("no levels to play")]
    NoLevels,
}

/// Complete simulation state
#[derive(Debug)]
pub struct GameState {
    /// Current level number
    pub level: usize,
    pub map: Map,
    pub zone: Zone,
    pub player: Player,
    pub summons: SummonOracle,
    pub phase: GamePhase,
    pub pause_choice: PauseChoice,
    /// Seconds since level start, frozen while paused or dying
    pub t_tick: f32,
    /// `t_tick` as of the most recent lane draw
    pub t_last_drawn: f32,
    /// Nominal tick rate, feeds the summon trial probability
    pub fps: f32,
    /// Events since the last `drain_events`
    pub events: Vec<GameEvent>,
    levels: Box<dyn LevelSource>,
}

impl GameState {
    /// Build the state and load level 0
    pub fn new(levels: Box<dyn LevelSource>, seed: u64) -> Result<Self, EngineError> {
        if levels.level_count() == 0 {
            return Err(EngineError::NoLevels);
        }
        let mut state = Self {
            level: 0,
            map: Map::default(),
            zone: Zone::new(SCREEN_WIDTH, SCREEN_HEIGHT)?,
            player: Player::new(),
            summons: SummonOracle::from_state(RngState::new(seed)),
            phase: GamePhase::Playing,
            pause_choice: PauseChoice::default(),
            t_tick: 0.0,
            t_last_drawn: 0.0,
            fps: DEFAULT_TICK_HZ as f32,
            events: Vec::new(),
            levels,
        };
        state.set_level(0)?;
        Ok(state)
    }

    pub fn level_count(&self) -> usize {
        self.levels.level_count()
    }

    pub fn levels(&self) -> &dyn LevelSource {
        self.levels.as_ref()
    }

    /// `- Level<N>: Name | describe: Description` for the current level
    pub fn level_info(&self) -> String {
        self.levels.level_info(self.level)
    }

    /// Load `level` and restart it
    ///
    /// Out-of-range levels wrap with a warning. On error the current level
    /// stays loaded and untouched.
    pub fn set_level(&mut self, level: usize) -> Result<(), LevelError> {
        let count = self.levels.level_count();
        let wrapped = if count == 0 { 0 } else { level % count };
        if wrapped != level {
            log::warn!("Level {level} out of range, wrapping to {wrapped}");
        }

        let parsed = self.levels.load_level(wrapped)?;
        self.map = parsed.map;
        self.level = wrapped;
        self.restart();
        log::info!("{}", self.levels.level_info(wrapped));
        self.events.push(GameEvent::LevelLoaded { level: wrapped });
        Ok(())
    }

    /// Fresh start of the loaded level: clock, raster, summons, player
    fn restart(&mut self) {
        self.t_tick = 0.0;
        self.t_last_drawn = 0.0;
        self.zone.clear();
        self.summons.clear();
        self.player.reset();
        self.phase = GamePhase::Playing;
    }

    /// Advance to the next level, wrapping to 0 after the last one
    pub fn next_level(&mut self) -> Result<(), LevelError> {
        let count = self.levels.level_count();
        let next = self.level + 1;
        if next >= count {
            log::info!("Reset to level 0 (overflow)");
            return self.set_level(0);
        }
        self.set_level(next)
    }

    /// Go back a level, clamping at 0
    pub fn prev_level(&mut self) -> Result<(), LevelError> {
        if self.level == 0 {
            log::warn!("Reset to level 0 (underflow)");
            return self.set_level(0);
        }
        self.set_level(self.level - 1)
    }

    /// Reload the current level from its source
    pub fn reload(&mut self) -> Result<(), LevelError> {
        self.set_level(self.level)
    }

    pub fn save_data(&self) -> SaveData {
        SaveData {
            level: self.level,
            velocity: self.player.velocity,
            anim_pos: self.player.anim_pos,
            logic_pos: self.player.logic_pos,
        }
    }

    /// Load the saved level and put the player where the save says
    pub fn apply_save(&mut self, data: &SaveData) -> Result<(), LevelError> {
        self.set_level(data.level)?;
        self.player.velocity = data.velocity;
        self.player.place(data.anim_pos, data.logic_pos);
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == GamePhase::Stopped
    }

    /// Request loop exit
    pub fn stop(&mut self) {
        if self.phase != GamePhase::Stopped {
            self.phase = GamePhase::Stopped;
            self.events.push(GameEvent::ExitRequested);
        }
    }
}
