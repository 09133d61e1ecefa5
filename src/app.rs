//! Engine-thread loop
//!
//! Per tick: drain input edges, advance the simulation, draw the frame (which
//! also refreshes the Zone for the next tick), act on events, then sleep out
//! the tick budget.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::level::{LevelDir, LevelError, LevelSource};
use crate::persistence::{self, SAVE_FILE, SaveError};
use crate::platform::{FrameClock, Keyboard, StopFlag};
use crate::renderer::{AssetStore, Canvas, Renderer};
use crate::settings::Settings;
use crate::sim::{EngineError, GameEvent, GameState, Map, tick};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Level(#[from] LevelError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

pub struct App<C: Canvas, A: AssetStore> {
    state: GameState,
    renderer: Renderer<A>,
    canvas: C,
    keyboard: Keyboard,
    clock: FrameClock,
    settings: Settings,
    save_path: PathBuf,
    torn_down: bool,
}

impl<C: Canvas, A: AssetStore> App<C, A> {
    pub fn new(
        settings: Settings,
        levels: Box<dyn LevelSource>,
        keyboard: Keyboard,
        canvas: C,
        assets: A,
    ) -> Result<Self, AppError> {
        let seed = settings.resolve_seed();
        let clock = FrameClock::new(settings.tick_hz());
        let mut state = GameState::new(levels, seed)?;
        state.fps = clock.hz() as f32;
        state.player.jump_frame_safe = settings.jump_frame_safe as i32;
        log::info!(
            "Engine ready: {} levels, {} Hz, seed {seed}",
            state.level_count(),
            clock.hz()
        );

        Ok(Self {
            save_path: settings.data_dir.join(SAVE_FILE),
            state,
            renderer: Renderer::new(assets),
            canvas,
            keyboard,
            clock,
            settings,
            torn_down: false,
        })
    }

    /// Levels from `<data_dir>/maps`
    pub fn open(settings: Settings, keyboard: Keyboard, canvas: C, assets: A) -> Result<Self, AppError> {
        let levels = LevelDir::open(&settings.data_dir)?;
        Self::new(settings, Box::new(levels), keyboard, canvas, assets)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn renderer(&self) -> &Renderer<A> {
        &self.renderer
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stop_flag(&self) -> StopFlag {
        self.clock.stop_flag()
    }

    pub fn save_path(&self) -> &Path {
        &self.save_path
    }

    /// One tick without the end-of-tick sleep
    ///
    /// Returns false once the loop should end.
    pub fn frame(&mut self) -> bool {
        self.keyboard.poll();
        let input = self.keyboard.tick_input(self.settings.key_layout);
        tick(&mut self.state, &input, self.clock.dt());
        self.renderer.render_frame(&mut self.state, &mut self.canvas);

        for event in self.state.drain_events() {
            self.handle_event(event);
        }
        !self.state.is_stopped() && !self.clock.is_stopped()
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::SaveRequested => {
                if let Err(err) = self.save() {
                    log::warn!("{err}");
                }
            }
            GameEvent::ExitRequested => self.clock.stop_flag().stop(),
            GameEvent::PlayerDied { message } => log::debug!("Death: {message}"),
            GameEvent::LevelCompleted { level } => log::debug!("Completed level {level}"),
            GameEvent::LevelLoaded { level } => log::debug!("Loaded level {level}"),
            GameEvent::Paused | GameEvent::Resumed => {}
        }
    }

    /// Run until stopped, then tear down
    pub fn run(&mut self) {
        while self.frame() {
            if !self.clock.wait() {
                break;
            }
        }
        log::info!(
            "Loop ended after {} ticks ({:.1} fps measured)",
            self.clock.frames(),
            self.clock.measured_fps()
        );
        self.teardown();
    }

    pub fn save(&self) -> Result<(), SaveError> {
        persistence::save_game(&self.save_path, &self.state.save_data())
    }

    /// Restore the save file; the running game is untouched on failure
    pub fn load(&mut self) -> Result<(), AppError> {
        let data = persistence::load_game(&self.save_path)?;
        self.state.apply_save(&data)?;
        Ok(())
    }

    /// Release the level and raster; safe to call more than once
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.clock.stop_flag().stop();
        self.state.map = Map::default();
        self.state.zone.clear();
        log::info!("Engine torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

impl<C: Canvas, A: AssetStore> Drop for App<C, A> {
    fn drop(&mut self) {
        self.teardown();
    }
}
