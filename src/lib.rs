//! Lane Hopper - a tile-lane "cross the road" arcade engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lanes, tiles, zone raster, player, collisions)
//! - `level`: Map file parsing and the level index
//! - `renderer`: Render/asset collaborator traits and the lane drawing pass
//! - `platform`: Keyboard edge detection and the fixed-rate frame clock
//! - `persistence`: Plain-text save files
//! - `settings`: Persisted preferences
//! - `app`: The engine-thread loop tying it all together

pub mod app;
pub mod level;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use app::App;
pub use settings::{KeyLayout, Settings, TickPreset};

/// Game configuration constants
pub mod consts {
    /// Default fixed simulation rate (Hz)
    pub const DEFAULT_TICK_HZ: u32 = 96;
    /// Allowed tick rate range (Hz)
    pub const MIN_TICK_HZ: u32 = 1;
    pub const MAX_TICK_HZ: u32 = 360;

    /// Screen dimensions in pixels (lanes + status panel)
    pub const SCREEN_WIDTH: i32 = 352;
    pub const SCREEN_HEIGHT: i32 = 160;
    /// Edge length of one tile in pixels
    pub const CELL_SIZE: i32 = 16;
    /// Atlas cell size for tile sprites
    pub const SPRITE_WIDTH: i32 = 16;
    pub const SPRITE_HEIGHT: i32 = 16;

    /// Wrap period of reference maps; lane strings longer than this are rejected
    pub const MAP_WIDTH_LIMIT: usize = 64;
    /// Tiles drawn per lane are `LANE_WIDTH + 1` (one extra for sub-cell scroll)
    pub const LANE_WIDTH: i32 = 18;
    /// Lanes start drawing one cell left of the screen edge
    pub const LANE_DRAW_ORIGIN: i32 = -1;

    /// Player bounds (tile coordinates, inclusive)
    pub const LEFT_BORDER: f32 = 0.0;
    pub const RIGHT_BORDER: f32 = 16.0;
    pub const TOP_BORDER: f32 = 0.0;
    pub const BOTTOM_BORDER: f32 = 9.0;

    /// Spawn cell
    pub const FROG_X_RESET: f32 = 8.0;
    pub const FROG_Y_RESET: f32 = 9.0;
    /// Default jump magnitudes (cells)
    pub const FROG_X_VELOCITY: f32 = 1.0;
    pub const FROG_Y_VELOCITY: f32 = 1.0;

    /// Logical jump clock period (32 Hz)
    pub const JUMP_CLOCK_SECS: f32 = 0.03125;
    /// Cosmetic 4-frame animation period
    pub const ANIM_CLOCK_SECS: f32 = 0.15;
    pub const ANIM_FRAME_LIMIT: i32 = 4;
    /// Sub-steps per jump
    pub const JUMP_FRAME_LIMIT: i32 = 6;
    /// Jump frames during which hazards are ignored
    pub const JUMP_FRAME_SAFE: i32 = 6;
    /// Resolution of the block-aware movement search
    pub const SAFE_MOVE_STEPS: u32 = 16;

    /// Cells of player carry per lane-velocity-second
    pub const PLATFORM_CARRY_SCALE: f32 = 1.0;

    /// Death animation
    pub const DEATH_FRAMES: u32 = 6;
    pub const DEATH_FRAME_SECS: f32 = 0.1;

    /// Status panel layout
    pub const STATUS_BAR_X: i32 = 272;
    pub const STATUS_BAR_WIDTH: i32 = 80;
    pub const STATUS_BAR_HEIGHT: i32 = 160;
    pub const LEVEL_TEXT_X: i32 = 321;
    pub const LEVEL_TEXT_Y: i32 = 80;
    pub const FONT_WIDTH: i32 = 8;
    pub const FONT_HEIGHT: i32 = 8;

    /// Pause menu layout
    pub const PAUSE_MENU_X: i32 = 120;
    pub const PAUSE_MENU_Y: i32 = 55;
    pub const PAUSE_OVERLAY_ALPHA: f32 = 170.0 / 255.0;
}

/// Canonical modulo: maps any index into `[0, period)`
///
/// Returns 0 for an empty period.
#[inline]
pub fn wrap_index(index: i64, period: usize) -> usize {
    if period == 0 {
        return 0;
    }
    index.rem_euclid(period as i64) as usize
}
