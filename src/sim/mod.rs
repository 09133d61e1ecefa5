//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Ordered containers wherever iteration affects output
//! - No rendering or platform dependencies

pub mod collision;
pub mod lane;
pub mod player;
pub mod state;
pub mod summon;
pub mod tick;
pub mod tile;
pub mod zone;

pub use collision::Collision;
pub use lane::{Lane, Map, Scroll};
pub use player::{Animation, Direction, MoveIntent, Player};
pub use state::{EngineError, GameEvent, GamePhase, GameState, PauseChoice, RngState};
pub use summon::{SummonOracle, SummonPhase};
pub use tick::{DrawLayer, TickInput, TileDraw, draw_lanes, rasterize, tick};
pub use tile::{PendingTile, TileCatalog, TileDef, UnresolvedSummon};
pub use zone::{Zone, ZoneError};
