//! Platform abstraction layer
//!
//! Handles the pieces that touch the outside world:
//! - Input events (channel-fed keyboard with per-tick edges)
//! - Time/ticks (fixed-rate frame clock and the stop flag)

pub mod input;
pub mod time;

pub use input::{Button, Key, KeyEvent, Keyboard};
pub use time::{FrameClock, StopFlag};
