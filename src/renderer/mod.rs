//! Rendering module
//!
//! Collaborator traits for drawing and asset lookup, plus the frame pass that
//! turns a `GameState` into canvas calls.

pub mod canvas;
pub mod pass;

pub use canvas::{AssetStore, Canvas, DrawCall, PixelMode, RecordingCanvas, Rgba, SpriteBook, SpriteHandle};
pub use pass::{Renderer, sprite_names};
