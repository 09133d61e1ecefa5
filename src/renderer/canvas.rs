//! Render and asset collaborators
//!
//! The engine never touches pixels directly. It asks an `AssetStore` for
//! opaque sprite handles by name and issues blits to a `Canvas`.

use std::collections::BTreeMap;

/// Opaque image handle issued by an `AssetStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpriteHandle(pub u32);

/// How drawn pixels combine with the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelMode {
    /// Overwrite
    #[default]
    Normal,
    /// Skip fully transparent pixels
    Mask,
    /// Blend by alpha and the blend factor
    Alpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Sprite lookup by name; animation frames are `<base><index>`, 1-based
pub trait AssetStore {
    fn sprite(&self, name: &str) -> Option<SpriteHandle>;
}

/// Draw target
pub trait Canvas {
    fn draw_sprite(&mut self, x: i32, y: i32, sprite: SpriteHandle);
    fn draw_partial_sprite(
        &mut self,
        x: i32,
        y: i32,
        sprite: SpriteHandle,
        src: (i32, i32),
        size: (i32, i32),
    );
    fn set_pixel_mode(&mut self, mode: PixelMode);
    fn set_blend_factor(&mut self, factor: f32);
    fn clear(&mut self, color: Rgba);
    fn present(&mut self);
}

/// In-memory name table
///
/// Handles are assigned in insertion order. Used by the headless binary and
/// by tests; a real frontend would back `AssetStore` with decoded images.
#[derive(Debug, Clone, Default)]
pub struct SpriteBook {
    handles: BTreeMap<String, SpriteHandle>,
    names: Vec<String>,
}

impl SpriteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut book = Self::new();
        for name in names {
            book.insert(name);
        }
        book
    }

    /// Register `name`, returning its handle (existing or new)
    pub fn insert(&mut self, name: impl Into<String>) -> SpriteHandle {
        let name = name.into();
        if let Some(handle) = self.handles.get(&name) {
            return *handle;
        }
        let handle = SpriteHandle(self.names.len() as u32);
        self.names.push(name.clone());
        self.handles.insert(name, handle);
        handle
    }

    /// Register `base1..=baseN`
    pub fn insert_animation(&mut self, base: &str, frames: u32) {
        for frame in 1..=frames {
            self.insert(format!("{base}{frame}"));
        }
    }

    pub fn name_of(&self, handle: SpriteHandle) -> Option<&str> {
        self.names.get(handle.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl AssetStore for SpriteBook {
    fn sprite(&self, name: &str) -> Option<SpriteHandle> {
        self.handles.get(name).copied()
    }
}

/// One recorded canvas call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Sprite {
        x: i32,
        y: i32,
        sprite: SpriteHandle,
    },
    PartialSprite {
        x: i32,
        y: i32,
        sprite: SpriteHandle,
        src: (i32, i32),
        size: (i32, i32),
    },
    PixelMode(PixelMode),
    BlendFactor(f32),
    Clear(Rgba),
}

/// Canvas that keeps the calls of the current and last presented frame
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    /// Calls since the last `present`
    pub calls: Vec<DrawCall>,
    /// Calls of the most recently presented frame
    pub last_frame: Vec<DrawCall>,
    pub frames: u64,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sprite handles blitted in the last presented frame, in order
    pub fn sprites(&self) -> impl Iterator<Item = SpriteHandle> + '_ {
        self.last_frame.iter().filter_map(|call| match call {
            DrawCall::Sprite { sprite, .. } | DrawCall::PartialSprite { sprite, .. } => Some(*sprite),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn draw_sprite(&mut self, x: i32, y: i32, sprite: SpriteHandle) {
        self.calls.push(DrawCall::Sprite { x, y, sprite });
    }

    fn draw_partial_sprite(
        &mut self,
        x: i32,
        y: i32,
        sprite: SpriteHandle,
        src: (i32, i32),
        size: (i32, i32),
    ) {
        self.calls.push(DrawCall::PartialSprite {
            x,
            y,
            sprite,
            src,
            size,
        });
    }

    fn set_pixel_mode(&mut self, mode: PixelMode) {
        self.calls.push(DrawCall::PixelMode(mode));
    }

    fn set_blend_factor(&mut self, factor: f32) {
        self.calls.push(DrawCall::BlendFactor(factor));
    }

    fn clear(&mut self, color: Rgba) {
        self.calls.push(DrawCall::Clear(color));
    }

    fn present(&mut self) {
        self.last_frame = std::mem::take(&mut self.calls);
        self.frames += 1;
    }
}
