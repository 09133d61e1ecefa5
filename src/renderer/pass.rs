//! Frame render pass
//!
//! Lanes (via the sim lane pass, which also refreshes the Zone), then the
//! player or its death frame, the status panel and the pause overlay.

use std::collections::BTreeSet;

use super::canvas::{AssetStore, Canvas, PixelMode, Rgba, SpriteHandle};
use crate::consts::*;
use crate::sim::{DrawLayer, GamePhase, GameState, Map, PauseChoice, TileDraw, draw_lanes};

/// Every asset name a frame of `map` can ask for
pub fn sprite_names(map: &Map) -> BTreeSet<String> {
    fn animation(names: &mut BTreeSet<String>, base: &str, frames: i32) {
        for frame in 1..=frames {
            names.insert(format!("{base}{frame}"));
        }
    }

    let mut names = BTreeSet::new();

    for base in ["froggy", "froggy_left", "font", "black_alpha"] {
        names.insert(base.to_string());
    }
    animation(&mut names, "froggy_jump", JUMP_FRAME_LIMIT);
    animation(&mut names, "froggy_jump_left", JUMP_FRAME_LIMIT);
    animation(&mut names, "froggy_death", DEATH_FRAMES as i32);
    animation(&mut names, "score_bar", ANIM_FRAME_LIMIT);
    for choice in PauseChoice::ALL {
        names.insert(choice.sprite_name());
    }

    for tile in map.catalog.iter() {
        if !tile.background_name.is_empty() {
            names.insert(tile.background_name.clone());
        }
        if tile.sprite_name.is_empty() {
            continue;
        }
        if tile.animation_id > 0 {
            animation(&mut names, &tile.sprite_name, ANIM_FRAME_LIMIT);
        } else {
            names.insert(tile.sprite_name.clone());
        }
    }
    names
}

/// Draws frames against an asset store
///
/// Missing assets draw nothing and are logged once per name.
#[derive(Debug)]
pub struct Renderer<A: AssetStore> {
    assets: A,
    missing: BTreeSet<String>,
}

impl<A: AssetStore> Renderer<A> {
    pub fn new(assets: A) -> Self {
        Self {
            assets,
            missing: BTreeSet::new(),
        }
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    /// Names that failed to resolve so far
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.missing.iter().map(String::as_str)
    }

    fn lookup(&mut self, name: &str) -> Option<SpriteHandle> {
        let handle = self.assets.sprite(name);
        if handle.is_none() && self.missing.insert(name.to_string()) {
            log::warn!("Missing sprite asset {name:?}");
        }
        handle
    }

    /// Draw and present one frame
    ///
    /// Runs the lane pass, so this also sets `t_last_drawn` and refills the
    /// Zone the next tick collides against.
    pub fn render_frame(&mut self, state: &mut GameState, canvas: &mut impl Canvas) {
        canvas.clear(Rgba::BLACK);
        draw_lanes(state, |draw| self.draw_tile(canvas, &draw));
        canvas.set_pixel_mode(PixelMode::Normal);

        self.draw_player(state, canvas);
        self.draw_status_bar(state, canvas);
        if state.phase == GamePhase::Paused {
            self.draw_pause_menu(state.pause_choice, canvas);
        }
        canvas.present();
    }

    fn draw_tile(&mut self, canvas: &mut impl Canvas, draw: &TileDraw) {
        let Some(sprite) = self.lookup(&draw.name) else {
            return;
        };
        let mode = match draw.layer {
            DrawLayer::Background => PixelMode::Normal,
            DrawLayer::Sprite | DrawLayer::Summon => PixelMode::Mask,
        };
        canvas.set_pixel_mode(mode);
        canvas.draw_partial_sprite(draw.x, draw.y, sprite, draw.src, (SPRITE_WIDTH, SPRITE_HEIGHT));
    }

    fn draw_player(&mut self, state: &GameState, canvas: &mut impl Canvas) {
        let name = match state.phase {
            GamePhase::Dying { frame, .. } => format!("froggy_death{}", frame.min(DEATH_FRAMES)),
            _ => state.player.sprite_name(),
        };
        let Some(sprite) = self.lookup(&name) else {
            return;
        };
        let (x, y) = state.player.screen_pos();
        canvas.set_pixel_mode(PixelMode::Mask);
        canvas.draw_sprite(x, y, sprite);
        canvas.set_pixel_mode(PixelMode::Normal);
    }

    fn draw_status_bar(&mut self, state: &GameState, canvas: &mut impl Canvas) {
        let bar = format!("score_bar{}", state.player.anim_frame);
        if let Some(sprite) = self.lookup(&bar) {
            canvas.draw_partial_sprite(
                STATUS_BAR_X,
                0,
                sprite,
                (0, 0),
                (STATUS_BAR_WIDTH, STATUS_BAR_HEIGHT),
            );
        }
        canvas.set_pixel_mode(PixelMode::Mask);
        self.draw_text(canvas, &state.level.to_string(), LEVEL_TEXT_X, LEVEL_TEXT_Y);
        canvas.set_pixel_mode(PixelMode::Normal);
    }

    /// Text from the `font` sheet: 16 glyphs per row starting at ' '
    fn draw_text(&mut self, canvas: &mut impl Canvas, text: &str, x: i32, y: i32) {
        let Some(font) = self.lookup("font") else {
            return;
        };
        for (i, c) in text.chars().enumerate() {
            let glyph = (c as i32 - ' ' as i32).max(0);
            let src = ((glyph % 16) * FONT_WIDTH, (glyph / 16) * FONT_HEIGHT);
            canvas.draw_partial_sprite(x + i as i32 * FONT_WIDTH, y, font, src, (FONT_WIDTH, FONT_HEIGHT));
        }
    }

    fn draw_pause_menu(&mut self, choice: PauseChoice, canvas: &mut impl Canvas) {
        if let Some(overlay) = self.lookup("black_alpha") {
            canvas.set_pixel_mode(PixelMode::Alpha);
            canvas.set_blend_factor(PAUSE_OVERLAY_ALPHA);
            canvas.draw_sprite(0, 0, overlay);
            canvas.set_blend_factor(1.0);
        }
        if let Some(menu) = self.lookup(&choice.sprite_name()) {
            canvas.set_pixel_mode(PixelMode::Mask);
            canvas.draw_sprite(PAUSE_MENU_X, PAUSE_MENU_Y, menu);
        }
        canvas.set_pixel_mode(PixelMode::Normal);
    }
}
