//! Lanes and the per-level map
//!
//! A lane is a looping tile string scrolling at a fixed velocity (cells/sec).
//! Positive velocity scrolls the content to the left on screen.

use serde::{Deserialize, Serialize};

use super::tile::{TileCatalog, TileDef};
use crate::consts::CELL_SIZE;
use crate::wrap_index;

/// Scroll of a lane at one instant, split into whole cells and pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scroll {
    /// `floor(t * velocity)`
    pub base: i64,
    /// Sub-cell remainder in pixels, `[0, CELL_SIZE)`
    pub cell_offset: i32,
}

/// One horizontal row of tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    /// Cells per second
    pub velocity: f32,
    pub tiles: Vec<char>,
}

impl Lane {
    pub fn new(tiles: &str, velocity: f32) -> Self {
        Self {
            velocity,
            tiles: tiles.chars().collect(),
        }
    }

    /// Wrap period of this lane
    #[inline]
    pub fn width(&self) -> usize {
        self.tiles.len()
    }

    pub fn scroll(&self, time: f32) -> Scroll {
        let shift = time * self.velocity;
        let base = shift.floor();
        let cell_offset = (((shift - base) * CELL_SIZE as f32).floor() as i32).clamp(0, CELL_SIZE - 1);
        Scroll {
            base: base as i64,
            cell_offset,
        }
    }

    /// Lane column `column` wrapped into the tile string
    #[inline]
    pub fn tile_index(&self, column: i64, scroll: Scroll) -> usize {
        wrap_index(column + scroll.base, self.width())
    }

    /// Effective tile at `column` at time `time`
    ///
    /// `tiles[((c + floor(t*v)) mod W + W) mod W]`
    pub fn tile_at(&self, column: i64, time: f32) -> Option<char> {
        if self.tiles.is_empty() {
            return None;
        }
        let scroll = self.scroll(time);
        Some(self.tiles[self.tile_index(column, scroll)])
    }

    pub fn as_string(&self) -> String {
        self.tiles.iter().collect()
    }
}

/// A level: lanes top-to-bottom plus the tile catalog and compiled patterns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub lanes: Vec<Lane>,
    pub catalog: TileCatalog,
    danger_pattern: String,
    block_pattern: String,
}

impl Map {
    pub fn new(lanes: Vec<Lane>, catalog: TileCatalog) -> Self {
        let danger_pattern = catalog.danger_pattern();
        let block_pattern = catalog.block_pattern();
        Self {
            lanes,
            catalog,
            danger_pattern,
            block_pattern,
        }
    }

    /// Lane under a fractional row, rounded to nearest
    pub fn lane_round(&self, y: f32) -> Option<&Lane> {
        let row = y.round();
        if row < 0.0 {
            return None;
        }
        self.lanes.get(row as usize)
    }

    pub fn tile(&self, code: char) -> Option<&TileDef> {
        self.catalog.get(code)
    }

    /// Codes whose tiles are lethal
    pub fn danger_pattern(&self) -> &str {
        &self.danger_pattern
    }

    /// Codes whose tiles block movement
    pub fn block_pattern(&self) -> &str {
        &self.block_pattern
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}
