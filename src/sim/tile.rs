//! Tile definitions and the per-level tile catalog
//!
//! Every character in a lane string keys a `TileDef` carrying its visuals
//! (sprite/background atlas cells), its semantics (blocking, lethal, platform
//! speed) and an optional summon overlay rule.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A summon target that names no tile in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("tile '{code}' summons undefined tile '{target}'")]
pub struct UnresolvedSummon {
    pub code: char,
    pub target: char,
}

/// All properties attached to a tile code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileDef {
    /// Key used in lane strings
    pub code: char,
    /// Asset names (opaque to the simulation)
    pub sprite_name: String,
    pub background_name: String,
    pub category: String,
    /// Atlas cell of the foreground sprite (col, row)
    pub sprite_origin: (i32, i32),
    /// Atlas cell of the background (col, row)
    pub background_origin: (i32, i32),
    /// When > 0 the sprite name gets the 4-frame animation index appended
    pub animation_id: i32,
    pub is_blocking: bool,
    pub is_lethal: bool,
    /// Non-zero: the tile carries the player horizontally
    pub platform_speed: f32,
    /// Catalog index of the overlay tile
    pub summon: Option<usize>,
    /// Seconds an overlay stays up
    pub duration: f32,
    /// Seconds an overlay is suppressed after it ends
    pub cooldown: f32,
    /// Percent per second of starting an overlay while idle
    pub chance: f32,
}

impl TileDef {
    pub fn new(code: char) -> Self {
        Self {
            code,
            sprite_name: String::new(),
            background_name: String::new(),
            category: String::new(),
            sprite_origin: (0, 0),
            background_origin: (0, 0),
            animation_id: 0,
            is_blocking: false,
            is_lethal: false,
            platform_speed: 0.0,
            summon: None,
            duration: 0.0,
            cooldown: 0.0,
            chance: 0.0,
        }
    }

    /// True if standing on this tile drags the player along
    #[inline]
    pub fn is_platform(&self) -> bool {
        self.platform_speed.abs() > 0.0
    }

    /// Whether the summon rule can ever fire
    #[inline]
    pub fn can_summon(&self) -> bool {
        self.summon.is_some() && self.chance > 0.0
    }

    /// Sprite name for the current animation frame
    pub fn frame_sprite_name(&self, anim_frame: i32) -> String {
        if self.animation_id > 0 {
            format!("{}{}", self.sprite_name, anim_frame)
        } else {
            self.sprite_name.clone()
        }
    }
}

/// A parsed tile whose summon target is still symbolic
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTile {
    pub def: TileDef,
    pub summon: Option<char>,
}

impl PendingTile {
    pub fn new(code: char) -> Self {
        Self {
            def: TileDef::new(code),
            summon: None,
        }
    }
}

/// Ordered mapping from tile code to `TileDef`
///
/// Tiles are kept sorted by code so lookups are a binary search and pattern
/// compilation is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileCatalog {
    tiles: Vec<TileDef>,
}

impl TileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog, resolving summon codes to catalog indices
    ///
    /// Later entries with a duplicate code replace earlier ones. Forward
    /// references are fine; a code that names no tile at all is an error.
    pub fn build(
        pending: impl IntoIterator<Item = PendingTile>,
    ) -> Result<Self, UnresolvedSummon> {
        let by_code: BTreeMap<char, PendingTile> =
            pending.into_iter().map(|p| (p.def.code, p)).collect();

        let index_of: BTreeMap<char, usize> = by_code
            .keys()
            .enumerate()
            .map(|(i, &code)| (code, i))
            .collect();

        let mut tiles = Vec::with_capacity(by_code.len());
        for (code, pending) in by_code {
            let mut def = pending.def;
            def.summon = match pending.summon {
                Some(target) => Some(
                    *index_of
                        .get(&target)
                        .ok_or(UnresolvedSummon { code, target })?,
                ),
                None => None,
            };
            tiles.push(def);
        }

        Ok(Self { tiles })
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileDef> {
        self.tiles.iter()
    }

    pub fn get(&self, code: char) -> Option<&TileDef> {
        self.tiles
            .binary_search_by_key(&code, |t| t.code)
            .ok()
            .map(|i| &self.tiles[i])
    }

    /// The overlay tile of `tile`, if it has one
    pub fn summon_of(&self, tile: &TileDef) -> Option<&TileDef> {
        tile.summon.and_then(|i| self.tiles.get(i))
    }

    /// Codes of all lethal tiles, in code order
    pub fn danger_pattern(&self) -> String {
        self.tiles
            .iter()
            .filter(|t| t.is_lethal)
            .map(|t| t.code)
            .collect()
    }

    /// Codes of all blocking tiles, in code order
    pub fn block_pattern(&self) -> String {
        self.tiles
            .iter()
            .filter(|t| t.is_blocking)
            .map(|t| t.code)
            .collect()
    }

    /// Serialize back into the tile section of a map file
    ///
    /// Only attributes that differ from a fresh `TileDef` are written.
    pub fn to_map_text(&self) -> String {
        let blank = TileDef::new(' ');
        let mut out = String::new();
        for tile in &self.tiles {
            let _ = write!(out, "$ {}", tile.code);
            if tile.sprite_name != blank.sprite_name {
                let _ = write!(out, " sprite={}", tile.sprite_name);
            }
            if tile.background_name != blank.background_name {
                let _ = write!(out, " background={}", tile.background_name);
            }
            if tile.category != blank.category {
                let _ = write!(out, " category={}", tile.category);
            }
            if tile.is_blocking {
                out.push_str(" block=true");
            }
            if tile.is_lethal {
                out.push_str(" danger=true");
            }
            if tile.platform_speed != 0.0 {
                let _ = write!(out, " platformspeed={}", tile.platform_speed);
            }
            if tile.sprite_origin != blank.sprite_origin {
                let _ = write!(
                    out,
                    " spriteX={} spriteY={}",
                    tile.sprite_origin.0, tile.sprite_origin.1
                );
            }
            if tile.background_origin != blank.background_origin {
                let _ = write!(
                    out,
                    " backgroundX={} backgroundY={}",
                    tile.background_origin.0, tile.background_origin.1
                );
            }
            if tile.animation_id != 0 {
                let _ = write!(out, " id={}", tile.animation_id);
            }
            if let Some(target) = self.summon_of(tile) {
                let _ = write!(out, " summon={}", target.code);
            }
            if tile.duration != 0.0 {
                let _ = write!(out, " duration={}s", tile.duration);
            }
            if tile.cooldown != 0.0 {
                let _ = write!(out, " cooldown={}s", tile.cooldown);
            }
            if tile.chance != 0.0 {
                let _ = write!(out, " chance={}%", tile.chance);
            }
            out.push('\n');
        }
        out
    }
}
