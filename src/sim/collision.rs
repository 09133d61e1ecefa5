//! Collision resolver
//!
//! Answers the per-tick questions of the loop (killed? on a platform? how
//! fast?) from the player, the current lane and the Zone. The Zone holds the
//! lanes as last drawn, so everything here is evaluated at `t_last_drawn`.

use super::lane::Map;
use super::player::Player;
use super::tile::TileDef;
use super::zone::Zone;
use crate::consts::{CELL_SIZE, LANE_DRAW_ORIGIN};

/// Horizontal offset of the side probes, in cells
pub const PROBE_OFFSET: f32 = 0.5;

/// Read-only view over the state collision queries need
#[derive(Debug, Clone, Copy)]
pub struct Collision<'a> {
    map: &'a Map,
    zone: &'a Zone,
    t_last_drawn: f32,
}

impl<'a> Collision<'a> {
    pub fn new(map: &'a Map, zone: &'a Zone, t_last_drawn: f32) -> Self {
        Self {
            map,
            zone,
            t_last_drawn,
        }
    }

    /// Tile visible under tile coordinates `(x, y)` as of the last draw
    ///
    /// Uses the same column mapping as the lane raster: lanes start drawing at
    /// `LANE_DRAW_ORIGIN` and are shifted left by the sub-cell scroll offset.
    pub fn hitbox(&self, x: f32, y: f32) -> Option<&'a TileDef> {
        let lane = self.map.lane_round(y)?;
        if lane.tiles.is_empty() {
            return None;
        }
        let scroll = lane.scroll(self.t_last_drawn);
        let column = (x + scroll.cell_offset as f32 / CELL_SIZE as f32).floor() as i64
            - LANE_DRAW_ORIGIN as i64;
        let code = lane.tiles[lane.tile_index(column, scroll)];
        self.map.tile(code)
    }

    fn side_probes(&self, player: &Player) -> [Option<&'a TileDef>; 2] {
        let pos = player.logic_pos;
        [
            self.hitbox(pos.x - PROBE_OFFSET, pos.y),
            self.hitbox(pos.x + PROBE_OFFSET, pos.y),
        ]
    }

    /// Danger under any inset corner of the logic cell, outside the safe
    /// window of a jump
    pub fn is_killed(&self, player: &Player) -> bool {
        if player.is_collision_safe() {
            return false;
        }
        let pos = player.logic_pos;
        self.zone.is_danger_hit(pos.x, pos.y, CELL_SIZE)
    }

    /// Center, left or right probe stands on a platform tile
    pub fn is_on_platform(&self, player: &Player) -> bool {
        let pos = player.logic_pos;
        let [left, right] = self.side_probes(player);
        [self.hitbox(pos.x, pos.y), left, right]
            .into_iter()
            .flatten()
            .any(TileDef::is_platform)
    }

    /// Cells the player's lane scrolls during `dt`
    pub fn platform_velocity(&self, player: &Player, dt: f32) -> f32 {
        self.map
            .lane_round(player.logic_pos.y)
            .map_or(0.0, |lane| lane.velocity * dt)
    }

    /// Which sprite got the player, left probe first
    pub fn death_message(&self, player: &Player) -> String {
        self.side_probes(player)
            .into_iter()
            .flatten()
            .find(|tile| !tile.sprite_name.is_empty())
            .map_or_else(
                || "force killed".to_string(),
                |tile| format!("killed by {}", tile.sprite_name),
            )
    }
}
