//! Fixed timestep simulation tick
//!
//! `tick` advances the player, platform carry, win and death checks and the
//! pause menu. `draw_lanes` is the lane pass: it emits tile draws in
//! background, sprite, summon order and rebuilds the Zone from the same
//! layout, so the next tick collides against exactly what was shown.

use std::collections::BTreeMap;

use glam::Vec2;

use super::collision::Collision;
use super::player::MoveIntent;
use super::state::{GameEvent, GamePhase, GameState, PauseChoice};
use crate::consts::*;

/// Released-key edges for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub enter: bool,
    pub escape: bool,
}

impl TickInput {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    match state.phase {
        GamePhase::Stopped => return,
        GamePhase::Paused => {
            tick_paused(state, input);
            return;
        }
        GamePhase::Dying { frame, timer } => {
            tick_dying(state, frame, timer + dt);
            return;
        }
        GamePhase::Playing => {}
    }

    if input.escape {
        state.phase = GamePhase::Paused;
        state.pause_choice = PauseChoice::Resume;
        state.events.push(GameEvent::Paused);
        return;
    }

    state.t_tick += dt;
    state.player.update_frame(state.t_tick);
    let intent = MoveIntent::from_keys(input.left, input.right, input.up, input.down);
    state.player.step(intent, &state.zone);

    let collision = Collision::new(&state.map, &state.zone, state.t_last_drawn);
    if collision.is_on_platform(&state.player) {
        let drift = collision.platform_velocity(&state.player, dt) * PLATFORM_CARRY_SCALE;
        state
            .player
            .carry(Vec2::new(-drift, 0.0), &state.zone, SAFE_MOVE_STEPS);
        // Try the way the lane scrolls first
        let dir = if drift > 0.0 { -1.0 } else { 1.0 };
        state
            .player
            .platform_detector(&state.zone, dir, |p| collision.is_killed(p));
    }

    if state.player.wins(input.up) {
        let level = state.level;
        log::info!("Level {level} complete");
        state.events.push(GameEvent::LevelCompleted { level });
        if let Err(err) = state.next_level() {
            log::warn!("Failed to load the next level: {err}");
            state.player.reset();
        }
        return;
    }

    let out_of_bounds = state.player.is_out_of_bounds();
    if out_of_bounds || collision.is_killed(&state.player) {
        let message = if out_of_bounds {
            "carried out of bounds".to_string()
        } else {
            collision.death_message(&state.player)
        };
        log::info!("Player has been {message}");
        state.events.push(GameEvent::PlayerDied { message });
        state.phase = GamePhase::Dying {
            frame: 1,
            timer: 0.0,
        };
    }
}

fn tick_dying(state: &mut GameState, mut frame: u32, mut timer: f32) {
    while timer >= DEATH_FRAME_SECS {
        timer -= DEATH_FRAME_SECS;
        frame += 1;
    }
    if frame > DEATH_FRAMES {
        state.player.reset();
        state.phase = GamePhase::Playing;
    } else {
        state.phase = GamePhase::Dying { frame, timer };
    }
}

fn tick_paused(state: &mut GameState, input: &TickInput) {
    if input.escape {
        resume(state);
    } else if input.up {
        state.pause_choice = state.pause_choice.prev();
    } else if input.down {
        state.pause_choice = state.pause_choice.next();
    } else if input.enter {
        match state.pause_choice {
            PauseChoice::Exit => state.stop(),
            PauseChoice::Resume => resume(state),
            PauseChoice::Save => state.events.push(GameEvent::SaveRequested),
        }
    }
}

fn resume(state: &mut GameState) {
    state.phase = GamePhase::Playing;
    state.events.push(GameEvent::Resumed);
}

/// Layer a tile draw belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawLayer {
    Background,
    Sprite,
    Summon,
}

/// One tile blit produced by the lane pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileDraw {
    pub layer: DrawLayer,
    /// Screen position of the top-left corner
    pub x: i32,
    pub y: i32,
    /// Asset name, animation frame already appended
    pub name: String,
    /// Pixel origin inside the sprite atlas
    pub src: (i32, i32),
}

fn atlas_px(origin: (i32, i32)) -> (i32, i32) {
    (origin.0 * SPRITE_WIDTH, origin.1 * SPRITE_HEIGHT)
}

/// Lane pass over every lane, top to bottom
///
/// Sets `t_last_drawn`, queries the summon oracle once per summoning cell and
/// refills the Zone danger/block rasters with assignment semantics.
pub fn draw_lanes(state: &mut GameState, mut sink: impl FnMut(TileDraw)) {
    let GameState {
        map,
        zone,
        summons,
        player,
        t_tick,
        t_last_drawn,
        fps,
        ..
    } = state;

    *t_last_drawn = *t_tick;
    let now = *t_tick;
    let anim_frame = player.anim_frame;

    for (row, lane) in map.lanes.iter().enumerate() {
        if lane.tiles.is_empty() {
            continue;
        }
        let scroll = lane.scroll(now);
        let y = row as i32 * CELL_SIZE;
        let cell_x = |n: i32| (LANE_DRAW_ORIGIN + n) * CELL_SIZE;
        let slot = |n: i32| {
            let index = lane.tile_index(n as i64, scroll);
            (index, lane.tiles[index])
        };

        // Backgrounds stay on the cell grid
        for n in 0..=LANE_WIDTH {
            let Some(tile) = map.tile(slot(n).1) else { continue };
            if tile.background_name.is_empty() {
                continue;
            }
            sink(TileDraw {
                layer: DrawLayer::Background,
                x: cell_x(n),
                y,
                name: tile.background_name.clone(),
                src: atlas_px(tile.background_origin),
            });
        }

        for n in 0..=LANE_WIDTH {
            let Some(tile) = map.tile(slot(n).1) else { continue };
            if tile.sprite_name.is_empty() {
                continue;
            }
            sink(TileDraw {
                layer: DrawLayer::Sprite,
                x: cell_x(n) - scroll.cell_offset,
                y,
                name: tile.frame_sprite_name(anim_frame),
                src: atlas_px(tile.sprite_origin),
            });
        }

        // Short lanes repeat cells across the drawn columns; one trial per cell
        let mut phases = BTreeMap::new();
        for n in 0..=LANE_WIDTH {
            let (index, code) = slot(n);
            let Some(tile) = map.tile(code) else { continue };
            if !tile.can_summon() {
                continue;
            }
            let phase = *phases
                .entry(index)
                .or_insert_with(|| summons.query(tile, index, row, now, *fps));
            if !phase.is_on() {
                continue;
            }
            let Some(overlay) = map.catalog.summon_of(tile) else { continue };
            if overlay.sprite_name.is_empty() {
                continue;
            }
            sink(TileDraw {
                layer: DrawLayer::Summon,
                x: cell_x(n) - scroll.cell_offset,
                y,
                name: overlay.frame_sprite_name(anim_frame),
                src: atlas_px(tile.sprite_origin),
            });
        }

        for n in 0..=LANE_WIDTH {
            let code = slot(n).1;
            let x0 = cell_x(n) - scroll.cell_offset;
            zone.fill_danger(x0, y, x0 + CELL_SIZE, y + CELL_SIZE, code, map.danger_pattern());
            zone.fill_block(x0, y, x0 + CELL_SIZE, y + CELL_SIZE, code, map.block_pattern());
        }
    }
}

/// Lane pass without drawing, for headless runs
pub fn rasterize(state: &mut GameState) {
    draw_lanes(state, |_| {});
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::MemoryLevels;

    const DT: f32 = 1.0 / DEFAULT_TICK_HZ as f32;

    const MAP: &str = "\
GGGGGGGGGGGGGGGGGG 0
GGGGGGGGGGGGGGGGGG 0
GGGGGGGGGGGGGGGGGG 0
GGGGGGGGGGGGGGGGGG 0
WWWWWWWWWWWWWWWWWW 0
GGGGGGGGGGGGGGGGGG 0
GGGGGGGGGGGGGGGGGG 0
GGGGGGGGGGGGGGGGGG 0
GGGGGGGGGGGGGGGGGG 0
GGGGGGGGGTGGGGGGGG 0
# tiles
$ G background=grass
$ W background=water danger=true
$ T sprite=tree block=true
";

    fn new_state() -> GameState {
        GameState::new(Box::new(MemoryLevels::new([MAP, MAP])), 12345).unwrap()
    }

    fn press(f: impl FnOnce(&mut TickInput)) -> TickInput {
        let mut input = TickInput::default();
        f(&mut input);
        input
    }

    /// One tick followed by the lane pass, like the app loop
    fn step(state: &mut GameState, input: &TickInput) {
        tick(state, input, DT);
        rasterize(state);
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut state = new_state();
        step(&mut state, &TickInput::default());
        assert!((state.t_tick - DT).abs() < 1e-6);
        assert_eq!(state.t_last_drawn, state.t_tick);
    }

    #[test]
    fn test_lane_pass_rasterizes() {
        let mut state = new_state();
        rasterize(&mut state);
        // Row 4 is water all the way across
        assert!(state.zone.danger_at(5, 4 * CELL_SIZE + 5));
        assert!(!state.zone.danger_at(5, 3 * CELL_SIZE + 5));
        // Lane column 9 shows at screen column 8
        assert!(state.zone.block_at(8 * CELL_SIZE + 3, 9 * CELL_SIZE + 3));
    }

    #[test]
    fn test_lane_pass_layer_order() {
        let mut state = new_state();
        let mut layers = Vec::new();
        draw_lanes(&mut state, |draw| layers.push((draw.y, draw.layer)));
        let last_row = layers.iter().filter(|(y, _)| *y == 9 * CELL_SIZE);
        let order: Vec<DrawLayer> = last_row.map(|(_, l)| *l).collect();
        // Eighteen grass backgrounds, then the tree sprite
        assert_eq!(order.len(), LANE_WIDTH as usize + 1);
        assert!(order[..order.len() - 1].iter().all(|l| *l == DrawLayer::Background));
        assert_eq!(order.last(), Some(&DrawLayer::Sprite));
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut state = new_state();
        step(&mut state, &TickInput::default());
        let t = state.t_tick;
        step(&mut state, &press(|i| i.escape = true));
        assert_eq!(state.phase, GamePhase::Paused);
        for _ in 0..10 {
            step(&mut state, &TickInput::default());
        }
        assert_eq!(state.t_tick, t);
        step(&mut state, &press(|i| i.escape = true));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_pause_menu_save_and_exit() {
        let mut state = new_state();
        state.drain_events();
        step(&mut state, &press(|i| i.escape = true));
        step(&mut state, &press(|i| i.down = true));
        assert_eq!(state.pause_choice, PauseChoice::Save);
        step(&mut state, &press(|i| i.enter = true));
        assert_eq!(state.phase, GamePhase::Paused);
        step(&mut state, &press(|i| i.down = true));
        step(&mut state, &press(|i| i.enter = true));
        assert!(state.is_stopped());
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Paused, GameEvent::SaveRequested, GameEvent::ExitRequested]
        );
    }

    #[test]
    fn test_jump_into_water_dies_and_respawns() {
        let mut state = new_state();
        state.player.place(Vec2::new(8.0, 5.0), Vec2::new(8.0, 5.0));
        step(&mut state, &TickInput::default());
        step(&mut state, &press(|i| i.up = true));
        assert!(state.player.is_jumping());

        let mut died = false;
        for _ in 0..60 {
            step(&mut state, &TickInput::default());
            if matches!(state.phase, GamePhase::Dying { .. }) {
                died = true;
                break;
            }
            assert!(state.player.is_collision_safe() || state.player.is_idle());
        }
        assert!(died);
        assert_eq!(state.player.logic_pos, Vec2::new(8.0, 4.0));

        let t = state.t_tick;
        for _ in 0..((DEATH_FRAMES as f32 * DEATH_FRAME_SECS / DT) as usize + 2) {
            step(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.logic_pos, Vec2::new(8.0, 9.0));
        assert!(state.t_tick - t < 2.0 * DT + 1e-6);
    }

    #[test]
    fn test_win_loads_next_level() {
        let mut state = new_state();
        state.player.place(Vec2::new(8.0, 0.0), Vec2::new(8.0, 0.0));
        step(&mut state, &TickInput::default());
        step(&mut state, &press(|i| i.up = true));
        assert_eq!(state.level, 1);
        assert_eq!(state.player.logic_pos, Vec2::new(8.0, 9.0));
        assert!(state.events.contains(&GameEvent::LevelCompleted { level: 0 }));
    }

    #[test]
    fn test_determinism() {
        let mut a = new_state();
        let mut b = new_state();
        let inputs = [
            TickInput::default(),
            press(|i| i.up = true),
            TickInput::default(),
            press(|i| i.left = true),
        ];
        for _ in 0..20 {
            for input in &inputs {
                step(&mut a, input);
                step(&mut b, input);
                assert_eq!(a.player, b.player);
                assert_eq!(a.zone, b.zone);
            }
        }
    }
}
