//! End-to-end gameplay scenarios
//!
//! Each test drives `tick` plus the frame pass the way the app loop does, at
//! 64 Hz so tick times are exact in f32.

use glam::Vec2;

use lane_hopper::consts::*;
use lane_hopper::level::{LevelDir, LevelSource, MemoryLevels};
use lane_hopper::renderer::{RecordingCanvas, Renderer, SpriteBook, sprite_names};
use lane_hopper::sim::{
    Collision, DrawLayer, GameEvent, GamePhase, GameState, Lane, SummonOracle, SummonPhase, TickInput, TileDef,
    draw_lanes, tick,
};

const HZ: f32 = 64.0;
const DT: f32 = 1.0 / HZ;

const TILES: &str = "\
# tiles
$ G background=grass
$ W background=water sprite=water danger=true
$ L background=water sprite=lily platformspeed=1
$ T sprite=signal summon=X duration=500ms cooldown=1s chance=100%
$ X sprite=train danger=true
";

/// Ten lanes of grass with the given rows replaced
fn map_text(rows: &[(usize, &str, f32)]) -> String {
    let mut lanes: Vec<String> = (0..10).map(|_| "G".repeat(64) + " 0").collect();
    for (row, tiles, velocity) in rows {
        lanes[*row] = format!("{tiles} {velocity}");
    }
    format!("{}\n{TILES}", lanes.join("\n"))
}

struct Harness {
    state: GameState,
    renderer: Renderer<SpriteBook>,
    canvas: RecordingCanvas,
}

impl Harness {
    fn new(maps: Vec<String>) -> Self {
        let state = GameState::new(Box::new(MemoryLevels::new(maps)), 2024).unwrap();
        let renderer = Renderer::new(SpriteBook::from_names(sprite_names(&state.map)));
        Self {
            state,
            renderer,
            canvas: RecordingCanvas::new(),
        }
    }

    fn step(&mut self, input: TickInput) {
        tick(&mut self.state, &input, DT);
        self.renderer.render_frame(&mut self.state, &mut self.canvas);
    }

    fn idle(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.step(TickInput::default());
        }
    }

    fn place(&mut self, x: f32, y: f32) {
        self.state.player.place(Vec2::new(x, y), Vec2::new(x, y));
    }

    fn killed(&self) -> bool {
        Collision::new(&self.state.map, &self.state.zone, self.state.t_last_drawn).is_killed(&self.state.player)
    }

    fn frame_names(&self) -> Vec<String> {
        self.canvas
            .sprites()
            .filter_map(|h| self.renderer.assets().name_of(h))
            .map(str::to_string)
            .collect()
    }
}

fn right() -> TickInput {
    TickInput {
        right: true,
        ..TickInput::default()
    }
}

fn up() -> TickInput {
    TickInput {
        up: true,
        ..TickInput::default()
    }
}

#[test]
fn test_step_onto_lethal_tile() {
    let mut h = Harness::new(vec![map_text(&[(9, "WGWGWGWGWGWGWGWG", 0.0)])]);
    h.idle(31);
    assert_eq!(h.state.player.logic_pos, Vec2::new(8.0, 9.0));
    assert!(!h.killed());

    // Released at t = 0.5
    h.step(right());
    assert_eq!(h.state.t_tick, 0.5);
    assert!(h.state.player.is_jumping());

    while h.state.phase == GamePhase::Playing {
        h.step(TickInput::default());
        assert!(h.state.t_tick <= 0.6875);
    }
    assert_eq!(h.state.t_tick, 0.6875);
    assert_eq!(h.state.player.logic_pos, Vec2::new(9.0, 9.0));
    assert!(h.killed());
    assert!(
        h.state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::PlayerDied { .. }))
    );

    let mut death_frames = Vec::new();
    while matches!(h.state.phase, GamePhase::Dying { .. }) {
        death_frames.extend(h.frame_names().into_iter().filter(|n| n.starts_with("froggy_death")));
        assert_eq!(h.state.t_tick, 0.6875);
        h.step(TickInput::default());
    }
    death_frames.dedup();
    let expected: Vec<String> = (1..=DEATH_FRAMES).map(|i| format!("froggy_death{i}")).collect();
    assert_eq!(death_frames, expected);
    assert_eq!(h.state.player.logic_pos, Vec2::new(8.0, 9.0));
    assert_eq!(h.state.phase, GamePhase::Playing);
}

#[test]
fn test_platform_carry_without_input() {
    let mut h = Harness::new(vec![map_text(&[(5, "LLLLLLLLLLLLLLLL", 1.0)])]);
    h.place(8.0, 5.0);
    let mut expected = 8.0;
    for _ in 0..HZ as usize {
        h.step(TickInput::default());
        expected -= DT;
        assert!((h.state.player.anim_pos.x - expected).abs() < 1e-4);
        assert!(h.state.player.is_idle());
        assert_eq!(h.state.phase, GamePhase::Playing);
    }
    assert!((h.state.player.anim_pos.x - 7.0).abs() < 1e-4);
    assert_eq!(h.state.player.logic_pos, h.state.player.anim_pos);
    assert!(!h.killed());
}

#[test]
fn test_jump_over_hazard_row() {
    let mut h = Harness::new(vec![map_text(&[(4, &"W".repeat(64), 0.0)])]);
    h.place(8.0, 5.0);
    h.step(up());
    assert!(h.state.player.is_jumping());

    let mut safe_frames = 0;
    let mut mid_air = false;
    while h.state.player.is_jumping() {
        assert!(h.state.player.is_collision_safe());
        assert!(!h.killed());
        let y = h.state.player.anim_pos.y;
        mid_air |= y < 4.6 && y > 4.0;
        safe_frames += 1;
        h.step(TickInput::default());
    }
    assert!(mid_air);
    assert!(safe_frames >= JUMP_FRAME_LIMIT as usize);
    assert_eq!(h.state.player.logic_pos, Vec2::new(8.0, 4.0));
    assert!(matches!(h.state.phase, GamePhase::Dying { frame: 1, .. }));
}

#[test]
fn test_summon_fires_deterministically() {
    let mut tile = TileDef::new('T');
    tile.summon = Some(0);
    tile.duration = 0.5;
    tile.cooldown = 1.0;
    tile.chance = 100.0;

    let mut oracle = SummonOracle::new(7);
    // fps 1 turns a 100% chance into a certain trial
    let first = oracle.query(&tile, 3, 2, 0.0, 1.0);
    assert!(!first.is_on());
    let last = oracle.last_activation(3, 2).unwrap();
    assert!((0.5..=2.0).contains(&last));

    let near = |t: f32, edge: f32| (t - edge).abs() < 1e-3;
    let mut t = 0.0;
    let retrigger = loop {
        t += DT;
        let phase = oracle.query(&tile, 3, 2, t, 1.0);
        if near(t, last + 1.5) && phase == SummonPhase::Started {
            break phase;
        }
        if near(t, last) || near(t, last + 0.5) || near(t, last + 1.5) {
            continue;
        }
        if t < last {
            assert_eq!(phase, SummonPhase::Idle, "t={t}");
        } else if t < last + 0.5 {
            assert_eq!(phase, SummonPhase::Active, "t={t}");
        } else if t < last + 1.5 {
            assert_eq!(phase, SummonPhase::Cooldown, "t={t}");
        } else {
            break phase;
        }
    };
    assert_eq!(retrigger, SummonPhase::Started);
    assert!(t - (last + 1.5) <= DT + 1e-4);
    assert_eq!(oracle.last_activation(3, 2), Some(t));
}

#[test]
fn test_summon_overlay_drawn() {
    let mut h = Harness::new(vec![map_text(&[(3, &"T".repeat(64), 0.0)])]);
    h.state.fps = 1.0;
    let mut overlays = 0;
    for _ in 0..(3.0 * HZ) as usize {
        tick(&mut h.state, &TickInput::default(), DT);
        draw_lanes(&mut h.state, |draw| {
            if draw.layer == DrawLayer::Summon {
                assert_eq!(draw.name, "train");
                assert_eq!(draw.y, 3 * CELL_SIZE);
                overlays += 1;
            }
        });
    }
    assert!(overlays > 0);
    // Overlays are visual only
    assert!(!h.state.zone.danger_at(100, 3 * CELL_SIZE + 8));
}

#[test]
fn test_short_lane_summons_once_per_cell() {
    let mut lanes: Vec<String> = (0..10).map(|_| "G".repeat(64) + " 0").collect();
    lanes[3] = "T 0".to_string();
    let text = format!(
        "{}\n# tiles\n$ G background=grass\n$ T sprite=signal summon=X chance=10%\n$ X sprite=train danger=true\n",
        lanes.join("\n")
    );
    let mut h = Harness::new(vec![text]);
    assert_eq!(h.state.map.lanes[3].width(), 1);

    const FRAMES: usize = 4000;
    const FPS: f32 = 10.0;
    h.state.fps = FPS;
    let mut starts = 0usize;
    let mut previous = None;
    for _ in 0..FRAMES {
        tick(&mut h.state, &TickInput::default(), DT);
        let mut overlays = 0;
        draw_lanes(&mut h.state, |draw| {
            if draw.layer == DrawLayer::Summon {
                overlays += 1;
            }
        });
        // Every drawn column of the lane shows the same cell
        assert!(overlays == 0 || overlays == LANE_WIDTH as usize + 1);
        let last = h.state.summons.last_activation(0, 3);
        if previous.is_some() && last != previous {
            starts += 1;
        }
        previous = last;
    }

    let p = (10.0 / 100.0 / FPS) as f64;
    let mean = FRAMES as f64 * p;
    let sigma = (FRAMES as f64 * p * (1.0 - p)).sqrt();
    assert!((starts as f64 - mean).abs() <= 4.0 * sigma, "starts={starts} mean={mean}");
}

#[test]
fn test_wrap_negative_scroll() {
    let lane = Lane::new("ABCDEFGHIJKLMNOP", -1.0);
    assert_eq!(lane.tile_at(0, 2.0), Some('O'));
    assert_eq!(lane.tile_at(-3, 2.0), Some('L'));
    assert_eq!(lane.tile_at(2, 2.0), Some('A'));
}

#[test]
fn test_level_advance_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let maps = dir.path().join("maps");
    std::fs::create_dir_all(&maps).unwrap();
    std::fs::write(
        maps.join("mapNames.txt"),
        "0. One \"first\"\n1. Two \"second\"\n2. Three \"third\"\n",
    )
    .unwrap();
    for level in 0..3 {
        let text = map_text(&[(4, &"W".repeat(64 - level), 0.0)]);
        std::fs::write(maps.join(format!("map{level}.txt")), text).unwrap();
    }

    let levels = LevelDir::open(dir.path()).unwrap();
    assert_eq!(levels.level_count(), 3);
    let state = GameState::new(Box::new(levels), 1).unwrap();
    let renderer = Renderer::new(SpriteBook::from_names(sprite_names(&state.map)));
    let mut h = Harness {
        state,
        renderer,
        canvas: RecordingCanvas::new(),
    };

    h.place(8.0, 0.0);
    h.idle(10);
    assert!(h.state.zone.danger_at(8, 4 * CELL_SIZE + 8));

    tick(&mut h.state, &up(), DT);
    assert_eq!(h.state.level, 1);
    assert_eq!(h.state.map.lanes[4].width(), 63);
    assert_eq!(h.state.player.logic_pos, Vec2::new(8.0, 9.0));
    assert_eq!(h.state.t_tick, 0.0);
    for y in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            assert!(!h.state.zone.danger_at(x, y) && !h.state.zone.block_at(x, y));
        }
    }
    assert_eq!(
        h.state.levels().level_info(h.state.level),
        "- Level<1>: Two | describe: second"
    );
}

#[test]
fn test_shipped_levels_parse_cleanly() {
    let data = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let levels = LevelDir::open(&data).unwrap();
    assert_eq!(levels.level_count(), 3);
    for level in 0..levels.level_count() {
        let parsed = levels.load_level(level).unwrap();
        assert!(parsed.warnings.is_empty(), "map{level}: {:?}", parsed.warnings);
        assert_eq!(parsed.map.lanes.len(), 10);
        assert!(parsed.map.lanes.iter().all(|lane| lane.width() == MAP_WIDTH_LIMIT));
    }
}
