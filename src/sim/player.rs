//! Player state machine
//!
//! The frog keeps two positions:
//! - `anim_pos`: fractional, interpolated during a jump, used for drawing and
//!   for block tests
//! - `logic_pos`: the committed cell, used for hazard tests
//!
//! A jump is six sub-steps driven by a 32 Hz logical clock derived from
//! `t_tick`, so the jump takes the same wall time at any tick rate.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::zone::Zone;
use crate::consts::*;

/// Facing / jump direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    #[default]
    Right,
    LeftUp,
    RightUp,
    LeftDown,
    RightDown,
}

impl Direction {
    pub fn is_left(self) -> bool {
        matches!(self, Direction::Left | Direction::LeftUp | Direction::LeftDown)
    }

    pub fn is_right(self) -> bool {
        !self.is_left()
    }

    /// Unit step in tile coordinates (y grows downward)
    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
            Direction::LeftUp | Direction::RightUp => Vec2::new(0.0, -1.0),
            Direction::LeftDown | Direction::RightDown => Vec2::new(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Animation {
    #[default]
    Idle,
    Jump,
    /// Reserved; collapses to `Idle` on the next step
    Land,
}

/// A requested jump, from a released movement key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveIntent {
    Left,
    Right,
    Up,
    Down,
}

impl MoveIntent {
    /// First of left, right, up, down that was released this tick
    pub fn from_keys(left: bool, right: bool, up: bool, down: bool) -> Option<Self> {
        if left {
            Some(MoveIntent::Left)
        } else if right {
            Some(MoveIntent::Right)
        } else if up {
            Some(MoveIntent::Up)
        } else if down {
            Some(MoveIntent::Down)
        } else {
            None
        }
    }
}

/// The frog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub anim_pos: Vec2,
    pub logic_pos: Vec2,
    /// Jump magnitudes in cells
    pub velocity: Vec2,
    pub direction: Direction,
    pub animation: Animation,
    /// Sub-frame of the running jump, 1-based
    pub jump_frame: i32,
    /// Jump frames during which hazards are ignored
    pub jump_frame_safe: i32,
    /// Current 32 Hz clock value
    jump_value: i32,
    /// Clock value when the jump started
    jump_value_last: i32,
    /// Last clock value a sub-step was taken for
    jump_value_cur: i32,
    /// Cosmetic 1..=4 cycle
    pub anim_frame: i32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        let spawn = Vec2::new(FROG_X_RESET, FROG_Y_RESET);
        Self {
            anim_pos: spawn,
            logic_pos: spawn,
            velocity: Vec2::new(FROG_X_VELOCITY, FROG_Y_VELOCITY),
            direction: Direction::Right,
            animation: Animation::Idle,
            jump_frame: 0,
            jump_frame_safe: JUMP_FRAME_SAFE,
            jump_value: 0,
            jump_value_last: 0,
            jump_value_cur: 0,
            anim_frame: 1,
        }
    }

    /// Back to spawn, idle, facing right, default velocity
    pub fn reset(&mut self) {
        let safe = self.jump_frame_safe;
        *self = Self::new();
        self.jump_frame_safe = safe;
    }

    /// Place the player idle at `pos`
    pub fn place(&mut self, anim: Vec2, logic: Vec2) {
        self.anim_pos = anim;
        self.logic_pos = logic;
        self.animation = Animation::Idle;
        self.jump_frame = 0;
    }

    /// Derive both clocks from level time
    pub fn update_frame(&mut self, t_tick: f32) {
        self.anim_frame = (t_tick / ANIM_CLOCK_SECS).floor() as i32 % ANIM_FRAME_LIMIT + 1;
        self.jump_value = (t_tick / JUMP_CLOCK_SECS).floor() as i32;
    }

    pub fn jump_value(&self) -> i32 {
        self.jump_value
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.animation == Animation::Idle
    }

    #[inline]
    pub fn is_jumping(&self) -> bool {
        self.animation == Animation::Jump
    }

    /// Hazards are ignored during the first `jump_frame_safe` frames of a jump
    pub fn is_collision_safe(&self) -> bool {
        self.is_jumping() && self.jump_frame <= self.jump_frame_safe
    }

    fn in_bounds(pos: Vec2) -> bool {
        (LEFT_BORDER..=RIGHT_BORDER).contains(&pos.x) && (TOP_BORDER..=BOTTOM_BORDER).contains(&pos.y)
    }

    /// Logic position left the playfield
    pub fn is_out_of_bounds(&self) -> bool {
        !Self::in_bounds(self.logic_pos)
    }

    pub fn can_move_left(&self) -> bool {
        self.anim_pos.x > LEFT_BORDER
    }

    pub fn can_move_right(&self) -> bool {
        self.anim_pos.x < RIGHT_BORDER
    }

    pub fn can_move_up(&self) -> bool {
        self.anim_pos.y > TOP_BORDER
    }

    pub fn can_move_down(&self) -> bool {
        self.anim_pos.y < BOTTOM_BORDER
    }

    fn blocked_at(zone: &Zone, pos: Vec2) -> bool {
        zone.is_block_hit(pos.x, pos.y, CELL_SIZE)
    }

    /// Animation position overlaps a blocking pixel
    pub fn is_blocked(&self, zone: &Zone) -> bool {
        Self::blocked_at(zone, self.anim_pos)
    }

    /// Up released against the top border, or already above it
    pub fn wins(&self, up_released: bool) -> bool {
        (up_released && !self.can_move_up()) || self.logic_pos.y < TOP_BORDER
    }

    /// Move the animation position by the largest fraction `k/steps` of
    /// `delta` that is neither blocked nor out of bounds
    ///
    /// Returns the `k` applied; `0` leaves the player in place.
    pub fn safe_move(&mut self, delta: Vec2, zone: &Zone, steps: u32) -> u32 {
        if steps == 0 {
            return 0;
        }
        let origin = self.anim_pos;
        for k in (1..=steps).rev() {
            let candidate = origin + delta * (k as f32 / steps as f32);
            if !Self::blocked_at(zone, candidate) && Self::in_bounds(candidate) {
                self.anim_pos = candidate;
                return k;
            }
        }
        0
    }

    /// Platform drag: moves both positions, backing off only for blocks
    ///
    /// Bounds are not checked here; being carried off the field is a death.
    pub fn carry(&mut self, delta: Vec2, zone: &Zone, steps: u32) -> u32 {
        if steps == 0 {
            return 0;
        }
        let anim = self.anim_pos;
        let logic = self.logic_pos;
        for k in (1..=steps).rev() {
            let offset = delta * (k as f32 / steps as f32);
            if !Self::blocked_at(zone, anim + offset) {
                self.anim_pos = anim + offset;
                self.logic_pos = logic + offset;
                return k;
            }
        }
        0
    }

    /// Advance the FSM by one tick
    ///
    /// `intent` is only consulted while idle. Call `update_frame` first.
    pub fn step(&mut self, intent: Option<MoveIntent>, zone: &Zone) {
        match self.animation {
            Animation::Idle | Animation::Land => {
                self.animation = Animation::Idle;
                self.logic_pos = self.anim_pos;
                if let Some(intent) = intent {
                    self.start_jump(intent, zone);
                }
            }
            Animation::Jump => self.advance_jump(zone),
        }
    }

    fn start_jump(&mut self, intent: MoveIntent, zone: &Zone) {
        let left = self.direction.is_left();
        self.direction = match intent {
            MoveIntent::Left => Direction::Left,
            MoveIntent::Right => Direction::Right,
            MoveIntent::Up if left => Direction::LeftUp,
            MoveIntent::Up => Direction::RightUp,
            MoveIntent::Down if left => Direction::LeftDown,
            MoveIntent::Down => Direction::RightDown,
        };
        self.animation = Animation::Jump;
        self.jump_value_last = self.jump_value;
        self.jump_value_cur = self.jump_value - 1;
        self.advance_jump(zone);
    }

    fn advance_jump(&mut self, zone: &Zone) {
        self.jump_frame = self.jump_value - self.jump_value_last + 1;

        // Catch up on every sub-step owed, so slow tick rates still take six
        let due = self.jump_value.min(self.jump_value_last + JUMP_FRAME_LIMIT - 1);
        while self.jump_value_cur < due {
            self.jump_value_cur += 1;
            self.jump_substep(zone);
        }

        if self.jump_frame > JUMP_FRAME_LIMIT {
            self.commit();
        }
    }

    fn jump_substep(&mut self, zone: &Zone) {
        let allowed = match self.direction {
            Direction::Left => self.can_move_left(),
            Direction::Right => self.can_move_right(),
            Direction::LeftUp | Direction::RightUp => self.can_move_up(),
            Direction::LeftDown | Direction::RightDown => self.can_move_down(),
        };
        if allowed {
            let delta = self.direction.unit() * self.velocity / JUMP_FRAME_LIMIT as f32;
            self.safe_move(delta, zone, SAFE_MOVE_STEPS);
        }
    }

    /// Snap to the landing cell and go idle
    fn commit(&mut self) {
        let x = self.anim_pos.x.round().clamp(LEFT_BORDER, RIGHT_BORDER);
        let y = self.anim_pos.y.round();
        self.anim_pos = Vec2::new(x, y);
        self.logic_pos = self.anim_pos;
        self.animation = Animation::Idle;
    }

    /// Seam rescue on moving platforms
    ///
    /// If `is_killed` holds, try nudging both positions up to one cell in
    /// `dir` (then `-dir`) one pixel at a time, keeping the first offset that
    /// is free, in bounds and not killing. Returns true if a nudge was kept.
    pub fn platform_detector(
        &mut self,
        zone: &Zone,
        dir: f32,
        mut is_killed: impl FnMut(&Player) -> bool,
    ) -> bool {
        if !is_killed(self) {
            return false;
        }
        let anim = self.anim_pos;
        let logic = self.logic_pos;
        let cell = CELL_SIZE as f32;
        for sign in [dir, -dir] {
            for k in 1..=CELL_SIZE {
                let offset = Vec2::new(sign * k as f32 / cell, 0.0);
                let candidate = anim + offset;
                if Self::blocked_at(zone, candidate) || !Self::in_bounds(candidate) {
                    continue;
                }
                self.anim_pos = candidate;
                self.logic_pos = logic + offset;
                if !is_killed(self) {
                    return true;
                }
            }
        }
        self.anim_pos = anim;
        self.logic_pos = logic;
        false
    }

    /// `froggy[_jump][_left][<frame>]`
    pub fn sprite_name(&self) -> String {
        let jumping = self.is_jumping() && (1..=JUMP_FRAME_LIMIT).contains(&self.jump_frame);
        let mut name = String::from("froggy");
        if jumping {
            name.push_str("_jump");
        }
        if self.direction.is_left() {
            name.push_str("_left");
        }
        if jumping {
            name.push_str(&self.jump_frame.to_string());
        }
        name
    }

    /// Top-left pixel of the sprite
    pub fn screen_pos(&self) -> (i32, i32) {
        let cell = CELL_SIZE as f32;
        ((self.anim_pos.x * cell) as i32, (self.anim_pos.y * cell) as i32)
    }
}
