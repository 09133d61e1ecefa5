//! Pixel-resolution hazard raster
//!
//! Two bitmaps (danger, block) the size of the screen, rebuilt every time the
//! lanes are drawn. Collision queries read whatever the most recent lane pass
//! wrote, so they trail the simulation clock by at most one tick.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ZoneError {
    #[error("invalid zone dimensions {width}x{height}, expected positive sizes")]
    InvalidDimensions { width: i32, height: i32 },
}

/// Danger/block bitmaps plus corner hit tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    width: usize,
    height: usize,
    danger: Vec<bool>,
    block: Vec<bool>,
}

impl Zone {
    /// Zero-initialized zone of `width x height` pixels
    pub fn new(width: i32, height: i32) -> Result<Self, ZoneError> {
        if width <= 0 || height <= 0 {
            return Err(ZoneError::InvalidDimensions { width, height });
        }
        let len = width as usize * height as usize;
        Ok(Self {
            width: width as usize,
            height: height as usize,
            danger: vec![false; len],
            block: vec![false; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.danger.fill(false);
        self.block.fill(false);
    }

    #[inline]
    pub fn is_inside(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        self.is_inside(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    /// Returns false if the pixel is off the raster
    pub fn set_danger(&mut self, x: i32, y: i32, value: bool) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.danger[i] = value;
                true
            }
            None => false,
        }
    }

    /// Returns false if the pixel is off the raster
    pub fn set_block(&mut self, x: i32, y: i32, value: bool) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.block[i] = value;
                true
            }
            None => false,
        }
    }

    /// Pixels off the raster read as clear
    pub fn danger_at(&self, x: i32, y: i32) -> bool {
        self.offset(x, y).is_some_and(|i| self.danger[i])
    }

    pub fn block_at(&self, x: i32, y: i32) -> bool {
        self.offset(x, y).is_some_and(|i| self.block[i])
    }

    /// Assign `code ∈ pattern` to every danger pixel in `[x0, x1) x [y0, y1)`
    ///
    /// Assignment, not OR: the last fill over a pixel wins. Returns the number
    /// of on-raster pixels written.
    pub fn fill_danger(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, code: char, pattern: &str) -> usize {
        let value = pattern.contains(code);
        let mut written = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                written += self.set_danger(x, y, value) as usize;
            }
        }
        written
    }

    /// Block counterpart of [`Zone::fill_danger`]
    pub fn fill_block(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, code: char, pattern: &str) -> usize {
        let value = pattern.contains(code);
        let mut written = 0;
        for y in y0..y1 {
            for x in x0..x1 {
                written += self.set_block(x, y, value) as usize;
            }
        }
        written
    }

    /// The four inset corner pixels of the cell at tile coords `(fx, fy)`
    ///
    /// Order: top-left, top-right, bottom-left, bottom-right. The one-pixel
    /// inset keeps seams between adjacent cells from registering.
    pub fn corners(fx: f32, fy: f32, cell: i32) -> [(i32, i32); 4] {
        let c = cell as f32;
        let left = (fx * c + 1.0).floor() as i32;
        let right = ((fx + 1.0) * c - 1.0).floor() as i32;
        let top = (fy * c + 1.0).floor() as i32;
        let bottom = ((fy + 1.0) * c - 1.0).floor() as i32;
        [(left, top), (right, top), (left, bottom), (right, bottom)]
    }

    /// Per-corner danger flags for a cell
    pub fn danger_corners(&self, fx: f32, fy: f32, cell: i32) -> [bool; 4] {
        Self::corners(fx, fy, cell).map(|(x, y)| self.danger_at(x, y))
    }

    /// Per-corner block flags for a cell
    pub fn block_corners(&self, fx: f32, fy: f32, cell: i32) -> [bool; 4] {
        Self::corners(fx, fy, cell).map(|(x, y)| self.block_at(x, y))
    }

    /// Any corner of the cell sits on a danger pixel
    pub fn is_danger_hit(&self, fx: f32, fy: f32, cell: i32) -> bool {
        self.danger_corners(fx, fy, cell).into_iter().any(|b| b)
    }

    /// Any corner of the cell sits on a block pixel
    pub fn is_block_hit(&self, fx: f32, fy: f32, cell: i32) -> bool {
        self.block_corners(fx, fy, cell).into_iter().any(|b| b)
    }
}
