//! Probabilistic summon overlays
//!
//! Each `(column, row)` cell whose tile carries a summon rule gets a lazily
//! created activation timestamp. The oracle is queried once per visible cell
//! per frame and is the only record of which overlays are up.

use std::collections::BTreeMap;

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::RngState;
use super::tile::TileDef;

/// Overlay state of one cell for one query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummonPhase {
    /// Off; either waiting for the first activation or a failed trial
    Idle,
    /// Trial succeeded this frame, overlay goes up
    Started,
    /// Inside an ongoing burst
    Active,
    /// Burst ended, suppressed until the cooldown elapses
    Cooldown,
}

impl SummonPhase {
    /// Whether the overlay should be drawn
    #[inline]
    pub fn is_on(self) -> bool {
        matches!(self, SummonPhase::Started | SummonPhase::Active)
    }
}

/// Per-cell activation bookkeeping with an owned, seeded RNG
#[derive(Debug, Clone)]
pub struct SummonOracle {
    rng_state: RngState,
    rng: Pcg32,
    last_activation: BTreeMap<(usize, usize), f32>,
}

impl SummonOracle {
    pub fn new(seed: u64) -> Self {
        Self::from_state(RngState::new(seed))
    }

    pub fn from_state(rng_state: RngState) -> Self {
        Self {
            rng: rng_state.to_rng(),
            rng_state,
            last_activation: BTreeMap::new(),
        }
    }

    /// Seed the RNG stream started from
    pub fn rng_state(&self) -> &RngState {
        &self.rng_state
    }

    /// Forget all cells (level load). The RNG stream keeps going.
    pub fn clear(&mut self) {
        self.last_activation.clear();
    }

    /// Number of cells with activation state
    pub fn tracked(&self) -> usize {
        self.last_activation.len()
    }

    /// Last activation time of a cell, if it has been seen
    pub fn last_activation(&self, column: usize, row: usize) -> Option<f32> {
        self.last_activation.get(&(column, row)).copied()
    }

    /// Is the overlay of `tile` on at `(column, row)` at time `now`?
    ///
    /// `column` is the wrapped index into the lane string. Tiles without a
    /// summon target or with zero chance never touch the RNG.
    pub fn query(&mut self, tile: &TileDef, column: usize, row: usize, now: f32, fps: f32) -> SummonPhase {
        if !tile.can_summon() {
            return SummonPhase::Idle;
        }

        let duration = tile.duration.max(0.0);
        let cooldown = tile.cooldown.max(0.0);

        let last = match self.last_activation.get(&(column, row)) {
            Some(&last) => last,
            None => {
                // Stagger the first burst across the grid
                let lo = duration;
                let hi = 2.0 * duration + cooldown;
                let first = if hi > lo {
                    self.rng.random_range(lo..=hi)
                } else {
                    lo
                };
                self.last_activation.insert((column, row), first);
                first
            }
        };

        let delta = now - last;
        if delta < 0.0 {
            return SummonPhase::Idle;
        }
        if delta <= duration {
            return SummonPhase::Active;
        }
        if delta < duration + cooldown {
            return SummonPhase::Cooldown;
        }

        let p = tile.chance / 100.0 / fps.max(1.0);
        if self.rng.random::<f32>() < p {
            self.last_activation.insert((column, row), now);
            SummonPhase::Started
        } else {
            SummonPhase::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summoning_tile(duration: f32, cooldown: f32, chance: f32) -> TileDef {
        let mut tile = TileDef::new('T');
        tile.summon = Some(0);
        tile.duration = duration;
        tile.cooldown = cooldown;
        tile.chance = chance;
        tile
    }

    #[test]
    fn test_no_summon_never_fires() {
        let mut oracle = SummonOracle::new(1);
        let tile = TileDef::new('G');
        for i in 0..100 {
            assert_eq!(oracle.query(&tile, 0, 0, i as f32 * 0.1, 1.0), SummonPhase::Idle);
        }
        assert_eq!(oracle.tracked(), 0);
    }

    #[test]
    fn test_zero_chance_never_fires() {
        let mut oracle = SummonOracle::new(1);
        let tile = summoning_tile(0.5, 1.0, 0.0);
        for i in 0..100 {
            assert!(!oracle.query(&tile, 3, 2, i as f32 * 0.1, 1.0).is_on());
        }
    }

    #[test]
    fn test_first_activation_in_range() {
        let mut oracle = SummonOracle::new(42);
        let tile = summoning_tile(0.5, 1.0, 100.0);
        for col in 0..32 {
            oracle.query(&tile, col, 0, 0.0, 60.0);
            let last = oracle.last_activation(col, 0).unwrap();
            assert!((0.5..=2.0).contains(&last), "{last}");
        }
    }

    #[test]
    fn test_burst_cooldown_retrigger() {
        let mut oracle = SummonOracle::new(7);
        let tile = summoning_tile(0.5, 1.0, 100.0);
        assert_eq!(oracle.query(&tile, 0, 0, 0.0, 1.0), SummonPhase::Idle);
        let last = oracle.last_activation(0, 0).unwrap();

        assert_eq!(oracle.query(&tile, 0, 0, last + 0.25, 1.0), SummonPhase::Active);
        assert_eq!(oracle.query(&tile, 0, 0, last + 1.0, 1.0), SummonPhase::Cooldown);
        // chance 100% at fps 1 is a certain trial
        assert_eq!(oracle.query(&tile, 0, 0, last + 1.6, 1.0), SummonPhase::Started);
        assert_eq!(oracle.last_activation(0, 0), Some(last + 1.6));
    }

    #[test]
    fn test_same_seed_same_stream() {
        let tile = summoning_tile(0.5, 1.0, 50.0);
        let mut a = SummonOracle::new(99);
        let mut b = SummonOracle::from_state(RngState::new(99));
        assert_eq!(b.rng_state().seed, 99);
        for frame in 0..200 {
            let now = frame as f32 / 60.0;
            assert_eq!(a.query(&tile, 4, 4, now, 60.0), b.query(&tile, 4, 4, now, 60.0));
        }
        a.clear();
        assert_eq!(a.tracked(), 0);
    }
}
