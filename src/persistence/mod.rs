//! Plain-text save files
//!
//! Seven whitespace-separated tokens, one per line when written:
//! level, velocity x/y, animation position x/y, logic position x/y.

use std::io;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default save location relative to the data directory
pub const SAVE_FILE: &str = "save/save_data.txt";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to read save {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write save {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed save data: {0}")]
    Malformed(String),
}

/// Everything a save restores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub level: usize,
    pub velocity: Vec2,
    pub anim_pos: Vec2,
    pub logic_pos: Vec2,
}

impl SaveData {
    pub fn to_text(&self) -> String {
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n{}",
            self.level,
            self.velocity.x,
            self.velocity.y,
            self.anim_pos.x,
            self.anim_pos.y,
            self.logic_pos.x,
            self.logic_pos.y
        )
    }

    pub fn parse(text: &str) -> Result<Self, SaveError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < 7 {
            return Err(SaveError::Malformed(format!(
                "expected 7 values, found {}",
                tokens.len()
            )));
        }
        if tokens.len() > 7 {
            log::warn!("Ignoring {} trailing save tokens", tokens.len() - 7);
        }

        let level = tokens[0]
            .parse::<usize>()
            .map_err(|_| SaveError::Malformed(format!("bad level {:?}", tokens[0])))?;
        let mut reals = [0.0f32; 6];
        for (slot, token) in reals.iter_mut().zip(&tokens[1..7]) {
            *slot = token
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| SaveError::Malformed(format!("bad number {token:?}")))?;
        }

        Ok(Self {
            level,
            velocity: Vec2::new(reals[0], reals[1]),
            anim_pos: Vec2::new(reals[2], reals[3]),
            logic_pos: Vec2::new(reals[4], reals[5]),
        })
    }
}

/// Write a save file, creating parent directories as needed
pub fn save_game(path: &Path, data: &SaveData) -> Result<(), SaveError> {
    let write_err = |source| SaveError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, data.to_text()).map_err(write_err)?;
    log::info!("Saved level {} to {}", data.level, path.display());
    Ok(())
}

pub fn load_game(path: &Path) -> Result<SaveData, SaveError> {
    let text = std::fs::read_to_string(path).map_err(|source| SaveError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let data = SaveData::parse(&text)?;
    log::info!("Loaded save for level {} from {}", data.level, path.display());
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SaveData {
        SaveData {
            level: 2,
            velocity: Vec2::new(1.0, 1.0),
            anim_pos: Vec2::new(7.75, 4.0),
            logic_pos: Vec2::new(7.75, 4.0),
        }
    }

    #[test]
    fn test_save_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save").join("save_data.txt");
        save_game(&path, &sample()).unwrap();
        assert_eq!(load_game(&path).unwrap(), sample());
    }

    #[test]
    fn test_parse_single_line() {
        let data = SaveData::parse("1 1 1 8 9 8 9").unwrap();
        assert_eq!(data.level, 1);
        assert_eq!(data.logic_pos, Vec2::new(8.0, 9.0));
    }

    #[test]
    fn test_parse_rejects_short_or_bad() {
        assert!(matches!(SaveData::parse("1 1 1"), Err(SaveError::Malformed(_))));
        assert!(matches!(SaveData::parse("-1 1 1 8 9 8 9"), Err(SaveError::Malformed(_))));
        assert!(matches!(SaveData::parse("1 1 1 8 NaN 8 9"), Err(SaveError::Malformed(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_game(&dir.path().join("nope.txt")),
            Err(SaveError::Read { .. })
        ));
    }
}
