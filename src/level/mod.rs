//! Level loading
//!
//! - `parse`: map-file text to a `Map` (lanes + tile catalog)
//! - `index`: the `mapNames.txt` level index
//!
//! A `LevelSource` hands maps to the simulation by level number. `LevelDir`
//! reads `<data>/maps/map<N>.txt`; `MemoryLevels` serves maps held in memory.

pub mod index;
pub mod parse;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sim::tile::UnresolvedSummon;

pub use index::{MapEntry, MapIndex};
pub use parse::{ParsedMap, parse_duration, parse_map};

/// Errors from reading or parsing level data
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: malformed lane: {reason}")]
    MalformedLane { line: usize, reason: String },

    #[error("line {line}: tile attributes before any `$ <code>` header")]
    MissingTileCode { line: usize },

    #[error("tile '{code}': bad value {value:?} for `{key}`")]
    BadAttribute {
        code: char,
        key: String,
        value: String,
    },

    #[error("tile '{code}': unknown attribute `{key}`")]
    UnknownAttribute { code: char, key: String },

    #[error(transparent)]
    UnresolvedSummon(#[from] UnresolvedSummon),

    #[error("level index is empty")]
    EmptyIndex,
}

/// Where the simulation gets its maps from
pub trait LevelSource: fmt::Debug + Send {
    /// Number of levels; level numbers are `0..level_count()`
    fn level_count(&self) -> usize;

    /// Parse one level
    fn load_level(&self, level: usize) -> Result<ParsedMap, LevelError>;

    /// Display name of a level
    fn level_name(&self, level: usize) -> String;

    /// `- Level<N>: Name | describe: Description`
    fn level_info(&self, level: usize) -> String;
}

/// Read a whole file, mapping a missing file to `FileNotFound`
pub(crate) fn read_text(path: &Path) -> Result<String, LevelError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LevelError::FileNotFound(path.to_path_buf()),
        _ => LevelError::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Load and parse a single map file
pub fn load_map_file(path: &Path) -> Result<ParsedMap, LevelError> {
    let text = read_text(path)?;
    let parsed = parse_map(&text)?;
    for warning in &parsed.warnings {
        log::warn!("{}: {}", path.display(), warning);
    }
    Ok(parsed)
}

/// Levels on disk under `<data_dir>/maps`
#[derive(Debug, Clone)]
pub struct LevelDir {
    maps_dir: PathBuf,
    index: MapIndex,
}

impl LevelDir {
    pub const INDEX_FILE: &'static str = "mapNames.txt";

    /// Open `<data_dir>/maps` and read its index
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, LevelError> {
        let maps_dir = data_dir.as_ref().join("maps");
        let index = MapIndex::load(&maps_dir.join(Self::INDEX_FILE))?;
        if index.is_empty() {
            return Err(LevelError::EmptyIndex);
        }
        log::info!("Found {} levels in {}", index.len(), maps_dir.display());
        Ok(Self { maps_dir, index })
    }

    pub fn map_path(&self, level: usize) -> PathBuf {
        self.maps_dir.join(format!("map{level}.txt"))
    }

    pub fn index(&self) -> &MapIndex {
        &self.index
    }
}

impl LevelSource for LevelDir {
    fn level_count(&self) -> usize {
        self.index.len()
    }

    fn load_level(&self, level: usize) -> Result<ParsedMap, LevelError> {
        load_map_file(&self.map_path(level))
    }

    fn level_name(&self, level: usize) -> String {
        self.index.name(level).to_string()
    }

    fn level_info(&self, level: usize) -> String {
        self.index.level_info(level)
    }
}

/// Map texts held in memory, mostly for tests and demos
#[derive(Debug, Clone, Default)]
pub struct MemoryLevels {
    maps: Vec<String>,
    index: MapIndex,
}

impl MemoryLevels {
    /// Levels named `Level0`, `Level1`, ...
    pub fn new<S: Into<String>>(maps: impl IntoIterator<Item = S>) -> Self {
        let maps: Vec<String> = maps.into_iter().map(Into::into).collect();
        let index = MapIndex::from_entries(
            (0..maps.len()).map(|i| MapEntry::new(format!("Level{i}"), String::new())),
        );
        Self { maps, index }
    }

    pub fn with_index(mut self, index: MapIndex) -> Self {
        self.index = index;
        self
    }
}

impl LevelSource for MemoryLevels {
    fn level_count(&self) -> usize {
        self.maps.len()
    }

    fn load_level(&self, level: usize) -> Result<ParsedMap, LevelError> {
        let text = self
            .maps
            .get(level)
            .ok_or_else(|| LevelError::FileNotFound(PathBuf::from(format!("map{level}.txt"))))?;
        let parsed = parse_map(text)?;
        for warning in &parsed.warnings {
            log::warn!("map{level}: {warning}");
        }
        Ok(parsed)
    }

    fn level_name(&self, level: usize) -> String {
        self.index.name(level).to_string()
    }

    fn level_info(&self, level: usize) -> String {
        self.index.level_info(level)
    }
}
