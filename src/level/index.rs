//! The `mapNames.txt` level index
//!
//! One level per line, `N. <Name> "<Description>"`. The leading number is
//! informational; the line's position decides the level number.

use std::path::Path;

use super::{LevelError, read_text};

const UNDEFINED: &str = "Undefined";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub name: String,
    pub description: String,
}

impl MapEntry {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Names and descriptions by level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapIndex {
    entries: Vec<MapEntry>,
}

impl MapIndex {
    pub fn from_entries(entries: impl IntoIterator<Item = MapEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Parse index text; lines without `". "` are skipped
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|raw| {
                let line = raw.split_whitespace().collect::<Vec<_>>().join(" ");
                let start = line.find(". ")? + 2;
                let rest = &line[start..];
                let name = rest.split(' ').next().unwrap_or_default();
                let description = rest
                    .split_once('"')
                    .and_then(|(_, tail)| tail.split_once('"'))
                    .map(|(desc, _)| desc)
                    .unwrap_or_default();
                Some(MapEntry::new(name, description))
            })
            .collect();
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let text = read_text(path)?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    fn entry(&self, level: usize) -> Option<&MapEntry> {
        let entry = self.entries.get(level);
        if entry.is_none() {
            log::warn!(
                "Level {} is out of bounds, expected [0..{}]",
                level,
                self.entries.len().saturating_sub(1)
            );
        }
        entry
    }

    /// Level name, `"Undefined"` when out of range
    pub fn name(&self, level: usize) -> &str {
        self.entry(level).map_or(UNDEFINED, |e| e.name.as_str())
    }

    /// Level description, `"Undefined"` when out of range
    pub fn description(&self, level: usize) -> &str {
        self.entry(level).map_or(UNDEFINED, |e| e.description.as_str())
    }

    pub fn level_info(&self, level: usize) -> String {
        format!(
            "- Level<{}>: {} | describe: {}",
            level,
            self.name(level),
            self.description(level)
        )
    }
}
