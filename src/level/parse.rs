//! Map-file parser
//!
//! ```text
//! WWLLLWWWLLLWWWWW 1.5        <- lane: tiles, velocity (cells/sec)
//! GGGGTGGGGGGGTGGG 0
//! # tiles                     <- first '#' switches to tile definitions
//! $ W background=water danger=true
//! $ L sprite=log platformspeed=1.5
//!     spriteX=2 spriteY=0     <- continues the previous tile
//! $ C sprite=car summon=X duration=500ms cooldown=1s chance=20%
//! #                           <- second '#' (or a blank line) ends parsing
//! ```
//!
//! Whitespace is trimmed and collapsed. Problems with individual lines are
//! collected as warnings; only an unresolved summon target fails the parse.

use super::LevelError;
use crate::consts::MAP_WIDTH_LIMIT;
use crate::sim::lane::{Lane, Map};
use crate::sim::tile::{PendingTile, TileCatalog};

/// A parsed map plus the per-line problems that were skipped
#[derive(Debug)]
pub struct ParsedMap {
    pub map: Map,
    pub warnings: Vec<LevelError>,
}

/// Parse a duration like `1.5s`, `500ms`, `20us` or `7ns` into seconds
pub fn parse_duration(value: &str) -> Option<f32> {
    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(split);
    let scale = match unit {
        "s" => 1.0,
        "ms" => 1.0e-3,
        "us" => 1.0e-6,
        "ns" => 1.0e-9,
        _ => return None,
    };
    number.parse::<f32>().ok().map(|n| n * scale)
}

/// Parse a percentage, the trailing `%` is optional
fn parse_chance(value: &str) -> Option<f32> {
    let chance = value.strip_suffix('%').unwrap_or(value).parse::<f32>().ok()?;
    (0.0..=100.0).contains(&chance).then_some(chance)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_lane(line: &str, line_no: usize) -> Result<Lane, LevelError> {
    let malformed = |reason: &str| LevelError::MalformedLane {
        line: line_no,
        reason: reason.to_string(),
    };
    let (tiles, velocity) = line
        .split_once(' ')
        .ok_or_else(|| malformed("expected `<tiles> <velocity>`"))?;
    let velocity = velocity
        .parse::<f32>()
        .map_err(|_| malformed("velocity is not a number"))?;
    if !velocity.is_finite() {
        return Err(malformed("velocity is not finite"));
    }
    let width = tiles.chars().count();
    if width > MAP_WIDTH_LIMIT {
        return Err(malformed(&format!(
            "{width} tiles exceeds the limit of {MAP_WIDTH_LIMIT}"
        )));
    }
    Ok(Lane::new(tiles, velocity))
}

/// Apply one `key=value` token to a tile
fn apply_attribute(tile: &mut PendingTile, key: &str, value: &str) -> Result<(), LevelError> {
    let code = tile.def.code;
    let bad = || LevelError::BadAttribute {
        code,
        key: key.to_string(),
        value: value.to_string(),
    };
    let def = &mut tile.def;
    match key {
        "sprite" => def.sprite_name = value.to_string(),
        "background" => def.background_name = value.to_string(),
        "category" => def.category = value.to_string(),
        "block" => def.is_blocking = parse_bool(value).ok_or_else(bad)?,
        "danger" => def.is_lethal = parse_bool(value).ok_or_else(bad)?,
        "platformspeed" => def.platform_speed = value.parse().map_err(|_| bad())?,
        "spriteX" => def.sprite_origin.0 = value.parse().map_err(|_| bad())?,
        "spriteY" => def.sprite_origin.1 = value.parse().map_err(|_| bad())?,
        "backgroundX" => def.background_origin.0 = value.parse().map_err(|_| bad())?,
        "backgroundY" => def.background_origin.1 = value.parse().map_err(|_| bad())?,
        "id" => {
            let id: i32 = value.parse().map_err(|_| bad())?;
            if id < 0 {
                return Err(bad());
            }
            def.animation_id = id;
        }
        "summon" => tile.summon = Some(value.chars().next().ok_or_else(bad)?),
        "duration" => def.duration = parse_duration(value).ok_or_else(bad)?,
        "cooldown" => def.cooldown = parse_duration(value).ok_or_else(bad)?,
        "chance" => def.chance = parse_chance(value).ok_or_else(bad)?,
        _ => {
            return Err(LevelError::UnknownAttribute {
                code,
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

/// Parse map-file text into lanes and a tile catalog
pub fn parse_map(text: &str) -> Result<ParsedMap, LevelError> {
    let mut lanes = Vec::new();
    let mut tiles: Vec<PendingTile> = Vec::new();
    let mut warnings = Vec::new();
    let mut in_tiles = false;

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            break;
        }
        if line.starts_with('#') {
            if in_tiles {
                break;
            }
            in_tiles = true;
            continue;
        }

        if !in_tiles {
            match parse_lane(&line, line_no) {
                Ok(lane) => lanes.push(lane),
                Err(err) => warnings.push(err),
            }
            continue;
        }

        let mut tokens = line.split(' ').peekable();
        if tokens.peek() == Some(&"$") {
            tokens.next();
            match tokens.next().and_then(|t| t.chars().next()) {
                Some(code) => tiles.push(PendingTile::new(code)),
                None => {
                    warnings.push(LevelError::MissingTileCode { line: line_no });
                    continue;
                }
            }
        }

        let Some(tile) = tiles.last_mut() else {
            warnings.push(LevelError::MissingTileCode { line: line_no });
            continue;
        };
        for token in tokens {
            let Some((key, value)) = token.split_once('=') else {
                log::debug!("line {line_no}: ignoring token {token:?}");
                continue;
            };
            if let Err(err) = apply_attribute(tile, key, value) {
                warnings.push(err);
            }
        }
    }

    let catalog = TileCatalog::build(tiles)?;
    log::debug!(
        "Parsed map: {} lanes, {} tiles, danger={:?} block={:?}",
        lanes.len(),
        catalog.len(),
        catalog.danger_pattern(),
        catalog.block_pattern()
    );
    Ok(ParsedMap {
        map: Map::new(lanes, catalog),
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("2s"), Some(2.0));
        assert_eq!(parse_duration("500ms"), Some(0.5));
        assert_eq!(parse_duration("1.5s"), Some(1.5));
        assert!(parse_duration("250us").is_some_and(|v| (v - 2.5e-4).abs() < 1e-9));
        assert_eq!(parse_duration("5"), None);
        assert_eq!(parse_duration("5min"), None);
        assert_eq!(parse_duration("s"), None);
    }

    #[test]
    fn test_parse_lanes_and_tiles() {
        let text = "\
  WWLLLWWW   1.5
GGGGTGGG 0
# tiles
$ W background=water danger=true
$ L sprite=log platformspeed=1.5
    spriteX=2 spriteY=1
$ T sprite=tree block=true
$ G background=grass
";
        let parsed = parse_map(text).unwrap();
        assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
        let map = parsed.map;
        assert_eq!(map.lanes.len(), 2);
        assert_eq!(map.lanes[0].as_string(), "WWLLLWWW");
        assert_eq!(map.lanes[0].velocity, 1.5);
        assert_eq!(map.danger_pattern(), "W");
        assert_eq!(map.block_pattern(), "T");
        let log = map.tile('L').unwrap();
        assert_eq!(log.sprite_origin, (2, 1));
        assert!(log.is_platform());
    }

    #[test]
    fn test_malformed_lane_skipped() {
        let parsed = parse_map("GGGG\nGGGG fast\nGGGG 1\n").unwrap();
        assert_eq!(parsed.map.lanes.len(), 1);
        assert_eq!(parsed.warnings.len(), 2);
        assert!(matches!(parsed.warnings[0], LevelError::MalformedLane { line: 1, .. }));
    }

    #[test]
    fn test_lane_too_wide() {
        let wide = "G".repeat(MAP_WIDTH_LIMIT + 1);
        let parsed = parse_map(&format!("{wide} 1\n")).unwrap();
        assert!(parsed.map.lanes.is_empty());
    }

    #[test]
    fn test_blank_line_and_second_hash_end_parsing() {
        let parsed = parse_map("GG 0\n\nWW 0\n").unwrap();
        assert_eq!(parsed.map.lanes.len(), 1);

        let parsed = parse_map("GG 0\n#\n$ G sprite=grass\n#\n$ W danger=true\n").unwrap();
        assert!(parsed.map.tile('W').is_none());
        assert!(parsed.map.tile('G').is_some());
    }

    #[test]
    fn test_bad_attribute_keeps_prior_value() {
        let parsed = parse_map("C 0\n#\n$ C chance=40% duration=1s\nchance=abc duration=forever\n").unwrap();
        let car = parsed.map.tile('C').unwrap();
        assert_eq!(car.chance, 40.0);
        assert_eq!(car.duration, 1.0);
        assert_eq!(parsed.warnings.len(), 2);
    }

    #[test]
    fn test_unknown_attribute_reported() {
        let parsed = parse_map("C 0\n#\n$ C colour=red sprite=car\n").unwrap();
        assert_eq!(parsed.map.tile('C').unwrap().sprite_name, "car");
        assert!(matches!(
            &parsed.warnings[..],
            [LevelError::UnknownAttribute { code: 'C', key }] if key == "colour"
        ));
    }

    #[test]
    fn test_forward_summon_resolves() {
        let parsed = parse_map("C 0\n#\n$ C sprite=car summon=X chance=10%\n$ X sprite=crash\n").unwrap();
        let map = parsed.map;
        let car = map.tile('C').unwrap();
        assert_eq!(map.catalog.summon_of(car).map(|t| t.code), Some('X'));
    }

    #[test]
    fn test_unresolved_summon_fails() {
        let err = parse_map("C 0\n#\n$ C summon=Q\n").unwrap_err();
        assert!(matches!(err, LevelError::UnresolvedSummon(_)));
    }

    #[test]
    fn test_attributes_before_header() {
        let parsed = parse_map("G 0\n#\nsprite=grass\n").unwrap();
        assert!(matches!(parsed.warnings[0], LevelError::MissingTileCode { line: 3 }));
    }
}
