//! JSON configuration: grid colors, per-cell tile images and group styles

use crate::error::ConfigError;
use crate::render::style::{BlockMode, EdgeMode};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const BUILTIN_CONFIG: &str = include_str!("../assets/cfg-default.json");

/// Color used for grid characters missing from `colors`
pub const FALLBACK_COLOR: &str = "grey";

/// Partial group style; unset fields keep the inherited value
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupOverride {
    pub edge_color: Option<String>,
    pub block_color: Option<String>,
    pub edges: Option<EdgeMode>,
    pub blocks: Option<BlockMode>,
    pub arrows: Option<bool>,
    pub dashed: Option<bool>,
    pub thick: Option<bool>,
    pub sides: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
    #[serde(default)]
    pub tiles: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub groups: BTreeMap<String, GroupOverride>,
    /// Directory that relative tile paths resolve against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Config {
    /// The configuration compiled into the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        serde_json::from_str(BUILTIN_CONFIG).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<builtin>"),
            source,
        })
    }

    pub fn from_json(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: Config =
            serde_json::from_str(text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Load `path`, or the builtin config when none is given
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    pub fn color_for(&self, ch: char) -> &str {
        let mut buf = [0u8; 4];
        self.colors
            .get(&*ch.encode_utf8(&mut buf))
            .map(String::as_str)
            .unwrap_or(FALLBACK_COLOR)
    }

    /// Resolved tile image path for a grid character, if one is configured
    pub fn tile_for(&self, ch: char) -> Option<PathBuf> {
        let mut buf = [0u8; 4];
        let tile = self.tiles.get(&*ch.encode_utf8(&mut buf))?;
        Some(match &self.base_dir {
            Some(dir) if tile.is_relative() => dir.join(tile),
            _ => tile.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_parses() {
        let config = Config::builtin().unwrap();
        assert_eq!(config.color_for('X'), "black");
        assert!(config.groups.contains_key("path"));
        assert!(config.groups.contains_key("misc"));
    }

    #[test]
    fn test_unknown_char_falls_back() {
        let config = Config::default();
        assert_eq!(config.color_for('?'), FALLBACK_COLOR);
        assert_eq!(config.color_for('─'), FALLBACK_COLOR);
    }

    #[test]
    fn test_group_override_parse() {
        let json = r#"{
            "colors": {"┌": "red"},
            "groups": {"route": {"edges": "arc", "blocks": "fill-uniq", "dashed": true, "sides": "lt"}}
        }"#;
        let config = Config::from_json(json, Path::new("cfg/level.json")).unwrap();
        assert_eq!(config.color_for('┌'), "red");
        let route = &config.groups["route"];
        assert_eq!(route.edges, Some(EdgeMode::Arc));
        assert_eq!(route.blocks, Some(BlockMode::FillUniq));
        assert_eq!(route.dashed, Some(true));
        assert_eq!(route.sides.as_deref(), Some("lt"));
        assert_eq!(route.thick, None);
    }

    #[test]
    fn test_unknown_group_field_rejected() {
        let json = r#"{"groups": {"route": {"colour": "red"}}}"#;
        let err = Config::from_json(json, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_tile_paths_resolve_against_config_dir() {
        let json = r#"{"tiles": {"X": "tiles/wall.png", "Q": "/abs/coin.png"}}"#;
        let config = Config::from_json(json, Path::new("/data/cfg.json")).unwrap();
        assert_eq!(
            config.tile_for('X'),
            Some(PathBuf::from("/data/tiles/wall.png"))
        );
        assert_eq!(config.tile_for('Q'), Some(PathBuf::from("/abs/coin.png")));
        assert_eq!(config.tile_for('.'), None);
    }
}
