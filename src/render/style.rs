use crate::config::{Config, GroupOverride};
use crate::error::ConfigError;
use crate::level::{GROUP_MISC, GROUP_PATH};
use clap::ValueEnum;
use serde::Deserialize;
use std::collections::BTreeMap;

/// How edges of a group are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeMode {
    None,
    Line,
    /// Every edge bowed into a curve
    Arc,
}

/// How blocks and tiles of a group are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockMode {
    None,
    Fill,
    /// Fill, drawing identical blocks only once
    FillUniq,
    Outline,
    /// Outline on the sides selected by the group's `sides`
    Border,
    Hatch,
}

/// Rect sides drawn by [`BlockMode::Border`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sides {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl Sides {
    pub const ALL: Sides = Sides {
        left: true,
        top: true,
        right: true,
        bottom: true,
    };

    /// Parse a subset of `ltrb`, e.g. `"lt"`
    pub fn parse(letters: &str) -> Option<Sides> {
        let mut sides = Sides {
            left: false,
            top: false,
            right: false,
            bottom: false,
        };
        for ch in letters.chars() {
            match ch {
                'l' => sides.left = true,
                't' => sides.top = true,
                'r' => sides.right = true,
                'b' => sides.bottom = true,
                _ => return None,
            }
        }
        Some(sides)
    }
}

/// Resolved drawing style of one group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStyle {
    pub edge_color: String,
    pub block_color: String,
    pub edges: EdgeMode,
    pub blocks: BlockMode,
    pub arrows: bool,
    pub dashed: bool,
    pub thick: bool,
    pub sides: Sides,
}

impl GroupStyle {
    fn new(color: &str, edges: EdgeMode, blocks: BlockMode) -> Self {
        Self {
            edge_color: color.to_string(),
            block_color: color.to_string(),
            edges,
            blocks,
            arrows: true,
            dashed: false,
            thick: false,
            sides: Sides::ALL,
        }
    }

    pub fn default_path() -> Self {
        Self::new("orangered", EdgeMode::Line, BlockMode::Fill)
    }

    pub fn default_misc() -> Self {
        Self::new("darkgoldenrod", EdgeMode::Line, BlockMode::Outline)
    }

    /// Apply a partial override on top of this style
    pub fn apply(&mut self, group: &str, o: &GroupOverride) -> Result<(), ConfigError> {
        if let Some(c) = &o.edge_color {
            self.edge_color = c.clone();
        }
        if let Some(c) = &o.block_color {
            self.block_color = c.clone();
        }
        if let Some(e) = o.edges {
            self.edges = e;
        }
        if let Some(b) = o.blocks {
            self.blocks = b;
        }
        if let Some(a) = o.arrows {
            self.arrows = a;
        }
        if let Some(d) = o.dashed {
            self.dashed = d;
        }
        if let Some(t) = o.thick {
            self.thick = t;
        }
        if let Some(letters) = &o.sides {
            self.sides = Sides::parse(letters).ok_or_else(|| ConfigError::InvalidStyle {
                group: group.to_string(),
                what: "sides",
                value: letters.clone(),
            })?;
        }
        Ok(())
    }

    pub fn stroke_width(&self) -> u32 {
        if self.thick { 2 } else { 1 }
    }
}

/// Styles of all groups; unknown groups inherit the `misc` style
#[derive(Debug, Clone)]
pub struct Styles {
    misc: GroupStyle,
    groups: BTreeMap<String, GroupStyle>,
}

impl Default for Styles {
    fn default() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(GROUP_PATH.to_string(), GroupStyle::default_path());
        Self {
            misc: GroupStyle::default_misc(),
            groups,
        }
    }
}

impl Styles {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut styles = Styles::default();

        // `misc` first: other unknown groups inherit from it
        if let Some(o) = config.groups.get(GROUP_MISC) {
            styles.misc.apply(GROUP_MISC, o)?;
        }
        for (name, o) in &config.groups {
            if name != GROUP_MISC {
                styles.group_mut(name).apply(name, o)?;
            }
        }

        Ok(styles)
    }

    pub fn get(&self, group: &str) -> &GroupStyle {
        self.groups.get(group).unwrap_or(&self.misc)
    }

    /// Mutable style of a group, created from `misc` if missing
    pub fn group_mut(&mut self, group: &str) -> &mut GroupStyle {
        if group == GROUP_MISC {
            return &mut self.misc;
        }
        self.groups
            .entry(group.to_string())
            .or_insert_with(|| self.misc.clone())
    }

    pub fn disable_arrows(&mut self) {
        self.misc.arrows = false;
        for style in self.groups.values_mut() {
            style.arrows = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_styles() {
        let styles = Styles::default();
        assert_eq!(styles.get("path").blocks, BlockMode::Fill);
        assert_eq!(styles.get("path").edge_color, "orangered");
        assert_eq!(styles.get("misc").blocks, BlockMode::Outline);
        assert_eq!(styles.get("misc").edge_color, "darkgoldenrod");
    }

    #[test]
    fn test_unknown_group_inherits_misc() {
        let styles = Styles::default();
        assert_eq!(styles.get("rooms"), styles.get("misc"));
    }

    #[test]
    fn test_config_overrides() {
        let mut config = Config::default();
        config.groups.insert(
            "misc".to_string(),
            GroupOverride {
                edge_color: Some("teal".to_string()),
                ..Default::default()
            },
        );
        config.groups.insert(
            "rooms".to_string(),
            GroupOverride {
                blocks: Some(BlockMode::Hatch),
                ..Default::default()
            },
        );

        let styles = Styles::from_config(&config).unwrap();
        assert_eq!(styles.get("rooms").blocks, BlockMode::Hatch);
        // Inherited from the overridden misc style, not the builtin one
        assert_eq!(styles.get("rooms").edge_color, "teal");
        assert_eq!(styles.get("path").edge_color, "orangered");
    }

    #[test]
    fn test_invalid_sides_rejected() {
        let mut config = Config::default();
        config.groups.insert(
            "path".to_string(),
            GroupOverride {
                sides: Some("lx".to_string()),
                ..Default::default()
            },
        );
        let err = Styles::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidStyle { what: "sides", .. }));
    }

    #[test]
    fn test_sides_parse() {
        assert_eq!(Sides::parse("ltrb"), Some(Sides::ALL));
        let lt = Sides::parse("tl").unwrap();
        assert!(lt.left && lt.top && !lt.right && !lt.bottom);
        assert_eq!(Sides::parse("q"), None);
    }

    #[test]
    fn test_disable_arrows_applies_to_inherited_groups() {
        let mut styles = Styles::default();
        styles.group_mut("route");
        styles.disable_arrows();
        assert!(!styles.get("route").arrows);
        assert!(!styles.get("unseen").arrows);
    }
}
