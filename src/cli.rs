use crate::app::{self, Options, OutputFormat};
use crate::config::Config;
use crate::convert::Backend;
use crate::error::Result;
use crate::level::{GROUP_MISC, GROUP_PATH};
use crate::render::{BlockMode, EdgeMode, RenderOptions, Styles};
use clap::Parser;
use std::path::PathBuf;

/// Render text level files to SVG, PDF, PNG or animated GIF
#[derive(Parser, Debug)]
#[command(name = "level2image", version)]
pub struct Cli {
    /// Level files to render
    #[arg(required = true, value_name = "LEVELFILES")]
    pub level_files: Vec<PathBuf>,

    /// Font size in points
    #[arg(long = "fontsize", default_value_t = 8)]
    pub font_size: u32,

    /// Size of one grid cell
    #[arg(long = "gridsize", default_value_t = 11)]
    pub grid_size: u32,

    /// Padding around the grid
    #[arg(long, default_value_t = 0)]
    pub padding: u32,

    /// JSON config file (colors, tiles, group styles)
    #[arg(long = "cfgfile", value_name = "FILE")]
    pub cfg_file: Option<PathBuf>,

    #[arg(long = "fmt", value_enum, default_value_t = OutputFormat::Pdf)]
    pub format: OutputFormat,

    /// Write svg output to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    #[arg(long, value_enum)]
    pub path_edges: Option<EdgeMode>,

    #[arg(long, value_enum)]
    pub path_tiles: Option<BlockMode>,

    /// Color of path edges and tiles
    #[arg(long, value_name = "COLOR")]
    pub path_color: Option<String>,

    #[arg(long, value_enum)]
    pub misc_edges: Option<EdgeMode>,

    #[arg(long, value_enum)]
    pub misc_blocks: Option<BlockMode>,

    #[arg(long, value_name = "COLOR")]
    pub misc_edges_color: Option<String>,

    #[arg(long, value_name = "COLOR")]
    pub misc_blocks_color: Option<String>,

    /// Draw edges without arrowheads
    #[arg(long)]
    pub edges_no_arrows: bool,

    /// Ignore background and tile images
    #[arg(long)]
    pub no_background: bool,

    /// Background image for every level
    #[arg(long, value_name = "FILE", conflicts_with = "no_background")]
    pub background: Option<PathBuf>,

    /// Delay between animation frames in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 250)]
    pub anim_delay: u32,

    /// Raster scale factor for png and gif output
    #[arg(long, default_value_t = 2.0)]
    pub scale: f32,

    #[arg(long, value_enum, default_value_t = Backend::Auto)]
    pub backend: Backend,

    /// Combine all levels into one document with this many columns
    #[arg(long, value_name = "COLS")]
    pub montage: Option<usize>,
}

impl Cli {
    /// Group styles from the config with command-line overrides on top
    pub fn styles(&self, config: &Config) -> Result<Styles> {
        let mut styles = Styles::from_config(config)?;

        let path = styles.group_mut(GROUP_PATH);
        if let Some(mode) = self.path_edges {
            path.edges = mode;
        }
        if let Some(mode) = self.path_tiles {
            path.blocks = mode;
        }
        if let Some(color) = &self.path_color {
            path.edge_color = color.clone();
            path.block_color = color.clone();
        }

        let misc = styles.group_mut(GROUP_MISC);
        if let Some(mode) = self.misc_edges {
            misc.edges = mode;
        }
        if let Some(mode) = self.misc_blocks {
            misc.blocks = mode;
        }
        if let Some(color) = &self.misc_edges_color {
            misc.edge_color = color.clone();
        }
        if let Some(color) = &self.misc_blocks_color {
            misc.block_color = color.clone();
        }

        if self.edges_no_arrows {
            styles.disable_arrows();
        }
        Ok(styles)
    }

    pub fn options(&self) -> Options {
        Options {
            level_files: self.level_files.clone(),
            format: self.format,
            stdout: self.stdout,
            render: RenderOptions {
                grid_size: self.grid_size,
                padding: self.padding,
                font_size: self.font_size,
            },
            no_background: self.no_background,
            background: self.background.clone(),
            anim_delay: self.anim_delay,
            scale: self.scale,
            backend: self.backend,
            montage: self.montage,
        }
    }

    /// Load the config and convert every level, writing svg to `out` with `--stdout`
    pub fn run(&self, out: &mut impl std::io::Write) -> Result<Vec<PathBuf>> {
        let options = self.options();
        options.validate()?;
        let config = Config::load_or_builtin(self.cfg_file.as_deref())?;
        let styles = self.styles(&config)?;
        app::run(&options, &config, &styles, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("level2image").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["lvl.txt"]);
        assert_eq!(cli.format, OutputFormat::Pdf);
        assert_eq!(cli.font_size, 8);
        assert_eq!(cli.grid_size, 11);
        assert_eq!(cli.padding, 0);
        assert_eq!(cli.anim_delay, 250);
        assert_eq!(cli.scale, 2.0);
        assert_eq!(cli.backend, Backend::Auto);
        assert!(cli.montage.is_none());
    }

    #[test]
    fn test_value_names() {
        let cli = parse(&[
            "--fmt",
            "gif-anim",
            "--path-tiles",
            "fill-uniq",
            "--misc-edges",
            "arc",
            "--backend",
            "rsvg-convert",
            "--fontsize",
            "10",
            "--gridsize",
            "20",
            "a.txt",
            "b.txt",
        ]);
        assert_eq!(cli.format, OutputFormat::GifAnim);
        assert_eq!(cli.path_tiles, Some(BlockMode::FillUniq));
        assert_eq!(cli.misc_edges, Some(EdgeMode::Arc));
        assert_eq!(cli.backend, Backend::RsvgConvert);
        assert_eq!(cli.options().render.grid_size, 20);
        assert_eq!(cli.level_files.len(), 2);
    }

    #[test]
    fn test_requires_level_file() {
        assert!(Cli::try_parse_from(["level2image"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = Config::builtin().unwrap();
        let cli = parse(&[
            "--path-color",
            "blue",
            "--misc-blocks",
            "hatch",
            "--misc-edges-color",
            "green",
            "--edges-no-arrows",
            "lvl.txt",
        ]);
        let styles = cli.styles(&config).unwrap();
        let path = styles.get(GROUP_PATH);
        assert_eq!(path.edge_color, "blue");
        assert_eq!(path.block_color, "blue");
        assert!(!path.arrows);
        let misc = styles.get(GROUP_MISC);
        assert_eq!(misc.blocks, BlockMode::Hatch);
        assert_eq!(misc.edge_color, "green");
        assert_eq!(misc.block_color, "darkgoldenrod");
        assert!(!misc.arrows);
    }

    #[test]
    fn test_config_defaults_without_flags() {
        let config = Config::builtin().unwrap();
        let styles = parse(&["lvl.txt"]).styles(&config).unwrap();
        assert_eq!(styles.get(GROUP_PATH).edges, EdgeMode::Line);
        assert_eq!(styles.get(GROUP_PATH).blocks, BlockMode::Fill);
        assert_eq!(styles.get(GROUP_MISC).blocks, BlockMode::Outline);
        assert!(styles.get(GROUP_PATH).arrows);
    }
}
