//! # level2image
//!
//! Renders annotated text level files to SVG, PDF, PNG or animated GIF.
//!
//! ## Features
//!
//! - **Level parsing**: grid rows plus `META` geometry annotations (paths,
//!   lines, blocks, tiles), in the legacy tagged form or as JSON records
//! - **SVG rendering**: colored character grid or background image, with
//!   styled geometry groups, arcs that avoid overlapping edges and arrowheads
//! - **Conversion**: PDF and PNG through resvg/svg2pdf or external tools,
//!   montages of several levels and animated GIFs
//!
//! ## Example
//!
//! ```rust,ignore
//! use level2image::{Config, Renderer, RenderOptions, Styles, parse_level};
//! use level2image::render::{Backdrop, TileImages};
//!
//! let level = parse_level(&std::fs::read_to_string("lvl.txt").unwrap()).unwrap();
//! let config = Config::builtin().unwrap();
//! let styles = Styles::from_config(&config).unwrap();
//! let svg = Renderer::new(&config, &styles, RenderOptions::default())
//!     .render(&level, &Backdrop::Grid(TileImages::default()));
//! std::fs::write("lvl.out.svg", svg.to_document()).unwrap();
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod level;
pub mod render;

// Re-export commonly used items
pub use app::{Options, OutputFormat, output_path};
pub use cli::Cli;
pub use config::Config;
pub use error::{Error, Result};
pub use level::{Level, parse_level, read_level};
pub use render::{LevelSvg, RenderOptions, Renderer, Styles};
