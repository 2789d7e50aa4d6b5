//! Level to SVG rendering
//!
//! Draws the character grid (or a background image), then the level
//! geometry in layers: tiles, lines, blocks and finally paths.

pub mod background;
pub mod geometry;
pub mod montage;
pub mod style;
pub mod svg;

pub use background::{Backdrop, EmbeddedImage, TileImages, inferred_background};
pub use montage::montage;
pub use style::{BlockMode, EdgeMode, GroupStyle, Sides, Styles};
pub use svg::{LevelSvg, RenderOptions, Renderer};
