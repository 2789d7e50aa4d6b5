//! Level file parsing
//!
//! A level file is a text grid annotated with `META` lines describing
//! geometry (paths, edges, blocks, tiles) and `REM` comment lines.

pub mod parser;
pub mod types;

pub use parser::{GROUP_MISC, GROUP_PATH, parse_geom_record, parse_level, parse_tuples, read_level};
pub use types::*;
