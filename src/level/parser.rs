use super::types::*;
use crate::error::LevelError;
use serde::Deserialize;
use std::path::Path as FsPath;

const TAG_PATH_EDGES: &str = "META PATH EDGES:";
const TAG_PATH_TILES: &str = "META PATH TILES:";
const TAG_MISC_EDGES: &str = "META MISC EDGES:";
const TAG_MISC_BLOCKS: &str = "META MISC BLOCKS:";

pub const GROUP_PATH: &str = "path";
pub const GROUP_MISC: &str = "misc";

/// Parse a `;`-separated list of whitespace-separated numeric tuples.
///
/// Empty tuples (trailing `;`, blank annotation) are skipped. Every other
/// tuple must have exactly `arity` values.
pub fn parse_tuples(body: &str, arity: usize, line: usize) -> Result<Vec<Vec<f64>>, LevelError> {
    let mut tuples = Vec::new();

    for chunk in body.split(';') {
        let tokens: Vec<&str> = chunk.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() != arity {
            return Err(LevelError::Arity {
                line,
                expected: arity,
                found: tokens.len(),
            });
        }

        let values = tokens
            .iter()
            .map(|token| {
                token.parse::<f64>().map_err(|_| LevelError::InvalidNumber {
                    line,
                    token: token.to_string(),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        tuples.push(values);
    }

    Ok(tuples)
}

fn parse_edges(body: &str, line: usize) -> Result<Vec<Edge>, LevelError> {
    Ok(parse_tuples(body, 4, line)?
        .into_iter()
        .map(|t| Edge::new(t[0], t[1], t[2], t[3]))
        .collect())
}

fn parse_rects(body: &str, line: usize) -> Result<Vec<Rect>, LevelError> {
    Ok(parse_tuples(body, 4, line)?
        .into_iter()
        .map(|t| Rect::new(t[0], t[1], t[2], t[3]))
        .collect())
}

fn parse_points(body: &str, line: usize) -> Result<Vec<Point>, LevelError> {
    Ok(parse_tuples(body, 2, line)?
        .into_iter()
        .map(|t| Point::new(t[0], t[1]))
        .collect())
}

#[derive(Deserialize)]
struct GeomRecord {
    shape: ShapeName,
    #[serde(default = "default_group")]
    group: String,
    data: serde_json::Value,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum ShapeName {
    Path,
    Line,
    Rect,
    Tile,
}

fn default_group() -> String {
    GROUP_MISC.to_string()
}

/// Parse a JSON geometry record (the text after `META`).
///
/// Returns `Ok(None)` for well-formed records that are not geometry; the
/// caller reports those as warnings.
pub fn parse_geom_record(json: &str, line: usize) -> Result<Option<Geom>, LevelError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|source| LevelError::Record { line, source })?;

    match value.get("type").and_then(|t| t.as_str()) {
        Some("geom") => {}
        _ => return Ok(None),
    }

    let record: GeomRecord =
        serde_json::from_value(value).map_err(|source| LevelError::Record { line, source })?;

    let data = record.data;
    let shape = match record.shape {
        ShapeName::Path => {
            let subpaths: Vec<Vec<[f64; 2]>> = serde_json::from_value(data)
                .map_err(|source| LevelError::Record { line, source })?;
            Shape::Path(Path {
                subpaths: subpaths
                    .into_iter()
                    .map(|points| points.into_iter().map(|[r, c]| Point::new(r, c)).collect())
                    .collect(),
            })
        }
        ShapeName::Line => {
            let edges: Vec<[f64; 4]> = serde_json::from_value(data)
                .map_err(|source| LevelError::Record { line, source })?;
            Shape::Lines(
                edges
                    .into_iter()
                    .map(|[r1, c1, r2, c2]| Edge::new(r1, c1, r2, c2))
                    .collect(),
            )
        }
        ShapeName::Rect => {
            let rects: Vec<[f64; 4]> = serde_json::from_value(data)
                .map_err(|source| LevelError::Record { line, source })?;
            Shape::Rects(
                rects
                    .into_iter()
                    .map(|[r0, c0, r1, c1]| Rect::new(r0, c0, r1, c1))
                    .collect(),
            )
        }
        ShapeName::Tile => {
            let tiles: Vec<[f64; 2]> = serde_json::from_value(data)
                .map_err(|source| LevelError::Record { line, source })?;
            Shape::Tiles(tiles.into_iter().map(|[r, c]| Point::new(r, c)).collect())
        }
    };

    Ok(Some(Geom::new(record.group, shape)))
}

/// Parse the text of a level file
pub fn parse_level(text: &str) -> Result<Level, LevelError> {
    let mut level = Level::default();

    let mut path_edges_seen = false;
    let mut path_tiles_seen = false;
    // Legacy misc annotations accumulate into a single primitive set each
    let mut misc_lines: Option<usize> = None;
    let mut misc_rects: Option<usize> = None;

    for (idx, line) in text.lines().enumerate() {
        let lineno = idx + 1;

        if let Some(body) = line.strip_prefix(TAG_PATH_EDGES) {
            if path_edges_seen {
                return Err(LevelError::Duplicate {
                    line: lineno,
                    what: "path edges",
                });
            }
            path_edges_seen = true;
            let edges = parse_edges(body, lineno)?;
            level.geoms.push(Geom::new(
                GROUP_PATH,
                Shape::Path(Path::from_edges(&edges)),
            ));
            continue;
        }

        if let Some(body) = line.strip_prefix(TAG_PATH_TILES) {
            if path_tiles_seen {
                return Err(LevelError::Duplicate {
                    line: lineno,
                    what: "path tiles",
                });
            }
            path_tiles_seen = true;
            let tiles = parse_points(body, lineno)?;
            level
                .geoms
                .push(Geom::new(GROUP_PATH, Shape::Tiles(tiles)));
            continue;
        }

        if let Some(body) = line.strip_prefix(TAG_MISC_EDGES) {
            let edges = parse_edges(body, lineno)?;
            match misc_lines {
                Some(i) => {
                    if let Shape::Lines(existing) = &mut level.geoms[i].shape {
                        existing.extend(edges);
                    }
                }
                None => {
                    misc_lines = Some(level.geoms.len());
                    level.geoms.push(Geom::new(GROUP_MISC, Shape::Lines(edges)));
                }
            }
            continue;
        }

        if let Some(body) = line.strip_prefix(TAG_MISC_BLOCKS) {
            let rects = parse_rects(body, lineno)?;
            match misc_rects {
                Some(i) => {
                    if let Shape::Rects(existing) = &mut level.geoms[i].shape {
                        existing.extend(rects);
                    }
                }
                None => {
                    misc_rects = Some(level.geoms.len());
                    level.geoms.push(Geom::new(GROUP_MISC, Shape::Rects(rects)));
                }
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("META") {
            let rest = rest.trim_start();
            if rest.starts_with('{') {
                match parse_geom_record(rest, lineno)? {
                    Some(geom) => level.geoms.push(geom),
                    None => level
                        .warnings
                        .push(format!("unrecognized META record: {}", line)),
                }
            } else {
                level
                    .warnings
                    .push(format!("unrecognized META line: {}", line));
            }
            continue;
        }

        if line.starts_with("REM") {
            continue;
        }

        level.rows.push(line.to_string());
    }

    Ok(level)
}

/// Read and parse a level file from disk
pub fn read_level(path: &FsPath) -> crate::error::Result<Level> {
    let text = std::fs::read_to_string(path).map_err(|source| crate::error::Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_level(&text).map_err(|source| crate::error::Error::Level {
        path: path.to_path_buf(),
        source,
    })
}
