/// A grid coordinate, `r` rows down and `c` columns across.
///
/// Coordinates are fractional: annotations may address cell centers,
/// corners or anything in between.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Point {
    pub r: f64,
    pub c: f64,
}

impl Point {
    pub fn new(r: f64, c: f64) -> Self {
        Self { r, c }
    }
}

/// Directed edge between two grid coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub from: Point,
    pub to: Point,
}

impl Edge {
    pub fn new(r1: f64, c1: f64, r2: f64, c2: f64) -> Self {
        Self {
            from: Point::new(r1, c1),
            to: Point::new(r2, c2),
        }
    }

    pub fn reversed(&self) -> Edge {
        Edge {
            from: self.to,
            to: self.from,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.from == self.to
    }

    /// Tuple form `(r1, c1, r2, c2)`, used for lexicographic ordering.
    pub fn key(&self) -> [f64; 4] {
        [self.from.r, self.from.c, self.to.r, self.to.c]
    }
}

/// Grid-aligned block from corner `(r0, c0)` to corner `(r1, c1)` (end exclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub r0: f64,
    pub c0: f64,
    pub r1: f64,
    pub c1: f64,
}

impl Rect {
    pub fn new(r0: f64, c0: f64, r1: f64, c1: f64) -> Self {
        Self { r0, c0, r1, c1 }
    }

    /// Single-cell block at a tile position
    pub fn tile(at: Point) -> Self {
        Self::new(at.r, at.c, at.r + 1.0, at.c + 1.0)
    }

    pub fn rows(&self) -> f64 {
        self.r1 - self.r0
    }

    pub fn cols(&self) -> f64 {
        self.c1 - self.c0
    }
}

/// Ordered point sequence, possibly broken into disconnected sub-paths
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub subpaths: Vec<Vec<Point>>,
}

impl Path {
    /// Rebuild a path from a list of edges.
    ///
    /// An edge starting where the previous one ended continues the current
    /// sub-path; anything else starts a new one.
    pub fn from_edges(edges: &[Edge]) -> Self {
        let mut subpaths: Vec<Vec<Point>> = Vec::new();

        for edge in edges {
            match subpaths.last_mut() {
                Some(current) if current.last() == Some(&edge.from) => current.push(edge.to),
                _ => subpaths.push(vec![edge.from, edge.to]),
            }
        }

        Self { subpaths }
    }

    /// Consecutive point pairs of every sub-path, in drawing order
    pub fn edges(&self) -> Vec<Edge> {
        self.subpaths
            .iter()
            .flat_map(|points| {
                points.windows(2).map(|pair| Edge {
                    from: pair[0],
                    to: pair[1],
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.iter().all(|points| points.len() < 2)
    }
}

/// Drawing primitive set carried by one annotation
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Path(Path),
    Lines(Vec<Edge>),
    Rects(Vec<Rect>),
    Tiles(Vec<Point>),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Path(_) => ShapeKind::Path,
            Shape::Lines(_) => ShapeKind::Lines,
            Shape::Rects(_) => ShapeKind::Rects,
            Shape::Tiles(_) => ShapeKind::Tiles,
        }
    }
}

/// Shape kinds, ordered by drawing layer (tiles first, paths on top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeKind {
    Tiles,
    Lines,
    Rects,
    Path,
}

/// Primitive set tagged with the style group it is drawn with
#[derive(Debug, Clone, PartialEq)]
pub struct Geom {
    pub group: String,
    pub shape: Shape,
}

impl Geom {
    pub fn new(group: impl Into<String>, shape: Shape) -> Self {
        Self {
            group: group.into(),
            shape,
        }
    }
}

/// Parsed level file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Level {
    /// Visual grid rows, in file order
    pub rows: Vec<String>,
    pub geoms: Vec<Geom>,
    /// Non-fatal parse diagnostics
    pub warnings: Vec<String>,
}

impl Level {
    /// Width of the widest row, in characters
    pub fn columns(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0)
    }

    pub fn geoms_of(&self, kind: ShapeKind) -> impl Iterator<Item = &Geom> {
        self.geoms.iter().filter(move |g| g.shape.kind() == kind)
    }
}
