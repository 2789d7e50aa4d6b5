//! Edge geometry: grid-to-canvas mapping, the arc-vs-line decision and
//! arrowhead orientation.

use crate::level::{Edge, Point};

/// Collinearity tolerance for [`is_between`]
const BETWEEN_EPSILON: f64 = 0.01;
/// Maximum bow of an arc, as a fraction of the grid size
const ARC_BOW: f64 = 0.75;
/// Edge lengths over which the arrow tangent blends from 0.6 to 1.0
const ARROW_BLEND_MIN_LEN: f64 = 10.0;
const ARROW_BLEND_MAX_LEN: f64 = 50.0;

pub fn distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}

fn point_distance(a: Point, b: Point) -> f64 {
    distance(a.r, a.c, b.r, b.c)
}

/// Whether `b` lies on the segment `a`-`c`, excluding either endpoint
pub fn is_between(a: Point, b: Point, c: Point) -> bool {
    if a == b || c == b {
        return false;
    }
    (point_distance(a, b) + point_distance(b, c) - point_distance(a, c)).abs() < BETWEEN_EPSILON
}

/// Decide whether an edge must be bowed into a curve.
///
/// An edge is drawn as an arc when `force` is set, when an endpoint of any
/// edge in `avoid` sits strictly inside it, or when its reverse is in `avoid`
/// and it sorts after that reverse (so exactly one of a bidirectional pair
/// bows).
pub fn needs_arc(edge: &Edge, avoid: &[Edge], force: bool) -> bool {
    if force {
        return true;
    }

    let reverse = edge.reversed();
    avoid.iter().any(|other| {
        is_between(edge.from, other.from, edge.to)
            || is_between(edge.from, other.to, edge.to)
            || (*other == reverse && edge.key() > reverse.key())
    })
}

/// Grid to canvas mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub grid: f64,
    pub padding: f64,
}

impl Layout {
    pub fn new(grid: u32, padding: u32) -> Self {
        Self {
            grid: grid as f64,
            padding: padding as f64,
        }
    }

    /// Canvas position of the center of grid coordinate `p`
    pub fn center(&self, p: Point) -> (f64, f64) {
        (
            (p.c + 0.5) * self.grid + self.padding,
            (p.r + 0.5) * self.grid + self.padding,
        )
    }
}

/// Canvas geometry of one edge, including its potential arc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeGeometry {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub mid_x: f64,
    pub mid_y: f64,
    /// Perpendicular bow offset, length `0.75 * grid`
    pub orth_x: f64,
    pub orth_y: f64,
}

impl EdgeGeometry {
    /// Compute geometry for a non-degenerate edge.
    ///
    /// Returns `None` when both endpoints coincide.
    pub fn new(layout: &Layout, edge: &Edge) -> Option<Self> {
        if edge.is_degenerate() {
            return None;
        }

        let (x1, y1) = layout.center(edge.from);
        let (x2, y2) = layout.center(edge.to);

        // Bow side depends on endpoint order so both directions of an edge
        // bow the same way.
        let (ox, oy) = if x1 < x2 {
            ((y2 - y1) / 4.0, (x1 - x2) / 4.0)
        } else {
            ((y1 - y2) / 4.0, (x2 - x1) / 4.0)
        };
        let len = distance(0.0, 0.0, ox, oy);
        let max = ARC_BOW * layout.grid;

        Some(Self {
            x1,
            y1,
            x2,
            y2,
            mid_x: (x1 + x2) / 2.0,
            mid_y: (y1 + y2) / 2.0,
            orth_x: ox / len * max,
            orth_y: oy / len * max,
        })
    }

    /// Quadratic Bézier control point of the arc
    pub fn control(&self) -> (f64, f64) {
        (self.mid_x + self.orth_x, self.mid_y + self.orth_y)
    }

    pub fn length(&self) -> f64 {
        distance(self.x1, self.y1, self.x2, self.y2)
    }

    /// Arrowhead rotation in degrees at the end point.
    ///
    /// For arcs the tangent is approximated by aiming from a point between
    /// the midpoint and the control point; longer arcs aim closer to the
    /// control point.
    pub fn arrow_angle(&self, as_arc: bool) -> f64 {
        let (dx, dy) = if as_arc {
            let blend = ((self.length() - ARROW_BLEND_MIN_LEN)
                / (ARROW_BLEND_MAX_LEN - ARROW_BLEND_MIN_LEN))
                .clamp(0.0, 1.0);
            let k = blend * 0.4 + 0.6;
            (
                self.x2 - (self.mid_x + k * self.orth_x),
                self.y2 - (self.mid_y + k * self.orth_y),
            )
        } else {
            (self.x2 - self.x1, self.y2 - self.y1)
        };
        dy.atan2(dx).to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(r: f64, c: f64) -> Point {
        Point::new(r, c)
    }

    #[test]
    fn test_is_between() {
        assert!(is_between(p(0.0, 0.0), p(0.0, 1.0), p(0.0, 2.0)));
        assert!(is_between(p(0.0, 0.0), p(1.0, 1.0), p(3.0, 3.0)));
        assert!(!is_between(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 2.0)));
        // Endpoints are not "between"
        assert!(!is_between(p(0.0, 0.0), p(0.0, 0.0), p(0.0, 2.0)));
        assert!(!is_between(p(0.0, 0.0), p(0.0, 2.0), p(0.0, 2.0)));
        // Collinear but outside the segment
        assert!(!is_between(p(0.0, 0.0), p(0.0, 3.0), p(0.0, 2.0)));
    }

    #[test]
    fn test_is_between_tolerance() {
        assert!(is_between(p(0.0, 0.0), p(0.001, 1.0), p(0.0, 2.0)));
        assert!(!is_between(p(0.0, 0.0), p(0.5, 1.0), p(0.0, 2.0)));
    }

    #[test]
    fn test_needs_arc_forced() {
        let e = Edge::new(0.0, 0.0, 0.0, 1.0);
        assert!(needs_arc(&e, &[], true));
        assert!(!needs_arc(&e, &[], false));
    }

    #[test]
    fn test_needs_arc_passing_through_point() {
        let long = Edge::new(0.0, 0.0, 0.0, 4.0);
        let avoid = [long, Edge::new(0.0, 2.0, 3.0, 2.0)];
        assert!(needs_arc(&long, &avoid, false));

        // Short edge ending on the long edge's interior does not contain it
        assert!(!needs_arc(&avoid[1], &avoid, false));
    }

    #[test]
    fn test_needs_arc_own_endpoints_ignored() {
        let e = Edge::new(0.0, 0.0, 0.0, 4.0);
        let next = Edge::new(0.0, 4.0, 2.0, 4.0);
        assert!(!needs_arc(&e, &[e, next], false));
    }

    #[test]
    fn test_needs_arc_reverse_pair() {
        let forward = Edge::new(0.0, 0.0, 0.0, 1.0);
        let backward = forward.reversed();
        let avoid = [forward, backward];
        // Exactly one of the pair bows: the one sorting after its reverse
        assert!(!needs_arc(&forward, &avoid, false));
        assert!(needs_arc(&backward, &avoid, false));
    }

    #[test]
    fn test_edge_geometry_straight() {
        let layout = Layout::new(10, 2);
        let geo = EdgeGeometry::new(&layout, &Edge::new(0.0, 0.0, 0.0, 2.0)).unwrap();
        assert_eq!((geo.x1, geo.y1), (7.0, 7.0));
        assert_eq!((geo.x2, geo.y2), (27.0, 7.0));
        assert_eq!(geo.length(), 20.0);
        assert_eq!(geo.arrow_angle(false), 0.0);
    }

    #[test]
    fn test_edge_geometry_degenerate() {
        let layout = Layout::new(10, 0);
        assert!(EdgeGeometry::new(&layout, &Edge::new(1.0, 1.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn test_bow_magnitude_and_side() {
        let layout = Layout::new(10, 0);
        let geo = EdgeGeometry::new(&layout, &Edge::new(0.0, 0.0, 0.0, 4.0)).unwrap();
        let bow = distance(0.0, 0.0, geo.orth_x, geo.orth_y);
        assert!((bow - 7.5).abs() < 1e-9);
        // Left-to-right horizontal edge bows upwards (negative y)
        assert!(geo.orth_y < 0.0);
        assert!(geo.orth_x.abs() < 1e-9);

        // The reverse edge bows to the same side
        let rev = EdgeGeometry::new(&layout, &Edge::new(0.0, 4.0, 0.0, 0.0)).unwrap();
        assert!((rev.orth_x - geo.orth_x).abs() < 1e-9);
        assert!((rev.orth_y - geo.orth_y).abs() < 1e-9);
        assert_eq!(geo.control(), (25.0, -2.5));
    }

    #[test]
    fn test_arrow_angle_on_arc() {
        let layout = Layout::new(10, 0);
        // Short arc (length 10): tangent aims from mid + 0.6 * orth
        let geo = EdgeGeometry::new(&layout, &Edge::new(0.0, 0.0, 0.0, 1.0)).unwrap();
        let expected = (geo.y2 - (geo.mid_y + 0.6 * geo.orth_y))
            .atan2(geo.x2 - (geo.mid_x + 0.6 * geo.orth_x))
            .to_degrees();
        assert!((geo.arrow_angle(true) - expected).abs() < 1e-9);

        // Long arc (length 100): tangent aims from the control point itself
        let geo = EdgeGeometry::new(&layout, &Edge::new(0.0, 0.0, 0.0, 10.0)).unwrap();
        let (cx, cy) = geo.control();
        let expected = (geo.y2 - cy).atan2(geo.x2 - cx).to_degrees();
        assert!((geo.arrow_angle(true) - expected).abs() < 1e-9);
        // Arrow dips down into the end point
        assert!(geo.arrow_angle(true) > 0.0);
    }
}
