use super::background::{Backdrop, EmbeddedImage, TileImages};
use super::geometry::{EdgeGeometry, Layout, needs_arc};
use super::style::{BlockMode, EdgeMode, GroupStyle, Styles};
use crate::config::Config;
use crate::level::{Edge, Level, Rect, Shape, ShapeKind};
use quick_xml::escape::escape;
use std::collections::BTreeMap;
use tracing::info;

/// Format a number with 6 decimal places, treating -0 as 0
pub(crate) fn f(n: f64) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{:.6}", n)
}

/// Format a number with 2 decimal places, treating -0 as 0
fn f2(n: f64) -> String {
    let s = format!("{:.2}", n);
    if s == "-0.00" { "0.00".to_string() } else { s }
}

/// Box-drawing glyphs drawn as two segments through the cell center:
/// `(x_from, y_from, x_to, y_to)` as fractions of the cell
fn box_segments(ch: char) -> Option<(f64, f64, f64, f64)> {
    match ch {
        '─' => Some((0.0, 0.5, 1.0, 0.5)),
        '│' => Some((0.5, 0.0, 0.5, 1.0)),
        '┐' => Some((0.5, 1.0, 0.0, 0.5)),
        '┘' => Some((0.0, 0.5, 0.5, 0.0)),
        '└' => Some((0.5, 0.0, 1.0, 0.5)),
        '┌' => Some((1.0, 0.5, 0.5, 1.0)),
        _ => None,
    }
}

/// Pattern id for a hatch color; every non-alphanumeric byte is hex-encoded
fn hatch_id(color: &str) -> String {
    let mut id = String::from("hatch-");
    for b in color.bytes() {
        if b.is_ascii_alphanumeric() {
            id.push(b as char);
        } else {
            id.push_str(&format!("x{:02x}", b));
        }
    }
    id
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub grid_size: u32,
    pub padding: u32,
    pub font_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            grid_size: 11,
            padding: 0,
            font_size: 8,
        }
    }
}

/// A rendered level: document size, shared definitions and drawing body
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSvg {
    pub width: f64,
    pub height: f64,
    pub font_size: u32,
    /// `<defs>` children keyed by element id
    pub defs: BTreeMap<String, String>,
    pub body: String,
    pub warnings: Vec<String>,
}

impl LevelSvg {
    pub fn to_document(&self) -> String {
        let mut out = format!(
            "<svg viewBox=\"0 0 {} {}\" version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" font-family=\"Courier, monospace\" font-size=\"{}pt\">\n",
            f(self.width),
            f(self.height),
            self.font_size
        );

        if !self.defs.is_empty() {
            out.push_str("  <defs>\n");
            for def in self.defs.values() {
                out.push_str("    ");
                out.push_str(def);
                out.push('\n');
            }
            out.push_str("  </defs>\n");
        }

        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

/// Output being assembled for one level
#[derive(Default)]
struct Canvas {
    body: String,
    defs: BTreeMap<String, String>,
    log: Vec<String>,
}

impl Canvas {
    fn line(&mut self, element: &str) {
        self.body.push_str("  ");
        self.body.push_str(element);
        self.body.push('\n');
    }
}

/// Renders parsed levels into SVG
pub struct Renderer<'a> {
    config: &'a Config,
    styles: &'a Styles,
    options: RenderOptions,
    layout: Layout,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a Config, styles: &'a Styles, options: RenderOptions) -> Self {
        Self {
            config,
            styles,
            options,
            layout: Layout::new(options.grid_size, options.padding),
        }
    }

    pub fn render(&self, level: &Level, backdrop: &Backdrop) -> LevelSvg {
        let g = self.layout.grid;
        let pad = self.layout.padding;
        let grid_w = level.columns() as f64 * g;
        let grid_h = level.rows.len() as f64 * g;

        let mut canvas = Canvas::default();

        match backdrop {
            Backdrop::Image(image) => {
                info!(" - adding background image");
                self.draw_background(image, grid_w, grid_h, &mut canvas);
            }
            Backdrop::Grid(tiles) => self.draw_grid(level, tiles, &mut canvas),
        }

        self.draw_tiles(level, &mut canvas);
        self.draw_lines(level, &mut canvas);
        self.draw_rects(level, &mut canvas);
        self.draw_paths(level, &mut canvas);

        LevelSvg {
            width: grid_w + 2.0 * pad,
            height: grid_h + 2.0 * pad,
            font_size: self.options.font_size,
            defs: canvas.defs,
            body: canvas.body,
            warnings: canvas.log,
        }
    }

    fn draw_background(&self, image: &EmbeddedImage, w: f64, h: f64, canvas: &mut Canvas) {
        let pad = self.layout.padding;
        canvas.line(&format!(
            "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" xlink:href=\"{}\"/>",
            pad,
            pad,
            w,
            h,
            image.data_uri()
        ));
    }

    fn draw_grid(&self, level: &Level, tiles: &TileImages, canvas: &mut Canvas) {
        let g = self.layout.grid;
        let pad = self.layout.padding;

        for (row_idx, row) in level.rows.iter().enumerate() {
            for (col_idx, ch) in row.chars().enumerate() {
                let x = col_idx as f64 * g + pad;
                let top = row_idx as f64 * g + pad;
                let baseline = top + g - 1.0;

                if let Some(tile) = tiles.get(ch) {
                    canvas.line(&format!(
                        "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" xlink:href=\"{}\"/>",
                        x,
                        top,
                        g,
                        g,
                        tile.data_uri()
                    ));
                    continue;
                }

                let color = escape(self.config.color_for(ch));

                if let Some((x0, y0, x1, y1)) = box_segments(ch) {
                    canvas.line(&format!(
                        "<path d=\"M {} {} L {} {} L {} {}\" stroke=\"{}\" stroke-width=\"1\" stroke-linecap=\"round\" fill=\"none\"/>",
                        f2(x + g * x0),
                        f2(top + g * y0),
                        f2(x + g * 0.5),
                        f2(top + g * 0.5),
                        f2(x + g * x1),
                        f2(top + g * y1),
                        color
                    ));
                } else if !ch.is_whitespace() {
                    let mut buf = [0u8; 4];
                    canvas.line(&format!(
                        "<text x=\"{}\" y=\"{}\" dominant-baseline=\"middle\" text-anchor=\"middle\" fill=\"{}\" style=\"fill-opacity:1\">{}</text>",
                        f(x + 0.5 * g),
                        f(baseline - 0.34 * g),
                        color,
                        escape(&*ch.encode_utf8(&mut buf))
                    ));
                }

                canvas.line(&format!(
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" style=\"stroke:none;fill:{};fill-opacity:0.3\"/>",
                    x, top, g, g, color
                ));
            }
        }
    }

    fn draw_tiles(&self, level: &Level, canvas: &mut Canvas) {
        for geom in level.geoms_of(ShapeKind::Tiles) {
            let Shape::Tiles(tiles) = &geom.shape else {
                continue;
            };
            let style = self.styles.get(&geom.group);
            if style.blocks == BlockMode::None {
                continue;
            }

            info!(" - adding tiles {}", geom.group);
            let mut drawn = Vec::new();
            for tile in tiles {
                self.block(&Rect::tile(*tile), style, &mut drawn, canvas);
            }
        }
    }

    fn draw_lines(&self, level: &Level, canvas: &mut Canvas) {
        let path_edges = self.drawn_path_edges(level);

        for geom in level.geoms_of(ShapeKind::Lines) {
            let Shape::Lines(edges) = &geom.shape else {
                continue;
            };
            let style = self.styles.get(&geom.group);
            if style.edges == EdgeMode::None {
                continue;
            }

            info!(" - adding edges {}", geom.group);
            for edge in edges {
                if path_edges.contains(edge) {
                    continue;
                }
                self.edge(edge, style, edges, false, false, canvas);
            }
        }
    }

    fn draw_rects(&self, level: &Level, canvas: &mut Canvas) {
        for geom in level.geoms_of(ShapeKind::Rects) {
            let Shape::Rects(rects) = &geom.shape else {
                continue;
            };
            let style = self.styles.get(&geom.group);
            if style.blocks == BlockMode::None {
                continue;
            }

            info!(" - adding blocks {}", geom.group);
            let mut drawn = Vec::new();
            for rect in rects {
                self.block(rect, style, &mut drawn, canvas);
            }
        }
    }

    fn draw_paths(&self, level: &Level, canvas: &mut Canvas) {
        for geom in level.geoms_of(ShapeKind::Path) {
            let Shape::Path(path) = &geom.shape else {
                continue;
            };
            let style = self.styles.get(&geom.group);
            if style.edges == EdgeMode::None || path.is_empty() {
                continue;
            }

            info!(" - adding path {}", geom.group);
            let edges = path.edges();
            let last = edges.len().saturating_sub(1);
            for (i, edge) in edges.iter().enumerate() {
                self.edge(edge, style, &edges, i == 0, i == last, canvas);
            }
        }
    }

    /// Edges of every path that will be drawn
    fn drawn_path_edges(&self, level: &Level) -> Vec<Edge> {
        level
            .geoms_of(ShapeKind::Path)
            .filter(|geom| self.styles.get(&geom.group).edges != EdgeMode::None)
            .flat_map(|geom| match &geom.shape {
                Shape::Path(path) => path.edges(),
                _ => Vec::new(),
            })
            .collect()
    }

    fn block(&self, rect: &Rect, style: &GroupStyle, drawn: &mut Vec<[f64; 4]>, canvas: &mut Canvas) {
        let (r0, c0, rsz, csz) = (rect.r0, rect.c0, rect.rows(), rect.cols());

        if rsz == 0.0 && csz == 0.0 {
            canvas.log.push(format!(
                "skipping zero-size rect: {} {} {} {}",
                f(r0),
                f(c0),
                f(rsz),
                f(csz)
            ));
            return;
        }

        let key = [r0, c0, rsz, csz];
        if style.blocks == BlockMode::FillUniq && drawn.contains(&key) {
            return;
        }
        drawn.push(key);

        let g = self.layout.grid;
        let pad = self.layout.padding;
        let inset = match style.blocks {
            BlockMode::Fill | BlockMode::FillUniq => 0.0,
            _ => 0.5,
        };

        // Spans collapsing to nothing become a thin sliver centered on the span
        let mut x0 = c0 * g + inset + pad;
        let mut xsz = csz * g - 2.0 * inset;
        if xsz <= 0.0 {
            x0 = (c0 + 0.5 * (csz - 0.01)) * g + pad;
            xsz = 0.01;
        }
        let mut y0 = r0 * g + inset + pad;
        let mut ysz = rsz * g - 2.0 * inset;
        if ysz <= 0.0 {
            y0 = (r0 + 0.5 * (rsz - 0.01)) * g + pad;
            ysz = 0.01;
        }

        let color = escape(&style.block_color);
        let rect_with = |css: &str| {
            format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" style=\"{}\"/>",
                f(x0),
                f(y0),
                f(xsz),
                f(ysz),
                css
            )
        };

        match style.blocks {
            BlockMode::None => {}
            BlockMode::Fill | BlockMode::FillUniq => {
                canvas.line(&rect_with(&format!(
                    "stroke:none;fill:{};fill-opacity:0.3",
                    color
                )));
            }
            BlockMode::Outline => {
                canvas.line(&rect_with(&format!("stroke:{};fill:none", color)));
            }
            BlockMode::Hatch => {
                let id = hatch_id(&style.block_color);
                canvas.defs.entry(id.clone()).or_insert_with(|| {
                    format!(
                        "<pattern id=\"{}\" patternUnits=\"userSpaceOnUse\" width=\"3\" height=\"3\" patternTransform=\"rotate(45)\"><line x1=\"0\" y1=\"0\" x2=\"0\" y2=\"3\" stroke=\"{}\" stroke-width=\"1\"/></pattern>",
                        id, color
                    )
                });
                canvas.line(&rect_with(&format!(
                    "stroke:{};fill:url(#{})",
                    color, id
                )));
            }
            BlockMode::Border => {
                let (x1, y1) = (x0 + xsz, y0 + ysz);
                let sides = style.sides;
                let mut d = Vec::new();
                if sides.left {
                    d.push(format!("M {} {} L {} {}", f2(x0), f2(y0), f2(x0), f2(y1)));
                }
                if sides.top {
                    d.push(format!("M {} {} L {} {}", f2(x0), f2(y0), f2(x1), f2(y0)));
                }
                if sides.right {
                    d.push(format!("M {} {} L {} {}", f2(x1), f2(y0), f2(x1), f2(y1)));
                }
                if sides.bottom {
                    d.push(format!("M {} {} L {} {}", f2(x0), f2(y1), f2(x1), f2(y1)));
                }
                if !d.is_empty() {
                    canvas.line(&format!(
                        "<path d=\"{}\" stroke=\"{}\" stroke-width=\"1\" stroke-linecap=\"square\" fill=\"none\"/>",
                        d.join(" "),
                        color
                    ));
                }
            }
        }
    }

    fn edge(
        &self,
        edge: &Edge,
        style: &GroupStyle,
        avoid: &[Edge],
        from_dot: bool,
        to_dot: bool,
        canvas: &mut Canvas,
    ) {
        let Some(geo) = EdgeGeometry::new(&self.layout, edge) else {
            canvas.log.push(format!(
                "skipping zero-length edge: {} {} {} {}",
                f(edge.from.r),
                f(edge.from.c),
                f(edge.to.r),
                f(edge.to.c)
            ));
            return;
        };

        let color = escape(&style.edge_color);

        if from_dot {
            canvas.line(&format!(
                "<circle cx=\"{}\" cy=\"{}\" r=\"2\" stroke=\"none\" fill=\"{}\"/>",
                f2(geo.x1),
                f2(geo.y1),
                color
            ));
        }
        if to_dot {
            canvas.line(&format!(
                "<circle cx=\"{}\" cy=\"{}\" r=\"2\" stroke=\"none\" fill=\"{}\"/>",
                f2(geo.x2),
                f2(geo.y2),
                color
            ));
        }

        let as_arc = needs_arc(edge, avoid, style.edges == EdgeMode::Arc);

        if style.arrows {
            canvas.line(&format!(
                "<g transform=\"translate({} {}) rotate({})\"><polygon points=\"0 0, -4 -2, -4 2\" stroke=\"none\" fill=\"{}\"/></g>",
                f2(geo.x2),
                f2(geo.y2),
                f2(geo.arrow_angle(as_arc)),
                color
            ));
        }

        let dash = if style.dashed {
            " stroke-dasharray=\"3 2\""
        } else {
            ""
        };
        let stroke = format!(
            "stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"round\"{}",
            color,
            style.stroke_width(),
            dash
        );

        if as_arc {
            let (cx, cy) = geo.control();
            canvas.line(&format!(
                "<path d=\"M {} {} Q {} {} {} {}\" {} fill=\"none\"/>",
                f2(geo.x1),
                f2(geo.y1),
                f2(cx),
                f2(cy),
                f2(geo.x2),
                f2(geo.y2),
                stroke
            ));
        } else {
            canvas.line(&format!(
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" {}/>",
                f2(geo.x1),
                f2(geo.y1),
                f2(geo.x2),
                f2(geo.y2),
                stroke
            ));
        }
    }
}
