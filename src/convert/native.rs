use super::Converter;
use crate::error::ConvertError;
use resvg::tiny_skia::{Color, Pixmap, Transform};
use std::sync::{Arc, OnceLock};
use usvg::fontdb;

const NAME: &str = "resvg";

/// In-process renderer built on usvg/resvg, with svg2pdf for PDF output
#[derive(Default)]
pub struct ResvgConverter {
    fonts: OnceLock<Arc<fontdb::Database>>,
}

impl ResvgConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// System fonts, loaded on first use
    fn fonts(&self) -> Arc<fontdb::Database> {
        self.fonts
            .get_or_init(|| {
                let mut db = fontdb::Database::new();
                db.load_system_fonts();
                Arc::new(db)
            })
            .clone()
    }

    fn parse(&self, svg: &str) -> Result<usvg::Tree, ConvertError> {
        let mut opt = usvg::Options::default();
        opt.fontdb = self.fonts();
        usvg::Tree::from_str(svg, &opt).map_err(|e| ConvertError::Failed {
            backend: NAME,
            message: format!("invalid SVG: {}", e),
        })
    }
}

impl Converter for ResvgConverter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn to_pdf(&self, svg: &str) -> Result<Vec<u8>, ConvertError> {
        let tree = self.parse(svg)?;
        svg2pdf::to_pdf(
            &tree,
            svg2pdf::ConversionOptions::default(),
            svg2pdf::PageOptions::default(),
        )
        .map_err(|e| ConvertError::Failed {
            backend: NAME,
            message: format!("{:?}", e),
        })
    }

    fn to_png(&self, svg: &str, scale: f32) -> Result<Vec<u8>, ConvertError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ConvertError::Failed {
                backend: NAME,
                message: format!("invalid scale {}", scale),
            });
        }

        let tree = self.parse(svg)?;
        let size = tree.size();
        let width = (size.width() * scale).ceil().max(1.0) as u32;
        let height = (size.height() * scale).ceil().max(1.0) as u32;

        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| ConvertError::Failed {
            backend: NAME,
            message: format!("cannot allocate {}x{} surface", width, height),
        })?;
        pixmap.fill(Color::WHITE);
        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

        pixmap.encode_png().map_err(|e| ConvertError::Failed {
            backend: NAME,
            message: format!("PNG encoding failed: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="6"><rect x="0" y="0" width="5" height="6" fill="black"/></svg>"#;

    #[test]
    fn test_png_scaled_on_white() {
        let png = ResvgConverter::new().to_png(SQUARE, 2.0).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (20, 12));
        assert_eq!(img.get_pixel(2, 2).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(18, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_pdf_header() {
        let pdf = ResvgConverter::new().to_pdf(SQUARE).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_invalid_svg() {
        let err = ResvgConverter::new().to_png("not svg", 1.0).unwrap_err();
        assert!(matches!(err, ConvertError::Failed { backend: "resvg", .. }));
    }

    #[test]
    fn test_invalid_scale() {
        assert!(ResvgConverter::new().to_png(SQUARE, 0.0).is_err());
    }
}
