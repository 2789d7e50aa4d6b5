//! SVG to PDF/PNG conversion backends and animated GIF assembly
//!
//! The built-in backend renders with resvg; external command backends
//! (`rsvg-convert`, `cairosvg`) are used as fallbacks or on request.

mod animation;
mod command;
mod native;

use crate::error::ConvertError;
use clap::ValueEnum;
use tracing::warn;

pub use animation::encode_animation;
pub use command::CommandConverter;
pub use native::ResvgConverter;

/// Something able to turn an SVG document into PDF or PNG bytes
pub trait Converter {
    fn name(&self) -> &'static str;

    fn to_pdf(&self, svg: &str) -> Result<Vec<u8>, ConvertError>;

    /// Render to an opaque PNG on white, scaled by `scale`
    fn to_png(&self, svg: &str, scale: f32) -> Result<Vec<u8>, ConvertError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Try every backend in order of preference
    Auto,
    Resvg,
    RsvgConvert,
    Cairosvg,
}

/// Build the converter for a backend choice
pub fn converter(backend: Backend) -> Box<dyn Converter> {
    match backend {
        Backend::Auto => Box::new(Fallback::new(vec![
            Box::new(ResvgConverter::new()),
            Box::new(CommandConverter::rsvg_convert()),
            Box::new(CommandConverter::cairosvg()),
        ])),
        Backend::Resvg => Box::new(ResvgConverter::new()),
        Backend::RsvgConvert => Box::new(CommandConverter::rsvg_convert()),
        Backend::Cairosvg => Box::new(CommandConverter::cairosvg()),
    }
}

/// Tries each backend in turn until one succeeds
pub struct Fallback {
    backends: Vec<Box<dyn Converter>>,
}

impl Fallback {
    pub fn new(backends: Vec<Box<dyn Converter>>) -> Self {
        Self { backends }
    }

    fn first_success(
        &self,
        format: &'static str,
        run: impl Fn(&dyn Converter) -> Result<Vec<u8>, ConvertError>,
    ) -> Result<Vec<u8>, ConvertError> {
        let mut attempts = Vec::new();
        for backend in &self.backends {
            match run(backend.as_ref()) {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    warn!(" - {} could not produce {}: {}", backend.name(), format, e);
                    attempts.push(e.to_string());
                }
            }
        }
        Err(ConvertError::Exhausted { format, attempts })
    }
}

impl Converter for Fallback {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn to_pdf(&self, svg: &str) -> Result<Vec<u8>, ConvertError> {
        self.first_success("pdf", |c| c.to_pdf(svg))
    }

    fn to_png(&self, svg: &str, scale: f32) -> Result<Vec<u8>, ConvertError> {
        self.first_success("png", |c| c.to_png(svg, scale))
    }
}
