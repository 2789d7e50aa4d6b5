//! Conversion driver: loops over level files, renders them and writes
//! the requested output format.

use crate::config::Config;
use crate::convert::{self, Backend, Converter};
use crate::error::{Error, Result};
use crate::level::{Level, read_level};
use crate::render::{
    Backdrop, EmbeddedImage, LevelSvg, RenderOptions, Renderer, Styles, TileImages,
    inferred_background, montage,
};
use clap::ValueEnum;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Svg,
    Pdf,
    Png,
    GifAnim,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Png => "png",
            OutputFormat::GifAnim => "gif",
        }
    }
}

/// Everything a run needs besides the config and styles
#[derive(Debug, Clone)]
pub struct Options {
    pub level_files: Vec<PathBuf>,
    pub format: OutputFormat,
    pub stdout: bool,
    pub render: RenderOptions,
    pub no_background: bool,
    pub background: Option<PathBuf>,
    pub anim_delay: u32,
    pub scale: f32,
    pub backend: Backend,
    pub montage: Option<usize>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            level_files: Vec::new(),
            format: OutputFormat::Pdf,
            stdout: false,
            render: RenderOptions::default(),
            no_background: false,
            background: None,
            anim_delay: 250,
            scale: 2.0,
            backend: Backend::Auto,
            montage: None,
        }
    }
}

impl Options {
    /// Reject flag combinations before any file is touched
    pub fn validate(&self) -> Result<()> {
        if self.level_files.is_empty() {
            return Err(Error::Usage("no level files given".to_string()));
        }
        if self.stdout && self.format != OutputFormat::Svg {
            return Err(Error::Usage(format!(
                "--stdout only works with svg output, not {}",
                self.format.extension()
            )));
        }
        if self.montage.is_some() && self.format == OutputFormat::GifAnim {
            return Err(Error::Usage(
                "--montage cannot be combined with gif-anim".to_string(),
            ));
        }
        if self.montage == Some(0) {
            return Err(Error::Usage("--montage needs at least one column".to_string()));
        }
        if self.render.grid_size == 0 {
            return Err(Error::Usage("--gridsize must be positive".to_string()));
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(Error::Usage("--scale must be positive".to_string()));
        }
        Ok(())
    }
}

/// `<level>` with its last suffix replaced by `.out.<tag>`
pub fn output_path(level_path: &Path, tag: &str) -> PathBuf {
    level_path.with_extension(format!("out.{}", tag))
}

/// Render every level and write the results.
///
/// SVG written with `stdout` goes to `out`; everything else goes to files
/// next to the level files. Returns the paths written.
pub fn run(
    options: &Options,
    config: &Config,
    styles: &Styles,
    out: &mut impl Write,
) -> Result<Vec<PathBuf>> {
    options.validate()?;

    let renderer = Renderer::new(config, styles, options.render);
    let mut converter: Option<Box<dyn Converter>> = None;
    let mut written = Vec::new();
    let mut rendered = Vec::new();

    for level_path in &options.level_files {
        info!("processing {}", level_path.display());
        let level = read_level(level_path)?;
        for w in &level.warnings {
            warn!("{}: {}", level_path.display(), w);
        }

        let backdrop = backdrop_for(options, config, &level, level_path)?;
        let svg = renderer.render(&level, &backdrop);
        for w in &svg.warnings {
            warn!("{}: {}", level_path.display(), w);
        }

        match (options.montage, options.format) {
            (None, OutputFormat::GifAnim) | (Some(_), _) => rendered.push(svg),
            (None, format) => {
                let target = output_path(level_path, format.extension());
                if let Some(path) = emit(options, &mut converter, &svg, &target, out)? {
                    written.push(path);
                }
            }
        }
    }

    let Some(first) = options.level_files.first() else {
        return Ok(written);
    };

    if let Some(columns) = options.montage {
        let gap = f64::from(options.render.grid_size);
        if let Some(sheet) = montage(&rendered, columns, gap) {
            info!("combining {} levels into a montage", rendered.len());
            let target = output_path(first, &format!("montage.{}", options.format.extension()));
            if let Some(path) = emit(options, &mut converter, &sheet, &target, out)? {
                written.push(path);
            }
        }
    } else if options.format == OutputFormat::GifAnim {
        let converter = converter.get_or_insert_with(|| convert::converter(options.backend));
        let frames = rendered
            .iter()
            .map(|svg| converter.to_png(&svg.to_document(), options.scale))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let gif = convert::encode_animation(&frames, options.anim_delay)?;
        let target = output_path(first, "anim.gif");
        write_file(&target, &gif)?;
        written.push(target);
    }

    Ok(written)
}

fn backdrop_for(
    options: &Options,
    config: &Config,
    level: &Level,
    level_path: &Path,
) -> Result<Backdrop> {
    if options.no_background {
        return Ok(Backdrop::Grid(TileImages::default()));
    }
    let image = options
        .background
        .clone()
        .or_else(|| inferred_background(level_path));
    match image {
        Some(path) => {
            info!(" - using background {}", path.display());
            Ok(Backdrop::Image(EmbeddedImage::load(&path)?))
        }
        None => Ok(Backdrop::Grid(TileImages::load(config, level)?)),
    }
}

/// Write one document in the requested format; `None` when it went to `out`
fn emit(
    options: &Options,
    converter: &mut Option<Box<dyn Converter>>,
    svg: &LevelSvg,
    target: &Path,
    out: &mut impl Write,
) -> Result<Option<PathBuf>> {
    let document = svg.to_document();
    if options.stdout {
        out.write_all(document.as_bytes())
            .map_err(|source| Error::Write {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
        return Ok(None);
    }

    let bytes = match options.format {
        OutputFormat::Svg => document.into_bytes(),
        OutputFormat::Pdf => converter
            .get_or_insert_with(|| convert::converter(options.backend))
            .to_pdf(&document)?,
        OutputFormat::Png => converter
            .get_or_insert_with(|| convert::converter(options.backend))
            .to_png(&document, options.scale)?,
        OutputFormat::GifAnim => {
            return Err(Error::Usage("gif-anim has no single-document output".to_string()));
        }
    };
    write_file(target, &bytes)?;
    Ok(Some(target.to_path_buf()))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    info!("writing {}", path.display());
    std::fs::write(path, bytes).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("a/lvl.txt"), "pdf"),
            PathBuf::from("a/lvl.out.pdf")
        );
        assert_eq!(
            output_path(Path::new("a/lvl.txt"), "montage.svg"),
            PathBuf::from("a/lvl.out.montage.svg")
        );
        assert_eq!(
            output_path(Path::new("noext"), "svg"),
            PathBuf::from("noext.out.svg")
        );
        assert_eq!(
            output_path(Path::new("dir/x.y.lvl"), "anim.gif"),
            PathBuf::from("dir/x.y.out.anim.gif")
        );
    }

    fn options(format: OutputFormat) -> Options {
        Options {
            level_files: vec![PathBuf::from("lvl.txt")],
            format,
            ..Options::default()
        }
    }

    #[test]
    fn test_stdout_requires_svg() {
        let mut o = options(OutputFormat::Pdf);
        o.stdout = true;
        assert!(matches!(o.validate(), Err(Error::Usage(_))));
        o.format = OutputFormat::Svg;
        assert!(o.validate().is_ok());
    }

    #[test]
    fn test_montage_rejects_gif() {
        let mut o = options(OutputFormat::GifAnim);
        o.montage = Some(2);
        assert!(matches!(o.validate(), Err(Error::Usage(_))));
        o.format = OutputFormat::Png;
        assert!(o.validate().is_ok());
        o.montage = Some(0);
        assert!(o.validate().is_err());
    }

    #[test]
    fn test_requires_levels_and_sizes() {
        let mut o = options(OutputFormat::Svg);
        o.level_files.clear();
        assert!(o.validate().is_err());

        let mut o = options(OutputFormat::Svg);
        o.render.grid_size = 0;
        assert!(o.validate().is_err());

        let mut o = options(OutputFormat::Png);
        o.scale = 0.0;
        assert!(o.validate().is_err());
    }

    #[test]
    fn test_usage_error_before_reading() {
        // Missing file is never opened when the flags are inconsistent
        let mut o = options(OutputFormat::Png);
        o.stdout = true;
        let config = Config::builtin().unwrap();
        let styles = Styles::from_config(&config).unwrap();
        let mut out = Vec::new();
        let err = run(&o, &config, &styles, &mut out).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_level_file() {
        let o = options(OutputFormat::Svg);
        let config = Config::builtin().unwrap();
        let styles = Styles::from_config(&config).unwrap();
        let err = run(&o, &config, &styles, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
