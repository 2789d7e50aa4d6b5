use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a level file
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("line {line}: multiple {what} found")]
    Duplicate { line: usize, what: &'static str },

    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: expected {expected} values per tuple, found {found}")]
    Arity {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid geometry record: {source}")]
    Record {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while loading the JSON config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown {what} '{value}' in group '{group}'")]
    InvalidStyle {
        group: String,
        what: &'static str,
        value: String,
    },
}

/// Errors raised by SVG conversion backends
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{backend} is not available: {reason}")]
    Unavailable {
        backend: &'static str,
        reason: String,
    },

    #[error("{backend} failed: {message}")]
    Failed {
        backend: &'static str,
        message: String,
    },

    #[error("no backend could produce {format}: {}", .attempts.join("; "))]
    Exhausted {
        format: &'static str,
        attempts: Vec<String>,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("GIF encoding failed: {0}")]
    Gif(#[from] gif::EncodingError),

    #[error("animation frame of {width}x{height} is too large for GIF")]
    FrameTooLarge { width: u32, height: u32 },

    #[error("animation has no frames")]
    NoFrames,
}

/// Top-level error for a conversion run
#[derive(Debug, Error)]
pub enum Error {
    #[error("{path}: {source}")]
    Level {
        path: PathBuf,
        #[source]
        source: LevelError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("background image '{path}': {message}")]
    Background { path: PathBuf, message: String },

    #[error("{0}")]
    Usage(String),
}

impl Error {
    /// Process exit code for this failure class
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Usage(_) => 1,
            Error::Read { .. } | Error::Config(_) | Error::Background { .. } => 2,
            Error::Level { .. } => 3,
            Error::Write { .. } => 4,
            Error::Convert(_) => 5,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
