//! # Error Types
//!
//! Each pipeline stage has its own error enum; [`PlotError`] gathers them so the
//! orchestration code can use `?` across stages.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading an ASCII grid raster
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Raster file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid raster header in {name}: {message}")]
    Header { name: String, message: String },

    #[error("Invalid number '{token}' in {name} at line {line}: {source}")]
    Parse {
        name: String,
        line: usize,
        token: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("Row {row} of {name} has {found} values, expected {expected}")]
    Ragged {
        name: String,
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Errors raised by the per-cell transforms
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Shape mismatch: raster is {left:?} but diff reference is {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
}

/// Errors raised while drawing or displaying a plot
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing error: {0}")]
    Drawing(String),

    #[error("Logarithmic scale requested but {0} has no positive values")]
    NoPositiveData(String),

    #[error("Cannot render an empty raster: {0}")]
    EmptyGrid(String),

    #[error("Colormap error: {0}")]
    Colormap(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while assembling the animated GIF
#[derive(Error, Debug)]
pub enum AnimateError {
    #[error("Failed to launch '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{tool}' exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Invalid plot configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level error for a plotting job
#[derive(Error, Debug)]
pub enum PlotError {
    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Animate(#[from] AnimateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for plotting jobs
pub type Result<T> = std::result::Result<T, PlotError>;
