//! # Plot Configuration Module
//!
//! [`PlotConfig`] holds every option of a plotting job. It can be built from
//! command-line arguments (see [`crate::cli`]) or loaded from a JSON or YAML
//! file; the command line overrides the file.
//!
//! ## Example Configuration
//!
//! ```yaml
//! files:
//!   - runs/dem_001.asc
//!   - runs/dem_002.asc
//! diff: runs/dem_000.asc
//! abs: true
//! save: true
//! offline: true
//! gif: true
//! delay: 40
//! output_dir: plots
//! ```

use crate::animate::DEFAULT_DELAY;
use crate::colorscale::{Bounds, ScaleMode};
use crate::error::ConfigError;
use crate::render::{RenderOptions, default_viewer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Smallest accepted image edge, in pixels.
pub const MIN_IMAGE_SIZE: u32 = 200;

/// Options for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Rasters to plot, in order
    pub files: Vec<PathBuf>,
    /// Logarithmic color scale
    pub logscale: bool,
    /// Save each plot as `<file name>.png`
    pub save: bool,
    /// Do not display plots
    pub offline: bool,
    /// Plot differences relative to this raster
    pub diff: Option<PathBuf>,
    /// Plot absolute values
    pub abs: bool,
    /// Lower color-scale bound
    pub min: Option<f64>,
    /// Upper color-scale bound
    pub max: Option<f64>,
    /// Merge saved images into an animated GIF
    pub gif: bool,
    /// GIF frame delay, hundredths of a second
    pub delay: u32,
    /// Directory for saved images and the GIF
    pub output_dir: PathBuf,
    /// Number of contour levels on a linear scale
    pub levels: usize,
    pub width: u32,
    pub height: u32,
    /// Image conversion command used for the GIF
    pub gif_tool: String,
    /// Image viewer command; the platform opener when unset
    pub viewer: Option<String>,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            logscale: false,
            save: false,
            offline: false,
            diff: None,
            abs: false,
            min: None,
            max: None,
            gif: false,
            delay: DEFAULT_DELAY,
            output_dir: PathBuf::from("."),
            levels: 10,
            width: 1200,
            height: 800,
            gif_tool: "convert".to_string(),
            viewer: None,
        }
    }
}

impl PlotConfig {
    /// Loads a configuration file. `.yaml`/`.yml` files are read as YAML,
    /// anything else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Checks value ranges. Does not touch the filesystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.files.is_empty() {
            return Err(ConfigError::Invalid("no input files given".to_string()));
        }
        let bounds = [self.min, self.max];
        if let Some(bound) = bounds.into_iter().flatten().find(|b| !b.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "color-scale bound {} is not a finite number",
                bound
            )));
        }
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min >= max
        {
            return Err(ConfigError::Invalid(format!(
                "minimum bound ({}) must be less than maximum bound ({})",
                min, max
            )));
        }
        if self.levels == 0 {
            return Err(ConfigError::Invalid(
                "number of levels must be at least 1".to_string(),
            ));
        }
        if self.width < MIN_IMAGE_SIZE || self.height < MIN_IMAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "image size {}x{} is too small (minimum {} pixels per side)",
                self.width, self.height, MIN_IMAGE_SIZE
            )));
        }
        if self.gif && self.gif_tool.trim().is_empty() {
            return Err(ConfigError::Invalid("GIF tool command is empty".to_string()));
        }
        Ok(())
    }

    pub fn scale_mode(&self) -> ScaleMode {
        if self.logscale {
            ScaleMode::Log
        } else {
            ScaleMode::Linear
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            mode: self.scale_mode(),
            bounds: Bounds {
                min: self.min,
                max: self.max,
            },
            levels: self.levels,
            width: self.width,
            height: self.height,
        }
    }

    pub fn viewer_command(&self) -> &str {
        self.viewer.as_deref().unwrap_or(default_viewer())
    }

    /// Whether the GIF stage runs: both `save` and `gif` must be set.
    pub fn wants_animation(&self) -> bool {
        self.save && self.gif
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn with_files() -> PlotConfig {
        PlotConfig {
            files: vec![PathBuf::from("a.asc")],
            ..PlotConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = PlotConfig::default();
        assert_eq!(config.delay, 20);
        assert_eq!(config.levels, 10);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.gif_tool, "convert");
        assert!(!config.wants_animation());
    }

    #[test]
    fn test_from_json_partial() {
        let json = r#"{ "files": ["x.asc", "y.asc"], "logscale": true, "min": 0.1 }"#;
        let config = PlotConfig::from_json(json).unwrap();
        assert_eq!(config.files.len(), 2);
        assert!(config.logscale);
        assert_eq!(config.min, Some(0.1));
        assert_eq!(config.delay, 20);
        assert_eq!(config.scale_mode(), ScaleMode::Log);
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plot.yaml");
        fs::write(
            &path,
            "files: [dem.asc]\nsave: true\ngif: true\ndelay: 50\noutput_dir: frames\n",
        )
        .unwrap();

        let config = PlotConfig::from_file(&path).unwrap();
        assert_eq!(config.files, vec![PathBuf::from("dem.asc")]);
        assert!(config.wants_animation());
        assert_eq!(config.delay, 50);
        assert_eq!(config.output_dir, PathBuf::from("frames"));
    }

    #[test]
    fn test_from_file_missing() {
        let err = PlotConfig::from_file("/no/such/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PlotConfig::from_json("{ files: }").unwrap_err(),
            ConfigError::Json(_)
        ));
    }

    #[test]
    fn test_validate() {
        assert!(with_files().validate().is_ok());
        assert!(PlotConfig::default().validate().is_err());

        let bounds = PlotConfig {
            min: Some(5.0),
            max: Some(5.0),
            ..with_files()
        };
        assert!(bounds.validate().is_err());

        let levels = PlotConfig {
            levels: 0,
            ..with_files()
        };
        assert!(levels.validate().is_err());

        let infinite = PlotConfig {
            max: Some(f64::INFINITY),
            ..with_files()
        };
        assert!(infinite.validate().is_err());

        let tiny = PlotConfig {
            width: 10,
            ..with_files()
        };
        assert!(tiny.validate().is_err());
    }

    #[test]
    fn test_render_options() {
        let config = PlotConfig {
            min: Some(-1.0),
            max: Some(1.0),
            levels: 6,
            ..with_files()
        };
        let options = config.render_options();
        assert_eq!(options.mode, ScaleMode::Linear);
        assert_eq!(options.bounds.min, Some(-1.0));
        assert_eq!(options.bounds.max, Some(1.0));
        assert_eq!(options.levels, 6);
    }

    #[test]
    fn test_viewer_command() {
        assert_eq!(PlotConfig::default().viewer_command(), default_viewer());
        let config = PlotConfig {
            viewer: Some("feh -Z".to_string()),
            ..PlotConfig::default()
        };
        assert_eq!(config.viewer_command(), "feh -Z");
    }
}
