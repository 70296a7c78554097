//! # CLI Module
//!
//! Command-line interface for rasterplot:
//! - Argument parsing with clap
//! - Configuration file loading (JSON/YAML) with `RASTERPLOT_` environment variables
//! - Merging of command-line options over the configuration file
//! - Shell completion generation

use crate::config::PlotConfig;
use crate::error::ConfigError;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::io::Write;
use std::path::PathBuf;

/// Contour plots of ASCII grid rasters
#[derive(Parser, Debug)]
#[command(name = "rasterplot")]
#[command(about = "Create contour plots of raster files (multiple files can be specified)")]
#[command(version)]
#[command(long_about = "
rasterplot draws filled contour plots of ASCII grid raster files.

The first five header lines of each file are ignored; the last token of the
sixth line is the nodata value. Cells holding the nodata value are left blank.

EXAMPLES:
  # Show a raster
  rasterplot dem.asc

  # Save plots of a series without displaying them
  rasterplot -s -o runs/dem_*.asc

  # Absolute difference from a reference, fixed color range
  rasterplot -o -s -d dem_000.asc -a --min 0 --max 5 dem_100.asc

  # Animated GIF of a series (needs ImageMagick)
  rasterplot -s -o -g --delay 40 runs/dem_*.asc

  # Using a config file
  rasterplot --config plot.yaml
")]
pub struct Cli {
    /// Raster files to plot
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Plot on a logarithmic scale (default is linear)
    #[arg(short = 'l', long)]
    pub logscale: bool,

    /// Save each image to <file name>.png
    #[arg(short = 's', long)]
    pub save: bool,

    /// Don't display the plots
    #[arg(short = 'o', long)]
    pub offline: bool,

    /// Plot the difference from this raster
    #[arg(short = 'd', long, value_name = "FILE")]
    pub diff: Option<PathBuf>,

    /// Plot absolute values
    #[arg(short = 'a', long)]
    pub abs: bool,

    /// Lower bound of the color scale
    #[arg(long, allow_negative_numbers = true)]
    pub min: Option<f64>,

    /// Upper bound of the color scale
    #[arg(long, allow_negative_numbers = true)]
    pub max: Option<f64>,

    /// Merge the saved images into an animated GIF (requires --save)
    #[arg(short = 'g', long)]
    pub gif: bool,

    /// Delay between GIF frames, in hundredths of a second [default: 20]
    #[arg(long)]
    pub delay: Option<u32>,

    /// Directory for saved images [default: .]
    #[arg(long, env = "RASTERPLOT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Number of contour levels on a linear scale [default: 10]
    #[arg(long)]
    pub levels: Option<usize>,

    /// Image width in pixels [default: 1200]
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels [default: 800]
    #[arg(long)]
    pub height: Option<u32>,

    /// Image conversion command used to build the GIF [default: convert]
    #[arg(long, env = "RASTERPLOT_GIF_TOOL")]
    pub gif_tool: Option<String>,

    /// Image viewer command [default: platform opener]
    #[arg(long, env = "RASTERPLOT_VIEWER")]
    pub viewer: Option<String>,

    /// Configuration file path (JSON or YAML)
    #[arg(short = 'c', long, env = "RASTERPLOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Quiet mode - suppress all output except errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Builds the job configuration: the config file (if any) with the
    /// command-line options on top. Flags set in either place stay set.
    pub fn to_config(&self) -> Result<PlotConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => PlotConfig::from_file(path)?,
            None => PlotConfig::default(),
        };
        Ok(self.merge_into(base))
    }

    fn merge_into(&self, base: PlotConfig) -> PlotConfig {
        PlotConfig {
            files: if self.files.is_empty() {
                base.files
            } else {
                self.files.clone()
            },
            logscale: self.logscale || base.logscale,
            save: self.save || base.save,
            offline: self.offline || base.offline,
            diff: self.diff.clone().or(base.diff),
            abs: self.abs || base.abs,
            min: self.min.or(base.min),
            max: self.max.or(base.max),
            gif: self.gif || base.gif,
            delay: self.delay.unwrap_or(base.delay),
            output_dir: self.output_dir.clone().unwrap_or(base.output_dir),
            levels: self.levels.unwrap_or(base.levels),
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            gif_tool: self.gif_tool.clone().unwrap_or(base.gif_tool),
            viewer: self.viewer.clone().or(base.viewer),
        }
    }
}

/// Writes completions for `shell` to `out`.
pub fn write_completions<W: Write>(shell: Shell, out: &mut W) {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, out);
}
