//! # rasterplot
//!
//! A Rust library and command-line tool for drawing filled contour plots of
//! ASCII grid raster files.
//!
//! ## Features
//!
//! - **Nodata handling**: cells equal to the header's nodata value are left blank
//! - **Differences**: plot each raster relative to a reference raster
//! - **Absolute values**: optionally plot `|value|`
//! - **Color scales**: linear or logarithmic, with optional fixed bounds
//! - **Batch output**: save PNGs and merge them into an animated GIF
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rasterplot::{run_plot_job, config::PlotConfig};
//! use std::path::PathBuf;
//!
//! let config = PlotConfig {
//!     files: vec![PathBuf::from("dem.asc")],
//!     save: true,
//!     offline: true,
//!     ..PlotConfig::default()
//! };
//! let report = run_plot_job(&config, false).expect("Failed to plot rasters");
//! println!("Saved {:?}", report.images);
//! ```

pub mod animate;
pub mod cli;
pub mod colorscale;
pub mod config;
pub mod error;
pub mod log;
pub mod raster;
pub mod render;
pub mod transform;

#[cfg(test)]
mod cli_tests;

use crate::animate::{FrameMerger, ImageMagickMerger};
use crate::config::PlotConfig;
use crate::error::{RasterError, Result};
use crate::raster::Raster;
use ::log::{debug, info, warn};
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array2;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// What a plotting job produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JobReport {
    /// Number of rasters plotted
    pub plotted: usize,
    /// Saved PNG files, in input order
    pub images: Vec<PathBuf>,
    /// Animated GIF, when one was assembled
    pub animation: Option<PathBuf>,
}

/// Runs a plotting job, merging GIF frames with the configured tool.
///
/// `show_progress` draws a progress bar over batches of more than one file.
/// See [`run_plot_job_with`].
pub fn run_plot_job(config: &PlotConfig, show_progress: bool) -> Result<JobReport> {
    let merger = ImageMagickMerger::new(config.gif_tool.clone());
    run_plot_job_with(config, &merger, show_progress)
}

/// Runs a plotting job.
///
/// This function orchestrates the whole pipeline:
/// 1. Validates the configuration
/// 2. Checks that every input (and the diff reference) exists
/// 3. Loads the diff reference once
/// 4. For each file: loads, transforms, renders, saves and/or displays
/// 5. Merges the saved images into a GIF when both `save` and `gif` are set
///
/// Files are processed in order and the first failure aborts the job.
///
/// # Errors
///
/// This function will return an error if:
/// - The configuration is invalid
/// - An input file is missing or malformed
/// - The diff reference has a different shape from an input
/// - A plot cannot be drawn or written
/// - The GIF tool fails
pub fn run_plot_job_with(
    config: &PlotConfig,
    merger: &dyn FrameMerger,
    show_progress: bool,
) -> Result<JobReport> {
    config.validate()?;
    check_inputs_exist(config)?;

    let diff = match &config.diff {
        Some(path) => {
            info!(
                "Plotting differences of rasters relative to '{}'",
                path.display()
            );
            Some(Raster::from_file(path)?)
        }
        None => None,
    };
    if config.abs {
        info!("Plotting absolute values");
    }
    if config.gif && !config.save {
        warn!("--gif has no effect without --save");
    }
    if config.save {
        fs::create_dir_all(&config.output_dir).map_err(|source| RasterError::Io {
            path: config.output_dir.clone(),
            source,
        })?;
    }

    let progress = if show_progress && config.files.len() > 1 {
        let bar = ProgressBar::new(config.files.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let mut frames = Vec::with_capacity(config.files.len());
    for file in &config.files {
        progress.set_message(file.display().to_string());
        frames.push(plot_file(file, config, diff.as_ref())?);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let animation = if config.wants_animation() {
        animate::assemble(&frames, &config.output_dir, config.delay, merger)?
    } else {
        None
    };

    Ok(JobReport {
        plotted: frames.len(),
        images: frames.into_iter().flatten().collect(),
        animation,
    })
}

/// Fails with [`RasterError::NotFound`] for the first path that does not exist.
fn check_inputs_exist(config: &PlotConfig) -> std::result::Result<(), RasterError> {
    config
        .diff
        .iter()
        .chain(config.files.iter())
        .find(|path| !path.exists())
        .map_or(Ok(()), |missing| Err(RasterError::NotFound(missing.clone())))
}

/// Loads `file` and applies the diff/abs transforms, returning the raster
/// together with the values to plot.
pub fn load_plot_data(
    file: &Path,
    diff: Option<&Raster>,
    abs: bool,
) -> Result<(Raster, Array2<f64>)> {
    let raster = Raster::from_file(file)?;
    let data = transform::apply(&raster, diff, abs)?;

    if let Some(reference) = diff {
        let cmp = transform::separation(&raster, reference)?;
        info!(
            "Separation from '{}': {:.6} (max |diff| {:.6} over {} cells)",
            reference.name(),
            cmp.separation,
            cmp.max_abs_diff,
            cmp.compared_cells
        );
    }
    Ok((raster, data))
}

/// Plots one file. Returns the saved image path when saving is enabled.
fn plot_file(file: &Path, config: &PlotConfig, diff: Option<&Raster>) -> Result<Option<PathBuf>> {
    info!("Plotting file: {}", file.display());
    let (raster, data) = load_plot_data(file, diff, config.abs)?;
    let options = config.render_options();

    let saved = if config.save {
        let path = render::saved_image_path(file, &config.output_dir);
        info!("Saving plot to: {}", path.display());
        render::render_png(&data, raster.name(), &options, &path)?;
        Some(path)
    } else {
        None
    };

    if !config.offline {
        let image = match &saved {
            Some(path) => path.clone(),
            None => render::render_temp_png(&data, raster.name(), &options)?,
        };
        render::show(&image, config.viewer_command())?;
    } else if saved.is_none() {
        debug!("{}: offline and not saving, nothing to draw", file.display());
    }

    Ok(saved)
}
