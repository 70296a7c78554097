//! # Renderer Module
//!
//! Draws a transformed grid as a filled contour plot with plotters and writes
//! it to a PNG. Each cell is filled with the color of its level band, cells are
//! kept square, row 0 sits at the bottom, and a color bar labelled with the
//! level boundaries is drawn to the right.
//!
//! Displaying a plot is delegated to an external image viewer.

use crate::animate::split_command;
use crate::colorscale::{Bounds, ColorScale, ScaleMode};
use crate::error::RenderError;
use log::{debug, warn};
use ndarray::Array2;
use plotters::prelude::*;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process::Command;

const TITLE_FONT_SIZE: u32 = 24;
const LABEL_AREA: u32 = 50;
const MARGIN: u32 = 15;
const COLORBAR_WIDTH: u32 = 140;

/// Everything the renderer needs besides the grid itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub mode: ScaleMode,
    pub bounds: Bounds,
    pub levels: usize,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: ScaleMode::Linear,
            bounds: Bounds::default(),
            levels: 10,
            width: 1200,
            height: 800,
        }
    }
}

fn drawing_err<E: Display>(e: E) -> RenderError {
    RenderError::Drawing(e.to_string())
}

/// Path of the saved image for `input`: `<out_dir>/<file name>.png`.
///
/// The input's extension is kept, so `dem.asc` becomes `dem.asc.png`.
pub fn saved_image_path(input: &Path, out_dir: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| input.as_os_str().to_os_string());
    name.push(".png");
    out_dir.join(name)
}

/// Renders `data` as a filled contour plot into the PNG at `path`.
///
/// Plot resources are released when this returns.
///
/// # Errors
///
/// - [`RenderError::EmptyGrid`] if `data` has no cells
/// - [`RenderError::NoPositiveData`] on a log scale with nothing positive
/// - [`RenderError::Drawing`] if plotters fails to draw or encode
pub fn render_png(
    data: &Array2<f64>,
    title: &str,
    options: &RenderOptions,
    path: &Path,
) -> Result<ColorScale, RenderError> {
    let (nrows, ncols) = data.dim();
    if nrows == 0 || ncols == 0 {
        return Err(RenderError::EmptyGrid(title.to_string()));
    }

    let scale = ColorScale::new(data, options.mode, options.bounds, options.levels, title)?;
    debug!("{}: color levels {:?}", title, scale.levels());

    let root = BitMapBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing_err)?;
    let root = root
        .titled(title, ("sans-serif", TITLE_FONT_SIZE))
        .map_err(drawing_err)?;

    let (area_width, _) = root.dim_in_pixel();
    let (plot_area, colorbar_area) =
        root.split_horizontally(area_width.saturating_sub(COLORBAR_WIDTH));
    let plot_area = equal_aspect(plot_area, nrows, ncols);

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(MARGIN)
        .x_label_area_size(LABEL_AREA)
        .y_label_area_size(LABEL_AREA)
        .build_cartesian_2d(0f64..ncols as f64, 0f64..nrows as f64)
        .map_err(drawing_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(8)
        .y_labels(8)
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_label_formatter(&|y| format!("{:.0}", y))
        .draw()
        .map_err(drawing_err)?;

    chart
        .draw_series(data.indexed_iter().filter_map(|((row, col), &value)| {
            let color = scale.color_of(value)?;
            let (x, y) = (col as f64, row as f64);
            Some(Rectangle::new([(x, y), (x + 1.0, y + 1.0)], color.filled()))
        }))
        .map_err(drawing_err)?;

    draw_colorbar(&colorbar_area, &scale)?;

    root.present().map_err(drawing_err)?;
    Ok(scale)
}

/// Shrinks `area` so that grid cells come out square, centring the result.
fn equal_aspect<DB: DrawingBackend>(
    area: DrawingArea<DB, plotters::coord::Shift>,
    nrows: usize,
    ncols: usize,
) -> DrawingArea<DB, plotters::coord::Shift> {
    let (width, height) = area.dim_in_pixel();
    let chrome = LABEL_AREA + 2 * MARGIN;
    let inner_w = width.saturating_sub(chrome) as f64;
    let inner_h = height.saturating_sub(chrome) as f64;
    let cell = (inner_w / ncols as f64).min(inner_h / nrows as f64);
    if cell <= 0.0 {
        return area;
    }

    let target_w = (cell * ncols as f64).round() as u32 + chrome;
    let target_h = (cell * nrows as f64).round() as u32 + chrome;
    let offset_x = width.saturating_sub(target_w) / 2;
    let offset_y = height.saturating_sub(target_h) / 2;
    area.shrink((offset_x, offset_y), (target_w.min(width), target_h.min(height)))
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    scale: &ColorScale,
) -> Result<(), RenderError> {
    let bands = scale.band_count() as i32;
    let levels = scale.levels();

    let mut bar = ChartBuilder::on(area)
        .margin(MARGIN)
        .margin_top(MARGIN + LABEL_AREA / 2)
        .margin_bottom(MARGIN + LABEL_AREA)
        .set_label_area_size(LabelAreaPosition::Right, 80)
        .build_cartesian_2d(0i32..1i32, 0i32..bands)
        .map_err(drawing_err)?;

    let label = |y: &i32| {
        levels
            .get(*y as usize)
            .map(|v| scale.format_level(*v))
            .unwrap_or_default()
    };
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(levels.len())
        .y_label_formatter(&label)
        .draw()
        .map_err(drawing_err)?;

    bar.draw_series((0..bands).map(|band| {
        Rectangle::new(
            [(0, band), (1, band + 1)],
            scale.band_color(band as usize).filled(),
        )
    }))
    .map_err(drawing_err)?;

    Ok(())
}

/// The platform's default image opener.
pub fn default_viewer() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    }
}

/// Opens `image` in `viewer` and waits for the viewer command to return.
///
/// A viewer that cannot be launched is an error; one that exits non-zero is
/// only logged.
pub fn show(image: &Path, viewer: &str) -> Result<(), RenderError> {
    let (program, args) = split_command(viewer).ok_or_else(|| {
        RenderError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "empty viewer command",
        ))
    })?;

    debug!("Opening {} with {}", image.display(), viewer);
    let status = Command::new(program).args(args).arg(image).status()?;
    if !status.success() {
        warn!("Viewer '{}' exited with {}", viewer, status);
    }
    Ok(())
}

/// Renders into a temporary PNG that outlives this process, for display.
pub fn render_temp_png(
    data: &Array2<f64>,
    title: &str,
    options: &RenderOptions,
) -> Result<PathBuf, RenderError> {
    let temp = tempfile::Builder::new()
        .prefix("rasterplot-")
        .suffix(".png")
        .tempfile()?;
    let path = temp.into_temp_path().keep().map_err(std::io::Error::from)?;
    render_png(data, title, options, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::tempdir;

    fn small_options() -> RenderOptions {
        RenderOptions {
            width: 400,
            height: 300,
            ..RenderOptions::default()
        }
    }

    #[test]
    fn test_saved_image_path_keeps_extension() {
        let path = saved_image_path(Path::new("data/foo.txt"), Path::new("."));
        assert_eq!(path, PathBuf::from("./foo.txt.png"));

        let path = saved_image_path(Path::new("/abs/dem.asc"), Path::new("out"));
        assert_eq!(path, PathBuf::from("out/dem.asc.png"));
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("grid.png");
        let data = array![[1.0, 2.0, 3.0], [4.0, f64::NAN, 6.0]];

        let scale = render_png(&data, "grid.asc", &small_options(), &out).unwrap();
        assert_eq!(scale.band_count(), 10);

        let bytes = std::fs::read(&out).unwrap();
        assert!(bytes.len() > 8);
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_render_log_scale() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("log.png");
        let data = array![[1.0, 10.0], [1000.0, -5.0]];
        let options = RenderOptions {
            mode: ScaleMode::Log,
            ..small_options()
        };

        let scale = render_png(&data, "log", &options, &out).unwrap();
        assert_eq!(scale.levels(), &[1.0, 10.0, 100.0, 1000.0]);
        assert!(out.exists());
    }

    #[test]
    fn test_render_empty_grid() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("empty.png");
        let data = Array2::<f64>::zeros((0, 0));
        let err = render_png(&data, "empty", &small_options(), &out).unwrap_err();
        assert!(matches!(err, RenderError::EmptyGrid(_)));
    }

    #[test]
    fn test_show_rejects_empty_viewer() {
        assert!(show(Path::new("x.png"), "  ").is_err());
    }
}
