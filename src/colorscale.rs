//! # Color Scale Module
//!
//! Maps cell values to colors through a set of contour levels. The half-open
//! interval between two consecutive levels is a *band*; every value inside a
//! band gets the same color, which is what gives the plot its filled-contour
//! look.
//!
//! Two modes are supported:
//! - **Linear**: `n` equal-width bands between the bounds
//! - **Log**: one band per decade, bounds snapped to enclosing powers of ten;
//!   non-positive values have no band and are left blank
//!
//! The colormap is the diverging blue-white-red "seismic" palette.

use crate::error::RenderError;
use crate::raster::finite_range;
use colorgrad::{Gradient, LinearGradient};
use log::warn;
use ndarray::Array2;
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

/// Stops of the seismic colormap, dark blue to dark red through white.
const SEISMIC: [&str; 5] = ["#00004c", "#0000ff", "#ffffff", "#ff0000", "#800000"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    Linear,
    Log,
}

/// Optional explicit color-scale bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

pub struct ColorScale {
    mode: ScaleMode,
    levels: Vec<f64>,
    gradient: LinearGradient,
}

impl std::fmt::Debug for ColorScale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorScale")
            .field("mode", &self.mode)
            .field("levels", &self.levels)
            .finish()
    }
}

impl ColorScale {
    /// Builds the scale for `data`.
    ///
    /// `name` only appears in error messages.
    ///
    /// # Errors
    ///
    /// - [`RenderError::NoPositiveData`] in log mode when no cell is positive
    ///   and no positive bounds were given
    /// - [`RenderError::Colormap`] if the gradient cannot be built
    pub fn new(
        data: &Array2<f64>,
        mode: ScaleMode,
        bounds: Bounds,
        n_levels: usize,
        name: &str,
    ) -> Result<Self, RenderError> {
        let levels = match mode {
            ScaleMode::Linear => linear_levels(data, bounds, n_levels.max(1), name),
            ScaleMode::Log => log_levels(data, bounds, name)?,
        };

        let gradient = colorgrad::GradientBuilder::new()
            .html_colors(&SEISMIC)
            .build::<LinearGradient>()
            .map_err(|e| RenderError::Colormap(e.to_string()))?;

        Ok(ColorScale {
            mode,
            levels,
            gradient,
        })
    }

    pub fn mode(&self) -> ScaleMode {
        self.mode
    }

    /// Level boundaries, ascending. There is always at least one band.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn band_count(&self) -> usize {
        self.levels.len() - 1
    }

    /// Band index for `value`, or `None` for cells left blank.
    ///
    /// A value on a level boundary belongs to the band above it. Values
    /// outside the bounds are clamped into the first or last band.
    pub fn band_of(&self, value: f64) -> Option<usize> {
        if value.is_nan() || (self.mode == ScaleMode::Log && value <= 0.0) {
            return None;
        }
        let at_or_below = self.levels.partition_point(|&level| level <= value);
        Some(at_or_below.saturating_sub(1).min(self.band_count() - 1))
    }

    pub fn band_color(&self, band: usize) -> RGBColor {
        let t = (band as f32 + 0.5) / self.band_count() as f32;
        let [r, g, b, _] = self.gradient.at(t).to_rgba8();
        RGBColor(r, g, b)
    }

    pub fn color_of(&self, value: f64) -> Option<RGBColor> {
        self.band_of(value).map(|band| self.band_color(band))
    }

    /// Label text for a level boundary.
    pub fn format_level(&self, value: f64) -> String {
        match self.mode {
            ScaleMode::Log => format!("{:.0e}", value),
            ScaleMode::Linear => format_linear(value),
        }
    }
}

fn linear_levels(data: &Array2<f64>, bounds: Bounds, n_levels: usize, name: &str) -> Vec<f64> {
    let (data_min, data_max) = finite_range(data.iter().copied()).unwrap_or_else(|| {
        warn!("{} has no valid cells, using a [0, 1] color scale", name);
        (0.0, 1.0)
    });
    let mut lo = bounds.min.unwrap_or(data_min);
    let mut hi = bounds.max.unwrap_or(data_max);

    if hi == lo {
        let pad = (lo.abs() * 0.05).max(0.5);
        lo = (lo - pad).max(f64::MIN);
        hi = (hi + pad).min(f64::MAX);
    } else if hi < lo {
        hi = (lo + (lo.abs() * 0.05).max(0.5)).min(f64::MAX);
    }

    // `hi - lo` may overflow
    let n = n_levels as f64;
    let mut levels: Vec<f64> = (0..n_levels)
        .map(|i| {
            let t = i as f64 / n;
            lo * (1.0 - t) + hi * t
        })
        .collect();
    levels.push(hi);
    levels
}

fn log_levels(data: &Array2<f64>, bounds: Bounds, name: &str) -> Result<Vec<f64>, RenderError> {
    let positive = |v: Option<f64>, label: &str| match v {
        Some(x) if x > 0.0 => Some(x),
        Some(x) => {
            warn!("Ignoring non-positive {} bound {} on a log scale", label, x);
            None
        }
        None => None,
    };
    let explicit_min = positive(bounds.min, "minimum");
    let explicit_max = positive(bounds.max, "maximum");

    let data_range = finite_range(data.iter().copied().filter(|v| *v > 0.0));
    let (lo, hi) = match (explicit_min, explicit_max, data_range) {
        (Some(lo), Some(hi), _) => (lo, hi),
        (lo, hi, Some((dmin, dmax))) => (
            lo.unwrap_or_else(|| decade(dmin.log10().floor() as i32)),
            hi.unwrap_or_else(|| decade(dmax.log10().ceil() as i32)),
        ),
        (_, _, None) => return Err(RenderError::NoPositiveData(name.to_string())),
    };

    let hi = if hi > lo { hi } else { lo * 10.0 };
    // Decades stay within normal f64 exponents.
    let lo = lo.clamp(f64::MIN_POSITIVE, f64::MAX);
    let hi = hi.clamp(lo, f64::MAX);

    let mut levels = vec![lo];
    let first_decade = lo.log10().floor() as i32 + 1;
    let last_decade = hi.log10().ceil() as i32 - 1;
    for exp in first_decade..=last_decade {
        let level = decade(exp);
        if level > lo && level < hi {
            levels.push(level);
        }
    }
    levels.push(hi);
    Ok(levels)
}

/// `10^exp`, exact for the decades a raster realistically spans.
///
/// `exp` is limited to the normal `f64` exponent range.
fn decade(exp: i32) -> f64 {
    let exp = exp.clamp(f64::MIN_10_EXP, f64::MAX_10_EXP);
    if exp >= 0 {
        10f64.powi(exp)
    } else {
        1.0 / 10f64.powi(-exp)
    }
}

fn format_linear(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-2..1e4).contains(&magnitude) {
        return format!("{:.2e}", value);
    }
    let text = format!("{:.3}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
