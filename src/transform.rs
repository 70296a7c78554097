//! # Transform Module
//!
//! Per-cell transforms applied between loading and rendering: subtraction of a
//! diff reference raster and absolute value. Also provides a summary of how far
//! apart two rasters are.

use crate::error::TransformError;
use crate::raster::Raster;
use ndarray::{Array2, Zip};
use serde::Serialize;

/// Applies the configured transforms to a loaded raster.
///
/// The diff reference is subtracted first, then the absolute value is taken.
/// `NaN` cells stay `NaN`.
///
/// # Errors
///
/// Returns [`TransformError::ShapeMismatch`] if `diff` has a different shape.
pub fn apply(
    raster: &Raster,
    diff: Option<&Raster>,
    abs: bool,
) -> Result<Array2<f64>, TransformError> {
    let mut data = raster.data().clone();

    if let Some(reference) = diff {
        check_shapes(raster, reference)?;
        data -= reference.data();
    }

    if abs {
        data.mapv_inplace(f64::abs);
    }

    Ok(data)
}

fn check_shapes(left: &Raster, right: &Raster) -> Result<(), TransformError> {
    if left.shape() != right.shape() {
        return Err(TransformError::ShapeMismatch {
            left: left.shape(),
            right: right.shape(),
        });
    }
    Ok(())
}

/// Distance between two rasters over the cells valid in both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    /// Euclidean norm of the cell-wise difference
    pub separation: f64,
    /// Largest absolute cell-wise difference
    pub max_abs_diff: f64,
    /// Number of cells finite in both rasters
    pub compared_cells: usize,
}

/// Compares two rasters of the same shape.
pub fn separation(a: &Raster, b: &Raster) -> Result<Comparison, TransformError> {
    check_shapes(a, b)?;

    let mut sum = 0.0;
    let mut max_abs_diff: f64 = 0.0;
    let mut compared_cells = 0;
    Zip::from(a.data()).and(b.data()).for_each(|&x, &y| {
        if x.is_finite() && y.is_finite() {
            let d = x - y;
            sum += d * d;
            max_abs_diff = max_abs_diff.max(d.abs());
            compared_cells += 1;
        }
    });

    Ok(Comparison {
        separation: sum.sqrt(),
        max_abs_diff,
        compared_cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(rows: &str) -> Raster {
        let text = format!("ncols 2\nnrows 2\nx 0\ny 0\ncellsize 1\nNODATA_value -9999\n{}", rows);
        Raster::from_str_named(&text, "test").unwrap()
    }

    #[test]
    fn test_no_transform_is_identity() {
        let g = raster("1 -2\n3 4\n");
        let out = apply(&g, None, false).unwrap();
        assert_eq!(out, g.data().clone());
    }

    #[test]
    fn test_diff_subtracts_elementwise() {
        let g = raster("5 1\n3 10\n");
        let d = raster("2 4\n3 1\n");
        let out = apply(&g, Some(&d), false).unwrap();
        assert_eq!(out[[0, 0]], 3.0);
        assert_eq!(out[[0, 1]], -3.0);
        assert_eq!(out[[1, 0]], 0.0);
        assert_eq!(out[[1, 1]], 9.0);
    }

    #[test]
    fn test_diff_then_abs() {
        let g = raster("5 1\n3 10\n");
        let d = raster("2 4\n3 1\n");
        let out = apply(&g, Some(&d), true).unwrap();
        assert_eq!(out[[0, 1]], 3.0);
        assert!(out.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_nan_propagates() {
        let g = raster("-9999 1\n3 10\n");
        let d = raster("2 4\n-9999 1\n");
        let out = apply(&g, Some(&d), true).unwrap();
        assert!(out[[0, 0]].is_nan());
        assert!(out[[1, 0]].is_nan());
        assert_eq!(out[[1, 1]], 9.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let g = raster("1 2\n3 4\n");
        let text = "a\nb\nc\nd\ne\nNODATA_value -1\n1 2 3\n";
        let d = Raster::from_str_named(text, "wide").unwrap();
        let err = apply(&g, Some(&d), false).unwrap_err();
        assert!(matches!(
            err,
            TransformError::ShapeMismatch {
                left: (2, 2),
                right: (1, 3)
            }
        ));
    }

    #[test]
    fn test_separation() {
        let a = raster("0 0\n0 -9999\n");
        let b = raster("3 4\n0 100\n");
        let cmp = separation(&a, &b).unwrap();
        assert_eq!(cmp.separation, 5.0);
        assert_eq!(cmp.max_abs_diff, 4.0);
        assert_eq!(cmp.compared_cells, 3);
    }
}
