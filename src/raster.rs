//! # Raster Loader Module
//!
//! Reads plain-text ASCII grid rasters. The layout is fixed:
//!
//! ```text
//! ncols        4
//! nrows        3
//! xllcorner    0.0
//! yllcorner    0.0
//! cellsize     1.0
//! NODATA_value -9999
//! 1.0 2.0 3.0 4.0
//! 5.0 -9999 7.0 8.0
//! 9.0 10.0 11.0 12.0
//! ```
//!
//! Only the last token of the sixth line (the nodata sentinel) matters for
//! loading; the first five lines are kept verbatim and parsed into a
//! best-effort [`RasterHeader`] for reporting. Every cell equal to the
//! sentinel becomes `NaN`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rasterplot::raster::Raster;
//!
//! let raster = Raster::from_file("elevation.asc")?;
//! println!("{} x {} cells", raster.nrows(), raster.ncols());
//! # Ok::<(), rasterplot::error::RasterError>(())
//! ```

use crate::error::RasterError;
use log::debug;
use ndarray::Array2;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Number of header lines preceding the grid values.
pub const HEADER_LINES: usize = 6;

/// Metadata parsed from the first five header lines.
///
/// Keys are matched case-insensitively; a missing or unparsable entry is left
/// as `None` rather than rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterHeader {
    pub ncols: Option<usize>,
    pub nrows: Option<usize>,
    pub xllcorner: Option<f64>,
    pub yllcorner: Option<f64>,
    pub cellsize: Option<f64>,
}

impl RasterHeader {
    fn from_lines(lines: &[String]) -> Self {
        let mut header = RasterHeader::default();
        for line in lines {
            let mut tokens = line.split_whitespace();
            let (Some(key), Some(value)) = (tokens.next(), tokens.next_back()) else {
                continue;
            };
            match key.to_ascii_lowercase().as_str() {
                "ncols" => header.ncols = value.parse().ok(),
                "nrows" => header.nrows = value.parse().ok(),
                "xllcorner" | "xllcenter" => header.xllcorner = value.parse().ok(),
                "yllcorner" | "yllcenter" => header.yllcorner = value.parse().ok(),
                "cellsize" => header.cellsize = value.parse().ok(),
                _ => {}
            }
        }
        header
    }
}

/// A 2-D grid of cell values with its nodata sentinel.
#[derive(Debug, Clone)]
pub struct Raster {
    name: String,
    header_lines: Vec<String>,
    header: RasterHeader,
    nodata: f64,
    data: Array2<f64>,
}

impl Raster {
    /// Loads a raster from disk.
    ///
    /// The existence check runs before anything is read, so a missing file is
    /// reported as [`RasterError::NotFound`] rather than an IO error.
    ///
    /// # Errors
    ///
    /// - [`RasterError::NotFound`] if `path` does not exist
    /// - [`RasterError::Header`] if there are fewer than six header lines
    /// - [`RasterError::Parse`] if a value is not a valid float
    /// - [`RasterError::Ragged`] if rows have different lengths
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RasterError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RasterError::NotFound(path.to_path_buf()));
        }

        debug!("Reading raster file: {}", path.display());
        let text = fs::read_to_string(path).map_err(|source| RasterError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_str_named(&text, &path.to_string_lossy())
    }

    /// Parses raster text already held in memory. `name` is used in error
    /// messages and as the plot title.
    pub fn from_str_named(text: &str, name: &str) -> Result<Self, RasterError> {
        let mut lines = text.lines().enumerate();

        let header_lines: Vec<String> = lines
            .by_ref()
            .take(HEADER_LINES)
            .map(|(_, line)| line.to_string())
            .collect();
        if header_lines.len() < HEADER_LINES {
            return Err(RasterError::Header {
                name: name.to_string(),
                message: format!(
                    "expected {} header lines, found {}",
                    HEADER_LINES,
                    header_lines.len()
                ),
            });
        }

        let nodata_token = header_lines[HEADER_LINES - 1]
            .split_whitespace()
            .last()
            .ok_or_else(|| RasterError::Header {
                name: name.to_string(),
                message: "nodata line is empty".to_string(),
            })?;
        let nodata = parse_value(nodata_token, name, HEADER_LINES)?;

        let mut values = Vec::new();
        let mut ncols = 0;
        let mut nrows = 0;
        for (idx, line) in lines {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let before = values.len();
            for token in line.split_whitespace() {
                values.push(parse_value(token, name, idx + 1)?);
            }
            let found = values.len() - before;

            if nrows == 0 {
                ncols = found;
            } else if found != ncols {
                return Err(RasterError::Ragged {
                    name: name.to_string(),
                    row: nrows + 1,
                    expected: ncols,
                    found,
                });
            }
            nrows += 1;
        }

        let mut data =
            Array2::from_shape_vec((nrows, ncols), values).map_err(|e| RasterError::Header {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        data.mapv_inplace(|v| if v == nodata { f64::NAN } else { v });

        let header = RasterHeader::from_lines(&header_lines[..HEADER_LINES - 1]);
        if let Some(expected) = header.nrows
            && expected != nrows
        {
            debug!("{}: header declares {} rows, read {}", name, expected, nrows);
        }

        debug!(
            "Loaded {}: {} x {} cells, nodata = {}",
            name, nrows, ncols, nodata
        );

        Ok(Raster {
            name: name.to_string(),
            header_lines,
            header,
            nodata,
            data,
        })
    }

    /// Path or label the raster was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    pub fn header(&self) -> &RasterHeader {
        &self.header
    }

    /// Cell values; nodata cells are `NaN`.
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// Number of cells holding a finite value.
    pub fn valid_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_finite()).count()
    }

    /// Minimum and maximum over finite cells.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        finite_range(self.data.iter().copied())
    }

    /// Serializes the raster back to ASCII grid text. `NaN` cells are written
    /// as the nodata value.
    pub fn to_ascii_string(&self) -> String {
        let mut out = String::new();
        for line in &self.header_lines {
            out.push_str(line);
            out.push('\n');
        }
        for row in self.data.rows() {
            let mut first = true;
            for &value in row {
                if !first {
                    out.push(' ');
                }
                first = false;
                let value = if value.is_nan() { self.nodata } else { value };
                let _ = write!(out, "{}", value);
            }
            out.push('\n');
        }
        out
    }

    /// Writes the raster to `path` in ASCII grid format.
    pub fn write_ascii<P: AsRef<Path>>(&self, path: P) -> Result<(), RasterError> {
        let path = path.as_ref();
        fs::write(path, self.to_ascii_string()).map_err(|source| RasterError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn parse_value(token: &str, name: &str, line: usize) -> Result<f64, RasterError> {
    token.parse::<f64>().map_err(|source| RasterError::Parse {
        name: name.to_string(),
        line,
        token: token.to_string(),
        source,
    })
}

/// Minimum and maximum of the finite values in `values`.
pub fn finite_range<I: IntoIterator<Item = f64>>(values: I) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
