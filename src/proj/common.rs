//! Helpers shared by the projections: longitude layout across map
//! columns and graticule rasterization.
//!
//! Continuous map coordinates place pixel `i` over `[i, i + 1)`, so the
//! centre of pixel `i` is at `i + 0.5`. Map rows run from south (row 0)
//! to north.

use std::f64::consts::{FRAC_PI_2, TAU};

use ndarray::Array2;

use crate::angles::normalize_longitude;
use crate::error::MapError;
use crate::map::GRID_LINE;

/// Parametric steps per graticule line.
pub const GRID_STEPS: usize = 2000;

/// Smallest graticule spacing (radians) accepted by [`draw_graticule`].
pub const MIN_GRID_INTERVAL: f64 = 1e-6;

const ANGLE_SLACK: f64 = 1e-12;

/// Longitude at the centre of column `i` of `samples` columns covering
/// `span` radians eastward from `lo_lon`.
///
/// Longitude increases leftward on prograde bodies and rightward on
/// retrograde ones.
pub fn column_longitude(prograde: bool, lo_lon: f64, span: f64, samples: usize, i: usize) -> f64 {
    let offset = (i as f64 + 0.5) * span / samples as f64;
    let lon = if prograde {
        lo_lon + span - offset
    } else {
        lo_lon + offset
    };
    normalize_longitude(lon)
}

/// Continuous column coordinate of `lon`, or `None` when it lies outside
/// the `span` radians east of `lo_lon`. Inverse of [`column_longitude`].
pub fn longitude_column(prograde: bool, lo_lon: f64, span: f64, samples: usize, lon: f64) -> Option<f64> {
    let d = normalize_longitude(lon - lo_lon);
    if d > span + ANGLE_SLACK {
        return None;
    }

    let fraction = d.min(span) / span;
    let x = if prograde { 1.0 - fraction } else { fraction };
    Some(x * samples as f64)
}

/// Set the grid cell containing continuous coordinates (`x`, `y`).
/// Points on the far edge of the map land in the last row or column.
pub fn mark(grid: &mut Array2<u8>, x: f64, y: f64) {
    let (lines, samples) = grid.dim();
    let index = |c: f64, n: usize| -> Option<usize> {
        if !c.is_finite() || c < 0.0 || c > n as f64 {
            return None;
        }
        Some((c.floor() as usize).min(n - 1))
    };

    if let (Some(i), Some(k)) = (index(x, samples), index(y, lines)) {
        grid[[k, i]] = GRID_LINE;
    }
}

fn check_intervals(lat_interval: f64, lon_interval: f64) -> Result<(), MapError> {
    for (name, interval) in [("latitude", lat_interval), ("longitude", lon_interval)] {
        if !(MIN_GRID_INTERVAL..=TAU).contains(&interval) {
            return Err(MapError::InvalidParameter(format!(
                "{name} grid interval must be in [{MIN_GRID_INTERVAL}, 2π] radians, got {interval}"
            )));
        }
    }
    Ok(())
}

/// Validate the arguments of a `plot_grid` call: `grid` must be
/// `lines` × `samples` and both intervals usable by [`draw_graticule`].
pub fn check_grid(
    grid: &Array2<u8>,
    samples: usize,
    lines: usize,
    lat_interval: f64,
    lon_interval: f64,
) -> Result<(), MapError> {
    if grid.dim() != (lines, samples) {
        return Err(MapError::Shape(format!(
            "grid is {:?}, expected {lines} lines of {samples} samples",
            grid.dim()
        )));
    }
    check_intervals(lat_interval, lon_interval)
}

/// Rasterize parallels every `lat_interval` within `[lo_lat, hi_lat]` and
/// meridians every `lon_interval` within `span` east of `lo_lon`.
///
/// `project` maps (lat, lon) to continuous map coordinates, or `None`
/// where the point is not on the map.
pub fn draw_graticule<F>(
    grid: &mut Array2<u8>,
    (lo_lat, hi_lat): (f64, f64),
    (lo_lon, span): (f64, f64),
    lat_interval: f64,
    lon_interval: f64,
    project: F,
) -> Result<(), MapError>
where
    F: Fn(f64, f64) -> Option<(f64, f64)>,
{
    check_intervals(lat_interval, lon_interval)?;
    let steps = GRID_STEPS as f64;

    // Parallels. The poles are points, not lines.
    let first = (lo_lat / lat_interval).ceil() as i64;
    for m in first.. {
        let lat = m as f64 * lat_interval;
        if lat > hi_lat + ANGLE_SLACK {
            break;
        }
        if lat.abs() >= FRAC_PI_2 - ANGLE_SLACK {
            continue;
        }
        for j in 0..=GRID_STEPS {
            let lon = lo_lon + span * j as f64 / steps;
            if let Some((x, y)) = project(lat, lon) {
                mark(grid, x, y);
            }
        }
    }

    // Meridians.
    let lat_span = hi_lat - lo_lat;
    let mut m = 0;
    loop {
        let lon = m as f64 * lon_interval;
        if lon >= TAU - ANGLE_SLACK {
            break;
        }
        m += 1;

        if normalize_longitude(lon - lo_lon) > span + ANGLE_SLACK {
            continue;
        }
        for j in 0..=GRID_STEPS {
            let lat = lo_lat + lat_span * j as f64 / steps;
            if let Some((x, y)) = project(lat, lon) {
                mark(grid, x, y);
            }
        }
    }

    Ok(())
}
