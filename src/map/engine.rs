//! Per-cell map generation.
//!
//! For each map cell the projection supplies the body latitude and
//! longitude; the source image is read there and the datum stored in the
//! cell. Cells for which the projection has no body point, or the source
//! has no data, keep the empty value.

use ndarray::Array2;

use crate::error::MapError;
use crate::map::value::{MapValue, SourceImage};
use crate::progress::ProgressNotifier;
use crate::proj::MapProjection;

/// Optional controls for [`make_map`].
#[derive(Debug, Default)]
pub struct MapOptions<'a> {
    /// Data below this value are treated as missing.
    pub minimum: Option<f64>,
    /// Data above this value are treated as missing.
    pub maximum: Option<f64>,
    /// Notified once per completed map line.
    pub progress: Option<&'a mut ProgressNotifier>,
}

/// Grid cell value for parallels and meridians.
pub const GRID_LINE: u8 = 255;

/// Background value of a grid overlay.
pub const GRID_BACKGROUND: u8 = 0;

/// Notifies once per map line as plotting moves past it.
struct LineProgress<'a> {
    notifier: Option<&'a mut ProgressNotifier>,
    samples: usize,
    map_size: usize,
    completed: usize,
}

impl LineProgress<'_> {
    /// Mark every line before `line` as done.
    fn complete_before(&mut self, line: usize) {
        while self.completed < line {
            self.completed += 1;
            if let Some(notifier) = self.notifier.as_deref_mut() {
                notifier.notify_plotted(self.map_size, self.samples);
            }
        }
    }
}

fn check_shape(samples: usize, lines: usize) -> Result<(), MapError> {
    if samples == 0 || lines == 0 {
        return Err(MapError::Shape(format!(
            "map must have at least one sample and one line, got {samples}x{lines}"
        )));
    }
    Ok(())
}

/// Build a `lines` × `samples` map of `source` in `projection`.
///
/// The array is indexed `[line, sample]`. A root-finding failure in any
/// cell aborts the whole map.
pub fn make_map<T, P, S>(
    projection: &P,
    source: &S,
    samples: usize,
    lines: usize,
    options: MapOptions<'_>,
) -> Result<Array2<T>, MapError>
where
    T: MapValue,
    P: MapProjection + ?Sized,
    S: SourceImage + ?Sized,
{
    check_shape(samples, lines)?;
    if let (Some(lo), Some(hi)) = (options.minimum, options.maximum) {
        if !(lo <= hi) {
            return Err(MapError::InvalidParameter(format!(
                "data minimum {lo} exceeds maximum {hi}"
            )));
        }
    }

    let map_size = samples * lines;
    let mut map = Array2::from_elem((lines, samples), T::empty_value());

    let MapOptions {
        minimum,
        maximum,
        mut progress,
    } = options;
    if let Some(notifier) = progress.as_deref_mut() {
        notifier.reset();
    }
    let mut line_progress = LineProgress {
        notifier: progress,
        samples,
        map_size,
        completed: 0,
    };

    tracing::debug!(
        projection = projection.projection_name(),
        samples,
        lines,
        "plotting map"
    );

    let cells = map
        .as_slice_mut()
        .ok_or_else(|| MapError::Shape("map storage is not contiguous".into()))?;

    let mut plot = |lat: f64, lon: f64, offset: usize| {
        // Projections skip cells with no body point, so whole lines may
        // pass without a call.
        line_progress.complete_before(offset / samples);

        let datum = source
            .read_data(lat, lon)
            .filter(|d| minimum.map_or(true, |lo| *d >= lo))
            .filter(|d| maximum.map_or(true, |hi| *d <= hi));

        if let Some(value) = datum.and_then(T::from_datum) {
            cells[offset] = value;
        }
    };

    projection.plot_map(samples, lines, &mut plot)?;
    line_progress.complete_before(lines);

    Ok(map)
}

/// Build a `lines` × `samples` overlay of parallels every `lat_interval`
/// degrees and meridians every `lon_interval` degrees.
pub fn make_grid<P>(
    projection: &P,
    samples: usize,
    lines: usize,
    lat_interval: f64,
    lon_interval: f64,
) -> Result<Array2<u8>, MapError>
where
    P: MapProjection + ?Sized,
{
    check_shape(samples, lines)?;
    for (name, interval) in [("latitude", lat_interval), ("longitude", lon_interval)] {
        if !(interval > 0.0 && interval <= 360.0) {
            return Err(MapError::InvalidParameter(format!(
                "{name} grid interval must be in (0°, 360°], got {interval}"
            )));
        }
    }

    let mut grid = Array2::from_elem((lines, samples), GRID_BACKGROUND);
    projection.plot_grid(
        samples,
        lines,
        lat_interval.to_radians(),
        lon_interval.to_radians(),
        &mut grid,
    )?;
    Ok(grid)
}
