//! Map projections of a planetary body.
//!
//! A projection walks every cell of a `samples` × `lines` map, row by row
//! from the southern edge, and reports the planetocentric latitude and
//! east longitude (radians) shown in that cell.

pub mod common;
pub mod mercator;
pub mod orthographic;
pub mod polar_stereographic;
pub mod simple_cylindrical;

pub use mercator::Mercator;
pub use orthographic::{Orthographic, OrthographicCenter};
pub use polar_stereographic::{PolarStereographic, Pole};
pub use simple_cylindrical::SimpleCylindrical;

use ndarray::Array2;

use crate::error::MapError;

/// Trait for map projections that plot a body onto a regular grid.
pub trait MapProjection {
    fn projection_name(&self) -> &'static str;

    /// Call `plot(lat, lon, offset)` once for every map cell that shows a
    /// body point, in row-major order from line 0. `offset` is
    /// `line * samples + sample`.
    ///
    /// Cells with no body point get no call at all, so a cell is visited
    /// at most once and whole lines may be skipped. Examples: cells off
    /// the limb of an orthographic view, cells outside the polar
    /// stereographic disc, Mercator lines beyond the maximum latitude.
    /// Callers that need every cell (to fill it or count progress) must
    /// treat missing offsets as empty.
    fn plot_map(
        &self,
        samples: usize,
        lines: usize,
        plot: &mut dyn FnMut(f64, f64, usize),
    ) -> Result<(), MapError>;

    /// Draw parallels every `lat_interval` and meridians every
    /// `lon_interval` radians into `grid`, indexed `[line, sample]`.
    ///
    /// `grid` must be `lines` × `samples` and both intervals must lie in
    /// [`common::MIN_GRID_INTERVAL`, 2π]; otherwise an error is returned and the
    /// grid is untouched.
    fn plot_grid(
        &self,
        samples: usize,
        lines: usize,
        lat_interval: f64,
        lon_interval: f64,
        grid: &mut Array2<u8>,
    ) -> Result<(), MapError>;
}

/// The projections this crate implements.
#[derive(Debug)]
pub enum MapFactory {
    SimpleCylindrical(SimpleCylindrical),
    Mercator(Mercator),
    PolarStereographic(PolarStereographic),
    Orthographic(Orthographic),
}

impl MapProjection for MapFactory {
    fn projection_name(&self) -> &'static str {
        match self {
            MapFactory::SimpleCylindrical(p) => p.projection_name(),
            MapFactory::Mercator(p) => p.projection_name(),
            MapFactory::PolarStereographic(p) => p.projection_name(),
            MapFactory::Orthographic(p) => p.projection_name(),
        }
    }

    fn plot_map(
        &self,
        samples: usize,
        lines: usize,
        plot: &mut dyn FnMut(f64, f64, usize),
    ) -> Result<(), MapError> {
        match self {
            MapFactory::SimpleCylindrical(p) => p.plot_map(samples, lines, plot),
            MapFactory::Mercator(p) => p.plot_map(samples, lines, plot),
            MapFactory::PolarStereographic(p) => p.plot_map(samples, lines, plot),
            MapFactory::Orthographic(p) => p.plot_map(samples, lines, plot),
        }
    }

    fn plot_grid(
        &self,
        samples: usize,
        lines: usize,
        lat_interval: f64,
        lon_interval: f64,
        grid: &mut Array2<u8>,
    ) -> Result<(), MapError> {
        match self {
            MapFactory::SimpleCylindrical(p) => {
                p.plot_grid(samples, lines, lat_interval, lon_interval, grid)
            }
            MapFactory::Mercator(p) => p.plot_grid(samples, lines, lat_interval, lon_interval, grid),
            MapFactory::PolarStereographic(p) => {
                p.plot_grid(samples, lines, lat_interval, lon_interval, grid)
            }
            MapFactory::Orthographic(p) => {
                p.plot_grid(samples, lines, lat_interval, lon_interval, grid)
            }
        }
    }
}

impl From<SimpleCylindrical> for MapFactory {
    fn from(p: SimpleCylindrical) -> Self {
        MapFactory::SimpleCylindrical(p)
    }
}

impl From<Mercator> for MapFactory {
    fn from(p: Mercator) -> Self {
        MapFactory::Mercator(p)
    }
}

impl From<PolarStereographic> for MapFactory {
    fn from(p: PolarStereographic) -> Self {
        MapFactory::PolarStereographic(p)
    }
}

impl From<Orthographic> for MapFactory {
    fn from(p: Orthographic) -> Self {
        MapFactory::Orthographic(p)
    }
}
