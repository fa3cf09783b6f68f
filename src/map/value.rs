//! Map cell types and the source-image capability.

use num_traits::{Bounded, NumCast};

/// A type that can be stored in a map cell.
///
/// Cells that receive no data keep [`MapValue::empty_value`]: NaN for
/// floating point types, the type minimum for integers.
pub trait MapValue: Copy + NumCast + 'static {
    fn empty_value() -> Self;

    /// Convert a physical datum into a cell value. `None` if the datum
    /// cannot be represented.
    fn from_datum(datum: f64) -> Option<Self>;
}

macro_rules! float_map_value {
    ($($t:ty),*) => {$(
        impl MapValue for $t {
            fn empty_value() -> Self {
                <$t>::NAN
            }

            fn from_datum(datum: f64) -> Option<Self> {
                NumCast::from(datum)
            }
        }
    )*};
}

macro_rules! integer_map_value {
    ($($t:ty),*) => {$(
        impl MapValue for $t {
            fn empty_value() -> Self {
                <$t as Bounded>::min_value()
            }

            fn from_datum(datum: f64) -> Option<Self> {
                NumCast::from(datum.round())
            }
        }
    )*};
}

float_map_value!(f32, f64);
integer_map_value!(i8, i16, i32, i64, u8, u16, u32, u64);

/// Source of physical data indexed by body coordinates.
///
/// `lat` is planetocentric and `lon` is east longitude, both in radians.
/// `None` means no data at that location.
pub trait SourceImage {
    fn read_data(&self, lat: f64, lon: f64) -> Option<f64>;
}

impl<F> SourceImage for F
where
    F: Fn(f64, f64) -> Option<f64>,
{
    fn read_data(&self, lat: f64, lon: f64) -> Option<f64> {
        self(lat, lon)
    }
}
