//! Lens geometric correction.
//!
//! Coordinates are pixel offsets from the optical axis, `line` increasing
//! downward. Lens models are supplied by the caller; the crate only ships
//! the identity.

use std::fmt::Debug;

/// Mapping between observed (image) and ideal pinhole (object) pixel
/// offsets. Both directions work in place.
pub trait GeometricCorrection: Debug + Send + Sync {
    /// Observed → ideal.
    fn image_to_object(&self, line: &mut f64, sample: &mut f64);

    /// Ideal → observed.
    fn object_to_image(&self, line: &mut f64, sample: &mut f64);
}

/// No lens distortion.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityCorrection;

impl GeometricCorrection for IdentityCorrection {
    fn image_to_object(&self, _line: &mut f64, _sample: &mut f64) {}

    fn object_to_image(&self, _line: &mut f64, _sample: &mut f64) {}
}
