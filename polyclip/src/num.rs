//! Helpers for choosing and applying the coordinate tolerance.

use crate::Error;

/// The automatic precision is this fraction of the largest coordinate magnitude.
pub const AUTO_RELATIVE_PRECISION: f64 = 1e-10;

/// Scans coordinates for their extrema, rejecting NaNs.
pub(crate) fn extrema(mut xs: impl Iterator<Item = f64>) -> Result<(f64, f64), Error> {
    xs.try_fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| {
        if x.is_nan() {
            Err(Error::NaN)
        } else {
            Ok((x.min(min), x.max(max)))
        }
    })
}

/// Checks that a collection of coordinates is finite and returns the largest magnitude.
///
/// An empty collection has magnitude zero.
pub(crate) fn magnitude(xs: impl Iterator<Item = f64>) -> Result<f64, Error> {
    let (min, max) = extrema(xs)?;
    if min > max {
        return Ok(0.0);
    }
    if min.is_infinite() || max.is_infinite() {
        return Err(Error::Infinity);
    }
    Ok(min.abs().max(max.abs()))
}

/// The tolerance we use when the caller doesn't pick one.
///
/// Coordinates below 1.0 in magnitude get the same tolerance as 1.0, so that
/// inputs clustered around the origin still get a usable epsilon.
pub fn auto_precision(magnitude: f64) -> f64 {
    magnitude.max(1.0) * AUTO_RELATIVE_PRECISION
}
