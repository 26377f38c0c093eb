use serde::{Deserialize, Serialize};

use crate::{num, Error};

/// How close two coordinates need to be to count as the same.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Derive the tolerance from the magnitude of the input coordinates.
    ///
    /// See [`num::auto_precision`](crate::num::auto_precision).
    #[default]
    Auto,
    /// Use exactly this tolerance.
    Fixed(f64),
}

impl Precision {
    /// Resolves this precision for inputs whose largest absolute coordinate is `magnitude`.
    pub fn resolve(&self, magnitude: f64) -> Result<f64, Error> {
        match *self {
            Precision::Auto => Ok(num::auto_precision(magnitude)),
            Precision::Fixed(eps) if eps.is_finite() && eps >= 0.0 => Ok(eps),
            Precision::Fixed(eps) => Err(Error::InvalidPrecision(eps)),
        }
    }
}

/// What to do with boundary pieces that never closed up into rings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconstruction {
    /// Only emit closed rings. Open pieces are dropped (and reported).
    #[default]
    Strict,
    /// If no ring closed at all, emit the longest open piece as a ring.
    ///
    /// This is lossy, but inputs whose vertices don't quite line up sometimes
    /// produce no closed ring at all, and an almost-right answer can be better
    /// than nothing.
    BestEffort,
}

/// Options for [`PolygonClipper`](crate::PolygonClipper).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// The tolerance for coincident points.
    pub precision: Precision,
    /// How to turn the kept edges into rings.
    pub reconstruction: Reconstruction,
    /// Give up after this many sweep events.
    ///
    /// If unset, the limit grows with the size of the input.
    pub max_iterations: Option<usize>,
}

impl ClipConfig {
    /// Sets the precision.
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Sets the reconstruction mode.
    pub fn with_reconstruction(mut self, reconstruction: Reconstruction) -> Self {
        self.reconstruction = reconstruction;
        self
    }

    /// Sets the iteration limit.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// The iteration limit for a sweep that starts with `events` events.
    pub(crate) fn iteration_limit(&self, events: usize) -> usize {
        self.max_iterations
            .unwrap_or_else(|| 10_000usize.max(events.saturating_mul(16)))
    }
}
