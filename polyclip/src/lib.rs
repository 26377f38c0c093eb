#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod clipper;
mod config;
mod connector;
mod contour;
mod geom;
pub mod num;
mod polygon;
mod segments;
mod sweep;
mod sweep_line;

pub use clipper::{ClipOutput, ClipStatus, PolygonClipper};
pub use config::{ClipConfig, Precision, Reconstruction};
pub use contour::Contour;
pub use geom::{find_intersection, signed_area, Intersection, Point, Rectangle, Segment, Vector};
pub use polygon::Polygon;

/// Binary operations between sets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanOp {
    /// A point is in the union of two sets if it is in either one.
    Union,
    /// A point is in the intersection of two sets if it is in both.
    Intersection,
    /// A point is in the difference of two sets if it is in the first but not the second.
    Difference,
    /// A point is in the exclusive-or of two sets if it is in one or the other, but not both.
    Xor,
}

/// The input was faulty.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// At least one of the inputs was infinite.
    #[error("input coordinates must be finite")]
    Infinity,
    /// At least one of the inputs was not a number.
    #[error("input coordinates must not be NaN")]
    NaN,
    /// The configured precision was negative or not finite.
    #[error("invalid precision {0}: it must be finite and non-negative")]
    InvalidPrecision(f64),
}

/// Computes a boolean operation between two polygons, with the default configuration.
///
/// Returns `None` if the result is empty. Use [`PolygonClipper`] to configure
/// the precision, or to find out whether the result is exact.
pub fn clip(subject: &Polygon, clipping: &Polygon, op: BooleanOp) -> Result<Option<Polygon>, Error> {
    Ok(PolygonClipper::new(subject, clipping).compute(op)?.polygon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_squares() {
        let a = Polygon::from(vec![vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]]);
        let b = Polygon::from(vec![vec![(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)]]);
        let output = clip(&a, &b, BooleanOp::Intersection).unwrap().unwrap();
        assert_eq!(output.area(), 0.25);

        let mut points: Vec<(f64, f64)> =
            output.contours()[0].points().iter().map(|&p| p.into()).collect();
        points.sort_by(|p, q| p.partial_cmp(q).unwrap());
        insta::assert_debug_snapshot!(points, @r###"
        [
            (
                0.0,
                0.0,
            ),
            (
                0.0,
                0.5,
            ),
            (
                0.5,
                0.0,
            ),
            (
                0.5,
                0.5,
            ),
        ]
        "###);
    }

    #[test]
    fn error_messages() {
        assert_eq!(Error::NaN.to_string(), "input coordinates must not be NaN");
        assert_eq!(
            Error::InvalidPrecision(-1.0).to_string(),
            "invalid precision -1: it must be finite and non-negative"
        );
    }
}
