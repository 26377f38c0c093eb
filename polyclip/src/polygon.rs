use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::{contour::Contour, geom::Rectangle, num};

/// A collection of contours.
///
/// There's no distinguished outer contour: whether a contour is a boundary or a
/// hole is decided by how many of the other contours contain it.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Contour>", into = "Vec<Contour>")]
pub struct Polygon {
    contours: Vec<Contour>,
    bbox: OnceLock<Option<Rectangle>>,
}

impl std::fmt::Debug for Polygon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.contours).finish()
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.contours == other.contours
    }
}

impl From<Vec<Contour>> for Polygon {
    fn from(contours: Vec<Contour>) -> Self {
        Polygon::new(contours)
    }
}

impl From<Polygon> for Vec<Contour> {
    fn from(p: Polygon) -> Self {
        p.contours
    }
}

impl From<Vec<Vec<(f64, f64)>>> for Polygon {
    fn from(contours: Vec<Vec<(f64, f64)>>) -> Self {
        contours.into_iter().map(Contour::from).collect()
    }
}

impl From<Contour> for Polygon {
    fn from(c: Contour) -> Self {
        Polygon::new(vec![c])
    }
}

impl FromIterator<Contour> for Polygon {
    fn from_iter<T: IntoIterator<Item = Contour>>(iter: T) -> Self {
        Polygon::new(iter.into_iter().collect())
    }
}

impl Polygon {
    /// Creates a polygon from its contours.
    pub fn new(contours: Vec<Contour>) -> Self {
        Polygon {
            contours,
            bbox: OnceLock::new(),
        }
    }

    /// The contours of this polygon.
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// The number of contours.
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    /// Returns true if there are no contours.
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Adds a contour.
    pub fn add_contour(&mut self, contour: Contour) {
        self.contours.push(contour);
        self.bbox = OnceLock::new();
    }

    /// The union of the contours' bounding boxes, or `None` if there are no points.
    pub fn bounding_box(&self) -> Option<Rectangle> {
        *self.bbox.get_or_init(|| {
            self.contours
                .iter()
                .filter_map(Contour::bounding_box)
                .reduce(|a, b| a.union(&b))
        })
    }

    /// For each contour, the number of other contours that contain it.
    pub fn nesting_depths(&self, eps: f64) -> Vec<usize> {
        self.contours
            .iter()
            .enumerate()
            .map(|(i, inner)| {
                self.contours
                    .iter()
                    .enumerate()
                    .filter(|(j, outer)| *j != i && outer.contains_contour(inner, eps))
                    .count()
            })
            .collect()
    }

    /// Makes outer boundaries wind counter-clockwise and holes wind clockwise.
    ///
    /// A contour is a hole if it's contained in an odd number of other contours.
    pub fn fix_orientation(&mut self, eps: f64) {
        let depths = self.nesting_depths(eps);
        for (contour, depth) in self.contours.iter_mut().zip(depths) {
            let outer = depth % 2 == 0;
            if contour.is_counter_clockwise() != outer {
                contour.reverse();
            }
        }
    }

    /// The area covered by this polygon under the odd-even rule.
    ///
    /// This doesn't depend on the contours' winding, but it assumes that the
    /// contours don't cross one another.
    pub fn area(&self) -> f64 {
        let eps = self
            .bounding_box()
            .map(|r| {
                let m = r.min_x.abs().max(r.min_y.abs()).max(r.right().abs()).max(r.top().abs());
                num::auto_precision(m)
            })
            .unwrap_or(0.0);
        self.contours
            .iter()
            .zip(self.nesting_depths(eps))
            .map(|(c, depth)| if depth % 2 == 0 { c.area() } else { -c.area() })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Contour {
        vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
        ]
        .into()
    }

    fn reversed(mut c: Contour) -> Contour {
        c.reverse();
        c
    }

    #[test]
    fn bounding_box() {
        let mut p = Polygon::default();
        assert_eq!(p.bounding_box(), None);
        p.add_contour(square(0.0, 0.0, 1.0));
        assert_eq!(p.bounding_box(), Some(Rectangle::new(0.0, 0.0, 1.0, 1.0)));
        p.add_contour(square(2.0, 3.0, 1.0));
        assert_eq!(p.bounding_box(), Some(Rectangle::new(0.0, 0.0, 3.0, 4.0)));
    }

    #[test]
    fn fix_orientation() {
        // Outer clockwise, hole counter-clockwise, island inside the hole clockwise:
        // all three are wrong.
        let mut p = Polygon::new(vec![
            reversed(square(0.0, 0.0, 10.0)),
            square(1.0, 1.0, 8.0),
            reversed(square(2.0, 2.0, 2.0)),
        ]);
        assert_eq!(p.nesting_depths(1e-9), vec![0, 1, 2]);

        p.fix_orientation(1e-9);
        let ccw: Vec<_> = p.contours().iter().map(Contour::is_counter_clockwise).collect();
        assert_eq!(ccw, vec![true, false, true]);

        // Fixing again changes nothing.
        let before = p.clone();
        p.fix_orientation(1e-9);
        assert_eq!(p, before);
    }

    #[test]
    fn area_with_holes() {
        let p = Polygon::new(vec![square(0.0, 0.0, 4.0), square(1.0, 1.0, 2.0)]);
        assert_eq!(p.area(), 12.0);

        let p = Polygon::new(vec![square(0.0, 0.0, 1.0), reversed(square(5.0, 5.0, 1.0))]);
        assert_eq!(p.area(), 2.0);
    }
}
