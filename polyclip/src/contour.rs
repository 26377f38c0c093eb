use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::geom::{signed_area, Point, Rectangle, Segment};

/// A closed ring of points.
///
/// The ring is implicitly closed: there is an edge from the last point back to
/// the first, so the first point should not be repeated at the end. The order
/// of the points is the winding order of the ring.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Point>", into = "Vec<Point>")]
pub struct Contour {
    points: Vec<Point>,
    bbox: OnceLock<Option<Rectangle>>,
}

impl std::fmt::Debug for Contour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.points).finish()
    }
}

impl PartialEq for Contour {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl From<Vec<Point>> for Contour {
    fn from(points: Vec<Point>) -> Self {
        Contour::new(points)
    }
}

impl From<Contour> for Vec<Point> {
    fn from(c: Contour) -> Self {
        c.points
    }
}

impl From<Vec<(f64, f64)>> for Contour {
    fn from(points: Vec<(f64, f64)>) -> Self {
        points.into_iter().map(Point::from).collect()
    }
}

impl FromIterator<Point> for Contour {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        Contour::new(iter.into_iter().collect())
    }
}

impl Contour {
    /// Creates a contour from its points.
    pub fn new(points: Vec<Point>) -> Self {
        Contour {
            points,
            bbox: OnceLock::new(),
        }
    }

    /// The points of this contour, in winding order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The number of points (and edges) in this contour.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if this contour has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends a point.
    pub fn add(&mut self, p: Point) {
        self.points.push(p);
        self.bbox = OnceLock::new();
    }

    /// Appends some points.
    pub fn add_range(&mut self, ps: impl IntoIterator<Item = Point>) {
        self.points.extend(ps);
        self.bbox = OnceLock::new();
    }

    /// Removes all the points.
    pub fn clear(&mut self) {
        self.points.clear();
        self.bbox = OnceLock::new();
    }

    /// Reverses the winding order.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// The edge from point `i` to point `i + 1`, wrapping around at the end.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn segment(&self, i: usize) -> Segment {
        let next = (i + 1) % self.points.len();
        Segment::new(self.points[i], self.points[next])
    }

    /// All the edges of this contour, including the closing one.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        (0..self.points.len()).map(|i| self.segment(i))
    }

    /// The bounding box, or `None` for an empty contour.
    pub fn bounding_box(&self) -> Option<Rectangle> {
        *self
            .bbox
            .get_or_init(|| Rectangle::from_points(&self.points))
    }

    /// The area enclosed by this ring, positive when counter-clockwise.
    ///
    /// Self-intersecting rings get the winding-number-weighted area.
    pub fn signed_area(&self) -> f64 {
        self.segments()
            .map(|s| s.start.x * s.end.y - s.end.x * s.start.y)
            .sum::<f64>()
            / 2.0
    }

    /// The unsigned area enclosed by this ring.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Does this contour wind counter-clockwise?
    ///
    /// We look at the turn made by the lowest vertex (the rightmost one among
    /// ties), which is a convex vertex of the ring.
    pub fn is_counter_clockwise(&self) -> bool {
        let n = self.points.len();
        let Some(lowest) = (0..n).min_by(|&i, &j| {
            let (p, q) = (&self.points[i], &self.points[j]);
            p.y.total_cmp(&q.y).then(q.x.total_cmp(&p.x))
        }) else {
            return false;
        };

        let prev = &self.points[(lowest + n - 1) % n];
        let next = &self.points[(lowest + 1) % n];
        let turn = signed_area(prev, &self.points[lowest], next);
        if turn != 0.0 {
            turn > 0.0
        } else {
            self.signed_area() > 0.0
        }
    }

    /// Ray-casting point-in-polygon test with the odd-even rule.
    ///
    /// An edge is counted only if its `y` range straddles `p.y` (half-open at
    /// the top), so horizontal edges never count and a vertex on the ray is
    /// counted once. Points exactly on the boundary may land either way.
    pub fn contains_point(&self, p: &Point) -> bool {
        let mut inside = false;
        for s in self.segments() {
            if (s.start.y > p.y) == (s.end.y > p.y) {
                continue;
            }
            let x = s.start.x + (p.y - s.start.y) * (s.end.x - s.start.x) / (s.end.y - s.start.y);
            if p.x < x {
                inside = !inside;
            }
        }
        inside
    }

    /// Is `p` within `eps` of one of our edges?
    pub fn is_on_boundary(&self, p: &Point, eps: f64) -> bool {
        self.segments().any(|s| s.distance_to(p) <= eps)
    }

    /// Is `other` inside this contour?
    ///
    /// Vertices of `other` on our boundary don't count either way. If every
    /// vertex is on our boundary then the edge midpoints decide.
    pub fn contains_contour(&self, other: &Contour, eps: f64) -> bool {
        if let (Some(ours), Some(theirs)) = (self.bounding_box(), other.bounding_box()) {
            if !ours.intersects(&theirs, eps) {
                return false;
            }
        }

        let vertices = other.points.iter().copied();
        if let Some(inside) = self.classify_points(vertices, eps) {
            return inside;
        }
        let midpoints = other.segments().map(|s| s.start.affine(&s.end, 0.5));
        self.classify_points(midpoints, eps).unwrap_or(false)
    }

    // Returns `None` if all the points are on the boundary.
    fn classify_points(&self, ps: impl Iterator<Item = Point>, eps: f64) -> Option<bool> {
        let mut any_inside = false;
        for p in ps {
            if self.is_on_boundary(&p, eps) {
                continue;
            }
            if !self.contains_point(&p) {
                return Some(false);
            }
            any_inside = true;
        }
        any_inside.then_some(true)
    }

    /// Does this contour enclose no area?
    ///
    /// That is, are all its points within `eps` of a single line? Contours with
    /// fewer than three distinct points are always degenerate.
    pub fn is_degenerate(&self, eps: f64) -> bool {
        let Some(first) = self.points.first() else {
            return true;
        };
        let Some(far) = self
            .points
            .iter()
            .max_by(|p, q| first.distance(p).total_cmp(&first.distance(q)))
        else {
            return true;
        };
        let len = first.distance(far);
        if len <= eps {
            return true;
        }
        let dir = *far - *first;
        self.points
            .iter()
            .all(|p| (*p - *first).cross(&dir).abs() / len <= eps)
    }
}
