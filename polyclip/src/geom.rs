use serde::{Deserialize, Serialize};

/// A point in the plane.
///
/// The derived `PartialEq` is exact; the clipper compares points with
/// [`Point::approx_eq`] and its configured precision.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// The horizontal coordinate.
    pub x: f64,
    /// The vertical coordinate.
    pub y: f64,
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Are both coordinates within `eps` of `other`'s?
    pub fn approx_eq(&self, other: &Point, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }

    /// The Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f64 {
        (*other - *self).length()
    }

    pub(crate) fn affine(&self, other: &Point, t: f64) -> Point {
        Point {
            x: (1.0 - t) * self.x + t * other.x,
            y: (1.0 - t) * self.y + t * other.y,
        }
    }

    fn coord(&self) -> robust::Coord<f64> {
        robust::Coord {
            x: self.x,
            y: self.y,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Self::Output {
        Vector {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Self::Output {
        Point {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

/// The displacement between two points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector {
    /// The horizontal component.
    pub x: f64,
    /// The vertical component.
    pub y: f64,
}

impl Vector {
    /// The z component of the 3d cross product.
    pub fn cross(&self, other: &Vector) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// The dot product.
    pub fn dot(&self, other: &Vector) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// The squared Euclidean length.
    pub fn length_squared(&self) -> f64 {
        self.dot(self)
    }

    /// The Euclidean length.
    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }
}

impl std::ops::Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Self::Output {
        Vector {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Twice the signed area of the triangle `a`, `b`, `c`.
///
/// Positive if the triangle turns counter-clockwise (with the y axis pointing up),
/// negative if clockwise, and exactly zero if the points are collinear.
pub fn signed_area(a: &Point, b: &Point, c: &Point) -> f64 {
    robust::orient2d(a.coord(), b.coord(), c.coord())
}

/// A line segment.
///
/// Unlike the segments inside the sweep, these keep the orientation they were
/// given: `start` need not be to the left of `end`.
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// The first endpoint.
    pub start: Point,
    /// The second endpoint.
    pub end: Point,
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -- {:?}", self.start, self.end)
    }
}

impl Segment {
    /// Creates a segment between two points.
    pub fn new(start: Point, end: Point) -> Self {
        Segment { start, end }
    }

    /// Is this segment too short to have a direction?
    pub fn is_degenerate(&self, eps: f64) -> bool {
        self.start.approx_eq(&self.end, eps)
    }

    /// The same segment, walked the other way.
    pub fn reversed(&self) -> Segment {
        Segment {
            start: self.end,
            end: self.start,
        }
    }

    /// The length of this segment.
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// The distance from `p` to the closest point of this segment.
    pub fn distance_to(&self, p: &Point) -> f64 {
        let d = self.end - self.start;
        let len_sq = d.length_squared();
        if len_sq == 0.0 {
            return self.start.distance(p);
        }
        let t = ((*p - self.start).dot(&d) / len_sq).clamp(0.0, 1.0);
        self.start.affine(&self.end, t).distance(p)
    }
}

/// An axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// The smallest `x` coordinate.
    pub min_x: f64,
    /// The smallest `y` coordinate.
    pub min_y: f64,
    /// The extent along the `x` axis.
    pub width: f64,
    /// The extent along the `y` axis.
    pub height: f64,
}

impl Rectangle {
    /// Creates a rectangle from its lower-left corner and size.
    pub fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Rectangle {
            min_x,
            min_y,
            width,
            height,
        }
    }

    /// The smallest rectangle containing all the points, or `None` if there aren't any.
    pub fn from_points<'a>(ps: impl IntoIterator<Item = &'a Point>) -> Option<Rectangle> {
        let mut ps = ps.into_iter();
        let first = ps.next()?;
        let (min_x, min_y, max_x, max_y) = ps.fold(
            (first.x, first.y, first.x, first.y),
            |(min_x, min_y, max_x, max_y), p| {
                (min_x.min(p.x), min_y.min(p.y), max_x.max(p.x), max_y.max(p.y))
            },
        );
        Some(Rectangle::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// The largest `x` coordinate.
    pub fn right(&self) -> f64 {
        self.min_x + self.width
    }

    /// The largest `y` coordinate.
    pub fn top(&self) -> f64 {
        self.min_y + self.height
    }

    /// The smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let min_x = self.min_x.min(other.min_x);
        let min_y = self.min_y.min(other.min_y);
        let right = self.right().max(other.right());
        let top = self.top().max(other.top());
        Rectangle::new(min_x, min_y, right - min_x, top - min_y)
    }

    /// Do the two rectangles overlap or come within `eps` of each other?
    pub fn intersects(&self, other: &Rectangle, eps: f64) -> bool {
        self.min_x <= other.right() + eps
            && other.min_x <= self.right() + eps
            && self.min_y <= other.top() + eps
            && other.min_y <= self.top() + eps
    }

    /// Is `p` inside this rectangle, or within `eps` of it?
    pub fn contains(&self, p: &Point, eps: f64) -> bool {
        p.x >= self.min_x - eps
            && p.x <= self.right() + eps
            && p.y >= self.min_y - eps
            && p.y <= self.top() + eps
    }
}

/// The result of intersecting two segments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intersection {
    /// The segments are disjoint.
    None,
    /// The segments meet at a single point.
    Point(Point),
    /// The segments are collinear and share a sub-segment.
    ///
    /// The points are ordered along the direction of the first segment.
    Overlap(Point, Point),
}

impl Intersection {
    /// The number of intersection points (0, 1 or 2).
    pub fn len(&self) -> usize {
        match self {
            Intersection::None => 0,
            Intersection::Point(_) => 1,
            Intersection::Overlap(..) => 2,
        }
    }

    /// Returns true if the segments don't meet.
    pub fn is_empty(&self) -> bool {
        matches!(self, Intersection::None)
    }
}

// Intersection points that are this close to an endpoint become the endpoint.
// This keeps the sweep from creating slivers next to existing vertices.
fn snap(p: Point, a: &Segment, b: &Segment, eps: f64) -> Point {
    [a.start, a.end, b.start, b.end]
        .into_iter()
        .filter(|q| q.approx_eq(&p, eps))
        .min_by(|q, r| q.distance(&p).total_cmp(&r.distance(&p)))
        .unwrap_or(p)
}

/// Intersects two segments.
///
/// Two segments are treated as parallel if, over the length of the longer one,
/// their directions drift apart by no more than `eps`. Parallel segments
/// intersect only if they're also collinear (up to `eps`), in which case we
/// intersect their parameter intervals.
pub fn find_intersection(a: &Segment, b: &Segment, eps: f64) -> Intersection {
    let d0 = a.end - a.start;
    let d1 = b.end - b.start;
    let len0 = d0.length();
    let len1 = d1.length();
    if len0 == 0.0 || len1 == 0.0 {
        return Intersection::None;
    }

    let e = b.start - a.start;
    let kross = d0.cross(&d1);

    if kross.abs() > eps * len0.max(len1) {
        // The lines cross; find out whether the segments do.
        let s = e.cross(&d1) / kross;
        let tol0 = eps / len0;
        if s < -tol0 || s > 1.0 + tol0 {
            return Intersection::None;
        }
        let t = e.cross(&d0) / kross;
        let tol1 = eps / len1;
        if t < -tol1 || t > 1.0 + tol1 {
            return Intersection::None;
        }
        let p = a.start + d0 * s.clamp(0.0, 1.0);
        return Intersection::Point(snap(p, a, b, eps));
    }

    // The lines are parallel. Are they the same line?
    if e.cross(&d0).abs() / len0 > eps {
        return Intersection::None;
    }

    // Project `b` onto `a`'s parameter space.
    let len0_sq = len0 * len0;
    let s0 = d0.dot(&e) / len0_sq;
    let s1 = s0 + d0.dot(&d1) / len0_sq;
    let smin = s0.min(s1);
    let smax = s0.max(s1);
    let tol = eps / len0;

    if smax < -tol || smin > 1.0 + tol {
        Intersection::None
    } else if smax <= tol {
        Intersection::Point(snap(a.start, a, b, eps))
    } else if smin >= 1.0 - tol {
        Intersection::Point(snap(a.end, a, b, eps))
    } else {
        let p = a.start + d0 * smin.max(0.0);
        let q = a.start + d0 * smax.min(1.0);
        Intersection::Overlap(snap(p, a, b, eps), snap(q, a, b, eps))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::num::tests::Reasonable;
    use malachite::Rational;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn seg(a: (f64, f64), b: (f64, f64)) -> Segment {
        Segment::new(a.into(), b.into())
    }

    impl Reasonable for Point {
        type Strategy = BoxedStrategy<Point>;

        fn reasonable() -> Self::Strategy {
            (f64::reasonable(), f64::reasonable())
                .prop_map(|(x, y)| Point::new(x, y))
                .boxed()
        }
    }

    impl Reasonable for Segment {
        type Strategy = BoxedStrategy<Segment>;

        fn reasonable() -> Self::Strategy {
            (Point::reasonable(), Point::reasonable())
                .prop_map(|(start, end)| Segment { start, end })
                .boxed()
        }
    }

    #[test]
    fn crossing() {
        let a = seg((0.0, 0.0), (2.0, 2.0));
        let b = seg((0.0, 2.0), (2.0, 0.0));
        assert_eq!(find_intersection(&a, &b, EPS), Intersection::Point(p(1.0, 1.0)));
    }

    #[test]
    fn missing() {
        let a = seg((0.0, 0.0), (1.0, 0.0));
        let b = seg((2.0, -1.0), (2.0, 1.0));
        assert_eq!(find_intersection(&a, &b, EPS), Intersection::None);

        let parallel = seg((0.0, 1.0), (1.0, 1.0));
        assert_eq!(find_intersection(&a, &parallel, EPS), Intersection::None);
    }

    #[test]
    fn shared_endpoint() {
        let a = seg((0.0, 0.0), (1.0, 0.0));
        let b = seg((1.0, 0.0), (1.0, 1.0));
        assert_eq!(find_intersection(&a, &b, EPS), Intersection::Point(p(1.0, 0.0)));

        // Collinear, touching end to end.
        let c = seg((1.0, 0.0), (3.0, 0.0));
        assert_eq!(find_intersection(&a, &c, EPS), Intersection::Point(p(1.0, 0.0)));
        assert_eq!(find_intersection(&c, &a, EPS), Intersection::Point(p(1.0, 0.0)));
    }

    #[test]
    fn snaps_to_endpoints() {
        let a = seg((0.0, 0.0), (1.0, 0.0));
        let b = seg((1.0 + 1e-12, -1.0), (1.0 + 1e-12, 1.0));
        assert_eq!(find_intersection(&a, &b, EPS), Intersection::Point(p(1.0, 0.0)));
    }

    #[test]
    fn overlaps() {
        let a = seg((0.0, 0.0), (4.0, 0.0));
        let b = seg((3.0, 0.0), (1.0, 0.0));
        assert_eq!(
            find_intersection(&a, &b, EPS),
            Intersection::Overlap(p(1.0, 0.0), p(3.0, 0.0))
        );

        let c = seg((2.0, 0.0), (6.0, 0.0));
        assert_eq!(
            find_intersection(&a, &c, EPS),
            Intersection::Overlap(p(2.0, 0.0), p(4.0, 0.0))
        );

        assert_eq!(find_intersection(&a, &a, EPS), Intersection::Overlap(a.start, a.end));
        assert_eq!(find_intersection(&a, &a.reversed(), EPS).len(), 2);
    }

    #[test]
    fn rectangles() {
        let r = Rectangle::from_points(&[p(0.0, 1.0), p(2.0, -1.0), p(1.0, 3.0)]).unwrap();
        assert_eq!(r, Rectangle::new(0.0, -1.0, 2.0, 4.0));
        assert_eq!(r.right(), 2.0);
        assert_eq!(r.top(), 3.0);
        assert!(Rectangle::from_points(&[]).is_none());

        let s = Rectangle::new(2.0, 3.0, 1.0, 1.0);
        // They touch at a corner.
        assert!(r.intersects(&s, 0.0));
        let t = Rectangle::new(2.5, 0.0, 1.0, 1.0);
        assert!(!r.intersects(&t, 0.1));
        assert!(r.intersects(&t, 0.5));

        assert_eq!(r.union(&t), Rectangle::new(0.0, -1.0, 3.5, 4.0));
        assert!(r.contains(&p(2.0 + 1e-12, 0.0), EPS));
        assert!(!r.contains(&p(2.1, 0.0), EPS));
    }

    #[test]
    fn orientation() {
        assert!(signed_area(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 1.0)) > 0.0);
        assert!(signed_area(&p(0.0, 0.0), &p(0.0, 1.0), &p(1.0, 0.0)) < 0.0);
        assert_eq!(signed_area(&p(0.0, 0.0), &p(1.0, 1.0), &p(3.0, 3.0)), 0.0);
    }

    #[test]
    fn distance_to_segment() {
        let s = seg((0.0, 0.0), (2.0, 0.0));
        assert_eq!(s.distance_to(&p(1.0, 1.0)), 1.0);
        assert_eq!(s.distance_to(&p(3.0, 0.0)), 1.0);
        assert_eq!(s.distance_to(&p(0.5, 0.0)), 0.0);
    }

    fn exact(x: f64) -> Rational {
        Rational::try_from(x).unwrap()
    }

    fn exact_abs(x: Rational) -> Rational {
        <Rational as malachite::num::arithmetic::traits::Abs>::abs(x)
    }

    proptest! {
        #[test]
        fn intersection_point_is_accurate(a in Segment::reasonable(), b in Segment::reasonable()) {
            let d0 = a.end - a.start;
            let d1 = b.end - b.start;
            // Skip the nearly-parallel cases, where the intersection is badly conditioned.
            prop_assume!(d0.cross(&d1).abs() >= 1e-3 * d0.length() * d1.length());

            if let Intersection::Point(ip) = find_intersection(&a, &b, EPS) {
                let zero = exact(0.0);
                let one = exact(1.0);
                let (ax, ay) = (exact(a.start.x), exact(a.start.y));
                let (dx0, dy0) = (exact(a.end.x) - &ax, exact(a.end.y) - &ay);
                let (dx1, dy1) = (exact(b.end.x) - exact(b.start.x), exact(b.end.y) - exact(b.start.y));
                let (ex, ey) = (exact(b.start.x) - &ax, exact(b.start.y) - &ay);

                let kross = &dx0 * &dy1 - &dy0 * &dx1;
                let s = (&ex * &dy1 - &ey * &dx1) / &kross;
                let t = (&ex * &dy0 - &ey * &dx0) / &kross;
                // Ignore intersections that we only found thanks to the tolerance.
                if s >= zero && s <= one && t >= zero && t <= one {
                    let x = &ax + &s * &dx0;
                    let y = &ay + &s * &dy0;
                    let tol = exact(1e-6);
                    prop_assert!(exact_abs(exact(ip.x) - x) <= tol);
                    prop_assert!(exact_abs(exact(ip.y) - y) <= tol);
                }
            }
        }

        #[test]
        fn intersection_is_symmetric(a in Segment::reasonable(), b in Segment::reasonable()) {
            let ab = find_intersection(&a, &b, EPS);
            let ba = find_intersection(&b, &a, EPS);
            prop_assert_eq!(ab.len(), ba.len());
        }
    }
}
