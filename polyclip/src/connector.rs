//! Stitching the kept edges back together into rings.
//!
//! The sweep hands us edges one at a time, in no particular order along the
//! boundary. We keep a collection of chains, each an open path or a closed
//! ring, and glue every new edge onto the end of a chain that it touches.

use std::collections::VecDeque;

use crate::{
    contour::Contour,
    geom::{Point, Segment},
    polygon::Polygon,
};

/// The outcome of trying to attach something to a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Link {
    /// It doesn't touch either end of the chain.
    Rejected,
    /// The chain got longer and is still open.
    Extended,
    /// The chain is now a ring.
    Closed,
    /// The chain closed up without enclosing anything, and should be dropped.
    ///
    /// This happens when a two-point chain meets its own edge reversed. The
    /// two edges cancel, so the segment is consumed along with the chain
    /// instead of being rejected and starting a new open chain.
    Collapsed,
}

/// A path that grows at both ends, until it closes into a ring.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PointChain {
    points: VecDeque<Point>,
    closed: bool,
}

impl PointChain {
    pub fn from_segment(seg: &Segment) -> Self {
        PointChain {
            points: VecDeque::from([seg.start, seg.end]),
            closed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ends(&self) -> Option<(Point, Point)> {
        Some((*self.points.front()?, *self.points.back()?))
    }

    fn close(&mut self) -> Link {
        self.closed = true;
        if self.points.len() < 3 {
            Link::Collapsed
        } else {
            Link::Closed
        }
    }

    /// Tries to attach a segment to one of the ends of this chain.
    pub fn link_segment(&mut self, seg: &Segment, eps: f64) -> Link {
        let Some((front, back)) = self.ends() else {
            return Link::Rejected;
        };
        let (a, b) = (seg.start, seg.end);

        // For each end of the segment that touches an end of the chain, either the
        // other end of the segment touches the other end of the chain (and we're
        // closed), or it becomes the new end of the chain.
        if a.approx_eq(&front, eps) || b.approx_eq(&front, eps) {
            let far = if a.approx_eq(&front, eps) { b } else { a };
            if far.approx_eq(&back, eps) {
                return self.close();
            }
            self.points.push_front(far);
            return Link::Extended;
        }
        if a.approx_eq(&back, eps) || b.approx_eq(&back, eps) {
            let far = if a.approx_eq(&back, eps) { b } else { a };
            // `far` can't be near `front`, or we'd have matched above.
            self.points.push_back(far);
            return Link::Extended;
        }
        Link::Rejected
    }

    /// Can `other` be attached to one of our ends?
    pub fn touches(&self, other: &PointChain, eps: f64) -> bool {
        match (self.ends(), other.ends()) {
            (Some((f0, b0)), Some((f1, b1))) => {
                b0.approx_eq(&f1, eps)
                    || f0.approx_eq(&b1, eps)
                    || f0.approx_eq(&f1, eps)
                    || b0.approx_eq(&b1, eps)
            }
            _ => false,
        }
    }

    /// Splices another chain onto one of our ends, reversing it if necessary.
    pub fn link_chain(&mut self, mut other: PointChain, eps: f64) -> Link {
        let (Some((front, back)), Some((other_front, other_back))) = (self.ends(), other.ends())
        else {
            return Link::Rejected;
        };

        if other_front.approx_eq(&back, eps) {
            other.points.pop_front();
            self.points.extend(other.points);
        } else if other_back.approx_eq(&front, eps) {
            other.points.pop_back();
            for p in other.points.into_iter().rev() {
                self.points.push_front(p);
            }
        } else if other_front.approx_eq(&front, eps) {
            other.points.pop_front();
            for p in other.points {
                self.points.push_front(p);
            }
        } else if other_back.approx_eq(&back, eps) {
            other.points.pop_back();
            self.points.extend(other.points.into_iter().rev());
        } else {
            return Link::Rejected;
        }

        match self.ends() {
            Some((f, b)) if self.points.len() > 1 && f.approx_eq(&b, eps) => {
                self.points.pop_back();
                self.close()
            }
            _ => Link::Extended,
        }
    }

    /// The points of this chain as a ring.
    pub fn to_contour(&self) -> Contour {
        self.points.iter().copied().collect()
    }
}

/// Collects edges into chains.
#[derive(Clone, Debug)]
pub(crate) struct Connector {
    eps: f64,
    open: Vec<PointChain>,
    closed: Vec<PointChain>,
}

impl Connector {
    pub fn new(eps: f64) -> Self {
        Connector {
            eps,
            open: Vec::new(),
            closed: Vec::new(),
        }
    }

    pub fn open_chains(&self) -> &[PointChain] {
        &self.open
    }

    pub fn add(&mut self, seg: Segment) {
        let eps = self.eps;
        for j in 0..self.open.len() {
            match self.open[j].link_segment(&seg, eps) {
                Link::Rejected => continue,
                Link::Closed => {
                    let chain = self.open.remove(j);
                    self.closed.push(chain);
                }
                Link::Collapsed => {
                    self.open.remove(j);
                }
                Link::Extended => self.merge(j),
            }
            return;
        }
        self.open.push(PointChain::from_segment(&seg));
    }

    // Chain `j` just got a new end; see if that end meets another open chain.
    fn merge(&mut self, j: usize) {
        let eps = self.eps;
        let Some(k) = (0..self.open.len())
            .find(|&k| k != j && self.open[j].touches(&self.open[k], eps))
        else {
            return;
        };

        let other = self.open.remove(k);
        let j = if k < j { j - 1 } else { j };
        match self.open[j].link_chain(other, eps) {
            Link::Closed => {
                let chain = self.open.remove(j);
                self.closed.push(chain);
            }
            Link::Collapsed => {
                self.open.remove(j);
            }
            Link::Extended | Link::Rejected => {}
        }
    }

    /// Builds a polygon out of the closed rings, or `None` if there aren't any.
    ///
    /// Open chains are ignored, and so are rings that don't enclose any area.
    pub fn to_polygon(&self) -> Option<Polygon> {
        let mut polygon: Polygon = self
            .closed
            .iter()
            .filter(|c| c.is_closed() && c.len() >= 3)
            .map(PointChain::to_contour)
            .filter(|c| !c.is_degenerate(self.eps))
            .collect();
        if polygon.is_empty() {
            return None;
        }
        polygon.fix_orientation(self.eps);
        Some(polygon)
    }

    /// Builds a single-contour polygon out of the chain with the most points,
    /// whether or not it's closed.
    pub fn to_polygon_from_largest_line_strip(&self) -> Option<Polygon> {
        let largest = self
            .open
            .iter()
            .chain(&self.closed)
            .max_by_key(|c| c.len())
            .filter(|c| c.len() >= 3)?;
        let mut polygon = Polygon::from(largest.to_contour());
        polygon.fix_orientation(self.eps);
        Some(polygon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(a: (f64, f64), b: (f64, f64)) -> Segment {
        Segment::new(a.into(), b.into())
    }

    fn chain(ps: &[(f64, f64)]) -> PointChain {
        PointChain {
            points: ps.iter().map(|&p| p.into()).collect(),
            closed: false,
        }
    }

    fn points(c: &PointChain) -> Vec<(f64, f64)> {
        c.points.iter().map(|&p| p.into()).collect()
    }

    #[test]
    fn link_segment() {
        let mut c = PointChain::from_segment(&seg((0.0, 0.0), (1.0, 0.0)));
        assert_eq!(c.link_segment(&seg((5.0, 5.0), (6.0, 6.0)), 1e-9), Link::Rejected);

        assert_eq!(c.link_segment(&seg((1.0, 1.0), (1.0, 0.0)), 1e-9), Link::Extended);
        assert_eq!(c.link_segment(&seg((0.0, 0.0), (0.0, 1.0)), 1e-9), Link::Extended);
        assert_eq!(points(&c), vec![(0.0, 1.0), (0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);

        // Within tolerance of both ends.
        assert_eq!(c.link_segment(&seg((1.0, 1.0 + 1e-12), (0.0, 1.0)), 1e-9), Link::Closed);
        assert!(c.is_closed());
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn collapse() {
        let mut c = PointChain::from_segment(&seg((0.0, 0.0), (1.0, 0.0)));
        assert_eq!(c.link_segment(&seg((1.0, 0.0), (0.0, 0.0)), 1e-9), Link::Collapsed);

        // Neither edge is left behind as an open chain.
        let mut connector = Connector::new(1e-9);
        connector.add(seg((0.0, 0.0), (1.0, 0.0)));
        connector.add(seg((1.0, 0.0), (0.0, 0.0)));
        assert!(connector.open_chains().is_empty());
        assert_eq!(connector.to_polygon(), None);
    }

    #[test]
    fn link_chain() {
        let eps = 1e-9;
        let base = chain(&[(0.0, 0.0), (1.0, 0.0)]);

        // back to front
        let mut c = base.clone();
        assert_eq!(c.link_chain(chain(&[(1.0, 0.0), (2.0, 0.0)]), eps), Link::Extended);
        assert_eq!(points(&c), vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);

        // front to back
        let mut c = base.clone();
        assert_eq!(c.link_chain(chain(&[(-2.0, 0.0), (-1.0, 0.0), (0.0, 0.0)]), eps), Link::Extended);
        assert_eq!(points(&c), vec![(-2.0, 0.0), (-1.0, 0.0), (0.0, 0.0), (1.0, 0.0)]);

        // front to front
        let mut c = base.clone();
        assert_eq!(c.link_chain(chain(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]), eps), Link::Extended);
        assert_eq!(points(&c), vec![(0.0, 2.0), (0.0, 1.0), (0.0, 0.0), (1.0, 0.0)]);

        // back to back
        let mut c = base.clone();
        assert_eq!(c.link_chain(chain(&[(1.0, 2.0), (1.0, 1.0), (1.0, 0.0)]), eps), Link::Extended);
        assert_eq!(points(&c), vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (1.0, 2.0)]);

        let mut c = base.clone();
        assert_eq!(c.link_chain(chain(&[(5.0, 5.0), (6.0, 6.0)]), eps), Link::Rejected);
        assert_eq!(c, base);

        // Both ends meet.
        let mut c = base.clone();
        assert_eq!(c.link_chain(chain(&[(1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]), eps), Link::Closed);
        assert_eq!(points(&c), vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
    }

    #[test]
    fn square_out_of_order() {
        let mut conn = Connector::new(1e-9);
        conn.add(seg((0.0, 0.0), (1.0, 0.0)));
        conn.add(seg((1.0, 1.0), (0.0, 1.0)));
        assert_eq!(conn.open_chains().len(), 2);
        // This one joins the two open chains.
        conn.add(seg((1.0, 0.0), (1.0, 1.0)));
        assert_eq!(conn.open_chains().len(), 1);
        conn.add(seg((0.0, 0.0), (0.0, 1.0)));
        assert!(conn.open_chains().is_empty());
        assert_eq!(conn.closed.len(), 1);

        let polygon = conn.to_polygon().unwrap();
        assert_eq!(polygon.len(), 1);
        assert!(polygon.contours()[0].is_counter_clockwise());
        assert_eq!(polygon.area(), 1.0);
    }

    #[test]
    fn square_with_hole() {
        let mut conn = Connector::new(1e-9);
        let ring = |x0: f64, size: f64| {
            let x1 = x0 + size;
            [
                seg((x0, x0), (x1, x0)),
                seg((x1, x0), (x1, x1)),
                seg((x1, x1), (x0, x1)),
                seg((x0, x1), (x0, x0)),
            ]
        };
        for s in ring(0.0, 4.0).into_iter().chain(ring(1.0, 2.0)) {
            conn.add(s);
        }
        let polygon = conn.to_polygon().unwrap();
        let ccw: Vec<_> = polygon
            .contours()
            .iter()
            .map(Contour::is_counter_clockwise)
            .collect();
        assert_eq!(ccw, vec![true, false]);
        assert_eq!(polygon.area(), 12.0);
    }

    #[test]
    fn largest_strip() {
        let mut conn = Connector::new(1e-9);
        assert_eq!(conn.to_polygon(), None);
        assert_eq!(conn.to_polygon_from_largest_line_strip(), None);

        // An almost-closed triangle and a short stray edge.
        conn.add(seg((0.0, 0.0), (2.0, 0.0)));
        conn.add(seg((2.0, 0.0), (1.0, 2.0)));
        conn.add(seg((1.0, 2.0), (0.0, 0.1)));
        conn.add(seg((5.0, 5.0), (6.0, 5.0)));
        assert_eq!(conn.to_polygon(), None);

        let polygon = conn.to_polygon_from_largest_line_strip().unwrap();
        assert_eq!(polygon.len(), 1);
        assert_eq!(polygon.contours()[0].len(), 4);
        assert!(polygon.contours()[0].is_counter_clockwise());
    }
}
