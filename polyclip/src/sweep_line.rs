//! The sweep line: the segments that cross the current sweep position, from bottom to top.

use crate::{
    geom::signed_area,
    sweep::{EventIdx, Events, PolygonType},
};

/// Is the segment of left event `a` below the segment of left event `b`?
///
/// This is only meaningful for segments that are both on the sweep line at
/// the same time, and for those it's a strict total order.
pub(crate) fn segment_below(events: &Events, a: EventIdx, b: EventIdx) -> bool {
    if a == b {
        return false;
    }
    let (ea, eb) = (&events[a], &events[b]);
    let a_end = events.other(a).p;
    let b_end = events.other(b).p;

    let collinear = signed_area(&ea.p, &a_end, &eb.p) == 0.0
        && signed_area(&ea.p, &a_end, &b_end) == 0.0;

    if !collinear {
        if ea.p == eb.p {
            return events.below(a, &b_end);
        }
        if ea.p.x == eb.p.x {
            return ea.p.y < eb.p.y;
        }
        // Test the endpoint of whichever segment entered the sweep line later
        // against the other segment. If it starts right on the other segment,
        // its far endpoint says which side it's on.
        if events.process_after(a, b) {
            let q = if signed_area(&eb.p, &b_end, &ea.p) == 0.0 {
                a_end
            } else {
                ea.p
            };
            return events.above(b, &q);
        }
        let q = if signed_area(&ea.p, &a_end, &eb.p) == 0.0 {
            b_end
        } else {
            eb.p
        };
        return events.below(a, &q);
    }

    if ea.polygon != eb.polygon {
        return ea.polygon == PolygonType::Subject;
    }
    if ea.p == eb.p {
        return a < b;
    }
    events.process_after(a, b)
}

/// The segments currently crossing the sweep line.
///
/// We store left events, ordered by [`segment_below`].
#[derive(Clone, Debug, Default)]
pub(crate) struct SweepLine {
    segs: Vec<EventIdx>,
}

impl SweepLine {
    /// Inserts a left event, returning its position.
    pub fn insert(&mut self, idx: EventIdx, events: &Events) -> usize {
        let pos = self
            .segs
            .partition_point(|&other| segment_below(events, other, idx));
        self.segs.insert(pos, idx);
        pos
    }

    // TODO: if we're large, we could use a binary search.
    pub fn position(&self, idx: EventIdx) -> Option<usize> {
        self.segs.iter().position(|&x| x == idx)
    }

    pub fn remove(&mut self, pos: usize) -> EventIdx {
        self.segs.remove(pos)
    }

    pub fn get(&self, pos: usize) -> Option<EventIdx> {
        self.segs.get(pos).copied()
    }

    /// The segment just below position `pos`.
    pub fn prev(&self, pos: usize) -> Option<EventIdx> {
        pos.checked_sub(1).and_then(|p| self.get(p))
    }

    /// The segment just above position `pos`.
    pub fn next(&self, pos: usize) -> Option<EventIdx> {
        self.get(pos + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Segment;

    fn push(events: &mut Events, a: (f64, f64), b: (f64, f64), polygon: PolygonType) -> EventIdx {
        events
            .push_segment(&Segment::new(a.into(), b.into()), polygon)
            .0
    }

    #[test]
    fn ordering() {
        use PolygonType::*;
        let mut events = Events::default();
        let flat = push(&mut events, (0.0, 0.0), (4.0, 0.0), Subject);
        let steep = push(&mut events, (0.0, 0.0), (1.0, 4.0), Subject);
        let high = push(&mut events, (1.0, 2.0), (5.0, 2.0), Clipping);
        let low = push(&mut events, (2.0, -1.0), (3.0, -1.0), Clipping);

        // Shared left endpoint.
        assert!(segment_below(&events, flat, steep));
        assert!(!segment_below(&events, steep, flat));
        // Different left endpoints.
        assert!(segment_below(&events, flat, high));
        assert!(!segment_below(&events, high, flat));
        assert!(segment_below(&events, low, flat));
        assert!(!segment_below(&events, flat, low));
        // `steep` is above (1, 2) at x = 1.
        assert!(segment_below(&events, high, steep));
        assert!(!segment_below(&events, steep, high));

        assert!(!segment_below(&events, flat, flat));
    }

    #[test]
    fn starting_on_another_segment() {
        use PolygonType::*;
        let mut events = Events::default();
        let slope = push(&mut events, (3.0, 3.0), (6.0, 0.0), Clipping);
        // Both of these start at (4, 2), which is on `slope`.
        let up = push(&mut events, (4.0, 2.0), (6.0, 2.0), Subject);
        let down = push(&mut events, (4.0, 2.0), (5.0, 0.0), Subject);

        assert!(segment_below(&events, slope, up));
        assert!(!segment_below(&events, up, slope));
        assert!(segment_below(&events, down, slope));
        assert!(!segment_below(&events, slope, down));
    }

    #[test]
    fn collinear() {
        use PolygonType::*;
        let mut events = Events::default();
        let a = push(&mut events, (0.0, 0.0), (2.0, 2.0), Clipping);
        let b = push(&mut events, (1.0, 1.0), (3.0, 3.0), Subject);
        let c = push(&mut events, (1.0, 1.0), (4.0, 4.0), Subject);

        assert!(segment_below(&events, b, a));
        assert!(!segment_below(&events, a, b));
        assert!(segment_below(&events, b, c));
        assert!(!segment_below(&events, c, b));
    }

    #[test]
    fn insert_and_remove() {
        use PolygonType::*;
        let mut events = Events::default();
        let mid = push(&mut events, (0.0, 1.0), (4.0, 1.0), Subject);
        let top = push(&mut events, (0.0, 3.0), (4.0, 3.0), Subject);
        let bottom = push(&mut events, (1.0, -2.0), (4.0, 0.0), Clipping);

        let mut line = SweepLine::default();
        assert!(line.segs.is_empty());
        assert_eq!(line.insert(mid, &events), 0);
        assert_eq!(line.insert(top, &events), 1);
        assert_eq!(line.insert(bottom, &events), 0);
        assert_eq!(line.segs.len(), 3);

        let pos = line.position(mid).unwrap();
        assert_eq!(pos, 1);
        assert_eq!(line.prev(pos), Some(bottom));
        assert_eq!(line.next(pos), Some(top));
        assert_eq!(line.prev(0), None);
        assert_eq!(line.next(2), None);

        assert_eq!(line.remove(pos), mid);
        assert_eq!(line.position(mid), None);
        assert_eq!(line.next(0), Some(top));
    }
}
