use std::{cmp::Ordering, cmp::Reverse, collections::BinaryHeap};

use ordered_float::OrderedFloat;

use crate::geom::{signed_area, Point, Segment};

/// An index into our event arena.
///
/// Each segment in the sweep is represented by a pair of events, one for each
/// endpoint, and each event refers to its partner by index. Splitting a segment
/// just rewires a couple of indices.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash)]
pub(crate) struct EventIdx(pub usize);

impl std::fmt::Debug for EventIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "e_{}", self.0)
    }
}

/// Which of the two input polygons a segment came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PolygonType {
    /// The first operand.
    Subject,
    /// The second operand.
    Clipping,
}

/// How a segment takes part in the result.
///
/// Everything starts out `Normal`. When segments from the two polygons overlap,
/// one copy of the overlap is tagged with the kind of transition it represents
/// and the other copy becomes `NonContributing`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeType {
    Normal,
    NonContributing,
    /// Both polygons have their interior on the same side of the overlap.
    SameTransition,
    /// The polygons have their interiors on opposite sides of the overlap.
    DifferentTransition,
}

#[derive(Clone, Debug)]
pub(crate) struct SweepEvent {
    pub p: Point,
    /// Is `p` the endpoint that the sweep reaches first?
    pub left: bool,
    pub polygon: PolygonType,
    pub other: EventIdx,
    // The following are only meaningful on left events.
    /// Is this segment inside the other polygon?
    pub inside: bool,
    /// Does a vertical ray coming from below leave our own polygon when it crosses this segment?
    pub in_out: bool,
    pub edge_type: EdgeType,
}

/// The flags of the segment just below a newly inserted one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EdgeState {
    pub polygon: PolygonType,
    pub inside: bool,
    pub in_out: bool,
    pub vertical: bool,
}

/// The flags assigned to a newly inserted segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Transition {
    pub inside: bool,
    pub in_out: bool,
}

/// Computes the `inside` and `in_out` flags of a segment on the sweep line
/// from the segment `prev` immediately below it.
///
/// A vertical ray from just below our left endpoint passes through `prev`,
/// unless `prev` is vertical: then the ray starts above it, and `prev`'s
/// crossing of its own polygon hasn't happened yet.
pub(crate) fn classify(polygon: PolygonType, prev: Option<EdgeState>) -> Transition {
    match prev {
        None => Transition {
            inside: false,
            in_out: false,
        },
        Some(prev) if prev.polygon == polygon => Transition {
            inside: prev.inside,
            in_out: !prev.in_out,
        },
        Some(prev) => Transition {
            inside: if prev.vertical {
                prev.in_out
            } else {
                !prev.in_out
            },
            in_out: prev.inside,
        },
    }
}

/// The part of an event that determines when it gets processed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EventKey {
    pub p: Point,
    pub other: Point,
    pub left: bool,
    pub polygon: PolygonType,
    pub idx: EventIdx,
}

impl EventKey {
    /// Is the segment of this event below the point `q`?
    fn below(&self, q: &Point) -> bool {
        if self.left {
            signed_area(&self.p, &self.other, q) > 0.0
        } else {
            signed_area(&self.other, &self.p, q) > 0.0
        }
    }
}

/// The order in which the sweep processes events.
///
/// Events are sorted by `x`, then by `y`. At a single point, right endpoints
/// come before left endpoints. Among events of the same kind at the same point,
/// the one with the lower segment comes first. Collinear segments are ordered
/// by polygon and then by age, so that this is a total order.
pub(crate) fn sweep_order(a: &EventKey, b: &EventKey) -> Ordering {
    OrderedFloat(a.p.x)
        .cmp(&OrderedFloat(b.p.x))
        .then_with(|| OrderedFloat(a.p.y).cmp(&OrderedFloat(b.p.y)))
        .then_with(|| a.left.cmp(&b.left))
        .then_with(|| {
            let (s, t) = if a.left { (a.p, a.other) } else { (a.other, a.p) };
            let area = signed_area(&s, &t, &b.other);
            if area > 0.0 {
                Ordering::Less
            } else if area < 0.0 {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        })
        .then_with(|| a.polygon.cmp(&b.polygon))
        .then_with(|| a.idx.cmp(&b.idx))
}

/// The arena that owns all the sweep events of one boolean operation.
#[derive(Clone, Debug, Default)]
pub(crate) struct Events {
    events: Vec<SweepEvent>,
}

impl std::ops::Index<EventIdx> for Events {
    type Output = SweepEvent;

    fn index(&self, index: EventIdx) -> &Self::Output {
        &self.events[index.0]
    }
}

impl std::ops::IndexMut<EventIdx> for Events {
    fn index_mut(&mut self, index: EventIdx) -> &mut Self::Output {
        &mut self.events[index.0]
    }
}

impl Events {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn push(&mut self, event: SweepEvent) -> EventIdx {
        self.events.push(event);
        EventIdx(self.events.len() - 1)
    }

    /// Adds the two events of a segment, returning (left, right).
    pub fn push_segment(&mut self, seg: &Segment, polygon: PolygonType) -> (EventIdx, EventIdx) {
        let start = EventIdx(self.events.len());
        let end = EventIdx(start.0 + 1);
        let start_is_left = OrderedFloat(seg.start.x)
            .cmp(&OrderedFloat(seg.end.x))
            .then_with(|| OrderedFloat(seg.start.y).cmp(&OrderedFloat(seg.end.y)))
            == Ordering::Less;

        let event = |p: Point, left: bool, other: EventIdx| SweepEvent {
            p,
            left,
            polygon,
            other,
            inside: false,
            in_out: false,
            edge_type: EdgeType::Normal,
        };
        self.events.push(event(seg.start, start_is_left, end));
        self.events.push(event(seg.end, !start_is_left, start));

        if start_is_left {
            (start, end)
        } else {
            (end, start)
        }
    }

    pub fn other(&self, idx: EventIdx) -> &SweepEvent {
        &self[self[idx].other]
    }

    /// The segment of this event, starting at this event's point.
    pub fn segment(&self, idx: EventIdx) -> Segment {
        Segment::new(self[idx].p, self.other(idx).p)
    }

    pub fn key(&self, idx: EventIdx) -> EventKey {
        let ev = &self[idx];
        EventKey {
            p: ev.p,
            other: self[ev.other].p,
            left: ev.left,
            polygon: ev.polygon,
            idx,
        }
    }

    pub fn state(&self, idx: EventIdx) -> EdgeState {
        let ev = &self[idx];
        EdgeState {
            polygon: ev.polygon,
            inside: ev.inside,
            in_out: ev.in_out,
            vertical: ev.p.x == self[ev.other].p.x,
        }
    }

    /// Is the segment of `idx` below the point `q`?
    pub fn below(&self, idx: EventIdx, q: &Point) -> bool {
        self.key(idx).below(q)
    }

    /// Is the segment of `idx` above the point `q`?
    pub fn above(&self, idx: EventIdx, q: &Point) -> bool {
        !self.below(idx, q)
    }

    /// Will `a` be processed after `b`?
    pub fn process_after(&self, a: EventIdx, b: EventIdx) -> bool {
        sweep_order(&self.key(a), &self.key(b)) == Ordering::Greater
    }
}

/// Events waiting for the sweep line, in sweep order.
///
/// Each entry is a snapshot of the event's sort key taken when it was pushed.
/// Splitting a segment can change the far endpoint of an event that's already
/// queued, but only to another point on the same line, which doesn't affect the
/// order. It can also turn a queued right event into a left event; the caller
/// pushes it again, and the stale entry is skipped when it comes up.
#[derive(Clone, Debug, Default)]
pub(crate) struct EventQueue {
    inner: BinaryHeap<Reverse<QueuedEvent>>,
}

#[derive(Clone, Debug)]
struct QueuedEvent(EventKey);

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        sweep_order(&self.0, &other.0)
    }
}

impl EventQueue {
    pub fn push(&mut self, idx: EventIdx, events: &Events) {
        self.inner.push(Reverse(QueuedEvent(events.key(idx))));
    }

    pub fn pop(&mut self, events: &Events) -> Option<EventIdx> {
        while let Some(Reverse(QueuedEvent(key))) = self.inner.pop() {
            if events[key.idx].left == key.left {
                return Some(key.idx);
            }
        }
        None
    }

    /// Are there any live events left?
    ///
    /// Stale entries at the front of the queue are discarded along the way.
    pub fn is_empty(&mut self, events: &Events) -> bool {
        while let Some(Reverse(QueuedEvent(key))) = self.inner.peek() {
            if events[key.idx].left == key.left {
                return false;
            }
            self.inner.pop();
        }
        true
    }

    /// The number of entries, including stale ones.
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}
