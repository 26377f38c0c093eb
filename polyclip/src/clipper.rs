//! The Martinez-Rueda sweep that computes boolean operations on polygons.
//!
//! Every edge of both polygons is split into a pair of sweep events (one per
//! endpoint). As a vertical line sweeps from left to right, we maintain the
//! edges that cross it, ordered from bottom to top. When an edge enters the
//! sweep line we look at the edge just below it to decide whether it's inside
//! the other polygon; when it leaves, that decision tells us whether it's part
//! of the result. Neighboring edges are checked for intersections, and edges
//! are divided at every intersection point so that in the end no two edges
//! cross.

use crate::{
    config::{ClipConfig, Reconstruction},
    connector::Connector,
    geom::{find_intersection, Intersection, Point},
    num,
    polygon::Polygon,
    segments::{contour_segments, Welder},
    sweep::{classify, EdgeType, EventIdx, EventQueue, Events, PolygonType, SweepEvent},
    sweep_line::SweepLine,
    BooleanOp, Error,
};

/// How much to trust a [`ClipOutput`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClipStatus {
    /// Every kept edge ended up in a closed ring.
    Exact,
    /// Some kept edges didn't close up into rings, and were left out.
    ///
    /// This happens when the inputs aren't quite consistent, for example when
    /// nearly-coincident vertices are farther apart than the precision.
    OpenChainsDropped(usize),
    /// Nothing closed up into a ring, so the result is the longest open chain
    /// of edges, closed off. See [`Reconstruction::BestEffort`].
    LargestStrip,
    /// The sweep gave up after this many iterations, and the result is
    /// whatever had been assembled so far.
    Truncated {
        /// The number of events that were processed.
        iterations: usize,
    },
}

/// The result of [`PolygonClipper::compute`].
#[derive(Clone, Debug, PartialEq)]
pub struct ClipOutput {
    /// The resulting polygon, or `None` if it's empty.
    pub polygon: Option<Polygon>,
    /// Whether the polygon can be trusted.
    pub status: ClipStatus,
}

impl ClipOutput {
    fn exact(polygon: Option<Polygon>) -> Self {
        ClipOutput {
            polygon,
            status: ClipStatus::Exact,
        }
    }

    /// Returns true if the result was computed without any degradation.
    pub fn is_exact(&self) -> bool {
        self.status == ClipStatus::Exact
    }
}

/// Computes boolean operations between a subject polygon and a clipping polygon.
///
/// The polygons are borrowed and never modified; each call to
/// [`compute`](PolygonClipper::compute) runs a fresh sweep.
#[derive(Clone, Debug)]
pub struct PolygonClipper<'a> {
    subject: &'a Polygon,
    clipping: &'a Polygon,
    config: ClipConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Idle,
    Seeding,
    Sweeping,
    Done,
}

impl<'a> PolygonClipper<'a> {
    /// Creates a clipper with the default configuration.
    pub fn new(subject: &'a Polygon, clipping: &'a Polygon) -> Self {
        PolygonClipper {
            subject,
            clipping,
            config: ClipConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: ClipConfig) -> Self {
        self.config = config;
        self
    }

    /// The current configuration.
    pub fn config(&self) -> &ClipConfig {
        &self.config
    }

    /// Computes `subject op clipping`.
    ///
    /// Returns an error only if the input coordinates or the configured
    /// precision are invalid. Geometric trouble is reported in the returned
    /// [`ClipStatus`] instead.
    pub fn compute(&self, op: BooleanOp) -> Result<ClipOutput, Error> {
        let mut stage = Stage::Idle;
        tracing::trace!(?stage, ?op);

        let magnitude = num::magnitude(
            self.subject
                .contours()
                .iter()
                .chain(self.clipping.contours())
                .flat_map(|c| c.points())
                .flat_map(|p| [p.x, p.y]),
        )?;
        let eps = self.config.precision.resolve(magnitude)?;

        // Contours that don't enclose anything can't contribute to any result.
        let without_degenerate = |p: &Polygon| -> Polygon {
            p.contours()
                .iter()
                .filter(|c| !c.is_degenerate(eps))
                .cloned()
                .collect()
        };
        let subject = without_degenerate(self.subject);
        let clipping = without_degenerate(self.clipping);

        match (subject.bounding_box(), clipping.bounding_box()) {
            (Some(s), Some(c)) if s.intersects(&c, eps) => {}
            _ => {
                let out = trivial(subject, clipping, op);
                tracing::debug!(?op, empty = out.is_none(), "trivial result");
                return Ok(ClipOutput::exact(out));
            }
        }

        stage = Stage::Seeding;
        tracing::trace!(?stage);
        let mut sweep = Sweep::new(op, eps);
        let mut welder = Welder::new(eps);
        // Welding can move a vertex by up to `eps`, so the early exits use
        // the welded coordinates.
        let mut subject_right = f64::NEG_INFINITY;
        let mut clipping_right = f64::NEG_INFINITY;
        for (polygon, kind, right) in [
            (&subject, PolygonType::Subject, &mut subject_right),
            (&clipping, PolygonType::Clipping, &mut clipping_right),
        ] {
            for contour in polygon.contours() {
                for seg in contour_segments(contour, &mut welder) {
                    *right = right.max(seg.start.x).max(seg.end.x);
                    let (l, r) = sweep.events.push_segment(&seg, kind);
                    sweep.queue.push(l, &sweep.events);
                    sweep.queue.push(r, &sweep.events);
                }
            }
        }
        sweep.subject_right = subject_right + eps;
        sweep.min_right = subject_right.min(clipping_right) + eps;
        let seeded = sweep.queue.len();
        let limit = self.config.iteration_limit(seeded);

        stage = Stage::Sweeping;
        tracing::trace!(?stage, seeded, limit);
        let truncated = sweep.run(limit);

        stage = Stage::Done;
        tracing::trace!(?stage, iterations = sweep.iterations);
        let output = self.reconstruct(&sweep.connector, truncated.then_some(sweep.iterations));
        tracing::debug!(
            ?op,
            eps,
            seeded,
            events = sweep.events.len(),
            iterations = sweep.iterations,
            contours = output.polygon.as_ref().map_or(0, Polygon::len),
            status = ?output.status,
            "clipped"
        );
        Ok(output)
    }

    fn reconstruct(&self, connector: &Connector, truncated: Option<usize>) -> ClipOutput {
        let open = connector.open_chains().len();
        let mut polygon = connector.to_polygon();
        let mut status = match open {
            0 => ClipStatus::Exact,
            n => ClipStatus::OpenChainsDropped(n),
        };

        if polygon.is_none() && open > 0 && self.config.reconstruction == Reconstruction::BestEffort
        {
            if let Some(strip) = connector.to_polygon_from_largest_line_strip() {
                polygon = Some(strip);
                status = ClipStatus::LargestStrip;
            }
        }
        if let ClipStatus::OpenChainsDropped(n) = status {
            tracing::warn!(open_chains = n, "dropping open chains");
        }
        if let Some(iterations) = truncated {
            status = ClipStatus::Truncated { iterations };
        }
        ClipOutput { polygon, status }
    }
}

// The result when one of the polygons is empty, or they're far apart.
fn trivial(subject: Polygon, clipping: Polygon, op: BooleanOp) -> Option<Polygon> {
    let non_empty = |p: Polygon| (!p.is_empty()).then_some(p);
    match op {
        BooleanOp::Intersection => None,
        BooleanOp::Difference => non_empty(subject),
        BooleanOp::Union | BooleanOp::Xor => non_empty(
            subject
                .contours()
                .iter()
                .chain(clipping.contours())
                .cloned()
                .collect(),
        ),
    }
}

/// The state of one sweep.
struct Sweep {
    op: BooleanOp,
    eps: f64,
    events: Events,
    queue: EventQueue,
    line: SweepLine,
    connector: Connector,
    iterations: usize,
    // Past this x coordinate (give or take `eps`), only one of the polygons has
    // any edges left.
    min_right: f64,
    subject_right: f64,
}

impl Sweep {
    fn new(op: BooleanOp, eps: f64) -> Self {
        Sweep {
            op,
            eps,
            events: Events::default(),
            queue: EventQueue::default(),
            line: SweepLine::default(),
            connector: Connector::new(eps),
            iterations: 0,
            min_right: f64::INFINITY,
            subject_right: f64::INFINITY,
        }
    }

    /// Processes events until the queue runs out (or we can stop early).
    ///
    /// Returns true if we gave up because of the iteration limit.
    fn run(&mut self, limit: usize) -> bool {
        while !self.queue.is_empty(&self.events) {
            if self.iterations >= limit {
                tracing::warn!(iterations = self.iterations, "sweep hit the iteration limit");
                return true;
            }
            let Some(idx) = self.queue.pop(&self.events) else {
                break;
            };
            self.iterations += 1;

            let x = self.events[idx].p.x;
            match self.op {
                BooleanOp::Intersection if x > self.min_right => break,
                BooleanOp::Difference if x > self.subject_right => break,
                BooleanOp::Union if x > self.min_right => {
                    // Nothing left to intersect with, so everything else is in the union.
                    self.drain(idx);
                    break;
                }
                _ => {}
            }

            if self.events[idx].left {
                self.enter(idx);
            } else {
                self.exit(idx);
            }
        }
        false
    }

    fn drain(&mut self, first: EventIdx) {
        let mut next = Some(first);
        while let Some(idx) = next {
            if !self.events[idx].left {
                self.connector.add(self.events.segment(idx));
            }
            next = self.queue.pop(&self.events);
        }
    }

    // A segment enters the sweep line.
    fn enter(&mut self, idx: EventIdx) {
        let pos = self.line.insert(idx, &self.events);
        let prev = self.line.prev(pos);
        self.set_flags(idx, prev);

        // Tagging an overlap changes the flags that the segments above it
        // were classified with.
        if let Some(next) = self.line.next(pos) {
            if self.possible_intersection(idx, next) {
                self.set_flags(idx, prev);
                self.set_flags(next, Some(idx));
            }
        }
        if let Some(prev) = prev {
            if self.possible_intersection(prev, idx) {
                let below = self.line.position(prev).and_then(|p| self.line.prev(p));
                self.set_flags(prev, below);
                self.set_flags(idx, Some(prev));
            }
        }
    }

    // Sets the flags of left event `idx` from the segment just below it.
    fn set_flags(&mut self, idx: EventIdx, prev: Option<EventIdx>) {
        let t = classify(self.events[idx].polygon, prev.map(|e| self.events.state(e)));
        self.events[idx].inside = t.inside;
        self.events[idx].in_out = t.in_out;
    }

    // A segment leaves the sweep line.
    fn exit(&mut self, idx: EventIdx) {
        let left = self.events[idx].other;
        let Some(pos) = self.line.position(left) else {
            tracing::warn!(event = ?idx, "exiting segment is not on the sweep line");
            return;
        };
        let prev = self.line.prev(pos);
        let next = self.line.next(pos);

        if contributes(self.op, &self.events[left]) {
            self.connector.add(self.events.segment(idx));
        }

        self.line.remove(pos);
        if let (Some(prev), Some(next)) = (prev, next) {
            self.possible_intersection(prev, next);
        }
    }

    // Checks the segments of left events `e1` and `e2`, dividing them where
    // they cross. Returns true if an overlap was tagged, which means their
    // flags need to be recomputed.
    fn possible_intersection(&mut self, e1: EventIdx, e2: EventIdx) -> bool {
        let eps = self.eps;
        let seg1 = self.events.segment(e1);
        let seg2 = self.events.segment(e2);
        let near = |p: &Point, q: &Point| p.approx_eq(q, eps);

        let (p1, q1) = (self.events[e1].p, self.events.other(e1).p);
        let (p2, q2) = (self.events[e2].p, self.events.other(e2).p);

        match find_intersection(&seg1, &seg2, eps) {
            Intersection::None => false,
            Intersection::Point(ip) => {
                // Meeting at an endpoint of both segments.
                if near(&p1, &p2) || near(&q1, &q2) {
                    return false;
                }
                if !near(&ip, &p1) && !near(&ip, &q1) {
                    self.divide_segment(e1, ip);
                }
                if !near(&ip, &p2) && !near(&ip, &q2) {
                    self.divide_segment(e2, ip);
                }
                false
            }
            Intersection::Overlap(..) => {
                if self.events[e1].polygon == self.events[e2].polygon {
                    return false;
                }
                self.resolve_overlap(e1, e2)
            }
        }
    }

    // Two segments from different polygons overlap. The parts that don't
    // overlap get divided off, and once the overlapping parts start at the
    // same point, one copy is tagged with the kind of transition it is and
    // the other is marked as non-contributing.
    //
    // Returns true if the segments were tagged.
    fn resolve_overlap(&mut self, e1: EventIdx, e2: EventIdx) -> bool {
        let eps = self.eps;
        let o1 = self.events[e1].other;
        let o2 = self.events[e2].other;
        let in_order = |a: EventIdx, b: EventIdx| {
            if self.events.process_after(a, b) {
                (b, a)
            } else {
                (a, b)
            }
        };

        let left_coincide = self.events[e1].p.approx_eq(&self.events[e2].p, eps);
        let right_coincide = self.events[o1].p.approx_eq(&self.events[o2].p, eps);
        let (first, second) = in_order(e1, e2);
        let (near_end, far_end) = in_order(o1, o2);

        if left_coincide {
            self.set_type(e2, EdgeType::NonContributing);
            let transition = if self.events[e1].in_out == self.events[e2].in_out {
                EdgeType::SameTransition
            } else {
                EdgeType::DifferentTransition
            };
            self.set_type(e1, transition);
            if !right_coincide {
                // Cut the longer one where the shorter one ends.
                let (longer, p) = (self.events[far_end].other, self.events[near_end].p);
                self.divide_segment(longer, p);
            }
            return true;
        }

        let p = self.events[second].p;
        if right_coincide {
            self.divide_segment(first, p);
        } else if first != self.events[far_end].other {
            // Partial overlap.
            self.divide_segment(first, p);
            let q = self.events[near_end].p;
            self.divide_segment(second, q);
        } else {
            // One segment contains the other.
            self.divide_segment(first, p);
            let q = self.events[near_end].p;
            // The first division gave `far_end` a new partner.
            let outer = self.events[far_end].other;
            self.divide_segment(outer, q);
        }
        false
    }

    fn set_type(&mut self, idx: EventIdx, edge_type: EdgeType) {
        self.events[idx].edge_type = edge_type;
    }

    // Divides the segment of left event `e` at `p`, which should be strictly
    // inside it.
    fn divide_segment(&mut self, e: EventIdx, p: Point) {
        let other = self.events[e].other;
        let polygon = self.events[e].polygon;
        tracing::trace!(event = ?e, ?p, "dividing segment");

        let event = |left: bool, other: EventIdx| SweepEvent {
            p,
            left,
            polygon,
            other,
            inside: false,
            in_out: false,
            edge_type: EdgeType::Normal,
        };
        let r = self.events.push(event(false, e));
        let l = self.events.push(event(true, other));

        let swapped = self.events.process_after(l, other);
        if swapped {
            // Rounding put `p` past the right endpoint.
            tracing::debug!(event = ?e, ?p, "swapping endpoint roles after division");
            self.events[other].left = true;
            self.events[l].left = false;
        }

        self.events[other].other = l;
        self.events[e].other = r;
        self.queue.push(l, &self.events);
        self.queue.push(r, &self.events);
        if swapped {
            self.queue.push(other, &self.events);
        }
    }
}

// Does the segment of left event `left` belong to the result?
fn contributes(op: BooleanOp, left: &SweepEvent) -> bool {
    match left.edge_type {
        EdgeType::Normal => match op {
            BooleanOp::Intersection => left.inside,
            BooleanOp::Union => !left.inside,
            BooleanOp::Difference => match left.polygon {
                PolygonType::Subject => !left.inside,
                PolygonType::Clipping => left.inside,
            },
            BooleanOp::Xor => true,
        },
        EdgeType::SameTransition => matches!(op, BooleanOp::Intersection | BooleanOp::Union),
        EdgeType::DifferentTransition => op == BooleanOp::Difference,
        EdgeType::NonContributing => false,
    }
}
