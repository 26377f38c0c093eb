use std::collections::HashMap;

use crate::{
    contour::Contour,
    geom::{Point, Segment},
};

/// Snaps near-coincident vertices onto a single representative.
///
/// Every point handed to [`Welder::weld`] is compared against the points
/// welded before it; if one of them is within `eps` (in both coordinates) the
/// earlier point is returned instead. After welding, the sweep can compare
/// vertices exactly.
///
/// Points are bucketed in a grid of `eps`-sized cells, so each lookup only
/// needs to look at the neighboring cells.
#[derive(Debug)]
pub(crate) struct Welder {
    eps: f64,
    cells: HashMap<(i64, i64), Vec<Point>>,
}

impl Welder {
    pub fn new(eps: f64) -> Self {
        Self {
            eps,
            cells: HashMap::new(),
        }
    }

    fn cell(&self, p: &Point) -> (i64, i64) {
        // `as` saturates, which is fine: saturated cells are just crowded.
        ((p.x / self.eps).floor() as i64, (p.y / self.eps).floor() as i64)
    }

    pub fn weld(&mut self, p: Point) -> Point {
        if self.eps <= 0.0 {
            return p;
        }

        let (cx, cy) = self.cell(&p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                let key = (cx.saturating_add(dx), cy.saturating_add(dy));
                if let Some(q) = self
                    .cells
                    .get(&key)
                    .and_then(|ps| ps.iter().find(|q| q.approx_eq(&p, self.eps)))
                {
                    return *q;
                }
            }
        }
        self.cells.entry((cx, cy)).or_default().push(p);
        p
    }
}

fn cyclic_pairs<T>(xs: &[T]) -> impl Iterator<Item = (&T, &T)> {
    xs.windows(2)
        .map(|pair| (&pair[0], &pair[1]))
        .chain(xs.last().zip(xs.first()))
}

/// Welds the vertices of a contour and returns its non-degenerate edges.
///
/// Consecutive vertices that weld together produce zero-length edges, and
/// those are dropped.
pub(crate) fn contour_segments(contour: &Contour, welder: &mut Welder) -> Vec<Segment> {
    let points: Vec<_> = contour.points().iter().map(|p| welder.weld(*p)).collect();
    if points.len() <= 1 {
        return Vec::new();
    }

    cyclic_pairs(&points)
        .filter(|(p, q)| p != q)
        .map(|(p, q)| Segment::new(*p, *q))
        .collect()
}
