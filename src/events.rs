//! C2: the event queue — an AVL map from event point to the set of
//! segments touching it, with tolerance-based merging ("glomming") of
//! nearby points into one event.

use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::avl::AvlMap;
use crate::error::SweepError;
use crate::geometry::{Point, Role, Segment};

pub type Tag = (usize, Role);

/// The live event queue, keyed by point.
pub struct EventStore {
    map: AvlMap<Point, BTreeSet<Tag>>,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    pub fn new() -> Self {
        Self { map: AvlMap::new() }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All recorded events within the axis-aligned box `[lo, hi]`, pruned
    /// first by the map's lexicographic range (a superset of the box) and
    /// then filtered down to genuine box membership.
    pub fn range_box(&self, lo: Point, hi: Point) -> Vec<(Point, BTreeSet<Tag>)> {
        self.map
            .range(&lo, &hi)
            .into_iter()
            .filter(|(p, _)| p.x >= lo.x && p.x <= hi.x && p.y >= lo.y && p.y <= hi.y)
            .map(|(p, set)| (*p, set.clone()))
            .collect()
    }

    /// Records that `tags` all touch `(x, y)`, merging with any existing
    /// event within `tol` of that point. When multiple existing events
    /// fall in range, they're all unioned into one, keeping the
    /// coordinates of whichever matched event is encountered first.
    pub fn add_point(&mut self, x: f64, y: f64, tags: impl IntoIterator<Item = Tag>, tol: f64) {
        let point = Point::new(x, y);
        let lo = Point::new(x - tol, y - tol);
        let hi = Point::new(x + tol, y + tol);
        let nearby = self.range_box(lo, hi);

        if nearby.is_empty() {
            let mut set = BTreeSet::new();
            set.extend(tags);
            self.map.insert(point, set);
            return;
        }

        let mut glommed: BTreeSet<Tag> = BTreeSet::new();
        glommed.extend(tags);
        for (p, set) in &nearby {
            self.map.remove(p);
            glommed.extend(set.iter().copied());
        }
        let anchor = nearby[0].0;
        self.map.insert(anchor, glommed);
    }

    /// Re-keys events near a (truly) vertical segment onto the segment's
    /// exact x-coordinate, provided they fall strictly within its y-span.
    /// Run once per vertical segment, after the initial pass of
    /// [`EventStore::add_point`] calls, to correct for endpoints of
    /// crossing segments landing a hair off the vertical line.
    pub fn glom_to_vertical(&mut self, seg: &Segment, tol: f64) {
        let (ymin, ymax) = (seg.p1.y, seg.p2.y);
        let x = seg.p1.x;
        let lo = Point::new(x - tol, ymin);
        let hi = Point::new(x + tol, ymax);
        for (p, set) in self.range_box(lo, hi) {
            if p.y >= ymin + tol && p.y <= ymax - tol && (p.x - x).abs() < tol {
                self.map.remove(&p);
                self.map.insert(Point::new(x, p.y), set);
            }
        }
    }

    pub fn min(&self) -> Option<(Point, BTreeSet<Tag>)> {
        self.map.min().map(|(p, s)| (*p, s.clone()))
    }

    /// The next event strictly after `point`, by point order — how the
    /// sweep driver advances the line.
    pub fn next_after(&self, point: &Point) -> Option<(Point, BTreeSet<Tag>)> {
        self.map.successor(point).map(|(p, s)| (*p, s.clone()))
    }

    pub fn traverse(&self) -> Vec<(Point, BTreeSet<Tag>)> {
        self.map.traverse().into_iter().map(|(p, s)| (*p, s.clone())).collect()
    }

    /// Recovers the (possibly glom-shifted) segment list implied by this
    /// event set's `Left`/`Right` tags, in segment-index order.
    ///
    /// `Segment::new` re-normalizes its endpoints on construction, so no
    /// separate re-orientation pass over the recovered list is needed: any
    /// drift a glomming pass caused is absorbed here automatically.
    pub fn processed_segments(&self, segment_count: usize) -> Result<Vec<Segment>, SweepError> {
        let mut left: HashMap<usize, Point> = HashMap::new();
        let mut right: HashMap<usize, Point> = HashMap::new();
        for (point, tags) in self.map.traverse() {
            for &(seg_idx, role) in tags {
                match role {
                    Role::Left => {
                        if left.insert(seg_idx, *point).is_some() {
                            return Err(SweepError::ProgrammingInvariant(
                                "duplicate left endpoint for a segment in the event tree",
                            ));
                        }
                    }
                    Role::Right => {
                        if right.insert(seg_idx, *point).is_some() {
                            return Err(SweepError::ProgrammingInvariant(
                                "duplicate right endpoint for a segment in the event tree",
                            ));
                        }
                    }
                    Role::Internal => {}
                }
            }
        }
        let mut out = Vec::with_capacity(segment_count);
        for idx in 0..segment_count {
            let p1 = *left
                .get(&idx)
                .ok_or(SweepError::ProgrammingInvariant("segment index missing a left endpoint"))?;
            let p2 = *right
                .get(&idx)
                .ok_or(SweepError::ProgrammingInvariant("segment index missing a right endpoint"))?;
            out.push(Segment::new(p1, p2));
        }
        Ok(out)
    }
}
