//! C3: the segment comparator the status structure orders its entries by.
//!
//! Two segments are only meaningfully comparable where their x-ranges
//! overlap; the sweep driver only ever compares segments that are both
//! active at the current sweep position, so that precondition always
//! holds by construction.

use std::cmp::Ordering;

use crate::geometry::Segment;

/// Whether `a` lies above `b` at their shared x-overlap.
///
/// Picks whichever segment has the rightmost left endpoint (the "rle") and
/// measures its perpendicular offset from the *other* segment's line. A
/// near-zero offset means the segments meet at that point (a T-junction or
/// shared endpoint); ties are then broken by the CCW/CW sense of the two
/// direction vectors, matching a standard Bentley-Ottmann status
/// comparator.
fn is_above(a: &Segment, b: &Segment, tol: f64) -> bool {
    let (sn, v0, v1) = if a.p1.x > b.p1.x {
        (-1.0, b.unit_dir, [a.p1.x - b.p2.x, a.p1.y - b.p2.y])
    } else {
        (1.0, a.unit_dir, [b.p1.x - a.p2.x, b.p1.y - a.p2.y])
    };
    let tmp = -v0[1] * v1[0] + v0[0] * v1[1];
    if sn * tmp > tol {
        false
    } else if tmp.abs() < tol {
        let tmp_2 = -b.dir[0] * a.dir[1] + b.dir[1] * a.dir[0];
        tmp_2 < 0.0
    } else {
        true
    }
}

/// Orders two segments by height at their sweep-line overlap.
///
/// Not a total order over all pairs of segments in the plane — only over
/// those that currently overlap in `x` — but that's the only comparison
/// the status structure ever needs, since it only ever holds segments
/// active at the sweep line.
pub fn compare_segments(a: &Segment, b: &Segment, tol: f64) -> Ordering {
    if is_above(a, b, tol) {
        Ordering::Greater
    } else if is_above(b, a, tol) {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}
