use super::{Point, Role, Segment};

/// Result of classifying how two segments meet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The segments do not meet.
    None,
    /// The segments are collinear and overlap over a span of positive length.
    Overlap,
    /// The segments meet at a single point, tagged with how each segment
    /// reaches it.
    Point { roles: (Role, Role), point: Point },
}

struct AxisTest {
    perp: f64,
    on_axis: bool,
    before_start: bool,
    after_end: bool,
}

/// Signed perpendicular distance (and, if on-axis, parallel position) of
/// `p` relative to `axis`'s supporting line.
fn test_point_against_axis(axis: &Segment, p: Point, tol: f64) -> AxisTest {
    let vx = p.x - axis.p1.x;
    let vy = p.y - axis.p1.y;
    let perp = vx * axis.unit_dir[1] - vy * axis.unit_dir[0];
    let on_axis = perp.abs() < tol;
    let mut before_start = false;
    let mut after_end = false;
    if on_axis {
        let proj = vx * axis.unit_dir[0] + vy * axis.unit_dir[1];
        let len = axis.length();
        before_start = proj < -tol;
        after_end = proj > len + tol;
    }
    AxisTest {
        perp,
        on_axis,
        before_start,
        after_end,
    }
}

/// Classify the intersection of two segments.
///
/// Direct translation of `seg_int_pts` from the reference implementation:
/// endpoint coincidence first, then an on-axis test of `b`'s endpoints
/// against `a`'s supporting line, then the symmetric test of `a`'s
/// endpoints against `b`'s line, and finally the straddle case.
pub fn intersect(a: &Segment, b: &Segment, tol: f64) -> Intersection {
    if a.p1.near(&b.p1, tol) {
        return Intersection::Point {
            roles: (Role::Left, Role::Left),
            point: a.p1,
        };
    }
    if a.p1.near(&b.p2, tol) {
        return Intersection::Point {
            roles: (Role::Left, Role::Right),
            point: a.p1,
        };
    }
    if a.p2.near(&b.p1, tol) {
        return Intersection::Point {
            roles: (Role::Right, Role::Left),
            point: a.p2,
        };
    }
    if a.p2.near(&b.p2, tol) {
        return Intersection::Point {
            roles: (Role::Right, Role::Right),
            point: b.p2,
        };
    }

    let t_b1 = test_point_against_axis(a, b.p1, tol);
    let t_b2 = test_point_against_axis(a, b.p2, tol);

    if t_b1.on_axis || t_b2.on_axis {
        if t_b1.on_axis != t_b2.on_axis {
            let (t, pt, role_b) = if t_b1.on_axis {
                (&t_b1, b.p1, Role::Left)
            } else {
                (&t_b2, b.p2, Role::Right)
            };
            return if !t.before_start && !t.after_end {
                Intersection::Point {
                    roles: (Role::Internal, role_b),
                    point: pt,
                }
            } else {
                Intersection::None
            };
        }
        let disjoint = (t_b1.before_start && t_b2.before_start) || (t_b1.after_end && t_b2.after_end);
        return if disjoint {
            Intersection::None
        } else {
            Intersection::Overlap
        };
    } else if (t_b1.perp > 0.0 && t_b2.perp > 0.0) || (t_b1.perp < 0.0 && t_b2.perp < 0.0) {
        return Intersection::None;
    }

    let t_a1 = test_point_against_axis(b, a.p1, tol);
    let t_a2 = test_point_against_axis(b, a.p2, tol);

    if t_a1.on_axis || t_a2.on_axis {
        if t_a1.on_axis != t_a2.on_axis {
            let (t, pt, role_a) = if t_a1.on_axis {
                (&t_a1, a.p1, Role::Left)
            } else {
                (&t_a2, a.p2, Role::Right)
            };
            return if !t.before_start && !t.after_end {
                Intersection::Point {
                    roles: (role_a, Role::Internal),
                    point: pt,
                }
            } else {
                Intersection::None
            };
        }
        // Both of A's endpoints land on B's line here only in a measurably
        // disjoint, precision-edge configuration (true full collinearity
        // would already have returned above). Treat as no intersection.
        return Intersection::None;
    } else if (t_a1.perp > 0.0 && t_a2.perp > 0.0) || (t_a1.perp < 0.0 && t_a2.perp < 0.0) {
        return Intersection::None;
    }

    let s0 = t_a1.perp.abs();
    let s1 = t_a2.perp.abs();
    let rto = s0 / (s0 + s1);
    let point = Point::new(a.p1.x + rto * a.dir[0], a.p1.y + rto * a.dir[1]);
    Intersection::Point {
        roles: (Role::Internal, Role::Internal),
        point,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn seg(a: [f64; 2], b: [f64; 2]) -> Segment {
        Segment::new(Point::from(a), Point::from(b))
    }

    #[test]
    fn crossing_x() {
        let a = seg([0.0, 0.0], [1.0, 1.0]);
        let b = seg([0.0, 1.0], [1.0, 0.0]);
        match intersect(&a, &b, TOL) {
            Intersection::Point { roles, point } => {
                assert_eq!(roles, (Role::Internal, Role::Internal));
                assert!(point.near(&Point::new(0.5, 0.5), TOL));
            }
            other => panic!("expected a point intersection, got {other:?}"),
        }
    }

    #[test]
    fn t_junction() {
        let a = seg([0.0, 0.0], [2.0, 0.0]);
        let b = seg([1.0, 0.0], [1.0, 1.0]);
        match intersect(&a, &b, TOL) {
            Intersection::Point { roles, point } => {
                assert_eq!(roles, (Role::Internal, Role::Left));
                assert!(point.near(&Point::new(1.0, 0.0), TOL));
            }
            other => panic!("expected a T-junction, got {other:?}"),
        }
    }

    #[test]
    fn disjoint_parallel() {
        let a = seg([0.0, 0.0], [1.0, 0.0]);
        let b = seg([0.0, 1.0], [1.0, 1.0]);
        assert_eq!(intersect(&a, &b, TOL), Intersection::None);
    }

    #[test]
    fn collinear_overlap() {
        let a = seg([0.0, 0.0], [2.0, 0.0]);
        let b = seg([1.0, 0.0], [3.0, 0.0]);
        assert_eq!(intersect(&a, &b, TOL), Intersection::Overlap);
    }

    #[test]
    fn collinear_disjoint() {
        let a = seg([0.0, 0.0], [1.0, 0.0]);
        let b = seg([2.0, 0.0], [3.0, 0.0]);
        assert_eq!(intersect(&a, &b, TOL), Intersection::None);
    }

    #[test]
    fn symmetry() {
        let a = seg([0.0, 0.0], [2.0, 2.0]);
        let b = seg([0.0, 2.0], [2.0, 0.0]);
        let ab = intersect(&a, &b, TOL);
        let ba = intersect(&b, &a, TOL);
        match (ab, ba) {
            (
                Intersection::Point { roles: r1, point: p1 },
                Intersection::Point { roles: r2, point: p2 },
            ) => {
                assert!(p1.near(&p2, TOL));
                assert_eq!(r1, (r2.1, r2.0));
            }
            other => panic!("expected symmetric point intersections, got {other:?}"),
        }
    }

    #[test]
    fn coincident_endpoints() {
        let a = seg([0.0, 0.0], [1.0, 1.0]);
        let b = seg([0.0, 0.0], [1.0, -1.0]);
        match intersect(&a, &b, TOL) {
            Intersection::Point { roles, point } => {
                assert_eq!(roles, (Role::Left, Role::Left));
                assert!(point.near(&Point::new(0.0, 0.0), TOL));
            }
            other => panic!("expected coincident endpoints, got {other:?}"),
        }
    }
}
