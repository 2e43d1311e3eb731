//! The concrete scenarios from the sweep's specification, each checked
//! against the exact event set it calls for.

use proximal_sweep::{run_sweep_line, Role, SweepConfig};

fn participants_at(out: &proximal_sweep::SweepOutput, point: [f64; 2]) -> Vec<(usize, Role)> {
    out.events
        .iter()
        .find(|e| (e.point[0] - point[0]).abs() < 1e-6 && (e.point[1] - point[1]).abs() < 1e-6)
        .map(|e| e.participants.clone())
        .unwrap_or_default()
}

#[test]
fn single_x_crossing() {
    let segments = [[[0.0, 0.0], [1.0, 1.0]], [[0.0, 1.0], [1.0, 0.0]]];
    let out = run_sweep_line(&segments, &SweepConfig::default()).unwrap();

    assert_eq!(participants_at(&out, [0.0, 0.0]), vec![(0, Role::Left)]);
    assert_eq!(participants_at(&out, [0.0, 1.0]), vec![(1, Role::Left)]);
    assert_eq!(
        participants_at(&out, [0.5, 0.5]),
        vec![(0, Role::Internal), (1, Role::Internal)]
    );
    assert_eq!(participants_at(&out, [1.0, 0.0]), vec![(1, Role::Right)]);
    assert_eq!(participants_at(&out, [1.0, 1.0]), vec![(0, Role::Right)]);
    assert_eq!(out.events.len(), 5);
}

#[test]
fn t_junction() {
    let segments = [[[0.0, 0.0], [2.0, 0.0]], [[1.0, 0.0], [1.0, 1.0]]];
    let out = run_sweep_line(&segments, &SweepConfig::default()).unwrap();

    assert_eq!(
        participants_at(&out, [1.0, 0.0]),
        vec![(0, Role::Internal), (1, Role::Left)]
    );
}

#[test]
fn three_concurrent() {
    let segments = [
        [[0.0, 0.0], [2.0, 2.0]],
        [[0.0, 2.0], [2.0, 0.0]],
        [[0.0, 1.0], [2.0, 1.0]],
    ];
    let out = run_sweep_line(&segments, &SweepConfig::default()).unwrap();

    assert_eq!(
        participants_at(&out, [1.0, 1.0]),
        vec![(0, Role::Internal), (1, Role::Internal), (2, Role::Internal)]
    );
}

#[test]
fn coincident_endpoints() {
    let segments = [[[0.0, 0.0], [1.0, 1.0]], [[0.0, 0.0], [1.0, -1.0]]];
    let out = run_sweep_line(&segments, &SweepConfig::default()).unwrap();

    assert_eq!(
        participants_at(&out, [0.0, 0.0]),
        vec![(0, Role::Left), (1, Role::Left)]
    );
    // No interior intersection is reported anywhere else.
    for event in &out.events {
        assert!(!event.participants.iter().any(|(_, r)| *r == Role::Internal));
    }
}

#[test]
fn near_vertical_snap() {
    let tol = SweepConfig::default().tol;
    let segments = [
        [[0.0, 0.0], [tol / 2.0, 1.0]],
        [[0.0, 0.5], [1.0, 0.5]],
    ];
    let out = run_sweep_line(&segments, &SweepConfig::default()).unwrap();

    // The near-vertical segment becomes exactly vertical, snapped to its
    // second endpoint's x (matching `validate_and_snap`'s `a = Point::new(b.x, a.y)`).
    assert_eq!(out.segments[0][0][0], out.segments[0][1][0]);
    assert_eq!(out.segments[0][0][0], tol / 2.0);

    let crossing = out
        .events
        .iter()
        .find(|e| e.participants.len() > 1)
        .expect("the horizontal should cross the now-vertical segment");
    assert!((crossing.point[0] - 0.0).abs() < 1e-6);
    assert!((crossing.point[1] - 0.5).abs() < 1e-6);
}

#[test]
fn disjoint_parallel_segments() {
    let segments = [[[0.0, 0.0], [1.0, 0.0]], [[0.0, 1.0], [1.0, 1.0]]];
    let out = run_sweep_line(&segments, &SweepConfig::default()).unwrap();

    assert_eq!(out.events.len(), 4);
    for event in &out.events {
        assert_eq!(event.participants.len(), 1);
    }
}
