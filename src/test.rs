use super::{
    compute, compute_with, fortune_algorithm, sites_from_coordinates, Diagram, DuplicatePolicy,
    EdgeShape, Point, ProcessedEvent, SiteIdx, SweepOptions, VoronoiError,
};
use approx::assert_relative_eq;
use proptest::prelude::*;
use proptest::test_runner::TestRunner;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * (a.abs() + b.abs()).max(1.0)
}

fn points(points: &[(i32, i32)]) -> Vec<Point> {
    points
        .iter()
        .map(|&(x, y)| Point::new(x as f64, y as f64))
        .collect()
}

/// A point on the edge must be equidistant to the two sites of the edge, and no other site can be
/// closer to it.
fn check_edge_point(diagram: &Diagram, p: Point, (a, b): (SiteIdx, SiteIdx)) {
    let sites = diagram.sites();
    let da = p.dist(sites[a as usize]);
    let db = p.dist(sites[b as usize]);
    assert!(close(da, db), "{:?} is not on the bisector of {} and {}", p, a, b);

    let nearest = sites
        .iter()
        .map(|&s| p.dist(s))
        .fold(f64::INFINITY, f64::min);
    assert!(
        close(nearest, da),
        "{:?} is closer to another site than to {} and {}",
        p,
        a,
        b
    );
}

fn check_diagram(diagram: &Diagram) {
    let stats = diagram.stats();
    assert_eq!(stats.stale_circle_events, 0);
    assert_eq!(stats.circle_events, diagram.vertices().len());

    for edge in diagram.edges() {
        match edge.shape {
            EdgeShape::Segment { start, end } => {
                let (p, q) = (diagram.vertex(start), diagram.vertex(end));
                check_edge_point(diagram, p, edge.sites);
                check_edge_point(diagram, q, edge.sites);
                check_edge_point(diagram, p.midpoint(q), edge.sites);
            }
            EdgeShape::Ray { origin, direction } => {
                let p = diagram.vertex(origin);
                assert_relative_eq!(direction.length(), 1.0, epsilon = 1e-9);
                check_edge_point(diagram, p, edge.sites);
                check_edge_point(diagram, p + direction, edge.sites);
                check_edge_point(diagram, p + direction * 100.0, edge.sites);
            }
            EdgeShape::Line { point, direction } => {
                check_edge_point(diagram, point, edge.sites);
                check_edge_point(diagram, point + direction * 10.0, edge.sites);
                check_edge_point(diagram, point + direction * -10.0, edge.sites);
            }
        }

        if let Some(d) = edge.direction() {
            let (a, b) = edge.sites;
            let ab = diagram.sites()[b as usize] - diagram.sites()[a as usize];
            assert!(
                d.dot(ab).abs() < 1e-9 * ab.length().max(1.0),
                "{:?} is not perpendicular to {:?}",
                d,
                ab
            );
        }
    }
}

#[test]
fn two_sites() {
    let sites = points(&[(0, 0), (2, 0)]);
    let diagram = compute(&sites).unwrap();

    assert!(diagram.vertices().is_empty());
    assert_eq!(diagram.edges().len(), 1);

    let edge = diagram.edges()[0];
    assert!(!edge.is_bounded());
    let EdgeShape::Line { point, direction } = edge.shape else {
        panic!("expected a line, got {:?}", edge);
    };
    assert_relative_eq!(point.x, 1.0);
    assert_relative_eq!(direction.x, 0.0);
    assert_relative_eq!(direction.y.abs(), 1.0);
    check_diagram(&diagram);
}

#[test]
fn single_site() {
    let diagram = compute(&[Point::new(3.0, -1.0)]).unwrap();
    assert!(diagram.vertices().is_empty());
    assert!(diagram.edges().is_empty());
    assert_eq!(diagram.stats().site_events, 1);
}

#[test]
fn triangle() {
    let sites = points(&[(0, 0), (2, 0), (1, 2)]);

    let mut expected_beachline: &[&[SiteIdx]] = &[
        &[0],          // first site
        &[0, 1],       // second site, on the same horizontal line
        &[0, 2, 0, 1], // third site splits the first arc
        &[0, 2, 1],    // circle event removes the copy
    ];

    let diagram = fortune_algorithm(&sites, &mut |progress| {
        let arcs = progress.beachline.sites().collect::<Vec<_>>();
        assert_eq!(arcs, expected_beachline[0]);
        expected_beachline = &expected_beachline[1..];
    })
    .unwrap();
    assert!(expected_beachline.is_empty());

    assert_eq!(diagram.vertices().len(), 1);
    let v = diagram.vertex(0);
    assert_relative_eq!(v.x, 1.0);
    assert_relative_eq!(v.y, 0.75);

    assert_eq!(diagram.edges().len(), 3);
    assert_eq!(diagram.unbounded_edges().count(), 3);
    for edge in diagram.edges() {
        assert!(matches!(edge.shape, EdgeShape::Ray { origin: 0, .. }));
    }
    assert_eq!(diagram.neighbors(2), [0, 1]);
    check_diagram(&diagram);
}

#[test]
fn collinear_horizontal() {
    let sites = points(&[(0, 0), (1, 0), (2, 0), (3, 0)]);

    let diagram = fortune_algorithm(&sites, &mut |progress| {
        assert!(matches!(progress.event, ProcessedEvent::Site(_)));
    })
    .unwrap();

    assert!(diagram.vertices().is_empty());
    assert_eq!(diagram.stats().circle_events, 0);
    assert_eq!(diagram.stats().cancelled_circle_events, 0);
    assert_eq!(diagram.edges().len(), 3);

    let mut xs = Vec::new();
    for edge in diagram.edges() {
        let EdgeShape::Line { point, direction } = edge.shape else {
            panic!("expected a line, got {:?}", edge);
        };
        assert_relative_eq!(direction.x, 0.0);
        xs.push(point.x);
    }
    xs.sort_by(f64::total_cmp);
    assert_eq!(xs, [0.5, 1.5, 2.5]);
    check_diagram(&diagram);
}

#[test]
fn collinear_vertical() {
    let sites = points(&[(0, 2), (0, 0), (0, 1)]);
    let diagram = compute(&sites).unwrap();

    assert!(diagram.vertices().is_empty());
    assert_eq!(diagram.edges().len(), 2);
    for edge in diagram.edges() {
        let EdgeShape::Line { direction, .. } = edge.shape else {
            panic!("expected a line, got {:?}", edge);
        };
        assert_relative_eq!(direction.y, 0.0);
    }
    assert_eq!(diagram.neighbors(2), [0, 1]);
    check_diagram(&diagram);
}

#[test]
fn collinear_diagonal() {
    let sites = points(&[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
    let diagram = compute(&sites).unwrap();

    assert!(diagram.vertices().is_empty());
    assert_eq!(diagram.edges().len(), 4);
    check_diagram(&diagram);
}

#[test]
fn square() {
    // cocircular: two circle events at the same point, joined by a zero length edge
    let sites = points(&[(0, 0), (1, 0), (0, 1), (1, 1)]);
    let diagram = compute(&sites).unwrap();

    assert_eq!(diagram.vertices().len(), 2);
    for &v in diagram.vertices() {
        assert_relative_eq!(v.x, 0.5);
        assert_relative_eq!(v.y, 0.5);
    }
    assert_eq!(diagram.bounded_edges().count(), 1);
    assert_eq!(diagram.unbounded_edges().count(), 4);
    check_diagram(&diagram);
}

#[test]
fn site_inside_pending_circle() {
    // (20, 30) queues the circle of sites 0, 2 and 1, centered at (30.625, 1.25) with its top at
    // y ~ 31.9. The last site is inside that circle and comes first.
    let sites = points(&[(0, 0), (60, 10), (20, 30), (30, 31)]);
    let center = Point::new(30.625, 1.25);
    assert!(center.dist(sites[3]) < center.dist(sites[0]));

    let mut pending = Vec::new();
    let diagram = fortune_algorithm(&sites, &mut |progress| {
        pending.push(progress.pending_events);
    })
    .unwrap();

    // after the third site: the fourth site and the circle event
    assert_eq!(pending[2], 2);
    assert_eq!(diagram.stats().cancelled_circle_events, 1);
    assert_eq!(diagram.stats().circle_events, 2);
    for &v in diagram.vertices() {
        assert!(v.dist(center) > 0.5, "vertex {:?} of a cancelled circle", v);
    }
    check_diagram(&diagram);
}

#[test]
fn huge_coordinates() {
    let sites = points(&[(0, 0), (12, 4), (16, 4), (14, 8), (11, 9), (3, -7), (-5, 2)]);

    for scale in [1e60, 1e150, 1e200, 1e300] {
        let scaled: Vec<Point> = sites.iter().map(|&p| p * scale).collect();
        assert!(matches!(
            compute(&scaled),
            Err(VoronoiError::OutOfRange { index: 1, .. })
        ));
    }

    let scaled: Vec<Point> = sites.iter().map(|&p| p * 1e6).collect();
    let diagram = compute(&scaled).unwrap();
    check_diagram(&diagram);
    assert_eq!(
        diagram.vertices().len(),
        compute(&sites).unwrap().vertices().len()
    );
}

#[test]
fn every_site_is_processed_once() {
    let sites = points(&[(0, 0), (12, 4), (16, 4), (14, 8), (11, 9), (3, -7), (-5, 2)]);
    let mut seen = vec![0; sites.len()];
    let diagram = fortune_algorithm(&sites, &mut |progress| {
        if let ProcessedEvent::Site(s) = progress.event {
            seen[s as usize] += 1;
        }
    })
    .unwrap();

    assert!(seen.iter().all(|&n| n == 1));
    assert_eq!(diagram.stats().site_events, sites.len());
    check_diagram(&diagram);
}

#[test]
fn sweep_is_monotonic() {
    let sites = points(&[(4, 0), (0, 1), (5, 2), (5, 3), (1, 7), (8, 5), (2, 4)]);
    let mut last = f64::NEG_INFINITY;
    let mut circles = 0;
    let diagram = fortune_algorithm(&sites, &mut |progress| {
        assert!(progress.sweep_y >= last);
        last = progress.sweep_y;

        if let ProcessedEvent::Circle { center, sites: triple } = progress.event {
            circles += 1;
            assert_eq!(progress.vertices.last(), Some(&center));
            let [a, b, c] = triple.map(|s| sites[s as usize]);
            let ra = center.dist(a);
            assert!(close(ra, center.dist(b)));
            assert!(close(ra, center.dist(c)));
        }

        // breakpoints stay ordered from left to right
        let xs: Vec<f64> = progress
            .beachline
            .breakpoint_xs(&sites, progress.sweep_y)
            .collect();
        assert!(xs.windows(2).all(|w| w[0] <= w[1] + 1e-7), "{:?}", xs);
    })
    .unwrap();

    assert_eq!(circles, diagram.vertices().len());
    check_diagram(&diagram);
}

#[test]
fn breakpoints_are_on_the_beachline() {
    let sites = points(&[(0, 0), (5, 1), (2, 3), (7, 4)]);
    compute_with(&sites, &SweepOptions::default(), &mut |progress| {
        let beachline = progress.beachline;
        for bp in beachline.breakpoints() {
            let b = beachline.breakpoint(bp);
            if sites[b.left_site as usize].y == progress.sweep_y
                || sites[b.right_site as usize].y == progress.sweep_y
            {
                continue;
            }
            let p = beachline.breakpoint_point(&sites, bp, progress.sweep_y);
            let dl = p.dist(sites[b.left_site as usize]);
            let dr = p.dist(sites[b.right_site as usize]);
            let dsweep = progress.sweep_y - p.y;
            assert!(close(dl, dr));
            assert!(close(dl, dsweep));
        }
    })
    .unwrap();
}

#[test]
fn rejects_bad_input() {
    assert_eq!(compute(&[]).unwrap_err(), VoronoiError::Empty);

    assert_eq!(
        compute(&[Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0)]).unwrap_err(),
        VoronoiError::NonFinite { index: 1 }
    );

    let sites = points(&[(0, 0), (1, 1), (0, 0)]);
    assert_eq!(
        compute(&sites).unwrap_err(),
        VoronoiError::Duplicate { index: 2, first: 0 }
    );

    assert_eq!(
        sites_from_coordinates(&[vec![0.0, 1.0], vec![1.0, 2.0, 3.0]]).unwrap_err(),
        VoronoiError::Dimension {
            index: 1,
            dimension: 3
        }
    );
    assert_eq!(
        sites_from_coordinates(&[[1.0, 2.0], [3.0, 4.0]]).unwrap(),
        [Point::new(1.0, 2.0), Point::new(3.0, 4.0)]
    );
}

#[test]
fn skip_duplicates() {
    let sites = points(&[(0, 0), (2, 0), (0, 0), (1, 2), (2, 0)]);
    let options = SweepOptions {
        duplicates: DuplicatePolicy::Skip,
    };
    let diagram = compute_with(&sites, &options, &mut |_| {}).unwrap();

    assert_eq!(diagram.stats().site_events, 3);
    assert_eq!(diagram.vertices().len(), 1);
    assert!(diagram.neighbors(2).is_empty());
    assert!(diagram.neighbors(4).is_empty());
    assert_eq!(diagram.neighbors(3), [0, 1]);
    check_diagram(&diagram);
}

#[test]
fn diagram_fuzz() {
    let mut runner = TestRunner::default();

    let i = 0..6;
    let points = proptest::collection::vec((i.clone(), i), 0..8);

    runner
        .run(&points, |points| {
            diagram_fuzz_(points);
            Ok(())
        })
        .unwrap();
}

#[test]
fn diagram_fuzz_wide() {
    let mut runner = TestRunner::default();

    let i = -1000..1000;
    let points = proptest::collection::vec((i.clone(), i), 0..40);

    runner
        .run(&points, |points| {
            diagram_fuzz_(points);
            Ok(())
        })
        .unwrap();
}

#[test]
fn diagram_fuzz1() {
    diagram_fuzz_(vec![(2, 0), (0, 1), (4, 1), (2, 2)])
}

#[test]
fn diagram_fuzz2() {
    diagram_fuzz_(vec![(0, 1), (1, 0), (1, 2)])
}

#[test]
fn diagram_fuzz3() {
    diagram_fuzz_(vec![(0, 0), (12, 4), (16, 4), (14, 8), (11, 9)])
}

#[test]
fn diagram_fuzz4() {
    diagram_fuzz_(vec![(4, 8), (8, 8), (8, 11), (6, 12)])
}

#[test]
fn diagram_fuzz5() {
    diagram_fuzz_(vec![(0, 0), (1, 0), (0, 2), (3, 3), (3, 4), (0, 5)])
}

#[test]
fn diagram_fuzz6() {
    diagram_fuzz_(vec![
        (4, 2), //
        (5, 2),
        (3, 3),
        (4, 5),
        (0, 6),
        (2, 7),
    ]);
}

#[test]
fn diagram_fuzz7() {
    diagram_fuzz_(vec![(9, 0), (3, 1), (9, 1), (1, 2), (4, 3), (3, 4)]);
}

#[test]
fn diagram_fuzz8() {
    diagram_fuzz_(vec![(8, -16), (31, -9), (20, -2), (0, 0)]);
}

fn diagram_fuzz_(points: Vec<(i32, i32)>) {
    let mut sites = points
        .into_iter()
        .map(|(x, y)| Point::new(x as f64, y as f64))
        .collect::<Vec<_>>();

    // remove duplicates
    {
        let mut hash = std::collections::HashSet::new();
        sites.retain(|v| hash.insert(*v));
    }

    if sites.is_empty() {
        assert_eq!(compute(&sites).unwrap_err(), VoronoiError::Empty);
        return;
    }

    let diagram = compute(&sites).unwrap();
    assert_eq!(diagram.stats().site_events, sites.len());
    check_diagram(&diagram);

    // every pair of sites with a common edge are neighbors both ways
    for s in 0..sites.len() as SiteIdx {
        for n in diagram.neighbors(s) {
            assert!(diagram.neighbors(n).contains(&s));
        }
    }
}

proptest! {
    /// The sweep order only depends on the coordinates, so shuffling the input only relabels the
    /// sites of the output.
    #[test]
    fn permutation_invariance(
        points in proptest::collection::vec((-20i32..20, -20i32..20), 1..24),
        seed: u64,
    ) {
        let mut sites = points
            .into_iter()
            .map(|(x, y)| Point::new(x as f64, y as f64))
            .collect::<Vec<_>>();
        sites.sort();
        sites.dedup();

        let mut perm: Vec<usize> = (0..sites.len()).collect();
        perm.shuffle(&mut rand::rngs::SmallRng::seed_from_u64(seed));
        let shuffled: Vec<Point> = perm.iter().map(|&i| sites[i]).collect();

        let a = compute(&sites).unwrap();
        let b = compute(&shuffled).unwrap();

        prop_assert_eq!(a.vertices(), b.vertices());
        prop_assert_eq!(a.edges().len(), b.edges().len());
        for (ea, eb) in a.edges().iter().zip(b.edges()) {
            let relabeled = (perm[eb.sites.0 as usize] as SiteIdx, perm[eb.sites.1 as usize] as SiteIdx);
            prop_assert_eq!(ea.sites, relabeled);
            prop_assert_eq!(ea.shape, eb.shape);
        }
    }
}
