//! Unit tests for tr-graph.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use tr_core::{FeatureId, GeoPoint, RegionId, RouterConfig, Segment, TravelMode};
    use tr_geometry::{GeometryStore, InMemoryLoader, RoadGeometry};
    use tr_search::{Search, WaveControl};

    use crate::{EdgeEstimator, RegionGraph, RestrictionSet, Vertex};

    pub const R: RegionId = RegionId(0);

    /// `(id, points, one_way)`
    pub type RoadSpec<'a> = (u32, &'a [(f64, f64)], bool);

    pub fn road(points: &[(f64, f64)]) -> RoadGeometry {
        let pts = points.iter().map(|&(lat, lon)| GeoPoint::new(lat, lon)).collect();
        RoadGeometry::new(FeatureId(0), pts, 60.0).unwrap()
    }

    pub fn loader(roads: &[RoadSpec<'_>]) -> InMemoryLoader {
        roads
            .iter()
            .map(|&(id, pts, one_way)| (FeatureId(id), road(pts).with_one_way(one_way)))
            .collect()
    }

    pub fn build_from(loader: InMemoryLoader, restrictions: &RestrictionSet) -> RegionGraph {
        let store = GeometryStore::new(R, Arc::new(loader));
        let estimator = EdgeEstimator::new(TravelMode::Car, &RouterConfig::default());
        RegionGraph::build(&store, restrictions, estimator).unwrap()
    }

    pub fn build(roads: &[RoadSpec<'_>], restrictions: &RestrictionSet) -> RegionGraph {
        build_from(loader(roads), restrictions)
    }

    pub fn seg(feature: u32, idx: u32, forward: bool) -> Segment {
        Segment::new(R, FeatureId(feature), idx, forward)
    }

    pub fn f(id: u32) -> FeatureId {
        FeatureId(id)
    }

    /// Real successors of real segment `s`.
    pub fn out_segments(g: &RegionGraph, s: Segment) -> Vec<Segment> {
        let mut edges = Vec::new();
        g.edges(&Vertex::Segment(s), true, None, &mut edges);
        let mut out: Vec<Segment> = edges.iter().filter_map(|e| g.origin(&e.target)).collect();
        out.sort();
        out
    }

    /// `true` if some vertex with origin `to` is reachable from `from`.
    pub fn reachable(g: &RegionGraph, from: Segment, to: Segment) -> bool {
        let mut found = false;
        Search::new(&g.view(None))
            .propagate_wave(Vertex::Segment(from), |v, _| {
                if g.origin(v) == Some(to) {
                    found = true;
                    WaveControl::Stop
                } else {
                    WaveControl::Continue
                }
            })
            .unwrap();
        found
    }

    /// 3 × 3 lattice of unit two-way roads.  Returns the specs and a lookup
    /// from endpoint pair to feature id.
    pub fn lattice() -> (Vec<(u32, [(f64, f64); 2])>, impl Fn((i32, i32), (i32, i32)) -> u32) {
        let mut specs = Vec::new();
        for x in 0..3 {
            for y in 0..3 {
                if x < 2 {
                    specs.push((specs.len() as u32, [(x as f64, y as f64), ((x + 1) as f64, y as f64)]));
                }
                if y < 2 {
                    specs.push((specs.len() as u32, [(x as f64, y as f64), (x as f64, (y + 1) as f64)]));
                }
            }
        }
        let table = specs.clone();
        let lookup = move |a: (i32, i32), b: (i32, i32)| {
            let pa = (a.0 as f64, a.1 as f64);
            let pb = (b.0 as f64, b.1 as f64);
            table
                .iter()
                .find(|(_, p)| (p[0] == pa && p[1] == pb) || (p[0] == pb && p[1] == pa))
                .map(|(id, _)| *id)
                .unwrap()
        };
        (specs, lookup)
    }

    pub fn lattice_loader() -> InMemoryLoader {
        let (specs, _) = lattice();
        specs.iter().map(|(id, pts)| (FeatureId(*id), road(pts))).collect()
    }
}

#[cfg(test)]
mod weight {
    use crate::RouteWeight;
    use tr_search::Weight;

    #[test]
    fn fewer_changes_beat_shorter_time() {
        let detour = RouteWeight::new(500.0, 0);
        let corridor = RouteWeight::new(100.0, 2);
        assert!(detour < corridor);
        assert!(RouteWeight::new(10.0, 1) < RouteWeight::new(20.0, 1));
    }

    #[test]
    fn arithmetic_and_clamp() {
        let a = RouteWeight::new(3.0, 1) + RouteWeight::new(2.0, 1);
        assert_eq!(a, RouteWeight::new(5.0, 2));
        assert_eq!(a - RouteWeight::new(5.0, 0), RouteWeight::new(0.0, 2));
        assert_eq!(RouteWeight::new(-1e-12, 0).clamp_non_negative(), RouteWeight::ZERO);
        assert_eq!(RouteWeight::from_secs(8.0).half(), RouteWeight::from_secs(4.0));
    }
}

#[cfg(test)]
mod estimator {
    use tr_core::{FeatureId, GeoPoint, RouterConfig, TravelMode};
    use tr_geometry::RoadGeometry;

    use super::helpers::seg;
    use crate::{EdgeEstimator, SpeedGroup, TrafficOverlay};

    fn degree_road(speed: f64) -> RoadGeometry {
        RoadGeometry::new(FeatureId(0), vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0)], speed).unwrap()
    }

    #[test]
    fn weight_is_length_over_speed() {
        let est = EdgeEstimator::new(TravelMode::Car, &RouterConfig::default());
        let w = est.segment_weight(&degree_road(60.0), seg(0, 0, true), None);
        assert!((w - 111_195.0 / (60.0 / 3.6)).abs() < 5.0, "got {w}");
    }

    #[test]
    fn mode_caps_speed() {
        let car = EdgeEstimator::new(TravelMode::Car, &RouterConfig::default());
        let walk = EdgeEstimator::new(TravelMode::Pedestrian, &RouterConfig::default());
        let fast = degree_road(200.0);
        assert_eq!(car.speed_mps(&fast), 130.0 / 3.6);
        assert_eq!(walk.speed_mps(&fast), 5.0 / 3.6);
    }

    #[test]
    fn traffic_scales_and_blocks() {
        let est = EdgeEstimator::new(TravelMode::Car, &RouterConfig::default());
        let road = degree_road(60.0);
        let s = seg(0, 0, true);
        let free = est.segment_weight(&road, s, None);

        let mut overlay = TrafficOverlay::new();
        overlay.set(FeatureId(0), 0, true, SpeedGroup::G2);
        let slow = est.segment_weight(&road, s, Some(&overlay));
        assert!((slow - free / 0.33).abs() < 1e-6);
        // Only the listed direction is affected.
        assert_eq!(est.segment_weight(&road, s.reversed(), Some(&overlay)), free);

        overlay.set(FeatureId(0), 0, true, SpeedGroup::TempBlock);
        assert!(est.segment_weight(&road, s, Some(&overlay)).is_infinite());
    }

    #[test]
    fn heuristic_never_exceeds_weight() {
        let est = EdgeEstimator::new(TravelMode::Bicycle, &RouterConfig::default());
        let road = degree_road(15.0);
        let w = est.segment_weight(&road, seg(0, 0, true), None);
        assert!(est.heuristic(road.points[0], road.points[1]) <= w);
        assert!(est.offroad_weight(road.points[0], road.points[1]) >= est.heuristic(road.points[0], road.points[1]));
    }
}

#[cfg(test)]
mod topology {
    use tr_core::{FeatureId, GeoPoint, RoadPoint};

    use super::helpers::{build, f, out_segments, seg};
    use crate::{RestrictionSet, Vertex};

    #[test]
    fn joints_at_shared_points_and_ends() {
        // F0 has an interior point (1,0) touched by nothing else.
        let g = build(
            &[(0, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)], false), (1, &[(2.0, 0.0), (2.0, 1.0)], false)],
            &RestrictionSet::new(),
        );
        assert_eq!(g.joints().len(), 3);
        let shared = g.joint_at(GeoPoint::new(2.0, 0.0).code()).unwrap();
        assert_eq!(
            g.joints().get(shared).members,
            vec![RoadPoint::new(FeatureId(0), 2), RoadPoint::new(FeatureId(1), 0)]
        );
        assert!(g.joint_at(GeoPoint::new(1.0, 0.0).code()).is_none());
    }

    #[test]
    fn one_way_roads_have_a_single_direction() {
        let g = build(&[(0, &[(0.0, 0.0), (1.0, 0.0)], true)], &RestrictionSet::new());
        assert_eq!(g.vertex_count(), 1);
        assert!(g.contains_segment(seg(0, 0, true)));
        assert!(!g.contains_segment(seg(0, 0, false)));
    }

    #[test]
    fn junction_offers_every_direction_including_uturn() {
        let g = build(
            &[
                (0, &[(0.0, 0.0), (1.0, 0.0)], false),
                (1, &[(1.0, 0.0), (2.0, 0.0)], false),
                (2, &[(1.0, 0.0), (1.0, 1.0)], false),
            ],
            &RestrictionSet::new(),
        );
        assert_eq!(
            out_segments(&g, seg(0, 0, true)),
            vec![seg(0, 0, false), seg(1, 0, true), seg(2, 0, true)]
        );
        assert_eq!(g.clone_count(), 0);
        assert!(g.vertices_with_origin(seg(1, 0, true)) == vec![Vertex::Segment(seg(1, 0, true))]);
    }

    #[test]
    fn ingoing_mirrors_outgoing() {
        let (specs, _) = super::helpers::lattice();
        let roads: Vec<_> = specs.iter().map(|(id, p)| (*id, &p[..], false)).collect();
        let g = build(&roads, &RestrictionSet::new());

        let mut out = Vec::new();
        let mut back = Vec::new();
        for id in 0..g.vertex_count() {
            let v = g.vertex(tr_core::VertexId(id as u32));
            out.clear();
            g.edges(&v, true, None, &mut out);
            for e in &out {
                back.clear();
                g.edges(&e.target, false, None, &mut back);
                assert!(back.iter().any(|b| b.target == v && b.weight == e.weight));
            }
        }
    }

    #[test]
    fn pass_through_changes_are_counted() {
        use super::helpers::{R, road};
        use std::sync::Arc;
        use tr_core::{RouterConfig, TravelMode};
        use tr_geometry::{GeometryStore, InMemoryLoader};

        let mut loader = InMemoryLoader::new();
        loader
            .add_road(FeatureId(0), road(&[(0.0, 0.0), (1.0, 0.0)]))
            .add_road(FeatureId(1), road(&[(1.0, 0.0), (2.0, 0.0)]).with_pass_through(false));
        let store = GeometryStore::new(R, Arc::new(loader));
        let est = crate::EdgeEstimator::new(TravelMode::Car, &RouterConfig::default());
        let g = crate::RegionGraph::build(&store, &RestrictionSet::new(), est).unwrap();

        let mut edges = Vec::new();
        g.edges(&Vertex::Segment(seg(0, 0, true)), true, None, &mut edges);
        let into_zone = edges.iter().find(|e| e.target == Vertex::Segment(seg(1, 0, true))).unwrap();
        assert_eq!(into_zone.weight.pass_through_changes, 1);
        let uturn = edges.iter().find(|e| e.target == Vertex::Segment(seg(0, 0, false))).unwrap();
        assert_eq!(uturn.weight.pass_through_changes, 0);
        // U-turn costs the reverse segment plus the car penalty.
        let plain = g.segment_weight(seg(0, 0, false), None);
        assert!((uturn.weight.weight - plain - RouterConfig::default().uturn_penalty_secs).abs() < 1e-9);
    }

    #[test]
    fn spatial_lookups() {
        let g = build(
            &[(0, &[(0.0, 0.0), (1.0, 0.0)], false), (1, &[(1.0, 0.0), (1.0, 1.0)], false)],
            &RestrictionSet::new(),
        );
        let near = g.nearest_segments(GeoPoint::new(0.5, 0.1), 2);
        assert_eq!(near[0].feature, FeatureId(0));
        assert!((near[0].projected.t - 0.5).abs() < 1e-12);
        assert!(near[0].projected.distance_2 <= near[1].projected.distance_2);

        let a = GeoPoint::new(1.0, 1.0).code();
        let b = GeoPoint::new(1.0, 0.0).code();
        assert_eq!(g.segment_by_code(a, b), Some(seg(1, 0, false)));
        assert_eq!(g.segment_by_code(b, GeoPoint::new(5.0, 5.0).code()), None);
    }

    #[test]
    fn nearest_keeps_every_tie() {
        let g = build(
            &[
                (0, &[(0.0, 0.0), (1.0, 0.0)], false),
                (1, &[(0.0, 0.0), (-1.0, 0.0)], false),
                (2, &[(0.0, 0.0), (0.0, 1.0)], false),
                (3, &[(0.0, 0.0), (0.0, -1.0)], false),
                (4, &[(5.0, 5.0), (6.0, 5.0)], false),
            ],
            &RestrictionSet::new(),
        );
        let mut at_joint: Vec<_> = g.nearest_segments(GeoPoint::new(0.0, 0.0), 2).iter().map(|n| n.feature).collect();
        at_joint.sort();
        assert_eq!(at_joint, vec![f(0), f(1), f(2), f(3)]);

        let near = g.nearest_segments(GeoPoint::new(0.5, 0.1), 2);
        assert_eq!(near.len(), 2);
        assert_eq!(near[0].feature, f(0));
        assert!(g.nearest_segments(GeoPoint::new(0.5, 0.1), 0).is_empty());
    }
}

#[cfg(test)]
mod traffic {
    use tr_core::FeatureId;

    use super::helpers::{build, out_segments, seg};
    use crate::{RestrictionSet, SpeedGroup, TrafficOverlay, TrafficSnapshot, Vertex};

    #[test]
    fn temp_block_hides_edges_without_rebuilding() {
        let g = build(
            &[(0, &[(0.0, 0.0), (1.0, 0.0)], false), (1, &[(1.0, 0.0), (2.0, 0.0)], false)],
            &RestrictionSet::new(),
        );
        let mut overlay = TrafficOverlay::new();
        overlay.set(FeatureId(1), 0, true, SpeedGroup::TempBlock);
        let snapshot = TrafficSnapshot::new().with_region(super::helpers::R, overlay);

        let mut edges = Vec::new();
        g.edges(&Vertex::Segment(seg(0, 0, true)), true, snapshot.overlay(super::helpers::R), &mut edges);
        assert!(edges.iter().all(|e| e.target != Vertex::Segment(seg(1, 0, true))));

        // The graph itself is untouched.
        assert!(out_segments(&g, seg(0, 0, true)).contains(&seg(1, 0, true)));
        assert!(snapshot.covers(super::helpers::R));
    }
}

#[cfg(test)]
mod restrictions {
    use super::helpers::{build, f, out_segments, reachable, seg};
    use crate::{Restriction, RestrictionKind, RestrictionSet, RestrictionUTurn};

    fn t_junction(set: &RestrictionSet) -> crate::RegionGraph {
        // F0 ends at (1,0) where F1 continues east and F2 turns north.
        build(
            &[
                (0, &[(0.0, 0.0), (1.0, 0.0)], false),
                (1, &[(1.0, 0.0), (2.0, 0.0)], false),
                (2, &[(1.0, 0.0), (1.0, 1.0)], false),
            ],
            set,
        )
    }

    #[test]
    fn no_removes_only_that_turn() {
        let g = t_junction(&RestrictionSet::new().with(Restriction::no([f(0), f(1)])));
        assert_eq!(out_segments(&g, seg(0, 0, true)), vec![seg(0, 0, false), seg(2, 0, true)]);
        // Other direction untouched.
        assert!(out_segments(&g, seg(1, 0, false)).contains(&seg(0, 0, false)));
        assert!(out_segments(&g, seg(2, 0, false)).contains(&seg(1, 0, true)));
    }

    #[test]
    fn only_equals_its_desugared_no_set() {
        let only = t_junction(&RestrictionSet::new().with(Restriction::only([f(0), f(1)])));
        let explicit = t_junction(
            &RestrictionSet::new()
                .with(Restriction::no([f(0), f(2)]))
                .with_uturn(RestrictionUTurn { feature: f(0), via_is_first_point: false }),
        );
        assert_eq!(only.canonical_edges(), explicit.canonical_edges());
        assert_eq!(out_segments(&only, seg(0, 0, true)), vec![seg(1, 0, true)]);
    }

    #[test]
    fn uturn_ban_keeps_straight_through() {
        // M passes through (1,0) where F0 ends.
        let g = build(
            &[
                (0, &[(0.0, 0.0), (1.0, 0.0)], false),
                (1, &[(1.0, -1.0), (1.0, 0.0), (1.0, 1.0)], false),
            ],
            &RestrictionSet::new().with_uturn(RestrictionUTurn { feature: f(0), via_is_first_point: false }),
        );
        assert_eq!(out_segments(&g, seg(0, 0, true)), vec![seg(1, 0, false), seg(1, 1, true)]);
        let through = out_segments(&g, seg(1, 0, true));
        assert!(through.contains(&seg(1, 1, true)));
        assert!(through.contains(&seg(0, 0, false)));
    }

    #[test]
    fn malformed_and_stale_records_are_dropped() {
        let plain = t_junction(&RestrictionSet::new());
        let noisy = t_junction(
            &RestrictionSet::new()
                .with(Restriction::no([f(0)]))
                .with(Restriction { kind: RestrictionKind::No, features: vec![] })
                .with(Restriction::no([f(0), f(0)]))
                .with(Restriction::only([f(0), f(1), f(1)]))
                .with(Restriction::no([f(0), f(42)]))
                .with_uturn(RestrictionUTurn { feature: f(42), via_is_first_point: true }),
        );
        assert_eq!(plain.canonical_edges(), noisy.canonical_edges());

        // Roads that never meet.
        let far = build(
            &[
                (0, &[(0.0, 0.0), (1.0, 0.0)], false),
                (1, &[(5.0, 5.0), (6.0, 5.0)], false),
            ],
            &RestrictionSet::new().with(Restriction::no([f(0), f(1)])),
        );
        assert_eq!(far.vertex_count(), 4);
    }

    /// One-way A into via road V; one-way B and C leave V's far end; one-way
    /// D joins V's near end.
    fn via_graph(set: &RestrictionSet) -> crate::RegionGraph {
        build(
            &[
                (0, &[(0.0, 0.0), (1.0, 0.0)], true),  // A
                (1, &[(1.0, 0.0), (2.0, 0.0)], false), // V
                (2, &[(2.0, 0.0), (3.0, 0.0)], true),  // B
                (3, &[(2.0, 0.0), (2.0, 1.0)], true),  // C
                (4, &[(1.0, 1.0), (1.0, 0.0)], true),  // D
            ],
            set,
        )
    }

    #[test]
    fn via_way_no_cuts_only_the_banned_sequence() {
        let plain = via_graph(&RestrictionSet::new());
        assert!(reachable(&plain, seg(0, 0, true), seg(2, 0, true)));

        let g = via_graph(&RestrictionSet::new().with(Restriction::no([f(0), f(1), f(2)])));
        assert_eq!(g.clone_count(), 2);
        assert!(!reachable(&g, seg(0, 0, true), seg(2, 0, true)));
        assert!(reachable(&g, seg(0, 0, true), seg(3, 0, true)));
        assert!(reachable(&g, seg(4, 0, true), seg(2, 0, true)));
        // The via road itself is still drivable from A.
        assert!(reachable(&g, seg(0, 0, true), seg(1, 0, true)));
    }

    #[test]
    fn via_way_only() {
        let g = via_graph(&RestrictionSet::new().with(Restriction::only([f(0), f(1), f(2)])));
        assert!(reachable(&g, seg(0, 0, true), seg(2, 0, true)));
        assert!(!reachable(&g, seg(0, 0, true), seg(3, 0, true)));
        assert!(reachable(&g, seg(4, 0, true), seg(3, 0, true)));
    }
}

#[cfg(test)]
mod order_independence {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use rand::seq::SliceRandom;

    use super::helpers::{build_from, f, lattice, lattice_loader};
    use crate::{Restriction, RestrictionSet, RestrictionUTurn};

    fn mixed_set() -> RestrictionSet {
        let (_, id) = lattice();
        let h01 = id((0, 1), (1, 1));
        let h11 = id((1, 1), (2, 1));
        let v10 = id((1, 0), (1, 1));
        let v11 = id((1, 1), (1, 2));
        let v20 = id((2, 0), (2, 1));
        let v21 = id((2, 1), (2, 2));
        let h00 = id((0, 0), (1, 0));
        let h12 = id((1, 2), (2, 2));

        RestrictionSet::new()
            .with(Restriction::no([f(h01), f(v11)]))
            .with(Restriction::only([f(v10), f(h11)]))
            .with(Restriction::no([f(h01), f(h11), f(v21)]))
            .with(Restriction::only([f(v10), f(h11), f(v20)]))
            .with(Restriction::no([f(v11), f(h12), f(v21)]))
            .with(Restriction::no([f(h01), f(h11)]))
            .with(Restriction::no([f(h01), f(v11)]))
            .with(Restriction::no([f(h00)]))
            .with_uturn(RestrictionUTurn { feature: f(h00), via_is_first_point: false })
            .with_uturn(RestrictionUTurn { feature: f(v21), via_is_first_point: true })
    }

    #[test]
    fn any_insertion_order_builds_the_same_graph() {
        let base_set = mixed_set();
        let baseline = build_from(lattice_loader(), &base_set);
        assert!(baseline.clone_count() > 0);
        let expected = baseline.canonical_edges();

        let mut reversed = base_set.clone();
        reversed.restrictions.reverse();
        reversed.uturns.reverse();
        let g = build_from(lattice_loader(), &reversed);
        assert_eq!(g.canonical_edges(), expected);

        for seed in 0..16u64 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut set = base_set.clone();
            set.restrictions.shuffle(&mut rng);
            set.uturns.shuffle(&mut rng);
            let g = build_from(lattice_loader(), &set);
            assert_eq!(g.vertex_count(), baseline.vertex_count(), "seed {seed}");
            assert_eq!(g.canonical_edges(), expected, "seed {seed}");
        }
    }
}
