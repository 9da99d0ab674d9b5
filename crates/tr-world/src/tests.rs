//! Unit and scenario tests for tr-world.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use tr_core::{FeatureId, GeoPoint, RegionId, RouterConfig, TravelMode};
    use tr_cross::{ConnectorBuilder, Transition};
    use tr_geometry::{GeometryStore, InMemoryLoader, RoadGeometry};
    use tr_graph::{EdgeEstimator, RegionGraph, RestrictionSet};

    use crate::{BoxLocator, InMemorySource, Route, RouteOutcome, Router, WorldGraph};

    pub const R: RegionId = RegionId(0);

    pub fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon)
    }

    pub fn road(id: u32, points: &[(f64, f64)], one_way: bool) -> (FeatureId, RoadGeometry) {
        let pts = points.iter().map(|&(lat, lon)| p(lat, lon)).collect();
        (FeatureId(id), RoadGeometry::new(FeatureId(id), pts, 60.0).unwrap().with_one_way(one_way))
    }

    pub fn loader(roads: Vec<(FeatureId, RoadGeometry)>) -> InMemoryLoader {
        roads.into_iter().collect()
    }

    pub fn world_with(source: InMemorySource, locator: BoxLocator, config: RouterConfig) -> Arc<WorldGraph> {
        Arc::new(WorldGraph::new(Arc::new(source), locator, config).unwrap())
    }

    /// One region covering everything near the origin.
    pub fn single(roads: Vec<(FeatureId, RoadGeometry)>, restrictions: RestrictionSet) -> Arc<WorldGraph> {
        single_with(roads, restrictions, RouterConfig::default())
    }

    pub fn single_with(
        roads: Vec<(FeatureId, RoadGeometry)>,
        restrictions: RestrictionSet,
        config: RouterConfig,
    ) -> Arc<WorldGraph> {
        let source = InMemorySource::new().with_region(R, loader(roads), restrictions);
        world_with(source, BoxLocator::new().with_region(R, p(-10.0, -10.0), p(10.0, 10.0)), config)
    }

    /// F0 (0,0)-(1,0), F1 (1,0)-(2,0), F2 (2,0)-(3,0), all one-way.
    pub fn line_roads() -> Vec<(FeatureId, RoadGeometry)> {
        vec![
            road(0, &[(0.0, 0.0), (1.0, 0.0)], true),
            road(1, &[(1.0, 0.0), (2.0, 0.0)], true),
            road(2, &[(2.0, 0.0), (3.0, 0.0)], true),
        ]
    }

    /// `line_roads` plus a one-way detour F3 from (1,0) to (2,0).
    pub fn detour_roads() -> Vec<(FeatureId, RoadGeometry)> {
        let mut roads = line_roads();
        roads.push(road(3, &[(1.0, 0.0), (1.5, 0.5), (2.0, 0.0)], true));
        roads
    }

    pub fn route(world: &Arc<WorldGraph>, from: GeoPoint, to: GeoPoint) -> RouteOutcome {
        Router::new(world.clone()).find_route(from, to, TravelMode::Car, None).unwrap()
    }

    pub fn found(outcome: RouteOutcome) -> Route {
        match outcome {
            RouteOutcome::Found(r) => r,
            other => panic!("expected a route, got {other:?}"),
        }
    }

    pub fn same_points(got: &[GeoPoint], want: &[(f64, f64)]) -> bool {
        got.len() == want.len() && got.iter().zip(want).all(|(a, &(lat, lon))| a.code() == p(lat, lon).code())
    }

    // ── Three-region corridor ─────────────────────────────────────────────

    /// Region `r` holds feature 1 running east along lat 0.  Each border
    /// segment exists in both regions it joins.
    pub fn corridor_loader(r: u16) -> InMemoryLoader {
        let pts: &[(f64, f64)] = match r {
            0 => &[(0.0, 0.0), (0.0, 0.01), (0.0, 0.02)],
            1 => &[(0.0, 0.01), (0.0, 0.02), (0.0, 0.03), (0.0, 0.04)],
            _ => &[(0.0, 0.03), (0.0, 0.04), (0.0, 0.05)],
        };
        loader(vec![road(1, pts, false)])
    }

    /// `(segment index, forward_is_enter)` of each region's transitions.
    pub fn corridor_transitions(r: u16) -> Vec<(u32, bool)> {
        match r {
            0 => vec![(1, false)],
            1 => vec![(0, true), (2, false)],
            _ => vec![(0, true)],
        }
    }

    pub fn corridor_section(r: u16) -> Vec<u8> {
        let region = RegionId(r);
        let loader = corridor_loader(r);
        let graph = RegionGraph::build(
            &GeometryStore::new(region, Arc::new(loader.clone())),
            &RestrictionSet::new(),
            EdgeEstimator::new(TravelMode::Car, &RouterConfig::default()),
        )
        .unwrap();
        let mut b = ConnectorBuilder::new(region);
        for (idx, enter) in corridor_transitions(r) {
            let (back, front) = graph.segment_points(tr_core::Segment::new(region, FeatureId(1), idx, true)).unwrap();
            b.add_transition(Transition::new(FeatureId(1), idx, back, front, enter));
        }
        b.fill_weights_from_graph(&graph).unwrap();
        b.serialize()
    }

    pub fn corridor_locator() -> BoxLocator {
        BoxLocator::new()
            .with_region(RegionId(0), p(-1.0, 0.0), p(1.0, 0.015))
            .with_region(RegionId(1), p(-1.0, 0.015), p(1.0, 0.035))
            .with_region(RegionId(2), p(-1.0, 0.035), p(1.0, 0.05))
    }

    /// `corrupt`: region 1 gets a truncated cross-region section.
    pub fn corridor(config: RouterConfig, corrupt: bool) -> Arc<WorldGraph> {
        let mut source = InMemorySource::new();
        for r in 0..3u16 {
            source = source.with_region(RegionId(r), corridor_loader(r), RestrictionSet::new());
            let mut section = corridor_section(r);
            if corrupt && r == 1 {
                section.truncate(section.len() / 2);
            }
            source = source.with_cross_section(RegionId(r), section);
        }
        world_with(source, corridor_locator(), config)
    }

    pub const CORRIDOR_POINTS: [(f64, f64); 6] =
        [(0.0, 0.0), (0.0, 0.01), (0.0, 0.02), (0.0, 0.03), (0.0, 0.04), (0.0, 0.05)];
}

// ── Sources and locators ──────────────────────────────────────────────────────

#[cfg(test)]
mod sources {
    use std::fs;

    use tr_core::{FeatureId, RegionId, TravelMode};
    use tr_graph::RestrictionKind;

    use super::helpers::*;
    use crate::source::load_restrictions_csv;
    use crate::{BoxLocator, DirectorySource, RegionLocator, RegionSource, WorldError};

    const ROADS: &str = "feature_id,speed_kmph,one_way,pass_through,modes,points\n\
                         0,60,true,true,,0 0;1 0\n\
                         1,60,true,true,,1 0;2 0\n\
                         2,60,true,true,,2 0;3 0\n";

    #[test]
    fn directory_source_reads_regions() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("0")).unwrap();
        fs::create_dir(dir.path().join("notes")).unwrap();
        fs::write(dir.path().join("0").join("roads.csv"), ROADS).unwrap();

        let source = DirectorySource::open(dir.path()).unwrap();
        assert_eq!(source.regions(), vec![RegionId(0)]);
        assert_eq!(source.geometry_loader(R).unwrap().feature_ids().len(), 3);
        assert!(source.restrictions(R).unwrap().is_empty());
        assert!(source.cross_region_section(R).unwrap().is_none());
        assert!(matches!(source.geometry_loader(RegionId(5)), Err(WorldError::UnknownRegion(_))));
    }

    #[test]
    fn restrictions_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restrictions.csv");
        fs::write(&path, "kind,features,via_first_point\nno,1 2,\nonly,3 4 5,\nuturn,7,true\n").unwrap();
        let set = load_restrictions_csv(&path).unwrap();
        assert_eq!(set.restrictions.len(), 2);
        assert_eq!(set.restrictions[1].kind, RestrictionKind::Only);
        assert_eq!(set.restrictions[1].features, vec![FeatureId(3), FeatureId(4), FeatureId(5)]);
        assert_eq!(set.uturns.len(), 1);
        assert!(set.uturns[0].via_is_first_point);

    }

    #[test]
    fn malformed_restriction_rows_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restrictions.csv");
        fs::write(
            &path,
            "kind,features,via_first_point\n\
             maybe,1 2,\n\
             no,1 x,\n\
             no,1 2,\n\
             uturn,1 2,false\n\
             uturn,3,perhaps\n\
             uturn,7,false\n",
        )
        .unwrap();
        let set = load_restrictions_csv(&path).unwrap();
        assert_eq!(set.restrictions.len(), 1);
        assert_eq!(set.restrictions[0].kind, RestrictionKind::No);
        assert_eq!(set.restrictions[0].features, vec![FeatureId(1), FeatureId(2)]);
        assert_eq!(set.uturns.len(), 1);
        assert_eq!(set.uturns[0].feature, FeatureId(7));
        assert!(!set.uturns[0].via_is_first_point);
    }

    #[test]
    fn restriction_framing_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restrictions.csv");
        fs::write(&path, "kind,features,via_first_point\nno,1 2,,extra\n").unwrap();
        assert!(matches!(load_restrictions_csv(&path), Err(WorldError::Parse(_))));
        assert!(load_restrictions_csv(&dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn directory_world_applies_restrictions() {
        let dir = tempfile::tempdir().unwrap();
        let region = dir.path().join("0");
        fs::create_dir(&region).unwrap();
        fs::write(region.join("roads.csv"), ROADS).unwrap();

        let open = || {
            let source = DirectorySource::open(dir.path()).unwrap();
            let locator = BoxLocator::from_source(&source).unwrap();
            world_with_source(source, locator)
        };
        assert!(route(&open(), p(0.0, 0.0), p(3.0, 0.0)).is_found());

        fs::write(region.join("restrictions.csv"), "kind,features,via_first_point\nno,0 1,\n").unwrap();
        assert!(!route(&open(), p(0.0, 0.0), p(3.0, 0.0)).is_found());
    }

    #[test]
    fn bad_restriction_rows_keep_region_routable() {
        let dir = tempfile::tempdir().unwrap();
        let region = dir.path().join("0");
        fs::create_dir(&region).unwrap();
        fs::write(region.join("roads.csv"), ROADS).unwrap();
        let open = || {
            let source = DirectorySource::open(dir.path()).unwrap();
            let locator = BoxLocator::from_source(&source).unwrap();
            world_with_source(source, locator)
        };

        fs::write(region.join("restrictions.csv"), "kind,features,via_first_point\nmaybe,1 2,\n").unwrap();
        let world = open();
        assert!(world.region_graph(RegionId(0), TravelMode::Car).is_ok());
        assert!(route(&world, p(0.0, 0.0), p(3.0, 0.0)).is_found());

        fs::write(region.join("restrictions.csv"), "kind,features,via_first_point\nno,0 1,\nmaybe,1 2,\n").unwrap();
        assert_eq!(route(&open(), p(0.0, 0.0), p(3.0, 0.0)), crate::RouteOutcome::NoPath);
    }

    fn world_with_source(source: DirectorySource, locator: BoxLocator) -> std::sync::Arc<crate::WorldGraph> {
        std::sync::Arc::new(
            crate::WorldGraph::new(std::sync::Arc::new(source), locator, tr_core::RouterConfig::default()).unwrap(),
        )
    }

    #[test]
    fn box_locator_from_source_bounds_roads() {
        let source = crate::InMemorySource::new()
            .with_region(RegionId(0), corridor_loader(0), Default::default())
            .with_region(RegionId(2), corridor_loader(2), Default::default());
        let locator = BoxLocator::from_source(&source).unwrap();
        assert_eq!(locator.locate(p(0.0, 0.005)), Some(RegionId(0)));
        assert_eq!(locator.locate(p(0.0, 0.045)), Some(RegionId(2)));
        assert_eq!(locator.locate(p(0.0, 0.025)), None);
        assert_eq!(locator.locate(p(0.5, 0.005)), None);
    }

    #[test]
    fn unknown_region_in_memory() {
        let world = single(line_roads(), Default::default());
        assert!(world.region_graph(RegionId(3), TravelMode::Car).is_err());
    }
}

// ── Region cache ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use std::sync::Arc;

    use rayon::prelude::*;
    use tr_core::{RegionId, RouterConfig, TravelMode};

    use super::helpers::*;

    #[test]
    fn concurrent_first_access_loads_once() {
        let world = single(detour_roads(), Default::default());
        let graphs: Vec<_> = (0..16)
            .into_par_iter()
            .map(|_| world.region_graph(R, TravelMode::Car).unwrap())
            .collect();
        assert!(graphs.iter().all(|g| Arc::ptr_eq(g, &graphs[0])));
        assert_eq!(world.cache().graph_loads(), 1);
        assert_eq!(world.cache().loaded_graphs(), 1);
    }

    #[test]
    fn modes_are_cached_separately() {
        let world = single(detour_roads(), Default::default());
        let car = world.region_graph(R, TravelMode::Car).unwrap();
        let again = world.region_graph(R, TravelMode::Car).unwrap();
        let foot = world.region_graph(R, TravelMode::Pedestrian).unwrap();
        assert!(Arc::ptr_eq(&car, &again));
        assert!(!Arc::ptr_eq(&car, &foot));
        assert_eq!(world.cache().graph_loads(), 2);
        assert!(world.cache().loaded_graph(R, TravelMode::Bicycle).is_none());
    }

    #[test]
    fn corrupted_section_yields_no_connector() {
        let world = corridor(RouterConfig::default(), true);
        assert!(world.connector(RegionId(1), TravelMode::Car).unwrap().is_none());
        let c = world.connector(RegionId(0), TravelMode::Car).unwrap().unwrap();
        assert!(c.has_weights());
        assert_eq!(world.cache().graph_loads(), 0);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = RouterConfig { cancel_poll_interval: 0, ..RouterConfig::default() };
        let source = crate::InMemorySource::new();
        let locator = crate::BoxLocator::new();
        assert!(crate::WorldGraph::new(Arc::new(source), locator, config).is_err());
    }
}

// ── Endpoint snapping ─────────────────────────────────────────────────────────

#[cfg(test)]
mod snapping {
    use tr_core::{FeatureId, RegionId, RouterConfig, Segment, TravelMode};

    use super::helpers::*;
    use crate::{WorldError, make_fake_ending, make_fake_ending_for_segment};

    fn two_way() -> std::sync::Arc<crate::WorldGraph> {
        single(vec![road(0, &[(0.0, 0.0), (0.0, 0.1)], false), road(1, &[(0.0, 0.1), (0.1, 0.1)], false)], Default::default())
    }

    #[test]
    fn mid_segment_point_splits_both_directions() {
        let world = two_way();
        let e = make_fake_ending(p(0.0001, 0.025), &world, TravelMode::Car).unwrap();
        assert_eq!(e.region, R);
        assert_eq!(e.projections.len(), 2);
        for proj in &e.projections {
            assert_eq!(proj.segment.feature, FeatureId(0));
            assert_eq!(proj.junction.code(), p(0.0, 0.025).code());
        }
        assert!(e.projections.iter().any(|p| p.segment.forward));
        assert!(e.projections.iter().any(|p| !p.segment.forward));
    }

    #[test]
    fn joint_point_attaches_without_split() {
        let world = two_way();
        let e = make_fake_ending(p(0.0, 0.1), &world, TravelMode::Car).unwrap();
        assert_eq!(e.projections.len(), 4);
        for proj in &e.projections {
            assert_eq!(proj.junction, p(0.0, 0.1));
            assert!(proj.junction == proj.segment_back || proj.junction == proj.segment_front);
        }
    }

    #[test]
    fn joint_keeps_tied_candidates_past_the_limit() {
        let world = single_with(
            vec![road(0, &[(0.0, 0.0), (0.0, 0.1)], false), road(1, &[(0.0, 0.1), (0.1, 0.1)], false)],
            Default::default(),
            RouterConfig { snap_candidates: 1, ..RouterConfig::default() },
        );
        let e = make_fake_ending(p(0.0, 0.1), &world, TravelMode::Car).unwrap();
        assert_eq!(e.projections.len(), 4);
        assert!(e.projections.iter().any(|p| p.segment.feature == FeatureId(0)));
        assert!(e.projections.iter().any(|p| p.segment.feature == FeatureId(1)));

        let mid = make_fake_ending(p(0.0001, 0.025), &world, TravelMode::Car).unwrap();
        assert!(mid.projections.iter().all(|p| p.segment.feature == FeatureId(0)));
    }

    #[test]
    fn one_way_road_gives_one_projection() {
        let world = single(line_roads(), Default::default());
        let e = make_fake_ending(p(0.5, 0.0001), &world, TravelMode::Car).unwrap();
        assert_eq!(e.projections.len(), 1);
        assert!(e.projections[0].segment.forward);
        assert!(e.projections[0].is_one_way);
    }

    #[test]
    fn far_and_uncovered_points_fail() {
        let world = two_way();
        assert!(matches!(
            make_fake_ending(p(5.0, 5.0), &world, TravelMode::Car),
            Err(WorldError::NoRoadNearby { .. })
        ));
        assert!(matches!(
            make_fake_ending(p(50.0, 50.0), &world, TravelMode::Car),
            Err(WorldError::RegionNotFound(_))
        ));

        let tight = single_with(
            vec![road(0, &[(0.0, 0.0), (0.0, 0.02)], false)],
            Default::default(),
            RouterConfig { snap_radius_m: 5.0, ..RouterConfig::default() },
        );
        assert!(make_fake_ending(p(0.001, 0.01), &tight, TravelMode::Car).is_err());
    }

    #[test]
    fn explicit_segment() {
        let world = two_way();
        let s = Segment::new(R, FeatureId(0), 0, false);
        let e = make_fake_ending_for_segment(s, p(0.0001, 0.05), &world, TravelMode::Car).unwrap();
        assert_eq!(e.projections.len(), 1);
        assert_eq!(e.projections[0].segment_back, p(0.0, 0.1));
        assert!(make_fake_ending_for_segment(Segment::new(RegionId(0), FeatureId(9), 0, true), p(0.0, 0.0), &world, TravelMode::Car).is_err());
    }
}

// ── Single-region routing ─────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use tr_core::{FeatureId, RouterConfig, TravelMode};
    use tr_graph::{Restriction, RestrictionSet, SpeedGroup, TrafficOverlay, TrafficSnapshot};
    use tr_search::CancelFlag;

    use super::helpers::*;
    use crate::{RouteOutcome, Router};

    #[test]
    fn straight_line_route() {
        let world = single(line_roads(), RestrictionSet::new());
        let r = found(route(&world, p(0.0, 0.0), p(3.0, 0.0)));
        assert!(same_points(&r.points, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]), "{:?}", r.points);
        assert_eq!(r.weight.pass_through_changes, 0);
        let features: Vec<u32> = r.segments.iter().map(|s| s.feature.0).collect();
        assert_eq!(features, vec![0, 1, 2]);
    }

    #[test]
    fn banned_only_continuation_means_no_path() {
        let set = RestrictionSet::new().with(Restriction::no([FeatureId(0), FeatureId(1)]));
        let world = single(line_roads(), set);
        assert_eq!(route(&world, p(0.0, 0.0), p(3.0, 0.0)), RouteOutcome::NoPath);
    }

    #[test]
    fn banned_turn_reroutes_through_detour() {
        let set = RestrictionSet::new().with(Restriction::no([FeatureId(0), FeatureId(1)]));
        let world = single(detour_roads(), set);
        let r = found(route(&world, p(0.0, 0.0), p(3.0, 0.0)));
        assert!(
            same_points(&r.points, &[(0.0, 0.0), (1.0, 0.0), (1.5, 0.5), (2.0, 0.0), (3.0, 0.0)]),
            "{:?}",
            r.points
        );
    }

    #[test]
    fn temp_block_forces_the_next_best_path() {
        let world = single(detour_roads(), RestrictionSet::new());
        let router = Router::new(world);
        let free = found(router.find_route(p(0.0, 0.0), p(3.0, 0.0), TravelMode::Car, None).unwrap());
        assert!(same_points(&free.points, &[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]));

        let mut overlay = TrafficOverlay::new();
        overlay.set(FeatureId(1), 0, true, SpeedGroup::TempBlock);
        let traffic = TrafficSnapshot::new().with_region(R, overlay);
        let blocked = found(router.find_route(p(0.0, 0.0), p(3.0, 0.0), TravelMode::Car, Some(&traffic)).unwrap());
        assert!(same_points(&blocked.points, &[(0.0, 0.0), (1.0, 0.0), (1.5, 0.5), (2.0, 0.0), (3.0, 0.0)]));
        assert!(blocked.weight.weight > free.weight.weight);
    }

    #[test]
    fn slow_traffic_raises_weight_only() {
        let world = single(line_roads(), RestrictionSet::new());
        let router = Router::new(world);
        let free = found(router.find_route(p(0.0, 0.0), p(3.0, 0.0), TravelMode::Car, None).unwrap());
        let mut overlay = TrafficOverlay::new();
        overlay.set(FeatureId(1), 0, true, SpeedGroup::G2);
        let traffic = TrafficSnapshot::new().with_region(R, overlay);
        let slow = found(router.find_route(p(0.0, 0.0), p(3.0, 0.0), TravelMode::Car, Some(&traffic)).unwrap());
        assert_eq!(slow.points, free.points);
        assert!(slow.weight.weight > free.weight.weight);
    }

    #[test]
    fn raised_flag_cancels() {
        let world = single(line_roads(), RestrictionSet::new());
        let flag = CancelFlag::new();
        flag.cancel();
        let router = Router::new(world).with_cancel(flag.clone());
        let outcome = router.find_route(p(0.0, 0.0), p(3.0, 0.0), TravelMode::Car, None).unwrap();
        assert_eq!(outcome, RouteOutcome::Cancelled);

        flag.reset();
        assert!(router.find_route(p(0.0, 0.0), p(3.0, 0.0), TravelMode::Car, None).unwrap().is_found());
    }

    #[test]
    fn both_points_on_one_segment() {
        let world = single(vec![road(0, &[(0.0, 0.0), (0.0, 0.02)], false)], RestrictionSet::new());
        let r = found(route(&world, p(0.0001, 0.005), p(0.0001, 0.015)));
        assert_eq!(r.points.len(), 4);
        assert_eq!(r.points[1].code(), p(0.0, 0.005).code());
        assert_eq!(r.points[2].code(), p(0.0, 0.015).code());
        assert_eq!(r.segments.len(), 1);
        assert!(r.segments[0].forward);
    }

    #[test]
    fn finish_behind_start_turns_around() {
        let world = single(vec![road(0, &[(0.0, 0.0), (0.0, 0.02)], false)], RestrictionSet::new());
        let r = found(route(&world, p(0.0001, 0.015), p(0.0001, 0.005)));
        assert!(r.segments.iter().all(|s| !s.forward));
    }

    #[test]
    fn no_pass_through_zone_is_avoided() {
        // Z is a short cut through a no-pass-through zone, D a long detour.
        let mut roads = vec![
            road(0, &[(0.0, 0.0), (1.0, 0.0)], true),
            road(1, &[(1.0, 0.0), (2.0, 0.0)], true),
            road(2, &[(2.0, 0.0), (3.0, 0.0)], true),
        ];
        roads[1].1.pass_through_allowed = false;
        let detour = road(3, &[(1.0, 0.0), (1.5, 1.0), (2.0, 0.0)], true);

        let mut with_detour = roads.clone();
        with_detour.push(detour);
        let r = found(route(&single(with_detour, RestrictionSet::new()), p(0.0, 0.0), p(3.0, 0.0)));
        assert!(r.points.iter().any(|q| q.code() == p(1.5, 1.0).code()));
        assert_eq!(r.weight.pass_through_changes, 0);

        let r = found(route(&single(roads.clone(), RestrictionSet::new()), p(0.0, 0.0), p(3.0, 0.0)));
        assert_eq!(r.weight.pass_through_changes, 2);

        let strict = RouterConfig { pass_through_changes_allowed: 1, ..RouterConfig::default() };
        let world = single_with(roads, RestrictionSet::new(), strict);
        assert_eq!(route(&world, p(0.0, 0.0), p(3.0, 0.0)), RouteOutcome::NoPath);
    }
}

// ── Cross-region routing ──────────────────────────────────────────────────────

#[cfg(test)]
mod corridor {
    use tr_core::{RegionId, RouterConfig};

    use super::helpers::*;

    fn no_unpack() -> RouterConfig {
        RouterConfig { unpack_shortcuts: false, ..RouterConfig::default() }
    }

    #[test]
    fn middle_region_is_crossed_by_shortcut() {
        let world = corridor(no_unpack(), false);
        let r = found(route(&world, p(0.0, 0.0), p(0.0, 0.05)));
        assert!(
            same_points(&r.points, &[(0.0, 0.0), (0.0, 0.01), (0.0, 0.02), (0.0, 0.04), (0.0, 0.05)]),
            "{:?}",
            r.points
        );
        assert_eq!(world.cache().graph_loads(), 2);
        assert!(world.cache().loaded_graph(RegionId(1), tr_core::TravelMode::Car).is_none());
    }

    #[test]
    fn unpacked_route_has_full_geometry() {
        let world = corridor(RouterConfig::default(), false);
        let r = found(route(&world, p(0.0, 0.0), p(0.0, 0.05)));
        assert!(same_points(&r.points, &CORRIDOR_POINTS), "{:?}", r.points);
        assert!(r.segments.iter().any(|s| s.region == RegionId(1) && s.segment_idx == 1));
    }

    #[test]
    fn shortcut_weight_matches_full_search() {
        let fast = found(route(&corridor(RouterConfig::default(), false), p(0.0, 0.0), p(0.0, 0.05)));
        let full_config = RouterConfig { use_shortcuts: false, ..RouterConfig::default() };
        let full_world = corridor(full_config, false);
        let full = found(route(&full_world, p(0.0, 0.0), p(0.0, 0.05)));
        assert_eq!(full_world.cache().graph_loads(), 3);
        assert!(same_points(&full.points, &CORRIDOR_POINTS));
        assert!((fast.weight.weight - full.weight.weight).abs() < 1e-3, "{} vs {}", fast.weight, full.weight);
    }

    #[test]
    fn corrupted_section_falls_back_to_full_load() {
        let world = corridor(no_unpack(), true);
        let r = found(route(&world, p(0.0, 0.0), p(0.0, 0.05)));
        assert!(same_points(&r.points, &CORRIDOR_POINTS), "{:?}", r.points);
        assert_eq!(world.cache().graph_loads(), 3);
    }

    #[test]
    fn reverse_direction() {
        let world = corridor(RouterConfig::default(), false);
        let r = found(route(&world, p(0.0, 0.05), p(0.0, 0.0)));
        let mut want = CORRIDOR_POINTS;
        want.reverse();
        assert!(same_points(&r.points, &want), "{:?}", r.points);
    }
}
