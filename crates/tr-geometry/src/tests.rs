//! Unit tests for tr-geometry.

#[cfg(test)]
mod helpers {
    use tr_core::{FeatureId, GeoPoint};

    use crate::{InMemoryLoader, RoadGeometry};

    pub fn road(points: &[(f64, f64)]) -> RoadGeometry {
        let pts = points.iter().map(|&(lat, lon)| GeoPoint::new(lat, lon)).collect();
        RoadGeometry::new(FeatureId(0), pts, 50.0).unwrap()
    }

    pub fn two_roads() -> InMemoryLoader {
        let mut loader = InMemoryLoader::new();
        loader
            .add_road(FeatureId(0), road(&[(0.0, 0.0), (1.0, 0.0)]))
            .add_road(FeatureId(1), road(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]).with_one_way(true));
        loader
    }
}

#[cfg(test)]
mod road {
    use tr_core::{FeatureId, GeoPoint, TravelMode};

    use super::helpers::road;
    use crate::{GeometryError, RoadGeometry};

    #[test]
    fn rejects_single_point() {
        let err = RoadGeometry::new(FeatureId(5), vec![GeoPoint::new(0.0, 0.0)], 50.0).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidRoad { feature: FeatureId(5), .. }));
    }

    #[test]
    fn rejects_non_positive_speed() {
        let pts = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)];
        assert!(RoadGeometry::new(FeatureId(1), pts.clone(), 0.0).is_err());
        assert!(RoadGeometry::new(FeatureId(1), pts, f64::NAN).is_err());
    }

    #[test]
    fn counts_and_defaults() {
        let r = road(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        assert_eq!(r.point_count(), 3);
        assert_eq!(r.segment_count(), 2);
        assert!(!r.one_way);
        assert!(r.pass_through_allowed);
        assert!(TravelMode::ALL.iter().all(|&m| r.allows(m)));
        assert!((r.length_m() - 2.0 * 111_195.0).abs() < 100.0);
    }

    #[test]
    fn mode_mask_restricts_access() {
        let r = road(&[(0.0, 0.0), (1.0, 0.0)]).with_modes(TravelMode::Pedestrian.mask());
        assert!(r.allows(TravelMode::Pedestrian));
        assert!(!r.allows(TravelMode::Car));
    }
}

#[cfg(test)]
mod store {
    use std::sync::Arc;

    use tr_core::{FeatureId, RegionId};

    use super::helpers::two_roads;
    use crate::{GeometryError, GeometryLoader, GeometryStore};

    #[test]
    fn feature_ids_are_sorted() {
        assert_eq!(two_roads().feature_ids(), vec![FeatureId(0), FeatureId(1)]);
    }

    #[test]
    fn repeated_loads_hit_cache() {
        let store = GeometryStore::new(RegionId(0), Arc::new(two_roads()));
        let a = store.load(FeatureId(1)).unwrap();
        let b = store.load(FeatureId(1)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.load_count(), 1);
        assert!(a.one_way);
    }

    #[test]
    fn unknown_feature_is_not_found() {
        let store = GeometryStore::new(RegionId(0), Arc::new(two_roads()));
        let err = store.load(FeatureId(99)).unwrap_err();
        assert!(matches!(err, GeometryError::FeatureNotFound(FeatureId(99))));
        assert_eq!(store.cached_count(), 0);
    }
}

#[cfg(test)]
mod csv_loading {
    use std::io::Cursor;

    use tr_core::{FeatureId, GeoPoint, TravelMode};

    use crate::{GeometryError, GeometryLoader, load_roads_reader};

    const CSV: &str = "\
feature_id,speed_kmph,one_way,pass_through,modes,points
0,60,true,true,,0 0;1 0
1,30,false,false,car bicycle,1 0;1.5 0.2;2 0
";

    #[test]
    fn parses_rows() {
        let loader = load_roads_reader(Cursor::new(CSV)).unwrap();
        assert_eq!(loader.len(), 2);

        let r0 = loader.load(FeatureId(0)).unwrap();
        assert!(r0.one_way);
        assert_eq!(r0.modes, TravelMode::ALL_MASK);

        let r1 = loader.load(FeatureId(1)).unwrap();
        assert!(!r1.pass_through_allowed);
        assert_eq!(r1.points[1], GeoPoint::new(1.5, 0.2));
        assert!(r1.allows(TravelMode::Car));
        assert!(!r1.allows(TravelMode::Pedestrian));
    }

    #[test]
    fn bad_point_is_parse_error() {
        let bad = "feature_id,speed_kmph,one_way,pass_through,modes,points\n0,60,true,true,,0 0;1\n";
        let err = load_roads_reader(Cursor::new(bad)).unwrap_err();
        assert!(matches!(err, GeometryError::Parse(_)));
    }

    #[test]
    fn duplicate_feature_keeps_later_row() {
        let dup = "feature_id,speed_kmph,one_way,pass_through,modes,points\n\
                   0,60,true,true,,0 0;1 0\n\
                   0,30,false,true,,0 0;0 1;1 1\n";
        let loader = load_roads_reader(Cursor::new(dup)).unwrap();
        assert_eq!(loader.len(), 1);
        assert!(loader.contains(FeatureId(0)));
        let road = loader.load(FeatureId(0)).unwrap();
        assert!(!road.one_way);
        assert_eq!(road.points.len(), 3);
    }

    #[test]
    fn unknown_mode_is_parse_error() {
        let bad = "feature_id,speed_kmph,one_way,pass_through,modes,points\n0,60,true,true,tram,0 0;1 0\n";
        assert!(matches!(load_roads_reader(Cursor::new(bad)), Err(GeometryError::Parse(_))));
    }
}
