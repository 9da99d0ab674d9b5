//! Attaching query points to the road graph.

use tr_core::{GeoPoint, RegionId, Segment, TravelMode};
use tr_graph::RegionGraph;

use crate::{WorldError, WorldGraph, WorldResult};

/// One way of reaching the road from a query point: a directed segment and
/// the point on it closest to the query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    pub segment: Segment,
    pub is_one_way: bool,
    pub segment_back: GeoPoint,
    pub segment_front: GeoPoint,
    /// Where the query point meets the segment.
    pub junction: GeoPoint,
    pub pass_through_allowed: bool,
}

impl Projection {
    /// Metres from the segment's back point to the junction.
    #[inline]
    pub fn offset_m(&self) -> f64 {
        self.segment_back.distance_m(self.junction)
    }
}

/// Synthetic attachment of a start or finish point.  Built per query.
#[derive(Clone, Debug, PartialEq)]
pub struct FakeEnding {
    pub region: RegionId,
    /// The query point itself.
    pub origin_junction: GeoPoint,
    pub projections: Vec<Projection>,
}

impl FakeEnding {
    /// Some projection lies on a road that is not open to through traffic.
    pub fn on_no_pass_through(&self) -> bool {
        self.projections.iter().any(|p| !p.pass_through_allowed)
    }
}

/// Snap `point` onto the nearest roads of the region containing it.
///
/// The `snap_candidates` nearest physical segments within `snap_radius_m`
/// are used, plus any tied with the nearest, each in every direction
/// `mode` may drive it.  A point lying on a
/// joint attaches to that joint without splitting any segment.
pub fn make_fake_ending(point: GeoPoint, world: &WorldGraph, mode: TravelMode) -> WorldResult<FakeEnding> {
    let region = world.locate(point).ok_or(WorldError::RegionNotFound(point))?;
    let graph = world.region_graph(region, mode)?;
    let config = world.config();
    let on_joint = graph.joint_at(point.code()).is_some();

    let mut projections = Vec::new();
    for near in graph.nearest_segments(point, config.snap_candidates) {
        let Some((a, b)) = graph.segment_points(Segment::new(region, near.feature, near.segment_idx, true)) else {
            continue;
        };
        let junction = if on_joint {
            let end = if near.projected.t < 0.5 { a } else { b };
            if end.code() != point.code() {
                continue;
            }
            end
        } else {
            near.projected.point
        };
        if point.distance_m(junction) > config.snap_radius_m {
            continue;
        }
        push_projections(&graph, region, near.feature, near.segment_idx, (a, b), junction, &mut projections);
    }

    if projections.is_empty() {
        return Err(WorldError::NoRoadNearby { point, radius_m: config.snap_radius_m });
    }
    log::trace!("{point} snapped to {} projections in region {region}", projections.len());
    Ok(FakeEnding { region, origin_junction: point, projections })
}

/// Attach `point` to one given directed segment.
pub fn make_fake_ending_for_segment(
    segment: Segment,
    point: GeoPoint,
    world: &WorldGraph,
    mode: TravelMode,
) -> WorldResult<FakeEnding> {
    let graph = world.region_graph(segment.region, mode)?;
    if !graph.contains_segment(segment) {
        return Err(WorldError::SegmentNotFound(segment));
    }
    let (back, front) = graph.segment_points(segment).ok_or(WorldError::SegmentNotFound(segment))?;
    let road = graph.road(segment.feature).ok_or(WorldError::SegmentNotFound(segment))?;
    let junction = point.project_onto(back, front).point;
    Ok(FakeEnding {
        region: segment.region,
        origin_junction: point,
        projections: vec![Projection {
            segment,
            is_one_way: road.one_way,
            segment_back: back,
            segment_front: front,
            junction,
            pass_through_allowed: road.pass_through_allowed,
        }],
    })
}

fn push_projections(
    graph: &RegionGraph,
    region: RegionId,
    feature: tr_core::FeatureId,
    segment_idx: u32,
    (a, b): (GeoPoint, GeoPoint),
    junction: GeoPoint,
    out: &mut Vec<Projection>,
) {
    let Some(road) = graph.road(feature) else { return };
    for forward in [true, false] {
        let segment = Segment::new(region, feature, segment_idx, forward);
        if !graph.contains_segment(segment) {
            continue;
        }
        let (segment_back, segment_front) = if forward { (a, b) } else { (b, a) };
        out.push(Projection {
            segment,
            is_one_way: road.one_way,
            segment_back,
            segment_front,
            junction,
            pass_through_allowed: road.pass_through_allowed,
        });
    }
}
