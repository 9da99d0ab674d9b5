//! Joints: coincident road points coalesced into one topological vertex.
//!
//! A joint is created for every quantised coordinate shared by two or more
//! road points, and for every feature endpoint (so dead ends are joints
//! too).  Interior points touched by no other road stay joint-less; moving
//! through them only continues along, or turns back on, the same feature.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use tr_core::{FeatureId, GeoPoint, JointId, PointCode, RoadPoint, Segment};
use tr_geometry::RoadGeometry;

/// Roads of one region, ordered by feature id.
pub type RoadTable = BTreeMap<FeatureId, Arc<RoadGeometry>>;

#[derive(Clone, Debug)]
pub struct Joint {
    pub point: GeoPoint,
    /// Sorted.
    pub members: Vec<RoadPoint>,
}

#[derive(Debug, Default)]
pub struct Joints {
    joints:   Vec<Joint>,
    by_point: FxHashMap<RoadPoint, JointId>,
    by_code:  FxHashMap<PointCode, JointId>,
}

impl Joints {
    pub fn build(roads: &RoadTable) -> Self {
        let mut groups: BTreeMap<PointCode, (GeoPoint, Vec<RoadPoint>, bool)> = BTreeMap::new();
        for (&feature, road) in roads {
            let last = road.last_point_idx();
            for (i, &p) in road.points.iter().enumerate() {
                let i = i as u32;
                let entry = groups.entry(p.code()).or_insert_with(|| (p, Vec::new(), false));
                entry.1.push(RoadPoint::new(feature, i));
                entry.2 |= i == 0 || i == last;
            }
        }

        let mut out = Joints::default();
        for (code, (point, mut members, has_end)) in groups {
            if members.len() < 2 && !has_end {
                continue;
            }
            members.sort_unstable();
            let id = JointId(out.joints.len() as u32);
            for &rp in &members {
                out.by_point.insert(rp, id);
            }
            out.by_code.insert(code, id);
            out.joints.push(Joint { point, members });
        }
        out
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    #[inline]
    pub fn get(&self, id: JointId) -> &Joint {
        &self.joints[id.index()]
    }

    #[inline]
    pub fn joint_of(&self, rp: RoadPoint) -> Option<JointId> {
        self.by_point.get(&rp).copied()
    }

    #[inline]
    pub fn at(&self, code: PointCode) -> Option<JointId> {
        self.by_code.get(&code).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (JointId, &Joint)> {
        self.joints.iter().enumerate().map(|(i, j)| (JointId(i as u32), j))
    }
}

// ── Road topology ─────────────────────────────────────────────────────────────

/// Segment-level topology of one region: which directed segments start or
/// end at a road point, and which road points a vehicle at a given point can
/// switch to.
pub(crate) struct Topology<'a> {
    pub region: tr_core::RegionId,
    pub roads:  &'a RoadTable,
    pub joints: &'a Joints,
}

impl<'a> Topology<'a> {
    /// Road points reachable without moving from `rp`.
    pub fn junction(&self, rp: RoadPoint) -> Vec<RoadPoint> {
        match self.joints.joint_of(rp) {
            Some(j) => self.joints.get(j).members.clone(),
            None => vec![rp],
        }
    }

    pub fn is_endpoint(&self, rp: RoadPoint) -> bool {
        self.roads
            .get(&rp.feature)
            .is_some_and(|r| rp.point_idx == 0 || rp.point_idx == r.last_point_idx())
    }

    /// Directed segments whose back point is `rp`.
    pub fn leaving(&self, rp: RoadPoint) -> Vec<Segment> {
        let Some(road) = self.roads.get(&rp.feature) else { return Vec::new() };
        let mut out = Vec::with_capacity(2);
        if rp.point_idx < road.last_point_idx() {
            out.push(Segment::new(self.region, rp.feature, rp.point_idx, true));
        }
        if rp.point_idx > 0 && !road.one_way {
            out.push(Segment::new(self.region, rp.feature, rp.point_idx - 1, false));
        }
        out
    }

    /// Directed segments whose front point is `rp`.
    pub fn arriving(&self, rp: RoadPoint) -> Vec<Segment> {
        let Some(road) = self.roads.get(&rp.feature) else { return Vec::new() };
        let mut out = Vec::with_capacity(2);
        if rp.point_idx > 0 {
            out.push(Segment::new(self.region, rp.feature, rp.point_idx - 1, true));
        }
        if rp.point_idx < road.last_point_idx() && !road.one_way {
            out.push(Segment::new(self.region, rp.feature, rp.point_idx, false));
        }
        out
    }

    /// Unrestricted successors of `s`, u-turn included.
    pub fn successors(&self, s: Segment) -> Vec<Segment> {
        self.junction(s.front())
            .into_iter()
            .flat_map(|q| self.leaving(q))
            .collect()
    }

    /// Endpoints of `from` sitting in a joint that also holds a point of `to`,
    /// with that joint.
    pub fn meeting(&self, from: FeatureId, to: FeatureId) -> Vec<(JointId, RoadPoint)> {
        let Some(road) = self.roads.get(&from) else { return Vec::new() };
        let mut ends = vec![RoadPoint::new(from, 0)];
        if road.last_point_idx() != 0 {
            ends.push(RoadPoint::new(from, road.last_point_idx()));
        }
        ends.into_iter()
            .filter_map(|end| {
                let j = self.joints.joint_of(end)?;
                self.joints
                    .get(j)
                    .members
                    .iter()
                    .any(|m| m.feature == to)
                    .then_some((j, end))
            })
            .collect()
    }
}
