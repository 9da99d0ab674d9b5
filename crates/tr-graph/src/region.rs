//! The per-region road graph.
//!
//! # Vertices
//!
//! Search vertices are directed segments.  A region's vertex arena holds
//! every real segment (sorted, so ids are stable for a given input) followed
//! by restriction-scoped clones.  A clone `(context, origin)` stands for
//! "driving `origin` after the feature sequence `context`"; it shares the
//! origin's geometry and cost but has its own adjacency, which is how
//! via-way restrictions cut a path without cutting any single edge.
//!
//! # Edge storage
//!
//! Outgoing and ingoing adjacency are frozen into two CSR arrays at build
//! time, as in a classic road network builder.  Weights are *not* stored:
//! [`RegionGraph::edges`] prices each edge at enumeration time with the
//! region's [`EdgeEstimator`] and the caller's traffic overlay.
//!
//! # Spatial index
//!
//! An R-tree over physical segments (both directions share one entry) serves
//! endpoint snapping.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;
use std::sync::Arc;

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use tr_core::{FeatureId, GeoPoint, JointId, PointCode, Projected, RegionId, Segment, TravelMode, VertexId};
use tr_geometry::{GeometryStore, RoadGeometry};
use tr_search::{Edge, Graph};

use crate::joints::{Joints, RoadTable, Topology};
use crate::restriction::{RestrictionSet, compile};
use crate::{EdgeEstimator, GraphError, GraphResult, RouteWeight, TrafficOverlay};

// ── Vertex identity ───────────────────────────────────────────────────────────

/// A search vertex inside one region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Vertex {
    /// A real directed segment.
    Segment(Segment),
    /// A restriction-scoped copy of a segment.
    Clone { region: RegionId, id: VertexId },
}

impl Vertex {
    #[inline]
    pub fn region(&self) -> RegionId {
        match self {
            Vertex::Segment(s) => s.region,
            Vertex::Clone { region, .. } => *region,
        }
    }

    #[inline]
    pub fn as_segment(&self) -> Option<Segment> {
        match self {
            Vertex::Segment(s) => Some(*s),
            Vertex::Clone { .. } => None,
        }
    }
}

impl From<Segment> for Vertex {
    fn from(s: Segment) -> Self {
        Vertex::Segment(s)
    }
}

/// Numbering-independent name of a vertex, used to compare graphs built
/// from differently ordered inputs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexKey {
    Real(Segment),
    Clone { context: Vec<FeatureId>, origin: Segment },
}

#[derive(Clone, Debug)]
struct VertexData {
    origin: Segment,
    context: Option<u32>,
}

// ── R-tree segment entry ──────────────────────────────────────────────────────

#[derive(Clone)]
struct SegmentEntry {
    a: [f64; 2], // [lat, lon]
    b: [f64; 2],
    feature: FeatureId,
    segment_idx: u32,
}

impl SegmentEntry {
    fn project(&self, p: &[f64; 2]) -> Projected {
        GeoPoint::new(p[0], p[1]).project_onto(
            GeoPoint::new(self.a[0], self.a[1]),
            GeoPoint::new(self.b[0], self.b[1]),
        )
    }
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.a, self.b)
    }
}

impl PointDistance for SegmentEntry {
    /// Squared planar distance in lat/lon space to the closest point of the
    /// segment.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.project(point).distance_2
    }
}

/// A physical segment near a query point, see [`RegionGraph::nearest_segments`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NearSegment {
    pub feature: FeatureId,
    pub segment_idx: u32,
    /// Projection onto the segment, `t` measured from point `segment_idx`.
    pub projected: Projected,
}

// ── RegionGraph ───────────────────────────────────────────────────────────────

/// Restriction-aware adjacency of one region for one travel mode.
///
/// Immutable once built; shared between query threads behind an `Arc`.
pub struct RegionGraph {
    region:    RegionId,
    estimator: EdgeEstimator,
    roads:     RoadTable,
    joints:    Joints,

    // ── Vertex arena ──────────────────────────────────────────────────────
    vertices:   Vec<VertexData>,
    real_count: usize,
    real_index: FxHashMap<Segment, VertexId>,
    by_origin:  FxHashMap<Segment, Vec<VertexId>>,
    contexts:   Vec<Vec<FeatureId>>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    out_start:   Vec<u32>,
    out_targets: Vec<VertexId>,
    in_start:    Vec<u32>,
    in_sources:  Vec<VertexId>,

    // ── Lookup indexes ────────────────────────────────────────────────────
    spatial_idx: RTree<SegmentEntry>,
    by_code:     FxHashMap<(PointCode, PointCode), Segment>,
}

impl RegionGraph {
    /// Load every road of `store` usable by the estimator's mode, build joints
    /// and adjacency, and compile `restrictions` into it.
    pub fn build(store: &GeometryStore, restrictions: &RestrictionSet, estimator: EdgeEstimator) -> GraphResult<Self> {
        let region = store.region();
        let mode = estimator.mode();

        let mut roads = RoadTable::new();
        for feature in store.feature_ids() {
            let road = store
                .load(feature)
                .map_err(|source| GraphError::Geometry { region, source })?;
            if road.allows(mode) {
                roads.insert(feature, road);
            }
        }
        Self::from_roads(region, roads, restrictions, estimator)
    }

    pub(crate) fn from_roads(
        region: RegionId,
        roads: RoadTable,
        restrictions: &RestrictionSet,
        estimator: EdgeEstimator,
    ) -> GraphResult<Self> {
        let joints = Joints::build(&roads);
        let topo = Topology { region, roads: &roads, joints: &joints };

        // ── Real vertices ─────────────────────────────────────────────────
        let mut vertices: Vec<VertexData> = Vec::new();
        for (&feature, road) in &roads {
            for idx in 0..road.segment_count() {
                vertices.push(VertexData { origin: Segment::new(region, feature, idx, true), context: None });
                if !road.one_way {
                    vertices.push(VertexData { origin: Segment::new(region, feature, idx, false), context: None });
                }
            }
        }
        vertices.sort_unstable_by_key(|v| v.origin);
        let real_count = vertices.len();
        let real_index: FxHashMap<Segment, VertexId> = vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (v.origin, VertexId(i as u32)))
            .collect();

        // ── Restrictions and clones ───────────────────────────────────────
        let compiled = compile(&topo, restrictions);
        let contexts: Vec<Vec<FeatureId>> = compiled.contexts.into_iter().collect();
        let context_id: BTreeMap<&[FeatureId], u32> = contexts
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_slice(), i as u32))
            .collect();

        let real_segments: Vec<Segment> = vertices.iter().map(|v| v.origin).collect();
        let mut clone_index: FxHashMap<(u32, Segment), VertexId> = FxHashMap::default();
        for (ci, ctx) in contexts.iter().enumerate() {
            let Some(&feature) = ctx.last() else { continue };
            for &origin in real_segments.iter().filter(|s| s.feature == feature) {
                let id = VertexId(vertices.len() as u32);
                clone_index.insert((ci as u32, origin), id);
                vertices.push(VertexData { origin, context: Some(ci as u32) });
            }
        }
        if u32::try_from(vertices.len()).is_err() {
            return Err(GraphError::TooLarge(region));
        }

        // Real target of an edge leaving `from_feature`, entering a root
        // context when `(from_feature, t.feature)` starts a via-way ban.
        let enter = |from_feature: FeatureId, t: Segment| -> Option<VertexId> {
            if t.feature != from_feature {
                if let Some(&ci) = context_id.get([from_feature, t.feature].as_slice()) {
                    return clone_index.get(&(ci, t)).copied();
                }
            }
            real_index.get(&t).copied()
        };

        let mut raw: Vec<(VertexId, VertexId)> = Vec::new();
        for (i, v) in vertices.iter().enumerate() {
            let from = VertexId(i as u32);
            let s = v.origin;
            for t in topo.successors(s) {
                if compiled.banned_pairs.contains(&(s, t)) {
                    continue;
                }
                let target = match v.context {
                    None => enter(s.feature, t),
                    Some(ci) => {
                        let ctx = &contexts[ci as usize];
                        if t.feature == s.feature {
                            let uturn_banned = t == s.reversed()
                                && topo.is_endpoint(s.front())
                                && compiled.banned_sequences.contains(&extend(ctx, s.feature));
                            if uturn_banned { None } else { clone_index.get(&(ci, t)).copied() }
                        } else {
                            let ext = extend(ctx, t.feature);
                            if compiled.banned_sequences.contains(&ext) {
                                None
                            } else if let Some(&next) = context_id.get(ext.as_slice()) {
                                clone_index.get(&(next, t)).copied()
                            } else {
                                enter(s.feature, t)
                            }
                        }
                    }
                };
                if let Some(to) = target {
                    raw.push((from, to));
                }
            }
        }

        // ── Freeze CSR ────────────────────────────────────────────────────
        raw.sort_unstable();
        raw.dedup();
        let n = vertices.len();
        let (out_start, out_targets) = csr(n, raw.iter().copied());
        let mut rev: Vec<(VertexId, VertexId)> = raw.iter().map(|&(f, t)| (t, f)).collect();
        rev.sort_unstable();
        let (in_start, in_sources) = csr(n, rev.into_iter());

        let mut by_origin: FxHashMap<Segment, Vec<VertexId>> = FxHashMap::default();
        for (i, v) in vertices.iter().enumerate() {
            by_origin.entry(v.origin).or_default().push(VertexId(i as u32));
        }

        // ── Indexes ───────────────────────────────────────────────────────
        let mut entries = Vec::new();
        let mut by_code = FxHashMap::default();
        for (&feature, road) in &roads {
            for idx in 0..road.segment_count() {
                let (a, b) = (road.point(idx), road.point(idx + 1));
                entries.push(SegmentEntry { a: [a.lat, a.lon], b: [b.lat, b.lon], feature, segment_idx: idx });
            }
        }
        for v in &vertices[..real_count] {
            let s = v.origin;
            if let Some(road) = roads.get(&s.feature) {
                let key = (road.point(s.back_point_idx()).code(), road.point(s.front_point_idx()).code());
                by_code.entry(key).or_insert(s);
            }
        }
        let spatial_idx = RTree::bulk_load(entries);

        log::info!(
            "region {region} ({}): {} roads, {} joints, {real_count} segments, {} clones, {} edges",
            estimator.mode(),
            roads.len(),
            joints.len(),
            n - real_count,
            out_targets.len(),
        );

        Ok(Self {
            region,
            estimator,
            roads,
            joints,
            vertices,
            real_count,
            real_index,
            by_origin,
            contexts,
            out_start,
            out_targets,
            in_start,
            in_sources,
            spatial_idx,
            by_code,
        })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn region(&self) -> RegionId {
        self.region
    }

    #[inline]
    pub fn mode(&self) -> TravelMode {
        self.estimator.mode()
    }

    #[inline]
    pub fn estimator(&self) -> &EdgeEstimator {
        &self.estimator
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn clone_count(&self) -> usize {
        self.vertices.len() - self.real_count
    }

    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }

    pub fn joints(&self) -> &Joints {
        &self.joints
    }

    // ── Vertex lookup ─────────────────────────────────────────────────────

    /// Arena id of `v`, `None` if it does not belong to this graph.
    pub fn vertex_id(&self, v: &Vertex) -> Option<VertexId> {
        match *v {
            Vertex::Segment(s) => self.real_index.get(&s).copied(),
            Vertex::Clone { region, id } => {
                (region == self.region && id.index() >= self.real_count && id.index() < self.vertices.len())
                    .then_some(id)
            }
        }
    }

    /// Public identity of arena vertex `id`.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> Vertex {
        if id.index() < self.real_count {
            Vertex::Segment(self.vertices[id.index()].origin)
        } else {
            Vertex::Clone { region: self.region, id }
        }
    }

    /// Real segment whose geometry and cost `v` uses.
    pub fn origin(&self, v: &Vertex) -> Option<Segment> {
        self.vertex_id(v).map(|id| self.vertices[id.index()].origin)
    }

    #[inline]
    pub fn contains_segment(&self, s: Segment) -> bool {
        self.real_index.contains_key(&s)
    }

    /// The real vertex for `s` and every clone of it.
    pub fn vertices_with_origin(&self, s: Segment) -> Vec<Vertex> {
        self.by_origin
            .get(&s)
            .map(|ids| ids.iter().map(|&id| self.vertex(id)).collect())
            .unwrap_or_default()
    }

    /// Numbering-independent name of `v`.
    pub fn vertex_key(&self, v: &Vertex) -> Option<VertexKey> {
        let id = self.vertex_id(v)?;
        let data = &self.vertices[id.index()];
        Some(match data.context {
            None => VertexKey::Real(data.origin),
            Some(ci) => VertexKey::Clone { context: self.contexts[ci as usize].clone(), origin: data.origin },
        })
    }

    // ── Geometry ──────────────────────────────────────────────────────────

    pub fn road(&self, feature: FeatureId) -> Option<&Arc<RoadGeometry>> {
        self.roads.get(&feature)
    }

    pub fn roads(&self) -> impl Iterator<Item = (FeatureId, &Arc<RoadGeometry>)> {
        self.roads.iter().map(|(&f, r)| (f, r))
    }

    /// `(back, front)` coordinates of `s`.
    pub fn segment_points(&self, s: Segment) -> Option<(GeoPoint, GeoPoint)> {
        let road = self.roads.get(&s.feature)?;
        (s.segment_idx < road.segment_count())
            .then(|| (road.point(s.back_point_idx()), road.point(s.front_point_idx())))
    }

    pub fn front_point(&self, v: &Vertex) -> Option<GeoPoint> {
        self.segment_points(self.origin(v)?).map(|(_, front)| front)
    }

    pub fn is_pass_through_allowed(&self, s: Segment) -> bool {
        self.roads.get(&s.feature).is_none_or(|r| r.pass_through_allowed)
    }

    /// Cost of driving all of `s`.
    pub fn segment_weight(&self, s: Segment, traffic: Option<&TrafficOverlay>) -> f64 {
        self.roads
            .get(&s.feature)
            .map_or(f64::INFINITY, |road| self.estimator.segment_weight(road, s, traffic))
    }

    /// Real segment with these quantised endpoints.
    pub fn segment_by_code(&self, back: PointCode, front: PointCode) -> Option<Segment> {
        self.by_code.get(&(back, front)).copied()
    }

    pub fn joint_at(&self, code: PointCode) -> Option<JointId> {
        self.joints.at(code)
    }

    /// The `k` physical segments nearest to `point`, closest first.  Every
    /// segment tied with the nearest one is returned even past `k`.
    pub fn nearest_segments(&self, point: GeoPoint, k: usize) -> Vec<NearSegment> {
        let q = [point.lat, point.lon];
        let mut out: Vec<NearSegment> = Vec::with_capacity(k);
        for e in self.spatial_idx.nearest_neighbor_iter(&q) {
            let near = NearSegment { feature: e.feature, segment_idx: e.segment_idx, projected: e.project(&q) };
            let tied = out.first().is_some_and(|first| near.projected.distance_2 <= first.projected.distance_2);
            if out.len() >= k && !tied {
                break;
            }
            out.push(near);
        }
        out
    }

    // ── Adjacency ─────────────────────────────────────────────────────────

    /// Weight of the stored edge `from → to`.  `None` when traffic blocks
    /// `to`.
    pub fn edge_weight(&self, from: VertexId, to: VertexId, traffic: Option<&TrafficOverlay>) -> Option<RouteWeight> {
        let u = self.vertices[from.index()].origin;
        let v = self.vertices[to.index()].origin;
        let road_v = self.roads.get(&v.feature)?;
        let mut weight = self.estimator.segment_weight(road_v, v, traffic);
        if !weight.is_finite() {
            return None;
        }
        if v == u.reversed() {
            weight += self.estimator.uturn_penalty();
        }
        let changes = i32::from(self.is_pass_through_allowed(u) != road_v.pass_through_allowed);
        Some(RouteWeight::new(weight, changes))
    }

    /// Append the neighbours of `v` to `out`: successors when `outgoing`,
    /// predecessors otherwise.  Each weight is that of the edge in its own
    /// direction.  Vertices outside this graph have no neighbours.
    pub fn edges(
        &self,
        v: &Vertex,
        outgoing: bool,
        traffic: Option<&TrafficOverlay>,
        out: &mut Vec<Edge<Vertex, RouteWeight>>,
    ) {
        let Some(id) = self.vertex_id(v) else { return };
        let (start, list) = if outgoing {
            (&self.out_start, &self.out_targets)
        } else {
            (&self.in_start, &self.in_sources)
        };
        let range = start[id.index()] as usize..start[id.index() + 1] as usize;
        for &other in &list[range] {
            let w = if outgoing { self.edge_weight(id, other, traffic) } else { self.edge_weight(other, id, traffic) };
            if let Some(w) = w {
                out.push(Edge::new(self.vertex(other), w));
            }
        }
    }

    /// Every edge under its numbering-independent name.
    pub fn canonical_edges(&self) -> BTreeSet<(VertexKey, VertexKey)> {
        let mut out = BTreeSet::new();
        for from in 0..self.vertices.len() {
            let fv = self.vertex(VertexId(from as u32));
            let range = self.out_start[from] as usize..self.out_start[from + 1] as usize;
            for &to in &self.out_targets[range] {
                let tv = self.vertex(to);
                if let (Some(a), Some(b)) = (self.vertex_key(&fv), self.vertex_key(&tv)) {
                    out.insert((a, b));
                }
            }
        }
        out
    }

    /// A [`Graph`] over this region under `traffic`.
    pub fn view<'a>(&'a self, traffic: Option<&'a TrafficOverlay>) -> RegionView<'a> {
        RegionView { graph: self, traffic }
    }
}

/// [`Graph`] adapter over one [`RegionGraph`] and a traffic overlay.
#[derive(Copy, Clone)]
pub struct RegionView<'a> {
    pub graph: &'a RegionGraph,
    pub traffic: Option<&'a TrafficOverlay>,
}

impl Graph for RegionView<'_> {
    type Vertex = Vertex;
    type Weight = RouteWeight;
    type Error = Infallible;

    fn edges(&self, v: &Vertex, outgoing: bool, out: &mut Vec<Edge<Vertex, RouteWeight>>) -> Result<(), Infallible> {
        self.graph.edges(v, outgoing, self.traffic, out);
        Ok(())
    }

    fn heuristic(&self, from: &Vertex, to: &Vertex) -> RouteWeight {
        match (self.graph.front_point(from), self.graph.front_point(to)) {
            (Some(a), Some(b)) => RouteWeight::from_secs(self.graph.estimator.heuristic(a, b)),
            _ => RouteWeight::ZERO,
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn extend(ctx: &[FeatureId], next: FeatureId) -> Vec<FeatureId> {
    let mut v = Vec::with_capacity(ctx.len() + 1);
    v.extend_from_slice(ctx);
    v.push(next);
    v
}

/// CSR row pointers and column array from `(row, col)` pairs sorted by row.
fn csr(rows: usize, pairs: impl Iterator<Item = (VertexId, VertexId)>) -> (Vec<u32>, Vec<VertexId>) {
    let mut start = vec![0u32; rows + 1];
    let mut cols = Vec::new();
    for (row, col) in pairs {
        start[row.index() + 1] += 1;
        cols.push(col);
    }
    for i in 1..=rows {
        start[i] += start[i - 1];
    }
    debug_assert_eq!(start[rows] as usize, cols.len());
    (start, cols)
}
