//! The per-query graph: world graph plus start and finish attachments.
//!
//! ```text
//! Start ──► StartPart(i) ──► successors of segment i ──► … ──► u ──► FinishPart(j) ──► Finish
//!   └──────────────► StartToFinish(i, j) ─────────────────────────────────────────────────┘
//! ```
//!
//! `StartPart(i)` stands for the rest of start segment `i` after the
//! projection, `FinishPart(j)` for finish segment `j` up to the projection.
//! `StartToFinish` covers both projections lying on one directed segment,
//! start first.

use std::cell::RefCell;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use tr_core::{GeoPoint, PointCode, RegionId, Segment, TravelMode};
use tr_cross::Connector;
use tr_graph::{EdgeEstimator, RegionGraph, RouteWeight, TrafficOverlay, TrafficSnapshot, Vertex};
use tr_search::{Edge, Graph};

use crate::{FakeEnding, WorldGraph, WorldResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryVertex {
    Start,
    Finish,
    StartPart(u32),
    FinishPart(u32),
    StartToFinish(u32, u32),
    Graph(Vertex),
}

/// How one region is traversed by this query.
#[derive(Clone)]
enum RegionAccess {
    Full { graph: Arc<RegionGraph>, connector: Option<Arc<Connector>> },
    /// Enter → exit leaps over precomputed weights.
    Transit(Arc<Connector>),
}

type QueryEdge = Edge<QueryVertex, RouteWeight>;

pub struct QueryGraph<'w> {
    world: &'w WorldGraph,
    mode: TravelMode,
    estimator: EdgeEstimator,
    traffic: Option<&'w TrafficSnapshot>,
    start: FakeEnding,
    finish: FakeEnding,

    /// `Start → StartPart(i)`.
    start_legs: Vec<Option<RouteWeight>>,
    /// Seconds from the back of finish segment `j` to its projection.
    finish_partials: Vec<f64>,
    /// `FinishPart(j) → Finish`.
    finish_legs: Vec<RouteWeight>,
    /// `Start → StartToFinish(i, j)` weights.
    direct: Vec<(u32, u32, RouteWeight)>,

    start_by_segment: FxHashMap<Segment, Vec<u32>>,
    /// Finish segments and their twins in neighbouring regions.
    finish_by_segment: FxHashMap<Segment, Vec<u32>>,
    /// Regions always loaded in full: endpoint regions and the regions of
    /// finish-segment twins.
    pinned: Vec<RegionId>,

    access: RefCell<FxHashMap<RegionId, RegionAccess>>,
}

impl<'w> QueryGraph<'w> {
    pub fn new(
        world: &'w WorldGraph,
        mode: TravelMode,
        traffic: Option<&'w TrafficSnapshot>,
        start: FakeEnding,
        finish: FakeEnding,
    ) -> WorldResult<Self> {
        let estimator = world.estimator(mode);
        let start_graph = world.region_graph(start.region, mode)?;
        let finish_graph = world.region_graph(finish.region, mode)?;
        let start_overlay = traffic.and_then(|t| t.overlay(start.region));
        let finish_overlay = traffic.and_then(|t| t.overlay(finish.region));

        let partial = |graph: &RegionGraph, s: Segment, from: GeoPoint, to: GeoPoint, overlay: Option<&TrafficOverlay>| {
            graph
                .road(s.feature)
                .map_or(f64::INFINITY, |road| estimator.partial_weight(road, s, from, to, overlay))
        };

        let start_legs = start
            .projections
            .iter()
            .map(|p| {
                let w = estimator.offroad_weight(start.origin_junction, p.junction)
                    + partial(&start_graph, p.segment, p.junction, p.segment_front, start_overlay);
                w.is_finite().then(|| RouteWeight::from_secs(w))
            })
            .collect();
        let finish_partials = finish
            .projections
            .iter()
            .map(|p| partial(&finish_graph, p.segment, p.segment_back, p.junction, finish_overlay))
            .collect();
        let finish_legs = finish
            .projections
            .iter()
            .map(|p| RouteWeight::from_secs(estimator.offroad_weight(p.junction, finish.origin_junction)))
            .collect();

        let mut direct = Vec::new();
        for (i, sp) in start.projections.iter().enumerate() {
            for (j, fp) in finish.projections.iter().enumerate() {
                if sp.segment != fp.segment || sp.offset_m() > fp.offset_m() {
                    continue;
                }
                let w = estimator.offroad_weight(start.origin_junction, sp.junction)
                    + partial(&start_graph, sp.segment, sp.junction, fp.junction, start_overlay);
                if w.is_finite() {
                    direct.push((i as u32, j as u32, RouteWeight::from_secs(w)));
                }
            }
        }

        let mut start_by_segment: FxHashMap<Segment, Vec<u32>> = FxHashMap::default();
        for (i, p) in start.projections.iter().enumerate() {
            start_by_segment.entry(p.segment).or_default().push(i as u32);
        }

        let mut pinned = vec![start.region, finish.region];
        let mut finish_by_segment: FxHashMap<Segment, Vec<u32>> = FxHashMap::default();
        let mut twins = Vec::new();
        for (j, p) in finish.projections.iter().enumerate() {
            finish_by_segment.entry(p.segment).or_default().push(j as u32);
            twins.clear();
            if let Some(codes) = world.twin_codes(p.segment, mode)? {
                world.twins(p.segment, codes, mode, &mut twins)?;
            }
            for &t in &twins {
                finish_by_segment.entry(t).or_default().push(j as u32);
                pinned.push(t.region);
            }
        }
        pinned.sort_unstable();
        pinned.dedup();

        Ok(Self {
            world,
            mode,
            estimator,
            traffic,
            start,
            finish,
            start_legs,
            finish_partials,
            finish_legs,
            direct,
            start_by_segment,
            finish_by_segment,
            pinned,
            access: RefCell::new(FxHashMap::default()),
        })
    }

    pub fn start(&self) -> &FakeEnding {
        &self.start
    }

    pub fn finish(&self) -> &FakeEnding {
        &self.finish
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    /// Whether `region` is crossed through shortcut weights only.
    pub fn is_transit(&self, region: RegionId) -> WorldResult<bool> {
        Ok(matches!(self.access(region)?, RegionAccess::Transit(_)))
    }

    fn overlay(&self, region: RegionId) -> Option<&'w TrafficOverlay> {
        self.traffic.and_then(|t| t.overlay(region))
    }

    fn access(&self, region: RegionId) -> WorldResult<RegionAccess> {
        if let Some(a) = self.access.borrow().get(&region) {
            return Ok(a.clone());
        }
        let a = self.resolve(region)?;
        self.access.borrow_mut().insert(region, a.clone());
        Ok(a)
    }

    fn resolve(&self, region: RegionId) -> WorldResult<RegionAccess> {
        let connector = self.world.connector(region, self.mode)?;
        let transit = self.world.config().use_shortcuts
            && self.pinned.binary_search(&region).is_err()
            && !self.traffic.is_some_and(|t| t.covers(region));
        if transit {
            if let Some(c) = connector.as_ref().filter(|c| c.has_weights()) {
                log::debug!("region {region} is transit-only");
                return Ok(RegionAccess::Transit(c.clone()));
            }
        }
        let graph = self.world.region_graph(region, self.mode)?;
        Ok(RegionAccess::Full { graph, connector })
    }

    /// Real segment behind `v`.
    pub fn origin(&self, v: &Vertex) -> WorldResult<Option<Segment>> {
        Ok(match v {
            Vertex::Segment(s) => Some(*s),
            Vertex::Clone { region, .. } => match self.access(*region)? {
                RegionAccess::Full { graph, .. } => graph.origin(v),
                RegionAccess::Transit(_) => None,
            },
        })
    }

    /// Front point of `v`, from geometry or from transition codes.
    pub fn vertex_point(&self, v: &QueryVertex) -> WorldResult<Option<GeoPoint>> {
        Ok(match *v {
            QueryVertex::Start => Some(self.start.origin_junction),
            QueryVertex::Finish => Some(self.finish.origin_junction),
            QueryVertex::StartPart(i) => self.start.projections.get(i as usize).map(|p| p.segment_front),
            QueryVertex::FinishPart(j) | QueryVertex::StartToFinish(_, j) => {
                self.finish.projections.get(j as usize).map(|p| p.junction)
            }
            QueryVertex::Graph(g) => match self.access(g.region())? {
                RegionAccess::Full { graph, .. } => graph.front_point(&g),
                RegionAccess::Transit(c) => {
                    g.as_segment().and_then(|s| c.segment_codes(s)).map(|(_, front)| front.to_point())
                }
            },
        })
    }

    // ── World edges ───────────────────────────────────────────────────────

    /// Neighbours of `v` in the world graph: region edges or shortcut
    /// leaps, plus zero-weight hops to border twins.
    pub fn world_edges(&self, v: &Vertex, outgoing: bool, out: &mut Vec<Edge<Vertex, RouteWeight>>) -> WorldResult<()> {
        let region = v.region();
        let codes: Option<(PointCode, PointCode)> = match self.access(region)? {
            RegionAccess::Full { graph, connector } => {
                graph.edges(v, outgoing, self.overlay(region), out);
                match (v.as_segment(), connector) {
                    (Some(s), Some(c)) => c.segment_codes(s),
                    (Some(s), None) => graph.segment_points(s).map(|(b, f)| (b.code(), f.code())),
                    (None, _) => None,
                }
            }
            RegionAccess::Transit(c) => {
                let Some(s) = v.as_segment() else { return Ok(()) };
                let mut leaps = Vec::new();
                c.shortcut_edges(s, outgoing, &mut leaps);
                out.extend(leaps.into_iter().map(|(t, w)| Edge::new(Vertex::Segment(t), RouteWeight::from_secs(w))));
                c.segment_codes(s)
            }
        };
        if let (Some(s), Some(codes)) = (v.as_segment(), codes) {
            let mut twins = Vec::new();
            self.world.twins(s, codes, self.mode, &mut twins)?;
            out.extend(twins.into_iter().map(|t| Edge::new(Vertex::Segment(t), RouteWeight::ZERO)));
        }
        Ok(())
    }

    /// Weight of `u → FinishPart(j)` from the weight `w` of `u → target`,
    /// where `target` is finish segment `j` or one of its twins.
    fn to_finish_part(&self, w: RouteWeight, target: Segment, j: u32) -> WorldResult<Option<RouteWeight>> {
        let full = match self.access(target.region)? {
            RegionAccess::Full { graph, .. } => graph.segment_weight(target, self.overlay(target.region)),
            RegionAccess::Transit(_) => return Ok(None),
        };
        let partial = self.finish_partials[j as usize];
        if !full.is_finite() || !partial.is_finite() {
            return Ok(None);
        }
        Ok(Some(RouteWeight::new((w.weight - full).max(0.0) + partial, w.pass_through_changes)))
    }

    /// Map world edges leaving a vertex of `from_region` to query edges.
    fn push_successors(&self, from_region: RegionId, edges: &[Edge<Vertex, RouteWeight>], out: &mut Vec<QueryEdge>) -> WorldResult<()> {
        for e in edges {
            out.push(Edge::new(QueryVertex::Graph(e.target), e.weight));
            if e.target.region() != from_region {
                continue;
            }
            let Some(origin) = self.origin(&e.target)? else { continue };
            if let Some(js) = self.finish_by_segment.get(&origin) {
                for &j in js {
                    if let Some(w) = self.to_finish_part(e.weight, origin, j)? {
                        out.push(Edge::new(QueryVertex::FinishPart(j), w));
                    }
                }
            }
        }
        Ok(())
    }

    /// Map world edges entering `v` to query edges, adding the start parts
    /// standing in for start segments.
    fn push_predecessors(&self, edges: &[Edge<Vertex, RouteWeight>], out: &mut Vec<QueryEdge>) {
        for e in edges {
            out.push(Edge::new(QueryVertex::Graph(e.target), e.weight));
            if let Some(is) = e.target.as_segment().and_then(|s| self.start_by_segment.get(&s)) {
                out.extend(is.iter().map(|&i| Edge::new(QueryVertex::StartPart(i), e.weight)));
            }
        }
    }

    fn finish_part_predecessors(&self, j: u32, out: &mut Vec<QueryEdge>) -> WorldResult<()> {
        let aliases: Vec<Segment> = self
            .finish_by_segment
            .iter()
            .filter(|(_, js)| js.contains(&j))
            .map(|(&s, _)| s)
            .collect();
        let mut edges = Vec::new();
        for alias in aliases {
            let RegionAccess::Full { graph, .. } = self.access(alias.region)? else { continue };
            for v in graph.vertices_with_origin(alias) {
                edges.clear();
                graph.edges(&v, false, self.overlay(alias.region), &mut edges);
                for e in &edges {
                    let Some(w) = self.to_finish_part(e.weight, alias, j)? else { continue };
                    out.push(Edge::new(QueryVertex::Graph(e.target), w));
                    if let Some(is) = e.target.as_segment().and_then(|s| self.start_by_segment.get(&s)) {
                        out.extend(is.iter().map(|&i| Edge::new(QueryVertex::StartPart(i), w)));
                    }
                }
            }
        }
        Ok(())
    }
}

impl Graph for QueryGraph<'_> {
    type Vertex = QueryVertex;
    type Weight = RouteWeight;
    type Error = crate::WorldError;

    fn edges(&self, v: &QueryVertex, outgoing: bool, out: &mut Vec<QueryEdge>) -> WorldResult<()> {
        let mut world = Vec::new();
        match (*v, outgoing) {
            (QueryVertex::Start, true) => {
                for (i, leg) in self.start_legs.iter().enumerate() {
                    if let Some(w) = leg {
                        out.push(Edge::new(QueryVertex::StartPart(i as u32), *w));
                    }
                }
                out.extend(self.direct.iter().map(|&(i, j, w)| Edge::new(QueryVertex::StartToFinish(i, j), w)));
            }
            (QueryVertex::Finish, false) => {
                for (j, &w) in self.finish_legs.iter().enumerate() {
                    out.push(Edge::new(QueryVertex::FinishPart(j as u32), w));
                }
                for &(i, j, _) in &self.direct {
                    out.push(Edge::new(QueryVertex::StartToFinish(i, j), self.finish_legs[j as usize]));
                }
            }
            (QueryVertex::Start, false) | (QueryVertex::Finish, true) => {}

            (QueryVertex::StartPart(i), true) => {
                let Some(p) = self.start.projections.get(i as usize) else { return Ok(()) };
                self.world_edges(&Vertex::Segment(p.segment), true, &mut world)?;
                self.push_successors(p.segment.region, &world, out)?;
            }
            (QueryVertex::StartPart(i), false) => {
                if let Some(Some(w)) = self.start_legs.get(i as usize) {
                    out.push(Edge::new(QueryVertex::Start, *w));
                }
            }

            (QueryVertex::FinishPart(j), true) => {
                if let Some(&w) = self.finish_legs.get(j as usize) {
                    out.push(Edge::new(QueryVertex::Finish, w));
                }
            }
            (QueryVertex::FinishPart(j), false) => self.finish_part_predecessors(j, out)?,

            (QueryVertex::StartToFinish(_, j), true) => {
                if let Some(&w) = self.finish_legs.get(j as usize) {
                    out.push(Edge::new(QueryVertex::Finish, w));
                }
            }
            (QueryVertex::StartToFinish(i, j), false) => {
                if let Some(&(_, _, w)) = self.direct.iter().find(|&&(a, b, _)| a == i && b == j) {
                    out.push(Edge::new(QueryVertex::Start, w));
                }
            }

            (QueryVertex::Graph(g), true) => {
                self.world_edges(&g, true, &mut world)?;
                self.push_successors(g.region(), &world, out)?;
            }
            (QueryVertex::Graph(g), false) => {
                self.world_edges(&g, false, &mut world)?;
                self.push_predecessors(&world, out);
            }
        }
        Ok(())
    }

    fn heuristic(&self, from: &QueryVertex, to: &QueryVertex) -> RouteWeight {
        match (self.vertex_point(from), self.vertex_point(to)) {
            (Ok(Some(a)), Ok(Some(b))) => RouteWeight::from_secs(self.estimator.heuristic(a, b)),
            _ => RouteWeight::ZERO,
        }
    }
}
