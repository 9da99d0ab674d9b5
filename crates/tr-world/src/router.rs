//! Route queries.

use std::sync::Arc;

use tr_core::{GeoPoint, Segment, TravelMode};
use tr_graph::{RouteWeight, TrafficSnapshot, Vertex};
use tr_search::{CancelFlag, Path, Search, SearchOutcome};

use crate::{FakeEnding, QueryGraph, QueryVertex, WorldGraph, WorldResult, make_fake_ending};

/// A found route.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    /// From the start query point to the finish query point, without
    /// consecutive duplicates.
    pub points: Vec<GeoPoint>,
    pub weight: RouteWeight,
    /// Directed segments driven, in order.  A border segment appears once
    /// per region it belongs to.
    pub segments: Vec<Segment>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RouteOutcome {
    Found(Route),
    NoPath,
    Cancelled,
}

impl RouteOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, RouteOutcome::Found(_))
    }

    pub fn route(&self) -> Option<&Route> {
        match self {
            RouteOutcome::Found(r) => Some(r),
            _ => None,
        }
    }
}

/// Entry point for route queries over one world graph.
///
/// Cheap to clone; every clone shares the world and the cancel flag.
#[derive(Clone)]
pub struct Router {
    world: Arc<WorldGraph>,
    cancel: CancelFlag,
}

impl Router {
    pub fn new(world: Arc<WorldGraph>) -> Self {
        Self { world, cancel: CancelFlag::new() }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn world(&self) -> &Arc<WorldGraph> {
        &self.world
    }

    /// Fastest route from `start` to `finish`.
    ///
    /// Snapping failures and unreadable regions are errors; an unreachable
    /// finish and a raised cancel flag are outcomes.
    pub fn find_route(
        &self,
        start: GeoPoint,
        finish: GeoPoint,
        mode: TravelMode,
        traffic: Option<&TrafficSnapshot>,
    ) -> WorldResult<RouteOutcome> {
        let start = make_fake_ending(start, &self.world, mode)?;
        let finish = make_fake_ending(finish, &self.world, mode)?;
        self.find_route_between(start, finish, mode, traffic)
    }

    /// Like [`find_route`](Self::find_route) with endpoints already snapped.
    pub fn find_route_between(
        &self,
        start: FakeEnding,
        finish: FakeEnding,
        mode: TravelMode,
        traffic: Option<&TrafficSnapshot>,
    ) -> WorldResult<RouteOutcome> {
        let config = self.world.config();
        let limit = config.pass_through_changes_allowed
            + i32::from(start.on_no_pass_through())
            + i32::from(finish.on_no_pass_through());

        let graph = QueryGraph::new(&self.world, mode, traffic, start, finish)?;
        let outcome = Search::new(&graph)
            .with_cancel(self.cancel.clone())
            .poll_every(config.cancel_poll_interval)
            .with_length_check(move |w: &RouteWeight| w.pass_through_changes <= limit)
            .bidirectional(QueryVertex::Start, QueryVertex::Finish)?;

        match outcome {
            SearchOutcome::Found(path) => {
                let route = self.build_route(&graph, path)?;
                log::debug!("{mode} route: {} points, {}", route.points.len(), route.weight);
                Ok(RouteOutcome::Found(route))
            }
            SearchOutcome::NoPath => {
                log::debug!("{mode}: no route");
                Ok(RouteOutcome::NoPath)
            }
            SearchOutcome::Cancelled => Ok(RouteOutcome::Cancelled),
        }
    }

    fn build_route(&self, graph: &QueryGraph<'_>, path: Path<QueryVertex, RouteWeight>) -> WorldResult<Route> {
        let (start, finish) = (graph.start(), graph.finish());
        let unpack = self.world.config().unpack_shortcuts;
        let mut points = Vec::new();
        let mut segments = Vec::new();
        let mut prev: Option<Vertex> = None;

        for v in &path.vertices {
            match *v {
                QueryVertex::Start => points.push(start.origin_junction),
                QueryVertex::Finish => points.push(finish.origin_junction),
                QueryVertex::StartPart(i) => {
                    let p = &start.projections[i as usize];
                    points.extend([p.junction, p.segment_front]);
                    segments.push(p.segment);
                }
                QueryVertex::FinishPart(j) => {
                    let p = &finish.projections[j as usize];
                    points.push(p.junction);
                    segments.push(p.segment);
                }
                QueryVertex::StartToFinish(i, j) => {
                    let p = &start.projections[i as usize];
                    points.extend([p.junction, finish.projections[j as usize].junction]);
                    segments.push(p.segment);
                }
                QueryVertex::Graph(g) => {
                    if let (true, Some(a)) = (unpack, prev) {
                        if a.region() == g.region() && graph.is_transit(g.region())? {
                            self.unpack_leap(a, g, graph.mode(), &mut points, &mut segments)?;
                        }
                    }
                    if let Some(p) = graph.vertex_point(v)? {
                        points.push(p);
                    }
                    if let Some(s) = graph.origin(&g)? {
                        segments.push(s);
                    }
                }
            }
            prev = match *v {
                QueryVertex::Graph(g) => Some(g),
                _ => None,
            };
        }

        points.dedup_by(|a, b| a.code() == b.code());
        Ok(Route { points, weight: path.weight, segments })
    }

    /// Append the geometry strictly between enter `a` and exit `b` of a
    /// transit region.
    fn unpack_leap(
        &self,
        a: Vertex,
        b: Vertex,
        mode: TravelMode,
        points: &mut Vec<GeoPoint>,
        segments: &mut Vec<Segment>,
    ) -> WorldResult<()> {
        let region = self.world.region_graph(a.region(), mode)?;
        let view = region.view(None);
        let outcome = match Search::new(&view).find_path(a, b) {
            Ok(o) => o,
            Err(never) => match never {},
        };
        let Some(found) = outcome.found() else {
            log::warn!("shortcut {a:?} -> {b:?} has no path in its region graph");
            return Ok(());
        };
        let inner = &found.vertices[1..found.vertices.len().saturating_sub(1).max(1)];
        for v in inner {
            if let Some(p) = region.front_point(v) {
                points.push(p);
            }
            if let Some(s) = region.origin(v) {
                segments.push(s);
            }
        }
        Ok(())
    }
}
