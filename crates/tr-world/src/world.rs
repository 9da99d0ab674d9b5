//! The world graph facade.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;

use tr_core::{GeoPoint, PointCode, RegionId, RouterConfig, Segment, TravelMode};
use tr_cross::Connector;
use tr_graph::{EdgeEstimator, RegionGraph};

use crate::{RegionCache, RegionLocator, RegionSource, WorldResult};

/// Border segments of every region, keyed by quantised endpoints.
///
/// A border segment exists in both regions it joins, with identical
/// coordinates.  Regions without a usable connector are not indexed; their
/// twins are found by probing the region graph instead.
struct TwinIndex {
    by_code: FxHashMap<(PointCode, PointCode), Vec<Segment>>,
    unindexed: Vec<RegionId>,
}

/// All regions behind one interface.
pub struct WorldGraph {
    cache: RegionCache,
    locator: Box<dyn RegionLocator>,
    config: RouterConfig,
    twins: [OnceCell<TwinIndex>; TravelMode::COUNT],
}

impl WorldGraph {
    pub fn new(
        source: Arc<dyn RegionSource>,
        locator: impl RegionLocator + 'static,
        config: RouterConfig,
    ) -> WorldResult<Self> {
        config.validate()?;
        Ok(Self {
            cache: RegionCache::new(source, config.clone()),
            locator: Box::new(locator),
            config,
            twins: Default::default(),
        })
    }

    #[inline]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    #[inline]
    pub fn cache(&self) -> &RegionCache {
        &self.cache
    }

    pub fn locate(&self, point: GeoPoint) -> Option<RegionId> {
        self.locator.locate(point)
    }

    pub fn estimator(&self, mode: TravelMode) -> EdgeEstimator {
        EdgeEstimator::new(mode, &self.config)
    }

    pub fn region_graph(&self, region: RegionId, mode: TravelMode) -> WorldResult<Arc<RegionGraph>> {
        self.cache.region_graph(region, mode)
    }

    pub fn connector(&self, region: RegionId, mode: TravelMode) -> WorldResult<Option<Arc<Connector>>> {
        self.cache.connector(region, mode)
    }

    // ── Twins ─────────────────────────────────────────────────────────────

    fn twin_index(&self, mode: TravelMode) -> WorldResult<&TwinIndex> {
        self.twins[mode.index()].get_or_try_init(|| -> WorldResult<_> {
            let mut by_code: FxHashMap<(PointCode, PointCode), Vec<Segment>> = FxHashMap::default();
            let mut unindexed = Vec::new();
            for region in self.cache.source().regions() {
                match self.connector(region, mode)? {
                    Some(c) => {
                        for (s, codes) in c.boundary() {
                            by_code.entry(codes).or_default().push(s);
                        }
                    }
                    None => unindexed.push(region),
                }
            }
            log::debug!(
                "{mode} twin index: {} border keys, {} regions probed by graph",
                by_code.len(),
                unindexed.len()
            );
            Ok(TwinIndex { by_code, unindexed })
        })
    }

    /// Quantised endpoints under which `s` may have twins.  Regions with a
    /// connector only have twins for their transitions; other regions may
    /// have them for any segment.
    pub fn twin_codes(&self, s: Segment, mode: TravelMode) -> WorldResult<Option<(PointCode, PointCode)>> {
        if let Some(c) = self.connector(s.region, mode)? {
            return Ok(c.segment_codes(s));
        }
        let graph = self.region_graph(s.region, mode)?;
        Ok(graph.segment_points(s).map(|(back, front)| (back.code(), front.code())))
    }

    /// Segments of other regions with exactly the endpoints `codes`,
    /// appended to `out`.
    pub fn twins(&self, s: Segment, codes: (PointCode, PointCode), mode: TravelMode, out: &mut Vec<Segment>) -> WorldResult<()> {
        let index = self.twin_index(mode)?;
        if let Some(list) = index.by_code.get(&codes) {
            out.extend(list.iter().filter(|t| t.region != s.region));
        }
        for &region in index.unindexed.iter().filter(|&&r| r != s.region) {
            if let Some(t) = self.region_graph(region, mode)?.segment_by_code(codes.0, codes.1) {
                out.push(t);
            }
        }
        Ok(())
    }
}
