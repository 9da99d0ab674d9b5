//! Process-lifetime cache of region graphs and connectors.
//!
//! Each `(region, mode)` key owns an `Arc<OnceCell<_>>`.  The map lock is
//! held only to fetch or insert the cell; the load itself runs inside
//! `OnceCell::get_or_try_init`, so concurrent first accesses to one key
//! wait for a single load while other keys proceed.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use tr_core::{RegionId, RouterConfig, TravelMode};
use tr_cross::{Connector, CrossError};
use tr_geometry::GeometryStore;
use tr_graph::{EdgeEstimator, RegionGraph};

use crate::{RegionSource, WorldResult};

type Key = (RegionId, TravelMode);
type Slot<T> = Arc<OnceCell<T>>;

pub struct RegionCache {
    source: Arc<dyn RegionSource>,
    config: RouterConfig,
    stores: Mutex<FxHashMap<RegionId, Slot<Arc<GeometryStore>>>>,
    graphs: Mutex<FxHashMap<Key, Slot<Arc<RegionGraph>>>>,
    connectors: Mutex<FxHashMap<Key, Slot<Option<Arc<Connector>>>>>,
    graph_loads: AtomicUsize,
}

fn slot<K: std::hash::Hash + Eq, T>(map: &Mutex<FxHashMap<K, Slot<T>>>, key: K) -> Slot<T> {
    map.lock().entry(key).or_default().clone()
}

impl RegionCache {
    pub fn new(source: Arc<dyn RegionSource>, config: RouterConfig) -> Self {
        Self {
            source,
            config,
            stores: Mutex::default(),
            graphs: Mutex::default(),
            connectors: Mutex::default(),
            graph_loads: AtomicUsize::new(0),
        }
    }

    pub fn source(&self) -> &dyn RegionSource {
        self.source.as_ref()
    }

    /// Geometry of `region`, shared by every mode's graph.
    pub fn geometry(&self, region: RegionId) -> WorldResult<Arc<GeometryStore>> {
        slot(&self.stores, region)
            .get_or_try_init(|| -> WorldResult<_> {
                let loader = self.source.geometry_loader(region)?;
                Ok(Arc::new(GeometryStore::new(region, loader)))
            })
            .cloned()
    }

    /// The road graph of `region` for `mode`, built on first request.
    pub fn region_graph(&self, region: RegionId, mode: TravelMode) -> WorldResult<Arc<RegionGraph>> {
        slot(&self.graphs, (region, mode))
            .get_or_try_init(|| -> WorldResult<_> {
                let store = self.geometry(region)?;
                let restrictions = self.source.restrictions(region)?;
                let estimator = EdgeEstimator::new(mode, &self.config);
                let graph = RegionGraph::build(&store, &restrictions, estimator)?;
                self.graph_loads.fetch_add(1, Ordering::Relaxed);
                Ok(Arc::new(graph))
            })
            .cloned()
    }

    /// Graph of `(region, mode)` if it is already built.
    pub fn loaded_graph(&self, region: RegionId, mode: TravelMode) -> Option<Arc<RegionGraph>> {
        self.graphs.lock().get(&(region, mode)).and_then(|cell| cell.get().cloned())
    }

    /// The connector of `region` for `mode`.  `None` when the region has no
    /// cross-region section or the section is corrupted.
    pub fn connector(&self, region: RegionId, mode: TravelMode) -> WorldResult<Option<Arc<Connector>>> {
        slot(&self.connectors, (region, mode))
            .get_or_try_init(|| -> WorldResult<_> {
                let Some(bytes) = self.source.cross_region_section(region)? else {
                    log::debug!("region {region} has no cross-region section");
                    return Ok(None);
                };
                match Connector::deserialize(region, mode, &bytes) {
                    Ok(c) => Ok(Some(Arc::new(c))),
                    Err(CrossError::CorruptedData(msg)) => {
                        log::warn!("region {region}: {msg}; falling back to full loads");
                        Ok(None)
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .cloned()
    }

    /// Number of region graphs built so far.
    pub fn graph_loads(&self) -> usize {
        self.graph_loads.load(Ordering::Relaxed)
    }

    pub fn loaded_graphs(&self) -> usize {
        self.graphs.lock().values().filter(|c| c.get().is_some()).count()
    }
}
