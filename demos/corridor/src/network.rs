//! Synthetic east-west corridor split into `n` regions.
//!
//! Region `r` holds one two-way road (feature 1) along latitude 0.  Points
//! sit every `STEP` degrees of longitude; neighbouring regions share one
//! border segment, which is a transition in both of them.

use std::sync::Arc;

use anyhow::Result;

use tr_core::{FeatureId, GeoPoint, RegionId, RouterConfig, Segment, TravelMode};
use tr_cross::{ConnectorBuilder, Transition};
use tr_geometry::{GeometryStore, InMemoryLoader, RoadGeometry};
use tr_graph::{EdgeEstimator, RegionGraph, RestrictionSet};
use tr_world::{BoxLocator, InMemorySource};

pub const STEP: f64 = 0.01;
const MAIN_ROAD: FeatureId = FeatureId(1);
const SPEED_KMPH: f64 = 60.0;

/// Point indices `[first, last]` of region `r`'s road.
fn span(r: u16, regions: u16) -> (u32, u32) {
    let first = (2 * r as u32).saturating_sub(1);
    let last = (2 * r as u32 + 2).min(2 * regions as u32 - 1);
    (first, last)
}

fn loader(r: u16, regions: u16) -> Result<InMemoryLoader> {
    let (first, last) = span(r, regions);
    let points = (first..=last).map(|i| GeoPoint::new(0.0, i as f64 * STEP)).collect();
    let road = RoadGeometry::new(MAIN_ROAD, points, SPEED_KMPH)?;
    Ok(std::iter::once((MAIN_ROAD, road)).collect())
}

/// Serialized cross-region section of region `r`, weights for every mode
/// the road allows.
fn cross_section(r: u16, regions: u16, loader: &InMemoryLoader) -> Result<Vec<u8>> {
    let region = RegionId(r);
    let store = GeometryStore::new(region, Arc::new(loader.clone()));
    let (first, last) = span(r, regions);
    let last_segment = last - first - 1;

    let mut builder = ConnectorBuilder::new(region);
    for mode in TravelMode::ALL {
        let graph = RegionGraph::build(
            &store,
            &RestrictionSet::new(),
            EdgeEstimator::new(mode, &RouterConfig::default()),
        )?;
        if builder.transitions().is_empty() {
            let mut borders = Vec::new();
            if r > 0 {
                borders.push((0, true));
            }
            if r + 1 < regions {
                borders.push((last_segment, false));
            }
            for (idx, forward_is_enter) in borders {
                let (back, front) = graph
                    .segment_points(Segment::new(region, MAIN_ROAD, idx, true))
                    .ok_or_else(|| anyhow::anyhow!("region {r} has no segment {idx}"))?;
                builder.add_transition(Transition::new(MAIN_ROAD, idx, back, front, forward_is_enter));
            }
        }
        builder.fill_weights_from_graph(&graph)?;
    }
    Ok(builder.serialize())
}

/// In-memory source and locator for an `regions`-long corridor.
pub fn build_corridor(regions: u16) -> Result<(InMemorySource, BoxLocator)> {
    anyhow::ensure!(regions >= 1, "corridor needs at least one region");

    let mut source = InMemorySource::new();
    let mut locator = BoxLocator::new();
    for r in 0..regions {
        let region = RegionId(r);
        let loader = loader(r, regions)?;
        let section = cross_section(r, regions, &loader)?;
        log::debug!("region {r}: cross-region section {} bytes", section.len());

        let west = if r == 0 { -1.0 } else { (2.0 * r as f64 - 0.5) * STEP };
        let east = (2.0 * r as f64 + 1.5) * STEP;
        locator = locator.with_region(region, GeoPoint::new(-1.0, west), GeoPoint::new(1.0, east));
        source = source
            .with_region(region, loader, RestrictionSet::new())
            .with_cross_section(region, section);
    }
    Ok((source, locator))
}

/// Easternmost point of the corridor.
pub fn east_end(regions: u16) -> GeoPoint {
    GeoPoint::new(0.0, (2 * regions as u32 - 1) as f64 * STEP)
}
