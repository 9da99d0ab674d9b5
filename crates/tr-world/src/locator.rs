//! Point → region lookup.

use tr_core::{GeoPoint, RegionId};

use crate::{RegionSource, WorldResult};

/// Which region a query point belongs to.
pub trait RegionLocator: Send + Sync {
    fn locate(&self, point: GeoPoint) -> Option<RegionId>;
}

/// Axis-aligned lat/lon bounds, inclusive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub min: GeoPoint,
    pub max: GeoPoint,
}

impl Bounds {
    pub fn new(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            min: GeoPoint::new(a.lat.min(b.lat), a.lon.min(b.lon)),
            max: GeoPoint::new(a.lat.max(b.lat), a.lon.max(b.lon)),
        }
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.min.lat..=self.max.lat).contains(&p.lat) && (self.min.lon..=self.max.lon).contains(&p.lon)
    }

    fn extend(&mut self, p: GeoPoint) {
        *self = Bounds::new(
            GeoPoint::new(self.min.lat.min(p.lat), self.min.lon.min(p.lon)),
            GeoPoint::new(self.max.lat.max(p.lat), self.max.lon.max(p.lon)),
        );
    }
}

/// First region, in insertion order, whose box contains the point.
#[derive(Clone, Debug, Default)]
pub struct BoxLocator {
    boxes: Vec<(RegionId, Bounds)>,
}

impl BoxLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: RegionId, a: GeoPoint, b: GeoPoint) -> Self {
        self.boxes.push((region, Bounds::new(a, b)));
        self
    }

    /// Boxes around every road point of every region in `source`.
    ///
    /// Neighbouring regions overlap on their shared border segments; the
    /// lower region id wins there.
    pub fn from_source(source: &dyn RegionSource) -> WorldResult<Self> {
        let mut boxes = Vec::new();
        for region in source.regions() {
            let loader = source.geometry_loader(region)?;
            let mut bounds: Option<Bounds> = None;
            for feature in loader.feature_ids() {
                for &p in &loader.load(feature)?.points {
                    match bounds.as_mut() {
                        Some(b) => b.extend(p),
                        None => bounds = Some(Bounds::new(p, p)),
                    }
                }
            }
            match bounds {
                Some(b) => boxes.push((region, b)),
                None => log::warn!("region {region} has no roads, it will never be located"),
            }
        }
        Ok(Self { boxes })
    }

    pub fn bounds(&self, region: RegionId) -> Option<Bounds> {
        self.boxes.iter().find(|(r, _)| *r == region).map(|&(_, b)| b)
    }
}

impl RegionLocator for BoxLocator {
    fn locate(&self, point: GeoPoint) -> Option<RegionId> {
        self.boxes.iter().find(|(_, b)| b.contains(point)).map(|&(r, _)| r)
    }
}
