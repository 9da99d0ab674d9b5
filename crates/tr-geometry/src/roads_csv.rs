//! CSV road loader.
//!
//! # CSV format
//!
//! One row per road feature:
//!
//! ```csv
//! feature_id,speed_kmph,one_way,pass_through,modes,points
//! 0,60,true,true,,0 0;1 0
//! 1,60,false,false,car bicycle,1 0;1.5 0.2;2 0
//! ```
//!
//! - **`points`**: `lat lon` pairs separated by `;`, at least two.
//! - **`modes`**: space-separated travel modes; empty means every mode.
//!
//! A feature id listed twice keeps its later row.
//!
//! The whole file is parsed up front into an [`InMemoryLoader`]; regions
//! are small enough that streaming buys nothing.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use tr_core::{FeatureId, GeoPoint, TravelMode, VehicleMask};

use crate::{GeometryError, GeometryResult, InMemoryLoader, RoadGeometry};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RoadRecord {
    feature_id:   u32,
    speed_kmph:   f64,
    one_way:      bool,
    pass_through: bool,
    modes:        Option<String>,
    points:       String,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every road of one region from a CSV file.
pub fn load_roads_csv(path: &Path) -> GeometryResult<InMemoryLoader> {
    let file = std::fs::File::open(path)?;
    load_roads_reader(file)
}

/// Like [`load_roads_csv`] but accepts any `Read` source.
pub fn load_roads_reader<R: Read>(reader: R) -> GeometryResult<InMemoryLoader> {
    let mut csv_reader = ::csv::Reader::from_reader(reader);
    let mut loader = InMemoryLoader::new();

    for result in csv_reader.deserialize::<RoadRecord>() {
        let row = result.map_err(|e| GeometryError::Parse(e.to_string()))?;
        let feature = FeatureId(row.feature_id);
        let points = parse_points(&row.points)?;
        let modes = match row.modes.as_deref().map(str::trim) {
            None | Some("") => TravelMode::ALL_MASK,
            Some(list) => parse_modes(list)?,
        };
        let road = RoadGeometry::new(feature, points, row.speed_kmph)?
            .with_one_way(row.one_way)
            .with_pass_through(row.pass_through)
            .with_modes(modes);
        if loader.contains(feature) {
            log::warn!("road {feature} listed twice; keeping the later row");
        }
        loader.add_road(feature, road);
    }

    log::debug!("parsed {} roads", loader.len());
    Ok(loader)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_points(s: &str) -> GeometryResult<Vec<GeoPoint>> {
    s.split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|pair| {
            let mut it = pair.split_whitespace().map(str::parse::<f64>);
            match (it.next(), it.next(), it.next()) {
                (Some(Ok(lat)), Some(Ok(lon)), None) => Ok(GeoPoint::new(lat, lon)),
                _ => Err(GeometryError::Parse(format!(
                    "invalid point {pair:?}: expected \"lat lon\""
                ))),
            }
        })
        .collect()
}

fn parse_modes(s: &str) -> GeometryResult<VehicleMask> {
    s.split_whitespace().try_fold(0, |mask, name| {
        name.parse::<TravelMode>()
            .map(|m| mask | m.mask())
            .map_err(|e| GeometryError::Parse(e.to_string()))
    })
}
