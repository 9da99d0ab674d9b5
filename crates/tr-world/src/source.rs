//! Where region data comes from.
//!
//! # Directory layout
//!
//! [`DirectorySource`] reads one sub-directory per region, named by its
//! numeric id:
//!
//! ```text
//! <root>/0/roads.csv          required, see tr_geometry::roads_csv
//! <root>/0/restrictions.csv   optional
//! <root>/0/cross.bin          optional cross-region section
//! ```
//!
//! `restrictions.csv`:
//!
//! ```csv
//! kind,features,via_first_point
//! no,1 2,
//! only,3 4 5,
//! uturn,7,true
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use tr_core::{FeatureId, RegionId};
use tr_geometry::{GeometryLoader, InMemoryLoader, load_roads_csv};
use tr_graph::{Restriction, RestrictionKind, RestrictionSet, RestrictionUTurn};

use crate::{WorldError, WorldResult};

/// Supplier of per-region roads, restrictions and shortcut data.
pub trait RegionSource: Send + Sync {
    /// Every region this source knows, ascending.
    fn regions(&self) -> Vec<RegionId>;

    fn geometry_loader(&self, region: RegionId) -> WorldResult<Arc<dyn GeometryLoader>>;

    fn restrictions(&self, region: RegionId) -> WorldResult<RestrictionSet>;

    /// Raw cross-region section, `None` when the region has none.
    fn cross_region_section(&self, region: RegionId) -> WorldResult<Option<Vec<u8>>>;
}

// ── InMemorySource ────────────────────────────────────────────────────────────

struct RegionData {
    loader: Arc<InMemoryLoader>,
    restrictions: RestrictionSet,
    cross: Option<Vec<u8>>,
}

/// Regions assembled in code; used by tests and generators.
#[derive(Default)]
pub struct InMemorySource {
    regions: BTreeMap<RegionId, RegionData>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: RegionId, loader: InMemoryLoader, restrictions: RestrictionSet) -> Self {
        self.regions.insert(region, RegionData { loader: Arc::new(loader), restrictions, cross: None });
        self
    }

    /// Attach a cross-region section to an already added region.
    pub fn with_cross_section(mut self, region: RegionId, bytes: Vec<u8>) -> Self {
        if let Some(data) = self.regions.get_mut(&region) {
            data.cross = Some(bytes);
        }
        self
    }

    fn data(&self, region: RegionId) -> WorldResult<&RegionData> {
        self.regions.get(&region).ok_or(WorldError::UnknownRegion(region))
    }
}

impl RegionSource for InMemorySource {
    fn regions(&self) -> Vec<RegionId> {
        self.regions.keys().copied().collect()
    }

    fn geometry_loader(&self, region: RegionId) -> WorldResult<Arc<dyn GeometryLoader>> {
        Ok(self.data(region)?.loader.clone())
    }

    fn restrictions(&self, region: RegionId) -> WorldResult<RestrictionSet> {
        Ok(self.data(region)?.restrictions.clone())
    }

    fn cross_region_section(&self, region: RegionId) -> WorldResult<Option<Vec<u8>>> {
        Ok(self.data(region)?.cross.clone())
    }
}

// ── DirectorySource ───────────────────────────────────────────────────────────

pub const ROADS_FILE: &str = "roads.csv";
pub const RESTRICTIONS_FILE: &str = "restrictions.csv";
pub const CROSS_FILE: &str = "cross.bin";

/// Regions stored as files under one root directory.
pub struct DirectorySource {
    root: PathBuf,
    regions: Vec<RegionId>,
}

impl DirectorySource {
    /// Scan `root` for region directories.  Entries whose name is not a
    /// region id are skipped.
    pub fn open(root: impl Into<PathBuf>) -> WorldResult<Self> {
        let root = root.into();
        let mut regions = Vec::new();
        for entry in std::fs::read_dir(&root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().to_str().and_then(|n| n.parse::<u16>().ok()) {
                Some(id) => regions.push(RegionId(id)),
                None => log::debug!("skipping {:?}: not a region directory", entry.path()),
            }
        }
        regions.sort_unstable();
        log::info!("{} regions under {}", regions.len(), root.display());
        Ok(Self { root, regions })
    }

    fn dir(&self, region: RegionId) -> WorldResult<PathBuf> {
        if self.regions.binary_search(&region).is_err() {
            return Err(WorldError::UnknownRegion(region));
        }
        Ok(self.root.join(region.0.to_string()))
    }
}

impl RegionSource for DirectorySource {
    fn regions(&self) -> Vec<RegionId> {
        self.regions.clone()
    }

    fn geometry_loader(&self, region: RegionId) -> WorldResult<Arc<dyn GeometryLoader>> {
        let loader = load_roads_csv(&self.dir(region)?.join(ROADS_FILE))?;
        Ok(Arc::new(loader))
    }

    fn restrictions(&self, region: RegionId) -> WorldResult<RestrictionSet> {
        let path = self.dir(region)?.join(RESTRICTIONS_FILE);
        if !path.exists() {
            return Ok(RestrictionSet::new());
        }
        load_restrictions_csv(&path)
    }

    fn cross_region_section(&self, region: RegionId) -> WorldResult<Option<Vec<u8>>> {
        let path = self.dir(region)?.join(CROSS_FILE);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(path)?))
    }
}

#[derive(Deserialize)]
struct RestrictionRecord {
    kind: String,
    features: String,
    via_first_point: Option<bool>,
}

enum Record {
    Restriction(Restriction),
    UTurn(RestrictionUTurn),
}

/// Parse a restrictions file.  I/O and CSV framing problems are errors.
/// A row that does not describe a restriction is dropped with a warning;
/// records that merely do not fit the roads are left to the restriction
/// compiler.
pub fn load_restrictions_csv(path: &Path) -> WorldResult<RestrictionSet> {
    let mut reader = ::csv::Reader::from_path(path).map_err(|e| WorldError::Parse(e.to_string()))?;
    let mut set = RestrictionSet::new();
    let mut dropped = 0usize;
    for result in reader.deserialize::<RestrictionRecord>() {
        let parsed = match result {
            Ok(row) => parse_record(&row),
            Err(e) if matches!(e.kind(), ::csv::ErrorKind::Deserialize { .. }) => Err(e.to_string()),
            Err(e) => return Err(WorldError::Parse(e.to_string())),
        };
        match parsed {
            Ok(Record::Restriction(r)) => set = set.with(r),
            Ok(Record::UTurn(u)) => set = set.with_uturn(u),
            Err(msg) => {
                log::warn!("{}: dropping restriction row: {msg}", path.display());
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        log::warn!("{}: {dropped} malformed restriction rows dropped", path.display());
    }
    Ok(set)
}

fn parse_record(row: &RestrictionRecord) -> Result<Record, String> {
    let features = row
        .features
        .split_whitespace()
        .map(|f| f.parse::<u32>().map(FeatureId))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("features {:?}: {e}", row.features))?;
    match row.kind.trim() {
        "no" => Ok(Record::Restriction(Restriction { kind: RestrictionKind::No, features })),
        "only" => Ok(Record::Restriction(Restriction { kind: RestrictionKind::Only, features })),
        "uturn" => match (features.as_slice(), row.via_first_point) {
            ([feature], Some(via_is_first_point)) => {
                Ok(Record::UTurn(RestrictionUTurn { feature: *feature, via_is_first_point }))
            }
            _ => Err(format!("uturn needs one feature and via_first_point, got {:?}", row.features)),
        },
        other => Err(format!("unknown restriction kind {other:?}")),
    }
}
