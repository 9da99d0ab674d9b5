//! corridor — end-to-end demo of the tr region-partitioned router.
//!
//! Builds a synthetic corridor of `REGIONS` regions, serializes a
//! cross-region section for each, then routes from the west end to the east
//! end twice: once through shortcut weights and once loading every region.
//!
//! Usage: `corridor [config.json]`.  The optional file holds a JSON
//! `RouterConfig`; missing fields keep their defaults.  Set `RUST_LOG=debug`
//! to see region loads.

mod network;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};

use tr_core::{GeoPoint, RouterConfig, TravelMode};
use tr_world::{RouteOutcome, Router, WorldGraph};

use network::{build_corridor, east_end};

// ── Constants ─────────────────────────────────────────────────────────────────

const REGIONS: u16 = 6;

// ── Config ────────────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<RouterConfig> {
    let Some(path) = path else {
        return Ok(RouterConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: RouterConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

// ── Routing ───────────────────────────────────────────────────────────────────

fn run(label: &str, config: RouterConfig, from: GeoPoint, to: GeoPoint) -> Result<()> {
    let (source, locator) = build_corridor(REGIONS)?;
    let world = Arc::new(WorldGraph::new(Arc::new(source), locator, config)?);
    let router = Router::new(world.clone());

    let t0 = Instant::now();
    let outcome = router.find_route(from, to, TravelMode::Car, None)?;
    let elapsed = t0.elapsed();

    println!("-- {label} --");
    match outcome {
        RouteOutcome::Found(route) => {
            println!("  weight:         {}", route.weight);
            println!("  points:         {}", route.points.len());
            println!("  segments:       {}", route.segments.len());
            println!("  region loads:   {} of {REGIONS}", world.cache().graph_loads());
            println!("  elapsed:        {:.3} ms", elapsed.as_secs_f64() * 1e3);
            println!("  geometry:       {}", serde_json::to_string(&route.points)?);
        }
        RouteOutcome::NoPath => println!("  no path"),
        RouteOutcome::Cancelled => println!("  cancelled"),
    }
    println!();
    Ok(())
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::init();

    let config_path = std::env::args().nth(1);
    let config = load_config(config_path.as_deref().map(Path::new))?;
    log::info!("router config: {config:?}");

    println!("=== corridor — tr region-partitioned router ===");
    println!("Regions: {REGIONS}");
    println!();

    let from = GeoPoint::new(0.0, 0.0);
    let to = east_end(REGIONS);

    run("shortcuts", RouterConfig { use_shortcuts: true, ..config.clone() }, from, to)?;
    run("full regions", RouterConfig { use_shortcuts: false, ..config }, from, to)?;
    Ok(())
}
