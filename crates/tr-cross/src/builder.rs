//! Offline assembly of a region's cross-region section.

use rustc_hash::FxHashMap;
use tr_core::{PointCode, RegionId, Segment, TravelMode};
use tr_graph::{RegionGraph, Vertex};
use tr_search::{Search, WaveControl};

use crate::{Connector, CrossError, CrossResult, Transition, format};

/// Collects transitions, computes weight matrices and writes the section.
///
/// ```ignore
/// let mut b = ConnectorBuilder::new(region);
/// b.add_transition(t);
/// b.fill_weights_from_graph(&car_graph)?;
/// std::fs::write(path, b.serialize())?;
/// ```
pub struct ConnectorBuilder {
    region: RegionId,
    base: Option<PointCode>,
    transitions: Vec<Transition>,
    connectors: [Option<Connector>; TravelMode::COUNT],
}

impl ConnectorBuilder {
    pub fn new(region: RegionId) -> Self {
        Self { region, base: None, transitions: Vec::new(), connectors: Default::default() }
    }

    /// Point all coordinate deltas start from.  Defaults to the first
    /// transition's back point.
    pub fn with_base(mut self, base: PointCode) -> Self {
        self.base = Some(base);
        self
    }

    pub fn add_transition(&mut self, t: Transition) -> &mut Self {
        self.transitions.push(t);
        self.connectors = Default::default();
        self
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Connector numbering for `mode`, weights included once filled.
    pub fn connector(&mut self, mode: TravelMode) -> &Connector {
        let (region, transitions) = (self.region, &self.transitions);
        self.connectors[mode.index()].get_or_insert_with(|| Connector::new(region, mode, transitions))
    }

    /// Fill `mode`'s matrix from `weight(enter, exit)`; `None` or a
    /// non-finite value marks the pair unreachable.
    ///
    /// Values are rounded up to the next `f32` so a shortcut is never
    /// cheaper than the path it stands for.
    pub fn fill_weights(&mut self, mode: TravelMode, mut weight: impl FnMut(Segment, Segment) -> Option<f64>) -> &Connector {
        let c = Connector::new(self.region, mode, &self.transitions);
        let mut matrix = Vec::with_capacity(c.enters().len() * c.exits().len());
        for &enter in c.enters() {
            for &exit in c.exits() {
                matrix.push(weight(enter, exit).map_or(f32::INFINITY, round_up));
            }
        }
        self.store(c.with_weights(matrix))
    }

    /// Fill the matrix for `graph`'s mode with one Dijkstra wave per enter.
    pub fn fill_weights_from_graph(&mut self, graph: &RegionGraph) -> CrossResult<&Connector> {
        let c = Connector::new(self.region, graph.mode(), &self.transitions);
        for &s in c.enters().iter().chain(c.exits()) {
            if !graph.contains_segment(s) {
                return Err(CrossError::CorruptedData(format!("transition {s} is not in the region graph")));
            }
        }
        let exits: FxHashMap<Segment, usize> = c.exits().iter().enumerate().map(|(i, &s)| (s, i)).collect();

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<f32>> = {
            use rayon::prelude::*;
            c.enters().par_iter().map(|&e| weight_row(graph, e, &exits)).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<f32>> = c.enters().iter().map(|&e| weight_row(graph, e, &exits)).collect();

        log::info!(
            "region {}: {}x{} shortcut weights for {}",
            self.region,
            c.enters().len(),
            c.exits().len(),
            graph.mode()
        );
        Ok(self.store(c.with_weights(rows.concat())))
    }

    fn store(&mut self, c: Connector) -> &Connector {
        let slot = &mut self.connectors[c.mode().index()];
        slot.insert(c)
    }

    /// Encode transitions and every filled weight matrix.
    pub fn serialize(&self) -> Vec<u8> {
        let base = self.base.or_else(|| self.transitions.first().map(|t| t.back_point)).unwrap_or_default();
        let filled: Vec<&Connector> = self.connectors.iter().flatten().filter(|c| c.has_weights()).collect();
        format::serialize(base, &self.transitions, &filled)
    }
}

/// Weights from `enter` to every exit.  The first settled vertex built on
/// an exit segment fixes that exit's weight.
fn weight_row(graph: &RegionGraph, enter: Segment, exits: &FxHashMap<Segment, usize>) -> Vec<f32> {
    let mut row = vec![f32::INFINITY; exits.len()];
    let mut left = exits.len();
    let view = graph.view(None);
    let wave = Search::new(&view).propagate_wave(Vertex::Segment(enter), |v, d| {
        if let Some(&x) = graph.origin(v).and_then(|s| exits.get(&s)) {
            if row[x].is_infinite() && d.is_finite() {
                row[x] = round_up(d.weight);
                left -= 1;
                if left == 0 {
                    return WaveControl::Stop;
                }
            }
        }
        WaveControl::Continue
    });
    if let Err(never) = wave {
        match never {}
    }
    row
}

/// Smallest `f32` not below `w`.
pub(crate) fn round_up(w: f64) -> f32 {
    let f = w as f32;
    if (f as f64) < w && f.is_finite() {
        if f >= 0.0 {
            f32::from_bits(f.to_bits() + 1)
        } else {
            f32::from_bits(f.to_bits() - 1)
        }
    } else {
        f
    }
}
