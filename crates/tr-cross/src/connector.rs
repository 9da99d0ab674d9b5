//! Per-region, per-mode numbering of enters and exits plus their weight
//! matrix.

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use tr_core::{PointCode, RegionId, Segment, TravelMode};

use crate::Transition;

/// Enters and exits of one region for one travel mode.
///
/// Enters and exits are numbered in transition order.  The forward
/// direction of a transition is an enter when `forward_is_enter`, an exit
/// otherwise; the backward direction, present only for roads that are not
/// one-way for the mode, is the opposite kind.
///
/// Weights are kept as the raw little-endian `f32` section and decoded on
/// first use.
pub struct Connector {
    region: RegionId,
    mode: TravelMode,
    enters: Vec<Segment>,
    exits: Vec<Segment>,
    enter_idx: FxHashMap<Segment, u32>,
    exit_idx: FxHashMap<Segment, u32>,
    codes: FxHashMap<Segment, (PointCode, PointCode)>,
    raw_weights: Option<Vec<u8>>,
    weights: OnceCell<Vec<f32>>,
}

impl Connector {
    /// Number the transitions usable by `mode`.  No weights yet.
    pub fn new(region: RegionId, mode: TravelMode, transitions: &[Transition]) -> Self {
        let mut c = Connector {
            region,
            mode,
            enters: Vec::new(),
            exits: Vec::new(),
            enter_idx: FxHashMap::default(),
            exit_idx: FxHashMap::default(),
            codes: FxHashMap::default(),
            raw_weights: None,
            weights: OnceCell::new(),
        };
        for t in transitions.iter().filter(|t| t.is_road(mode)) {
            c.push(t, true);
            if !t.is_one_way(mode) {
                c.push(t, false);
            }
        }
        c
    }

    fn push(&mut self, t: &Transition, forward: bool) {
        let seg = t.segment(self.region, forward);
        let is_enter = t.forward_is_enter == forward;
        let (list, idx) = if is_enter {
            (&mut self.enters, &mut self.enter_idx)
        } else {
            (&mut self.exits, &mut self.exit_idx)
        };
        idx.insert(seg, list.len() as u32);
        list.push(seg);
        self.codes.insert(seg, t.codes(forward));
    }

    /// Attach a raw weight section.  Its length must already match
    /// `enters × exits`.
    pub(crate) fn set_raw_weights(&mut self, raw: Vec<u8>) {
        debug_assert_eq!(raw.len(), self.enters.len() * self.exits.len() * 4);
        self.raw_weights = Some(raw);
        self.weights = OnceCell::new();
    }

    /// Attach decoded weights, row-major by enter.
    pub fn with_weights(mut self, weights: Vec<f32>) -> Self {
        let raw = weights.iter().flat_map(|w| w.to_le_bytes()).collect();
        self.set_raw_weights(raw);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn region(&self) -> RegionId {
        self.region
    }

    #[inline]
    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    pub fn enters(&self) -> &[Segment] {
        &self.enters
    }

    pub fn exits(&self) -> &[Segment] {
        &self.exits
    }

    pub fn is_enter(&self, s: Segment) -> bool {
        self.enter_idx.contains_key(&s)
    }

    pub fn is_exit(&self, s: Segment) -> bool {
        self.exit_idx.contains_key(&s)
    }

    pub fn is_transition(&self, s: Segment) -> bool {
        self.codes.contains_key(&s)
    }

    pub fn enter_index(&self, s: Segment) -> Option<u32> {
        self.enter_idx.get(&s).copied()
    }

    pub fn exit_index(&self, s: Segment) -> Option<u32> {
        self.exit_idx.get(&s).copied()
    }

    /// Quantised `(back, front)` of a transition segment.
    pub fn segment_codes(&self, s: Segment) -> Option<(PointCode, PointCode)> {
        self.codes.get(&s).copied()
    }

    /// Every enter and exit with its quantised endpoints.
    pub fn boundary(&self) -> impl Iterator<Item = (Segment, (PointCode, PointCode))> + '_ {
        self.enters.iter().chain(self.exits.iter()).map(|&s| (s, self.codes[&s]))
    }

    // ── Weights ───────────────────────────────────────────────────────────

    /// Whether shortcut weights are attached.
    #[inline]
    pub fn has_weights(&self) -> bool {
        self.raw_weights.is_some()
    }

    fn matrix(&self) -> Option<&[f32]> {
        let raw = self.raw_weights.as_ref()?;
        let decoded = self.weights.get_or_init(|| {
            log::debug!(
                "decoding {}x{} shortcut weights of region {} for {}",
                self.enters.len(),
                self.exits.len(),
                self.region,
                self.mode
            );
            raw.chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect()
        });
        Some(decoded)
    }

    /// Shortest in-region weight from enter `enter` to exit `exit`.
    /// `None` when unreachable, out of range, or weights are absent.
    pub fn weight(&self, enter: u32, exit: u32) -> Option<f64> {
        if enter as usize >= self.enters.len() || exit as usize >= self.exits.len() {
            return None;
        }
        let w = *self.matrix()?.get(enter as usize * self.exits.len() + exit as usize)?;
        w.is_finite().then_some(w as f64)
    }

    /// Shortcut neighbours of `s`: the reachable exits when `outgoing` and
    /// `s` is an enter, the enters reaching it when incoming and `s` is an
    /// exit.
    pub fn shortcut_edges(&self, s: Segment, outgoing: bool, out: &mut Vec<(Segment, f64)>) {
        if outgoing {
            let Some(e) = self.enter_index(s) else { return };
            for (x, &exit) in self.exits.iter().enumerate() {
                if let Some(w) = self.weight(e, x as u32) {
                    out.push((exit, w));
                }
            }
        } else {
            let Some(x) = self.exit_index(s) else { return };
            for (e, &enter) in self.enters.iter().enumerate() {
                if let Some(w) = self.weight(e as u32, x) {
                    out.push((enter, w));
                }
            }
        }
    }

    pub(crate) fn raw_weights(&self) -> Option<&[u8]> {
        self.raw_weights.as_deref()
    }
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("region", &self.region)
            .field("mode", &self.mode)
            .field("enters", &self.enters.len())
            .field("exits", &self.exits.len())
            .field("has_weights", &self.has_weights())
            .finish()
    }
}
