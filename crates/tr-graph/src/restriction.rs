//! Turn restrictions and their compilation into graph edits.
//!
//! # Pipeline
//!
//! 1. **Validate.**  Records with fewer than two features or a feature
//!    repeated back to back are dropped with a warning; records naming
//!    features the region does not have are stale and dropped quietly.
//! 2. **Desugar.**  Every `Only(f0..fn)` becomes, for each joint where
//!    `f(n-1)` meets `fn`, one `No(f0..f(n-1), X)` per other feature `X` at
//!    that joint.  `X == f(n-1)` is a turn back onto the same road: a
//!    [`RestrictionUTurn`] for two-feature records, an in-context u-turn ban
//!    for via-way records.
//! 3. **Canonicalise.**  Sort and de-duplicate, so the result does not depend
//!    on input order.
//! 4. **Lower.**  Two-feature bans and u-turn bans become a set of forbidden
//!    `(segment, segment)` adjacencies.  Longer (via-way) bans become banned
//!    feature sequences, realised by the region graph as restriction-scoped
//!    vertex clones.
//!
//! Nothing here fails: bad data only ever shrinks the restriction set.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use tr_core::{FeatureId, Segment};

use crate::joints::Topology;

// ── Input records ─────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RestrictionKind {
    /// The sequence must not be driven.
    No,
    /// After `f0..f(n-1)`, `fn` is the only way on.
    Only,
}

/// A turn restriction over a sequence of features.  Two features is the
/// common case; longer sequences have full roads as their "via" element.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Restriction {
    pub kind: RestrictionKind,
    pub features: Vec<FeatureId>,
}

impl Restriction {
    pub fn new(kind: RestrictionKind, features: impl IntoIterator<Item = FeatureId>) -> Self {
        Self { kind, features: features.into_iter().collect() }
    }

    pub fn no(features: impl IntoIterator<Item = FeatureId>) -> Self {
        Self::new(RestrictionKind::No, features)
    }

    pub fn only(features: impl IntoIterator<Item = FeatureId>) -> Self {
        Self::new(RestrictionKind::Only, features)
    }
}

/// Bans an immediate reversal on `feature` at one of its endpoints.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestrictionUTurn {
    pub feature: FeatureId,
    /// `true`: at point 0; `false`: at the last point.
    pub via_is_first_point: bool,
}

/// Everything restricting one region.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RestrictionSet {
    pub restrictions: Vec<Restriction>,
    pub uturns: Vec<RestrictionUTurn>,
}

impl RestrictionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, r: Restriction) -> Self {
        self.restrictions.push(r);
        self
    }

    pub fn with_uturn(mut self, u: RestrictionUTurn) -> Self {
        self.uturns.push(u);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty() && self.uturns.is_empty()
    }
}

// ── Compiled form ─────────────────────────────────────────────────────────────

/// Result of compiling a [`RestrictionSet`] against one region's roads.
#[derive(Debug, Default)]
pub(crate) struct Compiled {
    /// Forbidden real adjacencies `(from, to)`.
    pub banned_pairs: FxHashSet<(Segment, Segment)>,
    /// Banned via-way sequences (three features or more).
    pub banned_sequences: FxHashSet<Vec<FeatureId>>,
    /// Proper prefixes (two features or more) of banned sequences, sorted.
    pub contexts: BTreeSet<Vec<FeatureId>>,
}

pub(crate) fn compile(topo: &Topology<'_>, set: &RestrictionSet) -> Compiled {
    let (mut nos, mut uturns) = desugar(topo, set);
    nos.sort_unstable();
    nos.dedup();
    uturns.sort_unstable();
    uturns.dedup();

    let mut out = Compiled::default();

    for seq in nos {
        if seq.len() == 2 {
            ban_turn(topo, seq[0], seq[1], &mut out.banned_pairs);
            continue;
        }
        let adjacent = seq
            .windows(2)
            .all(|w| w[0] == w[1] || !topo.meeting(w[0], w[1]).is_empty());
        if !adjacent {
            log::debug!("region {}: via-way restriction {seq:?} is not connected, ignored", topo.region);
            continue;
        }
        for k in 2..seq.len() {
            out.contexts.insert(seq[..k].to_vec());
        }
        out.banned_sequences.insert(seq);
    }

    for u in uturns {
        ban_uturn(topo, u, &mut out.banned_pairs);
    }

    out
}

/// Validate and desugar into plain `No` sequences and u-turn bans.
fn desugar(topo: &Topology<'_>, set: &RestrictionSet) -> (Vec<Vec<FeatureId>>, Vec<RestrictionUTurn>) {
    let mut nos = Vec::new();
    let mut uturns = Vec::new();

    for r in &set.restrictions {
        let f = &r.features;
        if f.len() < 2 {
            log::warn!("region {}: dropping {:?} restriction with {} feature(s)", topo.region, r.kind, f.len());
            continue;
        }
        if f.windows(2).any(|w| w[0] == w[1]) {
            log::warn!("region {}: dropping self-referencing restriction {f:?}", topo.region);
            continue;
        }
        if let Some(missing) = f.iter().find(|id| !topo.roads.contains_key(id)) {
            log::debug!("region {}: restriction {f:?} names unknown feature {missing}, ignored", topo.region);
            continue;
        }

        match r.kind {
            RestrictionKind::No => nos.push(f.clone()),
            RestrictionKind::Only => {
                let n = f.len() - 1;
                let (prev, last) = (f[n - 1], f[n]);
                let meetings = topo.meeting(prev, last);
                if meetings.is_empty() {
                    log::debug!("region {}: only-restriction {f:?} is not connected, ignored", topo.region);
                }
                for (joint, end) in meetings {
                    let mut others: Vec<FeatureId> = topo
                        .joints
                        .get(joint)
                        .members
                        .iter()
                        .map(|m| m.feature)
                        .filter(|&x| x != last)
                        .collect();
                    others.dedup();
                    for x in others {
                        if x == prev && n == 1 {
                            uturns.push(RestrictionUTurn { feature: prev, via_is_first_point: end.point_idx == 0 });
                        } else {
                            let mut seq = f[..n].to_vec();
                            seq.push(x);
                            nos.push(seq);
                        }
                    }
                }
            }
        }
    }

    for u in &set.uturns {
        if topo.roads.contains_key(&u.feature) {
            uturns.push(*u);
        } else {
            log::debug!("region {}: u-turn ban on unknown feature {}, ignored", topo.region, u.feature);
        }
    }

    (nos, uturns)
}

fn ban_turn(topo: &Topology<'_>, from: FeatureId, to: FeatureId, banned: &mut FxHashSet<(Segment, Segment)>) {
    let meetings = topo.meeting(from, to);
    if meetings.is_empty() {
        log::debug!("region {}: restriction {from} -> {to} is not connected, ignored", topo.region);
        return;
    }
    for (joint, end) in meetings {
        let targets: Vec<Segment> = topo
            .joints
            .get(joint)
            .members
            .iter()
            .filter(|m| m.feature == to)
            .flat_map(|&m| topo.leaving(m))
            .collect();
        for s in topo.arriving(end) {
            for &t in &targets {
                banned.insert((s, t));
            }
        }
    }
}

fn ban_uturn(topo: &Topology<'_>, u: RestrictionUTurn, banned: &mut FxHashSet<(Segment, Segment)>) {
    let Some(road) = topo.roads.get(&u.feature) else { return };
    let idx = if u.via_is_first_point { 0 } else { road.last_point_idx() };
    let end = tr_core::RoadPoint::new(u.feature, idx);
    let mut applied = false;
    for s in topo.arriving(end) {
        let back = s.reversed();
        if topo.leaving(end).contains(&back) {
            banned.insert((s, back));
            applied = true;
        }
    }
    if !applied {
        log::debug!("region {}: u-turn ban on one-way {} has no effect", topo.region, u.feature);
    }
}
