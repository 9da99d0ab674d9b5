//! Bidirectional A* with averaged potentials.
//!
//! Both frontiers run A* on reduced weights.  With a consistent heuristic
//! `h`, the forward potential `p_f(v) = (h(v, finish) - h(start, v)) / 2` and
//! the backward potential `p_r = -p_f` keep every reduced weight
//! non-negative, and reduced path lengths differ from real ones by the same
//! constant in both directions.  That makes the classic stopping rule valid:
//! once `top_f + top_r >= best` no unexplored meeting point can improve on
//! the best joined path.

use rustc_hash::FxHashMap;

use crate::astar::unwind;
use crate::cancel::Poller;
use crate::queue::{Entry, MinQueue};
use crate::{Graph, Path, Search, SearchOutcome, Weight};

#[derive(Copy, Clone)]
struct Label<W> {
    /// Sum of reduced weights from this frontier's source.
    reduced: W,
    /// Sum of real weights from this frontier's source.
    real: W,
}

struct Frontier<V, W> {
    forward:  bool,
    queue:    MinQueue<V, W>,
    labels:   FxHashMap<V, Label<W>>,
    parent:   FxHashMap<V, V>,
}

impl<V: Copy + Eq + std::hash::Hash, W: Weight> Frontier<V, W> {
    fn new(forward: bool, source: V) -> Self {
        let mut f = Self {
            forward,
            queue:  MinQueue::new(),
            labels: FxHashMap::default(),
            parent: FxHashMap::default(),
        };
        f.labels.insert(source, Label { reduced: W::zero(), real: W::zero() });
        f.queue.push(Entry { key: W::zero(), vertex: source });
        f
    }

    /// Smallest live key, discarding stale heap entries.
    fn top(&mut self) -> Option<W> {
        while let Some(e) = self.queue.peek() {
            match self.labels.get(&e.vertex) {
                Some(l) if !(e.key > l.reduced) => return Some(e.key),
                _ => {
                    self.queue.pop();
                }
            }
        }
        None
    }
}

struct Best<V, W> {
    reduced: W,
    real:    W,
    meet:    V,
}

impl<G: Graph> Search<'_, G> {
    /// Bidirectional A* from `start` to `finish`.
    ///
    /// The backward frontier walks ingoing edges (`Graph::edges(v, false)`).
    pub fn bidirectional(
        &mut self,
        start: G::Vertex,
        finish: G::Vertex,
    ) -> Result<SearchOutcome<G::Vertex, G::Weight>, G::Error> {
        let graph = self.graph;
        let cancel = self.cancel.clone();
        let mut poller = Poller::new(&cancel, self.poll_interval);

        if start == finish {
            if poller.poll() {
                return Ok(SearchOutcome::Cancelled);
            }
            return Ok(SearchOutcome::Found(Path { vertices: vec![start], weight: G::Weight::zero() }));
        }

        let potential = |v: &G::Vertex, forward: bool| -> G::Weight {
            let pf = (graph.heuristic(v, &finish) - graph.heuristic(&start, v)).half();
            if forward { pf } else { G::Weight::zero() - pf }
        };

        let mut fwd: Frontier<G::Vertex, G::Weight> = Frontier::new(true, start);
        let mut bwd: Frontier<G::Vertex, G::Weight> = Frontier::new(false, finish);
        let mut best: Option<Best<G::Vertex, G::Weight>> = None;
        let mut edges = Vec::new();
        let mut settled = 0usize;

        loop {
            let (Some(top_f), Some(top_b)) = (fwd.top(), bwd.top()) else { break };
            if best.as_ref().is_some_and(|b| !(top_f + top_b < b.reduced)) {
                break;
            }
            if poller.poll() {
                self.notify_finish(settled);
                return Ok(SearchOutcome::Cancelled);
            }

            let (cur, nxt) = if top_f <= top_b { (&mut fwd, &bwd) } else { (&mut bwd, &fwd) };
            let Some(Entry { vertex: u, .. }) = cur.queue.pop() else { break };
            let Some(&lu) = cur.labels.get(&u) else { continue };

            settled += 1;
            self.notify_settle(&u, cur.forward);

            let pu = potential(&u, cur.forward);
            edges.clear();
            graph.edges(&u, cur.forward, &mut edges)?;
            for e in edges.drain(..) {
                let v = e.target;
                let real = lu.real + e.weight;
                if !self.length_ok(&real) {
                    continue;
                }
                let reduced = lu.reduced + (e.weight + potential(&v, cur.forward) - pu).clamp_non_negative();
                if cur.labels.get(&v).is_some_and(|l| !(reduced < l.reduced)) {
                    continue;
                }
                cur.labels.insert(v, Label { reduced, real });
                cur.parent.insert(v, u);
                cur.queue.push(Entry { key: reduced, vertex: v });

                let Some(other) = nxt.labels.get(&v) else { continue };
                let total_reduced = reduced + other.reduced;
                let total_real = real + other.real;
                let improves = best.as_ref().is_none_or(|b| total_reduced < b.reduced);
                if improves && self.length_ok(&total_real) {
                    best = Some(Best { reduced: total_reduced, real: total_real, meet: v });
                    self.notify_meet(&v);
                }
            }
        }

        self.notify_finish(settled);
        log::trace!("bidirectional search settled {settled} vertices");

        let Some(best) = best else { return Ok(SearchOutcome::NoPath) };

        let mut vertices = unwind(&fwd.parent, best.meet);
        let mut cur = best.meet;
        while let Some(&next) = bwd.parent.get(&cur) {
            vertices.push(next);
            cur = next;
        }
        debug_assert_eq!(vertices.first(), Some(&start));
        debug_assert_eq!(vertices.last(), Some(&finish));

        Ok(SearchOutcome::Found(Path { vertices, weight: best.real }))
    }
}
