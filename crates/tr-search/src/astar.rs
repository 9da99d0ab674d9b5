//! One-directional A* and the one-to-many wave.

use rustc_hash::FxHashMap;

use crate::cancel::Poller;
use crate::queue::{Entry, MinQueue};
use crate::{Graph, Path, Search, SearchOutcome, WaveControl, WaveOutcome, Weight};

impl<G: Graph> Search<'_, G> {
    /// A* from `start` to `finish` following outgoing edges.
    ///
    /// Uses [`Graph::heuristic`] towards `finish`; with the default zero
    /// heuristic this is plain Dijkstra.
    pub fn find_path(
        &mut self,
        start: G::Vertex,
        finish: G::Vertex,
    ) -> Result<SearchOutcome<G::Vertex, G::Weight>, G::Error> {
        let graph = self.graph;
        let cancel = self.cancel.clone();
        let mut poller = Poller::new(&cancel, self.poll_interval);

        let mut dist: FxHashMap<G::Vertex, G::Weight> = FxHashMap::default();
        let mut parent: FxHashMap<G::Vertex, G::Vertex> = FxHashMap::default();
        let mut queue: MinQueue<G::Vertex, G::Weight> = MinQueue::new();
        let mut edges = Vec::new();
        let mut settled = 0usize;

        dist.insert(start, G::Weight::zero());
        queue.push(Entry { key: graph.heuristic(&start, &finish), vertex: start });

        while let Some(Entry { key, vertex }) = queue.pop() {
            let Some(&d) = dist.get(&vertex) else { continue };
            if key > d + graph.heuristic(&vertex, &finish) {
                continue; // stale
            }
            if poller.poll() {
                self.notify_finish(settled);
                return Ok(SearchOutcome::Cancelled);
            }

            settled += 1;
            self.notify_settle(&vertex, true);

            if vertex == finish {
                self.notify_finish(settled);
                log::trace!("a* settled {settled} vertices");
                let vertices = unwind(&parent, vertex);
                return Ok(SearchOutcome::Found(Path { vertices, weight: d }));
            }

            edges.clear();
            graph.edges(&vertex, true, &mut edges)?;
            for e in edges.drain(..) {
                let nd = d + e.weight;
                if !self.length_ok(&nd) {
                    continue;
                }
                if dist.get(&e.target).is_some_and(|old| !(nd < *old)) {
                    continue;
                }
                dist.insert(e.target, nd);
                parent.insert(e.target, vertex);
                queue.push(Entry { key: nd + graph.heuristic(&e.target, &finish), vertex: e.target });
            }
        }

        self.notify_finish(settled);
        Ok(SearchOutcome::NoPath)
    }

    /// Dijkstra wave from `start` over outgoing edges.
    ///
    /// `visit` sees every settled vertex once, in non-decreasing weight
    /// order, and decides whether to expand it.
    pub fn propagate_wave(
        &mut self,
        start: G::Vertex,
        mut visit: impl FnMut(&G::Vertex, &G::Weight) -> WaveControl,
    ) -> Result<WaveOutcome, G::Error> {
        let graph = self.graph;
        let cancel = self.cancel.clone();
        let mut poller = Poller::new(&cancel, self.poll_interval);

        let mut dist: FxHashMap<G::Vertex, G::Weight> = FxHashMap::default();
        let mut queue: MinQueue<G::Vertex, G::Weight> = MinQueue::new();
        let mut edges = Vec::new();
        let mut settled = 0usize;

        dist.insert(start, G::Weight::zero());
        queue.push(Entry { key: G::Weight::zero(), vertex: start });

        while let Some(Entry { key, vertex }) = queue.pop() {
            let Some(&d) = dist.get(&vertex) else { continue };
            if key > d {
                continue;
            }
            if poller.poll() {
                self.notify_finish(settled);
                return Ok(WaveOutcome::Cancelled);
            }

            settled += 1;
            self.notify_settle(&vertex, true);

            match visit(&vertex, &d) {
                WaveControl::Continue => {}
                WaveControl::Prune => continue,
                WaveControl::Stop => {
                    self.notify_finish(settled);
                    return Ok(WaveOutcome::Stopped);
                }
            }

            edges.clear();
            graph.edges(&vertex, true, &mut edges)?;
            for e in edges.drain(..) {
                let nd = d + e.weight;
                if !self.length_ok(&nd) {
                    continue;
                }
                if dist.get(&e.target).is_some_and(|old| !(nd < *old)) {
                    continue;
                }
                dist.insert(e.target, nd);
                queue.push(Entry { key: nd, vertex: e.target });
            }
        }

        self.notify_finish(settled);
        Ok(WaveOutcome::Exhausted)
    }
}

/// Follow `parent` links from `v` back to the root and return root → `v`.
pub(crate) fn unwind<V: Copy + Eq + std::hash::Hash>(parent: &FxHashMap<V, V>, v: V) -> Vec<V> {
    let mut path = vec![v];
    let mut cur = v;
    while let Some(&p) = parent.get(&cur) {
        path.push(p);
        cur = p;
    }
    path.reverse();
    path
}
