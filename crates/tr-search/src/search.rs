//! Search configuration and results.

use crate::{CancelFlag, Graph, SearchObserver};

/// Default number of expansions between two cancellation polls.
pub const DEFAULT_POLL_INTERVAL: u32 = 128;

// ── Results ───────────────────────────────────────────────────────────────────

/// A found path: vertices from start to finish inclusive, and its weight.
#[derive(Clone, Debug, PartialEq)]
pub struct Path<V, W> {
    pub vertices: Vec<V>,
    pub weight: W,
}

/// Terminal state of a point-to-point search.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome<V, W> {
    Found(Path<V, W>),
    /// Every reachable vertex was settled without reaching the target.
    NoPath,
    /// The [`CancelFlag`] was raised.
    Cancelled,
}

impl<V, W> SearchOutcome<V, W> {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }

    pub fn found(self) -> Option<Path<V, W>> {
        match self {
            SearchOutcome::Found(p) => Some(p),
            _ => None,
        }
    }
}

/// What a wave visitor wants after seeing a settled vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaveControl {
    Continue,
    /// Do not expand this vertex, keep going elsewhere.
    Prune,
    /// End the wave now.
    Stop,
}

/// Terminal state of a one-to-many wave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WaveOutcome {
    /// Every reachable vertex was settled.
    Exhausted,
    /// The visitor returned [`WaveControl::Stop`].
    Stopped,
    Cancelled,
}

// ── Search builder ────────────────────────────────────────────────────────────

/// Per-run search configuration over a borrowed graph.
///
/// ```ignore
/// let outcome = Search::new(&graph)
///     .with_cancel(flag.clone())
///     .poll_every(64)
///     .with_length_check(|w| w.pass_through_changes <= 2)
///     .bidirectional(start, finish)?;
/// ```
pub struct Search<'a, G: Graph> {
    pub(crate) graph: &'a G,
    pub(crate) cancel: CancelFlag,
    pub(crate) poll_interval: u32,
    pub(crate) length_check: Option<Box<dyn Fn(&G::Weight) -> bool + 'a>>,
    pub(crate) observer: Option<&'a mut dyn SearchObserver<G::Vertex>>,
}

impl<'a, G: Graph> Search<'a, G> {
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            cancel: CancelFlag::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            length_check: None,
            observer: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Poll the cancellation flag every `n` expansions (`0` is treated as `1`).
    pub fn poll_every(mut self, n: u32) -> Self {
        self.poll_interval = n.max(1);
        self
    }

    /// Reject any partial path whose real weight fails `check`.
    ///
    /// Bidirectional searches apply it to each frontier's partial paths and
    /// to every joined start-to-finish candidate.
    pub fn with_length_check(mut self, check: impl Fn(&G::Weight) -> bool + 'a) -> Self {
        self.length_check = Some(Box::new(check));
        self
    }

    pub fn with_observer(mut self, observer: &'a mut dyn SearchObserver<G::Vertex>) -> Self {
        self.observer = Some(observer);
        self
    }

    #[inline]
    pub(crate) fn length_ok(&self, w: &G::Weight) -> bool {
        self.length_check.as_ref().is_none_or(|check| check(w))
    }

    #[inline]
    pub(crate) fn notify_settle(&mut self, v: &G::Vertex, forward: bool) {
        if let Some(obs) = self.observer.as_deref_mut() {
            obs.on_settle(v, forward);
        }
    }

    #[inline]
    pub(crate) fn notify_meet(&mut self, v: &G::Vertex) {
        if let Some(obs) = self.observer.as_deref_mut() {
            obs.on_meet(v);
        }
    }

    #[inline]
    pub(crate) fn notify_finish(&mut self, settled: usize) {
        if let Some(obs) = self.observer.as_deref_mut() {
            obs.on_finish(settled);
        }
    }
}
