//! Search observer for diagnostics and tests.

/// Callbacks invoked by [`Search`](crate::Search) as it runs.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SearchObserver<V> {
    /// A vertex was settled.  `forward` is `false` for the backward frontier
    /// of a bidirectional search.
    fn on_settle(&mut self, _vertex: &V, _forward: bool) {}

    /// The two frontiers of a bidirectional search met at `vertex` and the
    /// joined path became the best known one.
    fn on_meet(&mut self, _vertex: &V) {}

    /// Called once when the search reaches a terminal state.  `settled` is the
    /// total number of vertices settled in both directions.
    fn on_finish(&mut self, _settled: usize) {}
}

/// A [`SearchObserver`] that does nothing.
pub struct NoopObserver;

impl<V> SearchObserver<V> for NoopObserver {}
