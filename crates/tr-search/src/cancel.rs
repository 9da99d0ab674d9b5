//! Cooperative cancellation.
//!
//! A search never stops on its own timer.  The caller owns a [`CancelFlag`],
//! hands a clone to the search, and raises it from any thread; the search
//! polls it every `poll_interval` expansions and unwinds with
//! [`SearchOutcome::Cancelled`](crate::SearchOutcome::Cancelled).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag.  Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Checks a [`CancelFlag`] once every `interval` calls to [`poll`](Self::poll).
///
/// The very first call polls, so a flag raised before the search starts is
/// seen before any vertex is expanded.
pub(crate) struct Poller<'a> {
    flag:     &'a CancelFlag,
    interval: u32,
    count:    u32,
}

impl<'a> Poller<'a> {
    pub(crate) fn new(flag: &'a CancelFlag, interval: u32) -> Self {
        Self { flag, interval: interval.max(1), count: 0 }
    }

    /// `true` when the search must stop.
    #[inline]
    pub(crate) fn poll(&mut self) -> bool {
        let due = self.count % self.interval == 0;
        self.count = self.count.wrapping_add(1);
        due && self.flag.is_cancelled()
    }
}
