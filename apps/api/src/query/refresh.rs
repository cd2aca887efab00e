use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation counter guarding one stream of background refreshes.
///
/// Every refresh takes a ticket before it starts. Only the holder of the most
/// recent ticket may commit its result; anything older has been superseded and
/// is dropped, regardless of the order in which the fetches resolve.
#[derive(Debug, Clone, Default)]
pub struct RefreshGuard {
    latest: Arc<AtomicU64>,
}

/// Proof that a refresh was started, carrying its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl RefreshGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a refresh. Supersedes every ticket handed out before.
    pub fn begin(&self) -> RefreshTicket {
        RefreshTicket {
            generation: self.latest.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.generation
    }

    /// Supersedes all outstanding tickets without starting a new refresh.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}
