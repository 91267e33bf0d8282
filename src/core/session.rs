//! The single "currently displayed" analysis, owned by whoever presents it.
//!
//! Reference lookups can finish out of order. Each request takes a [`RequestTicket`] before it
//! starts; when its result arrives it is applied only if no newer request has already applied
//! one, so the display always converges on the most recent analysis.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

use super::graph::ImpactAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket {
    sequence: u64,
}

impl RequestTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[derive(Default)]
struct Displayed {
    sequence: u64,
    analysis: Option<Arc<ImpactAnalysis>>,
}

#[derive(Default)]
pub struct AnalysisSession {
    next_sequence: AtomicU64,
    displayed: RwLock<Displayed>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for a new request. Later tickets supersede earlier ones.
    pub fn begin(&self) -> RequestTicket {
        RequestTicket {
            sequence: self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    /// Replace the displayed analysis unless a newer request already did.
    ///
    /// Returns `false` when the result was stale and has been discarded.
    pub fn apply(&self, ticket: RequestTicket, analysis: ImpactAnalysis) -> bool {
        let mut displayed = self
            .displayed
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if ticket.sequence <= displayed.sequence {
            debug!(
                ticket = ticket.sequence,
                displayed = displayed.sequence,
                "discarding stale analysis"
            );
            return false;
        }
        displayed.sequence = ticket.sequence;
        displayed.analysis = Some(Arc::new(analysis));
        true
    }

    /// Whether `ticket` is still the newest request issued.
    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        self.next_sequence.load(Ordering::SeqCst) == ticket.sequence
    }

    pub fn current(&self) -> Option<Arc<ImpactAnalysis>> {
        self.displayed
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .analysis
            .clone()
    }

    /// Drop the displayed analysis, e.g. when its view is closed.
    pub fn close(&self) {
        let mut displayed = self
            .displayed
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        displayed.analysis = None;
    }
}
