//! Signal id generation.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU32, Ordering};

/// Monotonic sequence shared by every generator that should not hand out
/// duplicate ids. Share it through `Arc`.
#[derive(Debug)]
pub struct SignalIdSequence {
    next: AtomicU32,
}

impl Default for SignalIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalIdSequence {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u32) -> Self {
        Self {
            next: AtomicU32::new(first),
        }
    }

    /// `sig_<yyyymmdd>_<seq>` with the sequence zero-padded to three digits.
    pub fn next_id(&self, now: DateTime<Utc>) -> String {
        let seq = self.next.fetch_add(1, Ordering::Relaxed);
        format!("sig_{}_{:03}", now.format("%Y%m%d"), seq)
    }
}
