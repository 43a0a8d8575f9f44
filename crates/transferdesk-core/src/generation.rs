// ── Request generations ──
//
// Every load takes a token before awaiting; its result is applied only if
// no newer load started in the meantime. A slow stale response can then
// never overwrite fresher state.

use std::sync::atomic::{AtomicU64, Ordering};

/// Token identifying one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Monotonic counter issuing [`Generation`] tokens.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    latest: AtomicU64,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token newer than every previous one.
    pub fn begin(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `token` is still the newest issued.
    pub fn is_current(&self, token: Generation) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }
}
