//! Round-robin cursor.

use std::sync::{Mutex, PoisonError};

/// Per-hostname rotation index.
///
/// Invariant: `0 <= cursor < len` for the pool it rotates over. The lock is
/// held only to read and advance the index.
#[derive(Debug, Default)]
pub struct RoundRobinCursor {
    cursor: Mutex<usize>,
}

impl RoundRobinCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current index and advance it modulo `len`.
    ///
    /// `len` must be non-zero.
    pub fn advance(&self, len: usize) -> usize {
        debug_assert!(len > 0);
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let current = *cursor % len;
        *cursor = (current + 1) % len;
        current
    }

    /// Peek at the next index without advancing.
    pub fn position(&self) -> usize {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
