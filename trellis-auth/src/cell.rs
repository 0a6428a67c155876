//! The token cache cell.

use parking_lot::Mutex;
use trellis_types::Token;

/// Thread-safe holder of the cached session token.
///
/// A single lock guards the value. All mutation goes through
/// [`compare_and_set`](TokenCell::compare_and_set), which runs its
/// `on_change` callback while still holding the lock — the owner uses this
/// to emit the change event atomically with the swap. The critical section
/// never performs I/O, so readers never wait on the network or the secure
/// store.
#[derive(Default)]
pub struct TokenCell {
    inner: Mutex<Option<Token>>,
}

impl TokenCell {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the cached token.
    pub fn read(&self) -> Option<Token> {
        self.inner.lock().clone()
    }

    /// Swaps in `next` if it differs from the cached value. When it does,
    /// `on_change` runs with the new value before the lock is released.
    /// Returns whether a swap happened.
    pub fn compare_and_set(
        &self,
        next: Option<Token>,
        on_change: impl FnOnce(Option<&Token>),
    ) -> bool {
        let mut guard = self.inner.lock();
        if *guard == next {
            return false;
        }
        *guard = next;
        on_change(guard.as_ref());
        true
    }

    /// Clears the cached token. `on_change` runs only if a token was
    /// present. Returns whether one was.
    pub fn clear(&self, on_change: impl FnOnce()) -> bool {
        self.compare_and_set(None, |_| on_change())
    }
}
