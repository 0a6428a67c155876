//! Secure token persistence seam.
//!
//! The real store is platform-keychain backed and lives outside this crate;
//! the trait captures exactly what the token lifecycle needs from it. Reads
//! can fail transiently — the platform store may be briefly unavailable
//! right after process start — which is why the read result carries a
//! status instead of being a plain `Option`.

/// Outcome status of a store read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// The read completed normally (the value may still be absent).
    Ok,
    /// The store was temporarily unavailable; retrying may succeed.
    TransientFailure,
}

/// Result of reading a key from the secure store.
#[derive(Debug, Clone)]
pub struct StoreRead {
    /// The stored value, if any was readable.
    pub value: Option<String>,
    /// Whether the read itself succeeded.
    pub status: StoreStatus,
}

/// Access policy attached to persisted secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Readable only while the device is unlocked; never leaves the device.
    WhenUnlockedThisDevice,
    /// Readable while the device is unlocked.
    WhenUnlocked,
    /// Readable any time after the first unlock following boot.
    AfterFirstUnlock,
}

/// Durable encrypted key-value persistence for credentials.
///
/// Implementations serialize their own access; callers may invoke these
/// methods from any thread.
pub trait SecureTokenStore: Send + Sync {
    /// Reads a value.
    fn get(&self, key: &str) -> StoreRead;

    /// Writes a value under the given access policy. Returns false when the
    /// write could not be committed.
    fn set(&self, key: &str, value: &str, policy: AccessPolicy) -> bool;

    /// Removes a value. Removing an absent key is not an error.
    fn delete(&self, key: &str);
}

/// In-memory store for tests.
pub mod mock {
    use super::{AccessPolicy, SecureTokenStore, StoreRead, StoreStatus};
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// HashMap-backed store with scriptable failures.
    #[derive(Default)]
    pub struct MemoryTokenStore {
        entries: Mutex<HashMap<String, String>>,
        fail_next_reads: Mutex<u32>,
        fail_writes: Mutex<bool>,
        read_attempts: Mutex<u32>,
    }

    impl MemoryTokenStore {
        /// Creates an empty store.
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates a value.
        pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
            self.entries.lock().insert(key.into(), value.into());
        }

        /// Makes the next `n` reads report a transient failure.
        pub fn fail_next_reads(&self, n: u32) {
            *self.fail_next_reads.lock() = n;
        }

        /// Makes every write fail until cleared.
        pub fn fail_writes(&self, fail: bool) {
            *self.fail_writes.lock() = fail;
        }

        /// Number of reads attempted so far, including failed ones.
        pub fn read_attempts(&self) -> u32 {
            *self.read_attempts.lock()
        }

        /// Returns the stored value, bypassing failure scripting.
        pub fn stored(&self, key: &str) -> Option<String> {
            self.entries.lock().get(key).cloned()
        }
    }

    impl SecureTokenStore for MemoryTokenStore {
        fn get(&self, key: &str) -> StoreRead {
            *self.read_attempts.lock() += 1;
            let mut failures = self.fail_next_reads.lock();
            if *failures > 0 {
                *failures -= 1;
                return StoreRead {
                    value: None,
                    status: StoreStatus::TransientFailure,
                };
            }
            StoreRead {
                value: self.entries.lock().get(key).cloned(),
                status: StoreStatus::Ok,
            }
        }

        fn set(&self, key: &str, value: &str, _policy: AccessPolicy) -> bool {
            if *self.fail_writes.lock() {
                return false;
            }
            self.entries.lock().insert(key.to_string(), value.to_string());
            true
        }

        fn delete(&self, key: &str) {
            self.entries.lock().remove(key);
        }
    }
}
