//! Cursor and page types for incremental synchronization.

use serde::{Deserialize, Serialize};

/// Caller-owned position in a collection's version history.
///
/// The coordinator never stores cursors; callers persist whichever cursor
/// suits their consumption pace and supply it on every pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCursor {
    /// Model version the caller has fully integrated. Absent means the next
    /// pull returns the full current snapshot.
    pub last_model_version: Option<u64>,
    /// Pagination offset to resume from.
    pub offset: Option<u64>,
}

impl SyncCursor {
    /// Cursor requesting a full snapshot from the beginning.
    pub fn initial() -> Self {
        Self::default()
    }

    /// Cursor requesting changes strictly newer than `version`.
    pub fn after(version: u64) -> Self {
        Self {
            last_model_version: Some(version),
            offset: None,
        }
    }

    /// Same cursor with a pagination offset.
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// One page of pull results.
///
/// Pagination fields are mutually consistent: `has_more == false` implies
/// `next_offset == None`, and `total` counts matches across all pages, not
/// just this one.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPage<T> {
    /// Entities in server order.
    pub items: Vec<T>,
    /// The collection's model version at the time of the query.
    pub model_version: u64,
    /// Count of items matching the query across all pages.
    pub total: Option<u64>,
    /// Whether further pages exist.
    pub has_more: bool,
    /// Offset to resume from; always `None` on the final page.
    pub next_offset: Option<u64>,
}

/// Version movement reported by a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionTransition {
    /// Collection version before the batch was applied.
    pub old_model_version: u64,
    /// Version after — always exactly one ahead for an accepted batch.
    pub new_model_version: u64,
}
