//! Incremental synchronization for the Trellis client.
//!
//! Collections of server-owned entities (spaces, media, links) converge
//! with server state through a versioned pull/push protocol:
//!
//! 1. **Push**: a non-empty batch is applied atomically; the collection's
//!    model version advances by exactly one per call, whatever the batch
//!    size.
//! 2. **Pull**: a caller-supplied [`SyncCursor`] selects either the full
//!    current snapshot (no version) or a strict delta — entities changed
//!    after the cursor's version — paginated through
//!    `offset`/`next_offset`.
//!
//! The protocol is last-writer-wins over server-assigned monotonic
//! versions; there is no conflict resolution here. The coordinator is
//! stateless between calls — cursor bookkeeping belongs to the caller,
//! which is what lets any number of independent consumers walk the same
//! collection at different paces.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use trellis_client::{HttpConfig, HttpRequestor};
//! use trellis_sync::{SyncCoordinator, SyncCursor};
//! use trellis_types::{Link, Muid};
//!
//! # async fn example() -> trellis_client::ClientResult<()> {
//! let requestor = Arc::new(HttpRequestor::new(HttpConfig::default())?);
//! let sync = SyncCoordinator::new(requestor);
//!
//! let link = Link { muid: Some(Muid::generate()), ..Default::default() };
//! let transition = sync.push(&[link]).await?;
//!
//! // Nothing newer than what we just pushed:
//! let page = sync
//!     .pull::<Link>(SyncCursor::after(transition.new_model_version))
//!     .await?;
//! assert!(page.items.is_empty());
//! # Ok(())
//! # }
//! ```

mod collection;
mod coordinator;
mod cursor;
mod media;

pub use collection::{CollectionDescriptor, SyncObject};
pub use coordinator::SyncCoordinator;
pub use cursor::{SyncCursor, SyncPage, VersionTransition};
