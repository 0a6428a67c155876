//! Collection descriptors and the [`SyncObject`] trait.
//!
//! One generic coordinator serves every collection; the descriptor is what
//! varies per entity type, so adding a collection means implementing
//! `SyncObject` rather than hand-copying push/pull methods.

use serde::Serialize;
use serde::de::DeserializeOwned;
use trellis_types::{Link, Media, Muid, Space};

/// Wire-level description of one entity collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionDescriptor {
    /// Collection name, used in logs and error messages.
    pub name: &'static str,
    /// Path prefix for item-level and batch operations.
    pub base_path: &'static str,
    /// Path of the account-scoped pull endpoint.
    pub pull_path: &'static str,
    /// Envelope key wrapping a single item in get/create responses.
    pub item_key: &'static str,
}

impl CollectionDescriptor {
    /// Path of the atomic batch-write endpoint.
    pub fn push_path(&self) -> String {
        format!("{}/batched", self.base_path)
    }

    /// Path addressing a single item.
    pub fn item_path(&self, muid: &Muid) -> String {
        format!("{}/{}", self.base_path, muid)
    }
}

/// An entity type that participates in push/pull synchronization.
pub trait SyncObject: Serialize + DeserializeOwned + Send + Sync {
    /// The collection this entity type belongs to.
    const COLLECTION: CollectionDescriptor;

    /// The entity's unique identifier, when assigned.
    fn muid(&self) -> Option<&Muid>;
}

impl SyncObject for Space {
    const COLLECTION: CollectionDescriptor = CollectionDescriptor {
        name: "spaces",
        base_path: "spaces",
        pull_path: "users/self/spaces",
        item_key: "space",
    };

    fn muid(&self) -> Option<&Muid> {
        self.muid.as_ref()
    }
}

impl SyncObject for Media {
    const COLLECTION: CollectionDescriptor = CollectionDescriptor {
        name: "media",
        base_path: "media",
        pull_path: "users/self/media",
        item_key: "media",
    };

    fn muid(&self) -> Option<&Muid> {
        self.muid.as_ref()
    }
}

impl SyncObject for Link {
    const COLLECTION: CollectionDescriptor = CollectionDescriptor {
        name: "links",
        base_path: "links",
        pull_path: "users/self/links",
        item_key: "link",
    };

    fn muid(&self) -> Option<&Muid> {
        self.muid.as_ref()
    }
}
