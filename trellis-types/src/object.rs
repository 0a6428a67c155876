//! Object-graph entities in their wire form.
//!
//! Field names match the server's JSON representation. Every field is
//! optional because partially populated values are legal on both sides of a
//! push: the caller may assign only a MUID, and the server stamps
//! identifiers, timestamps and ownership on creation. Entities are immutable
//! once fetched except through explicit push operations.

use crate::Muid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visibility / lifecycle state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectState {
    /// Normal, visible entity.
    Visible,
    /// Hidden from default listings but not deleted.
    Hidden,
    /// Soft-deleted.
    Trashed,
}

/// A space — the node type of the object graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Space {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muid: Option<Muid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ObjectState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_identifier: Option<String>,
    /// Media items representing this space's content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representations: Option<Vec<Media>>,
}

/// A media item attached to a space.
///
/// Only the metadata travels through the sync protocol; binary payload
/// transfer is a separate concern handled outside this core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Media {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muid: Option<Muid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ObjectState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// A directed link between two spaces — the edge type of the object graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muid: Option<Muid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ObjectState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_space_muid: Option<Muid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_space_muid: Option<Muid>,
}
