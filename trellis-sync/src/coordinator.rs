//! The synchronization coordinator.

use crate::collection::SyncObject;
use crate::cursor::{SyncCursor, SyncPage, VersionTransition};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::debug;
use trellis_client::{ClientError, ClientResult, Request, Requestor, Response};
use trellis_types::Muid;

/// Pagination/version metadata attached to pull responses.
#[derive(Debug, Deserialize)]
struct PullMetadata {
    model_version: u64,
    total: Option<u64>,
    has_more: Option<bool>,
    next_offset: Option<u64>,
}

/// Version metadata attached to push responses.
#[derive(Debug, Deserialize)]
struct PushMetadata {
    old_model_version: u64,
    model_version: u64,
}

/// Issues push and pull operations against entity collections.
///
/// Stateless between calls: the server keeps the per-collection monotonic
/// version counter, the caller keeps the cursor, and this type keeps
/// nothing but the requestor.
pub struct SyncCoordinator {
    pub(crate) requestor: Arc<dyn Requestor>,
}

impl SyncCoordinator {
    /// Creates a coordinator over the shared requestor.
    pub fn new(requestor: Arc<dyn Requestor>) -> Self {
        Self { requestor }
    }

    /// Pushes a batch of entities as one atomic write.
    ///
    /// The server applies the whole batch and advances the collection's
    /// model version by exactly one, whatever the batch size. An empty
    /// batch is a caller error and never reaches the network.
    pub async fn push<T: SyncObject>(&self, items: &[T]) -> ClientResult<VersionTransition> {
        if items.is_empty() {
            return Err(ClientError::InvalidArgument(format!(
                "cannot push an empty {} batch",
                T::COLLECTION.name
            )));
        }

        debug!(
            collection = T::COLLECTION.name,
            count = items.len(),
            "pushing batch"
        );

        let response = self
            .requestor
            .request(
                Request::post(T::COLLECTION.push_path())
                    .body(json!({ "data": serde_json::to_value(items)? })),
            )
            .await?;

        let meta: PushMetadata = metadata(&response)?;
        if meta.model_version != meta.old_model_version + 1 {
            return Err(ClientError::Protocol(format!(
                "push must advance the model version by exactly one, got {} -> {}",
                meta.old_model_version, meta.model_version
            )));
        }
        Ok(VersionTransition {
            old_model_version: meta.old_model_version,
            new_model_version: meta.model_version,
        })
    }

    /// Pulls one page of changes.
    ///
    /// Without `last_model_version` the server returns the full current
    /// snapshot of the collection; with it, only entities changed strictly
    /// after that version — the delta window is open on the cursor side, so
    /// pulling at the version a push just produced yields an empty page.
    pub async fn pull<T: SyncObject>(&self, cursor: SyncCursor) -> ClientResult<SyncPage<T>> {
        let mut request = Request::get(T::COLLECTION.pull_path);
        if let Some(version) = cursor.last_model_version {
            request = request.query("last_model_version", version);
        }
        if let Some(offset) = cursor.offset {
            request = request.query("offset", offset);
        }

        let response = self.requestor.request(request).await?;

        let items = response
            .data_array()
            .map(|values| {
                values
                    .iter()
                    .map(|value| serde_json::from_value(value.clone()))
                    .collect::<Result<Vec<T>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        let meta: PullMetadata = metadata(&response)?;
        let has_more = meta.has_more.unwrap_or(false);
        let next_offset = match (has_more, meta.next_offset) {
            (false, _) => None,
            (true, Some(offset)) => Some(offset),
            (true, None) => {
                return Err(ClientError::Protocol(
                    "server reported more pages without a next offset".to_string(),
                ));
            }
        };

        debug!(
            collection = T::COLLECTION.name,
            items = items.len(),
            model_version = meta.model_version,
            has_more,
            "pulled page"
        );

        Ok(SyncPage {
            items,
            model_version: meta.model_version,
            total: meta.total,
            has_more,
            next_offset,
        })
    }

    /// Fetches one entity by identifier, bypassing the version and
    /// pagination machinery. Returns `None` when it does not exist.
    pub async fn get<T: SyncObject>(&self, muid: &Muid) -> ClientResult<Option<T>> {
        let result = self
            .requestor
            .request(Request::get(T::COLLECTION.item_path(muid)))
            .await;
        let response = match result {
            Ok(response) => response,
            Err(ClientError::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };
        let item = response
            .data_object(T::COLLECTION.item_key)
            .cloned()
            .ok_or_else(missing_payload::<T>)?;
        Ok(Some(serde_json::from_value(item)?))
    }

    /// Creates a single entity and returns the server-stamped result.
    pub async fn create<T: SyncObject>(&self, item: &T) -> ClientResult<T> {
        let mut body = Map::new();
        body.insert(
            T::COLLECTION.item_key.to_string(),
            serde_json::to_value(item)?,
        );
        let response = self
            .requestor
            .request(Request::post(T::COLLECTION.base_path).body(Value::Object(body)))
            .await?;
        let created = response
            .data_object(T::COLLECTION.item_key)
            .cloned()
            .ok_or_else(missing_payload::<T>)?;
        Ok(serde_json::from_value(created)?)
    }
}

fn metadata<M: serde::de::DeserializeOwned>(response: &Response) -> ClientResult<M> {
    let value = response.metadata().cloned().ok_or_else(|| {
        ClientError::Protocol("response is missing the metadata envelope".to_string())
    })?;
    Ok(serde_json::from_value(value)?)
}

fn missing_payload<T: SyncObject>() -> ClientError {
    ClientError::Protocol(format!(
        "response is missing the {} payload",
        T::COLLECTION.item_key
    ))
}
