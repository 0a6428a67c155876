//! Media-specific auxiliary operations.

use crate::coordinator::SyncCoordinator;
use trellis_client::{ClientResult, Request};
use trellis_types::Muid;

impl SyncCoordinator {
    /// Confirms that a media item's binary payload finished uploading.
    ///
    /// The payload transfer itself happens outside this core; this call
    /// only flips the server-side state once the upload is done.
    pub async fn mark_media_uploaded(&self, muid: &Muid) -> ClientResult<()> {
        self.requestor
            .request(Request::post(format!("media/{muid}")))
            .await?;
        Ok(())
    }
}
