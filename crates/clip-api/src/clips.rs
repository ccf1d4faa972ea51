// Clip endpoints: flush the ring buffer to disk and list saved clips.

use crate::client::DaemonClient;
use crate::error::Error;
use crate::models::{ClipInfo, ClipResponse};

impl DaemonClient {
    /// Write the current ring buffer contents to a new clip file.
    ///
    /// `POST /clip`
    pub async fn save_clip(&self) -> Result<ClipResponse, Error> {
        self.post_empty("/clip").await
    }

    /// List clips in the daemon's output directory.
    ///
    /// `GET /clips`
    pub async fn list_clips(&self) -> Result<Vec<ClipInfo>, Error> {
        self.get("/clips").await
    }
}
