// Capture device and encoder enumeration endpoints.

use crate::client::DaemonClient;
use crate::error::Error;
use crate::models::{AudioDevice, VideoDevice, VideoEncoder};

impl DaemonClient {
    /// List screens and cameras the daemon can capture from.
    ///
    /// `GET /devices/video`
    pub async fn video_devices(&self) -> Result<Vec<VideoDevice>, Error> {
        self.get("/devices/video").await
    }

    /// List system audio devices (loopback sources and inputs).
    ///
    /// `GET /devices/audio`
    pub async fn audio_devices(&self) -> Result<Vec<AudioDevice>, Error> {
        self.get("/devices/audio").await
    }

    /// List microphone inputs only.
    ///
    /// `GET /devices/microphone`
    pub async fn microphone_devices(&self) -> Result<Vec<AudioDevice>, Error> {
        self.get("/devices/microphone").await
    }

    /// List available video encoders.
    ///
    /// `GET /encoders/video`
    pub async fn video_encoders(&self) -> Result<Vec<VideoEncoder>, Error> {
        self.get("/encoders/video").await
    }
}
