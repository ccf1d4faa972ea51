// Persisted settings and live capture configuration endpoints.

use crate::client::DaemonClient;
use crate::error::Error;
use crate::models::{CaptureConfig, UserSettings};

impl DaemonClient {
    /// Read the persisted user settings.
    ///
    /// `GET /settings`
    pub async fn get_settings(&self) -> Result<UserSettings, Error> {
        self.get("/settings").await
    }

    /// Replace the persisted user settings. The daemon validates device
    /// and encoder ids and answers 400 with a message when one is unknown.
    ///
    /// `POST /settings`
    pub async fn update_settings(&self, settings: &UserSettings) -> Result<UserSettings, Error> {
        self.post("/settings", settings).await
    }

    /// Switch the live capture pipeline to a new configuration.
    ///
    /// `POST /config/capture`
    pub async fn set_capture(&self, config: &CaptureConfig) -> Result<(), Error> {
        self.post_no_content("/config/capture", config).await
    }
}
