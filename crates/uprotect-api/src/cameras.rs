// Camera endpoints
//
// Snapshot and thumbnail fetches (JPEG bytes, access-key gated) plus the
// two settings PATCHes the integration needs: recording mode and IR mode.

use bytes::Bytes;
use serde_json::json;
use tracing::debug;

use crate::client::ProtectClient;
use crate::error::Error;

impl ProtectClient {
    /// Fetch a live JPEG snapshot from a camera.
    ///
    /// `GET /api/cameras/{id}/snapshot?accessKey=...&ts=...`
    ///
    /// The access key is fetched (or refreshed) automatically. The `ts`
    /// parameter busts the NVR's snapshot cache.
    pub async fn get_snapshot_image(&self, camera_id: &str) -> Result<Bytes, Error> {
        let access_key = self.ensure_access_key().await?;
        let mut url = self.api_url(&format!("cameras/{camera_id}/snapshot"));
        url.query_pairs_mut()
            .append_pair("accessKey", &access_key)
            .append_pair("ts", &chrono::Utc::now().timestamp_millis().to_string());

        debug!(camera_id, "fetching snapshot");
        self.get_bytes(url).await
    }

    /// Fetch an event thumbnail by thumbnail id.
    ///
    /// `GET /api/thumbnails/{id}?accessKey=...&w=...&h=...`
    ///
    /// Height is derived from the requested width at 16:9.
    pub async fn get_thumbnail(&self, thumbnail_id: &str, width: u32) -> Result<Bytes, Error> {
        let access_key = self.ensure_access_key().await?;
        let height = width * 9 / 16;
        let mut url = self.api_url(&format!("thumbnails/{thumbnail_id}"));
        url.query_pairs_mut()
            .append_pair("accessKey", &access_key)
            .append_pair("w", &width.to_string())
            .append_pair("h", &height.to_string());

        debug!(thumbnail_id, width, "fetching thumbnail");
        self.get_bytes(url).await
    }

    /// Change a camera's recording mode.
    ///
    /// `PATCH /api/cameras/{id}` with a `recordingSettings` body. The
    /// padding and trigger fields ride along because older firmware
    /// rejects a bare `mode` patch.
    pub async fn set_recording_mode(&self, camera_id: &str, mode: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("cameras/{camera_id}"));
        debug!(camera_id, mode, "setting recording mode");
        self.patch_json(
            url,
            &json!({
                "recordingSettings": {
                    "mode": mode,
                    "prePaddingSecs": 2,
                    "postPaddingSecs": 2,
                    "minMotionEventTrigger": 1000,
                    "enablePirTimelapse": false,
                },
            }),
        )
        .await
    }

    /// Change a camera's infrared LED mode.
    ///
    /// `PATCH /api/cameras/{id}` with an `ispSettings` body.
    pub async fn set_ir_mode(&self, camera_id: &str, mode: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("cameras/{camera_id}"));
        debug!(camera_id, mode, "setting IR mode");
        self.patch_json(
            url,
            &json!({
                "ispSettings": {
                    "irLedMode": mode,
                },
            }),
        )
        .await
    }
}
