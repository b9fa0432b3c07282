//! Where refreshed camera state comes from.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uprotect_api::ProtectClient;

use crate::convert;
use crate::error::CoreError;
use crate::events;
use crate::model::CameraState;

/// Supplier of one full round of camera state.
///
/// The coordinator polls whatever source it is handed. Production uses
/// [`NvrSource`]; tests substitute scripted implementations.
#[async_trait]
pub trait CameraSource: Send + Sync {
    async fn poll_cameras(&self) -> Result<Vec<CameraState>, CoreError>;
}

/// [`CameraSource`] backed by a live NVR.
///
/// One poll is a bootstrap fetch (camera inventory and settings) plus a
/// query over the trailing event window so in-progress motion and recent
/// rings are reflected in the returned records.
pub struct NvrSource {
    client: Arc<ProtectClient>,
}

impl NvrSource {
    #[must_use]
    pub fn new(client: Arc<ProtectClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CameraSource for NvrSource {
    async fn poll_cameras(&self) -> Result<Vec<CameraState>, CoreError> {
        let bootstrap = self.client.bootstrap().await?;
        let now = Utc::now();
        let mut cameras =
            convert::cameras_from_bootstrap(&bootstrap, self.client.base_url().host_str());

        let (start, end) = events::event_window(now);
        let recent = self.client.list_events(start, end).await?;
        events::apply_events(&mut cameras, &recent, now);

        Ok(cameras)
    }
}
