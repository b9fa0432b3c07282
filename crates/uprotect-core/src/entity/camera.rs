//! Camera entities: snapshot images, stream URLs, and recording control.

use std::sync::{Arc, RwLock};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use tracing::debug;
use uprotect_api::ProtectClient;

use crate::coordinator::Coordinator;
use crate::model::{CameraId, CameraState, DeviceClass, RecordingMode};

use super::{
    ATTR_ATTRIBUTION, ATTR_CAMERA_ID, ATTR_LAST_TRIP_TIME, ATTR_ONLINE, ATTR_UP_SINCE,
    DEFAULT_ATTRIBUTION, DEFAULT_BRAND, Entity, EntityKind, slugify,
};

/// Mutable per-camera state behind the entity.
struct CameraRuntime {
    online: bool,
    up_since: Option<DateTime<Utc>>,
    last_motion: Option<DateTime<Utc>>,
    last_ring: Option<DateTime<Utc>>,
    recording_mode: RecordingMode,
    /// Most recent successfully fetched JPEG.
    last_image: Option<Bytes>,
}

/// One camera as an entity.
///
/// Identity (name, class, model, stream URL) is fixed at construction.
/// Live fields are cached inside the entity and refreshed by pushing the
/// store's snapshot in via [`refresh_from_snapshot`](Self::refresh_from_snapshot),
/// typically whenever [`Coordinator::subscribe`] yields a cycle.
pub struct ProtectCamera {
    client: Arc<ProtectClient>,
    coordinator: Coordinator,
    camera_id: CameraId,
    name: String,
    device_class: DeviceClass,
    model: Option<String>,
    stream_url: Option<String>,
    unique_id: String,
    entity_id: String,
    runtime: RwLock<CameraRuntime>,
}

impl ProtectCamera {
    #[must_use]
    pub fn new(
        client: Arc<ProtectClient>,
        coordinator: Coordinator,
        camera: &CameraState,
        instance: &str,
    ) -> Self {
        Self {
            client,
            coordinator,
            camera_id: camera.id.clone(),
            name: camera.name.clone(),
            device_class: camera.device_class,
            model: camera.model.clone(),
            stream_url: camera.rtsp.clone(),
            unique_id: format!("{instance}_camera_{}", camera.id),
            entity_id: format!("camera.{}", slugify(&format!("{instance} {}", camera.name))),
            runtime: RwLock::new(CameraRuntime {
                online: camera.online,
                up_since: camera.up_since,
                last_motion: camera.last_motion,
                last_ring: camera.last_ring,
                recording_mode: camera.recording_mode,
                last_image: None,
            }),
        }
    }

    #[must_use]
    pub fn camera_id(&self) -> &CameraId {
        &self.camera_id
    }

    #[must_use]
    pub fn device_class(&self) -> DeviceClass {
        self.device_class
    }

    #[must_use]
    pub fn brand(&self) -> &'static str {
        DEFAULT_BRAND
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Pull the store's current record into the cached fields.
    ///
    /// A camera missing from the store was un-adopted after this entity
    /// was built; it is marked offline rather than torn down.
    pub fn refresh_from_snapshot(&self) {
        let mut runtime = self.runtime.write().expect("camera state lock poisoned");
        if let Some(camera) = self.coordinator.camera(&self.camera_id) {
            runtime.online = camera.online;
            runtime.up_since = camera.up_since;
            runtime.last_motion = camera.last_motion;
            runtime.last_ring = camera.last_ring;
            runtime.recording_mode = camera.recording_mode;
        } else {
            runtime.online = false;
        }
    }

    /// Ask the coordinator for an early poll.
    pub fn request_refresh(&self) {
        self.coordinator.request_refresh();
    }

    #[must_use]
    pub fn online(&self) -> bool {
        self.runtime().online
    }

    #[must_use]
    pub fn recording_mode(&self) -> RecordingMode {
        self.runtime().recording_mode
    }

    /// Whether footage is being captured: a recording mode other than
    /// `never` AND a connected camera.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        let runtime = self.runtime();
        runtime.recording_mode != RecordingMode::Never && runtime.online
    }

    #[must_use]
    pub fn motion_detection_enabled(&self) -> bool {
        self.runtime().recording_mode != RecordingMode::Never
    }

    /// RTSP URL of the streaming channel, when one is enabled.
    #[must_use]
    pub fn stream_source(&self) -> Option<String> {
        self.stream_url.clone()
    }

    #[must_use]
    pub fn supports_streaming(&self) -> bool {
        self.stream_url.is_some()
    }

    /// Fetch a fresh snapshot JPEG.
    ///
    /// Falls back to the last good image when the fetch fails (snapshot
    /// endpoints intermittently error on some firmware); `None` only when
    /// no image was ever retrieved.
    pub async fn camera_image(&self) -> Option<Bytes> {
        match self.client.get_snapshot_image(self.camera_id.as_str()).await {
            Ok(image) => {
                self.runtime
                    .write()
                    .expect("camera state lock poisoned")
                    .last_image = Some(image.clone());
                Some(image)
            }
            Err(e) => {
                debug!(
                    camera = %self.camera_id,
                    error = %e,
                    "snapshot fetch failed, serving last image"
                );
                self.runtime().last_image.clone()
            }
        }
    }

    /// The last successfully fetched snapshot, if any.
    #[must_use]
    pub fn last_image(&self) -> Option<Bytes> {
        self.runtime().last_image.clone()
    }

    /// Switch the camera to motion-triggered recording.
    pub async fn enable_motion_detection(&self) {
        self.set_recording(RecordingMode::Motion).await;
    }

    /// Stop the camera from recording.
    pub async fn disable_motion_detection(&self) {
        self.set_recording(RecordingMode::Never).await;
    }

    /// Apply a recording mode; on NVR error the cached mode is left
    /// untouched and the failure is only logged.
    async fn set_recording(&self, mode: RecordingMode) {
        match self
            .client
            .set_recording_mode(self.camera_id.as_str(), &mode.to_string())
            .await
        {
            Ok(()) => {
                self.runtime
                    .write()
                    .expect("camera state lock poisoned")
                    .recording_mode = mode;
            }
            Err(e) => {
                debug!(
                    camera = %self.camera_id,
                    mode = %mode,
                    error = %e,
                    "recording mode change failed"
                );
            }
        }
    }

    fn runtime(&self) -> std::sync::RwLockReadGuard<'_, CameraRuntime> {
        self.runtime.read().expect("camera state lock poisoned")
    }
}

impl Entity for ProtectCamera {
    fn kind(&self) -> EntityKind {
        EntityKind::Camera
    }

    fn unique_id(&self) -> String {
        self.unique_id.clone()
    }

    fn entity_id(&self) -> String {
        self.entity_id.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn available(&self) -> bool {
        self.coordinator.last_update_success()
    }

    fn attributes(&self) -> Map<String, Value> {
        let runtime = self.runtime();
        let last_trip = if self.device_class.is_doorbell() {
            runtime.last_ring
        } else {
            runtime.last_motion
        };

        let mut attrs = Map::new();
        attrs.insert(ATTR_ATTRIBUTION.into(), json!(DEFAULT_ATTRIBUTION));
        attrs.insert(ATTR_CAMERA_ID.into(), json!(self.camera_id));
        attrs.insert(ATTR_ONLINE.into(), json!(runtime.online));
        attrs.insert(ATTR_UP_SINCE.into(), json!(runtime.up_since));
        attrs.insert(ATTR_LAST_TRIP_TIME.into(), json!(last_trip));
        attrs
    }
}

/// Build a camera entity for every camera currently in the store, in
/// snapshot order.
#[must_use]
pub fn build_cameras(
    client: &Arc<ProtectClient>,
    coordinator: &Coordinator,
    instance: &str,
) -> Vec<ProtectCamera> {
    coordinator
        .data()
        .iter()
        .map(|camera| {
            ProtectCamera::new(
                Arc::clone(client),
                coordinator.clone(),
                camera,
                instance,
            )
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use uprotect_api::NvrPlatform;

    use crate::error::CoreError;
    use crate::source::CameraSource;

    use super::*;

    fn camera_state(id: &str, name: &str) -> CameraState {
        CameraState {
            id: CameraId::new(id),
            name: name.to_owned(),
            device_class: DeviceClass::Doorbell,
            model: Some("UVC G4 Doorbell".to_owned()),
            online: true,
            up_since: Some(Utc::now()),
            last_motion: None,
            last_ring: Some(Utc::now()),
            recording_mode: RecordingMode::Motion,
            ir_mode: None,
            rtsp: Some("rtsp://nvr.local:7447/abc".to_owned()),
            event_thumbnail: None,
            event_score: 0,
            event_on: false,
            event_ring_on: false,
        }
    }

    struct StaticSource(StdMutex<Vec<CameraState>>);

    impl StaticSource {
        fn new(cameras: Vec<CameraState>) -> Arc<Self> {
            Arc::new(Self(StdMutex::new(cameras)))
        }

        fn set_cameras(&self, cameras: Vec<CameraState>) {
            *self.0.lock().unwrap() = cameras;
        }
    }

    #[async_trait]
    impl CameraSource for StaticSource {
        async fn poll_cameras(&self) -> Result<Vec<CameraState>, CoreError> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    /// Client pointed at a port nothing listens on; every call fails fast.
    fn unreachable_client() -> Arc<ProtectClient> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        Arc::new(ProtectClient::with_client(
            http,
            "http://127.0.0.1:1".parse().unwrap(),
            NvrPlatform::CloudKey,
        ))
    }

    async fn setup() -> (Arc<StaticSource>, Coordinator, ProtectCamera) {
        let source = StaticSource::new(vec![camera_state("d1", "Front Door")]);
        let coordinator = Coordinator::new(Arc::clone(&source) as Arc<dyn CameraSource>, Duration::ZERO);
        coordinator.refresh_now().await.unwrap();
        let cameras = build_cameras(&unreachable_client(), &coordinator, "home");
        let camera = cameras.into_iter().next().unwrap();
        (source, coordinator, camera)
    }

    #[tokio::test]
    async fn test_identity_captured_at_construction() {
        let (_, _, camera) = setup().await;

        assert_eq!(camera.name(), "Front Door");
        assert_eq!(camera.unique_id(), "home_camera_d1");
        assert_eq!(camera.entity_id(), "camera.home_front_door");
        assert_eq!(camera.kind(), EntityKind::Camera);
        assert_eq!(camera.model(), Some("UVC G4 Doorbell"));
        assert_eq!(camera.brand(), DEFAULT_BRAND);
        assert_eq!(
            camera.stream_source().as_deref(),
            Some("rtsp://nvr.local:7447/abc")
        );
        assert!(camera.supports_streaming());
    }

    #[tokio::test]
    async fn test_is_recording_needs_mode_and_connectivity() {
        let (source, coordinator, camera) = setup().await;
        assert!(camera.is_recording());
        assert!(camera.motion_detection_enabled());

        let mut offline = camera_state("d1", "Front Door");
        offline.online = false;
        source.set_cameras(vec![offline]);
        coordinator.refresh_now().await.unwrap();
        camera.refresh_from_snapshot();

        assert!(!camera.is_recording());
        // Mode is still motion; only connectivity is gone.
        assert!(camera.motion_detection_enabled());
        assert!(!camera.online());
    }

    #[tokio::test]
    async fn test_failed_mode_change_leaves_state_untouched() {
        let (_, _, camera) = setup().await;
        assert_eq!(camera.recording_mode(), RecordingMode::Motion);

        // The NVR is unreachable, so the change must not be applied locally.
        camera.disable_motion_detection().await;
        assert_eq!(camera.recording_mode(), RecordingMode::Motion);
        assert!(camera.motion_detection_enabled());
    }

    #[tokio::test]
    async fn test_snapshot_failure_serves_nothing_without_cache() {
        let (_, _, camera) = setup().await;
        assert_eq!(camera.camera_image().await, None);
        assert_eq!(camera.last_image(), None);
    }

    #[tokio::test]
    async fn test_pruned_camera_goes_offline() {
        let (source, coordinator, camera) = setup().await;

        source.set_cameras(Vec::new());
        coordinator.refresh_now().await.unwrap();
        camera.refresh_from_snapshot();

        assert!(!camera.online());
        let attrs = camera.attributes();
        assert_eq!(attrs[ATTR_ONLINE], json!(false));
        assert_eq!(attrs[ATTR_CAMERA_ID], json!("d1"));
    }

    #[tokio::test]
    async fn test_attributes_use_ring_time_for_doorbells() {
        let (_, _, camera) = setup().await;
        let attrs = camera.attributes();

        assert_eq!(attrs[ATTR_ATTRIBUTION], json!(DEFAULT_ATTRIBUTION));
        assert!(!attrs[ATTR_LAST_TRIP_TIME].is_null());
        assert!(!attrs[ATTR_UP_SINCE].is_null());
    }
}
