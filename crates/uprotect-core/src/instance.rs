//! Per-NVR session: connection lifecycle, entity construction, and
//! service calls.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uprotect_api::transport::{TlsMode, TransportConfig};
use uprotect_api::{NvrPlatform, ProtectClient};

use crate::config::{ConnectConfig, TlsVerification};
use crate::convert::nvr_from_payload;
use crate::coordinator::Coordinator;
use crate::entity::{BinarySensor, ProtectCamera, build_binary_sensors, build_cameras};
use crate::error::CoreError;
use crate::events::EventPayload;
use crate::model::{CameraState, IrMode, NvrInfo, RecordingMode};
use crate::source::NvrSource;

/// Width requested for event thumbnails when the caller doesn't give one.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 640;

/// A connected NVR with its refresh loop running.
///
/// Owns the authenticated client and the coordinator; entities built from
/// an instance share both. The instance name prefixes entity ids so two
/// NVRs never collide.
pub struct ProtectInstance {
    name: String,
    client: Arc<ProtectClient>,
    coordinator: Coordinator,
    nvr: NvrInfo,
}

impl ProtectInstance {
    // ── Connection lifecycle ─────────────────────────────────────

    /// Connect to an NVR and start the background refresh loop.
    ///
    /// Detects the platform, authenticates, loads NVR information, runs the
    /// initial camera poll, and spawns the periodic refresh task. A failure
    /// anywhere in that sequence fails the whole setup.
    pub async fn connect(
        name: impl Into<String>,
        config: &ConnectConfig,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        let transport = build_transport(config);

        let platform = NvrPlatform::detect(&config.url).await?;
        debug!(?platform, "detected NVR platform");

        let client = Arc::new(ProtectClient::new(
            config.url.clone(),
            platform,
            &transport,
        )?);
        client.login(&config.username, &config.password).await?;
        debug!("authentication successful");

        let nvr = nvr_from_payload(&client.server_information().await?);
        info!(nvr = %nvr.label(), version = ?nvr.version, "connected to NVR");

        let source = Arc::new(NvrSource::new(Arc::clone(&client)));
        let coordinator = Coordinator::new(source, config.scan_interval);
        if let Err(e) = coordinator.refresh_now().await {
            return Err(not_ready_on_first_poll(e));
        }
        coordinator.start().await;

        Ok(Self {
            name,
            client,
            coordinator,
            nvr,
        })
    }

    /// Stop the refresh loop and log out.
    pub async fn shutdown(&self) {
        self.coordinator.shutdown().await;
        if let Err(e) = self.client.logout().await {
            warn!(error = %e, "logout failed (non-fatal)");
        }
        info!(instance = %self.name, "disconnected from NVR");
    }

    // ── Accessors ────────────────────────────────────────────────

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn nvr(&self) -> &NvrInfo {
        &self.nvr
    }

    #[must_use]
    pub fn client(&self) -> &Arc<ProtectClient> {
        &self.client
    }

    #[must_use]
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    // ── Entities ─────────────────────────────────────────────────

    /// Motion and doorbell sensors for every camera currently known.
    #[must_use]
    pub fn binary_sensors(&self) -> Vec<BinarySensor> {
        build_binary_sensors(&self.coordinator, &self.name)
    }

    /// A camera entity for every camera currently known.
    #[must_use]
    pub fn cameras(&self) -> Vec<ProtectCamera> {
        build_cameras(&self.client, &self.coordinator, &self.name)
    }

    // ── Service calls ────────────────────────────────────────────

    /// Look a camera up by id, falling back to a case-insensitive name
    /// match.
    pub fn resolve_camera(&self, identifier: &str) -> Result<Arc<CameraState>, CoreError> {
        find_camera(&self.coordinator.data(), identifier).ok_or_else(|| {
            CoreError::CameraNotFound {
                identifier: identifier.to_owned(),
            }
        })
    }

    /// Set a camera's recording mode.
    ///
    /// Unknown mode strings fall back to `motion` rather than failing the
    /// call. Returns the mode actually applied.
    pub async fn set_recording_mode(
        &self,
        identifier: &str,
        mode: &str,
    ) -> Result<RecordingMode, CoreError> {
        let camera = self.resolve_camera(identifier)?;
        let mode = recording_mode_or_default(mode);
        self.client
            .set_recording_mode(camera.id.as_str(), &mode.to_string())
            .await?;
        info!(camera = %camera.name, mode = %mode, "recording mode set");
        self.coordinator.request_refresh();
        Ok(mode)
    }

    /// Set a camera's infrared LED mode.
    pub async fn set_ir_mode(&self, identifier: &str, mode: IrMode) -> Result<(), CoreError> {
        let camera = self.resolve_camera(identifier)?;
        self.client
            .set_ir_mode(camera.id.as_str(), &mode.to_string())
            .await?;
        info!(camera = %camera.name, mode = %mode, "infrared mode set");
        self.coordinator.request_refresh();
        Ok(())
    }

    /// Fetch a live snapshot JPEG and write it to `path`.
    pub async fn save_snapshot(&self, identifier: &str, path: &Path) -> Result<(), CoreError> {
        let camera = self.resolve_camera(identifier)?;
        let image = self.client.get_snapshot_image(camera.id.as_str()).await?;
        write_image(path, &image)?;
        info!(
            camera = %camera.name,
            path = %path.display(),
            bytes = image.len(),
            "saved snapshot"
        );
        Ok(())
    }

    /// Save the thumbnail of a camera's most recent motion event.
    ///
    /// The NVR scales the image to `width` (height follows the 16:9
    /// thumbnail aspect); when `None`, [`DEFAULT_THUMBNAIL_WIDTH`] is used.
    pub async fn save_thumbnail(
        &self,
        identifier: &str,
        path: &Path,
        width: Option<u32>,
    ) -> Result<(), CoreError> {
        let camera = self.resolve_camera(identifier)?;
        let Some(thumbnail_id) = camera.event_thumbnail.clone() else {
            return Err(CoreError::OperationFailed {
                message: format!("camera '{}' has no event thumbnail to save", camera.name),
            });
        };
        let image = self
            .client
            .get_thumbnail(&thumbnail_id, width.unwrap_or(DEFAULT_THUMBNAIL_WIDTH))
            .await?;
        write_image(path, &image)?;
        info!(
            camera = %camera.name,
            path = %path.display(),
            "saved event thumbnail"
        );
        Ok(())
    }

    /// List raw events from the trailing `window`, newest last.
    pub async fn recent_events(
        &self,
        window: chrono::Duration,
    ) -> Result<Vec<EventPayload>, CoreError> {
        let now = chrono::Utc::now();
        let events = self.client.list_events(now - window, now).await?;
        Ok(events)
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn find_camera(cameras: &[Arc<CameraState>], identifier: &str) -> Option<Arc<CameraState>> {
    cameras
        .iter()
        .find(|c| c.id.as_str() == identifier)
        .or_else(|| {
            cameras
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(identifier))
        })
        .cloned()
}

fn recording_mode_or_default(mode: &str) -> RecordingMode {
    mode.parse::<RecordingMode>().unwrap_or_else(|_| {
        debug!(requested = mode, "unknown recording mode, falling back to motion");
        RecordingMode::default()
    })
}

fn write_image(path: &Path, image: &[u8]) -> Result<(), CoreError> {
    std::fs::write(path, image).map_err(|e| CoreError::OperationFailed {
        message: format!("failed to write {}: {e}", path.display()),
    })
}

/// Login worked, so a failing first poll means the NVR is still coming up
/// rather than anything the caller can fix. Auth errors pass through.
fn not_ready_on_first_poll(e: CoreError) -> CoreError {
    match e {
        CoreError::ConnectionFailed { .. } | CoreError::Timeout { .. } => CoreError::NotReady {
            reason: e.to_string(),
        },
        other => other,
    }
}

fn build_transport(config: &ConnectConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
