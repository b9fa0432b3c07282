//! Conversion from raw API payloads into the domain model.
//!
//! All of this is pure: timestamps become `DateTime<Utc>`, wire strings
//! become enums, and the RTSP URL for each camera is derived here so the
//! rest of the crate never has to look at channel lists again.

use chrono::{DateTime, Utc};
use uprotect_api::types::{BootstrapPayload, CameraPayload, NvrPayload};

use crate::model::{CameraId, CameraState, DeviceClass, IrMode, NvrInfo, RecordingMode};

/// RTSP re-stream port on stock firmware, used when bootstrap omits it.
pub const DEFAULT_RTSP_PORT: u16 = 7447;

/// Camera `state` value that means the camera is reachable.
const STATE_CONNECTED: &str = "CONNECTED";

/// Classify a camera from its hardware type string.
#[must_use]
pub fn device_class_for(camera_type: Option<&str>) -> DeviceClass {
    match camera_type {
        Some(t) if t.to_ascii_lowercase().contains("doorbell") => DeviceClass::Doorbell,
        _ => DeviceClass::Camera,
    }
}

/// Convert the NVR record nested in bootstrap.
#[must_use]
pub fn nvr_from_payload(payload: &NvrPayload) -> NvrInfo {
    NvrInfo {
        id: payload.id.clone(),
        name: payload
            .name
            .clone()
            .unwrap_or_else(|| payload.id.clone()),
        model: payload.nvr_type.clone(),
        version: payload.version.clone(),
        host: payload.host.clone(),
        rtsp_port: payload
            .ports
            .as_ref()
            .and_then(|p| p.rtsp)
            .unwrap_or(DEFAULT_RTSP_PORT),
    }
}

/// Convert one camera record. `rtsp_host` is the host streams are served
/// from (the NVR, not the camera); without it no RTSP URL is produced.
#[must_use]
pub fn camera_from_payload(
    payload: &CameraPayload,
    rtsp_host: Option<&str>,
    rtsp_port: u16,
) -> CameraState {
    CameraState {
        id: CameraId::new(&payload.id),
        name: payload
            .name
            .clone()
            .unwrap_or_else(|| payload.id.clone()),
        device_class: device_class_for(payload.camera_type.as_deref()),
        model: payload.camera_type.clone(),
        online: payload.state.as_deref() == Some(STATE_CONNECTED),
        up_since: timestamp(payload.up_since),
        last_motion: timestamp(payload.last_motion),
        last_ring: timestamp(payload.last_ring),
        recording_mode: payload
            .recording_settings
            .as_ref()
            .and_then(|r| r.mode.as_deref())
            .and_then(|m| m.parse::<RecordingMode>().ok())
            .unwrap_or_default(),
        ir_mode: payload
            .isp_settings
            .as_ref()
            .and_then(|i| i.ir_led_mode.as_deref())
            .and_then(|m| m.parse::<IrMode>().ok()),
        rtsp: rtsp_url(payload, rtsp_host, rtsp_port),
        event_thumbnail: None,
        event_score: 0,
        event_on: false,
        event_ring_on: false,
    }
}

/// Convert every camera carried by a bootstrap payload.
///
/// `fallback_host` is used for RTSP URLs when the NVR record does not
/// advertise its own host, typically the host the client connected to.
#[must_use]
pub fn cameras_from_bootstrap(
    bootstrap: &BootstrapPayload,
    fallback_host: Option<&str>,
) -> Vec<CameraState> {
    let nvr = nvr_from_payload(&bootstrap.nvr);
    let host = nvr.host.as_deref().or(fallback_host);
    bootstrap
        .cameras
        .iter()
        .map(|c| camera_from_payload(c, host, nvr.rtsp_port))
        .collect()
}

/// RTSP URL of the first channel that has streaming enabled.
fn rtsp_url(payload: &CameraPayload, host: Option<&str>, port: u16) -> Option<String> {
    let host = host?;
    payload
        .channels
        .iter()
        .find(|c| c.is_rtsp_enabled)
        .and_then(|c| c.rtsp_alias.as_deref())
        .map(|alias| format!("rtsp://{host}:{port}/{alias}"))
}

/// Millisecond epoch (the NVR's timestamp encoding) to `DateTime`.
#[must_use]
pub fn timestamp(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(DateTime::from_timestamp_millis)
}
