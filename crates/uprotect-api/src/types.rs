// Protect API response types
//
// Models for the NVR's camelCase JSON API. Fields use `#[serde(default)]`
// liberally because payload shape varies across Protect firmware versions;
// timestamps are millisecond epochs and stay raw `i64` at this layer.

use serde::{Deserialize, Serialize};

// ── Bootstrap ────────────────────────────────────────────────────────

/// Full state dump from `GET /api/bootstrap`: the NVR record plus every
/// adopted camera. This is the poll unit -- Protect has no per-camera
/// state endpoint worth using.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapPayload {
    pub nvr: NvrPayload,
    #[serde(default)]
    pub cameras: Vec<CameraPayload>,
    #[serde(default)]
    pub auth_user_id: Option<String>,
    #[serde(default)]
    pub access_key: Option<String>,
}

/// The NVR record nested in bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NvrPayload {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub nvr_type: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub ports: Option<PortsPayload>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Service ports advertised by the NVR. `rtsp` is the one we care about
/// for building stream URLs (7447 on stock firmware).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortsPayload {
    #[serde(default)]
    pub rtsp: Option<u16>,
    #[serde(default)]
    pub http: Option<u16>,
    #[serde(default)]
    pub https: Option<u16>,
}

// ── Camera ───────────────────────────────────────────────────────────

/// Camera object from bootstrap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPayload {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Hardware type string, e.g. `"UVC G4 Doorbell"`.
    #[serde(default, rename = "type")]
    pub camera_type: Option<String>,
    /// `"CONNECTED"` when the camera is reachable.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub up_since: Option<i64>,
    #[serde(default)]
    pub last_motion: Option<i64>,
    #[serde(default)]
    pub last_ring: Option<i64>,
    #[serde(default)]
    pub recording_settings: Option<RecordingSettingsPayload>,
    #[serde(default)]
    pub isp_settings: Option<IspSettingsPayload>,
    #[serde(default)]
    pub channels: Vec<ChannelPayload>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Recording configuration nested in a camera record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSettingsPayload {
    /// `"always"`, `"motion"`, or `"never"`.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub pre_padding_secs: Option<u32>,
    #[serde(default)]
    pub post_padding_secs: Option<u32>,
}

/// Image pipeline settings nested in a camera record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IspSettingsPayload {
    /// `"auto"`, `"on"`, `"autoFilterOnly"`, or `"off"`.
    #[serde(default)]
    pub ir_led_mode: Option<String>,
}

/// One video channel of a camera. Protect exposes up to three (high,
/// medium, low); each can have RTSP enabled independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPayload {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_rtsp_enabled: bool,
    #[serde(default)]
    pub rtsp_alias: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

// ── Events ───────────────────────────────────────────────────────────

/// Motion or ring event from `GET /api/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(default)]
    pub id: Option<String>,
    /// `"motion"` or `"ring"`.
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    /// Id of the camera the event belongs to.
    #[serde(default)]
    pub camera: Option<String>,
    /// Event start, ms epoch. Always present in practice.
    #[serde(default)]
    pub start: Option<i64>,
    /// Event end, ms epoch. `None` while the event is still running.
    #[serde(default)]
    pub end: Option<i64>,
    #[serde(default)]
    pub score: Option<u16>,
    /// Thumbnail id (`e-{event id}`), fetchable via the thumbnails endpoint.
    #[serde(default)]
    pub thumbnail: Option<String>,
}

// ── Auth ─────────────────────────────────────────────────────────────

/// Response of `POST /api/auth/access-key`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessKeyResponse {
    pub access_key: String,
}
