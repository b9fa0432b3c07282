use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::CameraId;

/// What kind of device the camera presents as.
///
/// Derived from the hardware type reported by the NVR: anything whose type
/// string contains `doorbell` (for example `UVC G4 Doorbell`) is a doorbell,
/// everything else is a plain camera. Doorbells get an extra ring sensor on
/// top of the motion sensor every camera has.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Camera,
    Doorbell,
}

impl DeviceClass {
    #[must_use]
    pub fn is_doorbell(self) -> bool {
        matches!(self, Self::Doorbell)
    }
}

/// Recording mode of a camera, as the NVR spells it on the wire.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RecordingMode {
    Always,
    #[default]
    Motion,
    Never,
}

/// Infrared LED mode of a camera.
///
/// The wire values are the NVR's; the extra `serialize` aliases accept the
/// friendlier spellings used on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum IrMode {
    #[serde(rename = "auto")]
    #[strum(to_string = "auto")]
    Auto,
    #[serde(rename = "on")]
    #[strum(to_string = "on", serialize = "always_on")]
    On,
    /// IR filter engaged but the illuminator LEDs stay dark.
    #[serde(rename = "autoFilterOnly")]
    #[strum(to_string = "autoFilterOnly", serialize = "led_off")]
    LedOff,
    #[serde(rename = "off")]
    #[strum(to_string = "off", serialize = "always_off")]
    Off,
}

/// One camera as seen at the last refresh.
///
/// A value is immutable once it enters the store; every refresh replaces it
/// wholesale. `last_motion` and `last_ring` come from the NVR's bootstrap
/// payload, while the `event_*` fields are overlaid from the recent event
/// list by [`crate::events::apply_events`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub id: CameraId,
    pub name: String,
    pub device_class: DeviceClass,
    /// Hardware model string, e.g. `UVC G3 Flex`.
    pub model: Option<String>,
    pub online: bool,
    pub up_since: Option<DateTime<Utc>>,
    pub last_motion: Option<DateTime<Utc>>,
    pub last_ring: Option<DateTime<Utc>>,
    pub recording_mode: RecordingMode,
    pub ir_mode: Option<IrMode>,
    /// RTSP URL of the first streaming-enabled channel, if any.
    pub rtsp: Option<String>,
    /// Identifier of the thumbnail for the most recent motion event.
    pub event_thumbnail: Option<String>,
    pub event_score: u16,
    /// A motion event is currently in progress.
    pub event_on: bool,
    /// The doorbell was rung within the last few seconds.
    pub event_ring_on: bool,
}

impl CameraState {
    /// Whether the camera is actually capturing footage right now.
    ///
    /// Recording requires both a mode that records and a camera that is
    /// connected; an offline camera records nothing no matter its mode.
    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.recording_mode != RecordingMode::Never && self.online
    }

    #[must_use]
    pub fn is_doorbell(&self) -> bool {
        self.device_class.is_doorbell()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn camera(mode: RecordingMode, online: bool) -> CameraState {
        CameraState {
            id: CameraId::new("cam1"),
            name: "Front Door".to_owned(),
            device_class: DeviceClass::Camera,
            model: None,
            online,
            up_since: None,
            last_motion: None,
            last_ring: None,
            recording_mode: mode,
            ir_mode: None,
            rtsp: None,
            event_thumbnail: None,
            event_score: 0,
            event_on: false,
            event_ring_on: false,
        }
    }

    #[test]
    fn test_is_recording_requires_mode_and_online() {
        assert!(camera(RecordingMode::Always, true).is_recording());
        assert!(camera(RecordingMode::Motion, true).is_recording());
        assert!(!camera(RecordingMode::Never, true).is_recording());
        assert!(!camera(RecordingMode::Always, false).is_recording());
        assert!(!camera(RecordingMode::Never, false).is_recording());
    }

    #[test]
    fn test_recording_mode_wire_spelling() {
        assert_eq!(RecordingMode::Always.to_string(), "always");
        assert_eq!(RecordingMode::Motion.to_string(), "motion");
        assert_eq!(RecordingMode::Never.to_string(), "never");
        assert_eq!("never".parse::<RecordingMode>().unwrap(), RecordingMode::Never);
        assert!("sometimes".parse::<RecordingMode>().is_err());
    }

    #[test]
    fn test_ir_mode_accepts_cli_aliases() {
        assert_eq!("auto".parse::<IrMode>().unwrap(), IrMode::Auto);
        assert_eq!("always_on".parse::<IrMode>().unwrap(), IrMode::On);
        assert_eq!("led_off".parse::<IrMode>().unwrap(), IrMode::LedOff);
        assert_eq!("autoFilterOnly".parse::<IrMode>().unwrap(), IrMode::LedOff);
        assert_eq!("always_off".parse::<IrMode>().unwrap(), IrMode::Off);
        assert_eq!(IrMode::LedOff.to_string(), "autoFilterOnly");
    }

    #[test]
    fn test_ir_mode_serde_uses_wire_names() {
        let json = serde_json::to_string(&IrMode::LedOff).unwrap();
        assert_eq!(json, "\"autoFilterOnly\"");
    }
}
