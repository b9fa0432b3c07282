//! Entity adapters over coordinator data.
//!
//! Entities are thin, long-lived views: each one holds a camera id and
//! reads whatever the store currently says about that camera. They are
//! built once after the first refresh and survive NVR outages; a camera
//! that vanishes from the store simply reads as inactive.

mod binary_sensor;
mod camera;

use serde_json::{Map, Value};

pub use binary_sensor::{BinarySensor, SensorKind, build_binary_sensors};
pub use camera::{ProtectCamera, build_cameras};

/// Attribution string exposed on every entity.
pub const DEFAULT_ATTRIBUTION: &str = "Powered by UniFi Protect Server";
pub const DEFAULT_BRAND: &str = "Ubiquiti";

pub const ATTR_ATTRIBUTION: &str = "attribution";
pub const ATTR_FRIENDLY_NAME: &str = "friendly_name";
pub const ATTR_LAST_TRIP_TIME: &str = "last_trip_time";
pub const ATTR_EVENT_SCORE: &str = "event_score";
pub const ATTR_CAMERA_ID: &str = "camera_id";
pub const ATTR_ONLINE: &str = "online";
pub const ATTR_UP_SINCE: &str = "up_since";

/// Which platform an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    BinarySensor,
    Camera,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BinarySensor => "binary_sensor",
            Self::Camera => "camera",
        }
    }
}

/// Common surface shared by all entity types.
pub trait Entity: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Stable identifier, unique across instances and restarts.
    fn unique_id(&self) -> String;

    /// Platform-prefixed slug id, e.g. `binary_sensor.garage_motion_front_door`.
    fn entity_id(&self) -> String;

    fn name(&self) -> String;

    /// Entities go unavailable while the NVR cannot be reached, i.e.
    /// whenever the last refresh attempt failed.
    fn available(&self) -> bool;

    /// Extra state attributes as a JSON object.
    fn attributes(&self) -> Map<String, Value>;
}

/// Reduce a display name to an entity id component: lowercase ASCII
/// alphanumerics with single underscores between words.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_sep = true;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    if slug.ends_with('_') {
        slug.pop();
    }
    slug
}
