//! Motion and doorbell binary sensors.
//!
//! Every camera carries a motion sensor; doorbell cameras additionally
//! carry a ring sensor. Sensors never cache event state -- `is_on` is
//! answered from the store's current snapshot on every call.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};

use crate::coordinator::Coordinator;
use crate::model::{CameraId, CameraState};

use super::{
    ATTR_ATTRIBUTION, ATTR_EVENT_SCORE, ATTR_FRIENDLY_NAME, ATTR_LAST_TRIP_TIME,
    DEFAULT_ATTRIBUTION, Entity, EntityKind, slugify,
};

/// What a binary sensor reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Motion,
    Doorbell,
}

impl SensorKind {
    /// Device class advertised to consumers.
    #[must_use]
    pub fn device_class(self) -> &'static str {
        match self {
            Self::Motion => "motion",
            Self::Doorbell => "doorbell",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Motion => "Motion",
            Self::Doorbell => "Doorbell",
        }
    }
}

pub struct BinarySensor {
    coordinator: Coordinator,
    camera_id: CameraId,
    kind: SensorKind,
    /// Display name, fixed at creation (`Motion Front Door`).
    name: String,
    unique_id: String,
    entity_id: String,
}

impl BinarySensor {
    #[must_use]
    pub fn new(
        coordinator: Coordinator,
        camera: &CameraState,
        kind: SensorKind,
        instance: &str,
    ) -> Self {
        let name = format!("{} {}", kind.label(), camera.name);
        let unique_id = format!("{instance}_{}_{}", kind.device_class(), camera.id);
        let entity_id = format!("binary_sensor.{}", slugify(&format!("{instance} {name}")));

        Self {
            coordinator,
            camera_id: camera.id.clone(),
            kind,
            name,
            unique_id,
            entity_id,
        }
    }

    #[must_use]
    pub fn sensor_kind(&self) -> SensorKind {
        self.kind
    }

    #[must_use]
    pub fn camera_id(&self) -> &CameraId {
        &self.camera_id
    }

    /// Whether the sensor is tripped, per the latest snapshot.
    ///
    /// A camera missing from the store reads as inactive, not as an error;
    /// it may have been un-adopted since this sensor was built.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.camera().is_some_and(|c| match self.kind {
            SensorKind::Motion => c.event_on,
            SensorKind::Doorbell => c.event_ring_on,
        })
    }

    /// Icon override. Doorbell sensors switch icon while ringing; motion
    /// sensors use the consumer's device class default.
    #[must_use]
    pub fn icon(&self) -> Option<&'static str> {
        match self.kind {
            SensorKind::Motion => None,
            SensorKind::Doorbell => Some(if self.is_on() {
                "mdi:bell-ring-outline"
            } else {
                "mdi:doorbell-video"
            }),
        }
    }

    fn camera(&self) -> Option<Arc<CameraState>> {
        self.coordinator.camera(&self.camera_id)
    }
}

impl Entity for BinarySensor {
    fn kind(&self) -> EntityKind {
        EntityKind::BinarySensor
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
        let mut attrs = Map::new();
        attrs.insert(ATTR_ATTRIBUTION.into(), json!(DEFAULT_ATTRIBUTION));
        attrs.insert(ATTR_FRIENDLY_NAME.into(), json!(self.name));

        if let Some(camera) = self.camera() {
            let last_trip: Option<DateTime<Utc>> = match self.kind {
                SensorKind::Motion => camera.last_motion,
                SensorKind::Doorbell => camera.last_ring,
            };
            attrs.insert(ATTR_LAST_TRIP_TIME.into(), json!(last_trip));
            if self.kind == SensorKind::Motion {
                attrs.insert(ATTR_EVENT_SCORE.into(), json!(camera.event_score));
            }
        }

        attrs
    }
}

/// Build the binary sensor set for every camera currently in the store.
///
/// Cameras come out in snapshot order (sorted by name); a doorbell's ring
/// sensor precedes its motion sensor.
#[must_use]
pub fn build_binary_sensors(coordinator: &Coordinator, instance: &str) -> Vec<BinarySensor> {
    let mut sensors = Vec::new();
    for camera in coordinator.data().iter() {
        if camera.is_doorbell() {
            sensors.push(BinarySensor::new(
                coordinator.clone(),
                camera,
                SensorKind::Doorbell,
                instance,
            ));
        }
        sensors.push(BinarySensor::new(
            coordinator.clone(),
            camera,
            SensorKind::Motion,
            instance,
        ));
    }
    sensors
}
