//! Overlay of recent motion and ring events onto camera state.
//!
//! Bootstrap tells us what a camera *is*; the event list tells us what it
//! is *doing*. Each refresh queries a short trailing window of events and
//! folds them into the freshly converted camera records before they reach
//! the store.

use chrono::{DateTime, Duration, Utc};

// Re-exported so consumers can render raw events without depending on
// uprotect-api themselves.
pub use uprotect_api::types::EventPayload;

use crate::convert::timestamp;
use crate::model::CameraState;

/// How far back the per-refresh event query reaches.
pub const EVENT_LOOKBACK_SECS: i64 = 30;

/// Forward slack on the event query so events the NVR stamps slightly
/// ahead of our clock are not missed.
pub const EVENT_LOOKAHEAD_SECS: i64 = 10;

/// A ring counts as active for this long after the button press.
pub const RING_WINDOW_SECS: i64 = 3;

const EVENT_TYPE_MOTION: &str = "motion";
const EVENT_TYPE_RING: &str = "ring";

/// Query window for one refresh at time `now`.
#[must_use]
pub fn event_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        now - Duration::seconds(EVENT_LOOKBACK_SECS),
        now + Duration::seconds(EVENT_LOOKAHEAD_SECS),
    )
}

/// Fold a batch of events into camera records.
///
/// Events are applied in the order the NVR returned them, so when a camera
/// has several events in the window the newest one wins. Events without a
/// start time or for cameras not in the batch are ignored.
pub fn apply_events(cameras: &mut [CameraState], events: &[EventPayload], now: DateTime<Utc>) {
    for event in events {
        let Some(camera_id) = event.camera.as_deref() else {
            continue;
        };
        let Some(start) = timestamp(event.start) else {
            continue;
        };
        let Some(camera) = cameras.iter_mut().find(|c| c.id.as_str() == camera_id) else {
            continue;
        };

        match event.event_type.as_deref() {
            Some(EVENT_TYPE_MOTION) => {
                camera.last_motion = Some(start);
                // No end timestamp means the motion is still in progress.
                camera.event_on = event.end.is_none();
                camera.event_score = event.score.unwrap_or(0);
                camera.event_thumbnail = event.thumbnail.clone();
            }
            Some(EVENT_TYPE_RING) => {
                camera.last_ring = Some(start);
                camera.event_ring_on = start > now - Duration::seconds(RING_WINDOW_SECS);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use crate::model::{CameraId, DeviceClass, RecordingMode};

    use super::*;

    fn camera(id: &str) -> CameraState {
        CameraState {
            id: CameraId::new(id),
            name: id.to_owned(),
            device_class: DeviceClass::Doorbell,
            model: None,
            online: true,
            up_since: None,
            last_motion: None,
            last_ring: None,
            recording_mode: RecordingMode::Motion,
            ir_mode: None,
            rtsp: None,
            event_thumbnail: None,
            event_score: 0,
            event_on: false,
            event_ring_on: false,
        }
    }

    fn event(value: serde_json::Value) -> EventPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_ongoing_motion_sets_event_fields() {
        let now = Utc::now();
        let start = now - Duration::seconds(5);
        let mut cameras = vec![camera("cam1")];
        let events = [event(json!({
            "type": "motion",
            "camera": "cam1",
            "start": start.timestamp_millis(),
            "end": null,
            "score": 47,
            "thumbnail": "e-abc",
        }))];

        apply_events(&mut cameras, &events, now);

        assert!(cameras[0].event_on);
        assert_eq!(cameras[0].event_score, 47);
        assert_eq!(cameras[0].event_thumbnail.as_deref(), Some("e-abc"));
        assert_eq!(
            cameras[0].last_motion.unwrap().timestamp_millis(),
            start.timestamp_millis()
        );
    }

    #[test]
    fn test_ended_motion_clears_event_on() {
        let now = Utc::now();
        let start = now - Duration::seconds(20);
        let mut cameras = vec![camera("cam1")];
        let events = [event(json!({
            "type": "motion",
            "camera": "cam1",
            "start": start.timestamp_millis(),
            "end": (start + Duration::seconds(4)).timestamp_millis(),
            "score": 12,
        }))];

        apply_events(&mut cameras, &events, now);

        assert!(!cameras[0].event_on);
        assert_eq!(cameras[0].event_score, 12);
    }

    #[test]
    fn test_newest_event_wins() {
        let now = Utc::now();
        let mut cameras = vec![camera("cam1")];
        let events = [
            event(json!({
                "type": "motion",
                "camera": "cam1",
                "start": (now - Duration::seconds(25)).timestamp_millis(),
                "end": (now - Duration::seconds(20)).timestamp_millis(),
                "score": 90,
            })),
            event(json!({
                "type": "motion",
                "camera": "cam1",
                "start": (now - Duration::seconds(3)).timestamp_millis(),
                "end": null,
                "score": 55,
            })),
        ];

        apply_events(&mut cameras, &events, now);

        assert!(cameras[0].event_on);
        assert_eq!(cameras[0].event_score, 55);
    }

    #[test]
    fn test_recent_ring_is_active() {
        let now = Utc::now();
        let start = now - Duration::seconds(1);
        let mut cameras = vec![camera("bell")];
        let events = [event(json!({
            "type": "ring",
            "camera": "bell",
            "start": start.timestamp_millis(),
        }))];

        apply_events(&mut cameras, &events, now);

        assert!(cameras[0].event_ring_on);
        assert_eq!(
            cameras[0].last_ring.unwrap().timestamp_millis(),
            start.timestamp_millis()
        );
    }

    #[test]
    fn test_stale_ring_keeps_timestamp_but_not_state() {
        let now = Utc::now();
        let start = now - Duration::seconds(RING_WINDOW_SECS + 2);
        let mut cameras = vec![camera("bell")];
        let events = [event(json!({
            "type": "ring",
            "camera": "bell",
            "start": start.timestamp_millis(),
        }))];

        apply_events(&mut cameras, &events, now);

        assert!(!cameras[0].event_ring_on);
        assert!(cameras[0].last_ring.is_some());
    }

    #[test]
    fn test_events_for_unknown_cameras_are_ignored() {
        let now = Utc::now();
        let mut cameras = vec![camera("cam1")];
        let events = [
            event(json!({
                "type": "motion",
                "camera": "someone-else",
                "start": now.timestamp_millis(),
            })),
            event(json!({"type": "motion", "start": now.timestamp_millis()})),
            event(json!({"type": "motion", "camera": "cam1"})),
        ];

        apply_events(&mut cameras, &events, now);

        assert!(!cameras[0].event_on);
        assert_eq!(cameras[0].last_motion, None);
    }

    #[test]
    fn test_event_window_spans_lookback_and_lookahead() {
        let now = Utc::now();
        let (start, end) = event_window(now);
        assert_eq!((now - start).num_seconds(), EVENT_LOOKBACK_SECS);
        assert_eq!((end - now).num_seconds(), EVENT_LOOKAHEAD_SECS);
    }
}
