//! Concurrent camera store with change notification.
//!
//! The store is written only by the coordinator and read from everywhere
//! else. Reads never block refreshes: lookups go through a [`DashMap`] and
//! bulk consumers take the pre-built snapshot `Arc`, which is swapped
//! atomically at the end of each refresh.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::debug;

use crate::model::{CameraId, CameraState};

pub struct CameraStore {
    by_id: DashMap<CameraId, Arc<CameraState>>,
    /// Snapshot of all cameras, sorted by name. Rebuilt once per refresh.
    snapshot: watch::Sender<Arc<Vec<Arc<CameraState>>>>,
}

impl CameraStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_id: DashMap::new(),
            snapshot: watch::Sender::new(Arc::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn get(&self, id: &CameraId) -> Option<Arc<CameraState>> {
        self.by_id.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Current snapshot of all cameras, sorted by name.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Vec<Arc<CameraState>>> {
        self.snapshot.borrow().clone()
    }

    /// Watch the snapshot. The receiver yields a fresh value after every
    /// applied refresh, whether or not anything changed.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<CameraState>>>> {
        self.snapshot.subscribe()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<CameraId> {
        self.by_id.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Fold a refresh result into the store: every incoming camera replaces
    /// its stored record, and stored cameras absent from the batch are
    /// dropped (un-adopted from the NVR).
    pub fn apply_refresh(&self, incoming: Vec<CameraState>) {
        let seen: HashSet<CameraId> = incoming.iter().map(|c| c.id.clone()).collect();
        let count = incoming.len();

        for camera in incoming {
            self.by_id.insert(camera.id.clone(), Arc::new(camera));
        }
        for id in self.ids() {
            if !seen.contains(&id) {
                debug!(camera = %id, "camera no longer adopted, dropping");
                self.by_id.remove(&id);
            }
        }

        self.rebuild_snapshot();
        debug!(cameras = count, "refresh applied");
    }

    fn rebuild_snapshot(&self) {
        let mut items: Vec<Arc<CameraState>> =
            self.by_id.iter().map(|entry| Arc::clone(entry.value())).collect();
        items.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        self.snapshot.send_modify(|current| *current = Arc::new(items));
    }
}

impl Default for CameraStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::model::{DeviceClass, RecordingMode};

    use super::*;

    fn camera(id: &str, name: &str) -> CameraState {
        CameraState {
            id: CameraId::new(id),
            name: name.to_owned(),
            device_class: DeviceClass::Camera,
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

    #[test]
    fn test_apply_refresh_inserts_and_sorts_by_name() {
        let store = CameraStore::new();
        store.apply_refresh(vec![camera("b", "Porch"), camera("a", "Driveway")]);

        assert_eq!(store.len(), 2);
        let snapshot = store.snapshot();
        let names: Vec<&str> = snapshot.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Driveway", "Porch"]);
        assert_eq!(store.get(&CameraId::new("a")).unwrap().name, "Driveway");
    }

    #[test]
    fn test_apply_refresh_replaces_and_prunes() {
        let store = CameraStore::new();
        store.apply_refresh(vec![camera("a", "Driveway"), camera("b", "Porch")]);

        let mut updated = camera("a", "Driveway");
        updated.online = false;
        store.apply_refresh(vec![updated]);

        assert_eq!(store.len(), 1);
        assert!(store.get(&CameraId::new("b")).is_none());
        assert!(!store.get(&CameraId::new("a")).unwrap().online);
    }

    #[test]
    fn test_subscribe_sees_each_refresh() {
        let store = CameraStore::new();
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        store.apply_refresh(vec![camera("a", "Driveway")]);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        // A refresh with identical content still notifies.
        store.apply_refresh(vec![camera("a", "Driveway")]);
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn test_empty_store() {
        let store = CameraStore::default();
        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());
        assert!(store.get(&CameraId::new("missing")).is_none());
        assert!(store.ids().is_empty());
    }
}
