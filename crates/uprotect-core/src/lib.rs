// uprotect-core: Coordinated camera state between uprotect-api and
// consumers (CLI, automation front ends).

pub mod config;
pub mod convert;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod events;
pub mod instance;
pub mod model;
pub mod source;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConnectConfig, DEFAULT_SCAN_INTERVAL, TlsVerification};
pub use coordinator::{Coordinator, RefreshCycle};
pub use entity::{
    BinarySensor, Entity, EntityKind, ProtectCamera, SensorKind, build_binary_sensors,
    build_cameras,
};
pub use error::CoreError;
pub use instance::{DEFAULT_THUMBNAIL_WIDTH, ProtectInstance};
pub use source::{CameraSource, NvrSource};
pub use store::CameraStore;
pub use stream::UpdateStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{CameraId, CameraState, DeviceClass, IrMode, NvrInfo, RecordingMode};
